//! Signal Graph - Node storage, edges and dirty bookkeeping.
//!
//! The graph is pure data. It never calls user code: reading a store or
//! recomputing a memo hands the relevant closure back to the runtime, which
//! invokes it with no borrow held.
//!
//! # Ordering
//!
//! Node IDs are allocated monotonically and never reused, so ID order is
//! creation order. Pending observers are kept in a `BTreeSet` and therefore
//! run in declaration order, and dirty memos are recomputed lowest ID first.
//! A memo can only read nodes that existed when it was created, which makes
//! creation order a valid topological order.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::engine::RenderCx;
use crate::types::ComponentId;

// =============================================================================
// Node Types
// =============================================================================

/// Identifier of a node in a runtime's signal graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

pub(crate) type StoreGetter = Rc<dyn Fn() -> Box<dyn Any>>;
pub(crate) type StoreSetter = Rc<dyn Fn(Box<dyn Any>)>;
pub(crate) type MemoFn = Rc<dyn Fn(&RenderCx<'_>) -> Box<dyn Any>>;
pub(crate) type EffectFn = Rc<dyn Fn(&RenderCx<'_>)>;

/// External observers the render engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObserverKind {
    /// Re-render a component's slot contents.
    Render(ComponentId),
    /// Recompute a window title.
    Title(ComponentId),
    /// Re-evaluate the n-th conditional child of a component.
    Conditional(ComponentId, usize),
}

pub(crate) enum NodeKind {
    Signal {
        value: Box<dyn Any>,
    },
    Store {
        get: StoreGetter,
        set: StoreSetter,
    },
    Memo {
        value: Option<Box<dyn Any>>,
        compute: MemoFn,
        same: fn(&dyn Any, &dyn Any) -> bool,
    },
    Effect {
        run: EffectFn,
    },
    Observer(ObserverKind),
}

pub(crate) struct Node {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub value_type: Option<(TypeId, &'static str)>,
    /// Scope owning this node; `None` is the runtime root.
    pub owner: Option<NodeId>,
    subscribers: BTreeSet<NodeId>,
    sources: BTreeSet<NodeId>,
    /// Sources declared explicitly; they survive re-tracking.
    pinned: BTreeSet<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, owner: Option<NodeId>) -> Self {
        Self {
            kind,
            name: None,
            value_type: None,
            owner,
            subscribers: BTreeSet::new(),
            sources: BTreeSet::new(),
            pinned: BTreeSet::new(),
        }
    }

    pub fn named(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn typed<V: 'static>(mut self) -> Self {
        self.value_type = Some((TypeId::of::<V>(), std::any::type_name::<V>()));
        self
    }
}

/// What a value read needs from the runtime.
pub(crate) enum ReadPlan<'a> {
    /// The value is stored in the graph.
    Stored(&'a dyn Any),
    /// The value has to be fetched from an external store.
    Store(StoreGetter),
    /// A memo that has to be (re)computed first.
    StaleMemo,
}

// =============================================================================
// Graph
// =============================================================================

#[derive(Default)]
pub(crate) struct SignalGraph {
    nodes: Vec<Option<Node>>,
    names: HashMap<String, NodeId>,
    dirty_memos: BTreeSet<NodeId>,
    pending: BTreeSet<NodeId>,
}

impl SignalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------------

    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if let Some(name) = &node.name {
            self.names.insert(name.clone(), id);
        }
        self.nodes.push(Some(node));
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Display name of a node (`internal_<id>` when unnamed).
    pub fn display_name(&self, id: NodeId) -> String {
        self.node(id)
            .and_then(|node| node.name.clone())
            .unwrap_or_else(|| format!("internal_{}", id.0))
    }

    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.owner)
    }

    pub fn observer_kind(&self, id: NodeId) -> Option<ObserverKind> {
        match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Observer(kind)) => Some(*kind),
            _ => None,
        }
    }

    pub fn effect_fn(&self, id: NodeId) -> Option<EffectFn> {
        match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Effect { run }) => Some(run.clone()),
            _ => None,
        }
    }

    pub fn memo_fn(&self, id: NodeId) -> Option<MemoFn> {
        match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Memo { compute, .. }) => Some(compute.clone()),
            _ => None,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    /// Nodes owned directly by `owner`.
    pub fn owned_by(&self, owner: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match node {
                Some(node) if node.owner == Some(owner) => Some(NodeId(index as u32)),
                _ => None,
            })
            .collect()
    }

    /// Remove a node and every edge touching it.
    pub fn remove(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };
        if let Some(name) = &node.name {
            if self.names.get(name) == Some(&id) {
                self.names.remove(name);
            }
        }
        for source in &node.sources {
            if let Some(source) = self.node_mut(*source) {
                source.subscribers.remove(&id);
            }
        }
        for subscriber in &node.subscribers {
            if let Some(subscriber) = self.node_mut(*subscriber) {
                subscriber.sources.remove(&id);
                subscriber.pinned.remove(&id);
            }
        }
        self.pending.remove(&id);
        self.dirty_memos.remove(&id);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.names.clear();
        self.pending.clear();
        self.dirty_memos.clear();
    }

    // -------------------------------------------------------------------------
    // Values
    // -------------------------------------------------------------------------

    pub fn read_plan(&self, id: NodeId) -> Option<ReadPlan<'_>> {
        let node = self.node(id)?;
        Some(match &node.kind {
            NodeKind::Signal { value } => ReadPlan::Stored(&**value),
            NodeKind::Store { get, .. } => ReadPlan::Store(get.clone()),
            NodeKind::Memo { value: Some(value), .. } if !self.dirty_memos.contains(&id) => {
                ReadPlan::Stored(&**value)
            }
            NodeKind::Memo { .. } => ReadPlan::StaleMemo,
            NodeKind::Effect { .. } | NodeKind::Observer(_) => return None,
        })
    }

    /// Replace a signal value in place. Returns false for non-signal nodes.
    pub fn write(&mut self, id: NodeId, new_value: Box<dyn Any>) -> bool {
        match self.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Signal { value }) => {
                *value = new_value;
                true
            }
            _ => false,
        }
    }

    /// Setter of a store node, run by the caller without holding the graph.
    pub fn store_setter(&self, id: NodeId) -> Option<StoreSetter> {
        match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Store { set, .. }) => Some(set.clone()),
            _ => None,
        }
    }

    /// Cached memo value, dirty or not.
    pub fn memo_value(&self, id: NodeId) -> Option<&dyn Any> {
        match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Memo { value: Some(value), .. }) => Some(&**value),
            _ => None,
        }
    }

    pub fn value_type(&self, id: NodeId) -> Option<(TypeId, &'static str)> {
        self.node(id).and_then(|node| node.value_type)
    }

    /// Store a freshly computed memo value. Returns true if it changed.
    pub fn set_memo_value(&mut self, id: NodeId, new_value: Box<dyn Any>) -> bool {
        self.dirty_memos.remove(&id);
        let Some(node) = self.node_mut(id) else { return false };
        let NodeKind::Memo { value, same, .. } = &mut node.kind else { return false };
        let same = *same;
        let changed = match value {
            Some(old) => !same(&**old, &*new_value),
            None => true,
        };
        *value = Some(new_value);
        changed
    }

    /// Clear a memo's dirty mark and keep its cached value.
    pub fn keep_memo_value(&mut self, id: NodeId) {
        self.dirty_memos.remove(&id);
    }

    // -------------------------------------------------------------------------
    // Edges
    // -------------------------------------------------------------------------

    /// Replace the tracked sources of `observer` with `reads` (plus pinned).
    pub fn set_sources(&mut self, observer: NodeId, reads: BTreeSet<NodeId>) {
        let Some(node) = self.node(observer) else { return };
        let old: Vec<NodeId> = node.sources.iter().copied().collect();
        let mut next: BTreeSet<NodeId> = node.pinned.clone();
        next.extend(reads.into_iter().filter(|id| *id != observer && self.contains(*id)));

        for source in old {
            if !next.contains(&source) {
                if let Some(source) = self.node_mut(source) {
                    source.subscribers.remove(&observer);
                }
            }
        }
        for source in &next {
            if let Some(source) = self.node_mut(*source) {
                source.subscribers.insert(observer);
            }
        }
        if let Some(node) = self.node_mut(observer) {
            node.sources = next;
        }
    }

    /// Add an explicit source that stays subscribed across re-tracking.
    pub fn pin(&mut self, observer: NodeId, source: NodeId) {
        if observer == source || !self.contains(source) || !self.contains(observer) {
            return;
        }
        if let Some(node) = self.node_mut(source) {
            node.subscribers.insert(observer);
        }
        if let Some(node) = self.node_mut(observer) {
            node.pinned.insert(source);
            node.sources.insert(source);
        }
    }

    pub fn sources(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.sources.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn subscribers(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Dirty Tracking
    // -------------------------------------------------------------------------

    /// Mark every subscriber of `id` dirty.
    pub fn notify(&mut self, id: NodeId) {
        for subscriber in self.subscribers(id) {
            self.mark(subscriber);
        }
    }

    /// Mark a single node dirty.
    pub fn mark(&mut self, id: NodeId) {
        match self.node(id).map(|node| &node.kind) {
            Some(NodeKind::Memo { .. }) => {
                self.dirty_memos.insert(id);
            }
            Some(NodeKind::Effect { .. }) | Some(NodeKind::Observer(_)) => {
                self.pending.insert(id);
            }
            _ => {}
        }
    }

    pub fn is_memo_dirty(&self, id: NodeId) -> bool {
        self.dirty_memos.contains(&id)
    }

    pub fn next_dirty_memo(&self) -> Option<NodeId> {
        self.dirty_memos.iter().next().copied()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty() || !self.dirty_memos.is_empty()
    }

    pub fn is_pending(&self, id: NodeId) -> bool {
        self.pending.contains(&id)
    }

    /// Take the pending observers in declaration order.
    pub fn take_pending(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
