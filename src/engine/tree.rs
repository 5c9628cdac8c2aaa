//! Component Tree - Arena of mounted components.
//!
//! Manages the lifecycle of component indices:
//! - Free index pool for O(1) reuse
//! - Parent owns the child index list, children keep a plain back-index
//! - Per-index bookkeeping released with the index (tasks, hooks, conditionals)

use std::rc::Rc;

use super::state::ComponentState;
use crate::component::Component;
use crate::reactive::NodeId;
use crate::runtime::ViewRuntime;
use crate::scheduler::TaskHandle;
use crate::types::{ComponentId, SlotIndex, SlotRect};

/// Callback run once when a component unmounts.
pub type UnmountHook = Box<dyn FnOnce(&ViewRuntime)>;

/// Predicate of a conditional child.
pub(crate) type PredicateFn = Rc<dyn Fn(&super::RenderCx<'_>) -> bool>;

/// A `render_when` declaration and what it currently has mounted.
pub(crate) struct Conditional {
    pub node: NodeId,
    pub predicate: PredicateFn,
    pub then_branch: (SlotIndex, Component),
    pub else_branch: Option<(SlotIndex, Component)>,
    pub last: Option<bool>,
    pub mounted: Option<ComponentId>,
}

pub(crate) struct ComponentNode {
    pub component: Component,
    pub parent: Option<ComponentId>,
    pub children: Vec<ComponentId>,
    /// Slot relative to the parent.
    pub slot: SlotIndex,
    /// Absolute rectangle in window coordinates.
    pub rect: SlotRect,
    pub state: Rc<ComponentState>,
    /// Render observer; also the owner of everything the component creates.
    pub scope: NodeId,
    pub title: Option<NodeId>,
    pub conditionals: Vec<Conditional>,
    pub tasks: Vec<TaskHandle>,
    pub animation: Option<TaskHandle>,
    pub unmount_hooks: Vec<UnmountHook>,
}

impl ComponentNode {
    pub fn new(
        component: Component,
        parent: Option<ComponentId>,
        slot: SlotIndex,
        rect: SlotRect,
        state: Rc<ComponentState>,
        scope: NodeId,
        title: Option<NodeId>,
    ) -> Self {
        Self {
            component,
            parent,
            children: Vec::new(),
            slot,
            rect,
            state,
            scope,
            title,
            conditionals: Vec::new(),
            tasks: Vec::new(),
            animation: None,
            unmount_hooks: Vec::new(),
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Default)]
pub(crate) struct ComponentTree {
    nodes: Vec<Option<ComponentNode>>,
    free: Vec<usize>,
    root: Option<ComponentId>,
}

impl ComponentTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next `allocate` will return.
    pub fn vacant_id(&self) -> ComponentId {
        ComponentId(self.free.last().copied().unwrap_or(self.nodes.len()))
    }

    pub fn allocate(&mut self, node: ComponentNode) -> ComponentId {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                ComponentId(index)
            }
            None => {
                self.nodes.push(Some(node));
                ComponentId(self.nodes.len() - 1)
            }
        }
    }

    /// Remove a node, detaching it from its parent.
    pub fn release(&mut self, id: ComponentId) -> Option<ComponentNode> {
        let node = self.nodes.get_mut(id.0).and_then(Option::take)?;
        if let Some(parent) = node.parent.and_then(|parent| self.get_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
        self.free.push(id.0);

        // All released: start over with a compact arena.
        if self.nodes.iter().all(Option::is_none) {
            self.nodes.clear();
            self.free.clear();
        }
        Some(node)
    }

    pub fn get(&self, id: ComponentId) -> Option<&ComponentNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut ComponentNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn root(&self) -> Option<ComponentId> {
        self.root
    }

    pub fn set_root(&mut self, id: ComponentId) {
        self.root = Some(id);
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    /// First mounted component with this ID, in index order.
    pub fn find(&self, id: &str) -> Option<ComponentId> {
        self.nodes.iter().enumerate().find_map(|(index, node)| match node {
            Some(node) if node.component.id() == id => Some(ComponentId(index)),
            _ => None,
        })
    }

    /// True if `ancestor` is `node` or one of its parents.
    pub fn is_ancestor_or_self(&self, ancestor: ComponentId, node: ComponentId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(|node| node.parent);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentKind, Group};
    use crate::engine::state::StateKey;

    fn node(id: &str, parent: Option<ComponentId>) -> ComponentNode {
        let component: Component = Group::builder(id, 1, 1).build().into();
        let state = Rc::new(ComponentState::new(StateKey {
            parent,
            slot: 0,
            kind: ComponentKind::Group,
            id: id.to_string(),
        }));
        ComponentNode::new(component, parent, 0, SlotRect::new(0, 0, 1, 1), state, NodeId(0), None)
    }

    fn add(tree: &mut ComponentTree, id: &str, parent: Option<ComponentId>) -> ComponentId {
        let index = tree.allocate(node(id, parent));
        if let Some(parent) = parent.and_then(|parent| tree.get_mut(parent)) {
            parent.children.push(index);
        }
        index
    }

    #[test]
    fn test_allocate_and_find() {
        let mut tree = ComponentTree::new();
        let root = add(&mut tree, "root", None);
        let child = add(&mut tree, "child", Some(root));

        assert_eq!(tree.find("child"), Some(child));
        assert_eq!(tree.find("missing"), None);
        assert_eq!(tree.get(root).map(|node| node.children.clone()), Some(vec![child]));
    }

    #[test]
    fn test_release_reuses_index() {
        let mut tree = ComponentTree::new();
        let root = add(&mut tree, "root", None);
        let first = add(&mut tree, "a", Some(root));

        assert_eq!(tree.vacant_id(), ComponentId(2));
        tree.release(first);
        assert!(tree.get(root).is_some_and(|node| node.children.is_empty()));
        assert_eq!(tree.vacant_id(), first);
        assert_eq!(add(&mut tree, "b", Some(root)), first);
    }

    #[test]
    fn test_release_last_compacts() {
        let mut tree = ComponentTree::new();
        let root = add(&mut tree, "root", None);
        tree.set_root(root);
        tree.release(root);

        assert_eq!(tree.root(), None);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.vacant_id(), ComponentId(0));
    }

    #[test]
    fn test_ancestor_query() {
        let mut tree = ComponentTree::new();
        let root = add(&mut tree, "root", None);
        let group = add(&mut tree, "group", Some(root));
        let leaf = add(&mut tree, "leaf", Some(group));
        let other = add(&mut tree, "other", Some(root));

        assert!(tree.is_ancestor_or_self(root, leaf));
        assert!(tree.is_ancestor_or_self(leaf, leaf));
        assert!(!tree.is_ancestor_or_self(other, leaf));
        assert!(!tree.is_ancestor_or_self(leaf, root));
    }
}
