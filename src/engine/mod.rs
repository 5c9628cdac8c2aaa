//! Render Engine - Component arena, slot grid and the construct/render cycle.
//!
//! The engine manages the core data structures:
//! - Tree: arena of mounted components, parent/child indices, per-index bookkeeping
//! - Slots: slot-to-component grid used by interaction dispatch
//! - State: cached render output, reused across renders of one mount
//! - Construct: one-time declaration of children and reactive state
//! - Render: recomputation of dirty observers
//!
//! # Architecture
//!
//! Components are mounted into an arena and addressed by [`ComponentId`]:
//!
//! ```text
//! Index 0: Window "counter" (parent=-, rect=0,0 9x1, scope=#0)
//! Index 1: Button "count_down" (parent=0, rect=3,0 1x1, scope=#2)
//! Index 2: Button "count_up"   (parent=0, rect=5,0 1x1, scope=#3)
//! ```
//!
//! Each mounted component owns one render observer in the signal graph. That
//! node doubles as the ownership scope for everything the component creates,
//! so unmounting releases one subtree of the graph.

mod construct;
mod mount;
mod render;
mod slots;
pub(crate) mod state;
pub(crate) mod tree;

pub use construct::ConstructCx;
pub use render::{EffectCx, RenderCx};
pub use state::{ComponentState, StateKey};
pub use tree::UnmountHook;

pub(crate) use slots::SlotGrid;
pub(crate) use tree::ComponentTree;

use tracing::warn;

use crate::reactive::graph::{NodeId, ObserverKind};
use crate::reactive::SignalRef;
use crate::runtime::ViewRuntime;
use crate::types::ComponentId;
use tree::ComponentNode;

impl ViewRuntime {
    /// Run `f` against a mounted node. No user code may run inside `f`.
    pub(crate) fn with_node<R>(&self, id: ComponentId, f: impl FnOnce(&ComponentNode) -> R) -> Option<R> {
        self.inner.tree.borrow().get(id).map(f)
    }

    pub(crate) fn with_node_mut<R>(
        &self,
        id: ComponentId,
        f: impl FnOnce(&mut ComponentNode) -> R,
    ) -> Option<R> {
        self.inner.tree.borrow_mut().get_mut(id).map(f)
    }

    /// Render observer (and ownership scope) of a component.
    pub(crate) fn scope_of(&self, id: ComponentId) -> Option<NodeId> {
        self.with_node(id, |node| node.scope)
    }

    /// Component whose scope `node` lives in; `None` for the runtime root.
    pub(crate) fn scope_component(&self, node: NodeId) -> Option<ComponentId> {
        let graph = self.inner.graph.borrow();
        let mut current = node;
        loop {
            if let Some(kind) = graph.observer_kind(current) {
                return Some(match kind {
                    ObserverKind::Render(id) | ObserverKind::Title(id) | ObserverKind::Conditional(id, _) => id,
                });
            }
            current = graph.owner(current)?;
        }
    }

    /// Remove `scope` and every node it transitively owns.
    pub(crate) fn release_scope(&self, scope: NodeId) {
        let mut graph = self.inner.graph.borrow_mut();
        let mut stack = vec![scope];
        let mut released = Vec::new();
        while let Some(node) = stack.pop() {
            released.push(node);
            stack.extend(graph.owned_by(node));
        }
        for node in released {
            graph.remove(node);
        }
    }

    /// Subscribe `observer` to a declared dependency permanently.
    pub(crate) fn pin_source(&self, observer: NodeId, signal: &SignalRef) {
        let source = match signal {
            SignalRef::Handle(id) => {
                self.assert_owned(id.runtime);
                Some(id.node)
            }
            SignalRef::Name(name) => self.inner.graph.borrow().lookup(name),
        };
        match source {
            Some(source) => {
                self.assert_visible(observer, source);
                self.inner.graph.borrow_mut().pin(observer, source);
            }
            None => warn!(?signal, "declared dependency does not exist"),
        }
    }
}
