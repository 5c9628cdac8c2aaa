//! Mount and unmount.
//!
//! # Mount
//!
//! 1. Validate the rectangle against the parent and mounted siblings
//! 2. Allocate the arena index, the render observer (scope) and, for windows,
//!    the title observer
//! 3. Claim the slot grid cells (leaves only)
//! 4. Run construct; on error the partial subtree is unmounted again
//! 5. Pin declared dependencies and queue the first render
//!
//! # Unmount
//!
//! Children first (reverse declaration order), then tasks and the running
//! animation are cancelled, unmount hooks run, the graph scope is released
//! and the slots are cleared.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, error, warn};

use super::state::{ComponentState, StateKey};
use super::tree::ComponentNode;
use super::ConstructCx;
use crate::component::{Component, Window};
use crate::error::{MenuError, Result};
use crate::reactive::graph::{Node, NodeKind, ObserverKind};
use crate::runtime::ViewRuntime;
use crate::types::{ComponentId, SlotIndex, SlotRect, StateFlags};

impl ViewRuntime {
    /// Mount a window as the root of this runtime.
    pub(crate) fn mount_root(&self, window: Rc<Window>) -> Result<ComponentId> {
        let window_type = window.window_type();
        let rect = SlotRect::new(0, 0, window_type.columns(), window_type.rows());
        let id = self.mount(None, 0, Component::Window(window), rect)?;
        self.inner.tree.borrow_mut().set_root(id);
        Ok(id)
    }

    /// Mount `component` at `slot` inside `parent`.
    pub(crate) fn mount_child(
        &self,
        parent: ComponentId,
        slot: SlotIndex,
        component: Component,
    ) -> Result<ComponentId> {
        let rect = self.child_rect(parent, slot, &component, true)?;
        self.mount(Some(parent), slot, component, rect)
    }

    /// Absolute rectangle `component` would occupy at `slot` inside `parent`.
    ///
    /// `check_siblings` also rejects overlap with currently mounted siblings.
    pub(crate) fn child_rect(
        &self,
        parent: ComponentId,
        slot: SlotIndex,
        component: &Component,
        check_siblings: bool,
    ) -> Result<SlotRect> {
        let tree = self.inner.tree.borrow();
        let Some(parent_node) = tree.get(parent) else {
            return Err(MenuError::RuntimeClosed);
        };
        let parent_id = parent_node.component.id();

        if let Component::Window(window) = component {
            return Err(MenuError::NestedWindow {
                window: window.id().to_string(),
                parent: parent_id.to_string(),
            });
        }

        let bounds = parent_node.rect;
        let out_of_bounds = || {
            warn!(component = %component.id(), slot, parent = %parent_id, "component out of bounds");
            MenuError::OutOfBounds {
                component: component.id().to_string(),
                slot,
                parent: parent_id.to_string(),
            }
        };

        let row = slot / bounds.width.max(1) as usize;
        let column = slot % bounds.width.max(1) as usize;
        if row >= bounds.height as usize {
            return Err(out_of_bounds());
        }
        let rect = SlotRect::new(
            bounds.column + column as u16,
            bounds.row + row as u16,
            component.width(),
            component.height(),
        );
        if !bounds.contains(&rect) {
            return Err(out_of_bounds());
        }

        if check_siblings {
            for sibling in parent_node.children.iter().filter_map(|child| tree.get(*child)) {
                if sibling.rect.intersects(&rect) {
                    warn!(
                        component = %component.id(),
                        slot,
                        sibling = %sibling.component.id(),
                        "layout conflict"
                    );
                    return Err(MenuError::LayoutConflict {
                        component: component.id().to_string(),
                        slot,
                        sibling: sibling.component.id().to_string(),
                    });
                }
            }
        }
        Ok(rect)
    }

    fn mount(
        &self,
        parent: Option<ComponentId>,
        slot: SlotIndex,
        component: Component,
        rect: SlotRect,
    ) -> Result<ComponentId> {
        if self.is_closed() {
            return Err(MenuError::RuntimeClosed);
        }

        let id = self.inner.tree.borrow().vacant_id();
        let parent_scope = parent.and_then(|parent| self.scope_of(parent));

        let (scope, title) = {
            let mut graph = self.inner.graph.borrow_mut();
            let scope = graph.insert(Node::new(NodeKind::Observer(ObserverKind::Render(id)), parent_scope));
            let title = matches!(component, Component::Window(_))
                .then(|| graph.insert(Node::new(NodeKind::Observer(ObserverKind::Title(id)), Some(scope))));
            (scope, title)
        };

        let state = Rc::new(ComponentState::new(StateKey {
            parent,
            slot,
            kind: component.kind(),
            id: component.id().to_string(),
        }));
        state.insert_flags(StateFlags::MOUNTED);

        {
            let mut tree = self.inner.tree.borrow_mut();
            let node = ComponentNode::new(component.clone(), parent, slot, rect, state.clone(), scope, title);
            let allocated = tree.allocate(node);
            debug_assert_eq!(allocated, id);
            if let Some(parent) = parent.and_then(|parent| tree.get_mut(parent)) {
                parent.children.push(id);
            }
        }
        if component.is_leaf() {
            self.inner.grid.borrow_mut().fill_rect(&rect, id);
        }
        debug!(component = %component.id(), kind = ?component.kind(), index = id.index(), "mounted");

        if let Some(construct) = component.construct_fn() {
            let cx = ConstructCx::new(self, id);
            if let Err(err) = construct(&cx) {
                debug!(component = %component.id(), %err, "construct failed, rolling back");
                self.unmount(id);
                return Err(err);
            }
        }
        state.insert_flags(StateFlags::CONSTRUCTED);

        let observer = title.unwrap_or(scope);
        for declared in component.declared_signals() {
            self.pin_source(observer, declared);
        }

        self.mark_dirty(scope);
        if let Some(title) = title {
            self.mark_dirty(title);
        }
        Ok(id)
    }

    /// Tear a component and its subtree down.
    pub(crate) fn unmount(&self, id: ComponentId) {
        let children = self.with_node(id, |node| node.children.clone());
        let Some(children) = children else { return };
        for child in children.into_iter().rev() {
            self.unmount(child);
        }

        let taken = self.with_node_mut(id, |node| {
            let mut tasks = std::mem::take(&mut node.tasks);
            tasks.extend(node.animation.take());
            (tasks, std::mem::take(&mut node.unmount_hooks))
        });
        let Some((tasks, hooks)) = taken else { return };
        for task in tasks {
            self.cancel_task(task);
        }
        for hook in hooks {
            if catch_unwind(AssertUnwindSafe(|| hook(self))).is_err() {
                error!(component = id.index(), "unmount hook panicked");
            }
        }

        let Some(node) = self.inner.tree.borrow_mut().release(id) else { return };
        self.release_scope(node.scope);

        if node.component.is_leaf() {
            self.inner.grid.borrow_mut().clear_component(id);
            if !self.is_closed() {
                let columns = self.inner.grid.borrow().columns();
                for slot in node.rect.slots(columns) {
                    self.inner.presenter.set_slot(self.inner.viewer, slot, None);
                }
            }
        }

        node.state.set_frame(None);
        node.state.remove_flags(StateFlags::MOUNTED | StateFlags::ANIMATING);
        node.state.insert_flags(StateFlags::UNMOUNTED);
        debug!(component = %node.component.id(), index = id.index(), "unmounted");
    }
}
