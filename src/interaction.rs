//! Interaction Dispatch - Routes inbound clicks to the owning component.
//!
//! # Pattern
//!
//! - The slot grid maps the clicked slot to a mounted leaf
//! - Empty slots and icons only reach the window and router callbacks
//! - Events addressed to another viewer propagate untouched
//! - Button callbacks run in registration order inside one batch, then the
//!   window's callbacks, then the router callbacks; the first `Cancel`
//!   short-circuits the rest
//! - A panicking callback is logged and counts as `Propagate`
//! - Writes made by callbacks are flushed before `dispatch` returns
//! - The button's sound plays and its animation (re)starts on every click
//!
//! # Example
//!
//! ```ignore
//! let result = rt.dispatch(&InteractionEvent::new(viewer, 13, ClickKind::Primary));
//! if result.is_cancelled() {
//!     platform_event.set_cancelled(true);
//! }
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{error, trace};

use crate::component::Component;
use crate::reactive::graph::NodeId;
use crate::runtime::ViewRuntime;
use crate::types::{SlotIndex, ViewerId};

/// How the slot was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Primary,
    Secondary,
    Middle,
    /// Number key pressed while hovering, with the hotbar index.
    Hotbar(u8),
    Drop,
    DoubleClick,
}

/// A click on a slot of the viewer's open window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionEvent {
    pub viewer: ViewerId,
    pub slot: SlotIndex,
    pub action: ClickKind,
    pub shift: bool,
}

impl InteractionEvent {
    pub fn new(viewer: ViewerId, slot: SlotIndex, action: ClickKind) -> Self {
        Self {
            viewer,
            slot,
            action,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.action == ClickKind::Primary
    }

    pub fn is_secondary(&self) -> bool {
        self.action == ClickKind::Secondary
    }
}

/// What happens to the platform event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPolicy {
    /// Let the platform handle it.
    #[default]
    Propagate,
    /// Swallow it.
    Cancel,
}

/// Outcome of one interaction callback, or of a whole dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionResult {
    pub policy: EventPolicy,
    /// Re-render the handling component even if none of its sources changed.
    pub rerender: bool,
}

impl InteractionResult {
    pub fn cancel() -> Self {
        Self {
            policy: EventPolicy::Cancel,
            rerender: false,
        }
    }

    pub fn propagate() -> Self {
        Self::default()
    }

    pub fn with_rerender(mut self) -> Self {
        self.rerender = true;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.policy == EventPolicy::Cancel
    }
}

/// Button interaction callback.
pub type InteractionCallback = Rc<dyn Fn(&ViewRuntime, &InteractionEvent) -> InteractionResult>;

impl ViewRuntime {
    /// Route `event` to the component drawing into its slot, then to the
    /// window and router callbacks of the open view.
    pub fn dispatch(&self, event: &InteractionEvent) -> InteractionResult {
        if self.is_closed() {
            return InteractionResult::propagate();
        }
        if event.viewer != self.viewer() {
            trace!(viewer = %event.viewer, runtime_viewer = %self.viewer(), "interaction for another viewer");
            return InteractionResult::propagate();
        }

        let target = self
            .component_at(event.slot)
            .and_then(|id| self.with_node(id, |node| (id, node.component.clone(), node.scope)));
        let button = match &target {
            Some((id, Component::Button(button), scope)) => Some((*id, button.clone(), *scope)),
            Some(_) => None,
            None => {
                trace!(slot = event.slot, "interaction on empty slot");
                None
            }
        };
        let view_handlers = self.inner.view_handlers.borrow().clone();
        let view_scope = self.root().and_then(|root| self.with_node(root, |node| node.scope));

        let mut outcome = InteractionResult::propagate();
        self.batch(|| {
            if let Some((_, button, scope)) = &button {
                if self.run_handlers(button.id(), &button.interact, *scope, event, &mut outcome) {
                    return;
                }
            }
            if let Some(scope) = view_scope {
                self.run_handlers("<view>", &view_handlers, scope, event, &mut outcome);
            }
        });

        let Some((id, button, _)) = button else {
            trace!(slot = event.slot, ?outcome, "dispatched to view");
            return outcome;
        };

        if let Some(sound) = &button.sound {
            match catch_unwind(AssertUnwindSafe(|| sound(self))) {
                Ok(Some(sound)) => self.inner.presenter.play_sound(self.inner.viewer, &sound),
                Ok(None) => {}
                Err(_) => error!(component = %button.id(), "sound callback panicked"),
            }
        }

        if let Some(animation) = button.animation() {
            // The callbacks may have unmounted the button.
            let still_mounted = self
                .with_node(id, |node| node.component.same(&Component::Button(button.clone())))
                .unwrap_or(false);
            if still_mounted {
                self.play_animation(id, animation.clone());
            }
        }

        trace!(component = %button.id(), ?outcome, "dispatched");
        outcome
    }

    /// Run `handlers` in order until one cancels. Returns true on cancel.
    fn run_handlers(
        &self,
        owner: &str,
        handlers: &[InteractionCallback],
        scope: NodeId,
        event: &InteractionEvent,
        outcome: &mut InteractionResult,
    ) -> bool {
        for callback in handlers {
            let result = catch_unwind(AssertUnwindSafe(|| callback(self, event))).unwrap_or_else(|_| {
                error!(owner, slot = event.slot, "interaction handler panicked");
                InteractionResult::propagate()
            });
            if result.rerender {
                outcome.rerender = true;
                self.mark_dirty(scope);
            }
            if result.is_cancelled() {
                outcome.policy = EventPolicy::Cancel;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_constructors() {
        assert!(InteractionResult::cancel().is_cancelled());
        assert!(!InteractionResult::propagate().is_cancelled());
        assert!(InteractionResult::cancel().with_rerender().rerender);
    }

    #[test]
    fn test_event_helpers() {
        let event = InteractionEvent::new(ViewerId(2), 4, ClickKind::Secondary).with_shift();
        assert!(event.shift);
        assert!(event.is_secondary());
        assert!(!event.is_primary());
    }
}
