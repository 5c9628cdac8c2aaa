//! Dispatcher - Routes raw platform clicks to viewer runtimes.
//!
//! The host reports clicks as raw slot numbers, which may be negative
//! (outside the window) or past the top inventory (the player's own slots).
//! Those propagate untouched; everything else goes to the viewer's runtime.
//!
//! # API
//!
//! - `attach(runtime)` - Route the runtime's viewer to it
//! - `detach(viewer)` - Stop routing, returning the runtime
//! - `runtime(viewer)` - Currently attached runtime
//! - `dispatch(raw)` - Translate and dispatch one click
//!
//! # Example
//!
//! ```ignore
//! let dispatcher = Dispatcher::new();
//! dispatcher.attach(rt.clone());
//!
//! let result = dispatcher.dispatch(&RawInteraction::new(ViewerId(1), -999, ClickKind::Primary));
//! assert!(!result.is_cancelled());
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::trace;

use crate::interaction::{ClickKind, InteractionEvent, InteractionResult};
use crate::runtime::ViewRuntime;
use crate::types::ViewerId;

/// A click as the platform reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInteraction {
    pub viewer: ViewerId,
    pub raw_slot: i32,
    pub action: ClickKind,
    pub shift: bool,
}

impl RawInteraction {
    pub fn new(viewer: ViewerId, raw_slot: i32, action: ClickKind) -> Self {
        Self {
            viewer,
            raw_slot,
            action,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Viewer to runtime routing table.
#[derive(Default)]
pub struct Dispatcher {
    runtimes: RefCell<HashMap<ViewerId, ViewRuntime>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route clicks of the runtime's viewer to it. Returns the runtime it replaced.
    pub fn attach(&self, runtime: ViewRuntime) -> Option<ViewRuntime> {
        self.runtimes.borrow_mut().insert(runtime.viewer(), runtime)
    }

    pub fn detach(&self, viewer: ViewerId) -> Option<ViewRuntime> {
        self.runtimes.borrow_mut().remove(&viewer)
    }

    pub fn runtime(&self, viewer: ViewerId) -> Option<ViewRuntime> {
        self.runtimes.borrow().get(&viewer).cloned()
    }

    /// Attached viewers, in no particular order.
    pub fn viewers(&self) -> Vec<ViewerId> {
        self.runtimes.borrow().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.runtimes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.borrow().is_empty()
    }

    /// Translate `raw` and hand it to the viewer's runtime.
    pub fn dispatch(&self, raw: &RawInteraction) -> InteractionResult {
        let runtime = self.runtime(raw.viewer);
        let Some(runtime) = runtime else {
            trace!(viewer = %raw.viewer, "no runtime for viewer");
            return InteractionResult::propagate();
        };
        let Some(slot) = translate(raw.raw_slot, runtime.window_size()) else {
            trace!(viewer = %raw.viewer, raw_slot = raw.raw_slot, "click outside window");
            return InteractionResult::propagate();
        };

        let mut event = InteractionEvent::new(raw.viewer, slot, raw.action);
        event.shift = raw.shift;
        runtime.dispatch(&event)
    }
}

/// Window slot of a raw slot number, if it lies inside the window.
fn translate(raw_slot: i32, window_size: usize) -> Option<usize> {
    let slot = usize::try_from(raw_slot).ok()?;
    (slot < window_size).then_some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_bounds() {
        assert_eq!(translate(-1, 27), None);
        assert_eq!(translate(-999, 27), None);
        assert_eq!(translate(0, 27), Some(0));
        assert_eq!(translate(26, 27), Some(26));
        assert_eq!(translate(27, 27), None);
        assert_eq!(translate(3, 0), None);
    }

    #[test]
    fn test_unknown_viewer_propagates() {
        let dispatcher = Dispatcher::new();
        let result = dispatcher.dispatch(&RawInteraction::new(ViewerId(9), 0, ClickKind::Primary));
        assert!(!result.is_cancelled());
        assert!(dispatcher.is_empty());
    }
}
