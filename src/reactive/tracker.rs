//! Explicit dependency tracking.
//!
//! Every callback that may subscribe (render, title, predicate, effect, memo)
//! receives a context carrying a [`Tracker`]. Reads made through that context
//! are collected here and committed as the observer's sources once the
//! callback returns.

use std::cell::RefCell;
use std::collections::BTreeSet;

use super::graph::NodeId;
use crate::runtime::ViewRuntime;

/// Collects the nodes read by one observer run.
pub struct Tracker {
    observer: NodeId,
    reads: RefCell<BTreeSet<NodeId>>,
}

impl Tracker {
    pub(crate) fn new(observer: NodeId) -> Self {
        Self {
            observer,
            reads: RefCell::new(BTreeSet::new()),
        }
    }

    pub(crate) fn observer(&self) -> NodeId {
        self.observer
    }

    pub(crate) fn record(&self, source: NodeId) {
        self.reads.borrow_mut().insert(source);
    }

    pub(crate) fn take(&self) -> BTreeSet<NodeId> {
        std::mem::take(&mut *self.reads.borrow_mut())
    }

    /// Number of distinct nodes read so far.
    pub fn len(&self) -> usize {
        self.reads.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.borrow().is_empty()
    }
}

/// Anything signals can be read and written through.
///
/// Implemented by [`ViewRuntime`] (untracked), the construct context
/// (untracked) and the render context (tracked).
pub trait SignalContext {
    /// Runtime owning the signals.
    fn runtime(&self) -> &ViewRuntime;

    /// Tracker receiving reads, if this context subscribes.
    fn tracker(&self) -> Option<&Tracker> {
        None
    }
}

impl SignalContext for ViewRuntime {
    fn runtime(&self) -> &ViewRuntime {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_collects_unique_reads() {
        let tracker = Tracker::new(NodeId(9));
        tracker.record(NodeId(2));
        tracker.record(NodeId(1));
        tracker.record(NodeId(2));

        assert_eq!(tracker.observer(), NodeId(9));
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.take().into_iter().collect::<Vec<_>>(), vec![NodeId(1), NodeId(2)]);
        assert!(tracker.is_empty());
    }
}
