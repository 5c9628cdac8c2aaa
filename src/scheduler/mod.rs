//! Scheduler Adapter - Contract over an external periodic tick source.
//!
//! The runtime never blocks. Anything that has to happen "later" (interval
//! tasks, animation steps) is a closure scheduled on a [`Scheduler`] that
//! fires on the same cooperative thread as everything else.
//!
//! # Pattern
//!
//! - A task returns [`TaskControl::Continue`] to keep running, `Stop` to end
//! - The [`TaskHandle`] is owned by whoever scheduled the task (a component,
//!   an animation, the runtime) and cancelled on teardown
//! - Cancelling an unknown or finished handle is a no-op
//!
//! [`TickScheduler`] is a manually advanced clock implementing the contract,
//! used by tests and demos in place of the host's real tick loop.

mod tick;

pub use tick::TickScheduler;

/// What a scheduled task wants after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskControl {
    /// Run again after the next interval.
    Continue,
    /// Remove the task.
    Stop,
}

/// Opaque handle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub(crate) u64);

impl TaskHandle {
    /// Raw task number, for diagnostics.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Boxed task callback.
pub type TaskFn = Box<dyn FnMut() -> TaskControl>;

/// A periodic tick source.
///
/// Callbacks must fire on the single cooperative timeline, never concurrently
/// with other dispatched work.
pub trait Scheduler {
    /// Run `task` every `interval` ticks, first after `delay` ticks.
    ///
    /// An `interval` of 0 is treated as 1.
    fn schedule_repeating(&self, interval: u64, delay: u64, task: TaskFn) -> TaskHandle;

    /// Cancel a task. Unknown or already finished handles are ignored.
    fn cancel(&self, handle: TaskHandle);

    /// True while the task is scheduled.
    fn is_scheduled(&self, handle: TaskHandle) -> bool;
}
