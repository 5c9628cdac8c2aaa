//! Tick Scheduler - A manually advanced clock.
//!
//! Tasks are kept in a `BTreeMap` keyed by handle, so tasks due on the same
//! tick fire in scheduling order.
//!
//! # Reentrancy
//!
//! A running task may schedule or cancel other tasks, including itself. The
//! callback is taken out of its entry while it runs and only put back if the
//! entry still exists afterwards, so a task cancelled mid-run is dropped.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use tracing::trace;

use super::{Scheduler, TaskControl, TaskFn, TaskHandle};

struct TaskEntry {
    interval: u64,
    next_due: u64,
    callback: Option<TaskFn>,
}

/// A [`Scheduler`] driven by explicit calls to [`TickScheduler::tick`].
pub struct TickScheduler {
    now: Cell<u64>,
    next_handle: Cell<u64>,
    tasks: RefCell<BTreeMap<TaskHandle, TaskEntry>>,
}

impl Default for TickScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            now: Cell::new(0),
            next_handle: Cell::new(0),
            tasks: RefCell::new(BTreeMap::new()),
        }
    }

    /// Current tick.
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Number of scheduled tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Advance the clock by one tick and run every task that is due.
    ///
    /// Returns the number of callbacks that ran.
    pub fn tick(&self) -> usize {
        let now = self.now.get() + 1;
        self.now.set(now);

        let due: Vec<TaskHandle> = self
            .tasks
            .borrow()
            .iter()
            .filter(|(_, entry)| entry.next_due <= now && entry.callback.is_some())
            .map(|(handle, _)| *handle)
            .collect();

        let mut ran = 0;
        for handle in due {
            // Take the callback out so the task can touch the scheduler.
            let callback = {
                let mut tasks = self.tasks.borrow_mut();
                match tasks.get_mut(&handle) {
                    Some(entry) => entry.callback.take(),
                    None => None,
                }
            };
            let Some(mut callback) = callback else { continue };

            trace!(task = handle.0, tick = now, "running task");
            let control = callback();
            ran += 1;

            let mut tasks = self.tasks.borrow_mut();
            match control {
                TaskControl::Continue => {
                    if let Some(entry) = tasks.get_mut(&handle) {
                        entry.callback = Some(callback);
                        entry.next_due = now + entry.interval;
                    }
                }
                TaskControl::Stop => {
                    tasks.remove(&handle);
                }
            }
        }
        ran
    }

    /// Advance the clock by `ticks` ticks.
    pub fn advance(&self, ticks: u64) -> usize {
        (0..ticks).map(|_| self.tick()).sum()
    }
}

impl Scheduler for TickScheduler {
    fn schedule_repeating(&self, interval: u64, delay: u64, task: TaskFn) -> TaskHandle {
        let handle = TaskHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);

        let interval = interval.max(1);
        self.tasks.borrow_mut().insert(
            handle,
            TaskEntry {
                interval,
                next_due: self.now.get() + delay.max(1),
                callback: Some(task),
            },
        );
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        self.tasks.borrow_mut().remove(&handle);
    }

    fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.borrow().contains_key(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn counting_task(count: Rc<Cell<u32>>) -> TaskFn {
        Box::new(move || {
            count.set(count.get() + 1);
            TaskControl::Continue
        })
    }

    #[test]
    fn test_interval_fires_on_schedule() {
        let scheduler = TickScheduler::new();
        let count = Rc::new(Cell::new(0));

        scheduler.schedule_repeating(2, 2, counting_task(count.clone()));

        scheduler.tick();
        assert_eq!(count.get(), 0);
        scheduler.tick();
        assert_eq!(count.get(), 1);
        scheduler.tick();
        assert_eq!(count.get(), 1);
        scheduler.tick();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_stop_removes_task() {
        let scheduler = TickScheduler::new();
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        let handle = scheduler.schedule_repeating(
            1,
            1,
            Box::new(move || {
                runs_clone.set(runs_clone.get() + 1);
                if runs_clone.get() == 2 { TaskControl::Stop } else { TaskControl::Continue }
            }),
        );

        scheduler.advance(5);
        assert_eq!(runs.get(), 2);
        assert!(!scheduler.is_scheduled(handle));
    }

    #[test]
    fn test_cancel_prevents_runs() {
        let scheduler = TickScheduler::new();
        let count = Rc::new(Cell::new(0));

        let handle = scheduler.schedule_repeating(1, 1, counting_task(count.clone()));
        scheduler.tick();
        scheduler.cancel(handle);
        scheduler.advance(3);

        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_cancel_unknown_handle_is_noop() {
        let scheduler = TickScheduler::new();
        scheduler.cancel(TaskHandle(42));

        let handle = scheduler.schedule_repeating(1, 1, Box::new(|| TaskControl::Stop));
        scheduler.tick();
        scheduler.cancel(handle);
        assert_eq!(scheduler.task_count(), 0);
    }

    #[test]
    fn test_task_cancelling_itself() {
        let scheduler = Rc::new(TickScheduler::new());
        let handle_cell: Rc<Cell<Option<TaskHandle>>> = Rc::new(Cell::new(None));
        let count = Rc::new(Cell::new(0));

        let sched = scheduler.clone();
        let cell = handle_cell.clone();
        let count_clone = count.clone();
        let handle = scheduler.schedule_repeating(
            1,
            1,
            Box::new(move || {
                count_clone.set(count_clone.get() + 1);
                if let Some(handle) = cell.get() {
                    sched.cancel(handle);
                }
                TaskControl::Continue
            }),
        );
        handle_cell.set(Some(handle));

        scheduler.advance(3);
        assert_eq!(count.get(), 1);
        assert!(!scheduler.is_scheduled(handle));
    }

    #[test]
    fn test_task_scheduled_during_tick_waits() {
        let scheduler = Rc::new(TickScheduler::new());
        let inner_runs = Rc::new(Cell::new(0));

        let sched = scheduler.clone();
        let inner = inner_runs.clone();
        scheduler.schedule_repeating(
            1,
            1,
            Box::new(move || {
                sched.schedule_repeating(1, 1, counting_task(inner.clone()));
                TaskControl::Stop
            }),
        );

        scheduler.tick();
        assert_eq!(inner_runs.get(), 0);
        scheduler.tick();
        assert_eq!(inner_runs.get(), 1);
    }
}
