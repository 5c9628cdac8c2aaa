//! Animation Engine - Timed frame sequences played on a component.
//!
//! An animation is an ordered list of frames, each shown for a number of
//! ticks. While it plays, the frame payload overrides the component's icon.
//!
//! # Timing
//!
//! Every scheduler tick increments `elapsed`. When it exceeds the current
//! frame's duration, the index advances and `elapsed` restarts at 1. Running
//! past the last frame wraps for looped animations and stops otherwise:
//!
//! ```text
//! frames [(1, X), (1, Y)]
//! tick 1: index 0, elapsed 1 -> render X
//! tick 2: index 1, elapsed 1 -> render Y
//! tick 3: index 2            -> stop, no render
//! ```
//!
//! Stopping clears the override and queues a normal render for the next pass.
//! Unmount, a restart or runtime close cancels the task, so an animation
//! never ticks after its component is gone.
//!
//! # Example
//!
//! ```ignore
//! Button::builder("count_up")
//!     .animation(Animation::new(vec![
//!         Frame::new(1, "minecraft:cyan_concrete"),
//!         Frame::new(1, "minecraft:lime_concrete"),
//!     ]))
//!     .build();
//! ```

use std::cell::Cell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, error};

use crate::runtime::ViewRuntime;
use crate::scheduler::{TaskControl, TaskFn, TaskHandle};
use crate::types::{ComponentId, SlotContent, StateFlags};

// =============================================================================
// Frames
// =============================================================================

enum Payload {
    Item(String),
    Content(SlotContent),
}

/// One frame of an animation.
pub struct Frame {
    duration: u64,
    payload: Payload,
    configure: Option<Rc<dyn Fn(SlotContent) -> SlotContent>>,
}

impl Frame {
    /// Show `item` (built by the runtime's content builder) for `duration` ticks.
    pub fn new(duration: u64, item: impl Into<String>) -> Self {
        Self {
            duration: duration.max(1),
            payload: Payload::Item(item.into()),
            configure: None,
        }
    }

    /// Show prebuilt content for `duration` ticks.
    pub fn content(duration: u64, content: SlotContent) -> Self {
        Self {
            duration: duration.max(1),
            payload: Payload::Content(content),
            configure: None,
        }
    }

    /// Adjust the built content (name, lore, amount).
    pub fn configure(mut self, configure: impl Fn(SlotContent) -> SlotContent + 'static) -> Self {
        self.configure = Some(Rc::new(configure));
        self
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    fn render(&self, rt: &ViewRuntime) -> SlotContent {
        let content = match &self.payload {
            Payload::Item(item) => rt.content_builder().create(item),
            Payload::Content(content) => content.clone(),
        };
        match &self.configure {
            Some(configure) => configure(content),
            None => content,
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = match &self.payload {
            Payload::Item(item) => item.as_str(),
            Payload::Content(content) => content.item.as_str(),
        };
        write!(f, "Frame({}, {})", self.duration, payload)
    }
}

// =============================================================================
// Animation
// =============================================================================

/// Ordered frames with an optional loop flag and completion hook.
pub struct Animation {
    frames: Vec<Frame>,
    looped: bool,
    on_complete: Option<Rc<dyn Fn(&ViewRuntime)>>,
}

impl Animation {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            looped: false,
            on_complete: None,
        }
    }

    /// Restart from the first frame instead of stopping.
    pub fn looped(mut self) -> Self {
        self.looped = true;
        self
    }

    /// Run `hook` when a non-looped animation plays to its end.
    pub fn on_complete(mut self, hook: impl Fn(&ViewRuntime) + 'static) -> Self {
        self.on_complete = Some(Rc::new(hook));
        self
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    /// Total ticks of one pass through all frames.
    pub fn total_duration(&self) -> u64 {
        self.frames.iter().map(Frame::duration).sum()
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("frames", &self.frames)
            .field("looped", &self.looped)
            .finish()
    }
}

// =============================================================================
// Playhead
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Show(usize),
    Finished,
}

/// Position inside a running animation.
#[derive(Debug, Default)]
struct Playhead {
    index: usize,
    elapsed: u64,
}

impl Playhead {
    fn advance(&mut self, animation: &Animation) -> Step {
        let frames = &animation.frames;
        if frames.is_empty() {
            return Step::Finished;
        }
        self.elapsed += 1;
        while self.elapsed > frames[self.index].duration {
            self.index += 1;
            self.elapsed = 1;
            if self.index >= frames.len() {
                if !animation.looped {
                    return Step::Finished;
                }
                self.index = 0;
            }
        }
        Step::Show(self.index)
    }
}

// =============================================================================
// Runtime Integration
// =============================================================================

impl ViewRuntime {
    /// Start `animation` on a mounted component, replacing any running one.
    ///
    /// Returns false if the component is not mounted, the runtime is closed or
    /// the animation has no frames.
    pub fn play_animation(&self, id: ComponentId, animation: Rc<Animation>) -> bool {
        if self.is_closed() || animation.frames.is_empty() {
            return false;
        }
        let Some((previous, state)) = self.with_node_mut(id, |node| (node.animation.take(), node.state.clone())) else {
            return false;
        };
        if let Some(previous) = previous {
            self.cancel_task(previous);
        }
        state.insert_flags(StateFlags::ANIMATING);

        let weak = self.downgrade();
        let own: Rc<Cell<Option<TaskHandle>>> = Rc::default();
        let own_handle = own.clone();
        let mut playhead = Playhead::default();
        let task: TaskFn = Box::new(move || {
            let Some(rt) = ViewRuntime::upgrade(&weak) else {
                return TaskControl::Stop;
            };
            let step = catch_unwind(AssertUnwindSafe(|| match playhead.advance(&animation) {
                Step::Show(index) => {
                    let content = animation.frames[index].render(&rt);
                    rt.show_frame(id, content);
                    TaskControl::Continue
                }
                Step::Finished => {
                    rt.finish_animation(id, &animation);
                    TaskControl::Stop
                }
            }));
            step.unwrap_or_else(|_| {
                error!(component = id.index(), "animation tick panicked");
                if let Some(handle) = own_handle.get() {
                    rt.forget_task(handle, Some(id));
                }
                rt.clear_animation(id);
                TaskControl::Stop
            })
        });

        let interval = self.config().animation_interval;
        let handle = self.schedule_task(interval, interval, task);
        own.set(Some(handle));
        self.with_node_mut(id, |node| node.animation = Some(handle));
        debug!(component = id.index(), task = handle.raw(), "animation started");
        true
    }

    /// Cancel the running animation of a component. Returns false if none ran.
    pub fn stop_animation(&self, id: ComponentId) -> bool {
        let running = self.with_node_mut(id, |node| node.animation.take()).flatten();
        let Some(handle) = running else { return false };
        self.cancel_task(handle);
        self.clear_animation(id);
        true
    }

    fn show_frame(&self, id: ComponentId, content: SlotContent) {
        let Some(state) = self.state(id) else { return };
        state.set_frame(Some(content));
        self.render_component(id);
        self.flush();
    }

    fn finish_animation(&self, id: ComponentId, animation: &Animation) {
        let finished = self.with_node_mut(id, |node| node.animation.take()).flatten();
        if let Some(handle) = finished {
            self.inner.tasks.borrow_mut().remove(&handle);
        }
        self.clear_animation(id);
        debug!(component = id.index(), "animation finished");

        if let Some(hook) = &animation.on_complete {
            if catch_unwind(AssertUnwindSafe(|| hook(self))).is_err() {
                error!(component = id.index(), "animation completion hook panicked");
            }
        }
    }

    /// Drop the frame override and queue a normal render.
    fn clear_animation(&self, id: ComponentId) {
        let Some((state, scope)) = self.with_node(id, |node| (node.state.clone(), node.scope)) else {
            return;
        };
        state.set_frame(None);
        state.remove_flags(StateFlags::ANIMATING);
        self.mark_dirty(scope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(animation: &Animation, ticks: usize) -> Vec<Step> {
        let mut playhead = Playhead::default();
        (0..ticks).map(|_| playhead.advance(animation)).collect()
    }

    #[test]
    fn test_two_single_tick_frames() {
        let animation = Animation::new(vec![Frame::new(1, "x"), Frame::new(1, "y")]);
        assert_eq!(steps(&animation, 3), vec![Step::Show(0), Step::Show(1), Step::Finished]);
    }

    #[test]
    fn test_frame_durations() {
        let animation = Animation::new(vec![Frame::new(2, "x"), Frame::new(1, "y")]);
        assert_eq!(
            steps(&animation, 4),
            vec![Step::Show(0), Step::Show(0), Step::Show(1), Step::Finished]
        );
        assert_eq!(animation.total_duration(), 3);
    }

    #[test]
    fn test_looped_wraps() {
        let animation = Animation::new(vec![Frame::new(1, "x"), Frame::new(1, "y")]).looped();
        assert_eq!(
            steps(&animation, 5),
            vec![Step::Show(0), Step::Show(1), Step::Show(0), Step::Show(1), Step::Show(0)]
        );
    }

    #[test]
    fn test_zero_duration_is_one_tick() {
        let frame = Frame::new(0, "x");
        assert_eq!(frame.duration(), 1);
    }

    #[test]
    fn test_empty_animation_finishes() {
        let animation = Animation::new(Vec::new());
        assert_eq!(steps(&animation, 1), vec![Step::Finished]);
    }
}
