//! Presentation seam.
//!
//! The runtime never talks to a real client. It hands window lifecycle, slot
//! writes, titles and sounds to a [`Presenter`], and asks a [`ContentBuilder`]
//! to turn item keys into [`SlotContent`].
//!
//! [`MemoryPresenter`] keeps an in-memory surface per viewer plus a write log,
//! which is what tests and demos inspect.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::component::WindowType;
use crate::types::{SlotContent, SlotIndex, Sound, ViewerId};

// =============================================================================
// Traits
// =============================================================================

/// What the host needs to show a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub id: String,
    pub window_type: WindowType,
}

/// Receiver of everything a runtime draws.
pub trait Presenter {
    fn open_window(&self, viewer: ViewerId, window: &WindowInfo);

    fn set_title(&self, viewer: ViewerId, title: &str);

    /// `None` clears the slot.
    fn set_slot(&self, viewer: ViewerId, slot: SlotIndex, content: Option<&SlotContent>);

    fn play_sound(&self, viewer: ViewerId, sound: &Sound);

    fn close_window(&self, viewer: ViewerId);
}

/// Turns item keys into slot content.
pub trait ContentBuilder {
    fn create(&self, item: &str) -> SlotContent;
}

/// Content builder producing plain stacks of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicContentBuilder;

impl ContentBuilder for BasicContentBuilder {
    fn create(&self, item: &str) -> SlotContent {
        SlotContent::new(item)
    }
}

// =============================================================================
// Memory Presenter
// =============================================================================

/// One slot write, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotWrite {
    pub viewer: ViewerId,
    pub slot: SlotIndex,
    pub content: Option<SlotContent>,
}

/// What one viewer currently sees.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pub window: Option<WindowInfo>,
    pub title: Option<String>,
    pub slots: BTreeMap<SlotIndex, SlotContent>,
    pub sounds: Vec<Sound>,
    pub slot_writes: HashMap<SlotIndex, usize>,
}

#[derive(Default)]
struct MemoryState {
    surfaces: HashMap<ViewerId, Surface>,
    log: Vec<SlotWrite>,
    closes: HashMap<ViewerId, usize>,
}

/// In-memory [`Presenter`]. Clones share the same surfaces.
#[derive(Clone, Default)]
pub struct MemoryPresenter {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self, viewer: ViewerId) -> Option<Surface> {
        self.state.borrow().surfaces.get(&viewer).cloned()
    }

    pub fn is_open(&self, viewer: ViewerId) -> bool {
        self.state
            .borrow()
            .surfaces
            .get(&viewer)
            .is_some_and(|surface| surface.window.is_some())
    }

    pub fn slot(&self, viewer: ViewerId, slot: SlotIndex) -> Option<SlotContent> {
        self.state
            .borrow()
            .surfaces
            .get(&viewer)
            .and_then(|surface| surface.slots.get(&slot).cloned())
    }

    pub fn title(&self, viewer: ViewerId) -> Option<String> {
        self.state
            .borrow()
            .surfaces
            .get(&viewer)
            .and_then(|surface| surface.title.clone())
    }

    pub fn sounds(&self, viewer: ViewerId) -> Vec<Sound> {
        self.state
            .borrow()
            .surfaces
            .get(&viewer)
            .map(|surface| surface.sounds.clone())
            .unwrap_or_default()
    }

    /// Number of writes a slot received since the window opened.
    pub fn slot_writes(&self, viewer: ViewerId, slot: SlotIndex) -> usize {
        self.state
            .borrow()
            .surfaces
            .get(&viewer)
            .and_then(|surface| surface.slot_writes.get(&slot).copied())
            .unwrap_or(0)
    }

    /// Number of `close_window` calls a viewer received.
    pub fn close_count(&self, viewer: ViewerId) -> usize {
        self.state.borrow().closes.get(&viewer).copied().unwrap_or(0)
    }

    /// Every slot write, oldest first.
    pub fn log(&self) -> Vec<SlotWrite> {
        self.state.borrow().log.clone()
    }
}

impl Presenter for MemoryPresenter {
    fn open_window(&self, viewer: ViewerId, window: &WindowInfo) {
        let mut state = self.state.borrow_mut();
        state.surfaces.insert(
            viewer,
            Surface {
                window: Some(window.clone()),
                ..Surface::default()
            },
        );
    }

    fn set_title(&self, viewer: ViewerId, title: &str) {
        let mut state = self.state.borrow_mut();
        state.surfaces.entry(viewer).or_default().title = Some(title.to_string());
    }

    fn set_slot(&self, viewer: ViewerId, slot: SlotIndex, content: Option<&SlotContent>) {
        let mut state = self.state.borrow_mut();
        let surface = state.surfaces.entry(viewer).or_default();
        match content {
            Some(content) => {
                surface.slots.insert(slot, content.clone());
            }
            None => {
                surface.slots.remove(&slot);
            }
        }
        *surface.slot_writes.entry(slot).or_insert(0) += 1;
        state.log.push(SlotWrite {
            viewer,
            slot,
            content: content.cloned(),
        });
    }

    fn play_sound(&self, viewer: ViewerId, sound: &Sound) {
        let mut state = self.state.borrow_mut();
        state.surfaces.entry(viewer).or_default().sounds.push(sound.clone());
    }

    fn close_window(&self, viewer: ViewerId) {
        let mut state = self.state.borrow_mut();
        *state.closes.entry(viewer).or_insert(0) += 1;
        if let Some(surface) = state.surfaces.get_mut(&viewer) {
            surface.window = None;
            surface.slots.clear();
        }
    }
}
