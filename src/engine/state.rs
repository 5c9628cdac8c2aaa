//! Component State - Cached render output of one mounted component.
//!
//! The same `Rc<ComponentState>` lives as long as the component stays mounted
//! at its slot, so two consecutive renders update one instance. Unmounting
//! (including a variant swap through `render_when_else`) drops it and the
//! next mount at that slot starts from a fresh one.

use std::cell::{Cell, RefCell};

use crate::component::ComponentKind;
use crate::types::{ComponentId, SlotContent, SlotIndex, StateFlags};

/// Identity a state is cached under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub parent: Option<ComponentId>,
    pub slot: SlotIndex,
    pub kind: ComponentKind,
    pub id: String,
}

#[derive(Debug)]
pub struct ComponentState {
    key: StateKey,
    content: RefCell<Option<SlotContent>>,
    title: RefCell<Option<String>>,
    frame: RefCell<Option<SlotContent>>,
    renders: Cell<u64>,
    flags: Cell<StateFlags>,
}

impl ComponentState {
    pub(crate) fn new(key: StateKey) -> Self {
        Self {
            key,
            content: RefCell::new(None),
            title: RefCell::new(None),
            frame: RefCell::new(None),
            renders: Cell::new(0),
            flags: Cell::new(StateFlags::NONE),
        }
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }

    /// Content last handed to the presenter.
    pub fn content(&self) -> Option<SlotContent> {
        self.content.borrow().clone()
    }

    /// Title last handed to the presenter (windows only).
    pub fn title(&self) -> Option<String> {
        self.title.borrow().clone()
    }

    /// Number of completed renders.
    pub fn render_count(&self) -> u64 {
        self.renders.get()
    }

    pub fn flags(&self) -> StateFlags {
        self.flags.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.flags().contains(StateFlags::MOUNTED)
    }

    pub fn is_animating(&self) -> bool {
        self.flags().contains(StateFlags::ANIMATING)
    }

    /// Store new content. Returns true if it differs from the old one.
    pub(crate) fn set_content(&self, content: Option<SlotContent>) -> bool {
        let mut current = self.content.borrow_mut();
        if *current == content {
            return false;
        }
        *current = content;
        true
    }

    pub(crate) fn set_title(&self, title: String) -> bool {
        let mut current = self.title.borrow_mut();
        if current.as_deref() == Some(title.as_str()) {
            return false;
        }
        *current = Some(title);
        true
    }

    pub(crate) fn frame(&self) -> Option<SlotContent> {
        self.frame.borrow().clone()
    }

    pub(crate) fn set_frame(&self, frame: Option<SlotContent>) {
        *self.frame.borrow_mut() = frame;
    }

    pub(crate) fn record_render(&self) {
        self.renders.set(self.renders.get() + 1);
        self.insert_flags(StateFlags::RENDERED);
    }

    pub(crate) fn insert_flags(&self, flags: StateFlags) {
        self.flags.set(self.flags.get() | flags);
    }

    pub(crate) fn remove_flags(&self, flags: StateFlags) {
        self.flags.set(self.flags.get() - flags);
    }
}
