//! Button and Icon - Leaf components drawing into their slots.

use std::rc::Rc;

use super::{IconFn, RenderCx, SoundFn};
use crate::animation::Animation;
use crate::interaction::{InteractionCallback, InteractionEvent, InteractionResult};
use crate::reactive::SignalRef;
use crate::runtime::ViewRuntime;
use crate::types::{SlotContent, Sound};

// =============================================================================
// Button
// =============================================================================

/// An interactive leaf.
pub struct Button {
    id: String,
    width: u16,
    height: u16,
    pub(crate) icon: Option<IconFn>,
    pub(crate) update_on: Vec<SignalRef>,
    pub(crate) interact: Vec<InteractionCallback>,
    pub(crate) sound: Option<SoundFn>,
    pub(crate) animation: Option<Rc<Animation>>,
}

impl Button {
    pub fn builder(id: impl Into<String>) -> ButtonBuilder {
        ButtonBuilder {
            id: id.into(),
            width: 1,
            height: 1,
            icon: None,
            update_on: Vec::new(),
            interact: Vec::new(),
            sound: None,
            animation: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn animation(&self) -> Option<&Rc<Animation>> {
        self.animation.as_ref()
    }
}

pub struct ButtonBuilder {
    id: String,
    width: u16,
    height: u16,
    icon: Option<IconFn>,
    update_on: Vec<SignalRef>,
    interact: Vec<InteractionCallback>,
    sound: Option<SoundFn>,
    animation: Option<Rc<Animation>>,
}

impl ButtonBuilder {
    /// Icon function. Reads through `cx` are tracked.
    pub fn icon(mut self, icon: impl Fn(&RenderCx<'_>) -> SlotContent + 'static) -> Self {
        self.icon = Some(Rc::new(icon));
        self
    }

    /// Re-render whenever `signal` changes, read or not.
    pub fn update_on(mut self, signal: impl Into<SignalRef>) -> Self {
        self.update_on.push(signal.into());
        self
    }

    /// Add an interaction callback. Callbacks run in the order added.
    pub fn interact(
        mut self,
        callback: impl Fn(&ViewRuntime, &InteractionEvent) -> InteractionResult + 'static,
    ) -> Self {
        self.interact.push(Rc::new(callback));
        self
    }

    /// Sound played on every interaction.
    pub fn sound(mut self, sound: impl Fn(&ViewRuntime) -> Option<Sound> + 'static) -> Self {
        self.sound = Some(Rc::new(sound));
        self
    }

    /// Animation started on every interaction.
    pub fn animation(mut self, animation: Animation) -> Self {
        self.animation = Some(Rc::new(animation));
        self
    }

    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn build(self) -> Rc<Button> {
        Rc::new(Button {
            id: self.id,
            width: self.width,
            height: self.height,
            icon: self.icon,
            update_on: self.update_on,
            interact: self.interact,
            sound: self.sound,
            animation: self.animation,
        })
    }
}

// =============================================================================
// Icon
// =============================================================================

/// A non-interactive leaf. Interactions on it propagate.
pub struct Icon {
    id: String,
    width: u16,
    height: u16,
    pub(crate) icon: Option<IconFn>,
    pub(crate) update_on: Vec<SignalRef>,
}

impl Icon {
    pub fn builder(id: impl Into<String>) -> IconBuilder {
        IconBuilder {
            id: id.into(),
            width: 1,
            height: 1,
            icon: None,
            update_on: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

pub struct IconBuilder {
    id: String,
    width: u16,
    height: u16,
    icon: Option<IconFn>,
    update_on: Vec<SignalRef>,
}

impl IconBuilder {
    pub fn icon(mut self, icon: impl Fn(&RenderCx<'_>) -> SlotContent + 'static) -> Self {
        self.icon = Some(Rc::new(icon));
        self
    }

    pub fn update_on(mut self, signal: impl Into<SignalRef>) -> Self {
        self.update_on.push(signal.into());
        self
    }

    pub fn size(mut self, width: u16, height: u16) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn build(self) -> Rc<Icon> {
        Rc::new(Icon {
            id: self.id,
            width: self.width,
            height: self.height,
            icon: self.icon,
            update_on: self.update_on,
        })
    }
}
