//! Components - The closed set of things a menu is built from.
//!
//! - [`Window`] - root of a view, owns the title and the slot grid size
//! - [`Button`] - interactive leaf with icon, callbacks, sound and animation
//! - [`Icon`] - non-interactive leaf
//! - [`Group`] - rectangle of slots whose construct phase declares children
//!
//! Components are immutable descriptions shared through `Rc`. Everything a
//! mounted instance accumulates (signals, tasks, cached content) lives in the
//! runtime, keyed by the arena index the instance was mounted at.
//!
//! # Example
//!
//! ```ignore
//! let button = Button::builder("count_up")
//!     .icon(move |cx| cx.stack("green_concrete").named(format!("+1 ({})", count.get(cx))))
//!     .interact(move |rt, _| {
//!         count.update(rt, |c| *c += 1);
//!         InteractionResult::cancel()
//!     })
//!     .build();
//! cx.child(5, button)?;
//! ```

mod button;
mod group;
mod window;

use std::fmt;
use std::rc::Rc;

pub use button::{Button, ButtonBuilder, Icon, IconBuilder};
pub use group::{Group, GroupBuilder};
pub use window::{Window, WindowBuilder, WindowType, CHEST_COLUMNS};

use crate::engine::{ConstructCx, RenderCx};
use crate::error::Result;
use crate::reactive::SignalRef;
use crate::runtime::ViewRuntime;
use crate::types::{SlotContent, Sound};

/// Construct phase callback.
pub type ConstructFn = Rc<dyn Fn(&ConstructCx<'_>) -> Result<()>>;

/// Produces a leaf's slot content.
pub type IconFn = Rc<dyn Fn(&RenderCx<'_>) -> SlotContent>;

/// Produces a window title.
pub type TitleFn = Rc<dyn Fn(&RenderCx<'_>) -> String>;

/// Picks the sound a button plays when interacted with.
pub type SoundFn = Rc<dyn Fn(&ViewRuntime) -> Option<Sound>>;

/// Variant tag of a [`Component`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Window,
    Button,
    Icon,
    Group,
}

/// A component description.
#[derive(Clone)]
pub enum Component {
    Window(Rc<Window>),
    Button(Rc<Button>),
    Icon(Rc<Icon>),
    Group(Rc<Group>),
}

impl Component {
    pub fn id(&self) -> &str {
        match self {
            Component::Window(window) => window.id(),
            Component::Button(button) => button.id(),
            Component::Icon(icon) => icon.id(),
            Component::Group(group) => group.id(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Window(_) => ComponentKind::Window,
            Component::Button(_) => ComponentKind::Button,
            Component::Icon(_) => ComponentKind::Icon,
            Component::Group(_) => ComponentKind::Group,
        }
    }

    /// Width in slots.
    pub fn width(&self) -> u16 {
        match self {
            Component::Window(window) => window.window_type().columns(),
            Component::Button(button) => button.width(),
            Component::Icon(icon) => icon.width(),
            Component::Group(group) => group.width(),
        }
    }

    /// Height in slots.
    pub fn height(&self) -> u16 {
        match self {
            Component::Window(window) => window.window_type().rows(),
            Component::Button(button) => button.height(),
            Component::Icon(icon) => icon.height(),
            Component::Group(group) => group.height(),
        }
    }

    /// True for components that draw into slots themselves.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Component::Button(_) | Component::Icon(_))
    }

    /// True if both values describe the same component instance.
    pub fn same(&self, other: &Component) -> bool {
        match (self, other) {
            (Component::Window(a), Component::Window(b)) => Rc::ptr_eq(a, b),
            (Component::Button(a), Component::Button(b)) => Rc::ptr_eq(a, b),
            (Component::Icon(a), Component::Icon(b)) => Rc::ptr_eq(a, b),
            (Component::Group(a), Component::Group(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn construct_fn(&self) -> Option<ConstructFn> {
        match self {
            Component::Window(window) => window.construct.clone(),
            Component::Group(group) => group.construct.clone(),
            Component::Button(_) | Component::Icon(_) => None,
        }
    }

    pub(crate) fn icon_fn(&self) -> Option<IconFn> {
        match self {
            Component::Button(button) => button.icon.clone(),
            Component::Icon(icon) => icon.icon.clone(),
            Component::Window(_) | Component::Group(_) => None,
        }
    }

    /// Dependencies declared up front, resolved at mount.
    pub(crate) fn declared_signals(&self) -> &[SignalRef] {
        match self {
            Component::Window(window) => &window.title_signals,
            Component::Button(button) => &button.update_on,
            Component::Icon(icon) => &icon.update_on,
            Component::Group(_) => &[],
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind(), self.id())
    }
}

impl From<Rc<Window>> for Component {
    fn from(window: Rc<Window>) -> Self {
        Component::Window(window)
    }
}

impl From<Rc<Button>> for Component {
    fn from(button: Rc<Button>) -> Self {
        Component::Button(button)
    }
}

impl From<Rc<Icon>> for Component {
    fn from(icon: Rc<Icon>) -> Self {
        Component::Icon(icon)
    }
}

impl From<Rc<Group>> for Component {
    fn from(group: Rc<Group>) -> Self {
        Component::Group(group)
    }
}
