//! Window - Root component of a view.

use std::rc::Rc;

use super::{ConstructCx, ConstructFn, RenderCx, TitleFn};
use crate::error::{MenuError, Result};
use crate::interaction::{InteractionCallback, InteractionEvent, InteractionResult};
use crate::reactive::SignalRef;
use crate::runtime::ViewRuntime;

/// Width of every chest-style window.
pub const CHEST_COLUMNS: u16 = 9;

/// Largest chest a host can show.
const CHEST_MAX_ROWS: u16 = 6;

/// Shape of the inventory a window is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// 9 columns, 1 to 6 rows.
    Chest { rows: u16 },
    /// 5x1.
    Hopper,
    /// 3x3.
    Dispenser,
}

impl Default for WindowType {
    fn default() -> Self {
        WindowType::Chest { rows: 3 }
    }
}

impl WindowType {
    pub fn columns(&self) -> u16 {
        match self {
            WindowType::Chest { .. } => CHEST_COLUMNS,
            WindowType::Hopper => 5,
            WindowType::Dispenser => 3,
        }
    }

    pub fn rows(&self) -> u16 {
        match self {
            WindowType::Chest { rows } => *rows,
            WindowType::Hopper => 1,
            WindowType::Dispenser => 3,
        }
    }

    /// Number of slots.
    pub fn size(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }
}

/// A window description.
pub struct Window {
    id: String,
    window_type: WindowType,
    pub(crate) title: Option<TitleFn>,
    pub(crate) title_signals: Vec<SignalRef>,
    pub(crate) construct: Option<ConstructFn>,
    pub(crate) interact: Vec<InteractionCallback>,
}

impl Window {
    pub fn builder(id: impl Into<String>) -> WindowBuilder {
        WindowBuilder {
            id: id.into(),
            window_type: WindowType::default(),
            title: None,
            title_signals: Vec::new(),
            construct: None,
            interact: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn size(&self) -> usize {
        self.window_type.size()
    }
}

/// Builder for [`Window`].
pub struct WindowBuilder {
    id: String,
    window_type: WindowType,
    title: Option<TitleFn>,
    title_signals: Vec<SignalRef>,
    construct: Option<ConstructFn>,
    interact: Vec<InteractionCallback>,
}

impl WindowBuilder {
    /// Chest window with `rows` rows.
    pub fn rows(mut self, rows: u16) -> Self {
        self.window_type = WindowType::Chest { rows };
        self
    }

    pub fn window_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    /// Title function. Reads through `cx` are tracked.
    pub fn title(mut self, title: impl Fn(&RenderCx<'_>) -> String + 'static) -> Self {
        self.title = Some(Rc::new(title));
        self
    }

    /// Signals the title always depends on, resolved after construct.
    pub fn title_signals<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SignalRef>,
    {
        self.title_signals.extend(signals.into_iter().map(Into::into));
        self
    }

    pub fn construct(mut self, construct: impl Fn(&ConstructCx<'_>) -> Result<()> + 'static) -> Self {
        self.construct = Some(Rc::new(construct));
        self
    }

    /// Add a callback run for every click on this window, after the clicked
    /// button's own callbacks. Empty slots and icons reach it too.
    pub fn interact(
        mut self,
        callback: impl Fn(&ViewRuntime, &InteractionEvent) -> InteractionResult + 'static,
    ) -> Self {
        self.interact.push(Rc::new(callback));
        self
    }

    /// Finish the window. Fails if the window has no slots or more rows than
    /// any host can show.
    pub fn build(self) -> Result<Rc<Window>> {
        let rows = self.window_type.rows();
        if rows == 0 || rows > CHEST_MAX_ROWS {
            return Err(MenuError::InvalidWindowSize {
                window: self.id,
                size: self.window_type.size(),
            });
        }
        Ok(Rc::new(Window {
            id: self.id,
            window_type: self.window_type,
            title: self.title,
            title_signals: self.title_signals,
            construct: self.construct,
            interact: self.interact,
        }))
    }
}
