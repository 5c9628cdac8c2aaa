//! # spark-menu
//!
//! Reactive slot-grid menu runtime.
//!
//! Menus are declared as trees of components (windows, groups, buttons,
//! icons) laid out on a fixed grid of item slots. A fine-grained signal graph
//! tracks what each component reads, so a state change redraws exactly the
//! slots that depend on it.
//!
//! ## Architecture
//!
//! Every open menu is one [`ViewRuntime`] per viewer. Components are arena
//! entries in the runtime's tree; each one owns a reactive scope holding the
//! signals, memos, effects, tasks and hooks it declared.
//!
//! ```text
//! Router → Window → construct (once) → render observers → Presenter
//!                         ↑                    ↑
//!      Dispatcher → handlers → signal writes → flush
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (ViewerId, SlotRect, SlotContent, StateFlags)
//! - [`reactive`] - Signal graph: signals, stores, memos, effects
//! - [`component`] - Component variants and their builders
//! - [`router`] - Navigation tree resolving paths to windows
//! - [`engine`] - Mounting, conditional rendering, slot grid, render passes
//! - [`runtime`] - Per-viewer runtime, batching and lifecycle
//! - [`animation`] - Timed frame sequences
//! - [`interaction`] / [`dispatch`] - Click routing and result policy
//! - [`presentation`] - Presenter and content builder seams
//! - [`scheduler`] - Tick source contract and a manual clock
//! - [`manager`] - Named menus with one runtime per viewer

pub mod animation;
pub mod component;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod logging;
pub mod manager;
pub mod presentation;
pub mod reactive;
pub mod router;
pub mod runtime;
pub mod scheduler;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use animation::{Animation, Frame};

pub use component::{
    Button, ButtonBuilder, Component, ComponentKind, Group, GroupBuilder, Icon, IconBuilder,
    Window, WindowBuilder, WindowType,
};

pub use config::RuntimeConfig;

pub use dispatch::{Dispatcher, RawInteraction};

pub use engine::{ComponentState, ConstructCx, EffectCx, RenderCx, StateKey};

pub use error::{MenuError, Result};

pub use interaction::{ClickKind, EventPolicy, InteractionEvent, InteractionResult};

pub use manager::MenuManager;

pub use presentation::{
    BasicContentBuilder, ContentBuilder, MemoryPresenter, Presenter, WindowInfo,
};

pub use reactive::{
    Effect, Memo, Signal, SignalContext, SignalRef, Store, StoreRegistry,
};

pub use router::{Router, RouterBuilder};

pub use runtime::ViewRuntime;

pub use scheduler::{Scheduler, TaskControl, TaskHandle, TickScheduler};
