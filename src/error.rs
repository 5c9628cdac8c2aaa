//! Error types.
//!
//! Structural errors (routing, layout, window sizing) are returned to the
//! caller that caused them. Runtime-loop faults (handler panics, task panics)
//! never surface here; they are logged and isolated per component.

use thiserror::Error;

use crate::types::SlotIndex;

/// Errors produced by the menu runtime.
#[derive(Debug, Error)]
pub enum MenuError {
    /// A path segment did not name a child route.
    #[error("route not found: `{segment}` in path `{path}`")]
    RouteNotFound { segment: String, path: String },

    /// The resolved router has neither a window nor an entry route.
    #[error("router `{router}` has no window and no entry route")]
    NoWindow { router: String },

    /// Two sibling routes share an ID.
    #[error("duplicate route `{route}` under router `{parent}`")]
    DuplicateRoute { route: String, parent: String },

    /// A component's rectangle overlaps a mounted sibling.
    #[error("component `{component}` at slot {slot} overlaps sibling `{sibling}`")]
    LayoutConflict {
        component: String,
        slot: SlotIndex,
        sibling: String,
    },

    /// A component's rectangle does not fit inside its parent.
    #[error("component `{component}` at slot {slot} does not fit inside `{parent}`")]
    OutOfBounds {
        component: String,
        slot: SlotIndex,
        parent: String,
    },

    /// A window was declared as the child of another component.
    #[error("window `{window}` cannot be mounted inside `{parent}`")]
    NestedWindow { window: String, parent: String },

    /// A window was declared with an unusable size.
    #[error("invalid window size {size} for window `{window}`")]
    InvalidWindowSize { window: String, size: usize },

    /// The runtime was already closed.
    #[error("view runtime is closed")]
    RuntimeClosed,

    /// No menu was registered under this key.
    #[error("unknown menu `{0}`")]
    UnknownMenu(String),

    /// Configuration could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MenuError>;
