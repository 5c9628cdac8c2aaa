//! Reactive state graph.
//!
//! - [`Signal`] - named, typed cell owned by a runtime
//! - [`Store`] - signal bridged to external state through getter/setter
//! - [`Memo`] - cached derived value
//! - [`Effect`] - callback re-run when what it read changes
//! - [`StoreRegistry`] - shared store backing keyed by session
//!
//! The graph itself ([`graph`]) is internal and never calls user code.
//! Propagation is push-dirty, pull-run: a write marks subscribers, and the
//! runtime's flush pass runs them in declaration order.

pub(crate) mod graph;
mod signal;
mod store_registry;
mod tracker;

pub use graph::NodeId;
pub use signal::{Effect, Memo, Signal, SignalId, SignalRef, Store};
pub use store_registry::StoreRegistry;
pub use tracker::{SignalContext, Tracker};
