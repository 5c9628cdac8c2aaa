//! Typed handles over the type-erased graph.
//!
//! A handle is a `Copy` pair of (runtime, node). Values are stored as
//! `Box<dyn Any>` and downcast on access; reading a node as the wrong type
//! panics with both type names.
//!
//! # Example
//!
//! ```ignore
//! let count = rt.create_signal("count", 0i32);
//! count.update(&rt, |c| *c += 1);
//! assert_eq!(count.get(&rt), 1);
//! ```

use std::fmt;
use std::marker::PhantomData;

use super::graph::NodeId;
use super::tracker::SignalContext;
use crate::types::RuntimeId;

/// Untyped identity of a signal, store or memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId {
    pub(crate) runtime: RuntimeId,
    pub(crate) node: NodeId,
}

impl SignalId {
    /// Runtime owning the node.
    pub fn runtime(&self) -> RuntimeId {
        self.runtime
    }
}

/// A dependency declared ahead of time.
///
/// Names are resolved against the runtime when the component mounts, which
/// lets builders that run before any runtime exists (windows) name signals
/// their construct phase will create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalRef {
    Handle(SignalId),
    Name(String),
}

impl From<SignalId> for SignalRef {
    fn from(id: SignalId) -> Self {
        SignalRef::Handle(id)
    }
}

impl From<&str> for SignalRef {
    fn from(name: &str) -> Self {
        SignalRef::Name(name.to_string())
    }
}

impl From<String> for SignalRef {
    fn from(name: String) -> Self {
        SignalRef::Name(name)
    }
}

// =============================================================================
// Signal
// =============================================================================

/// A named, typed reactive cell owned by a `ViewRuntime`.
pub struct Signal<V> {
    pub(crate) node: NodeId,
    pub(crate) runtime: RuntimeId,
    _marker: PhantomData<fn() -> V>,
}

/// A signal backed by an external getter/setter pair.
pub type Store<V> = Signal<V>;

impl<V> Clone for Signal<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Signal<V> {}

impl<V> PartialEq for Signal<V> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.runtime == other.runtime
    }
}

impl<V> Eq for Signal<V> {}

impl<V> fmt::Debug for Signal<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("node", &self.node.0)
            .field("runtime", &self.runtime)
            .finish()
    }
}

impl<V> Signal<V> {
    pub(crate) fn from_parts(runtime: RuntimeId, node: NodeId) -> Self {
        Self {
            node,
            runtime,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> SignalId {
        SignalId {
            runtime: self.runtime,
            node: self.node,
        }
    }
}

impl<V: 'static> Signal<V> {
    /// Replace the value and notify dependents.
    ///
    /// Outside a batch the runtime flushes immediately; inside a dispatch or
    /// batch every write is coalesced into one pass.
    pub fn set(&self, cx: &impl SignalContext, value: V) {
        let rt = cx.runtime();
        rt.assert_owned(self.runtime);
        rt.write_value(self.node, value);
    }
}

impl<V: Clone + 'static> Signal<V> {
    /// Read the value, subscribing the calling observer.
    pub fn get(&self, cx: &impl SignalContext) -> V {
        let rt = cx.runtime();
        rt.assert_owned(self.runtime);
        rt.read_value(self.node, cx.tracker())
    }

    /// Read the value without subscribing.
    pub fn get_untracked(&self, cx: &impl SignalContext) -> V {
        let rt = cx.runtime();
        rt.assert_owned(self.runtime);
        rt.read_value(self.node, None)
    }

    /// Read the value through a closure, subscribing the calling observer.
    pub fn with<R>(&self, cx: &impl SignalContext, f: impl FnOnce(&V) -> R) -> R {
        f(&self.get(cx))
    }

    /// Read, modify and write back with a single notification.
    pub fn update(&self, cx: &impl SignalContext, f: impl FnOnce(&mut V)) {
        let mut value = self.get_untracked(cx);
        f(&mut value);
        self.set(cx, value);
    }
}

impl<V> From<Signal<V>> for SignalId {
    fn from(signal: Signal<V>) -> Self {
        signal.id()
    }
}

impl<V> From<Signal<V>> for SignalRef {
    fn from(signal: Signal<V>) -> Self {
        SignalRef::Handle(signal.id())
    }
}

// =============================================================================
// Memo
// =============================================================================

/// A cached derived value.
///
/// Recomputed when any node it read changes. Dependents are only notified
/// when the new value differs from the cached one.
pub struct Memo<V> {
    pub(crate) node: NodeId,
    pub(crate) runtime: RuntimeId,
    _marker: PhantomData<fn() -> V>,
}

impl<V> Clone for Memo<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Memo<V> {}

impl<V> fmt::Debug for Memo<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo").field("node", &self.node.0).finish()
    }
}

impl<V> Memo<V> {
    pub(crate) fn from_parts(runtime: RuntimeId, node: NodeId) -> Self {
        Self {
            node,
            runtime,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> SignalId {
        SignalId {
            runtime: self.runtime,
            node: self.node,
        }
    }
}

impl<V: Clone + 'static> Memo<V> {
    pub fn get(&self, cx: &impl SignalContext) -> V {
        let rt = cx.runtime();
        rt.assert_owned(self.runtime);
        rt.read_value(self.node, cx.tracker())
    }

    pub fn get_untracked(&self, cx: &impl SignalContext) -> V {
        let rt = cx.runtime();
        rt.assert_owned(self.runtime);
        rt.read_value(self.node, None)
    }
}

impl<V> From<Memo<V>> for SignalRef {
    fn from(memo: Memo<V>) -> Self {
        SignalRef::Handle(memo.id())
    }
}

// =============================================================================
// Effect
// =============================================================================

/// Handle of a running effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    pub(crate) node: NodeId,
    pub(crate) runtime: RuntimeId,
}

impl Effect {
    /// Stop the effect. Disposing twice is a no-op.
    pub fn dispose(&self, cx: &impl SignalContext) {
        let rt = cx.runtime();
        rt.assert_owned(self.runtime);
        rt.dispose_node(self.node);
    }

    /// True while the effect is still registered.
    pub fn is_active(&self, cx: &impl SignalContext) -> bool {
        let rt = cx.runtime();
        rt.id() == self.runtime && rt.has_node(self.node)
    }
}
