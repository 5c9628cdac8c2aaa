//! Shared backing state for stores.
//!
//! A `StoreRegistry` maps an opaque session key (a viewer, a party, a block
//! position) to a shared state value. Stores read and write through getter
//! and setter closures capturing the entry, so the state outlives any single
//! `ViewRuntime`. Entries are removed explicitly with [`StoreRegistry::evict`]
//! or when a bound runtime closes.
//!
//! # Example
//!
//! ```ignore
//! let registry: StoreRegistry<ViewerId, CounterState> = StoreRegistry::new();
//! let state = registry.entry(viewer, CounterState::default);
//! let count = cx.store(
//!     "count",
//!     { let state = state.clone(); move || state.borrow().count },
//!     move |value| state.borrow_mut().count = value,
//! );
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use tracing::debug;

use crate::runtime::ViewRuntime;

/// Registry of shared store state keyed by session.
pub struct StoreRegistry<K, S> {
    entries: Rc<RefCell<HashMap<K, Rc<RefCell<S>>>>>,
}

impl<K, S> Clone for StoreRegistry<K, S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K: Eq + Hash + Clone + 'static, S: 'static> Default for StoreRegistry<K, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone + 'static, S: 'static> StoreRegistry<K, S> {
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Get the entry for `key`, creating it with `init` if missing.
    pub fn entry(&self, key: K, init: impl FnOnce() -> S) -> Rc<RefCell<S>> {
        self.entries
            .borrow_mut()
            .entry(key)
            .or_insert_with(|| Rc::new(RefCell::new(init())))
            .clone()
    }

    pub fn get(&self, key: &K) -> Option<Rc<RefCell<S>>> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Remove an entry. Stores still holding it keep their copy alive.
    pub fn evict(&self, key: &K) -> Option<Rc<RefCell<S>>> {
        self.entries.borrow_mut().remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Evict `key` when `runtime` closes.
    pub fn evict_on_close(&self, runtime: &ViewRuntime, key: K) {
        let entries = Rc::downgrade(&self.entries);
        runtime.on_close(move || {
            if let Some(entries) = entries.upgrade() {
                if entries.borrow_mut().remove(&key).is_some() {
                    debug!("evicted store entry on runtime close");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_is_shared() {
        let registry: StoreRegistry<u32, i32> = StoreRegistry::new();

        let first = registry.entry(1, || 10);
        *first.borrow_mut() += 1;
        let second = registry.entry(1, || 0);

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(*second.borrow(), 11);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_evict_removes_entry() {
        let registry: StoreRegistry<&'static str, i32> = StoreRegistry::new();
        registry.entry("a", || 1);
        registry.entry("b", || 2);

        let evicted = registry.evict(&"a");
        assert_eq!(evicted.map(|state| *state.borrow()), Some(1));
        assert!(!registry.contains(&"a"));
        assert!(registry.contains(&"b"));
        assert!(registry.evict(&"a").is_none());
    }

    #[test]
    fn test_clone_shares_entries() {
        let registry: StoreRegistry<u8, u8> = StoreRegistry::new();
        let other = registry.clone();
        registry.entry(3, || 7);

        assert_eq!(other.get(&3).map(|state| *state.borrow()), Some(7));
    }
}
