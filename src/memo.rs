//! Reference-identity memoization.
//!
//! The tree can be large and every derived fact walks it, so the engine
//! caches each fact against the identity of the snapshots it read. A
//! snapshot swap replaces its `Arc`, the key stops comparing equal, and the
//! next read recomputes. Keys hold clones of the `Arc`s they compare, so a
//! recycled allocation can never alias a stale key.

use std::fmt;
use std::sync::{Arc, RwLock};

/// Identity key over an optional shared snapshot.
///
/// Compares by `Arc::ptr_eq`, never by value.
#[derive(Clone)]
pub struct ArcKey<T>(Option<Arc<T>>);

impl<T> ArcKey<T> {
    /// Keys the given snapshot handle.
    #[must_use]
    pub fn of(snapshot: Option<&Arc<T>>) -> Self {
        Self(snapshot.cloned())
    }
}

impl<T> PartialEq for ArcKey<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> Eq for ArcKey<T> {}

impl<T> fmt::Debug for ArcKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(arc) => write!(f, "ArcKey({:p})", Arc::as_ptr(arc)),
            None => write!(f, "ArcKey(none)"),
        }
    }
}

/// Single-slot cache: remembers the last key/value pair.
pub struct MemoCell<K, V> {
    slot: RwLock<Option<(K, V)>>,
}

impl<K: PartialEq, V: Clone> MemoCell<K, V> {
    /// Creates an empty cell.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached value for `key`, computing and storing it on miss.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        {
            let guard = match self.slot.read() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some((cached_key, cached_value)) = guard.as_ref() {
                if *cached_key == key {
                    return cached_value.clone();
                }
            }
        }

        let value = compute();
        let mut guard = match self.slot.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some((key, value.clone()));
        value
    }
}

impl<K: PartialEq, V: Clone> Default for MemoCell<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for MemoCell<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCell").finish_non_exhaustive()
    }
}
