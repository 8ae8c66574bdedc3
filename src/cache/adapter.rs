//! Storage adapter contract and the in-memory reference adapter.
//!
//! The middleware addresses storage exclusively through [`Adapter`]: an
//! external, key-addressed byte store. Everything behind the trait —
//! durability, eviction, sharding — is the adapter's business. The contract
//! is non-failing: an adapter that can fail internally must swallow or log
//! the failure itself; the middleware treats every call as best-effort and
//! never turns a cache problem into an HTTP error.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use bytes::Bytes;

/// External byte store consumed by the cache middleware.
///
/// Implementations must be safe under concurrent calls across keys. The
/// middleware does not serialize its read-modify-write hit bookkeeping, so
/// an adapter whose eviction policy needs exact counters must serialize
/// same-key operations itself.
pub trait Adapter: Send + Sync {
    /// Retrieves the stored bytes for a key, or `None` if absent.
    fn get(&self, key: u64) -> Option<Bytes>;

    /// Stores bytes for a key.
    ///
    /// `expires_at` is informational — an adapter may use it to schedule
    /// eviction, but freshness is enforced independently by the middleware,
    /// so ignoring it is also correct.
    fn set(&self, key: u64, value: Bytes, expires_at: SystemTime);

    /// Removes any entry for the key. No-op if absent.
    fn release(&self, key: u64);
}

/// A policy-free in-memory adapter: a mutexed map, no eviction.
///
/// Intended for tests, demos, and small single-process deployments.
/// Anything needing bounded memory or persistence belongs in an external
/// [`Adapter`] implementation.
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
/// use bytes::Bytes;
/// use recache::cache::{Adapter, MemoryAdapter};
///
/// let adapter = MemoryAdapter::new();
/// adapter.set(7, Bytes::from_static(b"entry"), SystemTime::now());
/// assert_eq!(adapter.get(7), Some(Bytes::from_static(b"entry")));
/// adapter.release(7);
/// assert_eq!(adapter.get(7), None);
/// ```
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    entries: Mutex<HashMap<u64, Bytes>>,
}

impl MemoryAdapter {
    /// Creates an empty adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns `true` if the key currently has an entry.
    pub fn contains(&self, key: u64) -> bool {
        self.lock().contains_key(&key)
    }

    // The adapter contract promises calls never fail, so a poisoned lock
    // (a panic mid-insert elsewhere) degrades to using the inner map as-is.
    fn lock(&self) -> MutexGuard<'_, HashMap<u64, Bytes>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Adapter for MemoryAdapter {
    fn get(&self, key: u64) -> Option<Bytes> {
        self.lock().get(&key).cloned()
    }

    fn set(&self, key: u64, value: Bytes, _expires_at: SystemTime) {
        self.lock().insert(key, value);
    }

    fn release(&self, key: u64) {
        self.lock().remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_release() {
        let adapter = MemoryAdapter::new();
        assert!(adapter.is_empty());

        adapter.set(1, Bytes::from_static(b"a"), SystemTime::now());
        adapter.set(2, Bytes::from_static(b"b"), SystemTime::now());
        assert_eq!(adapter.len(), 2);
        assert_eq!(adapter.get(1), Some(Bytes::from_static(b"a")));

        adapter.release(1);
        assert!(!adapter.contains(1));
        assert_eq!(adapter.get(1), None);
    }

    #[test]
    fn set_overwrites() {
        let adapter = MemoryAdapter::new();
        adapter.set(1, Bytes::from_static(b"old"), SystemTime::now());
        adapter.set(1, Bytes::from_static(b"new"), SystemTime::now());
        assert_eq!(adapter.len(), 1);
        assert_eq!(adapter.get(1), Some(Bytes::from_static(b"new")));
    }

    #[test]
    fn release_of_absent_key_is_a_noop() {
        let adapter = MemoryAdapter::new();
        adapter.release(42);
        assert!(adapter.is_empty());
    }
}
