//! Keyed serialization lock.
//!
//! At most one critical section runs per key at a time; unrelated keys
//! proceed fully concurrently. Lock entries are reference-counted and
//! removed once unreferenced, so the map's footprint tracks in-flight keys,
//! not historical ones.
//!
//! Not reentrant: acquiring a key already held by the same task blocks
//! forever. That is a caller obligation; no deadlock detection is performed.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::error::{Result, SyncError};

struct LockEntry {
    lock: Arc<AsyncMutex<()>>,
    refs: usize,
}

/// Per-key mutual exclusion over an open key space.
pub struct KeyedLock<K: Eq + Hash + Clone> {
    entries: Arc<Mutex<HashMap<K, LockEntry>>>,
}

impl<K: Eq + Hash + Clone> Clone for KeyedLock<K> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLock<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> KeyedLock<K> {
    /// Creates an empty lock map.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Acquires the key's exclusive section, waiting for any current holder.
    pub async fn acquire(&self, key: K) -> Result<KeyedLockGuard<K>> {
        let lock = {
            let mut entries = self
                .entries
                .lock()
                .map_err(|e| SyncError::LockPoisoned(e.to_string()))?;
            let entry = entries.entry(key.clone()).or_insert_with(|| LockEntry {
                lock: Arc::new(AsyncMutex::new(())),
                refs: 0,
            });
            entry.refs += 1;
            Arc::clone(&entry.lock)
        };

        // The guard carries the refcount from here on, so a caller dropping
        // this future mid-wait (timeout, cancellation) still releases the
        // entry. Waiting happens outside the map mutex.
        let mut guard = KeyedLockGuard {
            registry: self.clone(),
            key,
            guard: None,
        };
        guard.guard = Some(lock.lock_owned().await);
        Ok(guard)
    }

    /// Number of keys currently referenced. Diagnostic only.
    pub fn key_count(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    fn release(&self, key: &K) {
        // A poisoned map still holds valid entries; recover and decrement.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        if let Some(entry) = entries.get_mut(key) {
            entry.refs -= 1;
            if entry.refs == 0 {
                entries.remove(key);
            }
        }
    }
}

/// Scoped exclusive section for one key; releasing is dropping.
///
/// The inner mutex guard is absent only while the owning acquire future is
/// still waiting; every guard handed to a caller holds it.
pub struct KeyedLockGuard<K: Eq + Hash + Clone> {
    registry: KeyedLock<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> Drop for KeyedLockGuard<K> {
    fn drop(&mut self) {
        self.registry.release(&self.key);
    }
}
