// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Expiring key/value store abstraction.
//!
//! The guard keeps its counters and block flags in a shared store with
//! per-entry time-to-live. The trait is deliberately small (get/set/incr/
//! delete) so a distributed backend can sit behind it; `MemoryStore` is the
//! process-local implementation.
//!
//! Operations are synchronous: every call is a single key round trip with no
//! internal retry, and timeouts are the backing store's concern.

use crate::clock::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Store failure. The guard never surfaces this to callers; it fails open.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("key/value store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Shared expiring counter store.
///
/// Values are unsigned counters. A key that has expired reads as absent;
/// absence is equivalent to a count of zero.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Expired entries read as `None`.
    fn get(&self, key: &str) -> Result<Option<u64>, StoreError>;

    /// Write a value with a fresh time-to-live, replacing any existing entry.
    fn set(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError>;

    /// Increment a counter and return the new value.
    ///
    /// The TTL applies only when the key is created; an existing entry keeps
    /// its remaining lifetime, so the counting window is fixed rather than
    /// sliding.
    fn incr(&self, key: &str, ttl: Duration) -> Result<u64, StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: u64,
    expires_at: u64,
}

/// In-process store over a mutex-guarded map.
///
/// Expiry is evaluated against the injected clock on every read, so entries
/// vanish at their deadline even between purge runs. `purge_expired` drops
/// dead entries wholesale and is meant to be driven by a periodic task.
pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = self.clock.now_unix_secs();
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now_unix_secs();
        self.lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // Counters are best-effort; recover the map from a poisoned mutex.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let now = self.clock.now_unix_secs();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value)),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: u64, ttl: Duration) -> Result<(), StoreError> {
        let now = self.clock.now_unix_secs();
        let mut entries = self.lock();
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl.as_secs(),
            },
        );
        Ok(())
    }

    fn incr(&self, key: &str, ttl: Duration) -> Result<u64, StoreError> {
        let now = self.clock.now_unix_secs();
        let mut entries = self.lock();
        match entries.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                entry.value += 1;
                Ok(entry.value)
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value: 1,
                        expires_at: now + ttl.as_secs(),
                    },
                );
                Ok(1)
            }
        }
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}
