//! Cache Store Module
//!
//! Synchronous cache engine: HashMap storage with TTL expiration.
//! Shared access goes through [`Cache`](crate::cache::Cache).

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheEntry, CacheOptions, CacheStats, Clock};

// == Cache Store ==
/// Key-value storage with per-entry TTL.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage, keyed by resolved cache key
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Time source for expiry
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            clock,
        }
    }

    // == Set ==
    /// Stores a value, overwriting any existing entry and resetting its TTL.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: String, value: T, options: CacheOptions) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), options.lifetime_secs);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// Expired entries are removed and counted as misses. An entry holding
    /// a different type than `T` is a miss and is left in place.
    pub fn get<T: Clone + 'static>(&mut self, key: &str) -> Option<T> {
        let now = self.clock.now_ms();

        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired(now) {
            self.entries.remove(key);
            self.stats.record_expired(1);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        match entry.value_as::<T>() {
            Some(value) => {
                self.stats.record_hit();
                Some(value)
            }
            None => {
                tracing::debug!(key, "cached value has a different type, treating as miss");
                self.stats.record_miss();
                None
            }
        }
    }

    // == Unset ==
    /// Removes an entry by key. Returns whether an entry was present.
    pub fn unset(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Remove Prefixed ==
    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    pub fn remove_prefixed(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        self.stats.set_total_entries(self.entries.len());
        before - self.entries.len()
    }

    // == Sweep Expired ==
    /// Removes all expired entries, read or not.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let removed = before - self.entries.len();
        self.stats.record_expired(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns true if an entry exists for `key`, expired or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the current number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
