//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

// == Cache Entry ==
/// A single stored value together with its absolute expiry.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value, type-erased
    pub value: Arc<dyn Any + Send + Sync>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry that expires `lifetime_secs` after `now_ms`.
    pub fn new<T: Send + Sync + 'static>(value: T, now_ms: u64, lifetime_secs: u64) -> Self {
        Self {
            value: Arc::new(value),
            created_at: now_ms,
            expires_at: now_ms.saturating_add(lifetime_secs.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry stays valid up to and including its
    /// expiration millisecond, and is expired strictly after it.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }

    // == Downcast ==
    /// Returns a clone of the value if it was stored as a `T`.
    pub fn value_as<T: Clone + 'static>(&self) -> Option<T> {
        self.value.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
