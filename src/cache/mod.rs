//! Cache Module
//!
//! Provides the in-memory TTL cache, its key resolution, and time sources.

mod clock;
mod entry;
mod handle;
mod key;
mod locks;
mod options;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use handle::Cache;
pub use key::{resolve, CacheKey, KeySegment, KEY_SEPARATOR};
pub use options::{CacheConfig, CacheOptions, DEFAULT_CLEAN_POLLING_INTERVAL_MS, DEFAULT_LIFETIME_SECS};
pub use stats::CacheStats;
pub use store::CacheStore;
