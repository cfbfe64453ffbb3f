//! Cache Options Module
//!
//! Per-write TTL and cache-wide tuning.

use std::time::Duration;

/// Default lifetime of a cached query result, in seconds.
pub const DEFAULT_LIFETIME_SECS: u64 = 180;

/// Default interval between background sweeps, in milliseconds.
pub const DEFAULT_CLEAN_POLLING_INTERVAL_MS: u64 = 5 * 60 * 1000;

// == Cache Options ==
/// TTL applied to a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Seconds until the entry expires
    pub lifetime_secs: u64,
}

impl CacheOptions {
    pub fn lifetime(lifetime_secs: u64) -> Self {
        Self { lifetime_secs }
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::lifetime(DEFAULT_LIFETIME_SECS)
    }
}

// == Cache Config ==
/// Cache-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Interval between background sweeps of expired entries
    pub clean_polling_interval: Duration,
    /// Serialize concurrent misses for the same key so only one fetch runs
    pub dedupe_in_flight: bool,
}

impl CacheConfig {
    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.clean_polling_interval = interval;
        self
    }

    pub fn with_dedupe_in_flight(mut self, enabled: bool) -> Self {
        self.dedupe_in_flight = enabled;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            clean_polling_interval: Duration::from_millis(DEFAULT_CLEAN_POLLING_INTERVAL_MS),
            dedupe_in_flight: false,
        }
    }
}
