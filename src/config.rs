//! Configuration Module
//!
//! Handles loading cache and query settings from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{CacheConfig, DEFAULT_CLEAN_POLLING_INTERVAL_MS, DEFAULT_LIFETIME_SECS};
use crate::models::{BatchOptions, QueryOptions};

const DEFAULT_API_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Background sweep interval in milliseconds
    pub clean_polling_interval_ms: u64,
    /// Collapse concurrent misses for the same key into one fetch
    pub dedupe_in_flight: bool,
    /// Default lifetime of cached query results in seconds
    pub query_lifetime: u64,
    /// Base URL queried by the demo binary
    pub api_base_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CLEAN_POLLING_INTERVAL_MS` - Sweep interval (default: 300000)
    /// - `CACHE_DEDUPE_IN_FLIGHT` - De-duplicate concurrent misses (default: false)
    /// - `QUERY_LIFETIME_SECS` - Cached result lifetime (default: 180)
    /// - `QUERY_API_BASE_URL` - Demo API base URL (default: jsonplaceholder)
    pub fn from_env() -> Self {
        Self {
            clean_polling_interval_ms: env::var("CACHE_CLEAN_POLLING_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&ms| ms > 0)
                .unwrap_or(DEFAULT_CLEAN_POLLING_INTERVAL_MS),
            dedupe_in_flight: env::var("CACHE_DEDUPE_IN_FLIGHT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            query_lifetime: env::var("QUERY_LIFETIME_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LIFETIME_SECS),
            api_base_url: env::var("QUERY_API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        }
    }

    /// Cache settings derived from this config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_polling_interval(Duration::from_millis(self.clean_polling_interval_ms))
            .with_dedupe_in_flight(self.dedupe_in_flight)
    }

    /// Default options for single queries.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions::default().lifetime(self.query_lifetime)
    }

    /// Default options for batches.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::default().lifetime(self.query_lifetime)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clean_polling_interval_ms: DEFAULT_CLEAN_POLLING_INTERVAL_MS,
            dedupe_in_flight: false,
            query_lifetime: DEFAULT_LIFETIME_SECS,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}
