//! Query and Batch Options
//!
//! Per-executor configuration, deserializable from JSON with defaults for
//! every missing field.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheOptions, DEFAULT_LIFETIME_SECS};

fn default_immediate() -> bool {
    true
}

fn default_lifetime() -> u64 {
    DEFAULT_LIFETIME_SECS
}

/// Options recognized by a single query.
///
/// # Fields
/// - `immediate`: run once as soon as the executor is created (default: true)
/// - `lifetime`: seconds a fetched value stays cached (default: 180)
/// - `disable_cache`: never read from or write to the cache (default: false)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOptions {
    #[serde(default = "default_immediate")]
    pub immediate: bool,
    #[serde(default = "default_lifetime")]
    pub lifetime: u64,
    #[serde(default)]
    pub disable_cache: bool,
}

impl QueryOptions {
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    pub fn lifetime(mut self, lifetime: u64) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn disable_cache(mut self, disable_cache: bool) -> Self {
        self.disable_cache = disable_cache;
        self
    }

    /// TTL applied to values written by this query.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions::lifetime(self.lifetime)
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            immediate: default_immediate(),
            lifetime: default_lifetime(),
            disable_cache: false,
        }
    }
}

// == Batch Strategy ==
/// How failures inside a batch are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchStrategy {
    /// One failure fails the whole batch
    All,
    /// Failures become `None` at their position
    #[default]
    AllSettled,
}

/// Options recognized by a batch: the query options plus a strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOptions {
    #[serde(flatten)]
    pub query: QueryOptions,
    #[serde(default)]
    pub strategy: BatchStrategy,
}

impl BatchOptions {
    pub fn strategy(mut self, strategy: BatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn immediate(mut self, immediate: bool) -> Self {
        self.query.immediate = immediate;
        self
    }

    pub fn lifetime(mut self, lifetime: u64) -> Self {
        self.query.lifetime = lifetime;
        self
    }

    pub fn disable_cache(mut self, disable_cache: bool) -> Self {
        self.query.disable_cache = disable_cache;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_options_defaults() {
        let options = QueryOptions::default();
        assert!(options.immediate);
        assert_eq!(options.lifetime, 180);
        assert!(!options.disable_cache);
    }

    #[test]
    fn test_query_options_deserialize_empty() {
        let options: QueryOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, QueryOptions::default());
    }

    #[test]
    fn test_query_options_deserialize_camel_case() {
        let json = r#"{"immediate": false, "lifetime": 60, "disableCache": true}"#;
        let options: QueryOptions = serde_json::from_str(json).unwrap();
        assert!(!options.immediate);
        assert_eq!(options.lifetime, 60);
        assert!(options.disable_cache);
    }

    #[test]
    fn test_batch_options_default_strategy() {
        let options: BatchOptions = serde_json::from_str(r#"{"lifetime": 30}"#).unwrap();
        assert_eq!(options.strategy, BatchStrategy::AllSettled);
        assert_eq!(options.query.lifetime, 30);
        assert!(options.query.immediate);
    }

    #[test]
    fn test_batch_options_strategy_all() {
        let options: BatchOptions = serde_json::from_str(r#"{"strategy": "all"}"#).unwrap();
        assert_eq!(options.strategy, BatchStrategy::All);

        let options: BatchOptions =
            serde_json::from_str(r#"{"strategy": "allSettled"}"#).unwrap();
        assert_eq!(options.strategy, BatchStrategy::AllSettled);
    }

    #[test]
    fn test_cache_options_from_lifetime() {
        let options = QueryOptions::default().lifetime(5);
        assert_eq!(options.cache_options(), CacheOptions::lifetime(5));
    }
}
