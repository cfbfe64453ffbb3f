//! Query Cache - A client-side request cache
//!
//! Serves repeated fetches from an in-memory TTL cache, sweeps stale entries
//! in the background, and batches independent fetches with all-or-partial
//! failure semantics.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod tasks;

pub use cache::{Cache, CacheConfig, CacheKey, CacheOptions};
pub use config::Config;
pub use error::{QueryError, Result};
pub use models::{BatchOptions, BatchStrategy, QueryOptions, QueryState, QueryStatus};
pub use query::{BatchQueryExecutor, BatchState, Query, QueryExecutor, QueryResponse};
