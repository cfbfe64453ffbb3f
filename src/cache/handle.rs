//! Shared Cache Handle
//!
//! Thread-safe, cheaply cloneable front for a [`CacheStore`] with a
//! background sweep task.

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::locks::{KeyGuard, KeyLocks};
use crate::cache::{CacheConfig, CacheOptions, CacheStats, CacheStore, Clock, SystemClock};
use crate::error::{QueryError, Result};
use crate::tasks::spawn_sweep_task;

// == Cache ==
/// In-memory TTL cache shared by every executor that was handed a clone.
///
/// Cloning is cheap; all clones see the same entries. The background sweep
/// stops when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Cache {
    inner: Arc<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    store: Arc<RwLock<CacheStore>>,
    config: CacheConfig,
    in_flight: KeyLocks,
    sweeper: Option<JoinHandle<()>>,
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

impl Cache {
    // == Constructors ==
    /// Creates a cache on the wall clock and starts its sweep task.
    ///
    /// Fails with [`QueryError::Configuration`] outside a Tokio runtime or
    /// when the polling interval is zero.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock` and starts its sweep task.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        if config.clean_polling_interval.is_zero() {
            return Err(QueryError::Configuration(
                "clean polling interval must be greater than zero".to_string(),
            ));
        }
        Handle::try_current().map_err(|_| {
            QueryError::Configuration(
                "cache must be created inside a Tokio runtime to run its sweep task".to_string(),
            )
        })?;

        let store = Arc::new(RwLock::new(CacheStore::new(clock)));
        let sweeper = spawn_sweep_task(Arc::downgrade(&store), config.clean_polling_interval);

        Ok(Self::from_parts(store, config, Some(sweeper)))
    }

    /// Creates a cache with no background sweep.
    ///
    /// Expired entries are still never returned; they are removed on read or
    /// by an explicit [`sweep_expired`](Self::sweep_expired).
    pub fn without_sweeper(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(RwLock::new(CacheStore::new(clock)));
        Self::from_parts(store, config, None)
    }

    fn from_parts(
        store: Arc<RwLock<CacheStore>>,
        config: CacheConfig,
        sweeper: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                store,
                config,
                in_flight: KeyLocks::new(),
                sweeper,
            }),
        }
    }

    // == Reads and Writes ==
    /// Returns the value under `key`, or `None` if absent, expired, or of
    /// another type. Expired entries are deleted as a side effect.
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        // Write lock: a read may evict and always updates stats
        self.inner.store.write().await.get::<T>(key)
    }

    /// Stores `value` under `key`, replacing any existing entry.
    pub async fn set<T>(&self, key: impl Into<String>, value: T, options: CacheOptions)
    where
        T: Send + Sync + 'static,
    {
        self.inner
            .store
            .write()
            .await
            .set(key.into(), value, options);
    }

    /// Returns the cached value, or awaits `factory`, caches its value, and
    /// returns it.
    ///
    /// A factory error is returned unchanged and nothing is stored. Unless
    /// [`CacheConfig::dedupe_in_flight`] is set, concurrent calls for the
    /// same missing key each run their own factory.
    pub async fn get_or_set<T, E, F, Fut>(
        &self,
        key: &str,
        factory: F,
        options: CacheOptions,
    ) -> std::result::Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let _in_flight = self.lock_key(key).await;

        if let Some(value) = self.get::<T>(key).await {
            return Ok(value);
        }

        debug!(key, "cache miss, running factory");
        let value = factory().await?;
        self.set(key, value.clone(), options).await;
        Ok(value)
    }

    /// Removes the entry under `key`; no-op if absent.
    pub async fn unset(&self, key: &str) {
        self.inner.store.write().await.unset(key);
    }

    /// Removes every entry whose key starts with `prefix`, returning the count.
    pub async fn remove_prefixed(&self, prefix: &str) -> usize {
        let removed = self.inner.store.write().await.remove_prefixed(prefix);
        debug!(prefix, removed, "removed prefixed entries");
        removed
    }

    /// Removes all expired entries now, returning the count.
    pub async fn sweep_expired(&self) -> usize {
        self.inner.store.write().await.sweep_expired()
    }

    // == Introspection ==
    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.store.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.store.read().await.stats()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Number of keys with a fetch currently holding or awaiting the
    /// in-flight lock. Always zero when de-duplication is off.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Holds `key` for the duration of one fetch when de-duplication is on.
    pub(crate) async fn lock_key(&self, key: &str) -> Option<KeyGuard> {
        if self.inner.config.dedupe_in_flight {
            Some(self.inner.in_flight.acquire(key).await)
        } else {
            None
        }
    }
}
