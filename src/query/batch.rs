//! Batch Query Executor
//!
//! Runs a fixed, ordered list of queries: cached positions are served from
//! the cache, the rest are fetched under a [`BatchStrategy`], and results are
//! merged back in input order.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::error::{QueryError, Result};
use crate::models::{BatchOptions, BatchStrategy, QueryState};
use crate::query::{Query, QueryResponse};

/// Published state of a batch: one slot per query, `None` where nothing was obtained.
pub type BatchState<T> = QueryState<Vec<Option<T>>>;

// == Batch Query Executor ==
/// Runs a list of queries that share options against one cache.
pub struct BatchQueryExecutor<T, R> {
    inner: Arc<BatchInner<T, R>>,
}

struct BatchInner<T, R> {
    cache: Cache,
    /// Resolved key and query, in input order
    queries: Vec<(String, Query<R>)>,
    options: BatchOptions,
    state: watch::Sender<BatchState<T>>,
}

impl<T, R> Clone for BatchQueryExecutor<T, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, R> BatchQueryExecutor<T, R>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    R: QueryResponse,
{
    // == Constructor ==
    /// Creates a batch executor in the `Idle` state.
    ///
    /// With `immediate` set, one [`run`](Self::run) is spawned on the current
    /// Tokio runtime; outside a runtime this fails with
    /// [`QueryError::Configuration`].
    pub fn new(cache: Cache, queries: Vec<Query<R>>, options: BatchOptions) -> Result<Self> {
        let (state, _) = watch::channel(QueryState::idle());
        let queries = queries
            .into_iter()
            .map(|query| (query.key().resolve(), query))
            .collect();
        let executor = Self {
            inner: Arc::new(BatchInner {
                cache,
                queries,
                options,
                state,
            }),
        };

        if options.query.immediate {
            let runtime = Handle::try_current().map_err(|_| {
                QueryError::Configuration(
                    "immediate batches must be created inside a Tokio runtime".to_string(),
                )
            })?;
            let runner = executor.clone();
            runtime.spawn(async move {
                runner.run().await;
            });
        }

        Ok(executor)
    }

    // == Run ==
    /// Runs one batch cycle and returns the state it ended in.
    ///
    /// The returned data always has one slot per query, in input order.
    pub async fn run(&self) -> BatchState<T> {
        let inner = &self.inner;
        let use_cache = !inner.options.query.disable_cache;

        if inner.queries.is_empty() {
            return self.commit(QueryState::success(Vec::new()));
        }

        // First pass: probe the cache for every position
        let mut slots: Vec<Option<T>> = vec![None; inner.queries.len()];
        if use_cache {
            for (slot, (key, _)) in slots.iter_mut().zip(&inner.queries) {
                *slot = inner.cache.get::<T>(key).await;
            }
            if slots.iter().all(Option::is_some) {
                debug!(size = slots.len(), "batch served from cache");
                return self.commit(QueryState::success(slots));
            }
        }

        let remaining: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| index)
            .collect();

        self.commit(QueryState::loading());
        debug!(
            size = slots.len(),
            remaining = remaining.len(),
            strategy = ?inner.options.strategy,
            "batch fetching"
        );

        let calls: Vec<_> = remaining
            .iter()
            .map(|&index| inner.queries[index].1.execute::<T>())
            .collect();
        let fetched: Vec<Option<T>> = match inner.options.strategy {
            BatchStrategy::All => match try_join_all(calls).await {
                Ok(values) => values.into_iter().map(Some).collect(),
                Err(error) => {
                    warn!(%error, "batch failed");
                    return self.commit(QueryState::failed(error));
                }
            },
            BatchStrategy::AllSettled => join_all(calls)
                .await
                .into_iter()
                .zip(&remaining)
                .map(|(result, &index)| {
                    result
                        .map_err(|error| {
                            warn!(key = %inner.queries[index].0, %error, "batch query failed");
                        })
                        .ok()
                })
                .collect(),
        };

        // Second pass: fresh values overwrite their own position
        for (&index, value) in remaining.iter().zip(fetched) {
            let Some(value) = value else { continue };
            if use_cache {
                let key = inner.queries[index].0.as_str();
                inner
                    .cache
                    .set(key, value.clone(), inner.options.query.cache_options())
                    .await;
            }
            slots[index] = Some(value);
        }

        self.commit(QueryState::success(slots))
    }

    // == Invalidate ==
    /// Removes the cached value of every query in the batch.
    pub async fn invalidate(&self) {
        for (key, _) in &self.inner.queries {
            self.inner.cache.unset(key).await;
        }
    }

    // == Revalidate ==
    /// Invalidates every query, then runs the whole batch.
    pub async fn revalidate(&self) -> BatchState<T> {
        self.invalidate().await;
        self.run().await
    }

    // == Observation ==
    /// Returns the most recently committed state.
    pub fn state(&self) -> BatchState<T> {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<BatchState<T>> {
        self.inner.state.subscribe()
    }

    /// Resolved cache keys, in input order.
    pub fn keys(&self) -> Vec<&str> {
        self.inner.queries.iter().map(|(key, _)| key.as_str()).collect()
    }

    fn commit(&self, state: BatchState<T>) -> BatchState<T> {
        self.inner.state.send_replace(state.clone());
        state
    }
}
