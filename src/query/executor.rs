//! Single Query Executor
//!
//! Serves one query from the cache or the transport and publishes every
//! state transition to subscribers.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::error::{QueryError, Result};
use crate::models::{QueryOptions, QueryState};
use crate::query::{Query, QueryResponse};

// == Query Executor ==
/// Runs one query against a shared cache.
///
/// Cloning yields another handle to the same executor and state.
pub struct QueryExecutor<T, R> {
    inner: Arc<ExecutorInner<T, R>>,
}

struct ExecutorInner<T, R> {
    cache: Cache,
    key: String,
    query: Query<R>,
    options: QueryOptions,
    state: watch::Sender<QueryState<T>>,
}

impl<T, R> Clone for QueryExecutor<T, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, R> QueryExecutor<T, R>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    R: QueryResponse,
{
    // == Constructor ==
    /// Creates an executor in the `Idle` state.
    ///
    /// With `options.immediate` set, one [`run`](Self::run) is spawned on the
    /// current Tokio runtime; outside a runtime this fails with
    /// [`QueryError::Configuration`].
    pub fn new(cache: Cache, query: Query<R>, options: QueryOptions) -> Result<Self> {
        let (state, _) = watch::channel(QueryState::idle());
        let executor = Self {
            inner: Arc::new(ExecutorInner {
                key: query.key().resolve(),
                cache,
                query,
                options,
                state,
            }),
        };

        if options.immediate {
            let runtime = Handle::try_current().map_err(|_| {
                QueryError::Configuration(
                    "immediate queries must be created inside a Tokio runtime".to_string(),
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
    /// Runs one query cycle and returns the state it ended in.
    ///
    /// A fresh cached value short-circuits to `Success` without a transport
    /// call. Transport and decode errors end in `Failed` and are never
    /// returned as `Err`.
    pub async fn run(&self) -> QueryState<T> {
        let inner = &self.inner;
        let use_cache = !inner.options.disable_cache;

        let _in_flight = if use_cache {
            inner.cache.lock_key(&inner.key).await
        } else {
            None
        };

        if use_cache {
            if let Some(data) = inner.cache.get::<T>(&inner.key).await {
                debug!(key = %inner.key, "query served from cache");
                return self.commit(QueryState::success(data));
            }
        }

        self.commit(QueryState::loading());
        debug!(key = %inner.key, "query fetching");

        match inner.query.execute::<T>().await {
            Ok(data) => {
                let state = self.commit(QueryState::success(data.clone()));
                if use_cache {
                    inner
                        .cache
                        .set(inner.key.as_str(), data, inner.options.cache_options())
                        .await;
                }
                state
            }
            Err(error) => {
                warn!(key = %inner.key, %error, "query failed");
                self.commit(QueryState::failed(error))
            }
        }
    }

    // == Invalidate ==
    /// Removes this query's cached value. The published state is unchanged.
    pub async fn invalidate(&self) {
        self.inner.cache.unset(&self.inner.key).await;
    }

    // == Revalidate ==
    /// Invalidates, then runs, so the transport is always called.
    pub async fn revalidate(&self) -> QueryState<T> {
        self.invalidate().await;
        self.run().await
    }

    // == Observation ==
    /// Returns the most recently committed state.
    pub fn state(&self) -> QueryState<T> {
        self.inner.state.borrow().clone()
    }

    /// Subscribes to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.inner.state.subscribe()
    }

    /// The resolved cache key of this query.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    fn commit(&self, state: QueryState<T>) -> QueryState<T> {
        self.inner.state.send_replace(state.clone());
        state
    }
}
