//! Query Module
//!
//! Single and batched query executors running on top of a shared [`Cache`].
//!
//! [`Cache`]: crate::cache::Cache

mod batch;
mod executor;
mod response;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;

use crate::cache::CacheKey;
use crate::error::Result;

pub use batch::{BatchQueryExecutor, BatchState};
pub use executor::QueryExecutor;
pub use response::QueryResponse;

type FetchFn<R> = Arc<dyn Fn() -> BoxFuture<'static, Result<R>> + Send + Sync>;

// == Query ==
/// A cache key paired with the transport call that produces its value.
pub struct Query<R> {
    key: CacheKey,
    fetch: FetchFn<R>,
}

impl<R: QueryResponse> Query<R> {
    /// Creates a query from a key and a zero-argument async fetch function.
    ///
    /// ```no_run
    /// use query_cache::{cache_key, Query, QueryError};
    ///
    /// let query = Query::new(cache_key!["todos", 1], || async {
    ///     let response = reqwest::get("https://jsonplaceholder.typicode.com/todos/1").await?;
    ///     Ok::<_, QueryError>(response)
    /// });
    /// ```
    pub fn new<K, F, Fut>(key: K, fetch: F) -> Self
    where
        K: Into<CacheKey>,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        Self {
            key: key.into(),
            fetch: Arc::new(move || fetch().boxed()),
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Calls the transport and decodes the response body.
    pub(crate) async fn execute<T>(&self) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let response = (self.fetch)().await?;
        response.json::<T>().await
    }
}

impl<R> Clone for Query<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<R> fmt::Debug for Query<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
