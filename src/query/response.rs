//! Query Responses
//!
//! The response side of a transport: anything that can decode its body
//! into a typed value.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::error::{QueryError, Result};

// == Query Response ==
/// A response whose body can be decoded asynchronously.
///
/// Decode errors surface as [`QueryError::Decode`]; implementations that
/// carry a status report non-success as [`QueryError::Transport`].
pub trait QueryResponse: Send + Sized + 'static {
    fn json<T>(self) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send;
}

impl QueryResponse for reqwest::Response {
    fn json<T>(self) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            let response = self.error_for_status()?;
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        }
    }
}

impl QueryResponse for serde_json::Value {
    fn json<T>(self) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move { serde_json::from_value(self).map_err(QueryError::from) }
    }
}

impl QueryResponse for String {
    fn json<T>(self) -> impl Future<Output = Result<T>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move { serde_json::from_str(&self).map_err(QueryError::from) }
    }
}
