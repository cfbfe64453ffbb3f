//! Error types for the query cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Query Error Enum ==
/// Unified error type for queries and cache construction.
///
/// Errors are `Clone` so they can be published inside a
/// [`QueryState`](crate::models::QueryState) to every subscriber.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The fetch function failed or the response carried a non-success status
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The response body could not be decoded into the expected shape
    #[error("Decode failure: {0}")]
    Decode(String),

    /// Cache or executor used outside of a properly initialized context
    #[error("Configuration error: {0}")]
    Configuration(String),
}

// == Conversions ==
impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        QueryError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            QueryError::Decode(err.to_string())
        } else {
            QueryError::Transport(err.to_string())
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the query cache.
pub type Result<T> = std::result::Result<T, QueryError>;
