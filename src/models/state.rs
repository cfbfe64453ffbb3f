//! Query State
//!
//! The observable result of one logical fetch.

use crate::error::QueryError;

// == Query Status ==
/// Coarse phase of a query cycle, derived from [`QueryState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Failed,
}

// == Query State ==
/// Data, loading flag, and error of the most recent query cycle.
///
/// `is_loading` is only ever set with no data and no error; an error is only
/// ever set with `is_loading == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<QueryError>,
}

impl<T> QueryState<T> {
    /// Initial state: not loading, nothing fetched.
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }

    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            error: None,
        }
    }

    pub fn failed(error: QueryError) -> Self {
        Self {
            data: None,
            is_loading: false,
            error: Some(error),
        }
    }

    pub fn status(&self) -> QueryStatus {
        match (self.is_loading, &self.data, &self.error) {
            (true, _, _) => QueryStatus::Loading,
            (false, _, Some(_)) => QueryStatus::Failed,
            (false, Some(_), None) => QueryStatus::Success,
            (false, None, None) => QueryStatus::Idle,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}
