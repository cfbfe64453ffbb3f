//! Query models
//!
//! Options accepted by executors and the state they publish.

pub mod options;
pub mod state;

// Re-export commonly used types
pub use options::{BatchOptions, BatchStrategy, QueryOptions};
pub use state::{QueryState, QueryStatus};
