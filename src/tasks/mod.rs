//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - TTL Sweep: Removes expired cache entries at the configured polling interval

mod sweep;

pub use sweep::spawn_sweep_task;
