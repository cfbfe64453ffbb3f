//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task sleeps for `interval` between sweeps and takes the store's write
/// lock only for the duration of one sweep. It holds a weak reference, so it
/// exits on its own once the store has been dropped.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(CacheStore::new(Arc::new(SystemClock))));
/// let handle = spawn_sweep_task(Arc::downgrade(&store), Duration::from_secs(300));
/// // Later:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(store: Weak<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting TTL sweep task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = store.upgrade() else {
                debug!("Cache dropped, stopping TTL sweep task");
                break;
            };

            let removed = store.write().await.sweep_expired();

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
