//! In-flight Key Locks
//!
//! Per-key async mutexes used to collapse concurrent misses for one key
//! into a single fetch.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

// == Key Locks ==
/// Registry of keys with an outstanding fetch.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyLocks {
    locks: Arc<LockMap>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds `key`, then holds it until the
    /// returned guard is dropped.
    pub async fn acquire(&self, key: &str) -> KeyGuard {
        // The map shard lock is released before awaiting the mutex
        let lock = Arc::clone(
            &*self
                .locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        let guard = lock.lock_owned().await;

        KeyGuard {
            key: key.to_string(),
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }
}

// == Key Guard ==
/// Holds a key lock; releases it and forgets the key once nobody else waits.
#[derive(Debug)]
pub(crate) struct KeyGuard {
    key: String,
    locks: Arc<LockMap>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map itself still references the mutex: no waiters left
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_key_is_forgotten_after_release() {
        let locks = KeyLocks::new();

        let guard = locks.acquire("todos").await;
        assert_eq!(locks.len(), 1);

        drop(guard);
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_second_caller_waits_for_first() {
        let locks = KeyLocks::new();
        let first = locks.acquire("todos").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("todos").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished(), "Second caller should be blocked");

        drop(first);
        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyLocks::new();

        let _a = locks.acquire("a").await;
        let _b = locks.acquire("b").await;
        assert_eq!(locks.len(), 2);
    }
}
