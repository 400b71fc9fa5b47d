use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-pull-request async locks
///
/// Operations that read-modify-write one pull request hold its lock for
/// their whole duration, which gives every pull request a single total order
/// of `create`, `merge` and `reassign` within this process.
#[derive(Debug, Default)]
pub struct PrLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl PrLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `pr_id`
    pub async fn acquire(&self, pr_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Entries nobody holds or waits on can go
            locks.retain(|id, lock| id == pr_id || Arc::strong_count(lock) > 1);
            locks
                .entry(pr_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }

    /// Number of pull requests with a live lock entry
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
