use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-key serialization for card operations.
///
/// Each key maps to a fair async mutex: waiters acquire in enqueue order, so
/// operations on one key observe FIFO ordering while operations on different
/// keys proceed in parallel. The map lives on the owning context; entries are
/// removed on release once no holder or waiter remains.
pub struct KeyLocks {
    map: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self {
            map: StdMutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `key`, waiting behind earlier holders.
    pub async fn acquire(&self, key: &str) -> KeyGuard<'_> {
        let cell = {
            let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(key.to_string()).or_default().clone()
        };
        let permit = cell.clone().lock_owned().await;
        KeyGuard {
            locks: self,
            key: key.to_string(),
            cell,
            permit: Some(permit),
        }
    }

    /// Acquire two distinct keys in ascending sort order, the deadlock-free
    /// ordering used by rename.
    pub async fn acquire_pair(&self, a: &str, b: &str) -> (KeyGuard<'_>, KeyGuard<'_>) {
        debug_assert_ne!(a, b, "acquire_pair requires distinct keys");
        if a <= b {
            let first = self.acquire(a).await;
            let second = self.acquire(b).await;
            (first, second)
        } else {
            let second = self.acquire(b).await;
            let first = self.acquire(a).await;
            (first, second)
        }
    }

    /// Number of keys currently locked or waited on.
    pub fn active_keys(&self) -> usize {
        self.map.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the per-key lock until dropped.
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    cell: Arc<AsyncMutex<()>>,
    permit: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.permit.take();
        let mut map = self.locks.map.lock().unwrap_or_else(|e| e.into_inner());
        // Two strong refs left (map entry + ours) means nobody is holding or
        // waiting; drop the entry so the map does not grow unboundedly.
        if Arc::strong_count(&self.cell) == 2 {
            map.remove(&self.key);
        }
    }
}
