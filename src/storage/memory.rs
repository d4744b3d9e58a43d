//! In-memory key-value store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

// == Call Counts ==
/// Number of calls made against each store operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CallCounts {
    pub get: u64,
    pub set: u64,
    pub remove: u64,
    pub list_keys: u64,
    pub remove_many: u64,
}

impl CallCounts {
    /// Sum of all recorded calls.
    pub fn total(&self) -> u64 {
        self.get + self.set + self.remove + self.list_keys + self.remove_many
    }
}

// == Memory Store ==
/// Key-value store held entirely in process memory.
///
/// Every call is counted, and the store can be switched into a failing
/// state where each operation returns `StorageError::Unavailable`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    failing: AtomicBool,
    gets: AtomicU64,
    sets: AtomicU64,
    removes: AtomicU64,
    list_keys_calls: AtomicU64,
    remove_many_calls: AtomicU64,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns a snapshot of the per-operation call counters.
    pub fn call_counts(&self) -> CallCounts {
        CallCounts {
            get: self.gets.load(Ordering::SeqCst),
            set: self.sets.load(Ordering::SeqCst),
            remove: self.removes.load(Ordering::SeqCst),
            list_keys: self.list_keys_calls.load(Ordering::SeqCst),
            remove_many: self.remove_many_calls.load(Ordering::SeqCst),
        }
    }

    /// Number of stored keys. Not counted as a call.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Reads a value without going through the counted trait path.
    pub async fn peek(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    fn check(&self, counter: &AtomicU64, op: &str) -> Result<(), StorageError> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "memory store is failing ({op})"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check(&self.gets, "get")?;
        trace!(key, "Memory store get");
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(&self.sets, "set")?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check(&self.removes, "remove")?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        self.check(&self.list_keys_calls, "list_keys")?;
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), StorageError> {
        self.check(&self.remove_many_calls, "remove_many")?;
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("theme", "dark").await.unwrap();

        assert_eq!(store.get("theme").await.unwrap(), Some("dark".to_string()));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("never_set").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_and_remove_many() {
        let store = MemoryStore::new();
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("c", "3").await.unwrap();

        store
            .remove_many(&["a".to_string(), "c".to_string(), "zz".to_string()])
            .await
            .unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_call_counts() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        store.get("k").await.unwrap();
        store.get("k").await.unwrap();
        store.list_keys().await.unwrap();

        let counts = store.call_counts();
        assert_eq!(counts.set, 1);
        assert_eq!(counts.get, 2);
        assert_eq!(counts.list_keys, 1);
        assert_eq!(counts.total(), 4);

        // Inspection helpers are not counted
        let _ = store.peek("k").await;
        let _ = store.len().await;
        assert_eq!(store.call_counts().total(), 4);
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = MemoryStore::new();
        store.set("k", "v").await.unwrap();
        store.set_failing(true);

        assert!(matches!(
            store.get("k").await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(store.set("k", "w").await.is_err());
        assert!(store.list_keys().await.is_err());

        store.set_failing(false);
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }
}
