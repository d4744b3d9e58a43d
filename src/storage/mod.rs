//! Storage Module
//!
//! Durable key-value tier consumed by the image cache.
//!
//! Values are opaque text; the cache encodes its own records before calling
//! into a backend. Two backends ship with the crate:
//! - `MemoryStore` - in-process map, used as a test fake and when no storage
//!   path is configured
//! - `FileStore` - JSON document on disk that survives process restarts

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::StorageError;

pub use file::FileStore;
pub use memory::{CallCounts, MemoryStore};

// == Key-Value Store ==
/// Capability contract for the durable tier.
///
/// Single-key operations are assumed atomic. No ordering is guaranteed
/// between concurrent callers.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Lists every key in the store, including keys owned by other callers.
    async fn list_keys(&self) -> Result<Vec<String>, StorageError>;

    /// Removes every key in `keys`.
    async fn remove_many(&self, keys: &[String]) -> Result<(), StorageError>;
}
