//! Persistent Store Module
//!
//! The slow, durable tier behind the memory tier. Any keyed storage that can
//! get, set, remove, enumerate and clear entries satisfies the contract.

mod file;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::CacheEntry;
use crate::error::PersistenceError;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Entry shape held by persistent stores.
pub type StoredEntry = CacheEntry<Value>;

// == Persistent Store ==
/// Asynchronous keyed storage for cache entries.
///
/// Implementations report failures as `PersistenceError`; the cache absorbs
/// them.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Returns the stored entry, `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<StoredEntry>, PersistenceError>;

    /// Stores an entry, replacing any previous one.
    async fn set(&self, key: &str, entry: &StoredEntry) -> Result<(), PersistenceError>;

    /// Removes an entry. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), PersistenceError>;

    /// Enumerates every stored key.
    async fn keys(&self) -> Result<Vec<String>, PersistenceError>;

    /// Removes every entry.
    async fn clear(&self) -> Result<(), PersistenceError>;
}
