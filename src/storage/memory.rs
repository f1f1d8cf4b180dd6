//! In-process persistent store
//!
//! Non-durable stand-in for the persistent tier, with switches to inject
//! failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{PersistentStore, StoredEntry};
use crate::error::PersistenceError;

// == Memory Store ==
/// HashMap-backed `PersistentStore`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_removes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `get` and `keys` fail until switched off.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `set` and `clear` fail until switched off.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes `remove` fail until switched off.
    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<(), PersistenceError> {
        if flag.load(Ordering::SeqCst) {
            Err(PersistenceError::Unavailable(format!("{} rejected", op)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredEntry>, PersistenceError> {
        Self::check(&self.fail_reads, "read")?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, entry: &StoredEntry) -> Result<(), PersistenceError> {
        Self::check(&self.fail_writes, "write")?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), entry.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        Self::check(&self.fail_removes, "remove")?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        Self::check(&self.fail_reads, "read")?;
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        Self::check(&self.fail_writes, "write")?;
        self.entries.write().await.clear();
        Ok(())
    }
}
