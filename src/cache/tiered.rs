//! Tiered Cache Module
//!
//! Main cache engine: a bounded in-memory tier in front of an asynchronous
//! persistent tier, with per-entry expiry.
//!
//! The memory tier is authoritative. The persistent tier is a warm-start
//! optimisation: every write to it is best-effort, its failures are logged and
//! absorbed, and it may lag behind memory.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{
    current_timestamp_ms, duration_ms, CacheEntry, CacheStats, InsertionOrder, StorageReport,
    SweepReport, MAX_KEY_LENGTH,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, PersistenceError, Result};
use crate::storage::{PersistentStore, StoredEntry};
use crate::tasks::spawn_cleanup_task;

// == Memory Tier ==
/// Entries, their insertion order and the counters, guarded together.
#[derive(Debug, Default)]
struct MemoryTier {
    entries: HashMap<String, StoredEntry>,
    order: InsertionOrder,
    stats: CacheStats,
}

/// Result of a memory-tier lookup.
enum Lookup {
    Hit(StoredEntry),
    Expired,
    Absent,
}

impl MemoryTier {
    /// Inserts an entry and enforces the capacity bound.
    ///
    /// Returns the key evicted to make room, if any.
    fn insert(&mut self, key: &str, entry: StoredEntry, max_items: usize) -> Option<String> {
        self.entries.insert(key.to_string(), entry);
        self.order.push(key);

        if self.order.len() <= max_items {
            return None;
        }
        let evicted = self.order.pop_oldest()?;
        self.entries.remove(&evicted);
        self.stats.record_eviction();
        Some(evicted)
    }

    fn lookup(&mut self, key: &str, now: u64) -> Lookup {
        let expired = match self.entries.get(key) {
            None => return Lookup::Absent,
            Some(entry) => entry.is_expired_at(now),
        };

        if expired {
            self.remove(key);
            self.stats.record_expirations(1);
            return Lookup::Expired;
        }

        match self.entries.get(key) {
            Some(entry) => Lookup::Hit(entry.clone()),
            None => Lookup::Absent,
        }
    }

    fn live_entry(&self, key: &str, now: u64) -> Option<&StoredEntry> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
    }

    fn remove(&mut self, key: &str) -> bool {
        self.order.remove(key);
        self.entries.remove(key).is_some()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn purge_expired(&mut self, now: u64) -> Vec<String> {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired
    }
}

// == Tiered Cache ==
/// Two-tier cache with FIFO capacity eviction and TTL expiry.
pub struct TieredCache {
    config: CacheConfig,
    memory: RwLock<MemoryTier>,
    store: Arc<dyn PersistentStore>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TieredCache {
    // == Constructor ==
    /// Creates a cache without a background sweep.
    pub fn new(config: CacheConfig, store: Arc<dyn PersistentStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            memory: RwLock::new(MemoryTier::default()),
            store,
            sweeper: Mutex::new(None),
        })
    }

    /// Creates a shared cache and starts its periodic sweep.
    ///
    /// The sweep lives as long as the cache: it stops on `dispose` or when the
    /// last `Arc` is dropped. Must be called within a tokio runtime.
    pub fn start(config: CacheConfig, store: Arc<dyn PersistentStore>) -> Result<Arc<Self>> {
        let cache = Arc::new(Self::new(config, store)?);
        let handle = spawn_cleanup_task(Arc::downgrade(&cache), cache.config.cleanup_interval);
        if let Ok(mut slot) = cache.sweeper.lock() {
            *slot = Some(handle);
        }
        info!(
            name = %cache.config.name,
            version = cache.config.version,
            max_items = cache.config.max_items,
            "Tiered cache started"
        );
        Ok(cache)
    }

    /// Stops the periodic sweep. Idempotent.
    pub fn dispose(&self) {
        let handle = match self.sweeper.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            handle.abort();
            info!(name = %self.config.name, "Tiered cache sweep stopped");
        }
    }

    /// True while a periodic sweep is attached to this cache.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Set ==
    /// Stores a value under `key`.
    ///
    /// The memory tier is updated before any persistent I/O, so a following
    /// `get` by the same caller observes the new value. Persistence failures
    /// are logged, never returned. `custom_max_age` of `None` or zero uses the
    /// configured default.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        custom_max_age: Option<Duration>,
    ) -> Result<()> {
        validate_key(key)?;
        let value = serde_json::to_value(value)?;
        let max_age = custom_max_age
            .filter(|age| !age.is_zero())
            .map(duration_ms)
            .unwrap_or_else(|| self.config.max_age_ms());
        let entry = CacheEntry::new(value, max_age);

        let evicted = self
            .memory
            .write()
            .await
            .insert(key, entry.clone(), self.config.max_items);

        if let Some(evicted) = evicted {
            debug!(key = %evicted, "Evicted oldest entry from memory tier");
            self.remove_persistent(&evicted).await;
        }

        if let Err(e) = self.store.set(key, &entry).await {
            self.persistence_failed(key, "write", &e).await;
        }
        Ok(())
    }

    // == Get ==
    /// Retrieves the live value under `key`, `None` on a miss.
    ///
    /// Errors only when a live value cannot be deserialized as `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_entry(key).await {
            Some(entry) => Ok(Some(serde_json::from_value(entry.value)?)),
            None => Ok(None),
        }
    }

    /// Retrieves the live entry under `key`, promoting it from the persistent
    /// tier when memory does not hold it.
    pub async fn get_entry(&self, key: &str) -> Option<StoredEntry> {
        let expired_in_memory = {
            let mut memory = self.memory.write().await;
            match memory.lookup(key, current_timestamp_ms()) {
                Lookup::Hit(entry) => {
                    memory.stats.record_memory_hit();
                    return Some(entry);
                }
                Lookup::Expired => true,
                Lookup::Absent => false,
            }
        };

        let stored = match self.store.get(key).await {
            Ok(stored) => stored,
            Err(e) => {
                self.persistence_failed(key, "read", &e).await;
                self.memory.write().await.stats.record_miss();
                return None;
            }
        };

        match stored {
            Some(entry) if !entry.is_expired() => Some(self.promote(key, entry).await),
            Some(_) => {
                {
                    let mut memory = self.memory.write().await;
                    // Already counted when the memory copy expired
                    if !expired_in_memory {
                        memory.stats.record_expirations(1);
                    }
                    memory.stats.record_miss();
                }
                self.remove_persistent(key).await;
                None
            }
            None => {
                self.memory.write().await.stats.record_miss();
                None
            }
        }
    }

    /// Moves a persistent hit into memory under the capacity bound.
    ///
    /// A live entry written to memory meanwhile wins over the stored one.
    async fn promote(&self, key: &str, entry: StoredEntry) -> StoredEntry {
        let (entry, evicted) = {
            let mut memory = self.memory.write().await;
            memory.stats.record_persistent_hit();
            if let Some(current) = memory.live_entry(key, current_timestamp_ms()) {
                (current.clone(), None)
            } else {
                let evicted = memory.insert(key, entry.clone(), self.config.max_items);
                (entry, evicted)
            }
        };

        if let Some(evicted) = evicted {
            debug!(key = %evicted, "Evicted oldest entry while promoting");
            self.remove_persistent(&evicted).await;
        }
        entry
    }

    // == Remove ==
    /// Removes `key` from both tiers.
    pub async fn remove(&self, key: &str) {
        self.memory.write().await.remove(key);
        self.remove_persistent(key).await;
    }

    // == Clear ==
    /// Empties both tiers.
    pub async fn clear(&self) {
        self.memory.write().await.clear();
        if let Err(e) = self.store.clear().await {
            self.persistence_failed("*", "clear", &e).await;
        }
    }

    // == Cleanup Expired ==
    /// Removes every expired entry from both tiers.
    ///
    /// Walks the whole persistent key space without holding the memory lock,
    /// so it interleaves with other operations; each per-key step is atomic
    /// but the sweep as a whole is not a snapshot.
    pub async fn cleanup_expired(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let mut expired_keys = HashSet::new();

        match self.store.keys().await {
            Ok(keys) => {
                for key in keys {
                    match self.store.get(&key).await {
                        Ok(Some(entry)) if entry.is_expired() => {
                            if self.remove_persistent(&key).await {
                                report.persistent_removed += 1;
                                expired_keys.insert(key);
                            }
                        }
                        Ok(_) => {}
                        Err(e) => self.persistence_failed(&key, "read", &e).await,
                    }
                }
            }
            Err(e) => self.persistence_failed("*", "enumerate", &e).await,
        }

        let mut memory = self.memory.write().await;
        let purged = memory.purge_expired(current_timestamp_ms());
        report.memory_removed = purged.len();
        expired_keys.extend(purged);
        // A key expired in both tiers counts once
        memory.stats.record_expirations(expired_keys.len());
        report
    }

    // == Introspection ==
    /// Returns current cache counters.
    pub async fn stats(&self) -> CacheStats {
        self.memory.read().await.stats.clone()
    }

    /// Number of entries in the memory tier.
    pub async fn memory_len(&self) -> usize {
        self.memory.read().await.entries.len()
    }

    /// Memory-tier keys from oldest to newest insertion.
    pub async fn memory_keys(&self) -> Vec<String> {
        self.memory
            .read()
            .await
            .order
            .iter()
            .map(str::to_string)
            .collect()
    }

    /// True if the memory tier holds `key`, live or not.
    pub async fn contains_in_memory(&self, key: &str) -> bool {
        self.memory.read().await.entries.contains_key(key)
    }

    /// Number of keys in the persistent tier, zero if it cannot be enumerated.
    pub async fn persistent_len(&self) -> usize {
        match self.store.keys().await {
            Ok(keys) => keys.len(),
            Err(e) => {
                self.persistence_failed("*", "enumerate", &e).await;
                0
            }
        }
    }

    /// Reports what each tier holds, with the age range of persisted entries.
    pub async fn storage_report(&self) -> StorageReport {
        let memory_items = self.memory_len().await;
        let keys = match self.store.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                self.persistence_failed("*", "enumerate", &e).await;
                Vec::new()
            }
        };

        let mut timestamps = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.store.get(key).await {
                Ok(Some(entry)) => timestamps.push(entry.timestamp),
                Ok(None) => {}
                Err(e) => self.persistence_failed(key, "read", &e).await,
            }
        }

        StorageReport::from_timestamps(memory_items, keys.len(), &timestamps)
    }

    // == Persistence Helpers ==
    async fn remove_persistent(&self, key: &str) -> bool {
        match self.store.remove(key).await {
            Ok(()) => true,
            Err(e) => {
                self.persistence_failed(key, "remove", &e).await;
                false
            }
        }
    }

    async fn persistence_failed(&self, key: &str, op: &'static str, error: &PersistenceError) {
        warn!(key, op, error = %error, "Persistent tier operation failed");
        self.memory.write().await.stats.record_persistence_error();
    }
}

impl Drop for TieredCache {
    fn drop(&mut self) {
        if let Ok(slot) = self.sweeper.get_mut() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
