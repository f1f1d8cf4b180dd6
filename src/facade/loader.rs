//! Cached Loader
//!
//! Get-or-fetch over a `TieredCache`: look the key up, and on a miss run the
//! caller's fetch, store the result with the loader's TTL and return it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{validate_key, TieredCache};
use crate::error::{FetchError, Result};

type SharedFetch = Shared<BoxFuture<'static, std::result::Result<Value, FetchError>>>;

// == Fetch Mode ==
/// How concurrent misses on the same key are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchMode {
    /// Every caller that misses runs its own fetch.
    #[default]
    Independent,
    /// Concurrent misses on a key share one in-flight fetch.
    SingleFlight,
}

// == Cached Loader ==
/// Binds remote fetches to cache keys under a shared TTL.
pub struct CachedLoader {
    cache: Arc<TieredCache>,
    ttl: Duration,
    mode: FetchMode,
    in_flight: Arc<Mutex<HashMap<String, SharedFetch>>>,
}

impl CachedLoader {
    pub fn new(cache: Arc<TieredCache>, ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            mode: FetchMode::default(),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn cache(&self) -> &Arc<TieredCache> {
        &self.cache
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Returns the cached value under `key`, fetching and caching it on a miss.
    ///
    /// A fetch failure is returned as `CacheError::Fetch` and nothing is cached.
    /// No retries and no deadline: a hanging fetch hangs the caller.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, FetchError>> + Send + 'static,
    {
        validate_key(key)?;

        if let Some(hit) = self.cache.get::<T>(key).await? {
            return Ok(hit);
        }

        match self.mode {
            FetchMode::Independent => {
                debug!(key, "Cache miss, fetching");
                let value = fetch().await?;
                self.cache.set(key, &value, Some(self.ttl)).await?;
                Ok(value)
            }
            FetchMode::SingleFlight => {
                let shared = self.join_or_start(key, fetch).await;
                let value = shared.await?;
                Ok(serde_json::from_value(value)?)
            }
        }
    }

    /// Returns the in-flight fetch for `key`, starting one if none is running.
    async fn join_or_start<T, F, Fut>(&self, key: &str, fetch: F) -> SharedFetch
    where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, FetchError>> + Send + 'static,
    {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(running) = in_flight.get(key) {
            debug!(key, "Joining in-flight fetch");
            return running.clone();
        }

        debug!(key, "Cache miss, starting shared fetch");
        let pending = fetch();
        let cache = Arc::clone(&self.cache);
        let table = Arc::clone(&self.in_flight);
        let ttl = self.ttl;
        let owned_key = key.to_string();

        let shared = async move {
            let outcome = match pending.await {
                Ok(value) => serde_json::to_value(&value)
                    .map_err(|e| FetchError::Decode(e.to_string())),
                Err(e) => Err(e),
            };
            if let Ok(value) = &outcome {
                if let Err(e) = cache.set(&owned_key, value, Some(ttl)).await {
                    warn!(key = %owned_key, error = %e, "Failed to cache fetched value");
                }
            }
            // Cached before leaving the table, so later callers hit the cache
            table.lock().await.remove(&owned_key);
            outcome
        }
        .boxed()
        .shared();

        in_flight.insert(key.to_string(), shared.clone());
        shared
    }

    /// Removes one key from the cache.
    pub async fn invalidate(&self, key: &str) {
        self.cache.remove(key).await;
    }

    /// Removes several keys from the cache.
    pub async fn invalidate_all<'a>(&self, keys: impl IntoIterator<Item = &'a str>) {
        for key in keys {
            self.cache.remove(key).await;
        }
    }
}
