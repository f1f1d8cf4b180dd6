//! School Cache - tiered cache for the school administration dashboard
//!
//! A bounded in-memory tier over a persistent tier with per-entry TTL expiry,
//! typed facades binding dashboard datasets to cache keys, and an HTTP gateway
//! serving those datasets.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod facade;
pub mod models;
pub mod storage;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::TieredCache;
pub use config::{CacheConfig, Config};
pub use error::{CacheError, FetchError, PersistenceError};
pub use facade::{CachedLoader, DashboardCache, FetchMode};
pub use storage::{FileStore, MemoryStore, PersistentStore};
pub use tasks::spawn_cleanup_task;
