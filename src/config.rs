//! Configuration Module
//!
//! Cache parameters plus the gateway settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::duration_ms;
use crate::error::{CacheError, Result};

// == Cache Config ==
/// Parameters of a `TieredCache`.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Store name, namespaces the persistent tier
    pub name: String,
    /// Store version, a bump starts from an empty persistent tier
    pub version: u32,
    /// Default expiry window for entries set without a custom one
    pub max_age: Duration,
    /// Bound on the number of entries held in memory
    pub max_items: usize,
    /// Interval between two expiry sweeps
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the given name and the default limits.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Rejects configurations the cache cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "cache name cannot be empty".to_string(),
            ));
        }
        if self.max_items == 0 {
            return Err(CacheError::InvalidConfig(
                "max_items must be at least 1".to_string(),
            ));
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "cleanup_interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Default max age in milliseconds.
    pub fn max_age_ms(&self) -> u64 {
        duration_ms(self.max_age)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "school-cache".to_string(),
            version: 1,
            max_age: Duration::from_secs(30 * 60),
            max_items: 100,
            cleanup_interval: Duration::from_secs(5 * 60),
        }
    }
}

// == Server Config ==
/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Parameters of the application cache
    pub cache: CacheConfig,
    /// Root directory of the file-backed persistent tier
    pub cache_dir: String,
    /// TTL applied to dashboard datasets
    pub dashboard_ttl: Duration,
    /// Base URL of the school REST API
    pub upstream_url: String,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAME` - Persistent store name (default: ecole-moliere-cache)
    /// - `CACHE_VERSION` - Persistent store version (default: 1)
    /// - `CACHE_MAX_AGE_SECS` - Default entry max age (default: 1800)
    /// - `CACHE_MAX_ITEMS` - Memory tier bound (default: 1000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `CACHE_DIR` - Persistent tier root directory (default: .cache)
    /// - `DASHBOARD_TTL_SECS` - Dashboard dataset TTL (default: 300)
    /// - `UPSTREAM_URL` - School API base URL (default: http://localhost:8080)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache: CacheConfig {
                name: env::var("CACHE_NAME").unwrap_or(defaults.cache.name),
                version: env_or("CACHE_VERSION", defaults.cache.version),
                max_age: Duration::from_secs(env_or(
                    "CACHE_MAX_AGE_SECS",
                    defaults.cache.max_age.as_secs(),
                )),
                max_items: env_or("CACHE_MAX_ITEMS", defaults.cache.max_items),
                cleanup_interval: Duration::from_secs(env_or(
                    "CLEANUP_INTERVAL",
                    defaults.cache.cleanup_interval.as_secs(),
                )),
            },
            cache_dir: env::var("CACHE_DIR").unwrap_or(defaults.cache_dir),
            dashboard_ttl: Duration::from_secs(env_or(
                "DASHBOARD_TTL_SECS",
                defaults.dashboard_ttl.as_secs(),
            )),
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig {
                name: "ecole-moliere-cache".to_string(),
                max_items: 1000,
                ..CacheConfig::default()
            },
            cache_dir: ".cache".to_string(),
            dashboard_ttl: Duration::from_secs(5 * 60),
            upstream_url: "http://localhost:8080".to_string(),
            server_port: 3000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
