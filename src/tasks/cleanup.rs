//! Expiry Sweep Task
//!
//! Background task that periodically removes expired entries from both tiers.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TieredCache;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// The task only holds a weak reference: it exits on the first tick after the
/// cache has been dropped, and `TieredCache::dispose` aborts it earlier.
///
/// # Arguments
/// * `cache` - Weak reference to the cache to sweep
/// * `interval` - Time between two sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort it.
pub fn spawn_cleanup_task(cache: Weak<TieredCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(cache) = cache.upgrade() else {
                debug!("Cache dropped, stopping expiry sweep task");
                break;
            };

            let report = cache.cleanup_expired().await;

            if report.total() > 0 {
                info!(
                    memory_removed = report.memory_removed,
                    persistent_removed = report.persistent_removed,
                    "Expiry sweep removed expired entries"
                );
            } else {
                debug!("Expiry sweep: no expired entries found");
            }
        }
    })
}
