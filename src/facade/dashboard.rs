//! Dashboard Cache
//!
//! One cached accessor per dashboard dataset over a shared `TieredCache`.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::{CachedLoader, FetchMode};
use crate::cache::TieredCache;
use crate::error::Result;
use crate::upstream::{DashboardSource, Dataset};

// == Dashboard Cache ==
/// Caches the five dashboard datasets under their fixed keys.
pub struct DashboardCache {
    loader: CachedLoader,
    source: Arc<dyn DashboardSource>,
}

impl DashboardCache {
    /// TTL applied to every dataset unless overridden.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

    pub fn new(cache: Arc<TieredCache>, source: Arc<dyn DashboardSource>) -> Self {
        Self::with_ttl(cache, source, Self::DEFAULT_TTL)
    }

    pub fn with_ttl(
        cache: Arc<TieredCache>,
        source: Arc<dyn DashboardSource>,
        ttl: Duration,
    ) -> Self {
        Self {
            loader: CachedLoader::new(cache, ttl),
            source,
        }
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.loader = self.loader.with_mode(mode);
        self
    }

    pub fn loader(&self) -> &CachedLoader {
        &self.loader
    }

    /// Returns a dataset, fetching it from the source on a miss.
    pub async fn get(&self, dataset: Dataset) -> Result<Value> {
        let source = Arc::clone(&self.source);
        self.loader
            .get_or_fetch(dataset.cache_key(), move || async move {
                source.fetch(dataset).await
            })
            .await
    }

    pub async fn stats(&self) -> Result<Value> {
        self.get(Dataset::Stats).await
    }

    pub async fn grade_distribution(&self) -> Result<Value> {
        self.get(Dataset::GradeDistribution).await
    }

    pub async fn attendance_stats(&self) -> Result<Value> {
        self.get(Dataset::AttendanceStats).await
    }

    pub async fn teacher_workload(&self) -> Result<Value> {
        self.get(Dataset::TeacherWorkload).await
    }

    pub async fn recent_activities(&self) -> Result<Value> {
        self.get(Dataset::RecentActivities).await
    }

    /// Drops every dashboard dataset from the cache.
    pub async fn clear_cache(&self) {
        self.loader
            .invalidate_all(Dataset::ALL.iter().map(|d| d.cache_key()))
            .await;
    }

    /// Drops the headline statistics so the next read refetches them.
    pub async fn invalidate_stats(&self) {
        self.loader.invalidate(Dataset::Stats.cache_key()).await;
    }
}
