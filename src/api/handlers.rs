//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{SweepReport, TieredCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::facade::DashboardCache;
use crate::models::{
    CacheStatsResponse, ClearResponse, HealthResponse, InvalidateRequest, InvalidateResponse,
};
use crate::upstream::{DashboardSource, Dataset, HttpDashboardSource};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide application cache
    pub cache: Arc<TieredCache>,
    /// Dashboard datasets bound to the application cache
    pub dashboard: Arc<DashboardCache>,
}

impl AppState {
    /// Creates a new AppState around an existing cache and dashboard source.
    pub fn new(cache: Arc<TieredCache>, source: Arc<dyn DashboardSource>) -> Self {
        let dashboard = DashboardCache::new(Arc::clone(&cache), source);
        Self::with_dashboard(cache, dashboard)
    }

    pub fn with_dashboard(cache: Arc<TieredCache>, dashboard: DashboardCache) -> Self {
        Self {
            cache,
            dashboard: Arc::new(dashboard),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The dashboard reads go to the configured upstream with the configured TTL.
    pub fn from_config(config: &Config, cache: Arc<TieredCache>) -> Self {
        let source = Arc::new(HttpDashboardSource::new(config.upstream_url.clone()));
        let dashboard = DashboardCache::with_ttl(Arc::clone(&cache), source, config.dashboard_ttl);
        Self::with_dashboard(cache, dashboard)
    }
}

/// Handler for GET /api/dashboard/*dataset
///
/// Serves a dashboard dataset from the cache, fetching it upstream on a miss.
pub async fn dataset_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<Value>> {
    let dataset = Dataset::from_path(&path).ok_or(CacheError::UnknownDataset(path))?;
    let value = state.dashboard.get(dataset).await?;
    Ok(Json(value))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache.stats().await;
    let storage = state.cache.storage_report().await;
    Json(CacheStatsResponse::new(stats, storage))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear().await;
    Json(ClearResponse::cleared())
}

/// Handler for DELETE /cache/:key
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    state.cache.remove(&key).await;
    Json(InvalidateResponse::new(vec![key]))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_many_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidKey(error_msg));
    }

    for key in &req.keys {
        state.cache.remove(key).await;
    }
    Ok(Json(InvalidateResponse::new(req.keys)))
}

/// Handler for POST /cache/cleanup
pub async fn cleanup_handler(State(state): State<AppState>) -> Json<SweepReport> {
    Json(state.cache.cleanup_expired().await)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::error::FetchError;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoSource;

    #[async_trait]
    impl DashboardSource for EchoSource {
        async fn fetch(&self, dataset: Dataset) -> std::result::Result<Value, FetchError> {
            Ok(json!({ "path": dataset.path() }))
        }
    }

    fn test_state() -> AppState {
        let cache = TieredCache::new(
            CacheConfig::named("handler-test"),
            Arc::new(MemoryStore::new()),
        )
        .unwrap();
        AppState::new(Arc::new(cache), Arc::new(EchoSource))
    }

    #[tokio::test]
    async fn test_dataset_handler() {
        let state = test_state();

        let response = dataset_handler(State(state.clone()), Path("teachers/workload".to_string()))
            .await
            .unwrap();

        assert_eq!(response.0, json!({"path": "teachers/workload"}));
        assert!(state.cache.contains_in_memory("teacher_workload").await);
    }

    #[tokio::test]
    async fn test_dataset_handler_unknown() {
        let state = test_state();

        let result = dataset_handler(State(state), Path("students".to_string())).await;
        assert!(matches!(result, Err(CacheError::UnknownDataset(_))));
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = test_state();
        state.cache.set("k", &1, None).await.unwrap();

        let response = invalidate_handler(State(state.clone()), Path("k".to_string())).await;

        assert_eq!(response.keys, vec!["k"]);
        assert!(!state.cache.contains_in_memory("k").await);
    }

    #[tokio::test]
    async fn test_invalidate_many_rejects_empty() {
        let state = test_state();

        let result =
            invalidate_many_handler(State(state), Json(InvalidateRequest { keys: vec![] })).await;
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_clear_and_stats_handlers() {
        let state = test_state();
        state.cache.set("a", &1, None).await.unwrap();

        clear_handler(State(state.clone())).await;
        let response = stats_handler(State(state)).await;

        assert_eq!(response.storage.memory_items, 0);
        assert_eq!(response.storage.persistent_items, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
