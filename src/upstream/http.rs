//! HTTP dashboard source
//!
//! Fetches dashboard datasets from `{base}/api/dashboard/...` with reqwest.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{Dataset, DashboardSource};
use crate::error::FetchError;

// == HTTP Dashboard Source ==
/// reqwest-backed `DashboardSource`.
///
/// No retries: a failed request surfaces to the caller as a `FetchError`.
#[derive(Debug, Clone)]
pub struct HttpDashboardSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDashboardSource {
    /// Creates a source for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Full URL of a dataset.
    pub fn url(&self, dataset: Dataset) -> String {
        format!("{}/api/dashboard/{}", self.base_url, dataset.path())
    }
}

#[async_trait]
impl DashboardSource for HttpDashboardSource {
    async fn fetch(&self, dataset: Dataset) -> Result<Value, FetchError> {
        let url = self.url(dataset);
        debug!(%url, "Fetching dashboard dataset");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let source = HttpDashboardSource::new("http://api.local:8080/");
        assert_eq!(
            source.url(Dataset::GradeDistribution),
            "http://api.local:8080/api/dashboard/grades/distribution"
        );
        assert_eq!(
            source.url(Dataset::Stats),
            "http://api.local:8080/api/dashboard/stats"
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        // Reserve a port, then free it so nothing listens there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpDashboardSource::new(format!("http://{}", addr));
        let result = source.fetch(Dataset::Stats).await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }
}
