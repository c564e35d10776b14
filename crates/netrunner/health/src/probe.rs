//! Node health probes.

use std::time::Duration;

use async_trait::async_trait;
use netrunner_backend::Node;
use tracing::{debug, trace};

use crate::error::HealthResult;

/// Path of the node health endpoint, relative to its base URI.
pub const HEALTH_PATH: &str = "/ext/health";

/// Checks whether one node is currently healthy.
///
/// A probe never fails: unreachable or misbehaving nodes are simply not
/// healthy.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn is_healthy(&self, node: &dyn Node) -> bool;
}

/// Probe that queries the node's own HTTP health endpoint.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
}

impl HttpHealthProbe {
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new() -> HealthResult<Self> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> HealthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    fn health_url(base_uri: &str) -> String {
        format!("{}{}", base_uri.trim_end_matches('/'), HEALTH_PATH)
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn is_healthy(&self, node: &dyn Node) -> bool {
        let url = Self::health_url(node.http_base_uri());
        match self.client.get(&url).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                trace!(node = %node.name(), status = %response.status(), healthy, "Health probe");
                healthy
            }
            Err(e) => {
                debug!(node = %node.name(), error = %e, "Health probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_url() {
        assert_eq!(
            HttpHealthProbe::health_url("http://127.0.0.1:9650"),
            "http://127.0.0.1:9650/ext/health"
        );
        assert_eq!(
            HttpHealthProbe::health_url("http://10.0.0.2:9650/"),
            "http://10.0.0.2:9650/ext/health"
        );
    }
}
