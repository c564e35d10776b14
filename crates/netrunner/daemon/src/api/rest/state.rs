//! Application state for API handlers

use std::sync::Arc;
use std::time::Duration;

use netrunner_backend::{Network, NetworkOrchestrator};
use netrunner_health::HealthProbe;

use crate::config::OrchestratorSettings;
use crate::error::{ApiError, ApiResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registry of live networks
    pub orchestrator: Arc<NetworkOrchestrator>,

    /// Probe used by awaitHealthy
    pub probe: Arc<dyn HealthProbe>,

    /// Grace period when a stop request carries no timeout
    pub stop_timeout: Duration,

    /// awaitHealthy defaults
    pub poll_interval: Duration,
    pub health_timeout: Duration,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<NetworkOrchestrator>,
        probe: Arc<dyn HealthProbe>,
        settings: &OrchestratorSettings,
    ) -> Self {
        Self {
            orchestrator,
            probe,
            stop_timeout: settings.stop_timeout(),
            poll_interval: settings.health_poll_interval(),
            health_timeout: settings.health_timeout(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Look up a live network, rejecting empty names.
    pub fn network(&self, name: &str) -> ApiResult<Arc<Network>> {
        if name.is_empty() {
            return Err(ApiError::BadRequest("network name is required".into()));
        }
        self.orchestrator
            .get_network(name)
            .ok_or_else(|| ApiError::NotFound(format!("network not found: {}", name)))
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let duration = chrono::Utc::now() - self.started_at;
        let secs = duration.num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
