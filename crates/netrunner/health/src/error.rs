//! Error types for netrunner-health.

use thiserror::Error;

/// Errors raised by the readiness gate.
#[derive(Debug, Error)]
pub enum HealthError {
    /// The deadline fired before a full pass found every node healthy.
    #[error("network {network} not healthy after {timeout_ms}ms")]
    Timeout { network: String, timeout_ms: u64 },

    /// The network was torn down while the gate was waiting.
    #[error("network {0} was torn down while awaiting health")]
    NetworkTornDown(String),

    /// The HTTP client backing a probe could not be built.
    #[error("failed to build health client: {0}")]
    Client(#[from] reqwest::Error),
}

impl HealthError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HealthError::Timeout { .. })
    }
}

/// Result type for health operations.
pub type HealthResult<T> = Result<T, HealthError>;
