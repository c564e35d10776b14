//! Error types for netrunner-daemon

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use netrunner_backend::BackendError;
use netrunner_health::HealthError;
use netrunner_types::api::ErrorResponse;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Orchestrator or backend error
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Health error: {0}")]
    Health(#[from] HealthError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Name already taken, or the network no longer accepts operations
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Deadline expired
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The process or container could not be started
    #[error("Launch failed: {0}")]
    Launch(String),

    /// The sandbox engine failed or could not release a resource
    #[error("Engine error: {0}")]
    BadGateway(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            ApiError::Launch(_) => (StatusCode::INTERNAL_SERVER_ERROR, "LAUNCH_FAILED"),
            ApiError::BadGateway(_) => (StatusCode::BAD_GATEWAY, "ENGINE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<BackendError> for ApiError {
    fn from(e: BackendError) -> Self {
        let message = e.to_string();
        match e {
            BackendError::DuplicateNetwork(_)
            | BackendError::DuplicateNode { .. }
            | BackendError::NetworkTornDown(_)
            | BackendError::OrchestratorClosed => ApiError::Conflict(message),
            BackendError::NetworkNotFound(_) | BackendError::NodeNotFound { .. } => {
                ApiError::NotFound(message)
            }
            BackendError::ExecutorNotFound(_) | BackendError::InvalidConfig(_) => {
                ApiError::BadRequest(message)
            }
            BackendError::Timeout { .. } => ApiError::Timeout(message),
            BackendError::Launch { .. } | BackendError::PortAllocation(_) => {
                ApiError::Launch(message)
            }
            BackendError::Teardown { .. } | BackendError::Engine(_) => {
                ApiError::BadGateway(message)
            }
            BackendError::Cancelled(_) | BackendError::Io(_) => ApiError::Internal(message),
        }
    }
}

impl From<HealthError> for ApiError {
    fn from(e: HealthError) -> Self {
        let message = e.to_string();
        match e {
            HealthError::Timeout { .. } => ApiError::Timeout(message),
            HealthError::NetworkTornDown(_) => ApiError::Conflict(message),
            HealthError::Client(_) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_status_mapping() {
        let cases = [
            (BackendError::DuplicateNetwork("net1".into()), StatusCode::CONFLICT),
            (BackendError::OrchestratorClosed, StatusCode::CONFLICT),
            (BackendError::NetworkNotFound("net1".into()), StatusCode::NOT_FOUND),
            (BackendError::ExecutorNotFound("x".into()), StatusCode::BAD_REQUEST),
            (
                BackendError::timeout("stop", std::time::Duration::from_secs(1)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (BackendError::launch("node0", "boom"), StatusCode::INTERNAL_SERVER_ERROR),
            (BackendError::Engine("down".into()), StatusCode::BAD_GATEWAY),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status().0, expected);
        }
    }

    #[test]
    fn test_health_timeout_is_gateway_timeout() {
        let err = ApiError::from(HealthError::Timeout {
            network: "net1".into(),
            timeout_ms: 2000,
        });
        assert_eq!(err.status(), (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"));
    }
}
