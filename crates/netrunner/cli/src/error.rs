//! CLI error types

use netrunner_backend::BackendError;
use netrunner_health::HealthError;
use thiserror::Error;

/// Errors surfaced by the `netrunner` binary
#[derive(Debug, Error)]
pub enum CliError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Daemon returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Health(#[from] HealthError),
}

pub type CliResult<T> = Result<T, CliError>;
