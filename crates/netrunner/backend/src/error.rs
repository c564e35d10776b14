//! Error types for netrunner-backend

use netrunner_types::ConfigError;
use thiserror::Error;

/// Errors raised by the orchestrator, networks and launch backends.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A network with this name is already registered or being created.
    #[error("cannot create duplicate network under the same name: {0}")]
    DuplicateNetwork(String),

    #[error("network not found: {0}")]
    NetworkNotFound(String),

    /// A node with this name already exists in the network.
    #[error("node {node} already exists in network {network}")]
    DuplicateNode { network: String, node: String },

    #[error("node {node} not found in network {network}")]
    NodeNotFound { network: String, node: String },

    /// The executor kind has no registered target.
    #[error("failed to get executor under name {0}")]
    ExecutorNotFound(String),

    #[error("failed to allocate free ports: {0}")]
    PortAllocation(#[source] std::io::Error),

    /// The process or container failed to start.
    #[error("failed to launch node {node}: {reason}")]
    Launch { node: String, reason: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("{0} was cancelled")]
    Cancelled(String),

    /// An external resource could not be released.
    #[error("failed to tear down {target}: {reason}")]
    Teardown { target: String, reason: String },

    /// The network no longer accepts operations.
    #[error("network {0} has been torn down")]
    NetworkTornDown(String),

    /// The orchestrator has been torn down and takes no new networks.
    #[error("orchestrator has been torn down")]
    OrchestratorClosed,

    #[error("invalid node config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("sandbox engine error: {0}")]
    Engine(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    pub fn launch(node: impl Into<String>, reason: impl ToString) -> Self {
        BackendError::Launch {
            node: node.into(),
            reason: reason.to_string(),
        }
    }

    pub fn teardown(target: impl Into<String>, reason: impl ToString) -> Self {
        BackendError::Teardown {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    pub fn timeout(operation: impl Into<String>, timeout: std::time::Duration) -> Self {
        BackendError::Timeout {
            operation: operation.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::NetworkNotFound(_)
                | BackendError::NodeNotFound { .. }
                | BackendError::ExecutorNotFound(_)
        )
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            BackendError::DuplicateNetwork(_) | BackendError::DuplicateNode { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Timeout { .. } | BackendError::Cancelled(_))
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_categories() {
        assert!(BackendError::NetworkNotFound("net1".into()).is_not_found());
        assert!(BackendError::DuplicateNetwork("net1".into()).is_duplicate());
        assert!(BackendError::timeout("stop node0", Duration::from_secs(2)).is_timeout());
        assert!(!BackendError::launch("node0", "exec format error").is_timeout());
    }

    #[test]
    fn test_timeout_message() {
        let err = BackendError::timeout("stop node0", Duration::from_millis(1500));
        assert_eq!(err.to_string(), "stop node0 timed out after 1500ms");
    }
}
