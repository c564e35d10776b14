//! Node handle trait

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netrunner_types::{ConfigError, ConfigMap, NodeInfo};

use crate::error::BackendResult;

/// A launched process or container and its derived addresses.
///
/// Addresses are known as soon as the node is created; they say nothing about
/// whether the node is healthy yet.
#[async_trait]
pub trait Node: Send + Sync {
    fn name(&self) -> &str;

    /// Base URI of the node's HTTP API, `http://<host>:<port>`.
    fn http_base_uri(&self) -> &str;

    /// Peer-to-peer address other nodes bootstrap from, `<host>:<port>`.
    fn bootstrap_ip(&self) -> &str;

    /// Copy of the node's effective configuration.
    fn config(&self) -> ConfigMap;

    /// Stop the node, waiting up to `timeout` for a graceful exit.
    async fn stop(&self, timeout: Duration) -> BackendResult<()>;

    fn info(&self) -> Result<NodeInfo, ConfigError> {
        NodeInfo::new(
            self.name(),
            &self.config(),
            self.http_base_uri(),
            self.bootstrap_ip(),
        )
    }
}

/// Shared handle to a node.
pub type NodeHandle = Arc<dyn Node>;
