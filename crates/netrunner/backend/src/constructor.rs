//! Launch backend traits
//!
//! A [`NetworkBackend`] creates one [`NetworkConstructor`] per network. The
//! constructor knows how to turn a node config into a running node on its
//! substrate and how to release everything it acquired.

use async_trait::async_trait;
use netrunner_types::NodeConfig;

use crate::error::BackendResult;
use crate::node::NodeHandle;

/// Per-network launcher for one execution substrate.
#[async_trait]
pub trait NetworkConstructor: Send + Sync {
    /// Launch a node described by `config`.
    ///
    /// On error nothing launched by this call may remain running.
    async fn add_node(&self, config: NodeConfig) -> BackendResult<NodeHandle>;

    /// Release every resource this constructor acquired.
    async fn teardown(&self) -> BackendResult<()>;
}

/// Factory for network constructors, chosen once per orchestrator.
#[async_trait]
pub trait NetworkBackend: Send + Sync {
    /// Short backend name for logs and status output.
    fn kind(&self) -> &'static str;

    /// Acquire the resources for a new network called `name`.
    ///
    /// Resources acquired before a failure must be released before the error
    /// is returned.
    async fn construct(&self, name: &str) -> BackendResult<Box<dyn NetworkConstructor>>;

    /// Reclaim anything left behind once all networks are torn down.
    async fn clean(&self) -> BackendResult<()> {
        Ok(())
    }
}
