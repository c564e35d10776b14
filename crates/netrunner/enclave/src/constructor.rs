//! Enclave network constructor

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use netrunner_backend::{
    BackendError, BackendResult, ExecutorRegistry, NetworkConstructor, NodeHandle,
};
use netrunner_types::config::config_args;
use netrunner_types::constants::{
    DEFAULT_HTTP_PORT, DEFAULT_STAKING_PORT, HTTP_PORT_KEY, STAKING_PORT_KEY,
};
use netrunner_types::NodeConfig;
use tracing::{info, instrument};

use crate::engine::{SandboxEngine, ServiceSpec};
use crate::node::EnclaveNode;

/// Program the node image runs.
pub const NODE_COMMAND: &str = "./avalanchego";

/// Launches the nodes of one network as services of its enclave.
pub struct EnclaveConstructor {
    enclave: String,
    engine: Arc<dyn SandboxEngine>,
    registry: ExecutorRegistry,
}

impl EnclaveConstructor {
    pub(crate) fn new(
        enclave: String,
        engine: Arc<dyn SandboxEngine>,
        registry: ExecutorRegistry,
    ) -> Self {
        Self {
            enclave,
            engine,
            registry,
        }
    }

    pub fn enclave(&self) -> &str {
        &self.enclave
    }

    /// Container spec for `config`. Every container has its own address, so
    /// omitted ports fall back to the node defaults.
    fn service_spec(config: &NodeConfig, image: &str) -> BackendResult<(ServiceSpec, u16, u16)> {
        let http_port = config.port(HTTP_PORT_KEY)?.unwrap_or(DEFAULT_HTTP_PORT);
        let staking_port = config.port(STAKING_PORT_KEY)?.unwrap_or(DEFAULT_STAKING_PORT);

        let mut cmd = vec![NODE_COMMAND.to_string()];
        cmd.extend(config_args(&config.config)?);

        let spec = ServiceSpec {
            name: config.name.clone(),
            image: image.to_string(),
            cmd,
            ports: vec![http_port, staking_port],
        };
        Ok((spec, http_port, staking_port))
    }
}

#[async_trait]
impl NetworkConstructor for EnclaveConstructor {
    #[instrument(skip_all, fields(enclave = %self.enclave, node = %config.name))]
    async fn add_node(&self, config: NodeConfig) -> BackendResult<NodeHandle> {
        let image = self
            .registry
            .resolve(&config.executable)
            .ok_or_else(|| BackendError::ExecutorNotFound(config.executable.clone()))?;
        let (spec, http_port, staking_port) = Self::service_spec(&config, image)?;

        let start = Instant::now();
        let service = self
            .engine
            .add_service(&self.enclave, spec)
            .await
            .map_err(|e| BackendError::launch(&config.name, e))?;
        info!(
            image = %image,
            ip = %service.private_ip,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Launched node service"
        );

        Ok(Arc::new(EnclaveNode::new(
            config.name,
            self.enclave.clone(),
            &service.private_ip,
            http_port,
            staking_port,
            config.config,
            self.engine.clone(),
        )))
    }

    /// Destroys the enclave; its services go with it.
    #[instrument(skip_all, fields(enclave = %self.enclave))]
    async fn teardown(&self) -> BackendResult<()> {
        self.engine
            .destroy_enclave(&self.enclave)
            .await
            .map_err(|e| BackendError::teardown(format!("enclave {}", self.enclave), e))
    }
}
