//! Enclave node handle

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netrunner_backend::{BackendResult, Node};
use netrunner_types::ConfigMap;
use tracing::instrument;

use crate::engine::SandboxEngine;

/// A node running as a service inside an enclave.
pub struct EnclaveNode {
    name: String,
    enclave: String,
    http_base_uri: String,
    bootstrap_ip: String,
    config: ConfigMap,
    engine: Arc<dyn SandboxEngine>,
    stopped: AtomicBool,
}

impl EnclaveNode {
    pub(crate) fn new(
        name: String,
        enclave: String,
        private_ip: &str,
        http_port: u16,
        staking_port: u16,
        config: ConfigMap,
        engine: Arc<dyn SandboxEngine>,
    ) -> Self {
        Self {
            http_base_uri: format!("http://{}:{}", private_ip, http_port),
            bootstrap_ip: format!("{}:{}", private_ip, staking_port),
            name,
            enclave,
            config,
            engine,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn enclave(&self) -> &str {
        &self.enclave
    }
}

#[async_trait]
impl Node for EnclaveNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn http_base_uri(&self) -> &str {
        &self.http_base_uri
    }

    fn bootstrap_ip(&self) -> &str {
        &self.bootstrap_ip
    }

    fn config(&self) -> ConfigMap {
        self.config.clone()
    }

    #[instrument(skip(self), fields(node = %self.name, enclave = %self.enclave))]
    async fn stop(&self, timeout: Duration) -> BackendResult<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let result = self
            .engine
            .remove_service(&self.enclave, &self.name, timeout)
            .await;
        if result.is_err() {
            self.stopped.store(false, Ordering::SeqCst);
        }
        result
    }
}

impl std::fmt::Debug for EnclaveNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnclaveNode")
            .field("name", &self.name)
            .field("enclave", &self.enclave)
            .field("uri", &self.http_base_uri)
            .finish()
    }
}
