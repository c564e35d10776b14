//! Enclave launch backend

use std::sync::Arc;

use async_trait::async_trait;
use netrunner_backend::{BackendResult, ExecutorRegistry, NetworkBackend, NetworkConstructor};
use tracing::{error, info, instrument, warn};

use crate::constructor::EnclaveConstructor;
use crate::engine::SandboxEngine;

/// Destroys an enclave unless disarmed.
///
/// Covers the window between creating the enclave and handing its
/// constructor to the orchestrator. If the construct future is dropped in
/// that window, destruction runs on a spawned task.
struct EnclaveGuard {
    engine: Arc<dyn SandboxEngine>,
    enclave: Option<String>,
}

impl EnclaveGuard {
    fn new(engine: Arc<dyn SandboxEngine>, enclave: &str) -> Self {
        Self {
            engine,
            enclave: Some(enclave.to_string()),
        }
    }

    fn disarm(mut self) {
        self.enclave = None;
    }

    /// Destroy the enclave now, logging rather than returning failures.
    async fn release(mut self) {
        if let Some(enclave) = self.enclave.take() {
            if let Err(e) = self.engine.destroy_enclave(&enclave).await {
                error!(enclave = %enclave, error = %e, "Failed to destroy enclave after failing to create network");
            }
        }
    }
}

impl Drop for EnclaveGuard {
    fn drop(&mut self) {
        let Some(enclave) = self.enclave.take() else {
            return;
        };
        let engine = self.engine.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(enclave = %enclave, "Network creation cancelled; destroying enclave");
                handle.spawn(async move {
                    if let Err(e) = engine.destroy_enclave(&enclave).await {
                        error!(enclave = %enclave, error = %e, "Failed to destroy abandoned enclave");
                    }
                });
            }
            Err(_) => error!(enclave = %enclave, "No runtime to destroy abandoned enclave"),
        }
    }
}

/// Creates one sandbox enclave per network.
#[derive(Clone)]
pub struct EnclaveBackend {
    engine: Arc<dyn SandboxEngine>,
    registry: ExecutorRegistry,
}

impl EnclaveBackend {
    pub fn new(engine: Arc<dyn SandboxEngine>, registry: ExecutorRegistry) -> Self {
        Self { engine, registry }
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }
}

#[async_trait]
impl NetworkBackend for EnclaveBackend {
    fn kind(&self) -> &'static str {
        "enclave"
    }

    /// Create the enclave and prepare every registered image in it. Any
    /// failure destroys the enclave before the error is returned.
    #[instrument(skip(self))]
    async fn construct(&self, name: &str) -> BackendResult<Box<dyn NetworkConstructor>> {
        self.engine.create_enclave(name).await?;
        let guard = EnclaveGuard::new(self.engine.clone(), name);

        for image in self.registry.targets() {
            if let Err(e) = self.engine.prepare_image(name, image).await {
                error!(image = %image, error = %e, "Failed to prepare image");
                guard.release().await;
                return Err(e);
            }
        }

        guard.disarm();
        info!(images = self.registry.targets().len(), "Enclave ready");
        Ok(Box::new(EnclaveConstructor::new(
            name.to_string(),
            self.engine.clone(),
            self.registry.clone(),
        )))
    }

    async fn clean(&self) -> BackendResult<()> {
        self.engine.clean().await
    }
}

impl std::fmt::Debug for EnclaveBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnclaveBackend")
            .field("registry", &self.registry)
            .finish()
    }
}
