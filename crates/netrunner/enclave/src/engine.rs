//! Sandbox engine seam

use std::time::Duration;

use async_trait::async_trait;
use netrunner_backend::BackendResult;

/// A container to run inside an enclave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    /// Service name, unique within the enclave
    pub name: String,

    /// Image reference
    pub image: String,

    /// Command override, program first
    pub cmd: Vec<String>,

    /// TCP ports the service listens on
    pub ports: Vec<u16>,
}

/// What the engine reports about a started service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Address of the service on the enclave's private network
    pub private_ip: String,
}

/// Isolated execution environments hosting containers.
///
/// The engine is an external service; this is the full surface the enclave
/// backend needs from it.
#[async_trait]
pub trait SandboxEngine: Send + Sync {
    async fn create_enclave(&self, enclave: &str) -> BackendResult<()>;

    /// Destroy an enclave and everything running in it.
    async fn destroy_enclave(&self, enclave: &str) -> BackendResult<()>;

    /// Make `image` available to services of `enclave`.
    async fn prepare_image(&self, enclave: &str, image: &str) -> BackendResult<()>;

    /// Start a service. A service that failed to start is not left behind.
    async fn add_service(&self, enclave: &str, spec: ServiceSpec) -> BackendResult<ServiceInfo>;

    /// Stop a service, giving it `timeout` to exit, and remove it.
    async fn remove_service(
        &self,
        enclave: &str,
        service: &str,
        timeout: Duration,
    ) -> BackendResult<()>;

    /// Remove every enclave this engine manages.
    async fn clean(&self) -> BackendResult<()>;
}
