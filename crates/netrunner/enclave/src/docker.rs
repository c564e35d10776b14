//! Docker-backed sandbox engine
//!
//! An enclave is a user-defined bridge network named `netrunner-<enclave>`.
//! Services are containers attached to it and labelled with their enclave so
//! they can be found again for destruction and cleanup.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    RemoveContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::HostConfig;
use bollard::network::{CreateNetworkOptions, ListNetworksOptions};
use bollard::Docker;
use futures::TryStreamExt;
use netrunner_backend::{BackendError, BackendResult};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::engine::{SandboxEngine, ServiceInfo, ServiceSpec};

const NAME_PREFIX: &str = "netrunner";
const LABEL_MANAGED: &str = "netrunner.managed";
const LABEL_ENCLAVE: &str = "netrunner.enclave";

fn engine_error(e: bollard::errors::Error) -> BackendError {
    BackendError::Engine(e.to_string())
}

fn is_missing(e: &bollard::errors::Error) -> bool {
    matches!(
        e,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

/// [`SandboxEngine`] over the local Docker daemon.
pub struct DockerEngine {
    docker: Docker,

    /// Enclaves created through this engine and not yet destroyed.
    enclaves: Mutex<HashSet<String>>,
}

impl DockerEngine {
    /// Connect using the platform's default socket or `DOCKER_HOST`.
    pub fn connect() -> BackendResult<Self> {
        let docker = Docker::connect_with_local_defaults().map_err(engine_error)?;
        Ok(Self::with_client(docker))
    }

    pub fn with_client(docker: Docker) -> Self {
        Self {
            docker,
            enclaves: Mutex::new(HashSet::new()),
        }
    }

    pub fn network_name(enclave: &str) -> String {
        format!("{}-{}", NAME_PREFIX, enclave)
    }

    pub fn container_name(enclave: &str, service: &str) -> String {
        format!("{}-{}-{}", NAME_PREFIX, enclave, service)
    }

    pub fn enclaves(&self) -> Vec<String> {
        let mut enclaves: Vec<String> = self.enclaves.lock().iter().cloned().collect();
        enclaves.sort();
        enclaves
    }

    fn labels(enclave: &str) -> HashMap<String, String> {
        HashMap::from([
            (LABEL_MANAGED.to_string(), "true".to_string()),
            (LABEL_ENCLAVE.to_string(), enclave.to_string()),
        ])
    }

    fn label_filter(label: &str, value: &str) -> HashMap<String, Vec<String>> {
        HashMap::from([("label".to_string(), vec![format!("{}={}", label, value)])])
    }

    /// Force-remove every container carrying `label=value`.
    async fn remove_labelled_containers(&self, label: &str, value: &str) -> BackendResult<usize> {
        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions::<String> {
                all: true,
                filters: Self::label_filter(label, value),
                ..Default::default()
            }))
            .await
            .map_err(engine_error)?;

        let mut removed = 0;
        for id in containers.into_iter().filter_map(|c| c.id) {
            self.force_remove(&id).await?;
            removed += 1;
        }
        Ok(removed)
    }

    async fn force_remove(&self, container: &str) -> BackendResult<()> {
        match self
            .docker
            .remove_container(
                container,
                Some(RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                }),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(e) if is_missing(&e) => Ok(()),
            Err(e) => Err(engine_error(e)),
        }
    }

    async fn remove_network(&self, network: &str) -> BackendResult<()> {
        match self.docker.remove_network(network).await {
            Ok(()) => Ok(()),
            Err(e) if is_missing(&e) => Ok(()),
            Err(e) => Err(engine_error(e)),
        }
    }

    async fn private_ip(&self, container: &str, network: &str) -> BackendResult<String> {
        let inspect = self
            .docker
            .inspect_container(container, None::<InspectContainerOptions>)
            .await
            .map_err(engine_error)?;

        inspect
            .network_settings
            .and_then(|settings| settings.networks)
            .and_then(|mut networks| networks.remove(network))
            .and_then(|endpoint| endpoint.ip_address)
            .filter(|ip| !ip.is_empty())
            .ok_or_else(|| {
                BackendError::Engine(format!(
                    "container {} has no address on network {}",
                    container, network
                ))
            })
    }

    async fn start_service(&self, enclave: &str, spec: &ServiceSpec) -> BackendResult<ServiceInfo> {
        let network = Self::network_name(enclave);
        let container = Self::container_name(enclave, &spec.name);

        let exposed_ports: HashMap<String, HashMap<(), ()>> = spec
            .ports
            .iter()
            .map(|port| (format!("{}/tcp", port), HashMap::new()))
            .collect();

        let config = Config {
            image: Some(spec.image.clone()),
            cmd: Some(spec.cmd.clone()),
            hostname: Some(spec.name.clone()),
            labels: Some(Self::labels(enclave)),
            exposed_ports: Some(exposed_ports),
            host_config: Some(HostConfig {
                network_mode: Some(network.clone()),
                ..Default::default()
            }),
            ..Default::default()
        };

        self.docker
            .create_container(
                Some(CreateContainerOptions {
                    name: container.clone(),
                    platform: None,
                }),
                config,
            )
            .await
            .map_err(engine_error)?;

        self.docker
            .start_container::<String>(&container, None)
            .await
            .map_err(engine_error)?;

        let private_ip = self.private_ip(&container, &network).await?;
        Ok(ServiceInfo { private_ip })
    }
}

#[async_trait]
impl SandboxEngine for DockerEngine {
    #[instrument(skip(self))]
    async fn create_enclave(&self, enclave: &str) -> BackendResult<()> {
        let network = Self::network_name(enclave);
        self.docker
            .create_network(CreateNetworkOptions {
                name: network.clone(),
                check_duplicate: true,
                driver: "bridge".to_string(),
                labels: Self::labels(enclave),
                ..Default::default()
            })
            .await
            .map_err(engine_error)?;

        self.enclaves.lock().insert(enclave.to_string());
        info!(network = %network, "Created enclave");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn destroy_enclave(&self, enclave: &str) -> BackendResult<()> {
        let removed = self
            .remove_labelled_containers(LABEL_ENCLAVE, enclave)
            .await?;
        self.remove_network(&Self::network_name(enclave)).await?;

        self.enclaves.lock().remove(enclave);
        info!(containers = removed, "Destroyed enclave");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn prepare_image(&self, enclave: &str, image: &str) -> BackendResult<()> {
        if self.docker.inspect_image(image).await.is_ok() {
            debug!("Image already present");
            return Ok(());
        }

        info!("Pulling image");
        self.docker
            .create_image(
                Some(CreateImageOptions {
                    from_image: image.to_string(),
                    ..Default::default()
                }),
                None,
                None,
            )
            .try_collect::<Vec<_>>()
            .await
            .map_err(engine_error)?;
        Ok(())
    }

    #[instrument(skip(self, spec), fields(service = %spec.name, image = %spec.image))]
    async fn add_service(&self, enclave: &str, spec: ServiceSpec) -> BackendResult<ServiceInfo> {
        match self.start_service(enclave, &spec).await {
            Ok(info) => {
                debug!(ip = %info.private_ip, "Started service");
                Ok(info)
            }
            Err(e) => {
                let container = Self::container_name(enclave, &spec.name);
                if let Err(cleanup) = self.force_remove(&container).await {
                    warn!(error = %cleanup, "Failed to remove service after failed start");
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    async fn remove_service(
        &self,
        enclave: &str,
        service: &str,
        timeout: Duration,
    ) -> BackendResult<()> {
        let container = Self::container_name(enclave, service);
        let stopped = self
            .docker
            .stop_container(
                &container,
                Some(StopContainerOptions {
                    t: stop_grace_secs(timeout),
                }),
            )
            .await;
        match stopped {
            Ok(()) => {}
            Err(e) if is_missing(&e) => return Ok(()),
            Err(e) => warn!(error = %e, "Failed to stop service (may already be stopped)"),
        }

        self.force_remove(&container).await
    }

    #[instrument(skip(self))]
    async fn clean(&self) -> BackendResult<()> {
        let removed = self.remove_labelled_containers(LABEL_MANAGED, "true").await?;

        let networks = self
            .docker
            .list_networks(Some(ListNetworksOptions::<String> {
                filters: Self::label_filter(LABEL_MANAGED, "true"),
            }))
            .await
            .map_err(engine_error)?;
        for network in networks.into_iter().filter_map(|n| n.name) {
            self.remove_network(&network).await?;
        }

        self.enclaves.lock().clear();
        info!(containers = removed, "Cleaned sandbox engine");
        Ok(())
    }
}

impl std::fmt::Debug for DockerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockerEngine")
            .field("enclaves", &self.enclaves())
            .finish()
    }
}

/// Whole seconds for the engine's stop grace period, rounded up so a
/// sub-second timeout never becomes an immediate kill.
fn stop_grace_secs(timeout: Duration) -> i64 {
    timeout.as_secs_f64().ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        assert_eq!(DockerEngine::network_name("net1"), "netrunner-net1");
        assert_eq!(
            DockerEngine::container_name("net1", "node0"),
            "netrunner-net1-node0"
        );
    }

    #[test]
    fn test_label_filter() {
        let filter = DockerEngine::label_filter(LABEL_ENCLAVE, "net1");
        assert_eq!(filter["label"], vec!["netrunner.enclave=net1".to_string()]);
    }

    #[test]
    fn test_stop_grace_rounds_up() {
        assert_eq!(stop_grace_secs(Duration::ZERO), 0);
        assert_eq!(stop_grace_secs(Duration::from_millis(300)), 1);
        assert_eq!(stop_grace_secs(Duration::from_secs(2)), 2);
        assert_eq!(stop_grace_secs(Duration::from_millis(2500)), 3);
    }
}
