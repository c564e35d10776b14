//! Server setup and lifecycle management

use std::sync::Arc;

use axum::Router;
use netrunner_backend::{NetworkBackend, NetworkOrchestrator};
use netrunner_enclave::{DockerEngine, EnclaveBackend};
use netrunner_health::{HealthProbe, HttpHealthProbe};
use netrunner_local::LocalBackend;
use tokio::net::TcpListener;

use crate::api::{create_router, AppState};
use crate::config::{BackendKind, DaemonConfig, OrchestratorSettings};
use crate::error::{DaemonError, DaemonResult};

/// Netrunner daemon server
pub struct Server {
    config: DaemonConfig,
    orchestrator: Arc<NetworkOrchestrator>,
    probe: Arc<dyn HealthProbe>,
}

impl Server {
    /// Create a server with the backend selected in `config`
    pub fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let backend = build_backend(&config.orchestrator)?;
        let orchestrator = Arc::new(NetworkOrchestrator::new(backend));
        let probe: Arc<dyn HealthProbe> = Arc::new(HttpHealthProbe::new()?);
        Ok(Self::with_orchestrator(config, orchestrator, probe))
    }

    /// Create a server over an existing orchestrator
    pub fn with_orchestrator(
        config: DaemonConfig,
        orchestrator: Arc<NetworkOrchestrator>,
        probe: Arc<dyn HealthProbe>,
    ) -> Self {
        Self {
            config,
            orchestrator,
            probe,
        }
    }

    pub fn orchestrator(&self) -> &Arc<NetworkOrchestrator> {
        &self.orchestrator
    }

    pub fn router(&self) -> Router {
        let state = AppState::new(
            self.orchestrator.clone(),
            self.probe.clone(),
            &self.config.orchestrator,
        );
        create_router(state, &self.config.server)
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let app = self.router();

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Netrunner daemon listening on {}", addr);
        tracing::info!(backend = self.orchestrator.backend_kind(), "Orchestrator ready");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("Netrunner daemon shutting down");

        if self.config.orchestrator.teardown_on_exit {
            self.orchestrator.teardown().await?;
        } else {
            let networks = self.orchestrator.network_names();
            if !networks.is_empty() {
                tracing::warn!(?networks, "Leaving networks running");
            }
        }

        Ok(())
    }
}

fn build_backend(settings: &OrchestratorSettings) -> DaemonResult<Arc<dyn NetworkBackend>> {
    let backend: Arc<dyn NetworkBackend> = match settings.backend {
        BackendKind::Local => Arc::new(LocalBackend::new(settings.local_config())),
        BackendKind::Enclave => {
            let engine = DockerEngine::connect()?;
            Arc::new(EnclaveBackend::new(Arc::new(engine), settings.registry()))
        }
    };
    Ok(backend)
}

/// Graceful shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
