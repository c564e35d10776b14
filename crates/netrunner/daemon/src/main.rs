//! Netrunner Daemon - Control plane for ephemeral test networks
//!
//! The daemon provides:
//! - REST API for creating networks, adding and stopping nodes, teardown
//! - A readiness gate that waits for every node of a network to be healthy
//! - Optional teardown of all networks on exit

use std::path::PathBuf;

use clap::Parser;
use netrunner_daemon::config::{BackendKind, DaemonConfig};
use netrunner_daemon::error::{DaemonError, DaemonResult};
use netrunner_daemon::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Netrunner Daemon CLI
#[derive(Parser)]
#[command(name = "netrunnerd")]
#[command(about = "Netrunner Daemon - Ephemeral test network orchestrator", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "NETRUNNER_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "NETRUNNER_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level
    #[arg(long, env = "NETRUNNER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "NETRUNNER_LOG_JSON")]
    json: bool,

    /// Launch backend
    #[arg(long, value_enum, env = "NETRUNNER_BACKEND")]
    backend: Option<BackendKind>,

    /// Base directory for node working directories
    #[arg(long)]
    base_directory: Option<PathBuf>,

    /// Delete node directories when a network is torn down
    #[arg(long)]
    destroy_on_teardown: bool,

    /// Tear down all networks when the daemon exits
    #[arg(long)]
    teardown_on_exit: bool,

    /// Path of the AvalancheGo binary (local backend)
    #[arg(long)]
    avalanchego_binary_path: Option<String>,

    /// AvalancheGo image (enclave backend)
    #[arg(long)]
    image: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut DaemonConfig) -> DaemonResult<()> {
        if let Some(listen) = self.listen {
            config.server.listen_addr = listen
                .parse()
                .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        config.logging.json |= self.json;

        let orchestrator = &mut config.orchestrator;
        if let Some(backend) = self.backend {
            orchestrator.backend = backend;
        }
        if let Some(dir) = self.base_directory {
            orchestrator.base_dir = dir;
        }
        if let Some(path) = self.avalanchego_binary_path {
            orchestrator.avalanchego_binary_path = path;
        }
        if let Some(image) = self.image {
            orchestrator.image = image;
        }
        orchestrator.destroy_on_teardown |= self.destroy_on_teardown;
        orchestrator.teardown_on_exit |= self.teardown_on_exit;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;
    cli.apply(&mut config)?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.orchestrator.backend,
        listen = %config.server.listen_addr,
        "Starting netrunner daemon"
    );

    let server = Server::new(config)?;
    server.run().await
}
