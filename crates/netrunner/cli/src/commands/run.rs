//! Run a default local network in-process

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use netrunner_backend::{create_default_network, ExecutorRegistry, NetworkOrchestrator, Node};
use netrunner_health::{await_healthy_within, HttpHealthProbe};
use netrunner_local::{LocalBackend, OrchestratorConfig};
use netrunner_types::constants::{
    AVALANCHEGO_BINARY, BASE_DATA_DIR, DEFAULT_NODE_COUNT, NORMAL_EXECUTION,
};
use tracing::{info, warn};

use crate::error::CliResult;
use crate::output::{print_error, print_info, print_success};

#[derive(Args)]
pub struct RunArgs {
    /// Path of the AvalancheGo binary
    #[arg(long, default_value = AVALANCHEGO_BINARY)]
    pub avalanchego_binary_path: String,

    /// Base directory for node working directories
    #[arg(long, default_value = BASE_DATA_DIR)]
    pub base_directory: PathBuf,

    /// Network name
    #[arg(long, default_value = "default")]
    pub network: String,

    /// Number of nodes
    #[arg(long, default_value_t = DEFAULT_NODE_COUNT)]
    pub nodes: usize,

    /// Seconds between health polling passes
    #[arg(long, default_value_t = 5)]
    pub poll_interval_secs: u64,

    /// Seconds to wait for the network to become healthy
    #[arg(long, default_value_t = 300)]
    pub health_timeout_secs: u64,

    /// Delete node directories on exit
    #[arg(long)]
    pub destroy_on_teardown: bool,
}

impl RunArgs {
    fn local_config(&self) -> OrchestratorConfig {
        let registry = ExecutorRegistry::new([(
            NORMAL_EXECUTION,
            self.avalanchego_binary_path.as_str(),
        )]);
        OrchestratorConfig::new(self.base_directory.clone(), registry)
            .destroy_on_teardown(self.destroy_on_teardown)
    }
}

pub async fn execute(args: RunArgs) -> CliResult<()> {
    let backend = Arc::new(LocalBackend::new(args.local_config()));
    let orchestrator = NetworkOrchestrator::new(backend);

    info!(network = %args.network, nodes = args.nodes, "Launching default network");
    let result = serve(&orchestrator, &args).await;

    print_info("Tearing down network");
    if let Err(e) = orchestrator.teardown().await {
        warn!(error = %e, "Teardown failed");
        print_error(&format!("Teardown failed: {}", e));
    }

    result
}

async fn serve(orchestrator: &NetworkOrchestrator, args: &RunArgs) -> CliResult<()> {
    let network =
        create_default_network(orchestrator, &args.network, NORMAL_EXECUTION, args.nodes).await?;

    let probe = HttpHealthProbe::new()?;
    let health = await_healthy_within(
        &network,
        &probe,
        Duration::from_secs(args.poll_interval_secs.max(1)),
        Duration::from_secs(args.health_timeout_secs),
    );

    tokio::select! {
        result = health => result?,
        _ = tokio::signal::ctrl_c() => {
            print_info("Interrupted before the network became healthy");
            return Ok(());
        }
    }

    print_success("Network is healthy");
    let mut nodes = network.get_nodes();
    nodes.sort_by(|a, b| a.name().cmp(b.name()));
    for node in &nodes {
        println!("  {:<12} {}", node.name(), node.http_base_uri());
    }

    print_info("Press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    Ok(())
}
