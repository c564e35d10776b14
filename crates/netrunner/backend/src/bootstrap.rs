//! Default network bootstrap routine

use std::sync::Arc;

use netrunner_types::constants::BOOTSTRAP_IPS_KEY;
use netrunner_types::NodeConfig;
use tracing::{info, warn};

use crate::error::BackendResult;
use crate::network::Network;
use crate::orchestrator::NetworkOrchestrator;

/// Config for the `index`-th node of a self-assembling network.
///
/// The first node has no peers; every later node bootstraps from all nodes
/// added before it.
pub fn bootstrapped_node_config(index: usize, executable: &str, peers: &[String]) -> NodeConfig {
    let config = NodeConfig::new(format!("node{}", index), executable);
    if peers.is_empty() {
        config
    } else {
        config.with(BOOTSTRAP_IPS_KEY, peers.join(","))
    }
}

/// Create `name` and add `node_count` mutually bootstrapped nodes.
///
/// If any node fails to launch, the network is torn down and removed before
/// the error is returned.
pub async fn create_default_network(
    orchestrator: &NetworkOrchestrator,
    name: &str,
    executable: &str,
    node_count: usize,
) -> BackendResult<Arc<Network>> {
    let network = orchestrator.create_network(name).await?;

    if let Err(e) = add_bootstrapped_nodes(&network, executable, node_count).await {
        if let Err(teardown_err) = orchestrator.teardown_network(name).await {
            warn!(network = %name, error = %teardown_err, "Failed to tear down partial network");
        }
        return Err(e);
    }

    info!(network = %name, nodes = node_count, "Default network launched");
    Ok(network)
}

async fn add_bootstrapped_nodes(
    network: &Network,
    executable: &str,
    node_count: usize,
) -> BackendResult<()> {
    let mut peers: Vec<String> = Vec::with_capacity(node_count);
    for index in 0..node_count {
        let config = bootstrapped_node_config(index, executable, &peers);
        let node = network.add_node(config).await?;
        peers.push(node.bootstrap_ip().to_string());
    }
    Ok(())
}
