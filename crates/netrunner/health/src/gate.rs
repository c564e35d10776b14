//! Readiness gate
//!
//! Each iteration takes a snapshot of the network's nodes and probes all of
//! them concurrently. The gate opens only when one pass sees every node
//! healthy; results are never carried over between passes.

use std::time::Duration;

use futures::future::join_all;
use netrunner_backend::Network;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::error::{HealthError, HealthResult};
use crate::probe::HealthProbe;

/// Poll interval used when the caller does not pick one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Block until every node of `network` is healthy.
///
/// There is no deadline; drop the future to cancel. The network is left
/// untouched either way.
#[instrument(parent = network.span(), skip_all, fields(poll_ms = poll_interval.as_millis() as u64))]
pub async fn await_healthy(
    network: &Network,
    probe: &dyn HealthProbe,
    poll_interval: Duration,
) -> HealthResult<()> {
    let start = Instant::now();
    let mut pass: u64 = 0;

    loop {
        if network.is_torn_down() {
            return Err(HealthError::NetworkTornDown(network.name().to_string()));
        }

        pass += 1;
        let nodes = network.get_nodes();
        let results = join_all(nodes.iter().map(|node| probe.is_healthy(node.as_ref()))).await;

        let unhealthy: Vec<&str> = nodes
            .iter()
            .zip(&results)
            .filter(|(_, healthy)| !**healthy)
            .map(|(node, _)| node.name())
            .collect();

        if unhealthy.is_empty() {
            info!(
                nodes = nodes.len(),
                passes = pass,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Network healthy"
            );
            return Ok(());
        }

        debug!(pass, unhealthy = ?unhealthy, "Waiting for nodes");
        tokio::time::sleep(poll_interval).await;
    }
}

/// [`await_healthy`] bounded by `timeout`.
///
/// Expiry returns [`HealthError::Timeout`] as soon as the deadline passes,
/// even in the middle of a poll interval.
pub async fn await_healthy_within(
    network: &Network,
    probe: &dyn HealthProbe,
    poll_interval: Duration,
    timeout: Duration,
) -> HealthResult<()> {
    match tokio::time::timeout(timeout, await_healthy(network, probe, poll_interval)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(network = %network.name(), timeout_ms = timeout.as_millis() as u64, "Timed out awaiting health");
            Err(HealthError::Timeout {
                network: network.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}
