use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netrunner_backend::{BackendResult, Network, NetworkConstructor, Node, NodeHandle};
use netrunner_health::{
    await_healthy, await_healthy_within, HealthError, HealthProbe, HttpHealthProbe,
};
use netrunner_types::{ConfigMap, NodeConfig};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::Span;

struct StaticNode {
    name: String,
    uri: String,
}

#[async_trait]
impl Node for StaticNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn http_base_uri(&self) -> &str {
        &self.uri
    }

    fn bootstrap_ip(&self) -> &str {
        "127.0.0.1:9651"
    }

    fn config(&self) -> ConfigMap {
        ConfigMap::new()
    }

    async fn stop(&self, _timeout: Duration) -> BackendResult<()> {
        Ok(())
    }
}

/// Constructor whose nodes all share one base URI.
struct StaticConstructor {
    uri: String,
}

#[async_trait]
impl NetworkConstructor for StaticConstructor {
    async fn add_node(&self, config: NodeConfig) -> BackendResult<NodeHandle> {
        Ok(Arc::new(StaticNode {
            name: config.name,
            uri: self.uri.clone(),
        }))
    }

    async fn teardown(&self) -> BackendResult<()> {
        Ok(())
    }
}

async fn network_with(uri: &str, names: &[&str]) -> Network {
    let network = Network::new(
        "net1",
        Box::new(StaticConstructor { uri: uri.to_string() }),
        &Span::none(),
    );
    for name in names {
        network
            .add_node(NodeConfig::new(*name, "normal"))
            .await
            .unwrap();
    }
    network
}

/// Probe answering from a per-node script, one entry per call; the last
/// entry repeats forever.
#[derive(Default)]
struct ScriptedProbe {
    script: Mutex<HashMap<String, Vec<bool>>>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    fn with(self, node: &str, answers: &[bool]) -> Self {
        self.script.lock().insert(node.to_string(), answers.to_vec());
        self
    }
}

#[async_trait]
impl HealthProbe for ScriptedProbe {
    async fn is_healthy(&self, node: &dyn Node) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock();
        match script.get_mut(node.name()) {
            Some(answers) if answers.len() > 1 => answers.remove(0),
            Some(answers) => answers.first().copied().unwrap_or(false),
            None => false,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_deadline_fires_before_poll_interval() {
    let network = network_with("http://127.0.0.1:1", &["node0", "node1"]).await;
    let probe = ScriptedProbe::default();

    let start = tokio::time::Instant::now();
    let err = await_healthy_within(
        &network,
        &probe,
        Duration::from_secs(5),
        Duration::from_secs(2),
    )
    .await
    .unwrap_err();

    assert!(err.is_timeout());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(3));

    // Expiry leaves the network alone.
    assert!(!network.is_torn_down());
    assert_eq!(network.node_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_healthy_returns_after_first_pass() {
    let network = network_with("http://127.0.0.1:1", &["node0", "node1"]).await;
    let probe = ScriptedProbe::default()
        .with("node0", &[true])
        .with("node1", &[true]);

    await_healthy(&network, &probe, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(probe.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_flapping_node_needs_a_full_healthy_pass() {
    let network = network_with("http://127.0.0.1:1", &["node0", "node1"]).await;
    // node0 is healthy on the first pass only; node1 only from the second.
    // No single pass sees both until the third.
    let probe = ScriptedProbe::default()
        .with("node0", &[true, false, true])
        .with("node1", &[false, true]);

    await_healthy_within(
        &network,
        &probe,
        Duration::from_millis(100),
        Duration::from_secs(10),
    )
    .await
    .unwrap();
    assert_eq!(probe.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_empty_network_is_healthy() {
    let network = network_with("http://127.0.0.1:1", &[]).await;
    await_healthy(&network, &ScriptedProbe::default(), Duration::from_secs(1))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_torn_down_network_stops_the_gate() {
    let network = network_with("http://127.0.0.1:1", &["node0"]).await;
    network.teardown().await.unwrap();

    let err = await_healthy(&network, &ScriptedProbe::default(), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, HealthError::NetworkTornDown(_)));
}

async fn serve_status(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!("HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status_line);
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_probe_reports_2xx_as_healthy() {
    let uri = serve_status("200 OK").await;
    let network = network_with(&uri, &["node0"]).await;
    let probe = HttpHealthProbe::new().unwrap();

    let node = network.get_node("node0").unwrap();
    assert!(probe.is_healthy(node.as_ref()).await);
}

#[tokio::test]
async fn test_http_probe_reports_errors_as_unhealthy() {
    let uri = serve_status("503 Service Unavailable").await;
    let network = network_with(&uri, &["node0"]).await;
    let probe = HttpHealthProbe::with_timeout(Duration::from_millis(500)).unwrap();

    let node = network.get_node("node0").unwrap();
    assert!(!probe.is_healthy(node.as_ref()).await);

    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let network = network_with(&closed, &["node0"]).await;
    let node = network.get_node("node0").unwrap();
    assert!(!probe.is_healthy(node.as_ref()).await);
}
