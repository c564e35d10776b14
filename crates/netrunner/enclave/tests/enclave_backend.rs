//! Enclave backend tests over an in-memory sandbox engine.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netrunner_backend::{
    create_default_network, BackendError, BackendResult, ExecutorRegistry, NetworkOrchestrator, Node,
};
use netrunner_enclave::{EnclaveBackend, SandboxEngine, ServiceInfo, ServiceSpec};
use netrunner_types::constants::{AVALANCHEGO_DOCKER_IMAGE, BOOTSTRAP_IPS_KEY, NORMAL_EXECUTION};
use netrunner_types::NodeConfig;
use parking_lot::Mutex;

#[derive(Default)]
struct EngineState {
    enclaves: BTreeMap<String, BTreeMap<String, ServiceSpec>>,
    destroyed: Vec<String>,
    prepared: Vec<(String, String)>,
    removed: Vec<(String, String)>,
    cleans: usize,
}

#[derive(Default)]
struct FakeEngine {
    state: Mutex<EngineState>,
    fail_image: Option<String>,
    fail_service: Option<String>,
    prepare_delay: Option<Duration>,
}

impl FakeEngine {
    fn live_enclaves(&self) -> Vec<String> {
        self.state.lock().enclaves.keys().cloned().collect()
    }
}

#[async_trait]
impl SandboxEngine for FakeEngine {
    async fn create_enclave(&self, enclave: &str) -> BackendResult<()> {
        let mut state = self.state.lock();
        if state.enclaves.contains_key(enclave) {
            return Err(BackendError::Engine(format!("enclave {} exists", enclave)));
        }
        state.enclaves.insert(enclave.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn destroy_enclave(&self, enclave: &str) -> BackendResult<()> {
        let mut state = self.state.lock();
        state.enclaves.remove(enclave);
        state.destroyed.push(enclave.to_string());
        Ok(())
    }

    async fn prepare_image(&self, enclave: &str, image: &str) -> BackendResult<()> {
        if let Some(delay) = self.prepare_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_image.as_deref() == Some(image) {
            return Err(BackendError::Engine(format!("pull access denied for {}", image)));
        }
        self.state
            .lock()
            .prepared
            .push((enclave.to_string(), image.to_string()));
        Ok(())
    }

    async fn add_service(&self, enclave: &str, spec: ServiceSpec) -> BackendResult<ServiceInfo> {
        if self.fail_service.as_deref() == Some(spec.name.as_str()) {
            return Err(BackendError::Engine("container exited".into()));
        }
        let mut state = self.state.lock();
        let services = state
            .enclaves
            .get_mut(enclave)
            .ok_or_else(|| BackendError::Engine(format!("no enclave {}", enclave)))?;
        let private_ip = format!("172.16.0.{}", services.len() + 2);
        services.insert(spec.name.clone(), spec);
        Ok(ServiceInfo { private_ip })
    }

    async fn remove_service(
        &self,
        enclave: &str,
        service: &str,
        _timeout: Duration,
    ) -> BackendResult<()> {
        let mut state = self.state.lock();
        if let Some(services) = state.enclaves.get_mut(enclave) {
            services.remove(service);
        }
        state
            .removed
            .push((enclave.to_string(), service.to_string()));
        Ok(())
    }

    async fn clean(&self) -> BackendResult<()> {
        let mut state = self.state.lock();
        state.enclaves.clear();
        state.cleans += 1;
        Ok(())
    }
}

fn registry() -> ExecutorRegistry {
    ExecutorRegistry::new([
        (NORMAL_EXECUTION, AVALANCHEGO_DOCKER_IMAGE),
        ("archive", AVALANCHEGO_DOCKER_IMAGE),
        ("byzantine", "netrunner/byzantine:dev"),
    ])
}

fn orchestrator(engine: Arc<FakeEngine>) -> NetworkOrchestrator {
    NetworkOrchestrator::new(Arc::new(EnclaveBackend::new(engine, registry())))
}

#[tokio::test]
async fn test_create_network_prepares_each_image_once() {
    let engine = Arc::new(FakeEngine::default());
    let orchestrator = orchestrator(engine.clone());

    orchestrator.create_network("net1").await.unwrap();

    let prepared: BTreeSet<String> = engine
        .state
        .lock()
        .prepared
        .iter()
        .map(|(enclave, image)| {
            assert_eq!(enclave, "net1");
            image.clone()
        })
        .collect();
    assert_eq!(engine.state.lock().prepared.len(), 2);
    assert!(prepared.contains(AVALANCHEGO_DOCKER_IMAGE));
    assert!(prepared.contains("netrunner/byzantine:dev"));
}

#[tokio::test]
async fn test_failed_image_preparation_destroys_enclave() {
    let engine = Arc::new(FakeEngine {
        fail_image: Some("netrunner/byzantine:dev".into()),
        ..Default::default()
    });
    let orchestrator = orchestrator(engine.clone());

    let err = orchestrator.create_network("net1").await.unwrap_err();
    assert!(matches!(err, BackendError::Engine(_)));

    assert!(engine.live_enclaves().is_empty());
    assert_eq!(engine.state.lock().destroyed, vec!["net1".to_string()]);
    assert!(orchestrator.get_network("net1").is_none());
}

#[tokio::test]
async fn test_cancelled_create_destroys_enclave() {
    let engine = Arc::new(FakeEngine {
        prepare_delay: Some(Duration::from_secs(10)),
        ..Default::default()
    });
    let orchestrator = orchestrator(engine.clone());

    let result =
        tokio::time::timeout(Duration::from_millis(50), orchestrator.create_network("net1")).await;
    assert!(result.is_err());
    assert!(orchestrator.get_network("net1").is_none());

    // Destruction runs on a spawned task.
    for _ in 0..50 {
        if engine.live_enclaves().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(engine.live_enclaves().is_empty());
    assert_eq!(engine.state.lock().destroyed, vec!["net1".to_string()]);
}

#[tokio::test]
async fn test_node_addresses_use_private_ip_and_default_ports() {
    let engine = Arc::new(FakeEngine::default());
    let orchestrator = orchestrator(engine.clone());
    let network = orchestrator.create_network("net1").await.unwrap();

    let node = network
        .add_node(NodeConfig::new("node0", NORMAL_EXECUTION))
        .await
        .unwrap();
    assert_eq!(node.http_base_uri(), "http://172.16.0.2:9650");
    assert_eq!(node.bootstrap_ip(), "172.16.0.2:9651");

    let state = engine.state.lock();
    let spec = &state.enclaves["net1"]["node0"];
    assert_eq!(spec.image, AVALANCHEGO_DOCKER_IMAGE);
    assert_eq!(spec.ports, vec![9650, 9651]);
}

#[tokio::test]
async fn test_unknown_executor_launches_nothing() {
    let engine = Arc::new(FakeEngine::default());
    let orchestrator = orchestrator(engine.clone());
    let network = orchestrator.create_network("net1").await.unwrap();

    let err = network
        .add_node(NodeConfig::new("node0", "light"))
        .await
        .err().unwrap();
    assert!(matches!(err, BackendError::ExecutorNotFound(_)));
    assert!(engine.state.lock().enclaves["net1"].is_empty());
}

#[tokio::test]
async fn test_failed_service_is_a_launch_error() {
    let engine = Arc::new(FakeEngine {
        fail_service: Some("node0".into()),
        ..Default::default()
    });
    let orchestrator = orchestrator(engine.clone());
    let network = orchestrator.create_network("net1").await.unwrap();

    let err = network
        .add_node(NodeConfig::new("node0", NORMAL_EXECUTION))
        .await
        .err().unwrap();
    assert!(matches!(err, BackendError::Launch { ref node, .. } if node == "node0"));
    assert_eq!(network.node_count(), 0);
}

#[tokio::test]
async fn test_teardown_destroys_enclave_without_removing_services() {
    let engine = Arc::new(FakeEngine::default());
    let orchestrator = orchestrator(engine.clone());

    create_default_network(&orchestrator, "net1", NORMAL_EXECUTION, 5)
        .await
        .unwrap();
    let network = orchestrator.get_network("net1").unwrap();
    let node2 = network.get_node("node2").unwrap();
    assert_eq!(
        node2.config()[BOOTSTRAP_IPS_KEY],
        "172.16.0.2:9651,172.16.0.3:9651"
    );

    orchestrator.teardown_network("net1").await.unwrap();
    network.teardown().await.unwrap();

    let state = engine.state.lock();
    assert!(state.removed.is_empty());
    assert_eq!(state.destroyed, vec!["net1".to_string()]);
    assert!(state.enclaves.is_empty());
}

#[tokio::test]
async fn test_stop_node_removes_service_once() {
    let engine = Arc::new(FakeEngine::default());
    let orchestrator = orchestrator(engine.clone());
    let network = orchestrator.create_network("net1").await.unwrap();
    let node = network
        .add_node(NodeConfig::new("node0", NORMAL_EXECUTION))
        .await
        .unwrap();

    network
        .stop_node("node0", Duration::from_secs(3))
        .await
        .unwrap();
    node.stop(Duration::from_secs(3)).await.unwrap();

    assert_eq!(
        engine.state.lock().removed,
        vec![("net1".to_string(), "node0".to_string())]
    );
}

#[tokio::test]
async fn test_orchestrator_teardown_cleans_engine() {
    let engine = Arc::new(FakeEngine::default());
    let orchestrator = orchestrator(engine.clone());
    orchestrator.create_network("net1").await.unwrap();
    orchestrator.create_network("net2").await.unwrap();

    orchestrator.teardown().await.unwrap();

    let state = engine.state.lock();
    assert_eq!(state.destroyed.len(), 2);
    assert_eq!(state.cleans, 1);
    assert!(state.enclaves.is_empty());
}
