//! Network: an isolated set of nodes bound to one constructor
//!
//! State machine: `Active` until the first teardown, then `TornDown` forever.
//! (`Constructing` is only observable through the orchestrator, which does
//! not publish a network until its constructor exists.)

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use netrunner_types::{NetworkState, NodeConfig};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn, Instrument, Span};
use uuid::Uuid;

use crate::constructor::NetworkConstructor;
use crate::error::{BackendError, BackendResult};
use crate::node::NodeHandle;

struct NetworkInner {
    state: NetworkState,
    nodes: BTreeMap<String, NodeHandle>,
}

/// An isolated collection of nodes sharing a constructor.
pub struct Network {
    id: Uuid,
    name: String,
    constructor: Arc<dyn NetworkConstructor>,

    /// Serializes node launches, stops and teardown within this network.
    /// Holds the constructor release while it is still running.
    op_lock: Mutex<Option<JoinHandle<BackendResult<()>>>>,

    /// Never held across an await point.
    inner: RwLock<NetworkInner>,

    span: Span,
}

impl Network {
    pub fn new(
        name: impl Into<String>,
        constructor: Box<dyn NetworkConstructor>,
        parent: &Span,
    ) -> Self {
        let name = name.into();
        let id = Uuid::new_v4();
        let span = tracing::info_span!(parent: parent, "network", network = %name, network_id = %id);

        Self {
            id,
            name,
            constructor: Arc::from(constructor),
            op_lock: Mutex::new(None),
            inner: RwLock::new(NetworkInner {
                state: NetworkState::Active,
                nodes: BTreeMap::new(),
            }),
            span,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> NetworkState {
        self.inner.read().state
    }

    pub fn is_torn_down(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Launch a node and register it under its name.
    ///
    /// Bootstrap wiring is the caller's concern: a node that should join
    /// existing peers must carry their addresses in its config.
    #[instrument(parent = &self.span, skip_all, fields(node = %config.name))]
    pub async fn add_node(&self, config: NodeConfig) -> BackendResult<NodeHandle> {
        config.validate()?;
        let _op = self.op_lock.lock().await;

        {
            let inner = self.inner.read();
            if !inner.state.accepts_nodes() {
                return Err(BackendError::NetworkTornDown(self.name.clone()));
            }
            if inner.nodes.contains_key(&config.name) {
                return Err(BackendError::DuplicateNode {
                    network: self.name.clone(),
                    node: config.name.clone(),
                });
            }
        }

        let start = Instant::now();
        let node = self.constructor.add_node(config).await?;
        info!(
            uri = %node.http_base_uri(),
            bootstrap = %node.bootstrap_ip(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Launched node"
        );

        self.inner
            .write()
            .nodes
            .insert(node.name().to_string(), node.clone());
        Ok(node)
    }

    /// Snapshot of the current nodes, ordered by name.
    pub fn get_nodes(&self) -> Vec<NodeHandle> {
        self.inner.read().nodes.values().cloned().collect()
    }

    pub fn get_node(&self, name: &str) -> Option<NodeHandle> {
        self.inner.read().nodes.get(name).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Stop a single node and drop it from the network.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn stop_node(&self, name: &str, timeout: Duration) -> BackendResult<()> {
        let _op = self.op_lock.lock().await;

        let node = self
            .get_node(name)
            .ok_or_else(|| BackendError::NodeNotFound {
                network: self.name.clone(),
                node: name.to_string(),
            })?;

        node.stop(timeout).await?;
        self.inner.write().nodes.remove(name);
        info!("Stopped node");
        Ok(())
    }

    /// Tear the network down.
    ///
    /// The constructor's teardown runs exactly once. It runs on its own task,
    /// so dropping this future does not abandon the release; the next call
    /// waits for it instead. Calls after that return `Ok(())` without
    /// touching the backend. A failed release still leaves the network torn
    /// down.
    #[instrument(parent = &self.span, skip(self))]
    pub async fn teardown(&self) -> BackendResult<()> {
        let mut pending = self.op_lock.lock().await;

        if pending.is_none() {
            {
                let mut inner = self.inner.write();
                if inner.state.is_terminal() {
                    return Ok(());
                }
                inner.state = NetworkState::TornDown;
                inner.nodes.clear();
            }
            *pending = Some(tokio::spawn(self.release().in_current_span()));
        }

        let result = match pending.as_mut() {
            Some(release) => release
                .await
                .unwrap_or_else(|e| Err(BackendError::teardown(self.name.clone(), e))),
            None => Ok(()),
        };
        *pending = None;
        result
    }

    fn release(&self) -> impl std::future::Future<Output = BackendResult<()>> + Send + 'static {
        let constructor = self.constructor.clone();
        async move {
            let start = Instant::now();
            let result = constructor.teardown().await;
            match &result {
                Ok(()) => info!(
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Tore down network"
                ),
                Err(e) => warn!(error = %e, "Network teardown failed; network marked torn down"),
            }
            result
        }
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Network")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &inner.state)
            .field("nodes", &inner.nodes.keys().collect::<Vec<_>>())
            .finish()
    }
}
