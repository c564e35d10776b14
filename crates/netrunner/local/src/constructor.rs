//! Local-process network constructor

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use netrunner_backend::{
    allocate_ports, BackendError, BackendResult, NetworkConstructor, Node, NodeHandle,
};
use netrunner_types::config::{config_args, port_value};
use netrunner_types::constants::{DB_DIR_KEY, HTTP_PORT_KEY, LOG_DIR_KEY, STAKING_PORT_KEY};
use netrunner_types::{ConfigError, ConfigMap, NodeConfig};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::OrchestratorConfig;
use crate::node::LocalNode;
use crate::process;

/// File the effective node config is written to.
pub const CONFIG_FILE: &str = "config.json";

/// Launches the nodes of one network as local processes.
pub struct LocalConstructor {
    network: String,
    dir: PathBuf,
    config: Arc<OrchestratorConfig>,
    nodes: Mutex<HashMap<String, Arc<LocalNode>>>,
}

impl LocalConstructor {
    pub(crate) fn new(network: &str, dir: PathBuf, config: Arc<OrchestratorConfig>) -> Self {
        Self {
            network: network.to_string(),
            dir,
            config,
            nodes: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Effective config: the caller's entries plus ports and directories
    /// filled in where omitted.
    fn effective_config(config: &NodeConfig, node_dir: &Path) -> BackendResult<(ConfigMap, u16, u16)> {
        let mut effective = config.config.clone();

        let http = port_value(&effective, HTTP_PORT_KEY)?;
        let staking = port_value(&effective, STAKING_PORT_KEY)?;
        let (http, staking) = match (http, staking) {
            (Some(http), Some(staking)) => (http, staking),
            // One spare, in case the batch contains the caller's own port.
            _ => fill_ports(http, staking, &allocate_ports(3)?),
        };
        if http == staking {
            return Err(ConfigError::InvalidValue {
                key: STAKING_PORT_KEY.to_string(),
                reason: format!("port {} is also the http port", staking),
            }
            .into());
        }
        effective.insert(HTTP_PORT_KEY.to_string(), Value::from(http));
        effective.insert(STAKING_PORT_KEY.to_string(), Value::from(staking));

        for (key, sub) in [(DB_DIR_KEY, "db"), (LOG_DIR_KEY, "logs")] {
            effective
                .entry(key)
                .or_insert_with(|| Value::from(node_dir.join(sub).to_string_lossy().into_owned()));
        }

        Ok((effective, http, staking))
    }

    async fn teardown_nodes(&self) -> BackendResult<()> {
        let nodes: Vec<Arc<LocalNode>> = self.nodes.lock().drain().map(|(_, node)| node).collect();

        let mut first_error = None;
        for node in nodes {
            if let Err(e) = node.stop(self.config.stop_timeout).await {
                warn!(node = %node.name(), error = %e, "Failed to stop node");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Fill the missing ports from `free`, skipping any port the caller already
/// chose.
fn fill_ports(http: Option<u16>, staking: Option<u16>, free: &[u16]) -> (u16, u16) {
    let mut free = free
        .iter()
        .copied()
        .filter(|port| Some(*port) != http && Some(*port) != staking);
    let http = http.or_else(|| free.next()).unwrap_or_default();
    let staking = staking.or_else(|| free.next()).unwrap_or_default();
    (http, staking)
}

/// Node and network names become directory names.
pub(crate) fn check_path_component(key: &str, name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("{:?} is not usable as a directory name", name),
        })
    }
}

#[async_trait]
impl NetworkConstructor for LocalConstructor {
    #[instrument(skip_all, fields(network = %self.network, node = %config.name))]
    async fn add_node(&self, config: NodeConfig) -> BackendResult<NodeHandle> {
        check_path_component("name", &config.name)?;
        let binary = self
            .config
            .registry
            .resolve(&config.executable)
            .ok_or_else(|| BackendError::ExecutorNotFound(config.executable.clone()))?
            .to_string();

        let node_dir = self.dir.join(&config.name);
        tokio::fs::create_dir_all(&node_dir).await?;

        let (effective, http_port, staking_port) = Self::effective_config(&config, &node_dir)?;
        let contents = serde_json::to_vec_pretty(&effective).map_err(ConfigError::from)?;
        tokio::fs::write(node_dir.join(CONFIG_FILE), contents).await?;

        let args = config_args(&effective)?;
        debug!(binary = %binary, http_port, staking_port, "Spawning node process");
        let mut child = process::spawn(&binary, &args, &node_dir)
            .map_err(|e| BackendError::launch(&config.name, format!("{}: {}", binary, e)))?;

        if let Some(status) = process::exited_within(&mut child, self.config.launch_settle)
            .await
            .map_err(|e| BackendError::launch(&config.name, e))?
        {
            return Err(BackendError::launch(
                &config.name,
                format!("process exited immediately with {}", status),
            ));
        }

        let node = Arc::new(LocalNode::new(
            config.name.clone(),
            http_port,
            staking_port,
            effective,
            node_dir,
            child,
        ));
        self.nodes.lock().insert(config.name, node.clone());

        info!(pid = ?node.pid(), "Started local node");
        Ok(node)
    }

    #[instrument(skip_all, fields(network = %self.network))]
    async fn teardown(&self) -> BackendResult<()> {
        let stopped = self.teardown_nodes().await;

        if self.config.destroy_on_teardown {
            match tokio::fs::remove_dir_all(&self.dir).await {
                Ok(()) => debug!(dir = %self.dir.display(), "Removed network directory"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    stopped?;
                    return Err(BackendError::teardown(self.dir.display().to_string(), e));
                }
            }
        }

        stopped
    }
}
