//! Local backend configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use netrunner_backend::ExecutorRegistry;
use netrunner_types::constants::{AVALANCHEGO_BINARY, BASE_DATA_DIR, NORMAL_EXECUTION};

/// Settings shared by every network the local backend creates.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Root under which `<network>/<node>` working directories are created
    pub base_dir: PathBuf,

    /// Executor kind to binary path
    pub registry: ExecutorRegistry,

    /// Remove a network's directory tree when it is torn down
    pub destroy_on_teardown: bool,

    /// Grace period for SIGTERM before a node is killed during teardown
    pub stop_timeout: Duration,

    /// A process that exits within this window counts as a failed launch
    pub launch_settle: Duration,
}

impl OrchestratorConfig {
    pub fn new(base_dir: impl Into<PathBuf>, registry: ExecutorRegistry) -> Self {
        Self {
            base_dir: base_dir.into(),
            registry,
            ..Default::default()
        }
    }

    pub fn destroy_on_teardown(mut self, destroy: bool) -> Self {
        self.destroy_on_teardown = destroy;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn with_launch_settle(mut self, settle: Duration) -> Self {
        self.launch_settle = settle;
        self
    }

    pub fn network_dir(&self, network: &str) -> PathBuf {
        self.base_dir.join(network)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(BASE_DATA_DIR),
            registry: ExecutorRegistry::new([(NORMAL_EXECUTION, AVALANCHEGO_BINARY)]),
            destroy_on_teardown: false,
            stop_timeout: Duration::from_secs(10),
            launch_settle: Duration::from_millis(250),
        }
    }
}
