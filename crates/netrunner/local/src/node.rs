//! Local node handle

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use netrunner_backend::{BackendError, BackendResult, Node};
use netrunner_types::ConfigMap;
use tokio::process::Child;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::process;

/// A node binary running as a child of this process.
pub struct LocalNode {
    name: String,
    http_base_uri: String,
    bootstrap_ip: String,
    config: ConfigMap,
    dir: PathBuf,
    pid: Option<u32>,

    /// `None` once the node has been stopped.
    child: Mutex<Option<Child>>,
}

impl LocalNode {
    pub(crate) fn new(
        name: String,
        http_port: u16,
        staking_port: u16,
        config: ConfigMap,
        dir: PathBuf,
        child: Child,
    ) -> Self {
        Self {
            name,
            http_base_uri: format!("http://127.0.0.1:{}", http_port),
            bootstrap_ip: format!("127.0.0.1:{}", staking_port),
            config,
            dir,
            pid: child.id(),
            child: Mutex::new(Some(child)),
        }
    }

    /// Working directory holding `config.json` and the output logs.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// OS process id at launch.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub async fn is_running(&self) -> bool {
        match self.child.lock().await.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}

#[async_trait]
impl Node for LocalNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn http_base_uri(&self) -> &str {
        &self.http_base_uri
    }

    fn bootstrap_ip(&self) -> &str {
        &self.bootstrap_ip
    }

    fn config(&self) -> ConfigMap {
        self.config.clone()
    }

    /// Stopping an already stopped node is a no-op.
    #[instrument(skip(self), fields(node = %self.name, pid = ?self.pid))]
    async fn stop(&self, timeout: Duration) -> BackendResult<()> {
        let Some(mut child) = self.child.lock().await.take() else {
            return Ok(());
        };

        process::terminate(&mut child, timeout)
            .await
            .map_err(|e| BackendError::teardown(&self.name, e))?;
        info!("Stopped local node");
        Ok(())
    }
}

impl std::fmt::Debug for LocalNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalNode")
            .field("name", &self.name)
            .field("uri", &self.http_base_uri)
            .field("pid", &self.pid)
            .field("dir", &self.dir)
            .finish()
    }
}
