//! Local-process launch backend

use std::sync::Arc;

use async_trait::async_trait;
use netrunner_backend::{BackendError, BackendResult, NetworkBackend, NetworkConstructor};
use tracing::{debug, instrument};

use crate::config::OrchestratorConfig;
use crate::constructor::{check_path_component, LocalConstructor};

/// Creates networks whose nodes run as local child processes.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    config: Arc<OrchestratorConfig>,
}

impl LocalBackend {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}

#[async_trait]
impl NetworkBackend for LocalBackend {
    fn kind(&self) -> &'static str {
        "local"
    }

    #[instrument(skip(self))]
    async fn construct(&self, name: &str) -> BackendResult<Box<dyn NetworkConstructor>> {
        check_path_component("network", name).map_err(BackendError::from)?;

        let dir = self.config.network_dir(name);
        tokio::fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Prepared network directory");

        Ok(Box::new(LocalConstructor::new(name, dir, self.config.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netrunner_backend::ExecutorRegistry;

    #[tokio::test]
    async fn test_construct_creates_network_dir() {
        let base = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(OrchestratorConfig::new(
            base.path(),
            ExecutorRegistry::default(),
        ));

        backend.construct("net1").await.unwrap();
        assert!(base.path().join("net1").is_dir());
        assert_eq!(backend.kind(), "local");
    }

    #[tokio::test]
    async fn test_construct_rejects_path_names() {
        let base = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(OrchestratorConfig::new(
            base.path(),
            ExecutorRegistry::default(),
        ));

        let err = backend.construct("../escape").await.err().unwrap();
        assert!(matches!(err, BackendError::InvalidConfig(_)));
    }
}
