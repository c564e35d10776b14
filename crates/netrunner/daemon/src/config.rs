//! Configuration for netrunner-daemon

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use netrunner_backend::ExecutorRegistry;
use netrunner_local::OrchestratorConfig;
use netrunner_types::constants::{
    AVALANCHEGO_BINARY, AVALANCHEGO_DOCKER_IMAGE, BASE_DATA_DIR, NORMAL_EXECUTION,
};
use serde::{Deserialize, Serialize};

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Orchestrator and backend configuration
    #[serde(default)]
    pub orchestrator: OrchestratorSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Request timeout in seconds; does not apply to awaitHealthy
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8081)),
            enable_cors: true,
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Which substrate nodes run on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Child processes of the daemon
    #[default]
    Local,

    /// Containers in per-network Docker enclaves
    Enclave,
}

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSettings {
    #[serde(default)]
    pub backend: BackendKind,

    /// Root of per-node working directories (local backend)
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Delete node directories when their network is torn down
    #[serde(default)]
    pub destroy_on_teardown: bool,

    /// Tear down every network when the daemon exits
    #[serde(default)]
    pub teardown_on_exit: bool,

    /// Binary for the `normal` executor (local backend)
    #[serde(default = "default_binary")]
    pub avalanchego_binary_path: String,

    /// Image for the `normal` executor (enclave backend)
    #[serde(default = "default_image")]
    pub image: String,

    /// Additional executor kinds mapped to a binary path or image
    #[serde(default)]
    pub executors: BTreeMap<String, String>,

    /// Default grace period for node stops, in seconds
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_secs: u64,

    /// Default awaitHealthy poll interval, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub health_poll_interval_ms: u64,

    /// Default awaitHealthy deadline, in seconds
    #[serde(default = "default_health_timeout")]
    pub health_timeout_secs: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            base_dir: default_base_dir(),
            destroy_on_teardown: false,
            teardown_on_exit: false,
            avalanchego_binary_path: default_binary(),
            image: default_image(),
            executors: BTreeMap::new(),
            stop_timeout_secs: default_stop_timeout(),
            health_poll_interval_ms: default_poll_interval(),
            health_timeout_secs: default_health_timeout(),
        }
    }
}

impl OrchestratorSettings {
    /// Executor registry for the selected backend. The `normal` kind maps to
    /// the binary path or the image; explicit entries win.
    pub fn registry(&self) -> ExecutorRegistry {
        let normal = match self.backend {
            BackendKind::Local => self.avalanchego_binary_path.clone(),
            BackendKind::Enclave => self.image.clone(),
        };

        let mut executors = BTreeMap::from([(NORMAL_EXECUTION.to_string(), normal)]);
        executors.extend(self.executors.clone());
        ExecutorRegistry::new(executors)
    }

    pub fn local_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::new(&self.base_dir, self.registry())
            .destroy_on_teardown(self.destroy_on_teardown)
            .with_stop_timeout(self.stop_timeout())
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_millis(self.health_poll_interval_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    300
}

fn default_max_body_size() -> usize {
    1024 * 1024
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(BASE_DATA_DIR)
}

fn default_binary() -> String {
    AVALANCHEGO_BINARY.to_string()
}

fn default_image() -> String {
    AVALANCHEGO_DOCKER_IMAGE.to_string()
}

fn default_stop_timeout() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_health_timeout() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `NETRUNNER_`-prefixed environment variables (`__` separates sections).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("NETRUNNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.server.listen_addr.port(), 8081);
        assert_eq!(config.orchestrator.backend, BackendKind::Local);
        assert_eq!(config.orchestrator.base_dir, PathBuf::from("/tmp/netrunner"));
        assert!(!config.orchestrator.teardown_on_exit);
    }

    #[test]
    fn test_registry_follows_backend() {
        let mut settings = OrchestratorSettings::default();
        settings.avalanchego_binary_path = "/opt/avalanchego".into();
        assert_eq!(
            settings.registry().resolve(NORMAL_EXECUTION),
            Some("/opt/avalanchego")
        );

        settings.backend = BackendKind::Enclave;
        settings
            .executors
            .insert("byzantine".into(), "netrunner/byzantine:dev".into());
        let registry = settings.registry();
        assert_eq!(registry.resolve(NORMAL_EXECUTION), Some(AVALANCHEGO_DOCKER_IMAGE));
        assert_eq!(registry.resolve("byzantine"), Some("netrunner/byzantine:dev"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nlisten_addr = \"0.0.0.0:9000\"\n\n[orchestrator]\nbackend = \"enclave\"\nteardown_on_exit = true\n"
        )
        .unwrap();

        let config = DaemonConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9000);
        assert_eq!(config.orchestrator.backend, BackendKind::Enclave);
        assert!(config.orchestrator.teardown_on_exit);
        assert_eq!(config.orchestrator.stop_timeout_secs, 10);
    }
}
