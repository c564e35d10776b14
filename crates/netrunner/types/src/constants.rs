//! Well-known configuration keys and defaults

/// Executor kind used for ordinary validator nodes.
pub const NORMAL_EXECUTION: &str = "normal";

/// Default container image for the enclave backend.
pub const AVALANCHEGO_DOCKER_IMAGE: &str = "avaplatform/avalanchego:latest";

/// Default binary path for the local-process backend.
pub const AVALANCHEGO_BINARY: &str = "avalanchego";

/// Default base directory for node working directories.
pub const BASE_DATA_DIR: &str = "/tmp/netrunner";

/// HTTP API port used when a node config omits one.
pub const DEFAULT_HTTP_PORT: u16 = 9650;

/// Staking (P2P) port used when a node config omits one.
pub const DEFAULT_STAKING_PORT: u16 = 9651;

/// Config key carrying the HTTP API port.
pub const HTTP_PORT_KEY: &str = "http-port";

/// Config key carrying the staking (P2P) port.
pub const STAKING_PORT_KEY: &str = "staking-port";

/// Config key carrying comma-separated bootstrap addresses.
pub const BOOTSTRAP_IPS_KEY: &str = "bootstrap-ips";

/// Config key carrying the database directory.
pub const DB_DIR_KEY: &str = "db-dir";

/// Config key carrying the log directory.
pub const LOG_DIR_KEY: &str = "log-dir";

/// Flag carrying the base64-encoded config blob.
pub const CONFIG_CONTENT_FLAG: &str = "config-file-content";

/// Flag carrying the encoding of the config blob.
pub const CONFIG_CONTENT_TYPE_FLAG: &str = "config-file-content-type";

/// Node count used by the default network bootstrap routine.
pub const DEFAULT_NODE_COUNT: usize = 5;
