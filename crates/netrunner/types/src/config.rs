//! Node configuration
//!
//! A node's configuration is deliberately untyped: the set of keys a node
//! binary understands is backend- and binary-specific, so the orchestrator only
//! interprets a handful of well-known keys (ports, directories, bootstrap
//! addresses) and passes everything else through verbatim.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{CONFIG_CONTENT_FLAG, CONFIG_CONTENT_TYPE_FLAG};

/// Ordered key-value bag of node settings.
pub type ConfigMap = serde_json::Map<String, Value>;

/// Errors raised while decoding or interpreting node configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base64 config payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("invalid json config payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("node name must not be empty")]
    EmptyName,
}

/// Declarative description of a node to launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node name, unique within its network
    pub name: String,

    /// Executor kind resolved through the executor registry
    pub executable: String,

    /// Caller-defined settings handed to the node binary
    #[serde(default)]
    pub config: ConfigMap,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executable: executable.into(),
            config: ConfigMap::new(),
        }
    }

    /// Set a single config entry, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Decode a node config from its JSON wire form.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: NodeConfig = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode this node config to its JSON wire form.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(())
    }

    /// Read a port entry, accepting both numbers and numeric strings.
    pub fn port(&self, key: &str) -> Result<Option<u16>, ConfigError> {
        port_value(&self.config, key)
    }
}

/// Read a port entry from a config map.
///
/// Absent keys yield `Ok(None)`; present keys must hold a value in `1..=65535`.
pub fn port_value(config: &ConfigMap, key: &str) -> Result<Option<u16>, ConfigError> {
    let Some(value) = config.get(key) else {
        return Ok(None);
    };

    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed {
        Some(port) if (1..=u16::MAX as u64).contains(&port) => Ok(Some(port as u16)),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: format!("expected a TCP port, got {}", value),
        }),
    }
}

/// Encode a config map as the base64 JSON blob node binaries consume.
pub fn encode_config(config: &ConfigMap) -> Result<String, ConfigError> {
    let bytes = serde_json::to_vec(config)?;
    Ok(STANDARD.encode(bytes))
}

/// Decode a base64 JSON blob back into a config map.
pub fn decode_config(encoded: &str) -> Result<ConfigMap, ConfigError> {
    let bytes = STANDARD.decode(encoded)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Command-line arguments injecting `config` into a node binary.
pub fn config_args(config: &ConfigMap) -> Result<Vec<String>, ConfigError> {
    Ok(vec![
        format!("--{}={}", CONFIG_CONTENT_FLAG, encode_config(config)?),
        format!("--{}=json", CONFIG_CONTENT_TYPE_FLAG),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{HTTP_PORT_KEY, NORMAL_EXECUTION};
    use serde_json::json;

    #[test]
    fn test_port_accepts_numbers_and_strings() {
        let config = NodeConfig::new("node0", NORMAL_EXECUTION)
            .with(HTTP_PORT_KEY, 9650)
            .with("staking-port", "9651");

        assert_eq!(config.port(HTTP_PORT_KEY).unwrap(), Some(9650));
        assert_eq!(config.port("staking-port").unwrap(), Some(9651));
        assert_eq!(config.port("missing").unwrap(), None);
    }

    #[test]
    fn test_port_rejects_out_of_range() {
        let config = NodeConfig::new("node0", NORMAL_EXECUTION).with(HTTP_PORT_KEY, 70000);
        assert!(matches!(
            config.port(HTTP_PORT_KEY),
            Err(ConfigError::InvalidValue { .. })
        ));

        let config = NodeConfig::new("node0", NORMAL_EXECUTION).with(HTTP_PORT_KEY, json!([1]));
        assert!(config.port(HTTP_PORT_KEY).is_err());
    }

    #[test]
    fn test_from_json_bytes_requires_name() {
        let bytes = br#"{"name":"  ","executable":"normal"}"#;
        assert!(matches!(
            NodeConfig::from_json_bytes(bytes),
            Err(ConfigError::EmptyName)
        ));

        let bytes = br#"{"name":"node1","executable":"normal"}"#;
        let config = NodeConfig::from_json_bytes(bytes).unwrap();
        assert!(config.config.is_empty());
    }

    #[test]
    fn test_config_args_carry_decodable_blob() {
        let mut config = ConfigMap::new();
        config.insert("log-level".into(), json!("debug"));

        let args = config_args(&config).unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[1], "--config-file-content-type=json");

        let blob = args[0]
            .strip_prefix("--config-file-content=")
            .expect("content flag");
        assert_eq!(decode_config(blob).unwrap(), config);
    }
}
