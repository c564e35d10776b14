//! Wire representation of a launched node

use serde::{Deserialize, Serialize};

use crate::config::{decode_config, encode_config, ConfigError, ConfigMap};

/// Description of a launched node as reported over the control plane.
///
/// `config` is the base64-encoded JSON of the node's effective config, the
/// same encoding the gateway uses for every bytes field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub config: String,
    pub uri: String,
    pub bootstrapip: String,
}

impl NodeInfo {
    pub fn new(
        name: impl Into<String>,
        config: &ConfigMap,
        uri: impl Into<String>,
        bootstrap_ip: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.into(),
            config: encode_config(config)?,
            uri: uri.into(),
            bootstrapip: bootstrap_ip.into(),
        })
    }

    pub fn decode_config(&self) -> Result<ConfigMap, ConfigError> {
        decode_config(&self.config)
    }
}
