//! Commands that drive a running daemon

use std::path::{Path, PathBuf};

use clap::Subcommand;
use netrunner_types::constants::NORMAL_EXECUTION;
use netrunner_types::{ConfigMap, NodeConfig};

use crate::client::NetrunnerClient;
use crate::error::{CliError, CliResult};
use crate::output::{print_node, print_nodes, print_success, OutputFormat};

#[derive(Subcommand)]
pub enum NetworkCommands {
    /// Check that the daemon is reachable
    Ping,

    /// Create an empty network
    Create {
        /// Network name
        network: String,
    },

    /// Launch a node in a network
    AddNode {
        /// Network name
        network: String,

        /// Node name
        name: String,

        /// Executor kind
        #[arg(short, long, default_value = NORMAL_EXECUTION)]
        executable: String,

        /// Node settings as an inline JSON object
        #[arg(long, conflicts_with = "config_file")]
        config: Option<String>,

        /// Node settings read from a JSON file
        #[arg(long)]
        config_file: Option<PathBuf>,
    },

    /// List the nodes of a network
    Nodes {
        /// Network name
        network: String,
    },

    /// Show one node
    Node {
        /// Network name
        network: String,

        /// Node name
        name: String,
    },

    /// Stop one node
    StopNode {
        /// Network name
        network: String,

        /// Node name
        name: String,

        /// Seconds to wait for a graceful exit (0 = daemon default)
        #[arg(short, long, default_value_t = 0)]
        timeout: u64,
    },

    /// Tear a network down
    Teardown {
        /// Network name
        network: String,
    },

    /// Block until every node of a network is healthy
    AwaitHealthy {
        /// Network name
        network: String,

        /// Milliseconds between polling passes
        #[arg(long)]
        poll_interval_ms: Option<u64>,

        /// Seconds before giving up
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

pub async fn execute(
    command: NetworkCommands,
    client: &NetrunnerClient,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        NetworkCommands::Ping => {
            let pid = client.ping().await?;
            print_success(&format!("Daemon is up (pid {})", pid));
        }

        NetworkCommands::Create { network } => {
            client.create_network(&network).await?;
            print_success(&format!("Created network {}", network));
        }

        NetworkCommands::AddNode {
            network,
            name,
            executable,
            config,
            config_file,
        } => {
            let settings = parse_settings(config.as_deref(), config_file.as_deref())?;
            let mut node_config = NodeConfig::new(name, executable);
            node_config.config = settings;

            let node = client.add_node(&network, &node_config).await?;
            print_node(&node, format)?;
        }

        NetworkCommands::Nodes { network } => {
            let nodes = client.get_nodes(&network).await?;
            print_nodes(nodes, format)?;
        }

        NetworkCommands::Node { network, name } => {
            let node = client.get_node(&network, &name).await?;
            print_node(&node, format)?;
        }

        NetworkCommands::StopNode {
            network,
            name,
            timeout,
        } => {
            client.stop_node(&network, &name, timeout).await?;
            print_success(&format!("Stopped {} in {}", name, network));
        }

        NetworkCommands::Teardown { network } => {
            client.teardown(&network).await?;
            print_success(&format!("Tore down network {}", network));
        }

        NetworkCommands::AwaitHealthy {
            network,
            poll_interval_ms,
            timeout_secs,
        } => {
            client
                .await_healthy(&network, poll_interval_ms, timeout_secs)
                .await?;
            print_success(&format!("All nodes of {} are healthy", network));
        }
    }

    Ok(())
}

/// Read node settings from an inline JSON object or a JSON file.
fn parse_settings(inline: Option<&str>, file: Option<&Path>) -> CliResult<ConfigMap> {
    let raw = match (inline, file) {
        (Some(inline), _) => inline.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Ok(ConfigMap::new()),
    };

    serde_json::from_str(&raw)
        .map_err(|e| CliError::InvalidInput(format!("node config must be a JSON object: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_inline_settings() {
        let settings = parse_settings(Some(r#"{"http-port": 9650, "log-level": "debug"}"#), None)
            .unwrap();
        assert_eq!(settings.get("http-port"), Some(&json!(9650)));
        assert_eq!(settings.get("log-level"), Some(&json!("debug")));
    }

    #[test]
    fn test_parse_settings_from_file() {
        let path = std::env::temp_dir().join(format!("netrunner-cli-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"staking-port": 9651}"#).unwrap();

        let settings = parse_settings(None, Some(&path)).unwrap();
        assert_eq!(settings.get("staking-port"), Some(&json!(9651)));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_settings_are_empty() {
        assert!(parse_settings(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_non_object_settings_are_rejected() {
        let err = parse_settings(Some("[1, 2]"), None).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
    }
}
