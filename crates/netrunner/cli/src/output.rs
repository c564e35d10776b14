//! Output formatting utilities

use colored::*;
use netrunner_types::NodeInfo;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print nodes sorted by name
pub fn print_nodes(mut nodes: Vec<NodeInfo>, format: OutputFormat) -> serde_json::Result<()> {
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    match format {
        OutputFormat::Table => {
            if nodes.is_empty() {
                println!("{}", "No nodes".dimmed());
                return Ok(());
            }
            println!("{:<16} {:<32} {}", "NAME".bold(), "URI".bold(), "BOOTSTRAP".bold());
            for node in &nodes {
                println!("{:<16} {:<32} {}", node.name, node.uri, node.bootstrapip);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&nodes)?),
    }
    Ok(())
}

/// Print a single node
pub fn print_node(node: &NodeInfo, format: OutputFormat) -> serde_json::Result<()> {
    match format {
        OutputFormat::Table => {
            println!("Name:      {}", node.name);
            println!("URI:       {}", node.uri);
            println!("Bootstrap: {}", node.bootstrapip);
            if let Ok(config) = node.decode_config() {
                println!("Config:    {}", serde_json::to_string(&config)?);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(node)?),
    }
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}
