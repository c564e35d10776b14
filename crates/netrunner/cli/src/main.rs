//! Netrunner CLI - Command-line interface for ephemeral test networks
//!
//! This CLI lets operators and test harnesses:
//! - Create and tear down networks on a running daemon
//! - Add, inspect and stop nodes
//! - Wait for a network to become healthy
//! - Run a local five-node network without a daemon

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod client;
mod commands;
mod error;
mod output;

use client::{NetrunnerClient, DEFAULT_DIAL_TIMEOUT};
use commands::{network, run};
use error::CliResult;

/// Netrunner CLI application
#[derive(Parser)]
#[command(name = "netrunner")]
#[command(about = "Netrunner - Ephemeral test network orchestrator CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Netrunner daemon endpoint
    #[arg(short, long, env = "NETRUNNER_ENDPOINT", default_value = "http://localhost:8081")]
    endpoint: String,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = DEFAULT_DIAL_TIMEOUT.as_secs())]
    dial_timeout: u64,

    /// Request timeout in seconds (0 = none)
    #[arg(long, default_value_t = 0)]
    request_timeout: u64,

    /// Output format
    #[arg(short, long, default_value = "table")]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Network(network::NetworkCommands),

    /// Show daemon version, uptime and network count
    Status,

    /// Start a local network, wait until healthy, stop on Ctrl+C
    Run(run::RunArgs),
}

#[tokio::main]
async fn main() {
    if let Err(e) = try_main().await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn try_main() -> CliResult<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let request_timeout = match cli.request_timeout {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    match cli.command {
        Commands::Network(command) => {
            let client = NetrunnerClient::new(
                &cli.endpoint,
                Duration::from_secs(cli.dial_timeout),
                request_timeout,
            )?;
            network::execute(command, &client, cli.output).await
        }
        Commands::Status => {
            let client = NetrunnerClient::new(
                &cli.endpoint,
                Duration::from_secs(cli.dial_timeout),
                request_timeout,
            )?;
            let status = client.health_check().await?;
            output::print_success(&format!("Netrunner daemon is {}", status.status));
            println!("  Version:  {}", status.version);
            println!("  Uptime:   {}", status.uptime);
            println!("  Networks: {}", status.networks);
            Ok(())
        }
        Commands::Run(args) => run::execute(args).await,
    }
}
