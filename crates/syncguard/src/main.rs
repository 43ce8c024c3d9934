//! SyncGuard - main entry point.
//!
//! Maintains harmony between a validator pair during transitions and
//! failover: loads the configuration, starts the failover supervisor,
//! and runs until SIGINT or SIGTERM.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use syncguard::{logging, FailoverSupervisor};
use syncguard_config::Config;
use syncguard_types::NodeRole;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "syncguard",
    version,
    about = "Active-passive availability controller for CometBFT-family validators",
    long_about = "SyncGuard monitors the local validator and coordinates a safe handoff of \
signing duties between a two-node pair: when the active side turns unhealthy the private key \
moves to the peer, the last-signed state synchronizes, and the validator restarts so exactly \
one side can sign at a time."
)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override the configured node role
    #[arg(long, value_parser = parse_role)]
    role: Option<NodeRole>,
}

fn parse_role(value: &str) -> Result<NodeRole, String> {
    value.parse()
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)?;
    if let Some(role) = cli.role {
        config.node.role = role;
    }

    logging::init(&config.logging)?;

    let supervisor = Arc::new(FailoverSupervisor::new(config));
    supervisor.start().await?;

    wait_for_shutdown().await;

    supervisor.stop().await;
    Ok(())
}

/// Block until SIGINT or SIGTERM.
async fn wait_for_shutdown() {
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down"),
        _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
    }
}
