mod commands;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    handle_instance_command, handle_snapshot_command, handle_volume_command, InstanceCommands,
    SnapshotCommands, VolumeCommands,
};
use snapfleet_orchestrator::WaitConfig;
use snapfleet_provider::MemoryProvider;

const FLEET_ENV: &str = "SNAPFLEET_FLEET";
const DEFAULT_FLEET: &str = "fleet.yaml";

#[derive(Parser)]
#[command(name = "snapfleet")]
#[command(about = "Manage tagged fleet instances and their volume snapshots")]
struct Cli {
    /// Fleet seed file (falls back to $SNAPFLEET_FLEET, then fleet.yaml)
    #[arg(long, global = true)]
    fleet: Option<PathBuf>,

    /// Seconds to wait for an instance transition before giving up
    #[arg(long, global = true, default_value_t = 600)]
    wait_timeout_secs: u64,

    /// First poll delay while waiting for a transition, in milliseconds
    #[arg(long, global = true, default_value_t = 500)]
    poll_interval_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commands for instances
    #[command(subcommand)]
    Instances(InstanceCommands),
    /// Commands for volumes
    #[command(subcommand)]
    Volumes(VolumeCommands),
    /// Commands for snapshots
    #[command(subcommand)]
    Snapshots(SnapshotCommands),
}

fn fleet_path(cli: &Cli) -> PathBuf {
    cli.fleet
        .clone()
        .or_else(|| std::env::var(FLEET_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FLEET))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let path = fleet_path(&cli);
    let provider = MemoryProvider::from_path(&path)
        .with_context(|| format!("failed to load fleet seed {}", path.display()))?;
    let provider = Arc::new(provider);

    let wait = WaitConfig {
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        timeout: Duration::from_secs(cli.wait_timeout_secs),
        ..WaitConfig::default()
    };

    match cli.command {
        Commands::Instances(cmd) => handle_instance_command(provider, wait, cmd).await?,
        Commands::Volumes(cmd) => handle_volume_command(provider, cmd).await?,
        Commands::Snapshots(cmd) => handle_snapshot_command(provider, cmd).await?,
    }

    Ok(())
}
