use std::sync::Arc;

use clap::Subcommand;

use snapfleet_common::{CloudProvider, TagFilter};
use snapfleet_orchestrator::Reporter;

use crate::utils::format_time;

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// List snapshots of the selected instances' volumes
    List {
        /// Only snapshots for project (tag Project:<value>)
        #[arg(long)]
        project: Option<String>,

        /// Only snapshots for name (tag Name:<value>)
        #[arg(long)]
        name: Option<String>,

        /// Show the full history per volume, not just the most recent
        /// completed snapshot
        #[arg(long)]
        all: bool,
    },
}

pub async fn handle_snapshot_command(
    provider: Arc<dyn CloudProvider>,
    cmd: SnapshotCommands,
) -> anyhow::Result<()> {
    match cmd {
        SnapshotCommands::List { project, name, all } => {
            let rows = Reporter::new(provider)
                .list_snapshots(&TagFilter::new(project, name), all)
                .await?;

            if rows.is_empty() {
                println!("No snapshots found");
                return Ok(());
            }

            println!(
                "{:<28} {:<22} {:<20} {:<11} {:<10} {:<24}",
                "SNAPSHOT ID", "VOLUME ID", "INSTANCE ID", "STATE", "PROGRESS", "STARTED"
            );

            for row in rows {
                println!(
                    "{:<28} {:<22} {:<20} {:<11} {:<10} {:<24}",
                    row.snapshot.id,
                    row.snapshot.volume_id,
                    row.instance_id,
                    row.snapshot.state.to_string(),
                    row.snapshot.progress,
                    format_time(&row.snapshot.started_at),
                );
            }
        }
    }

    Ok(())
}
