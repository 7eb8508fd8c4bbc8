use std::sync::Arc;

use clap::Subcommand;

use snapfleet_common::{CloudProvider, TagFilter};
use snapfleet_orchestrator::Reporter;

#[derive(Subcommand)]
pub enum VolumeCommands {
    /// List volumes of the selected instances
    List {
        /// Only volumes for project (tag Project:<value>)
        #[arg(long)]
        project: Option<String>,

        /// Only volumes for name (tag Name:<value>)
        #[arg(long)]
        name: Option<String>,
    },
}

pub async fn handle_volume_command(
    provider: Arc<dyn CloudProvider>,
    cmd: VolumeCommands,
) -> anyhow::Result<()> {
    match cmd {
        VolumeCommands::List { project, name } => {
            let volumes = Reporter::new(provider)
                .list_volumes(&TagFilter::new(project, name))
                .await?;

            if volumes.is_empty() {
                println!("No volumes found");
                return Ok(());
            }

            println!(
                "{:<22} {:<20} {:<12} {:<10} {:<14}",
                "VOLUME ID", "INSTANCE ID", "STATE", "SIZE", "ENCRYPTION"
            );

            for volume in volumes {
                println!(
                    "{:<22} {:<20} {:<12} {:<10} {:<14}",
                    volume.id,
                    volume.instance_id,
                    volume.state.to_string(),
                    format!("{} GiB", volume.size_gib),
                    if volume.encrypted {
                        "Encrypted"
                    } else {
                        "Not Encrypted"
                    },
                );
            }
        }
    }

    Ok(())
}
