use std::sync::Arc;

use clap::Subcommand;

use snapfleet_common::{CloudProvider, TagFilter};
use snapfleet_orchestrator::{Orchestrator, Reporter, TransitionFailure, WaitConfig};

use crate::utils::display_or;

#[derive(Subcommand)]
pub enum InstanceCommands {
    /// List instances
    List {
        /// Only instances for project (tag Project:<value>)
        #[arg(long)]
        project: Option<String>,

        /// Only instances for name (tag Name:<value>)
        #[arg(long)]
        name: Option<String>,
    },
    /// Stop instances
    Stop {
        /// Only instances for project (tag Project:<value>)
        #[arg(long)]
        project: Option<String>,

        /// Only instances for name (tag Name:<value>)
        #[arg(long)]
        name: Option<String>,
    },
    /// Start instances
    Start {
        /// Only instances for project (tag Project:<value>)
        #[arg(long)]
        project: Option<String>,

        /// Only instances for name (tag Name:<value>)
        #[arg(long)]
        name: Option<String>,
    },
    /// Stop, snapshot every attached volume, then restart instances
    Snapshot {
        /// Only instances for project (tag Project:<value>)
        #[arg(long)]
        project: Option<String>,

        /// Only instances for name (tag Name:<value>)
        #[arg(long)]
        name: Option<String>,
    },
}

pub async fn handle_instance_command(
    provider: Arc<dyn CloudProvider>,
    wait: WaitConfig,
    cmd: InstanceCommands,
) -> anyhow::Result<()> {
    match cmd {
        InstanceCommands::List { project, name } => {
            instances_list(provider, TagFilter::new(project, name)).await?;
        }
        InstanceCommands::Stop { project, name } => {
            let orchestrator = Orchestrator::with_wait_config(provider, wait);
            let failures = orchestrator
                .stop_instances(&TagFilter::new(project, name))
                .await?;
            report_failures("stop", &failures);
        }
        InstanceCommands::Start { project, name } => {
            let orchestrator = Orchestrator::with_wait_config(provider, wait);
            let failures = orchestrator
                .start_instances(&TagFilter::new(project, name))
                .await?;
            report_failures("start", &failures);
        }
        InstanceCommands::Snapshot { project, name } => {
            let orchestrator = Orchestrator::with_wait_config(provider, wait);
            let run = orchestrator
                .snapshot_instances(&TagFilter::new(project, name))
                .await?;

            for outcome in &run.instances {
                for snapshot in &outcome.snapshots {
                    println!(
                        "{}: created {} for {}",
                        outcome.instance_id, snapshot.id, snapshot.volume_id
                    );
                }
                for volume_id in &outcome.skipped_volumes {
                    println!(
                        "{}: skipped {}, snapshot already in progress",
                        outcome.instance_id, volume_id
                    );
                }
            }
            println!("Job done");
        }
    }

    Ok(())
}

async fn instances_list(
    provider: Arc<dyn CloudProvider>,
    filter: TagFilter,
) -> anyhow::Result<()> {
    let instances = Reporter::new(provider).list_instances(&filter).await?;

    if instances.is_empty() {
        println!("No instances found");
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:<14} {:<10} {:<14} {:<14} {:<16} {:<16}",
        "INSTANCE ID", "TYPE", "ZONE", "STATE", "PROJECT", "NAME", "PUBLIC IP", "PRIVATE IP"
    );

    for instance in instances {
        println!(
            "{:<20} {:<12} {:<14} {:<10} {:<14} {:<14} {:<16} {:<16}",
            instance.id,
            instance.instance_type,
            instance.availability_zone,
            instance.state.to_string(),
            display_or(instance.project(), "<no project>"),
            display_or(instance.name(), "<no name>"),
            display_or(instance.public_ip.as_deref(), "-"),
            display_or(instance.private_ip.as_deref(), "-"),
        );
    }

    Ok(())
}

fn report_failures(action: &str, failures: &[TransitionFailure]) {
    for failure in failures {
        eprintln!(
            "Could not {} {}: {}",
            action, failure.instance_id, failure.error
        );
    }
}
