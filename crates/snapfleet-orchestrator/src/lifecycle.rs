use std::sync::Arc;

use tracing::{info, instrument, warn};

use snapfleet_common::{CloudProvider, Instance, InstanceState, Snapshot, TagFilter};

use crate::selector::Selector;
use crate::snapshots::has_pending_snapshot;
use crate::wait::{wait_for_instance_state, WaitConfig};
use crate::Result;

/// Fixed description attached to every snapshot this tool requests, so
/// the originator is identifiable in the provider console.
pub const SNAPSHOT_DESCRIPTION: &str = "Created by snapfleet";

/// A per-instance provider rejection recovered by the standalone
/// stop/start commands.
#[derive(Debug, Clone)]
pub struct TransitionFailure {
    pub instance_id: String,
    pub error: String,
}

/// Result of one full stop/snapshot/start pass over a selection.
#[derive(Debug, Default)]
pub struct SnapshotRun {
    pub instances: Vec<InstanceSnapshotOutcome>,
}

#[derive(Debug)]
pub struct InstanceSnapshotOutcome {
    pub instance_id: String,
    pub snapshots: Vec<Snapshot>,
    pub skipped_volumes: Vec<String>,
}

/// Drives instance lifecycles over a tag-selected set, one instance at
/// a time. Stateless between calls; every invocation re-queries the
/// provider through the selector.
#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn CloudProvider>,
    selector: Selector,
    wait: WaitConfig,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self::with_wait_config(provider, WaitConfig::default())
    }

    pub fn with_wait_config(provider: Arc<dyn CloudProvider>, wait: WaitConfig) -> Self {
        Self {
            selector: Selector::new(provider.clone()),
            provider,
            wait,
        }
    }

    /// Request a stop for every selected instance.
    ///
    /// Request-only: does not wait for instances to reach `stopped`.
    /// Provider rejections are recovered per instance — recorded and
    /// logged, then iteration continues. Only the selection query
    /// itself can fail the whole command.
    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn stop_instances(&self, filter: &TagFilter) -> Result<Vec<TransitionFailure>> {
        let instances = self.selector.select(filter).await?;
        let mut failures = Vec::new();

        for instance in &instances {
            info!(id = %instance.id, "Stopping instance");
            if let Err(e) = self.provider.stop_instance(&instance.id).await {
                warn!(id = %instance.id, error = %e, "Could not stop instance");
                failures.push(TransitionFailure {
                    instance_id: instance.id.clone(),
                    error: e.to_string(),
                });
            }
        }

        Ok(failures)
    }

    /// Request a start for every selected instance. Same recovery
    /// policy as [`stop_instances`](Self::stop_instances).
    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn start_instances(&self, filter: &TagFilter) -> Result<Vec<TransitionFailure>> {
        let instances = self.selector.select(filter).await?;
        let mut failures = Vec::new();

        for instance in &instances {
            info!(id = %instance.id, "Starting instance");
            if let Err(e) = self.provider.start_instance(&instance.id).await {
                warn!(id = %instance.id, error = %e, "Could not start instance");
                failures.push(TransitionFailure {
                    instance_id: instance.id.clone(),
                    error: e.to_string(),
                });
            }
        }

        Ok(failures)
    }

    /// Stop, snapshot, and restart every selected instance, strictly
    /// sequentially.
    ///
    /// Unlike the standalone commands, any stop/start/snapshot/wait
    /// failure here is fatal to the whole run: remaining instances are
    /// not attempted. Walking away mid-sequence would leave an
    /// instance stopped or half-snapshotted, which is worse than
    /// finishing late.
    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn snapshot_instances(&self, filter: &TagFilter) -> Result<SnapshotRun> {
        let instances = self.selector.select(filter).await?;
        let mut run = SnapshotRun::default();

        for instance in &instances {
            let outcome = self.snapshot_instance(instance).await?;
            run.instances.push(outcome);
        }

        info!(instances = run.instances.len(), "Snapshot run complete");
        Ok(run)
    }

    async fn snapshot_instance(&self, instance: &Instance) -> Result<InstanceSnapshotOutcome> {
        let id = instance.id.as_str();

        info!(%id, "Stopping instance");
        self.provider.stop_instance(id).await?;
        wait_for_instance_state(self.provider.as_ref(), id, InstanceState::Stopped, &self.wait)
            .await?;

        let mut snapshots = Vec::new();
        let mut skipped_volumes = Vec::new();

        for volume in self.provider.list_volumes(id).await? {
            let history = self.provider.list_snapshots(&volume.id).await?;
            if has_pending_snapshot(&history) {
                info!(%id, volume = %volume.id, "Skipping volume, snapshot already in progress");
                skipped_volumes.push(volume.id);
                continue;
            }

            info!(%id, volume = %volume.id, "Creating snapshot");
            let snapshot = self
                .provider
                .create_snapshot(&volume.id, SNAPSHOT_DESCRIPTION)
                .await?;
            snapshots.push(snapshot);
        }

        info!(%id, "Starting instance");
        self.provider.start_instance(id).await?;
        wait_for_instance_state(self.provider.as_ref(), id, InstanceState::Running, &self.wait)
            .await?;

        Ok(InstanceSnapshotOutcome {
            instance_id: id.to_string(),
            snapshots,
            skipped_volumes,
        })
    }
}
