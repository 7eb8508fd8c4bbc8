use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use snapfleet_common::{
    CloudProvider, FleetError, Instance, InstanceState, Result, Snapshot, SnapshotState,
    TagFilter, Volume,
};

use crate::seed::FleetSeed;

/// Polls of `describe_instance` a transitioning instance stays in its
/// intermediate state before settling.
const DEFAULT_SETTLE_POLLS: u32 = 2;

struct Transition {
    settled: InstanceState,
    remaining: u32,
}

struct InstanceSlot {
    record: Instance,
    transition: Option<Transition>,
}

#[derive(Default)]
struct FleetState {
    /// Provider-order instance ids.
    order: Vec<String>,
    instances: HashMap<String, InstanceSlot>,
    volumes: HashMap<String, Volume>,
    /// Attachment order per instance.
    volume_order: HashMap<String, Vec<String>>,
    /// Snapshot history per volume, most recent first.
    snapshots: HashMap<String, Vec<Snapshot>>,
}

/// Deterministic in-memory cloud.
///
/// Stop and start requests move an instance into its transitional
/// state; the instance settles after a fixed number of describe polls,
/// so callers that poll for state observe the same shape a real
/// provider exposes: request accepted now, transition finished later.
#[derive(Clone)]
pub struct MemoryProvider {
    state: Arc<RwLock<FleetState>>,
    settle_polls: u32,
}

impl MemoryProvider {
    pub fn from_seed(seed: FleetSeed) -> Self {
        let (instances, volumes, snapshots) = seed.into_records();

        let mut state = FleetState::default();
        for instance in instances {
            state.order.push(instance.id.clone());
            state.volume_order.entry(instance.id.clone()).or_default();
            state.instances.insert(
                instance.id.clone(),
                InstanceSlot {
                    record: instance,
                    transition: None,
                },
            );
        }
        for volume in volumes {
            state
                .volume_order
                .entry(volume.instance_id.clone())
                .or_default()
                .push(volume.id.clone());
            state.volumes.insert(volume.id.clone(), volume);
        }
        state.snapshots = snapshots;

        info!(
            instances = state.order.len(),
            volumes = state.volumes.len(),
            "Seeded in-memory fleet"
        );

        Self {
            state: Arc::new(RwLock::new(state)),
            settle_polls: DEFAULT_SETTLE_POLLS,
        }
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(FleetSeed::from_path(path)?.into_provider())
    }

    /// Override how many describe polls a transition takes to settle.
    pub fn with_settle_polls(mut self, polls: u32) -> Self {
        self.settle_polls = polls;
        self
    }
}

#[async_trait]
impl CloudProvider for MemoryProvider {
    async fn list_instances(&self, filter: &TagFilter) -> Result<Vec<Instance>> {
        let state = self.state.read().await;
        let matched = state
            .order
            .iter()
            .filter_map(|id| state.instances.get(id))
            .filter(|slot| filter.matches(&slot.record.tags))
            .map(|slot| slot.record.clone())
            .collect();
        Ok(matched)
    }

    async fn describe_instance(&self, id: &str) -> Result<Instance> {
        let mut state = self.state.write().await;
        let slot = state
            .instances
            .get_mut(id)
            .ok_or_else(|| FleetError::NotFound(format!("instance {id}")))?;

        if let Some(transition) = &mut slot.transition {
            if transition.remaining == 0 {
                slot.record.state = transition.settled;
                slot.transition = None;
                debug!(%id, state = %slot.record.state, "Instance settled");
            } else {
                transition.remaining -= 1;
            }
        }

        Ok(slot.record.clone())
    }

    async fn list_volumes(&self, instance_id: &str) -> Result<Vec<Volume>> {
        let state = self.state.read().await;
        if !state.instances.contains_key(instance_id) {
            return Err(FleetError::NotFound(format!("instance {instance_id}")));
        }
        let volumes = state
            .volume_order
            .get(instance_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.volumes.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(volumes)
    }

    async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>> {
        let state = self.state.read().await;
        if !state.volumes.contains_key(volume_id) {
            return Err(FleetError::NotFound(format!("volume {volume_id}")));
        }
        Ok(state.snapshots.get(volume_id).cloned().unwrap_or_default())
    }

    async fn stop_instance(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let slot = state
            .instances
            .get_mut(id)
            .ok_or_else(|| FleetError::NotFound(format!("instance {id}")))?;

        if slot.record.state != InstanceState::Running {
            return Err(FleetError::InvalidTransition {
                id: id.to_string(),
                state: slot.record.state,
            });
        }

        slot.record.state = InstanceState::Stopping;
        slot.transition = Some(Transition {
            settled: InstanceState::Stopped,
            remaining: self.settle_polls,
        });
        info!(%id, "Stop request accepted");
        Ok(())
    }

    async fn start_instance(&self, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let slot = state
            .instances
            .get_mut(id)
            .ok_or_else(|| FleetError::NotFound(format!("instance {id}")))?;

        if slot.record.state != InstanceState::Stopped {
            return Err(FleetError::InvalidTransition {
                id: id.to_string(),
                state: slot.record.state,
            });
        }

        slot.record.state = InstanceState::Pending;
        slot.transition = Some(Transition {
            settled: InstanceState::Running,
            remaining: self.settle_polls,
        });
        info!(%id, "Start request accepted");
        Ok(())
    }

    async fn create_snapshot(&self, volume_id: &str, description: &str) -> Result<Snapshot> {
        let mut state = self.state.write().await;
        if !state.volumes.contains_key(volume_id) {
            return Err(FleetError::NotFound(format!("volume {volume_id}")));
        }

        let snapshot = Snapshot {
            id: format!("snap-{}", Uuid::new_v4().simple()),
            volume_id: volume_id.to_string(),
            state: SnapshotState::Pending,
            progress: "0%".to_string(),
            started_at: Utc::now(),
        };

        info!(volume = %volume_id, snapshot = %snapshot.id, %description, "Snapshot requested");
        state
            .snapshots
            .entry(volume_id.to_string())
            .or_default()
            .insert(0, snapshot.clone());

        Ok(snapshot)
    }
}
