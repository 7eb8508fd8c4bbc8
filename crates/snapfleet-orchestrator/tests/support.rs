//! Recording provider for orchestration tests: journals every call so
//! tests can assert exactly which requests were issued and in what
//! order, with injectable per-instance failures.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use snapfleet_common::{
    CloudProvider, FleetError, Instance, InstanceState, Result, Snapshot, SnapshotState,
    TagFilter, Volume, VolumeState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ListInstances,
    Describe(String),
    ListVolumes(String),
    ListSnapshots(String),
    Stop(String),
    Start(String),
    CreateSnapshot(String),
}

#[derive(Default)]
struct Inner {
    calls: Vec<ProviderCall>,
    states: HashMap<String, InstanceState>,
    snapshots: HashMap<String, Vec<Snapshot>>,
}

/// In contrast to the memory provider, transitions here complete
/// instantly: an accepted stop reports `stopped` on the next describe.
/// That keeps ordering assertions about requests, not polling.
#[derive(Clone, Default)]
pub struct RecordingProvider {
    inner: Arc<Mutex<Inner>>,
    instances: Vec<Instance>,
    volumes: HashMap<String, Vec<Volume>>,
    fail_stop: HashSet<String>,
    fail_start: HashSet<String>,
}

pub fn instance(id: &str, project: &str, name: &str) -> Instance {
    let mut tags = HashMap::new();
    tags.insert("Project".to_string(), project.to_string());
    tags.insert("Name".to_string(), name.to_string());
    Instance {
        id: id.to_string(),
        instance_type: "t3.micro".to_string(),
        availability_zone: "local-1a".to_string(),
        state: InstanceState::Running,
        tags,
        public_ip: None,
        private_ip: None,
    }
}

pub fn snapshot(id: &str, volume_id: &str, state: SnapshotState, hours_ago: i64) -> Snapshot {
    Snapshot {
        id: id.to_string(),
        volume_id: volume_id.to_string(),
        state,
        progress: match state {
            SnapshotState::Completed => "100%".to_string(),
            _ => "30%".to_string(),
        },
        started_at: Utc::now() - Duration::hours(hours_ago),
    }
}

impl RecordingProvider {
    pub fn new(instances: Vec<Instance>) -> Self {
        let states = instances
            .iter()
            .map(|i| (i.id.clone(), i.state))
            .collect::<HashMap<_, _>>();
        Self {
            inner: Arc::new(Mutex::new(Inner {
                states,
                ..Default::default()
            })),
            instances,
            ..Default::default()
        }
    }

    pub fn with_volume(mut self, instance_id: &str, volume_id: &str) -> Self {
        self.volumes
            .entry(instance_id.to_string())
            .or_default()
            .push(Volume {
                id: volume_id.to_string(),
                instance_id: instance_id.to_string(),
                state: VolumeState::InUse,
                size_gib: 8,
                encrypted: false,
            });
        self
    }

    pub async fn seed_snapshots(&self, volume_id: &str, history: Vec<Snapshot>) {
        self.inner
            .lock()
            .await
            .snapshots
            .insert(volume_id.to_string(), history);
    }

    pub fn fail_stop_of(mut self, id: &str) -> Self {
        self.fail_stop.insert(id.to_string());
        self
    }

    pub fn fail_start_of(mut self, id: &str) -> Self {
        self.fail_start.insert(id.to_string());
        self
    }

    pub async fn calls(&self) -> Vec<ProviderCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Index of the first occurrence of `call` in the journal.
    pub async fn index_of(&self, call: &ProviderCall) -> Option<usize> {
        self.inner.lock().await.calls.iter().position(|c| c == call)
    }
}

#[async_trait]
impl CloudProvider for RecordingProvider {
    async fn list_instances(&self, filter: &TagFilter) -> Result<Vec<Instance>> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(ProviderCall::ListInstances);
        Ok(self
            .instances
            .iter()
            .filter(|i| filter.matches(&i.tags))
            .cloned()
            .collect())
    }

    async fn describe_instance(&self, id: &str) -> Result<Instance> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(ProviderCall::Describe(id.to_string()));
        let state = *inner
            .states
            .get(id)
            .ok_or_else(|| FleetError::NotFound(format!("instance {id}")))?;
        let mut record = self
            .instances
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| FleetError::NotFound(format!("instance {id}")))?;
        record.state = state;
        Ok(record)
    }

    async fn list_volumes(&self, instance_id: &str) -> Result<Vec<Volume>> {
        let mut inner = self.inner.lock().await;
        inner
            .calls
            .push(ProviderCall::ListVolumes(instance_id.to_string()));
        Ok(self.volumes.get(instance_id).cloned().unwrap_or_default())
    }

    async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>> {
        let mut inner = self.inner.lock().await;
        inner
            .calls
            .push(ProviderCall::ListSnapshots(volume_id.to_string()));
        Ok(inner.snapshots.get(volume_id).cloned().unwrap_or_default())
    }

    async fn stop_instance(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(ProviderCall::Stop(id.to_string()));
        if self.fail_stop.contains(id) {
            return Err(FleetError::Provider(format!(
                "stop request rejected for {id}"
            )));
        }
        inner
            .states
            .insert(id.to_string(), InstanceState::Stopped);
        Ok(())
    }

    async fn start_instance(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(ProviderCall::Start(id.to_string()));
        if self.fail_start.contains(id) {
            return Err(FleetError::Provider(format!(
                "start request rejected for {id}"
            )));
        }
        inner
            .states
            .insert(id.to_string(), InstanceState::Running);
        Ok(())
    }

    async fn create_snapshot(&self, volume_id: &str, _description: &str) -> Result<Snapshot> {
        let mut inner = self.inner.lock().await;
        inner
            .calls
            .push(ProviderCall::CreateSnapshot(volume_id.to_string()));
        let created = snapshot(
            &format!("snap-new-{volume_id}"),
            volume_id,
            SnapshotState::Pending,
            0,
        );
        inner
            .snapshots
            .entry(volume_id.to_string())
            .or_default()
            .insert(0, created.clone());
        Ok(created)
    }
}
