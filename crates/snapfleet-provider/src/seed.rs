//! YAML fleet seeds.
//!
//! A seed describes the initial contents of a [`MemoryProvider`]: a
//! list of instances, each with nested volumes, each volume with its
//! snapshot history. Snapshot order in the file is irrelevant; loading
//! sorts every history most-recent-first, which is the ordering the
//! provider contract promises.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use snapfleet_common::{
    FleetError, Instance, InstanceState, Result, Snapshot, SnapshotState, Volume, VolumeState,
};

use crate::MemoryProvider;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FleetSeed {
    #[serde(default)]
    pub instances: Vec<SeedInstance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedInstance {
    pub id: String,
    #[serde(default = "default_instance_type")]
    pub instance_type: String,
    #[serde(default = "default_availability_zone")]
    pub availability_zone: String,
    #[serde(default = "default_instance_state")]
    pub state: InstanceState,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub volumes: Vec<SeedVolume>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedVolume {
    pub id: String,
    #[serde(default = "default_volume_state")]
    pub state: VolumeState,
    #[serde(default = "default_volume_size")]
    pub size_gib: u32,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub snapshots: Vec<SeedSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedSnapshot {
    pub id: String,
    pub state: SnapshotState,
    #[serde(default)]
    pub progress: Option<String>,
    pub started_at: DateTime<Utc>,
}

fn default_instance_type() -> String {
    "t3.micro".to_string()
}

fn default_availability_zone() -> String {
    "local-1a".to_string()
}

fn default_instance_state() -> InstanceState {
    InstanceState::Running
}

fn default_volume_state() -> VolumeState {
    VolumeState::InUse
}

fn default_volume_size() -> u32 {
    8
}

impl FleetSeed {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let seed: FleetSeed =
            serde_yaml::from_str(yaml).map_err(|e| FleetError::Seed(e.to_string()))?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            FleetError::Config(format!("cannot read fleet seed {}: {e}", path.display()))
        })?;
        Self::from_yaml(&yaml)
    }

    /// Ids must be unique across the whole seed: one instance per id,
    /// one owning instance per volume.
    fn validate(&self) -> Result<()> {
        let mut instance_ids = HashSet::new();
        let mut volume_ids = HashSet::new();
        let mut snapshot_ids = HashSet::new();

        for instance in &self.instances {
            if !instance_ids.insert(instance.id.as_str()) {
                return Err(FleetError::Seed(format!(
                    "duplicate instance id {}",
                    instance.id
                )));
            }
            for volume in &instance.volumes {
                if !volume_ids.insert(volume.id.as_str()) {
                    return Err(FleetError::Seed(format!(
                        "duplicate volume id {}",
                        volume.id
                    )));
                }
                for snapshot in &volume.snapshots {
                    if !snapshot_ids.insert(snapshot.id.as_str()) {
                        return Err(FleetError::Seed(format!(
                            "duplicate snapshot id {}",
                            snapshot.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn into_records(self) -> (Vec<Instance>, Vec<Volume>, HashMap<String, Vec<Snapshot>>) {
        let mut instances = Vec::new();
        let mut volumes = Vec::new();
        let mut snapshots: HashMap<String, Vec<Snapshot>> = HashMap::new();

        for seed_instance in self.instances {
            for seed_volume in &seed_instance.volumes {
                let mut history: Vec<Snapshot> = seed_volume
                    .snapshots
                    .iter()
                    .map(|s| Snapshot {
                        id: s.id.clone(),
                        volume_id: seed_volume.id.clone(),
                        state: s.state,
                        progress: s.progress.clone().unwrap_or_else(|| {
                            match s.state {
                                SnapshotState::Completed => "100%".to_string(),
                                _ => "0%".to_string(),
                            }
                        }),
                        started_at: s.started_at,
                    })
                    .collect();
                // Provider contract: most recent first.
                history.sort_by(|a, b| b.started_at.cmp(&a.started_at));
                snapshots.insert(seed_volume.id.clone(), history);

                volumes.push(Volume {
                    id: seed_volume.id.clone(),
                    instance_id: seed_instance.id.clone(),
                    state: seed_volume.state,
                    size_gib: seed_volume.size_gib,
                    encrypted: seed_volume.encrypted,
                });
            }

            instances.push(Instance {
                id: seed_instance.id,
                instance_type: seed_instance.instance_type,
                availability_zone: seed_instance.availability_zone,
                state: seed_instance.state,
                tags: seed_instance.tags,
                public_ip: seed_instance.public_ip,
                private_ip: seed_instance.private_ip,
            });
        }

        (instances, volumes, snapshots)
    }

    pub fn into_provider(self) -> MemoryProvider {
        MemoryProvider::from_seed(self)
    }
}
