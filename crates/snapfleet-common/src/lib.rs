// Re-export dependencies used in public interfaces of common types

use std::collections::HashMap;
use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag key holding the project an instance belongs to.
pub const TAG_PROJECT: &str = "Project";
/// Tag key holding the human-readable instance name.
pub const TAG_NAME: &str = "Name";

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Provider Error: {0}")]
    Provider(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("Invalid Transition: instance {id} is {state}")]
    InvalidTransition { id: String, state: InstanceState },

    #[error("Timed out after {waited:?} waiting for {id} to reach {target}")]
    WaitTimeout {
        id: String,
        target: InstanceState,
        waited: Duration,
    },

    #[error("Fleet Seed Invalid: {0}")]
    Seed(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

// Define the primary Result type for fleet operations
pub type Result<T> = std::result::Result<T, FleetError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    Pending,
    Running,
    Stopping,
    Stopped,
    ShuttingDown,
    Terminated,
}

impl Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InstanceState::Pending => "pending",
            InstanceState::Running => "running",
            InstanceState::Stopping => "stopping",
            InstanceState::Stopped => "stopped",
            InstanceState::ShuttingDown => "shutting-down",
            InstanceState::Terminated => "terminated",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeState {
    Creating,
    Available,
    InUse,
    Deleting,
    Deleted,
    Error,
}

impl Display for VolumeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VolumeState::Creating => "creating",
            VolumeState::Available => "available",
            VolumeState::InUse => "in-use",
            VolumeState::Deleting => "deleting",
            VolumeState::Deleted => "deleted",
            VolumeState::Error => "error",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SnapshotState {
    Pending,
    Completed,
    Error,
}

impl Display for SnapshotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SnapshotState::Pending => "pending",
            SnapshotState::Completed => "completed",
            SnapshotState::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// A compute instance as reported by the provider. Ids are opaque,
/// provider-assigned strings; tags have unique keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub instance_type: String,
    pub availability_zone: String,
    pub state: InstanceState,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
}

impl Instance {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn project(&self) -> Option<&str> {
        self.tag(TAG_PROJECT)
    }

    pub fn name(&self) -> Option<&str> {
        self.tag(TAG_NAME)
    }
}

/// A block-storage volume attached to exactly one instance at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub instance_id: String,
    pub state: VolumeState,
    pub size_gib: u32,
    pub encrypted: bool,
}

/// A point-in-time snapshot of a volume. Collections returned by the
/// provider are ordered most-recent-first by `started_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub volume_id: String,
    pub state: SnapshotState,
    pub progress: String,
    pub started_at: DateTime<Utc>,
}

/// Selection criteria for instances. Both fields absent matches every
/// instance in scope; both present requires both tags to match (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    pub project: Option<String>,
    pub name: Option<String>,
}

impl TagFilter {
    pub fn new(project: Option<String>, name: Option<String>) -> Self {
        Self { project, name }
    }

    pub fn is_empty(&self) -> bool {
        self.project.is_none() && self.name.is_none()
    }

    /// Pure predicate over an instance's tag map. Never touches
    /// provider state.
    pub fn matches(&self, tags: &HashMap<String, String>) -> bool {
        if let Some(project) = &self.project {
            if tags.get(TAG_PROJECT) != Some(project) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if tags.get(TAG_NAME) != Some(name) {
                return false;
            }
        }
        true
    }
}

impl Display for TagFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.project, &self.name) {
            (Some(p), Some(n)) => write!(f, "Project={p},Name={n}"),
            (Some(p), None) => write!(f, "Project={p}"),
            (None, Some(n)) => write!(f, "Name={n}"),
            (None, None) => write!(f, "<all>"),
        }
    }
}

/// The capability set the engine needs from a cloud backend.
///
/// Queries are read-only and never mutate provider state. Stop, start,
/// and create-snapshot are request-only: they return once the provider
/// has accepted the request, not once the transition finishes. Callers
/// that need to observe a transition poll `describe_instance`.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Instances whose tags satisfy the filter, in provider order.
    async fn list_instances(&self, filter: &TagFilter) -> Result<Vec<Instance>>;

    /// Point-in-time record for a single instance.
    async fn describe_instance(&self, id: &str) -> Result<Instance>;

    /// Volumes attached to an instance, in provider order.
    async fn list_volumes(&self, instance_id: &str) -> Result<Vec<Volume>>;

    /// Snapshot history of a volume, most recent first.
    async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>>;

    /// Request a stop. Rejected with `InvalidTransition` unless the
    /// instance is running.
    async fn stop_instance(&self, id: &str) -> Result<()>;

    /// Request a start. Rejected with `InvalidTransition` unless the
    /// instance is stopped.
    async fn start_instance(&self, id: &str) -> Result<()>;

    /// Request a new snapshot of a volume. The returned record is
    /// `pending`; completion happens provider-side.
    async fn create_snapshot(&self, volume_id: &str, description: &str) -> Result<Snapshot>;
}
