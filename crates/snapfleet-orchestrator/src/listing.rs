use std::sync::Arc;

use tracing::instrument;

use snapfleet_common::{CloudProvider, Instance, Snapshot, TagFilter, Volume};

use crate::selector::Selector;
use crate::snapshots::snapshot_history;
use crate::Result;

/// A snapshot joined with its owning instance for display.
#[derive(Debug, Clone)]
pub struct SnapshotRow {
    pub snapshot: Snapshot,
    pub instance_id: String,
}

/// Read-only enumeration over the selector's result set.
#[derive(Clone)]
pub struct Reporter {
    provider: Arc<dyn CloudProvider>,
    selector: Selector,
}

impl Reporter {
    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self {
            selector: Selector::new(provider.clone()),
            provider,
        }
    }

    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn list_instances(&self, filter: &TagFilter) -> Result<Vec<Instance>> {
        self.selector.select(filter).await
    }

    /// Volumes of every selected instance, in provider order.
    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn list_volumes(&self, filter: &TagFilter) -> Result<Vec<Volume>> {
        let mut volumes = Vec::new();
        for instance in self.selector.select(filter).await? {
            volumes.extend(self.provider.list_volumes(&instance.id).await?);
        }
        Ok(volumes)
    }

    /// Snapshot rows for every volume of every selected instance.
    ///
    /// Per volume the default view truncates after the first
    /// `completed` snapshot (the latest completed one plus anything
    /// newer still pending); `all` emits full histories.
    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn list_snapshots(&self, filter: &TagFilter, all: bool) -> Result<Vec<SnapshotRow>> {
        let mut rows = Vec::new();
        for instance in self.selector.select(filter).await? {
            for volume in self.provider.list_volumes(&instance.id).await? {
                let history = self.provider.list_snapshots(&volume.id).await?;
                rows.extend(snapshot_history(&history, all).map(|snapshot| SnapshotRow {
                    snapshot: snapshot.clone(),
                    instance_id: instance.id.clone(),
                }));
            }
        }
        Ok(rows)
    }
}
