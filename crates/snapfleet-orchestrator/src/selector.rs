use std::sync::Arc;

use tracing::{debug, instrument};

use snapfleet_common::{CloudProvider, Instance, TagFilter};

use crate::Result;

/// Resolves a tag filter into the concrete set of target instances.
///
/// A pure read-only query against the provider: no retries, no
/// caching, no ordering guarantee beyond whatever the provider
/// returns. Repeated calls re-query the provider every time.
#[derive(Clone)]
pub struct Selector {
    provider: Arc<dyn CloudProvider>,
}

impl Selector {
    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self { provider }
    }

    #[instrument(skip(self), fields(filter = %filter))]
    pub async fn select(&self, filter: &TagFilter) -> Result<Vec<Instance>> {
        let instances = self.provider.list_instances(filter).await?;
        debug!(matched = instances.len(), "Selection resolved");
        Ok(instances)
    }
}
