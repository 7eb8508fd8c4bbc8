use std::time::{Duration, Instant};

use tracing::{debug, warn};

use snapfleet_common::{CloudProvider, FleetError, Instance, InstanceState};

/// Polling parameters for wait-until-state.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// First poll delay; doubles each round.
    pub poll_interval: Duration,
    /// Backoff cap.
    pub max_interval: Duration,
    /// Total budget before the wait fails with `WaitTimeout`.
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Poll `describe_instance` until the instance reaches `target`.
///
/// Returns the final record on success. Expiry of the budget surfaces
/// the typed `FleetError::WaitTimeout`; an instance observed
/// `terminated` while waiting for any other state fails immediately,
/// since that transition can never arrive.
pub async fn wait_for_instance_state(
    provider: &dyn CloudProvider,
    id: &str,
    target: InstanceState,
    config: &WaitConfig,
) -> Result<Instance, FleetError> {
    let started = Instant::now();
    let mut interval = config.poll_interval;

    loop {
        let instance = provider.describe_instance(id).await?;
        if instance.state == target {
            debug!(%id, %target, waited = ?started.elapsed(), "Reached target state");
            return Ok(instance);
        }
        if instance.state == InstanceState::Terminated && target != InstanceState::Terminated {
            return Err(FleetError::Provider(format!(
                "instance {id} terminated while waiting for {target}"
            )));
        }

        let waited = started.elapsed();
        if waited >= config.timeout {
            warn!(%id, %target, ?waited, "Gave up waiting");
            return Err(FleetError::WaitTimeout {
                id: id.to_string(),
                target,
                waited,
            });
        }

        tokio::time::sleep(interval).await;
        interval = (interval * 2).min(config.max_interval);
    }
}
