//! Selection + lifecycle orchestration engine.
//!
//! [`Selector`] resolves a tag filter into the concrete set of target
//! instances; [`Orchestrator`] drives the stop → snapshot → start
//! sequence over that set; [`Reporter`] is the read-only listing
//! surface. All three hold an injected [`CloudProvider`] and keep no
//! state between calls.

use thiserror::Error;

use snapfleet_common::FleetError;

pub use snapfleet_common as common;

mod lifecycle;
mod listing;
mod selector;
mod snapshots;
mod wait;

pub use lifecycle::{
    InstanceSnapshotOutcome, Orchestrator, SnapshotRun, TransitionFailure, SNAPSHOT_DESCRIPTION,
};
pub use listing::{Reporter, SnapshotRow};
pub use selector::Selector;
pub use snapshots::{has_pending_snapshot, snapshot_history};
pub use wait::{wait_for_instance_state, WaitConfig};

// --- Custom Error Type ---
#[derive(Error, Debug)]
pub enum Error {
    #[error("Provider Error")]
    Provider {
        #[from]
        source: FleetError,
    },
}

impl Error {
    /// True when the underlying failure is the typed wait-timeout kind.
    pub fn is_wait_timeout(&self) -> bool {
        matches!(
            self,
            Error::Provider {
                source: FleetError::WaitTimeout { .. }
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
