//! In-memory cloud backend for snapfleet.
//!
//! `MemoryProvider` keeps a whole fleet — instances, their volumes, and
//! each volume's snapshot history — behind a single lock and implements
//! the `CloudProvider` contract against it. Fleets are seeded from YAML
//! (see [`seed`]), which makes the provider usable both as the CLI's
//! local profile and as a deterministic backend for integration tests.

pub use snapfleet_common as common;

mod memory;
pub mod seed;

pub use memory::MemoryProvider;
pub use seed::FleetSeed;
