mod instances;
mod snapshots;
mod volumes;

pub use instances::{handle_instance_command, InstanceCommands};
pub use snapshots::{handle_snapshot_command, SnapshotCommands};
pub use volumes::{handle_volume_command, VolumeCommands};
