//! Volume and database synchronization for dockhand
//!
//! Transfers run with rsync over ssh; the master node is the source of
//! truth for both volumes and database dumps.

pub mod database;
pub mod error;
pub mod volume;

pub use database::DatabaseSync;
pub use error::{Result, SyncError};
pub use volume::{Direction, VolumeSync};

use dockhand_cloud::{FleetError, FleetRegistry};
use dockhand_core::Target;

/// Address of a registered worker; `master` and `local` are not workers
pub(crate) async fn machine_ip(registry: &FleetRegistry, name: &str) -> Result<String> {
    match registry.resolve(name).await? {
        Target::Machine { ip, .. } => Ok(ip),
        _ => Err(FleetError::MachineNotFound(name.to_string()).into()),
    }
}
