//! Volume synchronization
//!
//! Canonical volume contents live on the master node under
//! `master_volumes_path`. They are mirrored to workers from the master, and
//! pulled from a worker to the operator's host for local development. Both
//! transfers use `rsync --delete`, so the destination ends up identical to
//! the source.

use crate::error::{Result, SyncError};
use crate::machine_ip;
use dockhand_cloud::FleetRegistry;
use dockhand_core::{ExecOptions, Executor, Target, TopologyReader, shell_escape};
use std::sync::Arc;
use tracing::{info, instrument};

/// Supported transfer directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Direction {
    /// master → worker, run on the master
    MasterToMachine { machine: String },
    /// worker → operator host, run locally
    MachineToLocal { machine: String },
}

impl Direction {
    pub fn classify(src: &str, dst: &str) -> Result<Self> {
        let is_machine = |name: &str| name != Target::MASTER && name != Target::LOCAL;
        match (src, dst) {
            (Target::MASTER, machine) if is_machine(machine) => Ok(Direction::MasterToMachine {
                machine: machine.to_string(),
            }),
            (machine, Target::LOCAL) if is_machine(machine) => Ok(Direction::MachineToLocal {
                machine: machine.to_string(),
            }),
            _ => Err(SyncError::UnsupportedDirection {
                src: src.to_string(),
                dst: dst.to_string(),
            }),
        }
    }
}

pub struct VolumeSync {
    executor: Executor,
    registry: Arc<FleetRegistry>,
    topology: TopologyReader,
}

impl VolumeSync {
    pub fn new(executor: Executor, registry: Arc<FleetRegistry>, topology: TopologyReader) -> Self {
        Self {
            executor,
            registry,
            topology,
        }
    }

    /// Mirror one volume from `src` to `dst`
    ///
    /// Volumes listed in `non_backed_up_volumes` only travel to the
    /// operator's host; a worker never receives them.
    #[instrument(skip(self))]
    pub async fn sync(&self, volume: &str, src: &str, dst: &str) -> Result<()> {
        let direction = Direction::classify(src, dst)?;
        let include_excluded = matches!(direction, Direction::MachineToLocal { .. });
        if !self.topology.list_volume_names(include_excluded)?.contains(volume) {
            return Err(SyncError::VolumeNotFound(volume.to_string()));
        }

        let settings = self.executor.settings();
        let user = &settings.ssh_user;
        match direction {
            Direction::MasterToMachine { machine } => {
                let ip = machine_ip(&self.registry, &machine).await?;
                let source = format!("{}/{}/", settings.master_volumes_path.trim_end_matches('/'), volume);
                let command = format!(
                    "rsync -avz --delete {} {}@{}:/volumes/{}/",
                    shell_escape(&source),
                    user,
                    ip,
                    shell_escape(volume)
                );
                self.executor
                    .execute(&Target::Master, &command, ExecOptions::default())
                    .await?;
            }
            Direction::MachineToLocal { machine } => {
                let ip = machine_ip(&self.registry, &machine).await?;
                let local_dir = settings.local_volumes_path.join(volume);
                let local_dir = shell_escape(&local_dir.display().to_string());
                self.executor
                    .execute(&Target::Local, &format!("mkdir -p {}", local_dir), ExecOptions::default())
                    .await?;
                let command = format!(
                    "rsync -avz --delete {}@{}:/volumes/{}/ {}/",
                    user,
                    ip,
                    shell_escape(volume),
                    local_dir
                );
                self.executor
                    .execute(&Target::Local, &command, ExecOptions::default())
                    .await?;
            }
        }

        info!("Synchronized volume {} from {} to {}", volume, src, dst);
        Ok(())
    }

    /// Mirror several volumes in order, stopping at the first failure
    pub async fn sync_all<F>(&self, volumes: &[String], src: &str, dst: &str, mut on_volume: F) -> Result<()>
    where
        F: FnMut(&str),
    {
        Direction::classify(src, dst)?;
        for volume in volumes {
            on_volume(volume);
            self.sync(volume, src, dst).await?;
        }
        Ok(())
    }
}
