//! Fleet registry
//!
//! Session-scoped cache of the machines docker-machine knows about. The first
//! successful listing is kept until [`FleetRegistry::refresh`] is called; the
//! lifecycle manager refreshes after every create and destroy.

use crate::docker_machine::DockerMachine;
use crate::error::{FleetError, Result};
use crate::machine::Machine;
use crate::provider::Provider;
use dockhand_config::Settings;
use dockhand_core::{Executor, Target};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::instrument;

pub type Machines = BTreeMap<String, Machine>;

pub struct FleetRegistry {
    docker_machine: DockerMachine,
    cache: Mutex<Option<Machines>>,
}

impl FleetRegistry {
    pub fn new(executor: Executor) -> Self {
        Self {
            docker_machine: DockerMachine::new(executor),
            cache: Mutex::new(None),
        }
    }

    fn cached(&self) -> Option<Machines> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// All machines ordered by name; queries docker-machine only on a cold
    /// cache
    #[instrument(skip(self))]
    pub async fn list_machines(&self) -> Result<Machines> {
        if let Some(machines) = self.cached() {
            return Ok(machines);
        }

        let machines = self.docker_machine.ls().await?;
        tracing::debug!("Discovered {} machines", machines.len());
        *self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(machines.clone());
        Ok(machines)
    }

    /// Forget the cached listing
    pub fn refresh(&self) {
        tracing::debug!("Invalidating machine cache");
        *self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    pub async fn get_machine(&self, name: &str) -> Result<Machine> {
        self.list_machines()
            .await?
            .remove(name)
            .ok_or_else(|| FleetError::MachineNotFound(name.to_string()))
    }

    pub async fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list_machines().await?.contains_key(name))
    }

    pub async fn running_machines(&self) -> Result<Vec<Machine>> {
        Ok(self
            .list_machines()
            .await?
            .into_values()
            .filter(|m| m.running)
            .collect())
    }

    /// Map a logical name to an execution target: `master`, `local`, or a
    /// registered machine with an address
    pub async fn resolve(&self, name: &str) -> Result<Target> {
        match name {
            Target::MASTER => Ok(Target::Master),
            Target::LOCAL => Ok(Target::Local),
            _ => {
                let machine = self.get_machine(name).await?;
                machine
                    .target()
                    .ok_or_else(|| FleetError::MachineUnreachable(name.to_string()))
            }
        }
    }

    /// Providers whose API token is configured
    pub fn list_drivers(settings: &Settings) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| p.is_configured(settings))
            .collect()
    }
}
