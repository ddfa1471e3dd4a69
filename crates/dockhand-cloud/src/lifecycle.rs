//! Machine lifecycle: create, destroy and register machines

use crate::docker_machine::{CreateMachineConfig, DockerMachine};
use crate::error::{FleetError, Result};
use crate::registry::FleetRegistry;
use dockhand_core::Executor;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{info, instrument, warn};

static MACHINE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9-]{3,20}$").expect("Invalid machine name regex")
});

/// 3-20 characters of lowercase letters, digits and hyphens
pub fn validate_machine_name(name: &str) -> Result<()> {
    if MACHINE_NAME.is_match(name) {
        Ok(())
    } else {
        Err(FleetError::InvalidMachineName(name.to_string()))
    }
}

pub struct MachineManager {
    docker_machine: DockerMachine,
    registry: Arc<FleetRegistry>,
}

impl MachineManager {
    pub fn new(executor: Executor, registry: Arc<FleetRegistry>) -> Self {
        Self {
            docker_machine: DockerMachine::new(executor),
            registry,
        }
    }

    async fn ensure_new_name(&self, name: &str) -> Result<()> {
        validate_machine_name(name)?;
        if self.registry.contains(name).await? {
            return Err(FleetError::MachineAlreadyExists(name.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, config), fields(name = %config.name, provider = %config.provider))]
    pub async fn create(&self, config: &CreateMachineConfig) -> Result<()> {
        self.ensure_new_name(&config.name).await?;

        info!("Creating machine");
        let result = self.docker_machine.create(config).await;
        // a failed create may still leave a half-registered machine behind
        self.registry.refresh();
        result
    }

    #[instrument(skip(self))]
    pub async fn destroy(&self, name: &str) -> Result<()> {
        info!("Destroying machine");
        let result = self.docker_machine.rm(name).await;
        self.registry.refresh();
        result
    }

    /// Register a machine that was created outside docker-machine
    ///
    /// Only the name checks run; registration itself is not supported yet.
    #[instrument(skip(self))]
    pub async fn provision(&self, name: &str) -> Result<()> {
        self.ensure_new_name(name).await?;
        warn!("Provisioning existing machines is not supported; nothing was registered");
        Ok(())
    }
}
