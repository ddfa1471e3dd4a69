//! Shared state for every command: settings, executor, machine registry and
//! the compose topology

use dockhand_cloud::{Bootstrapper, FleetRegistry, MachineManager};
use dockhand_config::Settings;
use dockhand_container::Launcher;
use dockhand_core::{CommandRunner, Executor, ProcessRunner, TopologyReader};
use dockhand_sync::{DatabaseSync, VolumeSync};
use std::sync::Arc;

pub struct Console {
    pub executor: Executor,
    pub registry: Arc<FleetRegistry>,
    pub topology: TopologyReader,
}

impl Console {
    pub fn load() -> anyhow::Result<Self> {
        let settings = Settings::load()?;
        tracing::debug!("Compose file: {}", settings.compose_file.display());
        Ok(Self::new(settings, Arc::new(ProcessRunner)))
    }

    pub fn new(settings: Settings, runner: Arc<dyn CommandRunner>) -> Self {
        let topology = TopologyReader::from_settings(&settings);
        let executor = Executor::new(runner, Arc::new(settings));
        let registry = Arc::new(FleetRegistry::new(executor.clone()));
        Self {
            executor,
            registry,
            topology,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.executor.settings()
    }

    pub fn machines(&self) -> MachineManager {
        MachineManager::new(self.executor.clone(), self.registry.clone())
    }

    pub fn bootstrapper(&self) -> Bootstrapper {
        Bootstrapper::new(self.executor.clone(), self.registry.clone())
    }

    pub fn launcher(&self) -> Launcher {
        Launcher::new(self.executor.clone(), self.registry.clone(), self.topology.clone())
    }

    pub fn volume_sync(&self) -> VolumeSync {
        VolumeSync::new(self.executor.clone(), self.registry.clone(), self.topology.clone())
    }

    pub fn database_sync(&self) -> DatabaseSync {
        DatabaseSync::new(self.executor.clone(), self.registry.clone(), self.topology.clone())
    }
}
