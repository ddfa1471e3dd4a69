//! Recreate compose services on a worker machine
//!
//! docker-compose runs on the operator host and talks to the machine's
//! Docker daemon over TLS, using the certificates docker-machine stored for
//! it.

use crate::error::{ContainerError, Result};
use dockhand_cloud::{FleetRegistry, Machine};
use dockhand_config::Settings;
use dockhand_core::{CommandSpec, Executor, TopologyReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

pub const DOCKER_COMPOSE: &str = "docker-compose";

pub struct Launcher {
    executor: Executor,
    registry: Arc<FleetRegistry>,
    topology: TopologyReader,
}

impl Launcher {
    pub fn new(executor: Executor, registry: Arc<FleetRegistry>, topology: TopologyReader) -> Self {
        Self {
            executor,
            registry,
            topology,
        }
    }

    /// Pull and recreate one service, or the whole stack when `service` is
    /// `None`. Stops at the first failing command.
    #[instrument(skip(self))]
    pub async fn launch(&self, machine: &str, service: Option<&str>) -> Result<()> {
        if let Some(service) = service
            && !self.topology.list_services()?.iter().any(|s| s == service)
        {
            return Err(ContainerError::ServiceNotFound {
                service: service.to_string(),
                compose_file: self.topology.path().display().to_string(),
            });
        }

        let machine = self.registry.get_machine(machine).await?;
        let env = docker_env(&machine, self.executor.settings())?;

        for args in compose_commands(service) {
            let mut spec = CommandSpec::new(DOCKER_COMPOSE)
                .arg("-f")
                .arg(self.topology.path().display().to_string())
                .args(args);
            for (key, value) in &env {
                spec = spec.env(key, value);
            }
            self.executor.run(spec).await?;
        }

        info!(
            "Launched {} on {}",
            service.unwrap_or("all services"),
            machine.name
        );
        Ok(())
    }
}

/// Environment pointing docker-compose at the machine's daemon
pub fn docker_env(machine: &Machine, settings: &Settings) -> Result<Vec<(String, String)>> {
    let url = machine
        .url
        .as_deref()
        .filter(|_| machine.running)
        .ok_or_else(|| ContainerError::MachineNotRunning {
            machine: machine.name.clone(),
        })?;
    let cert_path = settings.machine_dir(&machine.name);

    Ok(vec![
        ("DOCKER_HOST".to_string(), url.to_string()),
        ("DOCKER_MACHINE_NAME".to_string(), machine.name.clone()),
        ("DOCKER_TLS_VERIFY".to_string(), "1".to_string()),
        ("DOCKER_CERT_PATH".to_string(), path_string(&cert_path)),
    ])
}

/// docker-compose subcommands, after `-f <file>`
pub fn compose_commands(service: Option<&str>) -> Vec<Vec<String>> {
    let to_args = |args: &[&str]| args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
    match service {
        Some(service) => vec![
            to_args(&["pull", service]),
            to_args(&["kill", service]),
            to_args(&["rm", "-f", service]),
            to_args(&["up", "--remove-orphans", "-d"]),
        ],
        None => vec![
            to_args(&["pull"]),
            to_args(&["down"]),
            to_args(&["up", "--remove-orphans", "-d"]),
        ],
    }
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}
