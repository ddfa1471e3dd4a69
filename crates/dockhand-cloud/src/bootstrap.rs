//! Machine bootstrap
//!
//! Brings a freshly created machine to a usable state in a fixed order:
//! mutual ssh trust with the operator and the master node, a swap file,
//! unattended upgrades, base packages, registry login and the volume root.
//! Each step checks the machine first and skips itself when there is
//! nothing to do, so re-running a bootstrap is harmless. The sequence stops
//! at the first failing step.

use crate::error::{FleetError, Result};
use crate::registry::FleetRegistry;
use dockhand_config::ConfigError;
use dockhand_core::{ExecOptions, Executor, Target, shell_escape};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const SWAP_SCRIPT: &str = "dd if=/dev/zero of=/swapfile bs=1024 count=4096k \
&& mkswap /swapfile \
&& chmod 600 /swapfile \
&& swapon /swapfile \
&& echo '/swapfile swap swap defaults 0 0' >> /etc/fstab";

const PERIODIC_CONF: &str = "/etc/apt/apt.conf.d/10periodic";

const UNATTENDED_UPGRADES_SCRIPT: &str = "apt-get update \
&& apt-get install -y unattended-upgrades \
&& echo 'APT::Periodic::Unattended-Upgrade \"1\";' >> /etc/apt/apt.conf.d/10periodic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapStep {
    SshKeys,
    Swap,
    AutoUpdates,
    Packages,
    RegistryAuth,
    Volumes,
}

impl BootstrapStep {
    /// Every step, in execution order
    pub const ALL: [BootstrapStep; 6] = [
        BootstrapStep::SshKeys,
        BootstrapStep::Swap,
        BootstrapStep::AutoUpdates,
        BootstrapStep::Packages,
        BootstrapStep::RegistryAuth,
        BootstrapStep::Volumes,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BootstrapStep::SshKeys => "ssh-keys",
            BootstrapStep::Swap => "swap",
            BootstrapStep::AutoUpdates => "auto-updates",
            BootstrapStep::Packages => "packages",
            BootstrapStep::RegistryAuth => "registry-auth",
            BootstrapStep::Volumes => "volumes",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BootstrapStep::SshKeys => "ssh keys",
            BootstrapStep::Swap => "swap",
            BootstrapStep::AutoUpdates => "auto update",
            BootstrapStep::Packages => "apt packages",
            BootstrapStep::RegistryAuth => "docker auth",
            BootstrapStep::Volumes => "volumes",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.id() == id)
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    Skipped { reason: String },
}

impl StepOutcome {
    fn skipped(reason: impl Into<String>) -> Self {
        StepOutcome::Skipped {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub machine: String,
    pub steps: Vec<(BootstrapStep, StepOutcome)>,
}

impl BootstrapReport {
    pub fn applied(&self) -> usize {
        self.steps
            .iter()
            .filter(|(_, outcome)| *outcome == StepOutcome::Applied)
            .count()
    }
}

pub struct Bootstrapper {
    executor: Executor,
    registry: Arc<FleetRegistry>,
}

impl Bootstrapper {
    pub fn new(executor: Executor, registry: Arc<FleetRegistry>) -> Self {
        Self { executor, registry }
    }

    /// Run every step against `machine`
    pub async fn run(&self, machine: &str) -> Result<BootstrapReport> {
        self.run_with_progress(machine, |_| {}).await
    }

    /// Run every step, calling `on_step` before each one starts
    #[instrument(skip(self, on_step))]
    pub async fn run_with_progress<F>(&self, machine: &str, mut on_step: F) -> Result<BootstrapReport>
    where
        F: FnMut(BootstrapStep),
    {
        let (target, ip) = self.resolve(machine).await?;
        let mut report = BootstrapReport {
            machine: machine.to_string(),
            steps: Vec::with_capacity(BootstrapStep::ALL.len()),
        };

        for step in BootstrapStep::ALL {
            on_step(step);
            let outcome = self.apply(&target, &ip, step).await?;
            report.steps.push((step, outcome));
        }

        info!("Bootstrapped {} ({} steps applied)", machine, report.applied());
        Ok(report)
    }

    /// Run a single step against `machine`
    pub async fn run_step(&self, machine: &str, step: BootstrapStep) -> Result<StepOutcome> {
        let (target, ip) = self.resolve(machine).await?;
        self.apply(&target, &ip, step).await
    }

    async fn resolve(&self, machine: &str) -> Result<(Target, String)> {
        match self.registry.resolve(machine).await? {
            Target::Machine { name, ip } => Ok((
                Target::Machine {
                    name,
                    ip: ip.clone(),
                },
                ip,
            )),
            // master and local are never bootstrapped
            _ => Err(FleetError::MachineNotFound(machine.to_string())),
        }
    }

    async fn apply(&self, target: &Target, ip: &str, step: BootstrapStep) -> Result<StepOutcome> {
        debug!(host = %target, "Bootstrap step: {}", step.id());
        let outcome = match step {
            BootstrapStep::SshKeys => self.ssh_keys(target, ip).await?,
            BootstrapStep::Swap => self.swap(target).await?,
            BootstrapStep::AutoUpdates => self.auto_updates(target).await?,
            BootstrapStep::Packages => self.packages(target).await?,
            BootstrapStep::RegistryAuth => self.registry_auth(target).await?,
            BootstrapStep::Volumes => {
                self.executor
                    .execute(target, "mkdir -p /volumes", ExecOptions::default())
                    .await?;
                StepOutcome::Applied
            }
        };
        if let StepOutcome::Skipped { reason } = &outcome {
            debug!(host = %target, "Skipped {}: {}", step.id(), reason);
        }
        Ok(outcome)
    }

    async fn ssh_keys(&self, target: &Target, ip: &str) -> Result<StepOutcome> {
        let settings = self.executor.settings();
        let mut changed = false;

        let operator_trusted = self
            .executor
            .probe(target, "pwd", ExecOptions::silent().with_operator_key())
            .await?;
        if !operator_trusted {
            let path = &settings.operator_public_key_path;
            let key = std::fs::read_to_string(path).map_err(|source| FleetError::PublicKey {
                path: path.clone(),
                source,
            })?;
            self.executor
                .execute(target, &append_line(key.trim(), "~/.ssh/authorized_keys"), ExecOptions::default())
                .await?;
            changed = true;
        }

        let master_check = format!("ssh -o BatchMode=yes {}@{} pwd", settings.ssh_user, ip);
        let master_trusted = self
            .executor
            .probe(&Target::Master, &master_check, ExecOptions::silent())
            .await?;
        if !master_trusted {
            let master_key = settings
                .master_public_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| ConfigError::missing("master_public_key"))?;
            self.executor
                .execute(target, &append_line(master_key.trim(), "~/.ssh/authorized_keys"), ExecOptions::default())
                .await?;

            let host_key = self
                .executor
                .execute(target, "cat /etc/ssh/ssh_host_rsa_key.pub", ExecOptions::default())
                .await?;
            let known_host = format!("{} {}", ip, host_key.trim());
            self.executor
                .execute(&Target::Master, &append_line(&known_host, "~/.ssh/known_hosts"), ExecOptions::default())
                .await?;
            changed = true;
        }

        Ok(if changed {
            StepOutcome::Applied
        } else {
            StepOutcome::skipped("operator and master already trusted")
        })
    }

    async fn swap(&self, target: &Target) -> Result<StepOutcome> {
        let swaps = self
            .executor
            .execute(target, "cat /proc/swaps", ExecOptions::default())
            .await?;
        if swaps.contains("/swapfile") {
            return Ok(StepOutcome::skipped("/swapfile already active"));
        }
        self.executor
            .execute(target, SWAP_SCRIPT, ExecOptions::silent())
            .await?;
        Ok(StepOutcome::Applied)
    }

    async fn auto_updates(&self, target: &Target) -> Result<StepOutcome> {
        let periodic = self
            .executor
            .execute(
                target,
                &format!("cat {} 2>/dev/null || true", PERIODIC_CONF),
                ExecOptions::default(),
            )
            .await?;
        if periodic.contains("Unattended-Upgrade") {
            return Ok(StepOutcome::skipped("unattended upgrades already enabled"));
        }
        self.executor
            .execute(target, UNATTENDED_UPGRADES_SCRIPT, ExecOptions::default())
            .await?;
        Ok(StepOutcome::Applied)
    }

    async fn packages(&self, target: &Target) -> Result<StepOutcome> {
        let packages = &self.executor.settings().base_packages;
        if packages.is_empty() {
            return Ok(StepOutcome::skipped("no base packages configured"));
        }
        let packages: Vec<String> = packages.iter().map(|p| shell_escape(p)).collect();
        let command = format!("apt-get install -y {}", packages.join(" "));
        self.executor
            .execute(target, &command, ExecOptions::silent())
            .await?;
        Ok(StepOutcome::Applied)
    }

    async fn registry_auth(&self, target: &Target) -> Result<StepOutcome> {
        let settings = self.executor.settings();
        let registry = settings.require_registry_address()?;
        let (user, password) = settings.registry_credentials()?;
        let command = format!(
            "docker login -u {} -p {} {}",
            shell_escape(user),
            shell_escape(password),
            shell_escape(registry)
        );
        self.executor
            .execute(target, &command, ExecOptions::silent())
            .await?;
        Ok(StepOutcome::Applied)
    }
}

/// `echo '<line>' >> <file>`
fn append_line(line: &str, file: &str) -> String {
    format!("echo {} >> {}", shell_escape(line), file)
}
