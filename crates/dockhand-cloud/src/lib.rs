//! dockhand fleet management
//!
//! Worker machines are created and destroyed through `docker-machine` on one
//! of the supported cloud providers, then bootstrapped over ssh.
//!
//! # Requirements
//!
//! - `docker-machine` must be installed on the operator host
//! - A provider token (`digitalocean_token` or `scaleway_token`) in the settings
//!
//! # Example
//!
//! ```ignore
//! use dockhand_cloud::{Bootstrapper, CreateMachineConfig, FleetRegistry, MachineManager, Provider};
//!
//! let registry = Arc::new(FleetRegistry::new(executor.clone()));
//! let manager = MachineManager::new(executor.clone(), registry.clone());
//!
//! manager
//!     .create(&CreateMachineConfig::new("web-3", Provider::DigitalOcean))
//!     .await?;
//! Bootstrapper::new(executor, registry).run("web-3").await?;
//! ```

pub mod bootstrap;
pub mod docker_machine;
pub mod error;
pub mod lifecycle;
pub mod machine;
pub mod provider;
pub mod registry;
pub mod stats;

pub use bootstrap::{BootstrapReport, BootstrapStep, Bootstrapper, StepOutcome};
pub use docker_machine::{CreateMachineConfig, DockerMachine};
pub use error::{FleetError, Result};
pub use lifecycle::{MachineManager, validate_machine_name};
pub use machine::Machine;
pub use provider::{Choice, DriverDescriptor, Provider};
pub use registry::{FleetRegistry, Machines};
pub use stats::MachineStats;
