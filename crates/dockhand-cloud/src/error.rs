//! Fleet management error types

use dockhand_config::ConfigError;
use dockhand_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Invalid machine name '{0}': 3-20 characters, lowercase letters, digits and hyphens")]
    InvalidMachineName(String),

    #[error("Machine not found: {0}")]
    MachineNotFound(String),

    #[error("Machine {0} already exists")]
    MachineAlreadyExists(String),

    #[error("Machine {0} has no address (is it running?)")]
    MachineUnreachable(String),

    #[error("Unknown provider: {0} (expected digitalocean or scaleway)")]
    UnknownProvider(String),

    #[error("{provider} requires '{setting}' to be configured")]
    MissingCredential {
        provider: &'static str,
        setting: &'static str,
    },

    #[error("Failed to read public key {path}: {source}")]
    PublicKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, FleetError>;
