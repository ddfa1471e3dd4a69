use dockhand_cloud::FleetError;
use dockhand_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(
        "Service '{service}' is not defined in {compose_file}\n\nHint:\n  • Check the service name against the compose file"
    )]
    ServiceNotFound {
        service: String,
        compose_file: String,
    },

    #[error(
        "Machine '{machine}' is not running\n\nHint:\n  • docker-machine start {machine}\n  • dockhand machines lists the fleet"
    )]
    MachineNotRunning { machine: String },

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Command(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, ContainerError>;
