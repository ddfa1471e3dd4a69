use dockhand_cloud::FleetError;
use dockhand_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(
        "Cannot sync from {src} to {dst}\n\nHint:\n  • Supported: master → <machine>, <machine> → local"
    )]
    UnsupportedDirection { src: String, dst: String },

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Volume '{0}' is not mounted by any service")]
    VolumeNotFound(String),

    #[error("Database '{0}' is not used by any service")]
    DatabaseNotFound(String),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
