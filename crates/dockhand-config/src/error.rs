use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Setting '{0}' is not configured (set it in dockhand.yml or DOCKHAND_{1})")]
    Missing(&'static str, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Missing-setting error with the matching env var name filled in
    pub fn missing(field: &'static str) -> Self {
        ConfigError::Missing(field, field.to_uppercase())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
