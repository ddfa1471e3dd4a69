use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Command failed (exit code {}): {command}\n{stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "none".into()))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Topology file not found: {0}")]
    TopologyNotFound(PathBuf),

    #[error("Failed to parse topology file {path}: {message}")]
    TopologyParse { path: PathBuf, message: String },

    #[error("Config error: {0}")]
    Config(#[from] dockhand_config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Exit code of a failed external command
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CoreError::CommandFailed { code, .. } => *code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
