use dockhand_config::ConfigError;
use dockhand_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Build failed for {image}: {command}")]
    BuildFailed {
        image: String,
        command: String,
        output: String,
    },

    #[error("Build of {image} exited cleanly but never reported success: {command}")]
    MissingSuccessMarker {
        image: String,
        command: String,
        output: String,
    },

    #[error("Invalid image name: {0}")]
    InvalidImageName(String),

    #[error(transparent)]
    Command(#[from] CoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BuildError {
    /// Message for the operator, with the captured build log tail
    pub fn user_message(&self) -> String {
        match self {
            BuildError::BuildFailed { output, .. }
            | BuildError::MissingSuccessMarker { output, .. } => {
                let tail: Vec<&str> = output.lines().rev().take(10).collect();
                let tail: Vec<&str> = tail.into_iter().rev().collect();
                format!("{}\n\n{}", self, tail.join("\n"))
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
