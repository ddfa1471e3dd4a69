//! dockhand core
//!
//! The pieces every other dockhand crate builds on:
//!
//! - [`executor`]: the single egress point for external commands (ssh to the
//!   master or a worker, local shell, argv tools)
//! - [`topology`]: read-only queries over the docker-compose file
//! - [`shell`]: quoting for remote shell command strings

pub mod error;
pub mod executor;
pub mod shell;
pub mod topology;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{CoreError, Result};
pub use executor::{
    CommandOutput, CommandRunner, CommandSpec, ExecOptions, Executor, ProcessRunner, Target,
};
pub use shell::shell_escape;
pub use topology::{ComposeFile, Service, TopologyReader, VolumeEntry};
