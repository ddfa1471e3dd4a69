//! Container deployment for dockhand
//!
//! Recreates docker-compose services on a worker machine. Requires
//! `docker-compose` on the operator host.

pub mod error;
pub mod launcher;

pub use error::{ContainerError, Result};
pub use launcher::{DOCKER_COMPOSE, Launcher, compose_commands, docker_env};
