//! Service topology
//!
//! Read-only view of the docker-compose file: which services exist, which are
//! backed by private-registry images, which mount persisted volumes and which
//! link the database engine.

mod model;
mod reader;

pub use model::*;
pub use reader::*;
