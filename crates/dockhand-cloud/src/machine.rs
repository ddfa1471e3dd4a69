//! Machines known to docker-machine

use dockhand_core::Target;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Machine {
    pub name: String,
    pub driver: String,
    /// docker-machine's current default machine
    pub active: bool,
    pub running: bool,
    /// Docker API endpoint, `tcp://<ip>:2376`
    pub url: Option<String>,
    pub ip: Option<String>,
}

impl Machine {
    /// ssh target for this machine, if it has an address
    pub fn target(&self) -> Option<Target> {
        self.ip.as_ref().map(|ip| Target::Machine {
            name: self.name.clone(),
            ip: ip.clone(),
        })
    }
}

/// Host part of `scheme://host:port`
pub fn host_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let host = rest.split([':', '/']).next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}
