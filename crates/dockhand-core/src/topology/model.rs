//! docker-compose model
//!
//! Only the parts dockhand reads: image, volumes and links.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Host-side prefix under which persisted volumes live
pub const VOLUME_PREFIX: &str = "/volumes/";

/// Root of a docker-compose.yml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeFile {
    #[serde(default)]
    pub services: BTreeMap<String, Option<Service>>,
}

impl ComposeFile {
    /// Services with their definitions; bare `name:` entries count as empty
    pub fn services(&self) -> impl Iterator<Item = (&str, Service)> + '_ {
        self.services
            .iter()
            .map(|(name, svc)| (name.as_str(), svc.clone().unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Service {
    pub image: Option<String>,
    #[serde(default)]
    pub volumes: Vec<VolumeEntry>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl Service {
    /// Whether this service links `target` (`target` or `target:alias`)
    pub fn links_to(&self, target: &str) -> bool {
        self.links
            .iter()
            .any(|link| link.split(':').next() == Some(target))
    }
}

/// A volume declaration in short (`host:container[:mode]`) or long syntax
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VolumeEntry {
    Short(String),
    Long {
        #[serde(default)]
        source: Option<String>,
        #[serde(default)]
        target: Option<String>,
    },
}

impl VolumeEntry {
    /// Host path or named volume
    pub fn source(&self) -> Option<&str> {
        match self {
            VolumeEntry::Short(decl) => decl.split(':').next(),
            VolumeEntry::Long { source, .. } => source.as_deref(),
        }
    }

    /// Persisted volume name: the first path segment after `/volumes/`
    pub fn volume_name(&self) -> Option<&str> {
        self.source().and_then(volume_name)
    }
}

/// `/volumes/assets/app` -> `assets`
pub fn volume_name(host_path: &str) -> Option<&str> {
    host_path
        .strip_prefix(VOLUME_PREFIX)?
        .split('/')
        .next()
        .filter(|name| !name.is_empty())
}

/// Image reference without the `<registry>/` prefix, if it is a private
/// image; a tag (`api:1.2`) is kept
pub fn strip_registry<'a>(image: &'a str, registry: &str) -> Option<&'a str> {
    if registry.is_empty() {
        return None;
    }
    image
        .strip_prefix(registry)?
        .strip_prefix('/')
        .filter(|name| !name.is_empty() && !name.starts_with(':'))
}
