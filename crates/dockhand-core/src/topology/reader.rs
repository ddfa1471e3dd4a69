use super::model::{ComposeFile, strip_registry};
use crate::error::{CoreError, Result};
use dockhand_config::Settings;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Reads the compose file on every query, so edits show up without a restart
#[derive(Debug, Clone)]
pub struct TopologyReader {
    path: PathBuf,
    registry_address: String,
    database_engine: String,
    excluded_volumes: Vec<String>,
}

impl TopologyReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            registry_address: String::new(),
            database_engine: "mysql".to_string(),
            excluded_volumes: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.compose_file)
            .with_registry(&settings.registry_address)
            .with_database_engine(&settings.database_engine)
            .with_excluded_volumes(settings.non_backed_up_volumes.clone())
    }

    pub fn with_registry(mut self, registry_address: impl Into<String>) -> Self {
        self.registry_address = registry_address.into();
        self
    }

    pub fn with_database_engine(mut self, engine: impl Into<String>) -> Self {
        self.database_engine = engine.into();
        self
    }

    pub fn with_excluded_volumes(mut self, excluded: Vec<String>) -> Self {
        self.excluded_volumes = excluded;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the compose file
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<ComposeFile> {
        if !self.path.exists() {
            return Err(CoreError::TopologyNotFound(self.path.clone()));
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::TopologyParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Service names, sorted
    pub fn list_services(&self) -> Result<Vec<String>> {
        Ok(self.load()?.services.into_keys().collect())
    }

    /// Images built from local sources and pushed to the private registry
    pub fn list_image_backed_services(&self) -> Result<BTreeSet<String>> {
        let compose = self.load()?;
        Ok(compose
            .services()
            .filter_map(|(_, svc)| {
                svc.image
                    .as_deref()
                    .and_then(|image| strip_registry(image, &self.registry_address))
                    .map(str::to_string)
            })
            .collect())
    }

    /// Persisted volume names; the non-backed-up ones only when
    /// `include_excluded` is set
    pub fn list_volume_names(&self, include_excluded: bool) -> Result<BTreeSet<String>> {
        let compose = self.load()?;
        let mut volumes = BTreeSet::new();
        for (_, svc) in compose.services() {
            for entry in &svc.volumes {
                if let Some(name) = entry.volume_name()
                    && (include_excluded || !self.excluded_volumes.iter().any(|v| v == name))
                {
                    volumes.insert(name.to_string());
                }
            }
        }
        Ok(volumes)
    }

    /// Services linking the database engine; each owns a database of the
    /// same name
    pub fn list_database_backed_services(&self) -> Result<BTreeSet<String>> {
        let compose = self.load()?;
        Ok(compose
            .services()
            .filter(|(_, svc)| svc.links_to(&self.database_engine))
            .map(|(name, _)| name.to_string())
            .collect())
    }
}
