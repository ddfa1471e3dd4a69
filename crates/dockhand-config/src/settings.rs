//! Operator settings
//!
//! Registry address and credentials, provider tokens, master node details and
//! the filesystem roots used for volumes, dumps and image sources.

use crate::error::{ConfigError, Result};
use crate::{expand_home, find_settings_file};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides (`DOCKHAND_REGISTRY_ADDRESS`, ...)
pub const ENV_PREFIX: &str = "DOCKHAND_";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Private registry host, e.g. `registry.example.com`
    pub registry_address: String,
    pub registry_user: Option<String>,
    pub registry_password: Option<String>,

    pub digitalocean_token: Option<String>,
    pub scaleway_token: Option<String>,
    /// Scaleway organization id
    pub scaleway_access_key: Option<String>,

    /// Address of the master node holding canonical volumes and dumps
    pub master_address: String,
    /// Master's public key, authorized on every worker during bootstrap
    pub master_public_key: Option<String>,
    /// Administrative user for every ssh connection
    pub ssh_user: String,
    pub operator_public_key_path: PathBuf,

    /// docker-machine storage root (`<root>/machines/<name>/id_rsa`)
    pub machine_storage_path: PathBuf,

    pub master_volumes_path: String,
    pub master_database_path: String,
    pub local_volumes_path: PathBuf,
    pub local_repos_path: PathBuf,

    pub compose_file: PathBuf,
    /// Volumes that are only copied to a developer machine, never to workers
    pub non_backed_up_volumes: Vec<String>,
    /// Compose service (and container) running the database engine
    pub database_engine: String,
    pub base_packages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry_address: String::new(),
            registry_user: None,
            registry_password: None,
            digitalocean_token: None,
            scaleway_token: None,
            scaleway_access_key: None,
            master_address: String::new(),
            master_public_key: None,
            ssh_user: "root".to_string(),
            operator_public_key_path: PathBuf::from("~/.ssh/id_rsa.pub"),
            machine_storage_path: PathBuf::from("~/.docker/machine"),
            master_volumes_path: "/volumes".to_string(),
            master_database_path: "/srv/databases".to_string(),
            local_volumes_path: PathBuf::from("~/volumes"),
            local_repos_path: PathBuf::from("~/repos"),
            compose_file: PathBuf::from("docker-compose.yml"),
            non_backed_up_volumes: Vec::new(),
            database_engine: "mysql".to_string(),
            base_packages: vec!["htop".to_string()],
        }
    }
}

impl Settings {
    /// Discover, parse and env-override the operator settings
    pub fn load() -> Result<Self> {
        let mut settings = match find_settings_file()? {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                tracing::debug!("No settings file found, using defaults");
                Self::default()
            }
        };
        settings.apply_env_overrides();
        settings.expand_paths();
        Ok(settings)
    }

    /// Parse a settings file; a relative `compose_file` resolves against the
    /// file's directory
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if settings.compose_file.is_relative()
            && !settings.compose_file.starts_with("~")
            && let Some(dir) = path.parent()
        {
            settings.compose_file = dir.join(&settings.compose_file);
        }
        Ok(settings)
    }

    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Apply `DOCKHAND_<FIELD>` environment variables
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.registry_address, "REGISTRY_ADDRESS");
        override_option(&mut self.registry_user, "REGISTRY_USER");
        override_option(&mut self.registry_password, "REGISTRY_PASSWORD");
        override_option(&mut self.digitalocean_token, "DIGITALOCEAN_TOKEN");
        override_option(&mut self.scaleway_token, "SCALEWAY_TOKEN");
        override_option(&mut self.scaleway_access_key, "SCALEWAY_ACCESS_KEY");
        override_string(&mut self.master_address, "MASTER_ADDRESS");
        override_option(&mut self.master_public_key, "MASTER_PUBLIC_KEY");
        override_string(&mut self.ssh_user, "SSH_USER");
        override_path(&mut self.operator_public_key_path, "OPERATOR_PUBLIC_KEY_PATH");
        override_path(&mut self.machine_storage_path, "MACHINE_STORAGE_PATH");
        override_string(&mut self.master_volumes_path, "MASTER_VOLUMES_PATH");
        override_string(&mut self.master_database_path, "MASTER_DATABASE_PATH");
        override_path(&mut self.local_volumes_path, "LOCAL_VOLUMES_PATH");
        override_path(&mut self.local_repos_path, "LOCAL_REPOS_PATH");
        override_path(&mut self.compose_file, "COMPOSE_FILE");
        override_list(&mut self.non_backed_up_volumes, "NON_BACKED_UP_VOLUMES");
        override_string(&mut self.database_engine, "DATABASE_ENGINE");
        override_list(&mut self.base_packages, "BASE_PACKAGES");
    }

    fn expand_paths(&mut self) {
        for path in [
            &mut self.operator_public_key_path,
            &mut self.machine_storage_path,
            &mut self.local_volumes_path,
            &mut self.local_repos_path,
            &mut self.compose_file,
        ] {
            *path = expand_home(path);
        }
    }

    /// Directory holding docker-machine's TLS bundle and ssh key for a machine
    pub fn machine_dir(&self, name: &str) -> PathBuf {
        expand_home(&self.machine_storage_path)
            .join("machines")
            .join(name)
    }

    /// Private key docker-machine generated for a machine
    pub fn machine_key_path(&self, name: &str) -> PathBuf {
        self.machine_dir(name).join("id_rsa")
    }

    pub fn require_master_address(&self) -> Result<&str> {
        require_non_empty(&self.master_address, "master_address")
    }

    pub fn require_registry_address(&self) -> Result<&str> {
        require_non_empty(&self.registry_address, "registry_address")
    }

    /// Registry user and password, both required
    pub fn registry_credentials(&self) -> Result<(&str, &str)> {
        let user = self
            .registry_user
            .as_deref()
            .ok_or_else(|| ConfigError::missing("registry_user"))?;
        let password = self
            .registry_password
            .as_deref()
            .ok_or_else(|| ConfigError::missing("registry_password"))?;
        Ok((user, password))
    }
}

fn require_non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        Err(ConfigError::missing(field))
    } else {
        Ok(value)
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, key))
        .ok()
        .filter(|v| !v.is_empty())
}

fn override_string(target: &mut String, key: &str) {
    if let Some(value) = env_value(key) {
        *target = value;
    }
}

fn override_option(target: &mut Option<String>, key: &str) {
    if let Some(value) = env_value(key) {
        *target = Some(value);
    }
}

fn override_path(target: &mut PathBuf, key: &str) {
    if let Some(value) = env_value(key) {
        *target = PathBuf::from(value);
    }
}

fn override_list(target: &mut Vec<String>, key: &str) {
    if let Some(value) = env_value(key) {
        *target = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
}
