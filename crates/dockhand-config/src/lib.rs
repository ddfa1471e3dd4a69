//! dockhand settings
//!
//! Locates the operator's settings file, loads it and layers `DOCKHAND_*`
//! environment overrides on top.

pub mod error;
pub mod settings;

pub use error::*;
pub use settings::Settings;

use std::path::{Path, PathBuf};

/// Environment variable that points directly at a settings file
pub const CONFIG_PATH_ENV: &str = "DOCKHAND_CONFIG_PATH";

/// dockhand's per-user config directory (`~/.config/dockhand`)
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("dockhand");

    Ok(config_dir)
}

/// Find the settings file
///
/// Search order:
/// 1. `DOCKHAND_CONFIG_PATH` (direct path)
/// 2. current directory: `dockhand.yml`, `.dockhand.yml`
/// 3. `~/.config/dockhand/settings.yml`
///
/// Returns `None` when no file exists; the caller falls back to defaults.
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} points at missing file {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    for filename in ["dockhand.yml", ".dockhand.yml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("dockhand").join("settings.yml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
