//! Settings Manager
//!
//! Resolves where the configuration lives on disk and loads it.

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "slicekit";
const CONFIG_FILE_NAME: &str = "config.json";

/// Locates and loads the application configuration
pub struct SettingsManager;

impl SettingsManager {
    /// Platform-specific configuration directory (`~/.config/slicekit` on Linux)
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no config or home directory".to_string())
            })
    }

    /// Full path of the configuration file
    pub fn config_file_path() -> SettingsResult<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Create the configuration directory if it does not exist
    pub fn ensure_config_dir() -> SettingsResult<PathBuf> {
        let dir = Self::config_dir()?;
        std::fs::create_dir_all(&dir)
            .map_err(|e| SettingsError::ConfigDirectory(format!("{}: {}", dir.display(), e)))?;
        Ok(dir)
    }

    /// Load the config at `path`, falling back to defaults if the file does not exist
    ///
    /// A file that exists but fails to parse or validate is an error; it is
    /// never silently replaced with defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Config> {
        if !path.exists() {
            tracing::info!(
                "No configuration at {}, using defaults",
                path.display()
            );
            return Ok(Config::default());
        }

        Config::load_from_file(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_path_ends_with_app_dir() {
        if let Ok(path) = SettingsManager::config_file_path() {
            assert!(path.ends_with("slicekit/config.json"));
        }
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SettingsManager::load_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config.materials.update_interval_ms, 300);
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SettingsManager::load_or_default(&path).unwrap_err();
        assert!(matches!(err, SettingsError::LoadError(_)));
    }
}
