//! Configuration for SliceKit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Material index tuning (debounce interval, quality-search diameter)
//! - Free-form preference values keyed by `section/name`

use crate::error::{ConfigError, ConfigResult, SettingsResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Preference key holding the `;`-joined favorite material ids.
pub const FAVORITE_MATERIALS_KEY: &str = "general/favorite_materials";

/// Material index settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSettings {
    /// Delay between the last registry change and the lookup table rebuild
    pub update_interval_ms: u64,
    /// Approximate diameter whose generic materials serve as fallbacks
    pub default_quality_diameter: u32,
    /// Preference key of the favorites list
    pub favorites_key: String,
    /// Root material cloned when creating a new custom material
    pub create_template: String,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            update_interval_ms: 300,
            default_quality_diameter: 3,
            favorites_key: FAVORITE_MATERIALS_KEY.to_string(),
            create_template: "generic_pla".to_string(),
        }
    }
}

impl MaterialSettings {
    /// The debounce interval as a `Duration`
    pub fn update_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.update_interval_ms)
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Material index settings
    #[serde(default)]
    pub materials: MaterialSettings,
    /// Preference values
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.materials.update_interval_ms == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "materials.update_interval_ms".to_string(),
                value: self.materials.update_interval_ms.to_string(),
            });
        }

        if self.materials.default_quality_diameter == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "materials.default_quality_diameter".to_string(),
                value: self.materials.default_quality_diameter.to_string(),
            });
        }

        if self.materials.favorites_key.trim().is_empty() {
            return Err(ConfigError::MissingKey(
                "materials.favorites_key".to_string(),
            ));
        }

        if self.materials.create_template.trim().is_empty() {
            return Err(ConfigError::MissingKey(
                "materials.create_template".to_string(),
            ));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettingsError;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.materials.update_interval_ms, 300);
        assert_eq!(config.materials.default_quality_diameter, 3);
        assert_eq!(config.materials.favorites_key, FAVORITE_MATERIALS_KEY);
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let mut config = Config::default();
        config.materials.update_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_empty_favorites_key() {
        let mut config = Config::default();
        config.materials.favorites_key = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingKey(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slicekit.json");

        let mut config = Config::default();
        config.materials.update_interval_ms = 150;
        config
            .preferences
            .insert(FAVORITE_MATERIALS_KEY.to_string(), "generic_pla".to_string());
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.materials.update_interval_ms, 150);
        assert_eq!(
            loaded.preferences.get(FAVORITE_MATERIALS_KEY).map(String::as_str),
            Some("generic_pla")
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slicekit.toml");

        let mut config = Config::default();
        config.materials.create_template = "generic_petg".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.materials.create_template, "generic_petg");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "materials": { "update_interval_ms": 50 } }"#).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.materials.update_interval_ms, 50);
        assert_eq!(loaded.materials.default_quality_diameter, 3);
        assert_eq!(loaded.materials.create_template, "generic_pla");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slicekit.yaml");
        let err = Config::default().save_to_file(&path).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(_))
        ));
    }
}
