//! Preference Store
//!
//! Key/value preferences backed by the application [`Config`]. Values are
//! plain strings; callers own their encoding (the favorites list, for
//! example, is stored as a `;`-joined string).
//!
//! [`Preferences`] keeps the config in memory and writes it to its file on
//! [`PreferenceStore::save_settings`]. A store created without a path never
//! touches the disk, which is what tests and throwaway sessions use.

use crate::config::Config;
use crate::error::SettingsResult;
use parking_lot::RwLock;
use slicekit_core::{AppEvent, SettingsEvent, SharedBus};
use std::path::{Path, PathBuf};

/// Access to persisted preference values
pub trait PreferenceStore: Send + Sync {
    /// Current value for `key`, if any
    fn get_value(&self, key: &str) -> Option<String>;

    /// Set `key` to `value` in memory
    fn set_value(&self, key: &str, value: &str);

    /// Write all settings to persistent storage
    fn save_settings(&self) -> SettingsResult<()>;
}

/// Config-backed preference store
pub struct Preferences {
    config: RwLock<Config>,
    path: Option<PathBuf>,
    bus: Option<SharedBus>,
}

impl Preferences {
    /// Memory-only store seeded from `config`
    pub fn in_memory(config: Config) -> Self {
        Self {
            config: RwLock::new(config),
            path: None,
            bus: None,
        }
    }

    /// Store persisted to `path`
    ///
    /// The file is read if it exists; otherwise defaults are used and the
    /// file is created on the first save.
    pub fn open(path: &Path) -> SettingsResult<Self> {
        let config = crate::manager::SettingsManager::load_or_default(path)?;
        Ok(Self {
            config: RwLock::new(config),
            path: Some(path.to_path_buf()),
            bus: None,
        })
    }

    /// Publish preference changes and saves on `bus`
    pub fn with_bus(mut self, bus: SharedBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Snapshot of the full configuration
    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    /// Apply `update` to the configuration in place
    pub fn update_config<F>(&self, update: F)
    where
        F: FnOnce(&mut Config),
    {
        update(&mut *self.config.write());
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn notify(&self, event: SettingsEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(AppEvent::Settings(event)).ok();
        }
    }
}

impl PreferenceStore for Preferences {
    fn get_value(&self, key: &str) -> Option<String> {
        self.config.read().preferences.get(key).cloned()
    }

    fn set_value(&self, key: &str, value: &str) {
        self.config
            .write()
            .preferences
            .insert(key.to_string(), value.to_string());
        self.notify(SettingsEvent::PreferenceChanged {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn save_settings(&self) -> SettingsResult<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            self.config.read().save_to_file(path)?;
            tracing::debug!("Settings saved to {}", path.display());
        }
        self.notify(SettingsEvent::Saved {
            path: self.path.clone(),
        });
        Ok(())
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::in_memory(Config::default())
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("path", &self.path)
            .field("values", &self.config.read().preferences.len())
            .finish()
    }
}
