//! SliceKit Settings Crate
//!
//! Handles application configuration, the preference store, and resolution
//! of the per-user configuration directory.

pub mod config;
pub mod error;
pub mod manager;
pub mod preferences;

pub use config::{Config, MaterialSettings, FAVORITE_MATERIALS_KEY};
pub use error::{ConfigError, SettingsError, SettingsResult};
pub use manager::SettingsManager;
pub use preferences::{PreferenceStore, Preferences};
