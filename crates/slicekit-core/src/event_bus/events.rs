//! Event type definitions for the event bus.
//!
//! This module defines all application events organized by category.
//! Events are designed to be cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Container registry changes
    Container(ContainerEvent),
    /// Material lookup table notifications
    Material(MaterialEvent),
    /// Settings and preferences
    Settings(SettingsEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Container(_) => EventCategory::Container,
            AppEvent::Material(_) => EventCategory::Material,
            AppEvent::Settings(_) => EventCategory::Settings,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Container(e) => e.description(),
            AppEvent::Material(e) => e.description(),
            AppEvent::Settings(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Container registry events.
    Container,
    /// Material index events.
    Material,
    /// Settings and preference events.
    Settings,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Container => write!(f, "Container"),
            EventCategory::Material => write!(f, "Material"),
            EventCategory::Settings => write!(f, "Settings"),
        }
    }
}

/// Container registry events
///
/// Every variant carries the container id and its declared type
/// (`"material"`, `"quality"`, `"variant"`, ...), so listeners can filter
/// without querying the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContainerEvent {
    /// A container was added to the registry.
    Added {
        /// Id of the added container.
        id: String,
        /// Declared container type.
        container_type: String,
    },
    /// A container was removed from the registry.
    Removed {
        /// Id of the removed container.
        id: String,
        /// Declared container type.
        container_type: String,
    },
    /// A container's metadata changed in place.
    MetadataChanged {
        /// Id of the changed container.
        id: String,
        /// Declared container type.
        container_type: String,
    },
}

impl ContainerEvent {
    /// Id of the container this event refers to
    pub fn container_id(&self) -> &str {
        match self {
            ContainerEvent::Added { id, .. }
            | ContainerEvent::Removed { id, .. }
            | ContainerEvent::MetadataChanged { id, .. } => id,
        }
    }

    /// Declared type of the container this event refers to
    pub fn container_type(&self) -> &str {
        match self {
            ContainerEvent::Added { container_type, .. }
            | ContainerEvent::Removed { container_type, .. }
            | ContainerEvent::MetadataChanged { container_type, .. } => container_type,
        }
    }

    /// Get a short description for logging
    pub fn description(&self) -> String {
        match self {
            ContainerEvent::Added { id, container_type } => {
                format!("Added {} container {}", container_type, id)
            }
            ContainerEvent::Removed { id, container_type } => {
                format!("Removed {} container {}", container_type, id)
            }
            ContainerEvent::MetadataChanged { id, container_type } => {
                format!("Metadata of {} container {} changed", container_type, id)
            }
        }
    }
}

/// Material index notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialEvent {
    /// The material lookup tables were rebuilt, or the favorites changed.
    MaterialsUpdated,
    /// Reserved for favorites-only listeners; not published by the index today.
    FavoritesUpdated,
}

impl MaterialEvent {
    /// Get a short description for logging
    pub fn description(&self) -> String {
        match self {
            MaterialEvent::MaterialsUpdated => "Materials updated".to_string(),
            MaterialEvent::FavoritesUpdated => "Favorites updated".to_string(),
        }
    }
}

/// Settings and preference events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettingsEvent {
    /// A preference value was set.
    PreferenceChanged {
        /// Preference key.
        key: String,
        /// New value.
        value: String,
    },
    /// Settings were written to storage.
    Saved {
        /// Target file, `None` for memory-only stores.
        path: Option<PathBuf>,
    },
}

impl SettingsEvent {
    /// Get a short description for logging
    pub fn description(&self) -> String {
        match self {
            SettingsEvent::PreferenceChanged { key, .. } => format!("Preference {} changed", key),
            SettingsEvent::Saved { path: Some(path) } => {
                format!("Settings saved to {}", path.display())
            }
            SettingsEvent::Saved { path: None } => "Settings saved (in memory)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_category() {
        let event = AppEvent::Material(MaterialEvent::MaterialsUpdated);
        assert_eq!(event.category(), EventCategory::Material);

        let event = AppEvent::Container(ContainerEvent::Added {
            id: "generic_pla".to_string(),
            container_type: "material".to_string(),
        });
        assert_eq!(event.category(), EventCategory::Container);
    }

    #[test]
    fn test_container_event_accessors() {
        let event = ContainerEvent::MetadataChanged {
            id: "generic_pla_175".to_string(),
            container_type: "material".to_string(),
        };
        assert_eq!(event.container_id(), "generic_pla_175");
        assert_eq!(event.container_type(), "material");
        assert_eq!(
            event.description(),
            "Metadata of material container generic_pla_175 changed"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Settings(SettingsEvent::PreferenceChanged {
            key: "general/favorite_materials".to_string(),
            value: "generic_pla".to_string(),
        });
        let json = serde_json::to_string(&event).expect("serialize");
        let back: AppEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, event);
    }
}
