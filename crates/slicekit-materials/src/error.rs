//! Error types for the materials crate.
//!
//! Most material queries degrade to `None` with a logged warning. The
//! errors here cover the strict paths (direct container tree indexing),
//! registry failures, and catalog loading.

use slicekit_core::ContainerError;
use slicekit_settings::SettingsError;
use std::io;
use thiserror::Error;

/// Errors that can occur during material lookups and management.
#[derive(Error, Debug)]
pub enum MaterialError {
    /// The container tree has no machine with this definition.
    #[error("Unknown machine definition: {definition_id}")]
    UnknownMachine { definition_id: String },

    /// The machine has no variant with this nozzle name.
    #[error("Unknown variant '{nozzle_name}' for machine {definition_id}")]
    UnknownVariant {
        definition_id: String,
        nozzle_name: String,
    },

    /// The machine has no variants at all.
    #[error("Machine {definition_id} has no variants")]
    NoVariants { definition_id: String },

    /// The variant offers no materials.
    #[error("Variant '{variant}' of machine {definition_id} has no materials")]
    NoMaterials {
        definition_id: String,
        variant: String,
    },

    /// No extruder at the requested position.
    #[error("Extruder position {position} out of range ({count} extruders)")]
    ExtruderOutOfRange { position: usize, count: usize },

    /// The container registry rejected an operation.
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    /// Preferences could not be saved.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The material catalog is inconsistent.
    #[error("Invalid catalog: {0}")]
    Catalog(String),

    /// I/O error while reading a catalog.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type alias for material operations.
pub type MaterialResult<T> = Result<T, MaterialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_error_display() {
        let err = MaterialError::UnknownMachine {
            definition_id: "ultimaker3".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown machine definition: ultimaker3");

        let err = MaterialError::UnknownVariant {
            definition_id: "ultimaker3".to_string(),
            nozzle_name: "AA 0.8".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown variant 'AA 0.8' for machine ultimaker3"
        );

        let err = MaterialError::ExtruderOutOfRange {
            position: 2,
            count: 1,
        };
        assert_eq!(
            err.to_string(),
            "Extruder position 2 out of range (1 extruders)"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: MaterialError = ContainerError::NotFound {
            id: "generic_pla".to_string(),
        }
        .into();
        assert!(matches!(err, MaterialError::Container(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "catalog.json");
        let err: MaterialError = io_err.into();
        assert!(matches!(err, MaterialError::IoError(_)));
    }
}
