//! Error handling for SliceKit
//!
//! Provides the error types shared by every layer of the application:
//! - Container errors (registry lookups, metadata validation)
//! - A unified [`Error`] that wraps them together with I/O failures
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Container error type
///
/// Represents errors raised by the container registry when looking up,
/// adding, or validating configuration containers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContainerError {
    /// No container exists with this id
    #[error("Container not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A container with this id is already registered
    #[error("Container already exists: {id}")]
    AlreadyExists {
        /// The conflicting container id.
        id: String,
    },

    /// Container metadata failed validation at the registry boundary
    #[error("Invalid metadata for container '{id}': {reason}")]
    InvalidMetadata {
        /// The id of the offending container (may be empty).
        id: String,
        /// Why the metadata was rejected.
        reason: String,
    },

    /// Container is read-only and cannot be modified
    #[error("Container is read-only: {id}")]
    ReadOnly {
        /// The read-only container id.
        id: String,
    },

    /// Generic container error
    #[error("Container error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Main error type for SliceKit
///
/// A unified error type that can represent any error from the shared layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Container registry error
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a container error
    pub fn is_container_error(&self) -> bool {
        matches!(self, Error::Container(_))
    }

    /// Check if this is a missing-container error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Container(ContainerError::NotFound { .. }))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_error_display() {
        let err = ContainerError::NotFound {
            id: "generic_pla".to_string(),
        };
        assert_eq!(err.to_string(), "Container not found: generic_pla");

        let err = ContainerError::InvalidMetadata {
            id: "generic_abs".to_string(),
            reason: "base_file is empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid metadata for container 'generic_abs': base_file is empty"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ContainerError::NotFound {
            id: "x".to_string(),
        }
        .into();
        assert!(err.is_container_error());
        assert!(err.is_not_found());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(!err.is_container_error());
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("something broke");
        assert_eq!(err.to_string(), "something broke");
    }
}
