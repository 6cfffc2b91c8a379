//! Error types for metadata loading and configuration
//!
//! Errors carry the field or file they refer to so a failed destroy run
//! tells the operator exactly what to fix.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating teardown inputs
#[derive(Debug, Error)]
pub enum Error {
    /// A metadata or configuration value is missing or malformed
    #[error("validation error for {field}: {message}")]
    Validation {
        /// Dotted path of the offending field (e.g., "nutanix.prismCentral")
        field: String,
        /// Description of what's invalid
        message: String,
    },

    /// A file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed to read
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be parsed
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Path that failed to parse
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Telemetry could not be initialized
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

impl Error {
    /// Create a validation error for the given field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Get the field path if this is a validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}
