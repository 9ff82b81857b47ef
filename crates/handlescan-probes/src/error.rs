//! Error types for the probe definition subsystem.

use thiserror::Error;

/// Errors that can occur in probe definition operations.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Probe definition not found
    #[error("probe definition not found: {platform_id}")]
    NotFound {
        /// The platform ID that was not found
        platform_id: String,
    },

    /// Failed to load probe definition from file
    #[error("failed to load probe definition from {path}: {source}")]
    LoadError {
        /// Path to the definition file
        path: String,
        /// Underlying error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse probe definition TOML
    #[error("failed to parse probe definition TOML in {path}: {source}")]
    ParseError {
        /// Path to the definition file
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Invalid probe definition (validation failed)
    #[error("invalid probe definition for {platform_id}: {reason}")]
    ValidationError {
        /// Platform ID being validated
        platform_id: String,
        /// Reason for validation failure
        reason: String,
    },

    /// Probe definition directory not found
    #[error("probe definitions directory not found at {path}")]
    DirectoryNotFound {
        /// Expected directory path
        path: String,
    },

    /// I/O error while accessing probe definitions
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid platform ID format
    #[error("invalid platform ID: {0}")]
    InvalidId(#[from] handlescan_core::CoreError),
}

/// Result type for probe definition operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
