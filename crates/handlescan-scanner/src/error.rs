//! Error types for the scanning subsystem.
//!
//! Only pre-dispatch validation and fatal configuration problems surface to
//! callers as [`ScanError`]. Everything that can go wrong during an attempt
//! is an [`AttemptError`], absorbed by the retry controller and converted
//! into a terminal [`crate::ProbeOutcome`].

use thiserror::Error;

/// Errors surfaced to callers of the scanning API.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Malformed target handle, rejected before any network activity
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed configuration, fatal at startup
    #[error("configuration error: {0}")]
    Configuration(#[from] handlescan_core::ConfigError),

    /// Probe registry failure (unknown platform, invalid definition)
    #[error("probe error: {0}")]
    Probe(#[from] handlescan_probes::ProbeError),
}

impl From<handlescan_core::CoreError> for ScanError {
    fn from(err: handlescan_core::CoreError) -> Self {
        match err {
            handlescan_core::CoreError::Config(e) => Self::Configuration(e),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// Failure of one network attempt.
///
/// These never escape the retry controller. A definitive HTTP response is
/// not a failure, whatever its status code.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Connection-level failure (DNS, TCP, TLS, proxy)
    #[error("connection failed: {0}")]
    Network(String),

    /// The per-attempt deadline elapsed
    #[error("attempt deadline exceeded")]
    Timeout,
}

/// Result type for scanning operations.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ScanError::Validation("handle cannot be empty".to_string());
        assert_eq!(err.to_string(), "validation error: handle cannot be empty");
    }

    #[test]
    fn test_core_error_conversion() {
        let core = handlescan_core::CoreError::Validation("bad handle".to_string());
        let scan: ScanError = core.into();
        assert!(matches!(scan, ScanError::Validation(_)));

        let config = handlescan_core::ConfigError::InvalidValue {
            field: "max_concurrency".to_string(),
            reason: "must be 1-20".to_string(),
        };
        let scan: ScanError = handlescan_core::CoreError::Config(config).into();
        assert!(matches!(scan, ScanError::Configuration(_)));
    }

    #[test]
    fn test_attempt_error_display() {
        assert_eq!(
            AttemptError::Timeout.to_string(),
            "attempt deadline exceeded"
        );
        assert_eq!(
            AttemptError::Network("refused".to_string()).to_string(),
            "connection failed: refused"
        );
    }
}
