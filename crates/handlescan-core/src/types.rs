//! Shared types used across the Handlescan application.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::CoreError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for platform identifiers with validation.
///
/// Platform IDs must be lowercase alphanumeric with hyphens, 2-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(String);

impl PlatformId {
    /// Create a new `PlatformId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate platform ID format: lowercase alphanumeric with hyphens, 2-50 chars.
    fn validate(id: &str) -> Result<(), CoreError> {
        static PLATFORM_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PLATFORM_REGEX.get_or_init(|| {
            Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,48}[a-z0-9])?$").expect("valid regex")
        });

        if id.len() < 2 || id.len() > 50 {
            return Err(CoreError::Validation(format!(
                "invalid platform ID: must be 2-50 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid platform ID: must be lowercase alphanumeric with hyphens, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for the handle under investigation, validated at construction.
///
/// Usernames must be 2-64 characters from `[A-Za-z0-9_.-]`. Validation
/// happens here, before any network activity is possible for the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Maximum accepted handle length.
    pub const MAX_LENGTH: usize = 64;

    /// Minimum accepted handle length.
    pub const MIN_LENGTH: usize = 2;

    /// Create a new `Username` from a string, trimming surrounding whitespace.
    ///
    /// # Errors
    /// Returns error if the handle is empty, outside the length bounds, or
    /// contains characters outside `[A-Za-z0-9_.-]`.
    pub fn new(handle: impl Into<String>) -> Result<Self, CoreError> {
        let handle = handle.into().trim().to_string();
        Self::validate(&handle)?;
        Ok(Self(handle))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(handle: &str) -> Result<(), CoreError> {
        static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = USERNAME_REGEX
            .get_or_init(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid regex"));

        if handle.is_empty() {
            return Err(CoreError::Validation("handle cannot be empty".to_string()));
        }

        if handle.len() < Self::MIN_LENGTH || handle.len() > Self::MAX_LENGTH {
            return Err(CoreError::Validation(format!(
                "invalid handle: must be {}-{} characters, got {}",
                Self::MIN_LENGTH,
                Self::MAX_LENGTH,
                handle.len()
            )));
        }

        if regex.is_match(handle) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "invalid handle: only letters, digits, '_', '.', '-' allowed, got '{handle}'"
            )))
        }
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal and transient states of a single platform probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// The handle is registered on the platform
    Found,
    /// The handle is not registered on the platform
    NotFound,
    /// The platform answered HTTP 429
    RateLimited,
    /// The attempt budget was exhausted by deadline failures
    Timeout,
    /// The attempt budget was exhausted by connection-level failures
    Error,
    /// No attempt has completed yet; never present in a returned result set
    Pending,
}

impl ProbeStatus {
    /// Whether this status is terminal.
    ///
    /// Every outcome in a returned `ScanResultSet` is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Found => "Found",
            Self::NotFound => "Not Found",
            Self::RateLimited => "Rate Limited",
            Self::Timeout => "Timeout",
            Self::Error => "Error",
            Self::Pending => "Pending",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Categories of probed platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformCategory {
    /// Social networks (Twitter/X, Instagram, TikTok, ...)
    SocialMedia,
    /// Developer platforms (GitHub, GitLab, ...)
    Developer,
    /// Content and publishing platforms
    Content,
    /// Messaging services
    Messaging,
    /// Professional networks
    Professional,
    /// Other/uncategorized
    Other,
}

impl PlatformCategory {
    /// Get a human-readable display name.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SocialMedia => "Social Media",
            Self::Developer => "Developer",
            Self::Content => "Content",
            Self::Messaging => "Messaging",
            Self::Professional => "Professional",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for PlatformCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
