//! Probe definition types and structures.
//!
//! This module defines the data structures for platform probe definitions
//! loaded from TOML files or the builtin catalog.

use crate::error::{ProbeError, Result};
use handlescan_core::{PlatformCategory, PlatformId, ProbeStatus, Username};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The single substitution slot recognized in URL templates.
pub const USERNAME_SLOT: &str = "{username}";

/// Complete probe definition for one platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeDefinition {
    /// Core platform metadata
    pub platform: PlatformMetadata,

    /// Request shape for one attempt
    pub request: RequestSpec,

    /// Status-code predicate deciding found/not-found
    pub predicate: SuccessPredicate,
}

impl ProbeDefinition {
    /// Get the platform ID.
    #[must_use]
    pub fn id(&self) -> &PlatformId {
        &self.platform.id
    }

    /// Get the platform name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.platform.name
    }

    /// Get the platform category.
    #[must_use]
    pub fn category(&self) -> PlatformCategory {
        self.platform.category
    }

    /// Build the probe URL for a target handle.
    ///
    /// The template is validated to carry exactly one slot, so a single
    /// replacement is sufficient.
    #[must_use]
    pub fn build_url(&self, target: &Username) -> String {
        self.request.url_template.replace(USERNAME_SLOT, target.as_str())
    }

    /// Validate the probe definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        if self.platform.name.is_empty() {
            return Err(ProbeError::ValidationError {
                platform_id: self.platform.id.to_string(),
                reason: "platform name cannot be empty".to_string(),
            });
        }

        let slots = self.request.url_template.matches(USERNAME_SLOT).count();
        if slots != 1 {
            return Err(ProbeError::ValidationError {
                platform_id: self.platform.id.to_string(),
                reason: format!(
                    "URL template must contain exactly one {USERNAME_SLOT} slot, found {slots}"
                ),
            });
        }

        if !self.request.url_template.starts_with("https://") {
            return Err(ProbeError::ValidationError {
                platform_id: self.platform.id.to_string(),
                reason: "URL template must use https".to_string(),
            });
        }

        if let Some(timeout) = self.request.timeout_secs {
            if timeout == 0 || timeout > 60 {
                return Err(ProbeError::ValidationError {
                    platform_id: self.platform.id.to_string(),
                    reason: format!("timeout_secs override must be 1-60, got {timeout}"),
                });
            }
        }

        self.predicate.validate(&self.platform.id)?;

        Ok(())
    }
}

/// Core platform metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMetadata {
    /// Unique platform identifier (e.g., "github", "mastodon-social")
    pub id: PlatformId,

    /// Human-readable platform name
    pub name: String,

    /// Platform category
    pub category: PlatformCategory,
}

/// HTTP method used by a probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Fetch the profile page
    Get,
    /// Headers only; enough for status-code predicates
    Head,
}

impl Default for HttpMethod {
    fn default() -> Self {
        Self::Get
    }
}

/// Request shape for a single probe attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSpec {
    /// URL template with exactly one `{username}` slot
    pub url_template: String,

    /// HTTP method (GET unless the platform tolerates HEAD)
    #[serde(default)]
    pub method: HttpMethod,

    /// Per-platform timeout override in seconds (1-60)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Extra request headers merged over the identity's defaults
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Status-code predicate mapping raw HTTP codes to candidate statuses.
///
/// A code listed in `found` classifies as `Found`, in `not_found` as
/// `NotFound`. 429 is reserved for the classifier and may not appear in
/// either list; a code in both lists is a conflict and rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessPredicate {
    /// Codes meaning the handle is registered
    #[serde(default = "SuccessPredicate::default_found")]
    pub found: Vec<u16>,

    /// Codes meaning the handle is not registered
    #[serde(default = "SuccessPredicate::default_not_found")]
    pub not_found: Vec<u16>,
}

impl SuccessPredicate {
    fn default_found() -> Vec<u16> {
        vec![200]
    }

    fn default_not_found() -> Vec<u16> {
        vec![404]
    }

    /// Look up the candidate status for an HTTP code, if the table names it.
    #[must_use]
    pub fn status_for(&self, code: u16) -> Option<ProbeStatus> {
        if self.found.contains(&code) {
            Some(ProbeStatus::Found)
        } else if self.not_found.contains(&code) {
            Some(ProbeStatus::NotFound)
        } else {
            None
        }
    }

    /// Validate the predicate table.
    fn validate(&self, platform_id: &PlatformId) -> Result<()> {
        if self.found.is_empty() {
            return Err(ProbeError::ValidationError {
                platform_id: platform_id.to_string(),
                reason: "predicate must list at least one found code".to_string(),
            });
        }

        if let Some(code) = self.found.iter().find(|c| self.not_found.contains(c)) {
            return Err(ProbeError::ValidationError {
                platform_id: platform_id.to_string(),
                reason: format!("conflicting predicate: {code} listed as both found and not_found"),
            });
        }

        if self.found.contains(&429) || self.not_found.contains(&429) {
            return Err(ProbeError::ValidationError {
                platform_id: platform_id.to_string(),
                reason: "429 is always classified rate_limited and may not appear in a predicate"
                    .to_string(),
            });
        }

        Ok(())
    }
}

impl Default for SuccessPredicate {
    fn default() -> Self {
        Self {
            found: Self::default_found(),
            not_found: Self::default_not_found(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_definition(template: &str) -> ProbeDefinition {
        ProbeDefinition {
            platform: PlatformMetadata {
                id: PlatformId::new("test-platform").expect("valid platform ID"),
                name: "Test Platform".to_string(),
                category: PlatformCategory::SocialMedia,
            },
            request: RequestSpec {
                url_template: template.to_string(),
                method: HttpMethod::Get,
                timeout_secs: None,
                headers: BTreeMap::new(),
            },
            predicate: SuccessPredicate::default(),
        }
    }

    #[test]
    fn test_valid_definition() {
        let def = test_definition("https://test.example/{username}");
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_build_url() {
        let def = test_definition("https://test.example/@{username}/profile");
        let target = Username::new("johndoe").expect("valid handle");
        assert_eq!(def.build_url(&target), "https://test.example/@johndoe/profile");
    }

    #[test]
    fn test_template_slot_count() {
        let def = test_definition("https://test.example/profile");
        assert!(def.validate().is_err());

        let def = test_definition("https://test.example/{username}/{username}");
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_template_requires_https() {
        let def = test_definition("http://test.example/{username}");
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_empty_predicate_rejected() {
        let mut def = test_definition("https://test.example/{username}");
        def.predicate.found.clear();
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_conflicting_predicate_rejected() {
        let mut def = test_definition("https://test.example/{username}");
        def.predicate.not_found.push(200);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_429_predicate_rejected() {
        let mut def = test_definition("https://test.example/{username}");
        def.predicate.found.push(429);
        assert!(def.validate().is_err());
    }

    #[test]
    fn test_timeout_override_range() {
        let mut def = test_definition("https://test.example/{username}");
        def.request.timeout_secs = Some(0);
        assert!(def.validate().is_err());

        def.request.timeout_secs = Some(90);
        assert!(def.validate().is_err());

        def.request.timeout_secs = Some(10);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_predicate_status_for() {
        let predicate = SuccessPredicate {
            found: vec![200],
            not_found: vec![404, 410],
        };
        assert_eq!(predicate.status_for(200), Some(ProbeStatus::Found));
        assert_eq!(predicate.status_for(404), Some(ProbeStatus::NotFound));
        assert_eq!(predicate.status_for(410), Some(ProbeStatus::NotFound));
        assert_eq!(predicate.status_for(500), None);
    }

    #[test]
    fn test_toml_round_trip() {
        let def = test_definition("https://test.example/{username}");
        let toml_str = toml::to_string_pretty(&def).expect("serialize definition");
        let parsed: ProbeDefinition = toml::from_str(&toml_str).expect("parse definition");
        assert_eq!(parsed.id(), def.id());
        assert_eq!(parsed.request.url_template, def.request.url_template);
    }
}
