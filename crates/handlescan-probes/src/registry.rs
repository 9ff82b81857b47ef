//! Validated, immutable probe definition registry.

use crate::{
    catalog::builtin_definitions,
    definition::ProbeDefinition,
    error::{ProbeError, Result},
    loader::ProbeLoader,
};
use handlescan_core::{PlatformCategory, PlatformId};
use std::collections::BTreeMap;
use tracing::info;

/// Immutable catalogue of platform probe definitions.
///
/// Construction validates every definition and fails fast; a registry in
/// hand means every entry is well-formed. The backing map is ordered by
/// platform ID, so `all()` has a stable order that sizes every scan's
/// result set deterministically.
#[derive(Debug, Clone)]
pub struct ProbeRegistry {
    definitions: BTreeMap<PlatformId, ProbeDefinition>,
}

impl ProbeRegistry {
    /// Build a registry from a set of definitions.
    ///
    /// # Errors
    /// Returns error if any definition fails validation or two definitions
    /// share a platform ID.
    pub fn from_definitions(definitions: Vec<ProbeDefinition>) -> Result<Self> {
        let mut map = BTreeMap::new();

        for definition in definitions {
            definition.validate()?;

            let platform_id = definition.id().clone();
            if map.insert(platform_id.clone(), definition).is_some() {
                return Err(ProbeError::ValidationError {
                    platform_id: platform_id.to_string(),
                    reason: "duplicate platform ID".to_string(),
                });
            }
        }

        info!(count = map.len(), "probe registry constructed");

        Ok(Self { definitions: map })
    }

    /// Build a registry from the builtin catalog.
    pub fn builtin() -> Result<Self> {
        Self::from_definitions(builtin_definitions())
    }

    /// Build a registry from all definitions the loader can provide.
    ///
    /// # Errors
    /// Returns error if loading fails or the loaded set is invalid.
    pub fn load_from(loader: &ProbeLoader) -> Result<Self> {
        Self::from_definitions(loader.load_all()?)
    }

    /// Get a probe definition by platform ID.
    ///
    /// # Errors
    /// Returns error if the platform is not registered.
    pub fn get(&self, platform_id: &PlatformId) -> Result<&ProbeDefinition> {
        self.definitions
            .get(platform_id)
            .ok_or_else(|| ProbeError::NotFound {
                platform_id: platform_id.to_string(),
            })
    }

    /// All probe definitions in stable (lexicographic by ID) order.
    #[must_use]
    pub fn all(&self) -> Vec<&ProbeDefinition> {
        self.definitions.values().collect()
    }

    /// Probe definitions in the given category, stable order.
    #[must_use]
    pub fn get_by_category(&self, category: PlatformCategory) -> Vec<&ProbeDefinition> {
        self.definitions
            .values()
            .filter(|def| def.category() == category)
            .collect()
    }

    /// Number of registered platforms.
    #[must_use]
    pub fn count(&self) -> usize {
        self.definitions.len()
    }

    /// Whether a platform is registered.
    #[must_use]
    pub fn contains(&self, platform_id: &PlatformId) -> bool {
        self.definitions.contains_key(platform_id)
    }

    /// All registered platform IDs in stable order.
    #[must_use]
    pub fn ids(&self) -> Vec<PlatformId> {
        self.definitions.keys().cloned().collect()
    }
}
