//! Platform selection for a scan.

use crate::error::Result;
use handlescan_core::{PlatformCategory, PlatformId};
use handlescan_probes::{ProbeDefinition, ProbeRegistry};

/// Which platforms a scan covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFilter {
    /// Every registered platform
    All,
    /// Platforms in one category
    Category(PlatformCategory),
    /// An explicit platform list
    Specific(Vec<PlatformId>),
}

impl Default for ProbeFilter {
    fn default() -> Self {
        Self::All
    }
}

impl ProbeFilter {
    /// Resolve the filter against a registry, in the registry's stable
    /// order (or list order, for an explicit list).
    ///
    /// # Errors
    /// Returns error if an explicitly-listed platform is not registered.
    pub fn resolve<'a>(&self, registry: &'a ProbeRegistry) -> Result<Vec<&'a ProbeDefinition>> {
        match self {
            Self::All => Ok(registry.all()),
            Self::Category(category) => Ok(registry.get_by_category(*category)),
            Self::Specific(ids) => ids
                .iter()
                .map(|id| registry.get(id).map_err(Into::into))
                .collect(),
        }
    }
}
