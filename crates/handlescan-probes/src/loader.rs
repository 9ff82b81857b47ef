//! Probe definition loading from TOML files.
//!
//! This module handles loading probe definitions from a
//! `probe-definitions/` directory.

use crate::{
    definition::ProbeDefinition,
    error::{ProbeError, Result},
};
use handlescan_core::PlatformId;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loader for probe definitions from TOML files.
pub struct ProbeLoader {
    /// Base directory containing probe definitions
    definitions_dir: PathBuf,
}

impl ProbeLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(ProbeError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Load a single probe definition by platform ID.
    ///
    /// # Errors
    /// Returns error if the definition file doesn't exist, can't be read, or is invalid.
    pub fn load(&self, platform_id: &PlatformId) -> Result<ProbeDefinition> {
        let filename = format!("{}.toml", platform_id.as_str());

        let Some(path) = Self::find_file_recursive(&self.definitions_dir, &filename)? else {
            return Err(ProbeError::NotFound {
                platform_id: platform_id.to_string(),
            });
        };

        let definition = Self::load_from_path(&path)?;
        definition.validate()?;

        debug!(
            platform_id = %platform_id,
            name = %definition.name(),
            "loaded probe definition"
        );

        Ok(definition)
    }

    /// Load all probe definitions from the definitions directory.
    ///
    /// Invalid definitions are logged as warnings and skipped.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<ProbeDefinition>> {
        let mut definitions = Vec::new();

        Self::walk_and_load_recursive(&self.definitions_dir, &mut definitions)?;

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded probe definitions"
        );

        Ok(definitions)
    }

    /// Recursively walk directory and load all TOML files.
    fn walk_and_load_recursive(dir: &Path, definitions: &mut Vec<ProbeDefinition>) -> Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                Self::walk_and_load_recursive(&path, definitions)?;
            } else if path.extension().and_then(|s| s.to_str()) == Some("toml") {
                match Self::load_from_path(&path) {
                    Ok(definition) => {
                        if let Err(e) = definition.validate() {
                            warn!(
                                path = %path.display(),
                                error = %e,
                                "skipping invalid probe definition"
                            );
                            continue;
                        }
                        definitions.push(definition);
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to load probe definition"
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Recursively search for a file by name.
    fn find_file_recursive(dir: &Path, filename: &str) -> Result<Option<PathBuf>> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                if let Some(found) = Self::find_file_recursive(&path, filename)? {
                    return Ok(Some(found));
                }
            } else if path.file_name().and_then(|s| s.to_str()) == Some(filename) {
                return Ok(Some(path));
            }
        }

        Ok(None)
    }

    /// Load a probe definition from a specific file path.
    fn load_from_path(path: &Path) -> Result<ProbeDefinition> {
        let contents = std::fs::read_to_string(path).map_err(|e| ProbeError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        toml::from_str(&contents).map_err(|e| ProbeError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
    }
}
