//! Handlescan Probes - Platform probe definition system.
//!
//! This crate provides the core types and functionality for managing
//! platform probe definitions. It handles loading TOML definition files,
//! a builtin catalog, and a validated immutable registry.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Strongly-typed platform metadata,
//!   request shape, and status-code predicates
//! - **Loader** ([`loader`]): TOML file loading from a `probe-definitions/` directory
//! - **Catalog** ([`catalog`]): Builtin definitions for well-known platforms
//! - **Registry** ([`registry`]): Immutable, validated catalogue with stable ordering
//! - **Errors** ([`error`]): Probe-specific error types
//!
//! # Example
//!
//! ```rust
//! use handlescan_probes::ProbeRegistry;
//! use handlescan_core::PlatformId;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ProbeRegistry::builtin()?;
//!
//! let platform_id = PlatformId::new("github")?;
//! let definition = registry.get(&platform_id)?;
//!
//! println!("Platform: {}", definition.name());
//! println!("Category: {:?}", definition.category());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod catalog;
pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;

// Re-export commonly used types
pub use catalog::builtin_definitions;
pub use definition::{
    HttpMethod, PlatformMetadata, ProbeDefinition, RequestSpec, SuccessPredicate, USERNAME_SLOT,
};
pub use error::{ProbeError, Result};
pub use loader::ProbeLoader;
pub use registry::ProbeRegistry;
