//! Handlescan Core - Foundation crate for the Handlescan scanner.
//!
//! This crate provides shared types, error handling, and configuration
//! management that all other Handlescan crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - Validated scanner configuration with TOML support
//! - [`types`] - Shared newtypes and enums (`PlatformId`, `Username`, `ProbeStatus`)
//!
//! # Example
//!
//! ```rust
//! use handlescan_core::{ScanConfig, Username};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::default();
//! config.validate()?;
//!
//! let target = Username::new("johndoe")?;
//! println!("Scanning {target}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{RotationPolicy, ScanConfig, TlsVerify};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{PlatformCategory, PlatformId, ProbeStatus, Username};
