//! Handlescan Scanner - Concurrent handle probing engine.
//!
//! This crate drives probes from a [`handlescan_probes::ProbeRegistry`]
//! against real platforms: identity rotation, admission control, retries,
//! outcome classification, session caching, and single-target or batch
//! orchestration.
//!
//! # Architecture
//!
//! - **Identity** ([`identity`]): Per-attempt evasion identities rotated
//!   from configured pools, with proxy health tracking
//! - **Governor** ([`governor`]): Process-wide concurrency bound and
//!   dispatch pacing shared by every probe
//! - **Transport** ([`transport`]): The HTTP seam; production `reqwest`
//!   transport plus the trait tests script against
//! - **Retry** ([`retry`]): Drives one probe to a terminal outcome with
//!   linear backoff
//! - **Classify** ([`classify`]): Maps status codes and attempt failures to
//!   terminal statuses
//! - **Cache** ([`cache`]): Session-scoped `(target, platform)` result cache
//! - **Orchestrator** ([`orchestrator`]): Single-target fan-out
//! - **Batch** ([`batch`]): Multi-target coordination over shared limits
//! - **Report** ([`report`]): Operational events and outcome sinks
//!
//! # Example
//!
//! ```rust,no_run
//! use handlescan_core::ScanConfig;
//! use handlescan_probes::ProbeRegistry;
//! use handlescan_scanner::{ProbeFilter, ScanOrchestrator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::default();
//! let registry = ProbeRegistry::builtin()?;
//! let orchestrator = ScanOrchestrator::new(&config, registry)?;
//!
//! let results = orchestrator.scan("johndoe", &ProbeFilter::All).await?;
//! for (platform, outcome) in &results.outcomes {
//!     println!("{platform}: {:?}", outcome.status);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod batch;
pub mod cache;
pub mod classify;
pub mod error;
pub mod filter;
pub mod governor;
pub mod identity;
pub mod orchestrator;
pub mod outcome;
pub mod report;
pub mod retry;
pub mod transport;

// Re-export commonly used types
pub use batch::{BatchCoordinator, BatchEntry};
pub use cache::ResultCache;
pub use classify::{classify_failure, classify_response};
pub use error::{AttemptError, Result, ScanError};
pub use filter::ProbeFilter;
pub use governor::{AdmissionSlot, Governor};
pub use identity::{EvasionIdentity, IdentitySelector, PoolUsage};
pub use orchestrator::ScanOrchestrator;
pub use outcome::{ProbeOutcome, ScanResultSet, StatusCounts, PREVIEW_LIMIT};
pub use report::{LogReporter, NullSink, OutcomeSink, Reporter, ScanEvent};
pub use retry::{run_probe, RetryPolicy};
pub use transport::{HttpTransport, ProbeRequest, ProbeResponse, ProbeTransport};
