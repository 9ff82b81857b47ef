//! Operational events and outcome delivery.
//!
//! Scanning surfaces two side channels: [`Reporter`] receives operational
//! events (rotation, proxy health, rate limiting), and [`OutcomeSink`]
//! receives each terminal outcome as it completes. Both default to
//! implementations that only log; failures of a sink never fail a scan.

use crate::outcome::ProbeOutcome;
use async_trait::async_trait;
use handlescan_core::{PlatformId, Username};
use tracing::{info, warn};

/// Operational event emitted while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A rate-limit response triggered an identity rotation hint
    RateLimitObserved {
        /// Platform that returned 429
        platform_id: PlatformId,
    },
    /// A proxy crossed the failure threshold and left the rotation
    ProxyDegraded {
        /// The excluded proxy endpoint
        proxy: String,
    },
    /// Every configured proxy is excluded; attempts connect directly
    ProxyPoolExhausted,
    /// A probe consumed every attempt without a definitive response
    RetriesExhausted {
        /// Platform whose probe gave up
        platform_id: PlatformId,
        /// Attempts consumed
        attempts: u32,
    },
    /// A probe was answered from the session cache
    CacheHit {
        /// Platform whose outcome was cached
        platform_id: PlatformId,
    },
    /// The scan was cancelled before all probes resolved
    ScanCancelled {
        /// Probes still unresolved at cancellation
        unresolved: usize,
    },
}

/// Receiver for operational events.
pub trait Reporter: Send + Sync {
    /// Handle one event. Must not block.
    fn report(&self, event: &ScanEvent);
}

/// Reporter that writes events to the log.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: &ScanEvent) {
        match event {
            ScanEvent::RateLimitObserved { platform_id } => {
                warn!(platform = %platform_id, "rate limit observed, rotating identity");
            }
            ScanEvent::ProxyDegraded { proxy } => {
                warn!(proxy = %proxy, "proxy degraded and excluded");
            }
            ScanEvent::ProxyPoolExhausted => {
                warn!("proxy pool exhausted, connecting directly");
            }
            ScanEvent::RetriesExhausted {
                platform_id,
                attempts,
            } => {
                warn!(platform = %platform_id, attempts, "retries exhausted");
            }
            ScanEvent::CacheHit { platform_id } => {
                info!(platform = %platform_id, "probe answered from cache");
            }
            ScanEvent::ScanCancelled { unresolved } => {
                warn!(unresolved, "scan cancelled");
            }
        }
    }
}

/// Receiver for terminal probe outcomes, delivered in completion order.
///
/// Delivery is fire-and-forget: a sink error is logged and the scan
/// continues.
#[async_trait]
pub trait OutcomeSink: Send + Sync {
    /// Deliver one terminal outcome.
    async fn deliver(
        &self,
        target: &Username,
        platform_id: &PlatformId,
        outcome: &ProbeOutcome,
    ) -> anyhow::Result<()>;
}

/// Sink that discards every outcome.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl OutcomeSink for NullSink {
    async fn deliver(
        &self,
        _target: &Username,
        _platform_id: &PlatformId,
        _outcome: &ProbeOutcome,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
