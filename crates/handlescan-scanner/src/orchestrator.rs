//! Scan orchestration for a single target.
//!
//! Fans the selected platforms out as concurrent probes, all admitted
//! through one shared governor, and folds their terminal outcomes into a
//! [`ScanResultSet`] in completion order. A scan never fails once
//! dispatched; per-probe trouble is absorbed into that probe's outcome.

use crate::cache::ResultCache;
use crate::error::{Result, ScanError};
use crate::filter::ProbeFilter;
use crate::governor::Governor;
use crate::identity::IdentitySelector;
use crate::outcome::{ProbeOutcome, ScanResultSet};
use crate::report::{LogReporter, NullSink, OutcomeSink, Reporter, ScanEvent};
use crate::retry::{run_probe, RetryPolicy};
use crate::transport::{HttpTransport, ProbeTransport};
use futures::stream::{FuturesUnordered, StreamExt};
use handlescan_core::{PlatformId, ScanConfig, Username};
use handlescan_probes::{ProbeDefinition, ProbeRegistry};
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Drives scans of one target across many platforms.
pub struct ScanOrchestrator {
    registry: Arc<ProbeRegistry>,
    transport: Arc<dyn ProbeTransport>,
    selector: Arc<IdentitySelector>,
    governor: Arc<Governor>,
    cache: Arc<ResultCache>,
    sink: Arc<dyn OutcomeSink>,
    reporter: Arc<dyn Reporter>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl ScanOrchestrator {
    /// Build an orchestrator over a validated configuration and registry,
    /// with the production HTTP transport and log-only reporting.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid.
    pub fn new(config: &ScanConfig, registry: ProbeRegistry) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            registry: Arc::new(registry),
            transport: Arc::new(HttpTransport::new()),
            selector: Arc::new(IdentitySelector::new(config)),
            governor: Arc::new(Governor::new(config)),
            cache: Arc::new(ResultCache::new()),
            sink: Arc::new(NullSink),
            reporter: Arc::new(LogReporter),
            policy: RetryPolicy::from_config(config),
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the transport. Used to scan through a scripted transport.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn ProbeTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Replace the outcome sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn OutcomeSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the event reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Share an existing governor, so several orchestrations honor one
    /// process-wide concurrency bound.
    #[must_use]
    pub fn with_governor(mut self, governor: Arc<Governor>) -> Self {
        self.governor = governor;
        self
    }

    /// Token that cancels in-flight scans when triggered.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The session result cache.
    #[must_use]
    pub fn cache(&self) -> Arc<ResultCache> {
        Arc::clone(&self.cache)
    }

    /// The shared governor.
    #[must_use]
    pub fn governor(&self) -> Arc<Governor> {
        Arc::clone(&self.governor)
    }

    /// The probe registry in use.
    #[must_use]
    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    /// Scan a raw handle across the filtered platforms.
    ///
    /// # Errors
    /// Returns error only for pre-dispatch problems: a malformed handle or
    /// an unknown platform in an explicit filter. Once dispatched, every
    /// probe resolves to an outcome inside the result set.
    pub async fn scan(&self, handle: &str, filter: &ProbeFilter) -> Result<ScanResultSet> {
        let target = Username::new(handle).map_err(|e| ScanError::Validation(e.to_string()))?;
        let definitions = filter.resolve(&self.registry)?;
        Ok(self.scan_target(&target, &definitions).await)
    }

    /// Scan a validated target across the given definitions.
    pub async fn scan_target(
        &self,
        target: &Username,
        definitions: &[&ProbeDefinition],
    ) -> ScanResultSet {
        let started = Instant::now();
        info!(target = %target, platforms = definitions.len(), "scan started");

        let mut probes: FuturesUnordered<_> = definitions
            .iter()
            .map(|definition| self.probe_one(target, definition))
            .collect();

        let mut results = ScanResultSet::new(target.clone());
        while let Some((platform_id, outcome, cache_hit)) = probes.next().await {
            results.push(platform_id, outcome, cache_hit);
        }

        results.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if self.cancel.is_cancelled() {
            let unresolved = results
                .outcomes
                .iter()
                .filter(|(_, o)| o.error.as_deref() == Some("scan cancelled"))
                .count();
            self.reporter.report(&ScanEvent::ScanCancelled { unresolved });
        }

        info!(
            target = %target,
            found = results.counts.found,
            cache_hits = results.cache_hits,
            elapsed_ms = results.elapsed_ms,
            "scan finished"
        );

        results
    }

    /// Resolve one platform probe, consulting the cache first.
    async fn probe_one(
        &self,
        target: &Username,
        definition: &ProbeDefinition,
    ) -> (PlatformId, ProbeOutcome, bool) {
        let platform_id = definition.id().clone();

        if let Some(cached) = self.cache.get(target, &platform_id) {
            self.reporter.report(&ScanEvent::CacheHit {
                platform_id: platform_id.clone(),
            });
            return (platform_id, cached, true);
        }

        let outcome = run_probe(
            definition,
            target,
            self.transport.as_ref(),
            &self.selector,
            &self.governor,
            self.reporter.as_ref(),
            &self.policy,
            &self.cancel,
        )
        .await;

        self.cache.put(target, &platform_id, &outcome);

        if let Err(e) = self.sink.deliver(target, &platform_id, &outcome).await {
            error!(platform = %platform_id, error = %e, "outcome sink delivery failed");
        }

        (platform_id, outcome, false)
    }
}
