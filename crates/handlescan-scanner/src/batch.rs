//! Multi-target batch coordination.
//!
//! Runs several targets through one orchestrator. Targets share the
//! governor, identity selector, and session cache, so a batch honors the
//! same process-wide limits as a single scan. Malformed handles are
//! rejected per entry without disturbing the rest of the batch.

use crate::error::Result;
use crate::filter::ProbeFilter;
use crate::orchestrator::ScanOrchestrator;
use crate::outcome::ScanResultSet;
use futures::stream::{FuturesUnordered, StreamExt};
use handlescan_core::Username;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one batch entry.
#[derive(Debug, Clone)]
pub enum BatchEntry {
    /// The target was scanned to completion
    Completed(ScanResultSet),
    /// The handle failed validation and was never dispatched
    Rejected {
        /// Why the handle was rejected
        reason: String,
    },
}

impl BatchEntry {
    /// The result set, when the entry completed.
    #[must_use]
    pub fn result_set(&self) -> Option<&ScanResultSet> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Rejected { .. } => None,
        }
    }
}

/// Coordinates scans of many targets over one shared orchestrator.
pub struct BatchCoordinator {
    orchestrator: Arc<ScanOrchestrator>,
}

impl BatchCoordinator {
    /// Wrap an orchestrator for batch use.
    #[must_use]
    pub fn new(orchestrator: Arc<ScanOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// The underlying orchestrator.
    #[must_use]
    pub fn orchestrator(&self) -> &ScanOrchestrator {
        &self.orchestrator
    }

    /// Scan every distinct handle in the batch.
    ///
    /// Duplicate handles collapse to one entry. Each malformed handle is
    /// recorded as [`BatchEntry::Rejected`]; the batch itself fails only
    /// when the platform filter cannot be resolved.
    ///
    /// # Errors
    /// Returns error if the filter names an unregistered platform.
    pub async fn scan_batch(
        &self,
        handles: &[String],
        filter: &ProbeFilter,
    ) -> Result<BTreeMap<String, BatchEntry>> {
        let definitions = filter.resolve(self.orchestrator.registry())?;

        let mut seen = HashSet::new();
        let mut entries = BTreeMap::new();
        let mut scans = FuturesUnordered::new();

        for handle in handles {
            if !seen.insert(handle.as_str()) {
                continue;
            }

            match Username::new(handle) {
                Ok(target) => {
                    let definitions = &definitions;
                    scans.push(async move {
                        let results = self
                            .orchestrator
                            .scan_target(&target, definitions)
                            .await;
                        (handle.clone(), results)
                    });
                }
                Err(e) => {
                    warn!(handle = %handle, error = %e, "batch entry rejected");
                    entries.insert(
                        handle.clone(),
                        BatchEntry::Rejected {
                            reason: e.to_string(),
                        },
                    );
                }
            }
        }

        let dispatched = scans.len();
        while let Some((handle, results)) = scans.next().await {
            entries.insert(handle, BatchEntry::Completed(results));
        }

        info!(
            entries = entries.len(),
            dispatched,
            rejected = entries.len() - dispatched,
            "batch finished"
        );

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttemptError;
    use crate::transport::{ProbeRequest, ProbeResponse, ProbeTransport};
    use async_trait::async_trait;
    use handlescan_core::{PlatformCategory, PlatformId, ProbeStatus, ScanConfig};
    use handlescan_probes::{
        HttpMethod, PlatformMetadata, ProbeDefinition, ProbeRegistry, RequestSpec,
        SuccessPredicate,
    };
    use std::collections::BTreeMap as Map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Transport that answers 200 for handles containing "taken",
    /// network-fails for handles containing "broken", 404 otherwise.
    struct HandleTransport {
        calls: AtomicUsize,
        delay_ms: u64,
    }

    impl HandleTransport {
        fn new(delay_ms: u64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                delay_ms,
            }
        }
    }

    #[async_trait]
    impl ProbeTransport for HandleTransport {
        async fn execute(
            &self,
            request: &ProbeRequest,
        ) -> std::result::Result<ProbeResponse, AttemptError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }

            if request.url.contains("broken") {
                return Err(AttemptError::Network("connection refused".to_string()));
            }
            let http_status = if request.url.contains("taken") { 200 } else { 404 };
            Ok(ProbeResponse {
                http_status,
                body: None,
            })
        }
    }

    fn definition(id: &str) -> ProbeDefinition {
        ProbeDefinition {
            platform: PlatformMetadata {
                id: PlatformId::new(id).expect("valid platform ID"),
                name: id.to_string(),
                category: PlatformCategory::Other,
            },
            request: RequestSpec {
                url_template: format!("https://{id}.example/{{username}}"),
                method: HttpMethod::Get,
                timeout_secs: None,
                headers: Map::new(),
            },
            predicate: SuccessPredicate::default(),
        }
    }

    fn coordinator(
        config: &ScanConfig,
        platform_ids: &[&str],
        transport: Arc<HandleTransport>,
    ) -> BatchCoordinator {
        let registry =
            ProbeRegistry::from_definitions(platform_ids.iter().map(|id| definition(id)).collect())
                .expect("build registry");
        let orchestrator = ScanOrchestrator::new(config, registry)
            .expect("build orchestrator")
            .with_transport(transport);
        BatchCoordinator::new(Arc::new(orchestrator))
    }

    fn quiet_config() -> ScanConfig {
        ScanConfig {
            inter_request_delay_ms: 0,
            retry_base_delay_secs: 0.0,
            ..ScanConfig::default()
        }
    }

    fn handles(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_batch_mixes_completed_and_rejected() {
        let transport = Arc::new(HandleTransport::new(0));
        let coordinator = coordinator(&quiet_config(), &["alpha", "beta"], transport);

        let entries = coordinator
            .scan_batch(
                &handles(&["taken-user", "bad username!", "free-user"]),
                &ProbeFilter::All,
            )
            .await
            .expect("batch succeeds");

        assert_eq!(entries.len(), 3);
        assert!(matches!(entries["bad username!"], BatchEntry::Rejected { .. }));

        let taken = entries["taken-user"].result_set().expect("completed");
        assert_eq!(taken.counts.found, 2);

        let free = entries["free-user"].result_set().expect("completed");
        assert_eq!(free.counts.not_found, 2);
    }

    #[tokio::test]
    async fn test_duplicate_handles_collapse() {
        let transport = Arc::new(HandleTransport::new(0));
        let coordinator = coordinator(&quiet_config(), &["alpha"], Arc::clone(&transport));

        let entries = coordinator
            .scan_batch(
                &handles(&["taken-user", "taken-user", "taken-user"]),
                &ProbeFilter::All,
            )
            .await
            .expect("batch succeeds");

        assert_eq!(entries.len(), 1);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_broken_target_does_not_affect_others() {
        let transport = Arc::new(HandleTransport::new(0));
        let coordinator = coordinator(&quiet_config(), &["alpha"], transport);

        let entries = coordinator
            .scan_batch(&handles(&["broken-user", "taken-user"]), &ProbeFilter::All)
            .await
            .expect("batch succeeds");

        let broken = entries["broken-user"].result_set().expect("completed");
        assert_eq!(broken.counts.error, 1);
        assert!(broken
            .get(&PlatformId::new("alpha").expect("valid platform ID"))
            .is_some_and(|o| o.status == ProbeStatus::Error));

        let taken = entries["taken-user"].result_set().expect("completed");
        assert_eq!(taken.counts.found, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_honors_shared_concurrency_bound() {
        let transport = Arc::new(HandleTransport::new(50));
        let config = ScanConfig {
            max_concurrency: 2,
            ..quiet_config()
        };
        let coordinator = coordinator(&config, &["alpha", "beta"], transport);

        coordinator
            .scan_batch(
                &handles(&["user-one", "user-two", "user-three"]),
                &ProbeFilter::All,
            )
            .await
            .expect("batch succeeds");

        // Six probes across three targets, never more than two in flight.
        assert_eq!(coordinator.orchestrator().governor().peak_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_batch_shares_session_cache() {
        let transport = Arc::new(HandleTransport::new(0));
        let coordinator = coordinator(&quiet_config(), &["alpha"], Arc::clone(&transport));

        coordinator
            .scan_batch(&handles(&["taken-user"]), &ProbeFilter::All)
            .await
            .expect("first batch");
        let entries = coordinator
            .scan_batch(&handles(&["taken-user"]), &ProbeFilter::All)
            .await
            .expect("second batch");

        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        let results = entries["taken-user"].result_set().expect("completed");
        assert_eq!(results.cache_hits, 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let transport = Arc::new(HandleTransport::new(0));
        let coordinator = coordinator(&quiet_config(), &["alpha"], transport);

        let entries = coordinator
            .scan_batch(&[], &ProbeFilter::All)
            .await
            .expect("empty batch succeeds");
        assert!(entries.is_empty());
    }
}
