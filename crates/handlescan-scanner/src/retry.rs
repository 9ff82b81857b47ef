//! Per-probe retry controller.
//!
//! Drives one probe to a terminal outcome: admits each attempt through the
//! governor, dispatches it under a fresh identity, classifies whatever
//! comes back, and backs off linearly between failed attempts. The
//! controller is infallible by construction; every path ends in a
//! [`ProbeOutcome`].

use crate::classify::{classify_failure, classify_response};
use crate::error::AttemptError;
use crate::governor::Governor;
use crate::identity::IdentitySelector;
use crate::outcome::ProbeOutcome;
use crate::report::{Reporter, ScanEvent};
use crate::transport::{ProbeRequest, ProbeTransport};
use handlescan_core::{ProbeStatus, ScanConfig, Username};
use handlescan_probes::ProbeDefinition;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Retry limits derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per probe, including the first
    pub max_attempts: u32,
    /// Base delay for linear backoff between attempts
    pub base_delay: Duration,
    /// Default per-attempt deadline, unless the platform overrides it
    pub request_timeout: Duration,
}

impl RetryPolicy {
    /// Derive the policy from a validated configuration.
    #[must_use]
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            max_attempts: config.retry_attempts,
            base_delay: Duration::from_secs_f64(config.retry_base_delay_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Linear backoff before the attempt following `failed_attempt`.
    #[must_use]
    pub fn backoff_after(&self, failed_attempt: u32) -> Duration {
        self.base_delay * failed_attempt
    }
}

/// Drive one probe to its terminal outcome.
#[allow(clippy::too_many_arguments)]
pub async fn run_probe(
    definition: &ProbeDefinition,
    target: &Username,
    transport: &dyn ProbeTransport,
    selector: &IdentitySelector,
    governor: &Governor,
    reporter: &dyn Reporter,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> ProbeOutcome {
    let url = definition.build_url(target);
    let timeout = definition
        .request
        .timeout_secs
        .map_or(policy.request_timeout, Duration::from_secs);
    let started = Instant::now();

    for attempt in 1..=policy.max_attempts {
        if cancel.is_cancelled() {
            return cancelled_outcome(started, attempt - 1);
        }

        let slot = tokio::select! {
            slot = governor.admit() => slot,
            () = cancel.cancelled() => {
                return cancelled_outcome(started, attempt - 1);
            }
        };

        let identity = selector.next();
        let request = ProbeRequest {
            method: definition.request.method,
            url: url.clone(),
            headers: definition
                .request
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            timeout,
            identity,
        };
        let proxy = request.identity.proxy.clone();

        let attempt_started = Instant::now();
        let result = tokio::select! {
            result = tokio::time::timeout(timeout, transport.execute(&request)) => {
                result.unwrap_or(Err(AttemptError::Timeout))
            }
            () = cancel.cancelled() => {
                return cancelled_outcome(started, attempt);
            }
        };
        let elapsed_ms = elapsed_millis(attempt_started);
        drop(slot);

        match result {
            Ok(response) => {
                if let Some(proxy) = &proxy {
                    selector.record_proxy_success(proxy);
                }

                let status = classify_response(&definition.predicate, response.http_status);
                if status == ProbeStatus::RateLimited {
                    selector.note_rate_limited();
                    reporter.report(&ScanEvent::RateLimitObserved {
                        platform_id: definition.id().clone(),
                    });
                }

                return ProbeOutcome::from_response(
                    status,
                    response.http_status,
                    elapsed_ms,
                    response.body.as_deref(),
                    attempt,
                );
            }
            Err(error) => {
                debug!(
                    platform = %definition.id(),
                    attempt,
                    error = %error,
                    "probe attempt failed"
                );

                if let (Some(proxy), AttemptError::Network(_)) = (&proxy, &error) {
                    if selector.record_proxy_failure(proxy) {
                        reporter.report(&ScanEvent::ProxyDegraded {
                            proxy: proxy.clone(),
                        });
                        if selector.proxy_pool_exhausted() {
                            reporter.report(&ScanEvent::ProxyPoolExhausted);
                        }
                    }
                }

                if attempt == policy.max_attempts {
                    reporter.report(&ScanEvent::RetriesExhausted {
                        platform_id: definition.id().clone(),
                        attempts: attempt,
                    });
                    return ProbeOutcome::from_failure(
                        classify_failure(&error),
                        error.to_string(),
                        elapsed_ms,
                        attempt,
                    );
                }

                tokio::select! {
                    () = tokio::time::sleep(policy.backoff_after(attempt)) => {}
                    () = cancel.cancelled() => {
                        return cancelled_outcome(started, attempt);
                    }
                }
            }
        }
    }

    unreachable!("retry loop returns a terminal outcome on its last attempt")
}

fn cancelled_outcome(started: Instant, attempts: u32) -> ProbeOutcome {
    ProbeOutcome::from_failure(
        ProbeStatus::Error,
        "scan cancelled".to_string(),
        elapsed_millis(started),
        attempts,
    )
}

fn elapsed_millis(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
