//! Probe outcomes and per-target result sets.

use chrono::{DateTime, Utc};
use handlescan_core::{PlatformId, ProbeStatus, Username};
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from a response body.
pub const PREVIEW_LIMIT: usize = 500;

/// Result of one completed probe for one (target, platform) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Terminal status
    pub status: ProbeStatus,
    /// Raw HTTP status code, when a response was received
    pub http_status: Option<u16>,
    /// Elapsed time of the deciding attempt, in milliseconds
    pub elapsed_ms: u64,
    /// Truncated response body preview
    pub content_preview: Option<String>,
    /// Error description, when the probe did not get a definitive response
    pub error: Option<String>,
    /// Attempts consumed, including the deciding one
    pub attempts: u32,
    /// Completion timestamp
    pub timestamp: DateTime<Utc>,
}

impl ProbeOutcome {
    /// Outcome for a definitive HTTP response.
    #[must_use]
    pub fn from_response(
        status: ProbeStatus,
        http_status: u16,
        elapsed_ms: u64,
        body: Option<&str>,
        attempts: u32,
    ) -> Self {
        Self {
            status,
            http_status: Some(http_status),
            elapsed_ms,
            content_preview: body.map(truncate_preview),
            error: None,
            attempts,
            timestamp: Utc::now(),
        }
    }

    /// Terminal outcome for an exhausted or cancelled probe.
    #[must_use]
    pub fn from_failure(status: ProbeStatus, error: String, elapsed_ms: u64, attempts: u32) -> Self {
        Self {
            status,
            http_status: None,
            elapsed_ms,
            content_preview: None,
            error: Some(error),
            attempts,
            timestamp: Utc::now(),
        }
    }
}

/// Truncate a response body to [`PREVIEW_LIMIT`] characters.
fn truncate_preview(body: &str) -> String {
    body.chars().take(PREVIEW_LIMIT).collect()
}

/// Aggregate status counts for one result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Profiles found
    pub found: usize,
    /// Handles not registered
    pub not_found: usize,
    /// Rate-limited probes
    pub rate_limited: usize,
    /// Timed-out probes
    pub timeout: usize,
    /// Failed probes
    pub error: usize,
}

impl StatusCounts {
    /// Record one terminal status.
    pub fn record(&mut self, status: ProbeStatus) {
        match status {
            ProbeStatus::Found => self.found += 1,
            ProbeStatus::NotFound => self.not_found += 1,
            ProbeStatus::RateLimited => self.rate_limited += 1,
            ProbeStatus::Timeout => self.timeout += 1,
            ProbeStatus::Error | ProbeStatus::Pending => self.error += 1,
        }
    }

    /// Total recorded outcomes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.found + self.not_found + self.rate_limited + self.timeout + self.error
    }
}

/// Result set for one target across all probed platforms.
///
/// Outcomes are stored in completion order, which follows real-world
/// latency, not dispatch order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResultSet {
    /// The handle that was scanned
    pub target: Username,
    /// Outcomes in completion order
    pub outcomes: Vec<(PlatformId, ProbeOutcome)>,
    /// Aggregate status counts
    pub counts: StatusCounts,
    /// Probes answered from the session cache
    pub cache_hits: usize,
    /// Wall-clock duration of the whole scan, in milliseconds
    pub elapsed_ms: u64,
}

impl ScanResultSet {
    /// Create an empty result set for a target.
    #[must_use]
    pub fn new(target: Username) -> Self {
        Self {
            target,
            outcomes: Vec::new(),
            counts: StatusCounts::default(),
            cache_hits: 0,
            elapsed_ms: 0,
        }
    }

    /// Append a completed outcome.
    pub fn push(&mut self, platform_id: PlatformId, outcome: ProbeOutcome, cache_hit: bool) {
        self.counts.record(outcome.status);
        if cache_hit {
            self.cache_hits += 1;
        }
        self.outcomes.push((platform_id, outcome));
    }

    /// Look up the outcome for a platform.
    #[must_use]
    pub fn get(&self, platform_id: &PlatformId) -> Option<&ProbeOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == platform_id)
            .map(|(_, outcome)| outcome)
    }

    /// Number of platform outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the result set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether every outcome carries a terminal status.
    #[must_use]
    pub fn all_terminal(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| o.status.is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlescan_core::ProbeStatus;

    fn platform(id: &str) -> PlatformId {
        PlatformId::new(id).expect("valid platform ID")
    }

    #[test]
    fn test_preview_truncation() {
        let long_body = "x".repeat(2000);
        let outcome =
            ProbeOutcome::from_response(ProbeStatus::Found, 200, 12, Some(&long_body), 1);

        let preview = outcome.content_preview.expect("preview present");
        assert_eq!(preview.chars().count(), PREVIEW_LIMIT);
    }

    #[test]
    fn test_preview_short_body_kept_whole() {
        let outcome = ProbeOutcome::from_response(ProbeStatus::Found, 200, 12, Some("short"), 1);
        assert_eq!(outcome.content_preview.as_deref(), Some("short"));
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = ProbeOutcome::from_failure(
            ProbeStatus::Timeout,
            "attempt deadline exceeded".to_string(),
            30_000,
            3,
        );
        assert_eq!(outcome.status, ProbeStatus::Timeout);
        assert_eq!(outcome.http_status, None);
        assert_eq!(outcome.attempts, 3);
        assert!(outcome.error.is_some());
    }

    #[test]
    fn test_status_counts() {
        let mut counts = StatusCounts::default();
        counts.record(ProbeStatus::Found);
        counts.record(ProbeStatus::Found);
        counts.record(ProbeStatus::NotFound);
        counts.record(ProbeStatus::RateLimited);
        counts.record(ProbeStatus::Timeout);
        counts.record(ProbeStatus::Error);

        assert_eq!(counts.found, 2);
        assert_eq!(counts.not_found, 1);
        assert_eq!(counts.rate_limited, 1);
        assert_eq!(counts.timeout, 1);
        assert_eq!(counts.error, 1);
        assert_eq!(counts.total(), 6);
    }

    #[test]
    fn test_result_set_completion_order_and_counts() {
        let target = Username::new("johndoe").expect("valid handle");
        let mut results = ScanResultSet::new(target);

        results.push(
            platform("slow-platform"),
            ProbeOutcome::from_response(ProbeStatus::NotFound, 404, 90, None, 1),
            false,
        );
        results.push(
            platform("fast-platform"),
            ProbeOutcome::from_response(ProbeStatus::Found, 200, 10, None, 1),
            true,
        );

        // Completion order preserved, not id order
        assert_eq!(results.outcomes[0].0.as_str(), "slow-platform");
        assert_eq!(results.len(), 2);
        assert_eq!(results.cache_hits, 1);
        assert_eq!(results.counts.found, 1);
        assert_eq!(results.counts.not_found, 1);
        assert!(results.all_terminal());

        let found = results.get(&platform("fast-platform")).expect("lookup");
        assert_eq!(found.status, ProbeStatus::Found);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ProbeOutcome::from_response(ProbeStatus::Found, 200, 42, Some("body"), 2);
        let json = serde_json::to_string(&outcome).expect("serialize outcome");
        let parsed: ProbeOutcome = serde_json::from_str(&json).expect("deserialize outcome");
        assert_eq!(parsed, outcome);
    }
}
