//! Outcome classification.
//!
//! Maps a raw HTTP status code (or an attempt failure) to a terminal
//! [`ProbeStatus`], consulting the platform's status-code predicate.

use crate::error::AttemptError;
use handlescan_core::ProbeStatus;
use handlescan_probes::SuccessPredicate;
use tracing::debug;

/// HTTP 429 Too Many Requests.
const STATUS_RATE_LIMITED: u16 = 429;

/// Classify a definitive HTTP response.
///
/// A 429 is always rate limiting, regardless of the predicate. Codes the
/// predicate does not recognize fall back on the class of the code: other
/// 4xx responses read as an absent profile, anything else is a probe
/// failure.
#[must_use]
pub fn classify_response(predicate: &SuccessPredicate, http_status: u16) -> ProbeStatus {
    if http_status == STATUS_RATE_LIMITED {
        return ProbeStatus::RateLimited;
    }

    if let Some(status) = predicate.status_for(http_status) {
        return status;
    }

    debug!(http_status, "status code outside predicate lists");

    if (400..500).contains(&http_status) {
        ProbeStatus::NotFound
    } else {
        ProbeStatus::Error
    }
}

/// Classify a failed attempt once retries are exhausted.
#[must_use]
pub fn classify_failure(error: &AttemptError) -> ProbeStatus {
    match error {
        AttemptError::Network(_) => ProbeStatus::Error,
        AttemptError::Timeout => ProbeStatus::Timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn predicate() -> SuccessPredicate {
        SuccessPredicate {
            found: vec![200],
            not_found: vec![404],
        }
    }

    #[test]
    fn test_predicate_hits() {
        let p = predicate();
        assert_eq!(classify_response(&p, 200), ProbeStatus::Found);
        assert_eq!(classify_response(&p, 404), ProbeStatus::NotFound);
    }

    #[test]
    fn test_rate_limit_overrides_predicate() {
        // Even a predicate that listed 429 could not claim it; validation
        // rejects such predicates, and classification short-circuits first.
        let p = predicate();
        assert_eq!(classify_response(&p, 429), ProbeStatus::RateLimited);
    }

    #[test]
    fn test_unlisted_4xx_reads_as_not_found() {
        let p = predicate();
        assert_eq!(classify_response(&p, 403), ProbeStatus::NotFound);
        assert_eq!(classify_response(&p, 410), ProbeStatus::NotFound);
    }

    #[test]
    fn test_unlisted_non_4xx_reads_as_error() {
        let p = predicate();
        assert_eq!(classify_response(&p, 500), ProbeStatus::Error);
        assert_eq!(classify_response(&p, 301), ProbeStatus::Error);
        assert_eq!(classify_response(&p, 503), ProbeStatus::Error);
    }

    #[test]
    fn test_custom_predicate_lists() {
        let p = SuccessPredicate {
            found: vec![200, 301],
            not_found: vec![404, 403],
        };
        assert_eq!(classify_response(&p, 301), ProbeStatus::Found);
        assert_eq!(classify_response(&p, 403), ProbeStatus::NotFound);
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(
            classify_failure(&AttemptError::Network("refused".to_string())),
            ProbeStatus::Error
        );
        assert_eq!(classify_failure(&AttemptError::Timeout), ProbeStatus::Timeout);
    }
}
