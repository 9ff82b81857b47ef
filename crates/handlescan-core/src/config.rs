//! Scanner configuration.
//!
//! Provides the validated configuration consumed by the scanning core, with
//! TOML (de)serialization and environment variable overrides. Process-level
//! configuration discovery (paths, profiles) belongs to the embedding
//! application; the core only defines the recognized options and their
//! allowed ranges.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// TLS certificate verification mode for probe requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsVerify {
    /// Verify certificates normally
    Strict,
    /// Accept invalid certificates (interception-heavy environments)
    Relaxed,
}

/// How pool entries are selected when building an evasion identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Cycle through the pool in order
    RoundRobin,
    /// Pick uniformly at random
    Random,
}

/// Scanning behavior settings.
///
/// All ranges are enforced by [`ScanConfig::validate`], which is called
/// before a scanner is constructed; an out-of-range value is fatal at
/// startup, never deferred to first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum simultaneously in-flight probe attempts (1-20)
    pub max_concurrency: usize,
    /// Hard per-attempt timeout in seconds (5-60), unless a platform overrides it
    pub request_timeout_secs: u64,
    /// Attempts per probe including the first (1-5)
    pub retry_attempts: u32,
    /// Base delay for linear retry backoff, in seconds
    pub retry_base_delay_secs: f64,
    /// Minimum spacing between any two attempt dispatches, process-wide
    pub inter_request_delay_ms: u64,
    /// Proxy endpoints to rotate through (empty = direct connections)
    pub proxy_pool: Vec<String>,
    /// User-agent strings to rotate through
    pub user_agent_pool: Vec<String>,
    /// Referer domains to rotate through
    pub referer_domain_pool: Vec<String>,
    /// TLS certificate verification mode
    pub tls_verify: TlsVerify,
    /// Override DNS resolution with this `host:port` socket address
    pub dns_override: Option<String>,
    /// Pool rotation policy
    pub rotation_policy: RotationPolicy,
    /// Consecutive connect failures before a proxy is excluded for the session
    pub proxy_failure_threshold: u32,
}

/// Browser user-agents shipped as the default rotation pool.
const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// Referer domains shipped as the default rotation pool.
const DEFAULT_REFERER_DOMAINS: &[&str] =
    &["www.google.com", "www.bing.com", "duckduckgo.com"];

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 10,
            request_timeout_secs: 30,
            retry_attempts: 3,
            retry_base_delay_secs: 1.0,
            inter_request_delay_ms: 100,
            proxy_pool: Vec::new(),
            user_agent_pool: DEFAULT_USER_AGENTS.iter().map(ToString::to_string).collect(),
            referer_domain_pool: DEFAULT_REFERER_DOMAINS
                .iter()
                .map(ToString::to_string)
                .collect(),
            tls_verify: TlsVerify::Strict,
            dns_override: None,
            rotation_policy: RotationPolicy::RoundRobin,
            proxy_failure_threshold: 3,
        }
    }
}

impl ScanConfig {
    /// Parse a configuration from a TOML string and validate it.
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or any value is out of range.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `HANDLESCAN_MAX_CONCURRENCY`: Override the concurrency bound
    /// - `HANDLESCAN_REQUEST_TIMEOUT_SECS`: Override the per-attempt timeout
    /// - `HANDLESCAN_TLS_VERIFY`: `strict` or `relaxed`
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("HANDLESCAN_MAX_CONCURRENCY") {
            if let Ok(limit) = val.parse() {
                self.max_concurrency = limit;
                tracing::debug!("Override max_concurrency from env: {}", limit);
            }
        }

        if let Ok(val) = std::env::var("HANDLESCAN_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.request_timeout_secs = secs;
                tracing::debug!("Override request_timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("HANDLESCAN_TLS_VERIFY") {
            match val.as_str() {
                "strict" => self.tls_verify = TlsVerify::Strict,
                "relaxed" => self.tls_verify = TlsVerify::Relaxed,
                other => tracing::warn!("Ignoring unknown HANDLESCAN_TLS_VERIFY: {}", other),
            }
        }

        self
    }

    /// Validate every configured value against its allowed range.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=20).contains(&self.max_concurrency) {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrency".to_string(),
                reason: format!("must be 1-20, got {}", self.max_concurrency),
            });
        }

        if !(5..=60).contains(&self.request_timeout_secs) {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs".to_string(),
                reason: format!("must be 5-60, got {}", self.request_timeout_secs),
            });
        }

        if !(1..=5).contains(&self.retry_attempts) {
            return Err(ConfigError::InvalidValue {
                field: "retry_attempts".to_string(),
                reason: format!("must be 1-5, got {}", self.retry_attempts),
            });
        }

        if !self.retry_base_delay_secs.is_finite() || self.retry_base_delay_secs < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry_base_delay_secs".to_string(),
                reason: format!(
                    "must be a non-negative number, got {}",
                    self.retry_base_delay_secs
                ),
            });
        }

        if self.user_agent_pool.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent_pool".to_string(),
                reason: "at least one user-agent is required".to_string(),
            });
        }

        if self.proxy_failure_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "proxy_failure_threshold".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if let Some(dns) = &self.dns_override {
            if dns.parse::<std::net::SocketAddr>().is_err() {
                return Err(ConfigError::InvalidValue {
                    field: "dns_override".to_string(),
                    reason: format!("not a socket address: {dns}"),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_concurrency, 10);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.inter_request_delay_ms, 100);
        assert_eq!(config.tls_verify, TlsVerify::Strict);
        assert!(!config.user_agent_pool.is_empty());
    }

    #[test]
    fn test_range_validation() {
        let mut config = ScanConfig {
            max_concurrency: 0,
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());

        config.max_concurrency = 21;
        assert!(config.validate().is_err());

        config.max_concurrency = 20;
        assert!(config.validate().is_ok());

        config.request_timeout_secs = 4;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 61;
        assert!(config.validate().is_err());

        config.request_timeout_secs = 5;
        config.retry_attempts = 6;
        assert!(config.validate().is_err());

        config.retry_attempts = 1;
        config.retry_base_delay_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dns_override_must_be_socket_address() {
        let mut config = ScanConfig {
            dns_override: Some("not-an-address".to_string()),
            ..ScanConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.dns_override = Some("127.0.0.1:9053".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_user_agent_pool_rejected() {
        let config = ScanConfig {
            user_agent_pool: Vec::new(),
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial() {
        let toml_str = r#"
max_concurrency = 4
tls_verify = "relaxed"
proxy_pool = ["http://127.0.0.1:8080"]
"#;

        let config = ScanConfig::from_toml_str(toml_str).expect("parse partial config");
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.tls_verify, TlsVerify::Relaxed);
        assert_eq!(config.proxy_pool.len(), 1);
        // These should be defaults
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.inter_request_delay_ms, 100);
    }

    #[test]
    fn test_from_toml_rejects_out_of_range() {
        let toml_str = "max_concurrency = 50";
        let result = ScanConfig::from_toml_str(toml_str);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_config_round_trip() {
        let config = ScanConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        let parsed = ScanConfig::from_toml_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.max_concurrency, config.max_concurrency);
        assert_eq!(parsed.user_agent_pool, config.user_agent_pool);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("HANDLESCAN_MAX_CONCURRENCY", "7");
        std::env::set_var("HANDLESCAN_TLS_VERIFY", "relaxed");

        let config = ScanConfig::default().with_env_overrides();
        assert_eq!(config.max_concurrency, 7);
        assert_eq!(config.tls_verify, TlsVerify::Relaxed);

        std::env::remove_var("HANDLESCAN_MAX_CONCURRENCY");
        std::env::remove_var("HANDLESCAN_TLS_VERIFY");
    }
}
