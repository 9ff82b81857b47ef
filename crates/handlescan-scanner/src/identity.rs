//! Evasion identity pools and rotation.
//!
//! Every attempt dispatches under a fresh identity: a user-agent, an
//! optional referer, an optional proxy, the TLS and DNS posture, and a
//! baseline browser header set. Rotation spreads probes across the pools
//! so a platform sees no single repeated fingerprint.

use handlescan_core::{RotationPolicy, ScanConfig, TlsVerify};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Baseline headers attached to every probe request.
const BASELINE_HEADERS: &[(&str, &str)] = &[
    ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("DNT", "1"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// The request identity for one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvasionIdentity {
    /// User-agent string for this attempt
    pub user_agent: String,
    /// Full referer URL, when a referer domain pool is configured
    pub referer: Option<String>,
    /// Proxy endpoint, when a healthy proxy is available
    pub proxy: Option<String>,
    /// TLS certificate verification mode
    pub tls_verify: TlsVerify,
    /// DNS resolution override for the probed host
    pub dns_override: Option<SocketAddr>,
}

impl EvasionIdentity {
    /// Baseline browser headers common to all identities.
    #[must_use]
    pub fn baseline_headers() -> Vec<(String, String)> {
        BASELINE_HEADERS
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }
}

/// Per-entry usage snapshot of the rotation pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolUsage {
    /// Selections per user-agent
    pub user_agents: Vec<(String, u64)>,
    /// Selections per referer domain
    pub referers: Vec<(String, u64)>,
    /// Selections per proxy endpoint
    pub proxies: Vec<(String, u64)>,
}

#[derive(Debug, Default)]
struct RotationState {
    agent_cursor: usize,
    referer_cursor: usize,
    proxy_cursor: usize,
    /// Selections per pool entry, aligned to the pool indices
    agent_usage: Vec<u64>,
    referer_usage: Vec<u64>,
    proxy_usage: Vec<u64>,
    /// Index of the agent handed out most recently
    last_agent: Option<usize>,
    /// Set after a rate-limit observation; the next pick avoids `last_agent`
    avoid_last_agent: bool,
    /// Consecutive connect failures per proxy
    proxy_failures: HashMap<String, u32>,
    /// Proxies excluded for the rest of the session
    degraded: HashSet<String>,
    /// Identities handed out without a proxy because the pool was exhausted
    no_proxy_fallbacks: u64,
}

/// Thread-safe selector that assembles a fresh [`EvasionIdentity`] per
/// attempt from the configured pools.
#[derive(Debug)]
pub struct IdentitySelector {
    user_agents: Vec<String>,
    referer_domains: Vec<String>,
    proxies: Vec<String>,
    policy: RotationPolicy,
    failure_threshold: u32,
    tls_verify: TlsVerify,
    dns_override: Option<SocketAddr>,
    state: Mutex<RotationState>,
}

impl IdentitySelector {
    /// Build a selector from a validated configuration's pools.
    #[must_use]
    pub fn new(config: &ScanConfig) -> Self {
        let state = RotationState {
            agent_usage: vec![0; config.user_agent_pool.len()],
            referer_usage: vec![0; config.referer_domain_pool.len()],
            proxy_usage: vec![0; config.proxy_pool.len()],
            ..RotationState::default()
        };

        Self {
            user_agents: config.user_agent_pool.clone(),
            referer_domains: config.referer_domain_pool.clone(),
            proxies: config.proxy_pool.clone(),
            policy: config.rotation_policy,
            failure_threshold: config.proxy_failure_threshold,
            tls_verify: config.tls_verify,
            dns_override: config.dns_override.as_deref().and_then(|s| s.parse().ok()),
            state: Mutex::new(state),
        }
    }

    /// Assemble the identity for the next attempt.
    pub fn next(&self) -> EvasionIdentity {
        let mut state = self.state.lock().expect("acquire rotation state lock");

        let agent_index = self.pick_agent(&mut state);
        state.agent_usage[agent_index] += 1;
        state.last_agent = Some(agent_index);
        state.avoid_last_agent = false;

        let referer = if self.referer_domains.is_empty() {
            None
        } else {
            let index = match self.policy {
                RotationPolicy::RoundRobin => {
                    let i = state.referer_cursor % self.referer_domains.len();
                    state.referer_cursor = state.referer_cursor.wrapping_add(1);
                    i
                }
                RotationPolicy::Random => {
                    rand::thread_rng().gen_range(0..self.referer_domains.len())
                }
            };
            state.referer_usage[index] += 1;
            Some(format!("https://{}/", self.referer_domains[index]))
        };

        let proxy = self.pick_proxy(&mut state);
        if let Some(proxy) = &proxy {
            let index = self
                .proxies
                .iter()
                .position(|p| p == proxy)
                .expect("picked proxy is in the configured pool");
            state.proxy_usage[index] += 1;
        }

        EvasionIdentity {
            user_agent: self.user_agents[agent_index].clone(),
            referer,
            proxy,
            tls_verify: self.tls_verify,
            dns_override: self.dns_override,
        }
    }

    /// After a rate-limit observation, bias the next pick away from the
    /// user-agent that drew it.
    pub fn note_rate_limited(&self) {
        let mut state = self.state.lock().expect("acquire rotation state lock");
        state.avoid_last_agent = true;
    }

    /// Record a connect-level failure through a proxy.
    ///
    /// Returns `true` when this failure crossed the threshold and the proxy
    /// was excluded for the rest of the session.
    pub fn record_proxy_failure(&self, proxy: &str) -> bool {
        let mut state = self.state.lock().expect("acquire rotation state lock");

        let failures = state.proxy_failures.entry(proxy.to_string()).or_insert(0);
        *failures += 1;
        let count = *failures;

        if count >= self.failure_threshold && state.degraded.insert(proxy.to_string()) {
            warn!(proxy, failures = count, "proxy excluded for the session");
            return true;
        }

        debug!(proxy, failures = count, "proxy connect failure recorded");
        false
    }

    /// Record a successful connection through a proxy, resetting its
    /// consecutive-failure count. Exclusion is permanent for the session.
    pub fn record_proxy_success(&self, proxy: &str) {
        let mut state = self.state.lock().expect("acquire rotation state lock");
        state.proxy_failures.remove(proxy);
    }

    /// Per-entry usage counters for every pool, for diagnostics.
    pub fn usage_snapshot(&self) -> PoolUsage {
        let state = self.state.lock().expect("acquire rotation state lock");

        let zip = |pool: &[String], usage: &[u64]| {
            pool.iter()
                .cloned()
                .zip(usage.iter().copied())
                .collect::<Vec<_>>()
        };

        PoolUsage {
            user_agents: zip(&self.user_agents, &state.agent_usage),
            referers: zip(&self.referer_domains, &state.referer_usage),
            proxies: zip(&self.proxies, &state.proxy_usage),
        }
    }

    /// Identities handed out without a proxy because every configured proxy
    /// was excluded.
    pub fn no_proxy_fallbacks(&self) -> u64 {
        let state = self.state.lock().expect("acquire rotation state lock");
        state.no_proxy_fallbacks
    }

    /// Whether the proxy pool is configured but fully excluded.
    pub fn proxy_pool_exhausted(&self) -> bool {
        if self.proxies.is_empty() {
            return false;
        }
        let state = self.state.lock().expect("acquire rotation state lock");
        self.proxies.iter().all(|p| state.degraded.contains(p))
    }

    fn pick_agent(&self, state: &mut RotationState) -> usize {
        let len = self.user_agents.len();
        if len == 1 {
            return 0;
        }

        let avoid = if state.avoid_last_agent {
            state.last_agent
        } else {
            None
        };

        match self.policy {
            RotationPolicy::RoundRobin => {
                let mut index = state.agent_cursor % len;
                state.agent_cursor = state.agent_cursor.wrapping_add(1);
                if Some(index) == avoid {
                    index = state.agent_cursor % len;
                    state.agent_cursor = state.agent_cursor.wrapping_add(1);
                }
                index
            }
            RotationPolicy::Random => {
                let mut rng = rand::thread_rng();
                loop {
                    let index = rng.gen_range(0..len);
                    if Some(index) != avoid {
                        return index;
                    }
                }
            }
        }
    }

    fn pick_proxy(&self, state: &mut RotationState) -> Option<String> {
        if self.proxies.is_empty() {
            return None;
        }

        let healthy: Vec<&String> = self
            .proxies
            .iter()
            .filter(|p| !state.degraded.contains(p.as_str()))
            .collect();

        if healthy.is_empty() {
            state.no_proxy_fallbacks += 1;
            debug!("proxy pool exhausted, connecting directly");
            return None;
        }

        let index = match self.policy {
            RotationPolicy::RoundRobin => {
                let i = state.proxy_cursor % healthy.len();
                state.proxy_cursor = state.proxy_cursor.wrapping_add(1);
                i
            }
            RotationPolicy::Random => rand::thread_rng().gen_range(0..healthy.len()),
        };

        Some(healthy[index].clone())
    }
}
