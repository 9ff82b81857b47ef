//! HTTP transport for probe attempts.

use crate::error::AttemptError;
use crate::identity::EvasionIdentity;
use handlescan_core::TlsVerify;
use handlescan_probes::HttpMethod;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// One fully-specified probe attempt, ready to dispatch.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Request method
    pub method: HttpMethod,
    /// Fully-substituted profile URL
    pub url: String,
    /// Platform-specific extra headers
    pub headers: Vec<(String, String)>,
    /// Hard deadline for this attempt
    pub timeout: Duration,
    /// Identity to dispatch under
    pub identity: EvasionIdentity,
}

/// Definitive response to a probe attempt.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// HTTP status code
    pub http_status: u16,
    /// Response body, when one was requested and readable
    pub body: Option<String>,
}

/// Dispatches probe attempts over the network.
///
/// The trait seam exists so orchestration and retry logic can be exercised
/// against scripted transports.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Execute one attempt. Any HTTP response is a success; only
    /// connection-level failures and deadline misses are errors.
    async fn execute(&self, request: &ProbeRequest) -> Result<ProbeResponse, AttemptError>;
}

/// Production transport backed by `reqwest`.
///
/// A fresh client is built per attempt so the proxy, user-agent, and TLS
/// and DNS posture follow the rotated identity instead of a long-lived
/// connection pool.
#[derive(Debug, Default)]
pub struct HttpTransport;

impl HttpTransport {
    /// Build the transport.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn build_client(&self, request: &ProbeRequest) -> Result<reqwest::Client, AttemptError> {
        let identity = &request.identity;

        let mut builder = reqwest::Client::builder()
            .user_agent(identity.user_agent.clone())
            .timeout(request.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(identity.tls_verify == TlsVerify::Relaxed);

        if let Some(proxy) = &identity.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| AttemptError::Network(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        if let Some(addr) = identity.dns_override {
            if let Ok(url) = reqwest::Url::parse(&request.url) {
                if let Some(host) = url.host_str() {
                    builder = builder.resolve(host, addr);
                }
            }
        }

        builder
            .build()
            .map_err(|e| AttemptError::Network(format!("client build failed: {e}")))
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn execute(&self, request: &ProbeRequest) -> Result<ProbeResponse, AttemptError> {
        let client = self.build_client(request)?;

        let mut builder = match request.method {
            HttpMethod::Get => client.get(&request.url),
            HttpMethod::Head => client.head(&request.url),
        };

        for (name, value) in EvasionIdentity::baseline_headers() {
            builder = builder.header(name, value);
        }
        if let Some(referer) = &request.identity.referer {
            builder = builder.header("Referer", referer.clone());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Timeout
            } else {
                AttemptError::Network(e.to_string())
            }
        })?;

        let http_status = response.status().as_u16();
        debug!(url = %request.url, http_status, "probe response received");

        let body = match request.method {
            HttpMethod::Head => None,
            HttpMethod::Get => response.text().await.ok(),
        };

        Ok(ProbeResponse { http_status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProbeRequest {
        ProbeRequest {
            method: HttpMethod::Get,
            url: "https://example.com/johndoe".to_string(),
            headers: Vec::new(),
            timeout: Duration::from_secs(30),
            identity: EvasionIdentity {
                user_agent: "agent-a".to_string(),
                referer: None,
                proxy: None,
                tls_verify: TlsVerify::Strict,
                dns_override: None,
            },
        }
    }

    #[test]
    fn test_client_builds_with_plain_identity() {
        let transport = HttpTransport::new();
        assert!(transport.build_client(&request()).is_ok());
    }

    #[test]
    fn test_client_builds_with_proxy_identity() {
        let transport = HttpTransport::new();
        let mut req = request();
        req.identity.proxy = Some("http://127.0.0.1:8080".to_string());
        assert!(transport.build_client(&req).is_ok());
    }

    #[test]
    fn test_client_builds_with_tls_and_dns_posture() {
        let transport = HttpTransport::new();
        let mut req = request();
        req.identity.tls_verify = TlsVerify::Relaxed;
        req.identity.dns_override = Some("127.0.0.1:9053".parse().expect("valid socket address"));
        assert!(transport.build_client(&req).is_ok());
    }

    #[test]
    fn test_malformed_proxy_is_attempt_error() {
        let transport = HttpTransport::new();
        let mut req = request();
        req.identity.proxy = Some("::not a proxy::".to_string());
        assert!(matches!(
            transport.build_client(&req),
            Err(AttemptError::Network(_))
        ));
    }
}
