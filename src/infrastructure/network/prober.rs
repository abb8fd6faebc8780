//! Outbound HTTP reachability probe (HEAD, falling back to GET).

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Method};
use url::Url;

/// Maximum redirect hops followed by a probe.
const MAX_REDIRECTS: usize = 10;

/// One probe of a target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub url: Url,
    /// Budget of each attempt; HEAD and GET get one each.
    pub timeout: Duration,
    /// When non-empty, the URL host is connected to these addresses
    /// instead of being resolved again.
    pub pinned: Vec<SocketAddr>,
}

/// HTTP method of a probe attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Head => write!(f, "HEAD"),
            Self::Get => write!(f, "GET"),
        }
    }
}

/// Successful probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reachable {
    pub method: ProbeMethod,
    pub status: u16,
}

/// Why a single attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Timeout(Duration),
    Status(u16),
    Transport(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Timeout(budget) => write!(f, "timed out after {}ms", budget.as_millis()),
            Self::Status(status) => write!(f, "returned HTTP {status}"),
            Self::Transport(e) => write!(f, "request failed: {e}"),
        }
    }
}

/// Both probe attempts failed, or the probe could not be set up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("HEAD {head}; GET {get}")]
    Unreachable {
        head: AttemptFailure,
        get: AttemptFailure,
    },

    #[error("probe client setup failed: {0}")]
    Client(String),
}

/// Confirms that a target URL answers HTTP requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Probes `request.url`; see [`HttpProber`] for the attempt sequence.
    async fn probe(&self, request: ProbeRequest) -> Result<Reachable, ProbeError>;
}

/// [`ReachabilityProbe`] built on `reqwest`.
///
/// Sends HEAD first, following up to 10 redirects, and treats a final status
/// in `[200, 400)` as reachable. Any other outcome (status, transport error
/// or timeout) triggers a GET with a fresh timeout. Attempts never overlap.
///
/// A pinned probe only follows redirects that stay on the pinned host; a hop
/// to any other host fails the attempt as a transport error.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
    user_agent: String,
}

impl HttpProber {
    /// Creates a prober identifying itself with `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns a `reqwest::Error` if the TLS backend cannot be initialized.
    pub fn new(user_agent: impl Into<String>) -> Result<Self, reqwest::Error> {
        let user_agent = user_agent.into();
        let client = Self::builder(&user_agent, Policy::limited(MAX_REDIRECTS)).build()?;
        Ok(Self { client, user_agent })
    }

    fn builder(user_agent: &str, redirect: Policy) -> ClientBuilder {
        ClientBuilder::new().user_agent(user_agent).redirect(redirect)
    }

    /// Redirect policy that refuses hops leaving `host`.
    fn same_host_policy(host: String) -> Policy {
        Policy::custom(move |attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if attempt.url().host_str() == Some(host.as_str()) {
                attempt.follow()
            } else {
                let message = format!(
                    "redirect to unvetted host {}",
                    attempt.url().host_str().unwrap_or("<none>")
                );
                attempt.error(message)
            }
        })
    }

    /// Returns the shared client, or a one-off client pinned to the vetted addresses.
    fn client_for(&self, request: &ProbeRequest) -> Result<Client, ProbeError> {
        let host = match request.url.host() {
            Some(url::Host::Domain(domain)) if !request.pinned.is_empty() => domain,
            _ => return Ok(self.client.clone()),
        };

        Self::builder(&self.user_agent, Self::same_host_policy(host.to_string()))
            .resolve_to_addrs(host, &request.pinned)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))
    }

    async fn attempt(
        client: &Client,
        method: ProbeMethod,
        url: &Url,
        timeout: Duration,
    ) -> Result<u16, AttemptFailure> {
        let http_method = match method {
            ProbeMethod::Head => Method::HEAD,
            ProbeMethod::Get => Method::GET,
        };

        let response = client
            .request(http_method, url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttemptFailure::Timeout(timeout)
                } else {
                    AttemptFailure::Transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if (200..400).contains(&status) {
            Ok(status)
        } else {
            Err(AttemptFailure::Status(status))
        }
    }
}

#[async_trait]
impl ReachabilityProbe for HttpProber {
    async fn probe(&self, request: ProbeRequest) -> Result<Reachable, ProbeError> {
        let client = self.client_for(&request)?;

        let head =
            match Self::attempt(&client, ProbeMethod::Head, &request.url, request.timeout).await {
                Ok(status) => {
                    return Ok(Reachable {
                        method: ProbeMethod::Head,
                        status,
                    });
                }
                Err(failure) => failure,
            };

        tracing::debug!(url = %request.url, reason = %head, "HEAD probe failed, retrying with GET");

        match Self::attempt(&client, ProbeMethod::Get, &request.url, request.timeout).await {
            Ok(status) => Ok(Reachable {
                method: ProbeMethod::Get,
                status,
            }),
            Err(get) => Err(ProbeError::Unreachable { head, get }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_reason_names_both_attempts() {
        let err = ProbeError::Unreachable {
            head: AttemptFailure::Status(405),
            get: AttemptFailure::Timeout(Duration::from_millis(3000)),
        };

        assert_eq!(
            err.to_string(),
            "HEAD returned HTTP 405; GET timed out after 3000ms"
        );
    }

    #[test]
    fn test_transport_failure_display() {
        let failure = AttemptFailure::Transport("connection refused".to_string());
        assert_eq!(failure.to_string(), "request failed: connection refused");
    }

    #[test]
    fn test_unpinned_request_reuses_shared_client() {
        let prober = HttpProber::new("tinylink-test").unwrap();
        let request = ProbeRequest {
            url: Url::parse("https://example.com/").unwrap(),
            timeout: Duration::from_secs(1),
            pinned: Vec::new(),
        };

        assert!(prober.client_for(&request).is_ok());
    }

    #[test]
    fn test_pinned_request_builds_client() {
        let prober = HttpProber::new("tinylink-test").unwrap();
        let request = ProbeRequest {
            url: Url::parse("https://example.com/").unwrap(),
            timeout: Duration::from_secs(1),
            pinned: vec!["93.184.216.34:443".parse().unwrap()],
        };

        assert!(prober.client_for(&request).is_ok());
    }
}
