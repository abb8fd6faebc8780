//! Hostname resolution and the private-range admission check.

use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use url::Host;

use crate::application::admission::AdmissionError;
use crate::utils::address_filter::first_private;
use crate::utils::url_validator::CandidateUrl;

/// Failure of a DNS lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ResolveError(pub String);

/// Resolves hostnames to every address of both families.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Looks up all addresses for `host`. An empty result is not an error here.
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Resolver backed by the operating system (`getaddrinfo`) through tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl AddressResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        let addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| ResolveError(e.to_string()))?;

        let mut ips: Vec<IpAddr> = Vec::new();
        for addr in addrs {
            if !ips.contains(&addr.ip()) {
                ips.push(addr.ip());
            }
        }
        Ok(ips)
    }
}

/// The addresses a host resolved to at admission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddressSet {
    host: String,
    addresses: Vec<IpAddr>,
    literal: bool,
}

impl ResolvedAddressSet {
    /// Hostname the set was resolved for.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Resolved addresses, never empty.
    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    /// True when the URL host was an IP literal and no lookup happened.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// Socket addresses on `port`, for connecting to exactly these addresses.
    pub fn socket_addrs(&self, port: u16) -> Vec<SocketAddr> {
        self.addresses
            .iter()
            .map(|ip| SocketAddr::new(*ip, port))
            .collect()
    }
}

/// Resolves the candidate's host and applies the private-range policy.
///
/// IP-literal hosts are checked directly without a lookup.
///
/// # Errors
///
/// - [`AdmissionError::DnsFailed`] if the lookup fails
/// - [`AdmissionError::NoAddress`] if it yields nothing
/// - [`AdmissionError::PrivateAddress`] if ANY address is private and
///   `allow_private` is false; one private member vetoes the whole set
pub async fn resolve(
    resolver: &dyn AddressResolver,
    candidate: &CandidateUrl,
    allow_private: bool,
) -> Result<ResolvedAddressSet, AdmissionError> {
    let host = candidate.host_name();

    let (addresses, literal) = match candidate.host() {
        Host::Ipv4(v4) => (vec![IpAddr::V4(v4)], true),
        Host::Ipv6(v6) => (vec![IpAddr::V6(v6)], true),
        Host::Domain(domain) => {
            let addresses = resolver.lookup(domain).await.map_err(|e| {
                AdmissionError::DnsFailed {
                    host: host.clone(),
                    reason: e.to_string(),
                }
            })?;
            (addresses, false)
        }
    };

    if addresses.is_empty() {
        return Err(AdmissionError::NoAddress { host });
    }

    if !allow_private && let Some(address) = first_private(&addresses) {
        return Err(AdmissionError::PrivateAddress { host, address });
    }

    tracing::debug!(%host, addresses = ?addresses, "Target host resolved");

    Ok(ResolvedAddressSet {
        host,
        addresses,
        literal,
    })
}
