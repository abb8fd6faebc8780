//! Target URL parsing and validation.
//!
//! Only absolute `http`/`https` URLs with a host are admitted. Validation is
//! pure: no DNS or network access happens here.

use url::{Host, Url};

use crate::application::admission::AdmissionError;

/// Longest accepted target, in bytes.
///
/// Keeps every stored target within the PostgreSQL btree row limit of the
/// unique index on `links.target`.
pub const MAX_TARGET_BYTES: usize = 2048;

/// A target URL that passed syntactic validation.
///
/// Keeps the raw input, which is what gets stored and compared for duplicates,
/// next to the parsed form used for resolution and probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    raw: String,
    url: Url,
}

impl CandidateUrl {
    /// The input string exactly as submitted.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Either `http` or `https`.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// The host component. Always present for admitted URLs.
    pub fn host(&self) -> Host<&str> {
        // validate() rejects URLs without a host
        self.url.host().unwrap_or(Host::Domain(""))
    }

    /// The host as text, without IPv6 brackets.
    pub fn host_name(&self) -> String {
        match self.host() {
            Host::Domain(domain) => domain.to_string(),
            Host::Ipv4(v4) => v4.to_string(),
            Host::Ipv6(v6) => v6.to_string(),
        }
    }

    /// Explicit port, or the scheme default.
    pub fn port(&self) -> u16 {
        self.url.port_or_known_default().unwrap_or(80)
    }
}

/// Validates a raw target URL.
///
/// # Rules
///
/// 1. Must parse as an absolute URL
/// 2. Scheme must be `http` or `https` (rejects `javascript:`, `data:`, `file:`, `ftp:` ...)
/// 3. Must have a non-empty host
/// 4. At most [`MAX_TARGET_BYTES`] bytes long
///
/// # Errors
///
/// Returns [`AdmissionError::InvalidUrl`] when any rule is violated.
///
/// # Examples
///
/// ```ignore
/// let candidate = validate("https://example.com/page").unwrap();
/// assert_eq!(candidate.scheme(), "https");
/// assert_eq!(candidate.host_name(), "example.com");
///
/// assert!(validate("ftp://example.com").is_err());
/// assert!(validate("not-a-url").is_err());
/// ```
pub fn validate(raw: &str) -> Result<CandidateUrl, AdmissionError> {
    if raw.len() > MAX_TARGET_BYTES {
        return Err(AdmissionError::InvalidUrl(format!(
            "URL is {} bytes long, at most {MAX_TARGET_BYTES} are allowed",
            raw.len()
        )));
    }

    let url = Url::parse(raw).map_err(|e| AdmissionError::InvalidUrl(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AdmissionError::InvalidUrl(format!(
                "only http/https URLs are allowed, got {other}"
            )));
        }
    }

    match url.host() {
        Some(Host::Domain(domain)) if domain.is_empty() => {
            return Err(AdmissionError::InvalidUrl("URL has an empty host".to_string()));
        }
        Some(_) => {}
        None => return Err(AdmissionError::InvalidUrl("URL has no host".to_string())),
    }

    Ok(CandidateUrl {
        raw: raw.to_string(),
        url,
    })
}
