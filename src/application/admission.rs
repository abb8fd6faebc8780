//! Admission options and the rejection taxonomy of the link admission pipeline.

use std::net::IpAddr;
use std::time::Duration;

use serde::Serialize;

use crate::domain::repositories::StoreError;

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Default number of draws before code generation gives up.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 1000;

/// Default per-attempt budget of the reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Shortest accepted code.
pub const MIN_CODE_LENGTH: usize = 6;

/// Longest accepted code.
pub const MAX_CODE_LENGTH: usize = 8;

/// Per-call knobs of the admission pipeline.
///
/// Built from [`crate::config::Config::admission_options`] for the HTTP API,
/// or constructed directly by callers that need different behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionOptions {
    /// Skips both DNS resolution and the HTTP probe.
    pub skip_reachability: bool,
    /// Accepts targets resolving to loopback, link-local or private ranges.
    pub allow_private_address: bool,
    /// Budget of each probe attempt (HEAD and the GET fallback each get a fresh one).
    pub timeout: Duration,
    /// Connects the probe to the vetted addresses instead of resolving again.
    pub pin_probe_address: bool,
    /// Length of generated codes, within 6..=8.
    pub code_length: usize,
    /// Draws before code generation fails with [`AdmissionError::CodeGenerationExhausted`].
    pub max_code_attempts: u32,
}

impl Default for AdmissionOptions {
    fn default() -> Self {
        Self {
            skip_reachability: false,
            allow_private_address: false,
            timeout: DEFAULT_PROBE_TIMEOUT,
            pin_probe_address: true,
            code_length: DEFAULT_CODE_LENGTH,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

impl AdmissionOptions {
    /// Checks the code settings before any lookup or store access.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::InvalidOptions`] if `code_length` is outside
    /// 6..=8 or `max_code_attempts` is zero.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        check_code_settings(self.code_length, self.max_code_attempts)
    }
}

/// Rejects code lengths outside 6..=8 and an empty attempt budget.
pub(crate) fn check_code_settings(length: usize, max_attempts: u32) -> Result<(), AdmissionError> {
    if !(MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&length) {
        return Err(AdmissionError::InvalidOptions(format!(
            "code length {length} is outside {MIN_CODE_LENGTH}..={MAX_CODE_LENGTH}"
        )));
    }
    if max_attempts == 0 {
        return Err(AdmissionError::InvalidOptions(
            "code generation needs at least one attempt".to_string(),
        ));
    }
    Ok(())
}

/// Machine-readable kind of an admission rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    InvalidUrl,
    DnsFailed,
    NoAddress,
    PrivateAddress,
    HttpUnreachable,
    DuplicateTarget,
    InvalidCodeFormat,
    CodeConflict,
    CodeGenerationExhausted,
    InvalidOptions,
    InternalStoreError,
}

impl RejectionKind {
    /// Snake-case name used in logs, metrics labels and error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::DnsFailed => "dns_failed",
            Self::NoAddress => "no_address",
            Self::PrivateAddress => "private_address",
            Self::HttpUnreachable => "http_unreachable",
            Self::DuplicateTarget => "duplicate_target",
            Self::InvalidCodeFormat => "invalid_code_format",
            Self::CodeConflict => "code_conflict",
            Self::CodeGenerationExhausted => "code_generation_exhausted",
            Self::InvalidOptions => "invalid_options",
            Self::InternalStoreError => "internal_store_error",
        }
    }
}

/// Reasons a target URL is not admitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("DNS lookup failed for {host}: {reason}")]
    DnsFailed { host: String, reason: String },

    #[error("no address found for {host}")]
    NoAddress { host: String },

    #[error("{host} resolves to private/local address {address}")]
    PrivateAddress { host: String, address: IpAddr },

    #[error("target not reachable: {reason}")]
    HttpUnreachable { reason: String },

    #[error("target already shortened as {existing_code}")]
    DuplicateTarget {
        existing_code: String,
        target: String,
    },

    #[error("code {code:?} must be 6-8 alphanumeric characters")]
    InvalidCodeFormat { code: String },

    #[error("code {code:?} already exists")]
    CodeConflict { code: String },

    #[error("no unique code found after {attempts} attempts")]
    CodeGenerationExhausted { attempts: u32 },

    #[error("invalid admission options: {0}")]
    InvalidOptions(String),

    #[error("store error: {0}")]
    InternalStoreError(String),
}

impl AdmissionError {
    /// Returns the machine-readable kind of this rejection.
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::InvalidUrl(_) => RejectionKind::InvalidUrl,
            Self::DnsFailed { .. } => RejectionKind::DnsFailed,
            Self::NoAddress { .. } => RejectionKind::NoAddress,
            Self::PrivateAddress { .. } => RejectionKind::PrivateAddress,
            Self::HttpUnreachable { .. } => RejectionKind::HttpUnreachable,
            Self::DuplicateTarget { .. } => RejectionKind::DuplicateTarget,
            Self::InvalidCodeFormat { .. } => RejectionKind::InvalidCodeFormat,
            Self::CodeConflict { .. } => RejectionKind::CodeConflict,
            Self::CodeGenerationExhausted { .. } => RejectionKind::CodeGenerationExhausted,
            Self::InvalidOptions(_) => RejectionKind::InvalidOptions,
            Self::InternalStoreError(_) => RejectionKind::InternalStoreError,
        }
    }

    /// True for the failures of the resolve-and-probe stage.
    pub fn is_unreachable_or_blocked(&self) -> bool {
        matches!(
            self.kind(),
            RejectionKind::DnsFailed
                | RejectionKind::NoAddress
                | RejectionKind::PrivateAddress
                | RejectionKind::HttpUnreachable
        )
    }
}

impl From<StoreError> for AdmissionError {
    fn from(e: StoreError) -> Self {
        Self::InternalStoreError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = AdmissionOptions::default();

        assert!(!options.skip_reachability);
        assert!(!options.allow_private_address);
        assert_eq!(options.timeout, Duration::from_millis(3000));
        assert_eq!(options.code_length, 6);
        assert_eq!(options.max_code_attempts, 1000);
    }

    #[test]
    fn test_default_options_are_valid() {
        assert!(AdmissionOptions::default().validate().is_ok());
    }

    #[test]
    fn test_code_length_outside_range_is_invalid() {
        for code_length in [0, 3, 5, 9, 64] {
            let options = AdmissionOptions {
                code_length,
                ..AdmissionOptions::default()
            };
            assert_eq!(
                options.validate().unwrap_err().kind(),
                RejectionKind::InvalidOptions,
                "length {code_length}"
            );
        }
    }

    #[test]
    fn test_zero_attempts_is_invalid() {
        let options = AdmissionOptions {
            max_code_attempts: 0,
            ..AdmissionOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(AdmissionError::InvalidOptions(msg)) if msg.contains("at least one attempt")
        ));
    }

    #[test]
    fn test_unreachable_or_blocked_grouping() {
        let blocked = AdmissionError::PrivateAddress {
            host: "intranet.local".to_string(),
            address: "10.0.0.5".parse().unwrap(),
        };
        assert!(blocked.is_unreachable_or_blocked());

        let dns = AdmissionError::DnsFailed {
            host: "nope.invalid".to_string(),
            reason: "not found".to_string(),
        };
        assert!(dns.is_unreachable_or_blocked());

        let conflict = AdmissionError::CodeConflict {
            code: "abc123".to_string(),
        };
        assert!(!conflict.is_unreachable_or_blocked());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let value = serde_json::to_value(RejectionKind::CodeGenerationExhausted).unwrap();
        assert_eq!(value, "code_generation_exhausted");
        assert_eq!(
            RejectionKind::PrivateAddress.as_str(),
            serde_json::to_value(RejectionKind::PrivateAddress).unwrap()
        );
    }

    #[test]
    fn test_store_error_becomes_internal() {
        let err: AdmissionError = StoreError::Backend("pool timed out".to_string()).into();
        assert_eq!(err.kind(), RejectionKind::InternalStoreError);
        assert!(err.to_string().contains("pool timed out"));
    }
}
