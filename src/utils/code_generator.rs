//! Short code generation and validation utilities.
//!
//! Codes are drawn uniformly from the 62-symbol alphabet `[A-Za-z0-9]`. With
//! six characters the code space is 62^6 (about 5.7 * 10^10), so a bounded
//! retry loop against the store is far cheaper than tracking used codes.

use std::sync::LazyLock;

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;

use crate::application::admission::{AdmissionError, check_code_settings};
use crate::domain::repositories::{LinkRepository, StoreError};

pub use crate::application::admission::{MAX_CODE_LENGTH, MIN_CODE_LENGTH};

/// Compiled pattern every code (generated or user-supplied) must match.
static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6,8}$").expect("code pattern is valid"));

/// Capability answering whether a code is still free.
///
/// Every [`LinkRepository`] provides it, so the generator stays decoupled from
/// the concrete store.
#[async_trait]
pub trait CodeAvailability: Send + Sync {
    /// Returns `true` if no link uses `code` yet.
    async fn is_available(&self, code: &str) -> Result<bool, StoreError>;
}

#[async_trait]
impl<T: LinkRepository + ?Sized> CodeAvailability for T {
    async fn is_available(&self, code: &str) -> Result<bool, StoreError> {
        Ok(!self.exists(code).await?)
    }
}

/// Draws a random code of `length` alphanumeric characters.
pub fn random_code(length: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generates a code that `availability` reports as free.
///
/// Tries at most `max_attempts` random codes, checking each one in turn.
///
/// # Errors
///
/// Returns [`AdmissionError::InvalidOptions`] for a length outside 6..=8 or a
/// zero attempt budget, [`AdmissionError::CodeGenerationExhausted`] when every
/// attempt hit a taken code, and [`AdmissionError::InternalStoreError`] if the
/// availability check itself fails.
pub async fn generate_unique_code<A>(
    length: usize,
    availability: &A,
    max_attempts: u32,
) -> Result<String, AdmissionError>
where
    A: CodeAvailability + ?Sized,
{
    check_code_settings(length, max_attempts)?;

    for attempt in 1..=max_attempts {
        let code = random_code(length);

        if availability.is_available(&code).await? {
            if attempt > 1 {
                tracing::debug!(attempt, "Unique code found after collisions");
            }
            return Ok(code);
        }
    }

    Err(AdmissionError::CodeGenerationExhausted {
        attempts: max_attempts,
    })
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 6-8 characters
/// - Allowed characters: ASCII letters (either case) and digits
///
/// # Errors
///
/// Returns [`AdmissionError::InvalidCodeFormat`] if the code does not match.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_code("abc123").is_ok());
/// assert!(validate_custom_code("AbC12345").is_ok());
///
/// assert!(validate_custom_code("ab1").is_err());       // Too short
/// assert!(validate_custom_code("my-link").is_err());   // Hyphen
/// ```
pub fn validate_custom_code(code: &str) -> Result<(), AdmissionError> {
    if CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        Err(AdmissionError::InvalidCodeFormat {
            code: code.to_string(),
        })
    }
}

/// Returns true if `code` has the shape of a short code.
pub fn is_valid_code(code: &str) -> bool {
    CODE_REGEX.is_match(code)
}
