//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Column whose unique constraint rejected an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Code,
    Target,
}

/// Errors reported by a link store.
///
/// Unique-constraint violations are reported distinctly so that callers can
/// turn a lost insert race into a conflict instead of an internal error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated on {0:?}")]
    UniqueViolation(UniqueField),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with zero clicks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] if the code or the target is
    /// already stored, [`StoreError::Backend`] on any other failure.
    async fn insert(&self, new_link: NewLink) -> Result<Link, StoreError>;

    /// Finds a link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, StoreError>;

    /// Finds a link whose target equals `target` exactly.
    ///
    /// Used to detect targets that were already shortened.
    async fn find_by_target(&self, target: &str) -> Result<Option<Link>, StoreError>;

    /// Returns true if a link with this code exists.
    async fn exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Lists all links, newest first.
    async fn list(&self) -> Result<Vec<Link>, StoreError>;

    /// Deletes a link by code.
    ///
    /// Returns `Ok(true)` if a link was removed, `Ok(false)` if none matched.
    async fn delete(&self, code: &str) -> Result<bool, StoreError>;

    /// Increments the click counter and sets `last_clicked` to `clicked_at`.
    ///
    /// Returns `Ok(false)` if no link matches `code`.
    async fn record_click(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
