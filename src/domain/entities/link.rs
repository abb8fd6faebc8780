//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL link with its click counters.
///
/// Represents the mapping between a short code and a target URL. `clicks` and
/// `last_clicked` are only ever changed by the click worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub code: String,
    pub target: String,
    pub clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        code: String,
        target: String,
        clicks: i64,
        last_clicked: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            target,
            clicks,
            last_clicked,
            created_at,
        }
    }

    /// Returns true if the link has never been followed.
    pub fn is_unvisited(&self) -> bool {
        self.clicks == 0 && self.last_clicked.is_none()
    }
}

/// Input data for creating a new link.
///
/// New links always start with zero clicks and no last-click timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub code: String,
    pub target: String,
}
