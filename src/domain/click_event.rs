//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// An in-memory representation of a followed short link.
///
/// Created by the redirect handler and sent over a bounded channel to
/// [`crate::domain::click_worker::run_click_worker`], so the redirect response
/// never waits on the database write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            clicked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation() {
        let before = Utc::now();
        let event = ClickEvent::new("abc123");

        assert_eq!(event.code, "abc123");
        assert!(event.clicked_at >= before);
    }
}
