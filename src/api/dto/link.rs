//! DTOs for link management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Link;

/// Request to shorten a target URL.
///
/// A missing `target` deserializes to an empty string so that it is rejected
/// by URL validation like any other malformed target. Length limits on both
/// fields are enforced by admission, so they carry a rejection kind.
#[derive(Debug, Default, Deserialize)]
pub struct CreateLinkRequest {
    #[serde(default)]
    pub target: String,

    /// Optional explicit short code. An empty string means "generate one".
    #[serde(default)]
    pub code: Option<String>,
}

impl CreateLinkRequest {
    /// The explicit code, treating an empty string as absent.
    pub fn explicit_code(&self) -> Option<&str> {
        self.code.as_deref().filter(|code| !code.is_empty())
    }
}

/// JSON representation of a stored link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub code: String,
    pub target: String,
    pub clicks: i64,
    pub last_clicked: Option<DateTime<Utc>>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            code: link.code,
            target: link.target,
            clicks: link.clicks,
            last_clicked: link.last_clicked,
        }
    }
}

/// Acknowledgement of a deleted link.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_target_defaults_to_empty() {
        let req: CreateLinkRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.target, "");
        assert_eq!(req.explicit_code(), None);
    }

    #[test]
    fn test_empty_code_is_absent() {
        let req: CreateLinkRequest =
            serde_json::from_value(json!({ "target": "https://example.com", "code": "" }))
                .unwrap();
        assert_eq!(req.explicit_code(), None);
    }

    #[test]
    fn test_long_code_is_passed_through() {
        let code = "a".repeat(100);
        let req: CreateLinkRequest =
            serde_json::from_value(json!({ "target": "https://example.com", "code": code }))
                .unwrap();
        assert_eq!(req.explicit_code(), Some(code.as_str()));
    }

    #[test]
    fn test_response_uses_camel_case() {
        let response = LinkResponse {
            code: "abc123".to_string(),
            target: "https://example.com".to_string(),
            clicks: 0,
            last_clicked: None,
        };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "code": "abc123",
                "target": "https://example.com",
                "clicks": 0,
                "lastClicked": null
            })
        );
    }
}
