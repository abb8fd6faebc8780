//! HTTP error type and its JSON representation.
//!
//! Every error response has the shape
//! `{"error": {"code": "...", "message": "...", "details": {...}}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::application::admission::AdmissionError;
use crate::domain::repositories::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status this error is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, details) = match self {
            AppError::Validation { message, details } => ("validation_error", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::Conflict { message, details } => ("conflict", message, details),
            AppError::Internal { message, details } => ("internal_error", message, details),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AdmissionError> for AppError {
    fn from(e: AdmissionError) -> Self {
        let kind = e.kind().as_str();
        let reason = e.to_string();

        match e {
            AdmissionError::InvalidUrl(_) => AppError::bad_request(
                "Invalid target URL",
                json!({ "kind": kind, "reason": reason }),
            ),
            AdmissionError::DnsFailed { .. }
            | AdmissionError::NoAddress { .. }
            | AdmissionError::PrivateAddress { .. }
            | AdmissionError::HttpUnreachable { .. } => AppError::bad_request(
                "Target not reachable or not allowed",
                json!({ "kind": kind, "reason": reason }),
            ),
            AdmissionError::DuplicateTarget {
                existing_code,
                target,
            } => AppError::conflict(
                "Target URL already shortened",
                json!({ "kind": kind, "code": existing_code, "target": target }),
            ),
            AdmissionError::InvalidCodeFormat { code } => AppError::bad_request(
                "Code must be 6-8 alphanumeric characters",
                json!({ "kind": kind, "code": code }),
            ),
            AdmissionError::CodeConflict { code } => {
                AppError::conflict("Code already exists", json!({ "kind": kind, "code": code }))
            }
            AdmissionError::CodeGenerationExhausted { attempts } => AppError::internal(
                "Could not generate a unique code",
                json!({ "kind": kind, "attempts": attempts }),
            ),
            AdmissionError::InvalidOptions(_) => {
                tracing::error!(%reason, "Admission called with invalid options");
                AppError::internal("Invalid admission options", json!({ "kind": kind }))
            }
            AdmissionError::InternalStoreError(_) => {
                tracing::error!(%reason, "Store failure during admission");
                AppError::internal("Database error", json!({ "kind": kind }))
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "Store failure");
        match e {
            StoreError::UniqueViolation(field) => AppError::conflict(
                "Unique constraint violation",
                json!({ "field": format!("{field:?}").to_lowercase() }),
            ),
            StoreError::Backend(_) => AppError::internal("Database error", json!({})),
        }
    }
}
