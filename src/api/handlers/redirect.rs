//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use url::Url;

use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Click Tracking
///
/// Click events are sent to a bounded channel for async processing.
/// If the queue is full, the click is dropped and a warning logged.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.get_link(&code).await?;
    let location = location_header(&link.target)?;

    match state.click_sender.try_send(ClickEvent::new(code)) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            warn!(code = %event.code, "Click queue full, dropping click");
        }
        Err(TrySendError::Closed(event)) => {
            warn!(code = %event.code, "Click queue closed, dropping click");
        }
    }

    debug!(code = %link.code, url = %link.target, "Redirecting");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}

/// Builds the `Location` value, percent-encoding targets that are not valid header text.
fn location_header(target: &str) -> Result<HeaderValue, AppError> {
    if let Ok(value) = HeaderValue::from_str(target) {
        return Ok(value);
    }

    Url::parse(target)
        .ok()
        .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
        .ok_or_else(|| AppError::internal("Stored target is not a valid URL", json!({})))
}
