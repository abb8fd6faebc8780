//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::HealthResponse;
use crate::state::AppState;

/// Returns service health status.
///
/// # Endpoint
///
/// `GET /healthz`
///
/// # Response Codes
///
/// - **200 OK**: the database answers
/// - **503 Service Unavailable**: the database ping failed
///
/// # Response
///
/// ```json
/// { "status": "ok", "db": "connected", "version": "0.1.0" }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_healthy = match state.link_service.store_healthy().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check: database unavailable");
            false
        }
    };

    if state.click_sender.is_closed() {
        tracing::warn!("Health check: click queue is closed");
    }

    let response = HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" }.to_string(),
        db: if db_healthy { "connected" } else { "unavailable" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    if db_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
