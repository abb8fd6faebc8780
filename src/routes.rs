//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`      - Short link redirect
//! - `GET  /healthz`     - Health check (database ping)
//! - `/api/links*`       - Link management REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Browser access for the configured frontend origins

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;

/// Constructs the application router with all routes and middleware.
///
/// Static segments take precedence over `/{code}`, so no short code can
/// shadow `/healthz`.
pub fn app_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api::routes::link_routes())
        .with_state(state)
        .layer(cors)
        .layer(tracing::layer())
}
