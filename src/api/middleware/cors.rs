//! Cross-origin resource sharing policy for browser clients.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Origins that are always allowed, in addition to configured ones.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = [
    "https://assignment-tinylink-frontend.onrender.com",
    "http://localhost:3000",
];

/// Creates the CORS layer for the given extra origins.
///
/// Origins that are not valid header values are skipped with a warning.
/// Credentials are allowed, so origins are always matched explicitly.
pub fn layer(extra_origins: &[String]) -> CorsLayer {
    let mut origins: Vec<HeaderValue> = Vec::new();

    let candidates = DEFAULT_ALLOWED_ORIGINS
        .iter()
        .copied()
        .chain(extra_origins.iter().map(String::as_str));

    for origin in candidates {
        match HeaderValue::from_str(origin) {
            Ok(value) if !origins.contains(&value) => origins.push(value),
            Ok(_) => {}
            Err(_) => tracing::warn!(%origin, "Ignoring invalid CORS origin"),
        }
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
