//! Handlers for link management endpoints (create, list, get, delete).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::api::dto::link::{CreateLinkRequest, DeleteResponse, LinkResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Admits a target URL and creates its short link.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "target": "https://example.com", "code": "abc123" }
/// ```
///
/// `code` is optional; a random 6-character code is generated when absent.
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "code": "abc123", "target": "https://example.com", "clicks": 0, "lastClicked": null }
/// ```
///
/// # Errors
///
/// - 400 for an invalid target, an unreachable or private target, or a malformed code
/// - 409 if the target is already shortened (existing code in `details.code`)
///   or the requested code is taken
/// - 500 if code generation is exhausted or the store fails
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let link = state
        .link_service
        .create_link_with_defaults(&payload.target, payload.explicit_code())
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Lists every link, newest first.
///
/// # Endpoint
///
/// `GET /api/links`
pub async fn list_links_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let links = state.link_service.list_links().await?;

    Ok(Json(links.into_iter().map(LinkResponse::from).collect()))
}

/// Returns a single link with its click counters.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn get_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&code).await?;

    Ok(Json(link.into()))
}

/// Deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.link_service.delete_link(&code).await?;

    Ok(Json(DeleteResponse { ok: true }))
}
