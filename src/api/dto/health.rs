//! DTOs for health check endpoint.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// `connected` or `unavailable`.
    pub db: String,
    pub version: String,
}
