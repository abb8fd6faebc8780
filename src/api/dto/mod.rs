//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization. Field contents
//! are validated by the admission pipeline.

pub mod health;
pub mod link;
