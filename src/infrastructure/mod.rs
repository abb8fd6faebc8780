//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer and talks to
//! the outside world.
//!
//! # Modules
//!
//! - [`network`] - DNS resolution and HTTP reachability probing of link targets
//! - [`persistence`] - PostgreSQL repository implementations

pub mod network;
pub mod persistence;
