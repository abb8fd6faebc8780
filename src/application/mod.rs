//! Application layer: the admission pipeline and the services built on it.
//!
//! Services consume repository and network traits and provide a clean API for
//! HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link admission, retrieval and removal

pub mod admission;
pub mod services;
