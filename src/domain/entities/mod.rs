//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic. Creation input
//! lives in a separate struct ([`NewLink`]) so that store-owned fields
//! (`id`, counters, timestamps) can never be supplied by callers.

pub mod link;

pub use link::{Link, NewLink};
