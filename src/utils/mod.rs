//! Pure helpers of the admission pipeline.
//!
//! - [`url_validator`] - Target URL parsing and validation
//! - [`address_filter`] - Loopback, link-local and private range detection
//! - [`code_generator`] - Short code generation and validation

pub mod address_filter;
pub mod code_generator;
pub mod url_validator;
