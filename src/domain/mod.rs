//! Domain layer containing business entities and logic.
//!
//! This module defines entities, repository interfaces, and the click tracking
//! pipeline independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler receives redirect request
//! 2. [`click_event::ClickEvent`] is sent to async channel
//! 3. [`click_worker::run_click_worker`] processes events with retry logic
//! 4. The counter is incremented via [`repositories::LinkRepository::record_click`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
