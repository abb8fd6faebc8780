//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::LinkService;
use crate::domain::click_event::ClickEvent;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    /// Producer side of the bounded click queue drained by the click worker.
    pub click_sender: mpsc::Sender<ClickEvent>,
}

impl AppState {
    pub fn new(link_service: Arc<LinkService>, click_sender: mpsc::Sender<ClickEvent>) -> Self {
        Self {
            link_service,
            click_sender,
        }
    }
}
