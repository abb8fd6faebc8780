//! Background worker persisting click events.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Retries after the first failed attempt.
const MAX_RETRIES: usize = 3;

/// Drains the click channel until every sender is dropped.
///
/// Each event increments the link's counter through [`LinkRepository::record_click`],
/// retried with jittered exponential backoff. An event whose link no longer
/// exists (deleted between redirect and persistence) is skipped.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn LinkRepository>,
) {
    while let Some(event) = rx.recv().await {
        process_event(&event, repository.as_ref()).await;
    }

    tracing::info!("Click channel closed, worker stopping");
}

async fn process_event(event: &ClickEvent, repository: &dyn LinkRepository) {
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(5)
        .map(jitter)
        .take(MAX_RETRIES);

    let result = Retry::start(strategy, move || {
        repository.record_click(&event.code, event.clicked_at)
    })
    .await;

    match result {
        Ok(true) => tracing::debug!(code = %event.code, "Click recorded"),
        Ok(false) => tracing::debug!(code = %event.code, "Click for unknown code skipped"),
        Err(e) => tracing::error!(code = %event.code, error = %e, "Failed to record click"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{MockLinkRepository, StoreError};

    #[tokio::test]
    async fn test_worker_records_each_event() {
        let mut repo = MockLinkRepository::new();
        repo.expect_record_click()
            .withf(|code, _| code == "abc123")
            .times(2)
            .returning(|_, _| Ok(true));

        let (tx, rx) = mpsc::channel(8);
        tx.send(ClickEvent::new("abc123")).await.unwrap();
        tx.send(ClickEvent::new("abc123")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo)).await;
    }

    #[tokio::test]
    async fn test_worker_retries_transient_failures() {
        let mut repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_record_click()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(StoreError::Backend("connection reset".to_string())));
        repo.expect_record_click()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(true));

        let (tx, rx) = mpsc::channel(8);
        tx.send(ClickEvent::new("Retry1")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo)).await;
    }

    #[tokio::test]
    async fn test_worker_gives_up_after_retry_budget() {
        let mut repo = MockLinkRepository::new();
        repo.expect_record_click()
            .times(MAX_RETRIES + 1)
            .returning(|_, _| Err(StoreError::Backend("down".to_string())));

        let (tx, rx) = mpsc::channel(8);
        tx.send(ClickEvent::new("Broken1")).await.unwrap();
        drop(tx);

        run_click_worker(rx, Arc::new(repo)).await;
    }
}
