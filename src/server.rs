//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, the admission dependencies, worker
//! spawning, and the Axum server lifecycle.

use crate::api::middleware::cors;
use crate::application::services::LinkService;
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::network::{HttpProber, SystemResolver};
use crate::infrastructure::persistence::PgLinkRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// User agent sent by reachability probes.
pub const PROBE_USER_AGENT: &str = concat!("tinylink/", env!("CARGO_PKG_VERSION"));

/// Opens the PostgreSQL pool sized by the configuration.
///
/// # Errors
///
/// Returns an error if no connection can be established.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Builds the link service with the system resolver and the HTTP prober.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be initialized.
pub fn build_link_service(
    repository: Arc<dyn LinkRepository>,
    config: &Config,
) -> Result<LinkService> {
    let prober = HttpProber::new(PROBE_USER_AGENT).context("Failed to build HTTP prober")?;

    Ok(LinkService::new(
        repository,
        Arc::new(SystemResolver),
        Arc::new(prober),
        config.admission_options(),
    ))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Link service (system resolver, HTTP prober)
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(Arc::new(pool)));
    let link_service = Arc::new(build_link_service(repository.clone(), &config)?);

    if config.skip_reachable_check {
        tracing::warn!("SKIP_REACHABLE_CHECK=true, targets are admitted without resolution or probing");
    }

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(click_rx, repository));
    tracing::info!("Click worker started");

    let state = AppState::new(link_service, click_tx);
    let app = app_router(state, cors::layer(&config.allowed_origins));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the last click sender) is dropped once serve
    // returns, so the worker drains the queue and stops.
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Click worker terminated abnormally");
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
