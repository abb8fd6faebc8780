//! CLI administration tool for tinylink.
//!
//! Provides commands for checking targets, managing links, and performing
//! database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Dry-run the reachability check of a target (no database needed)
//! cargo run --bin admin -- check https://example.com
//!
//! # List all links
//! cargo run --bin admin -- links list
//!
//! # Delete a link
//! cargo run --bin admin -- links delete abc123
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for `links` and `db`): PostgreSQL connection string
//! - `REACHABILITY_TIMEOUT_MS`, `ALLOW_PRIVATE_ADDRESS`, `PIN_PROBE_ADDRESS`:
//!   defaults for `check`

use tinylink::application::admission::{AdmissionError, AdmissionOptions, DEFAULT_PROBE_TIMEOUT};
use tinylink::application::services::check_reachability;
use tinylink::domain::repositories::LinkRepository;
use tinylink::infrastructure::network::{HttpProber, SystemResolver};
use tinylink::infrastructure::persistence::PgLinkRepository;
use tinylink::server::PROBE_USER_AGENT;
use tinylink::utils::url_validator::validate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing tinylink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Validate, resolve and probe a target URL without storing it
    Check {
        /// Target URL to check
        url: String,

        /// Accept targets on loopback, link-local or private ranges
        #[arg(long)]
        allow_private: bool,

        /// Budget of each probe attempt in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(100..=60_000))]
        timeout_ms: Option<u64>,
    },

    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinksAction {
    /// List all links, newest first
    List,

    /// Delete a link
    Delete {
        /// Short code of the link
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            url,
            allow_private,
            timeout_ms,
        } => handle_check(&url, allow_private, timeout_ms).await?,
        Commands::Links { action } => {
            let pool = connect().await?;
            handle_links_action(action, &pool).await?
        }
        Commands::Db { action } => {
            let pool = connect().await?;
            handle_db_action(action, &pool).await?
        }
    }

    Ok(())
}

/// Connects to the database named by `DATABASE_URL`.
async fn connect() -> Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

/// Reads a boolean variable the way the server does.
fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}

/// Runs the admission network checks against a target and prints the outcome.
///
/// # Output Format
///
/// ```text
/// 🔎 Checking https://example.com
///
///   Host:      example.com
///   Addresses: 93.184.216.34, 2606:2800:220:1:248:1893:25c8:1946
///   Probe:     HEAD → 200
///
/// ✅ Target is admissible
/// ```
async fn handle_check(url: &str, allow_private: bool, timeout_ms: Option<u64>) -> Result<()> {
    println!("{} {}", "🔎 Checking".bright_blue().bold(), url.cyan());
    println!();

    let timeout = timeout_ms
        .or_else(|| {
            std::env::var("REACHABILITY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_PROBE_TIMEOUT);

    let options = AdmissionOptions {
        allow_private_address: allow_private || env_flag("ALLOW_PRIVATE_ADDRESS", false),
        pin_probe_address: env_flag("PIN_PROBE_ADDRESS", true),
        timeout,
        ..AdmissionOptions::default()
    };

    let prober = HttpProber::new(PROBE_USER_AGENT).context("Failed to build HTTP prober")?;

    let outcome = match validate(url) {
        Ok(candidate) => {
            check_reachability(&SystemResolver, &prober, &candidate, &options).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => {
            let addresses: Vec<String> = report
                .resolved
                .addresses()
                .iter()
                .map(ToString::to_string)
                .collect();

            println!("  Host:      {}", report.resolved.host().bright_white());
            println!("  Addresses: {}", addresses.join(", ").bright_black());
            println!(
                "  Probe:     {} → {}",
                report.reachable.method.to_string().cyan(),
                report.reachable.status.to_string().bright_green().bold()
            );
            println!();
            println!("{}", "✅ Target is admissible".green().bold());
            Ok(())
        }
        Err(e) => {
            print_rejection(&e);
            anyhow::bail!("target rejected ({})", e.kind().as_str())
        }
    }
}

fn print_rejection(e: &AdmissionError) {
    println!("  Kind:   {}", e.kind().as_str().yellow());
    println!("  Reason: {}", e.to_string().bright_white());
    println!();
    println!("{}", "❌ Target would be rejected".red().bold());
}

/// Dispatches link management commands.
async fn handle_links_action(action: LinksAction, pool: &PgPool) -> Result<()> {
    let repo = PgLinkRepository::new(Arc::new(pool.clone()));

    match action {
        LinksAction::List => list_links(&repo).await?,
        LinksAction::Delete { code, yes } => delete_link(&repo, &code, yes).await?,
    }

    Ok(())
}

/// Lists all links.
///
/// # Output Format
///
/// ```text
/// 📋 Links
///
///   Code      Clicks   Last clicked       Target
///   ──────────────────────────────────────────────────────────────────────────
///   abc123    12       2025-01-15 10:30   https://example.com
///   Xy7pQ2    0        never              https://docs.rs
/// ```
async fn list_links(repo: &PgLinkRepository) -> Result<()> {
    println!("{}", "📋 Links".bright_blue().bold());
    println!();

    let links = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<9} {:<8} {:<18} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Last clicked".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &links {
        let last_clicked = link
            .last_clicked
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<9} {:<8} {:<18} {}",
            link.code.cyan(),
            link.clicks.to_string().bright_green(),
            last_clicked.bright_black(),
            link.target
        );
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

/// Deletes a link by code with confirmation prompt.
///
/// The prompt defaults to No and is skipped with `--yes`.
async fn delete_link(repo: &PgLinkRepository, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let link = repo
        .find_by_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Link not found")?;

    println!("  Code:   {}", link.code.cyan());
    println!("  Target: {}", link.target.bright_white());
    println!("  Clicks: {}", link.clicks.to_string().bright_black());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = repo
        .delete(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    if deleted {
        println!("{}", "✅ Link deleted".green().bold());
    } else {
        println!("{}", "⚠️  Link was already gone".yellow());
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let repo = PgLinkRepository::new(Arc::new(pool.clone()));
            repo.ping()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}
