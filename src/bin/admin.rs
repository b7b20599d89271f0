//! CLI administration tool for shortlink.
//!
//! Works directly against the PostgreSQL store, without going through the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Shorten a URL, expiring in two days
//! cargo run --bin admin -- shorten https://example.com/long --expires-in-hours 48
//!
//! # Inspect a link without counting a click
//! cargo run --bin admin -- info aZ3k9Q
//!
//! # Newest and most clicked links
//! cargo run --bin admin -- recent --limit 20
//! cargo run --bin admin -- top
//!
//! # Totals
//! cargo run --bin admin -- stats
//!
//! # Remove expired links
//! cargo run --bin admin -- cleanup --yes
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! The same as the server: `DATABASE_URL` (or `DB_*` components), `BASE_URL`
//! and the `CODE_*` settings.

use shortlink::application::services::ShortenerService;
use shortlink::config::{self, Config, StorageBackend};
use shortlink::domain::entities::UrlRecord;
use shortlink::infrastructure::persistence::PgCodeStore;
use shortlink::server::connect_pool;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Shorten {
        /// URL to shorten
        url: String,

        /// Expire the link after this many hours
        #[arg(short, long)]
        expires_in_hours: Option<i64>,
    },

    /// Show a link without counting a click
    Info {
        /// Short code
        code: String,
    },

    /// List the newest links
    Recent {
        #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(1..=100))]
        limit: i64,
    },

    /// List the most clicked links
    Top {
        #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(1..=100))]
        limit: i64,
    },

    /// Show statistics
    Stats,

    /// Delete expired links
    Cleanup {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    if config.storage_backend != StorageBackend::Postgres {
        anyhow::bail!("The admin tool requires STORAGE_BACKEND=postgres");
    }

    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        command => {
            let store = Arc::new(PgCodeStore::new(Arc::new(pool)));
            let shortener = ShortenerService::new(
                store,
                config.code_generator()?,
                config.code_max_attempts,
            );
            handle_link_command(command, &shortener, &config).await?;
        }
    }

    Ok(())
}

/// Dispatches commands that go through the shortener.
async fn handle_link_command(
    command: Commands,
    shortener: &ShortenerService<PgCodeStore>,
    config: &Config,
) -> Result<()> {
    match command {
        Commands::Shorten {
            url,
            expires_in_hours,
        } => shorten(shortener, config, &url, expires_in_hours).await,
        Commands::Info { code } => info(shortener, config, &code).await,
        Commands::Recent { limit } => {
            let records = shortener.recent(limit).await?;
            print_table("🕑 Recent Links", &records, config);
            Ok(())
        }
        Commands::Top { limit } => {
            let records = shortener.top_clicked(limit).await?;
            print_table("🔥 Top Clicked Links", &records, config);
            Ok(())
        }
        Commands::Stats => stats(shortener).await,
        Commands::Cleanup { yes } => cleanup(shortener, yes).await,
        Commands::Db { .. } => Ok(()),
    }
}

/// Creates a short link and prints it.
async fn shorten(
    shortener: &ShortenerService<PgCodeStore>,
    config: &Config,
    url: &str,
    expires_in_hours: Option<i64>,
) -> Result<()> {
    println!("{}", "🔗 Shorten URL".bright_blue().bold());
    println!();

    let expires_at = expires_in_hours
        .map(|hours| expiry_after_hours(Utc::now(), hours))
        .transpose()?;

    let record = shortener
        .shorten(url, expires_at)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to shorten URL: {}", e))?;

    print_record(&record, config, shortener);
    println!("{}", "✅ Done".green().bold());
    println!();

    Ok(())
}

/// Expiry instant `hours` after `now`.
///
/// Rejects non-positive values and anything past the range `DateTime` can hold.
fn expiry_after_hours(now: DateTime<Utc>, hours: i64) -> Result<DateTime<Utc>> {
    if hours <= 0 {
        anyhow::bail!("--expires-in-hours must be positive");
    }

    Duration::try_hours(hours)
        .and_then(|delta| now.checked_add_signed(delta))
        .context("--expires-in-hours is too large")
}

/// Prints one link's metadata.
async fn info(
    shortener: &ShortenerService<PgCodeStore>,
    config: &Config,
    code: &str,
) -> Result<()> {
    println!("{}", "ℹ️  Link Information".bright_blue().bold());
    println!();

    let record = shortener
        .get_info(code)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    print_record(&record, config, shortener);
    Ok(())
}

fn print_record(record: &UrlRecord, config: &Config, shortener: &ShortenerService<PgCodeStore>) {
    let now = Utc::now();

    println!("  Code:      {}", record.code.cyan().bold());
    println!(
        "  Short URL: {}",
        shortener
            .short_url(&config.base_url, &record.code)
            .bright_yellow()
    );
    println!("  Target:    {}", record.original_url.bright_white());
    println!(
        "  Created:   {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .bright_black()
    );

    match record.expires_at {
        Some(expires_at) => {
            let status = if record.is_expired_at(now) {
                "EXPIRED".red()
            } else {
                format!("{}h left", record.remaining_hours_at(now).unwrap_or(0)).green()
            };
            println!(
                "  Expires:   {} ({})",
                expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
                status
            );
        }
        None => println!("  Expires:   {}", "never".bright_black()),
    }

    println!(
        "  Clicks:    {}",
        record.click_count.to_string().bright_green().bold()
    );
    println!();
}

/// Prints a list of links as a table.
///
/// # Output Format
///
/// ```text
/// 🕑 Recent Links
///
///   Code      Clicks   Created            Target
///   ─────────────────────────────────────────────────────────────────────────
///   aZ3k9Q    12       2026-01-15 10:30   https://example.com/
/// ```
fn print_table(
    title: &str,
    records: &[UrlRecord],
    config: &Config,
) {
    println!("{}", title.bright_blue().bold());
    println!();

    if records.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        return;
    }

    println!(
        "  {:<10} {:<8} {:<18} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Target".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    let now = Utc::now();
    for record in records {
        let code = if record.is_expired_at(now) {
            record.code.red()
        } else {
            record.code.cyan()
        };

        println!(
            "  {:<10} {:<8} {:<18} {}",
            code,
            record.click_count.to_string().bright_green(),
            record
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            record.original_url
        );
    }

    println!();
    println!(
        "  Total: {}   Base URL: {}",
        records.len().to_string().bright_white().bold(),
        config.base_url.bright_black()
    );
    println!();
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of links
/// - Total number of clicks and the per-link average
/// - Links created today (UTC)
async fn stats(shortener: &ShortenerService<PgCodeStore>) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let stats = shortener
        .statistics()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!(
        "  Links:          {}",
        stats.total_urls.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:         {}",
        stats.total_clicks.to_string().bright_green().bold()
    );
    println!(
        "  Average clicks: {}",
        format!("{:.2}", stats.average_clicks).bright_green().bold()
    );
    println!(
        "  Created today:  {}",
        stats.urls_today.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Deletes expired links after confirmation (default: No).
async fn cleanup(shortener: &ShortenerService<PgCodeStore>, skip_confirm: bool) -> Result<()> {
    println!("{}", "🧹 Remove Expired Links".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete every expired link now?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let removed = shortener
        .cleanup_expired()
        .await
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {}", e))?;

    println!(
        "{} {}",
        "✅ Removed expired links:".green().bold(),
        removed.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_records")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Records:    {}", records.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
