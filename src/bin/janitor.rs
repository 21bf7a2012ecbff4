// src/bin/janitor.rs

//! Offline maintenance for the tracking database.
//!
//! ```bash
//! ally-janitor purge [--days 3] [--dry-run]
//! ally-janitor dedupe
//! ```
//!
//! Both passes take an exclusive lock on the file, so a running server's
//! tracking writes wait until the pass is done.

use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ally_backend::{db, services::maintenance};

const MAX_RETENTION_DAYS: i64 = 36_500;

#[derive(Parser, Debug)]
#[command(name = "ally-janitor", about = "Maintenance passes over the tracking database")]
struct Cli {
    /// Tracking database file
    #[arg(long, env = "TRACKING_DB_FILE", default_value = "trackingData.db")]
    tracking_db: PathBuf,

    /// Busy timeout while waiting for the server's writer (milliseconds)
    #[arg(long, env = "DB_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    busy_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Delete rows whose latest stamp is older than the retention window
    Purge {
        /// Retention window in days
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(i64).range(0..=MAX_RETENTION_DAYS))]
        days: i64,

        /// Report what would be deleted without deleting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Merge rows that share an isoBarcode into one
    Dedupe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let options = db::connect_options(&cli.tracking_db, Duration::from_millis(cli.busy_timeout_ms));
    let mut conn = db::open_connection(&options)
        .await
        .with_context(|| format!("failed to open {}", cli.tracking_db.display()))?;
    db::schema::init_tracking_db(&mut conn)
        .await
        .context("failed to prepare the tracking table")?;

    let outcome = match cli.command {
        Command::Purge { days, dry_run } => {
            let cutoff = maintenance::purge_cutoff(Local::now().naive_local(), days)
                .with_context(|| format!("--days {days} is out of range"))?;
            tracing::info!("Purging rows last stamped before {}", cutoff);

            maintenance::purge_stale(&mut conn, cutoff, dry_run)
                .await
                .map(|report| {
                    let verb = if dry_run { "would delete" } else { "deleted" };
                    tracing::info!(
                        "Scanned {} rows, {} stale, {} {}",
                        report.scanned,
                        report.stale,
                        verb,
                        if dry_run { report.stale } else { report.deleted }
                    );
                })
                .context("purge failed")
        }
        Command::Dedupe => maintenance::merge_duplicate_isos(&mut conn)
            .await
            .map(|report| {
                tracing::info!(
                    "Merged {} duplicated isoBarcodes, removed {} rows",
                    report.duplicate_isos,
                    report.rows_removed
                );
            })
            .context("dedupe failed"),
    };

    db::close_quietly(conn).await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_days_are_bounded() {
        let cli = Cli::try_parse_from(["ally-janitor", "purge", "--days", "7", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Command::Purge { days: 7, dry_run: true }));

        for days in ["-1", "36501", "9223372036854775807"] {
            assert!(Cli::try_parse_from(["ally-janitor", "purge", "--days", days]).is_err());
        }
    }
}
