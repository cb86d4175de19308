//! `adsync google ...` and `adsync tiktok ...`.
//!
//! ## Subcommands
//!
//! - `report <DATE>`: load one day.
//! - `backfill <START>`: load every day from `START` through yesterday.
//!
//! Both take `--export` (write a Parquet snapshot before loading) and
//! `--dry-run` (fetch only).

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use adsync_core::ReportDate;
use adsync_pipeline::{
    backfill, backfill_range, GoogleScope, Orchestrator, PipelineError, RunOptions, RunSummary,
};
use adsync_source::{GoogleAdsClient, GoogleAdsConfig, ReportFetcher, TiktokClient, TiktokConfig};
use adsync_warehouse::{ParquetExporter, PgWarehouse};

use crate::config::AppConfig;

/// Arguments for a platform subcommand.
#[derive(Args, Debug)]
pub struct PlatformArgs {
    #[command(subcommand)]
    pub command: PlatformCommand,
}

#[derive(Subcommand, Debug)]
pub enum PlatformCommand {
    /// Fetch and load the reports for one date.
    Report {
        /// Report date, YYYY-MM-DD.
        date: ReportDate,
        #[command(flatten)]
        flags: RunFlags,
    },

    /// Fetch and load every date from START through yesterday.
    Backfill {
        /// First date to load, YYYY-MM-DD.
        start: ReportDate,
        #[command(flatten)]
        flags: RunFlags,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct RunFlags {
    /// Write a Parquet snapshot of each batch before loading it.
    #[arg(long)]
    pub export: bool,

    /// Fetch only; do not export or load anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl RunFlags {
    pub fn options(&self) -> RunOptions {
        RunOptions {
            dry_run: self.dry_run,
            export: self.export,
        }
    }
}

pub async fn run_google(
    args: &PlatformArgs,
    config: &AppConfig,
    google: &GoogleAdsConfig,
) -> Result<u8> {
    let client = GoogleAdsClient::new(google).context("building Google Ads client")?;
    let warehouse = PgWarehouse::connect(&config.warehouse)
        .await
        .context("connecting to the warehouse")?;
    let orchestrator = Orchestrator::new(&warehouse, config.warehouse.tables.clone())
        .with_read_policy(config.warehouse.read_policy)
        .with_exporter(ParquetExporter::new(&config.export_root));
    let scope = GoogleScope::from_config(google);

    match &args.command {
        PlatformCommand::Report { date, flags } => {
            report_outcome(
                orchestrator
                    .run_google(&client, &scope, *date, flags.options())
                    .await,
            )
        }
        PlatformCommand::Backfill { start, flags } => {
            let Some(range) = backfill_range(*start, today()) else {
                tracing::warn!(start = %start, "start date is not before today, nothing to backfill");
                return Ok(0);
            };
            let options = flags.options();
            let (orchestrator, client, scope) = (&orchestrator, &client, &scope);
            let report = backfill(&range, move |date| {
                orchestrator.run_google(client, scope, date, options)
            })
            .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.is_success() { 0 } else { 1 })
        }
    }
}

pub async fn run_tiktok(
    args: &PlatformArgs,
    config: &AppConfig,
    tiktok: &TiktokConfig,
) -> Result<u8> {
    let client = TiktokClient::new(tiktok).context("building TikTok client")?;
    let warehouse = PgWarehouse::connect(&config.warehouse)
        .await
        .context("connecting to the warehouse")?;
    let orchestrator = Orchestrator::new(&warehouse, config.warehouse.tables.clone())
        .with_read_policy(config.warehouse.read_policy)
        .with_fetcher(ReportFetcher::new(tiktok.page_size))
        .with_exporter(ParquetExporter::new(&config.export_root));

    match &args.command {
        PlatformCommand::Report { date, flags } => {
            report_outcome(orchestrator.run_tiktok(&client, *date, flags.options()).await)
        }
        PlatformCommand::Backfill { start, flags } => {
            let Some(range) = backfill_range(*start, today()) else {
                tracing::warn!(start = %start, "start date is not before today, nothing to backfill");
                return Ok(0);
            };
            let options = flags.options();
            let (orchestrator, client) = (&orchestrator, &client);
            let report = backfill(&range, move |date| {
                orchestrator.run_tiktok(client, date, options)
            })
            .await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(if report.is_success() { 0 } else { 1 })
        }
    }
}

/// Print the run summary, including after a persistence failure, and map
/// the result to an exit code.
fn report_outcome(result: Result<RunSummary, PipelineError>) -> Result<u8> {
    match result {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(0)
        }
        Err(PipelineError::Persist { summary, failures }) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            for (kind, err) in &failures {
                tracing::error!(report = %kind, "{err}");
            }
            Ok(1)
        }
        Err(err) => Err(err.into()),
    }
}

/// Local calendar date of the machine running the job.
fn today() -> ReportDate {
    ReportDate::new(chrono::Local::now().date_naive())
}
