//! # adsync CLI entry point
//!
//! Loads `.env`, parses arguments, installs tracing, builds configuration
//! once and dispatches to the subcommand handler. Exit code 0 on success,
//! 1 on any fatal error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use adsync_cli::report::{run_google, run_tiktok, PlatformArgs};
use adsync_cli::tables::run_prepare_tables;
use adsync_cli::{logging, AppConfig};
use adsync_source::{GoogleAdsConfig, TiktokConfig};

/// Daily Google Ads and TikTok report loader.
///
/// Pulls daily campaign performance from the ad platforms and appends the
/// rows not already present to month-partitioned PostgreSQL tables.
#[derive(Parser, Debug)]
#[command(name = "adsync", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Also write daily rolling log files under this directory.
    #[arg(long, global = true, env = "ADSYNC_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Google Ads campaign and conversion reports.
    Google(PlatformArgs),

    /// TikTok campaign report.
    Tiktok(PlatformArgs),

    /// Create the destination tables if they do not exist.
    PrepareTables,
}

impl Commands {
    fn log_name(&self) -> &'static str {
        match self {
            Self::Google(_) => "google",
            Self::Tiktok(_) => "tiktok",
            Self::PrepareTables => "tables",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let _guard = match logging::init(
        cli.verbose,
        cli.log_json,
        cli.log_dir.as_deref(),
        cli.command.log_name(),
    ) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialise logging: {e:#}");
            return ExitCode::from(1);
        }
    };

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("no .env file"),
        Err(e) => tracing::warn!("could not load .env: {e}"),
    }

    match run(cli.command).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<u8> {
    let config = AppConfig::from_env().context("loading warehouse configuration")?;
    tracing::debug!(?config, "configuration loaded");

    match command {
        Commands::Google(args) => {
            let google = GoogleAdsConfig::from_env().context("loading Google Ads configuration")?;
            run_google(&args, &config, &google).await
        }
        Commands::Tiktok(args) => {
            let tiktok = TiktokConfig::from_env().context("loading TikTok configuration")?;
            run_tiktok(&args, &config, &tiktok).await
        }
        Commands::PrepareTables => run_prepare_tables(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_cli::report::PlatformCommand;

    #[test]
    fn parse_google_report_with_flags() {
        let cli = Cli::try_parse_from(["adsync", "google", "report", "2024-03-01", "--export"])
            .unwrap();
        let Commands::Google(args) = cli.command else {
            panic!("expected google");
        };
        match args.command {
            PlatformCommand::Report { date, flags } => {
                assert_eq!(date.to_string(), "2024-03-01");
                assert!(flags.export);
                assert!(!flags.dry_run);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_tiktok_dry_run_and_verbosity() {
        let cli = Cli::try_parse_from(["adsync", "-vv", "tiktok", "report", "2024-03-01", "--dry-run"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command.log_name(), "tiktok");
        let Commands::Tiktok(args) = cli.command else {
            panic!("expected tiktok");
        };
        assert!(matches!(
            args.command,
            PlatformCommand::Report { flags, .. } if flags.dry_run && !flags.export
        ));
    }

    #[test]
    fn parse_backfill_and_prepare_tables() {
        let cli = Cli::try_parse_from(["adsync", "google", "backfill", "2024-01-01"]).unwrap();
        let Commands::Google(args) = cli.command else {
            panic!("expected google");
        };
        assert!(matches!(args.command, PlatformCommand::Backfill { .. }));

        let cli = Cli::try_parse_from(["adsync", "prepare-tables", "--log-json"]).unwrap();
        assert!(matches!(cli.command, Commands::PrepareTables));
        assert!(cli.log_json);
    }

    #[test]
    fn invalid_date_is_rejected() {
        assert!(Cli::try_parse_from(["adsync", "google", "report", "2024-02-30"]).is_err());
        assert!(Cli::try_parse_from(["adsync", "tiktok", "report", "yesterday"]).is_err());
    }
}
