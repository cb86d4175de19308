//! # adsync-cli — The `adsync` Command
//!
//! ```bash
//! adsync google report 2024-03-01 --export
//! adsync tiktok report 2024-03-01 --dry-run
//! adsync google backfill 2024-01-01
//! adsync prepare-tables
//! ```
//!
//! Configuration comes from the environment (and a `.env` file, loaded once
//! at startup). Each handler prints a JSON summary of what it did to stdout
//! and returns the process exit code.

pub mod config;
pub mod logging;
pub mod report;
pub mod tables;

pub use config::AppConfig;
