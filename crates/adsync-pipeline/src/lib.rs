//! # adsync-pipeline — Daily Report Orchestration
//!
//! [`Orchestrator`] runs one platform for one date: resolve accounts, fetch
//! every report for every account, then export and load each report's
//! batch. [`backfill`] drives the orchestrator over a range of dates.
//!
//! Everything is sequential. Accounts are visited in resolution order and
//! each call is awaited before the next one starts.

pub mod backfill;
pub mod error;
pub mod orchestrator;
pub mod summary;

pub use backfill::{backfill, backfill_range, BackfillReport};
pub use error::{PersistError, PipelineError};
pub use orchestrator::{GoogleScope, GoogleSource, Orchestrator, RunOptions, TiktokSource};
pub use summary::{ReportStatus, ReportSummary, RunSummary};
