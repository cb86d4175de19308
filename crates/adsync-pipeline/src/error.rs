//! Pipeline error types.

use adsync_core::{ReportKind, ValidationError};
use adsync_source::SourceError;
use adsync_warehouse::{ExportError, LoadError, WarehouseError};

use crate::summary::RunSummary;

/// Why one report's batch was not persisted.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("load failed: {0}")]
    Load(#[from] LoadError),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The account list could not be obtained at all.
    #[error("could not resolve accounts: {0}")]
    Resolve(#[source] SourceError),

    /// At least one report of the run was not persisted. Other reports of
    /// the same run were still attempted.
    #[error(
        "{}: {} report(s) not persisted: {}",
        .summary.date,
        .failures.len(),
        describe(.failures)
    )]
    Persist {
        summary: Box<RunSummary>,
        failures: Vec<(ReportKind, PersistError)>,
    },

    /// The report date has no following day to bound its range.
    #[error("invalid report date: {0}")]
    InvalidDate(#[from] ValidationError),

    #[error("could not prepare {table}: {source}")]
    Prepare {
        table: String,
        source: WarehouseError,
    },
}

fn describe(failures: &[(ReportKind, PersistError)]) -> String {
    failures
        .iter()
        .map(|(kind, err)| format!("{kind}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
