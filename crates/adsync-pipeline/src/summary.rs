//! Per-run reporting.

use std::path::PathBuf;

use serde::Serialize;

use adsync_core::{ReportDate, ReportKind};
use adsync_warehouse::LoadOutcome;

/// Terminal state of one report within a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportStatus {
    /// No accounts were resolved; nothing was fetched.
    NoAccounts,
    /// Accounts were fetched but no row survived the filters.
    NoRows,
    /// Rows were fetched and deliberately not exported or loaded.
    DryRun,
    Loaded { outcome: LoadOutcome },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub kind: ReportKind,
    pub accounts_attempted: usize,
    /// Accounts whose fetch failed, with the error.
    pub accounts_failed: Vec<(String, String)>,
    /// Rows returned by the platform, before the impression filter.
    pub rows_fetched: usize,
    pub rows_kept: usize,
    pub export_path: Option<PathBuf>,
    pub status: ReportStatus,
}

impl ReportSummary {
    pub(crate) fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            accounts_attempted: 0,
            accounts_failed: Vec::new(),
            rows_fetched: 0,
            rows_kept: 0,
            export_path: None,
            status: ReportStatus::NoAccounts,
        }
    }

    pub fn rows_appended(&self) -> u64 {
        match &self.status {
            ReportStatus::Loaded { outcome } => outcome.rows_appended(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub date: ReportDate,
    pub dry_run: bool,
    /// Hierarchy seeds whose traversal failed (Google only).
    pub failed_seeds: Vec<String>,
    pub reports: Vec<ReportSummary>,
}

impl RunSummary {
    pub fn report(&self, kind: ReportKind) -> Option<&ReportSummary> {
        self.reports.iter().find(|r| r.kind == kind)
    }

    pub fn rows_appended(&self) -> u64 {
        self.reports.iter().map(ReportSummary::rows_appended).sum()
    }

    pub fn accounts_failed(&self) -> usize {
        self.reports.iter().map(|r| r.accounts_failed.len()).sum()
    }
}
