//! Date backfill: run a daily job for every date from a start date through
//! yesterday, one date at a time.
//!
//! A failed date is logged and recorded, and the next date still runs.

use std::future::Future;

use serde::Serialize;

use adsync_core::{DateRange, ReportDate};

use crate::error::PipelineError;
use crate::summary::RunSummary;

/// `[start, today)`, or `None` when `start` is today or later.
pub fn backfill_range(start: ReportDate, today: ReportDate) -> Option<DateRange> {
    DateRange::new(start, today).ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillReport {
    pub succeeded: Vec<ReportDate>,
    /// Dates whose run returned an error, with the error.
    pub failed: Vec<(ReportDate, String)>,
    pub rows_appended: u64,
}

impl BackfillReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_dates(&self) -> Vec<ReportDate> {
        self.failed.iter().map(|(d, _)| *d).collect()
    }
}

/// Call `run` for each day of `range`, in order, awaiting each before the
/// next.
pub async fn backfill<F, Fut>(range: &DateRange, mut run: F) -> BackfillReport
where
    F: FnMut(ReportDate) -> Fut,
    Fut: Future<Output = Result<RunSummary, PipelineError>>,
{
    let mut report = BackfillReport::default();
    tracing::info!(range = %range, "starting backfill");

    for date in range.days() {
        match run(date).await {
            Ok(summary) => {
                report.rows_appended += summary.rows_appended();
                report.succeeded.push(date);
            }
            Err(err) => {
                tracing::error!(date = %date, error = %err, "backfill date failed, continuing");
                report.failed.push((date, err.to_string()));
            }
        }
    }

    if report.is_success() {
        tracing::info!(
            days = report.succeeded.len(),
            appended = report.rows_appended,
            "backfill complete"
        );
    } else {
        tracing::warn!(
            days = report.succeeded.len(),
            failed = report.failed.len(),
            "backfill finished with failed dates"
        );
    }
    report
}
