//! # Report Records
//!
//! The [`ReportRecord`] trait ties a typed row struct to its schema and to
//! the account type that owns it. Everything generic in the pipeline (the
//! fetch loop, the impression filter, key reconciliation, export) works
//! through this trait.

use std::fmt::Display;
use std::hash::Hash;

use crate::schema::{ReportKind, TableSchema};
use crate::temporal::ReportDate;
use crate::value::{CellValue, KeyTuple};

/// A typed report row with a fixed field list matching a [`TableSchema`].
pub trait ReportRecord: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Account identifier the platform reports against.
    type Account: Clone + Eq + Hash + Display + std::fmt::Debug + Send + Sync;

    /// Which registered report this is.
    const KIND: ReportKind;

    /// Destination table descriptor.
    const SCHEMA: &'static TableSchema;

    /// Platform dimension names requested for this report.
    const DIMENSIONS: &'static [&'static str];

    /// Platform metric names requested for this report.
    const METRICS: &'static [&'static str];

    /// Whether rows with no impressions are dropped after fetch.
    const FILTERS_ZERO_IMPRESSIONS: bool;

    fn date(&self) -> ReportDate;

    /// Impression count, for reports that carry one.
    fn impressions(&self) -> Option<i64> {
        None
    }

    /// Composite primary key per [`Self::SCHEMA`].
    fn key(&self) -> KeyTuple;

    /// All fields in schema column order.
    fn cells(&self) -> Vec<CellValue>;

    /// Whether this row survives the post-fetch impression filter.
    fn has_impressions(&self) -> bool {
        !Self::FILTERS_ZERO_IMPRESSIONS || self.impressions().is_some_and(|n| n > 0)
    }
}
