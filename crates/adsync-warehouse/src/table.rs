//! Validated destination table references.
//!
//! Table names are interpolated into DDL and DML, so both parts must pass
//! [`is_identifier`] before a `TableRef` exists.

use std::fmt;

use adsync_core::schema::is_identifier;
use adsync_core::{ReportDate, ReportKind};

use crate::error::WarehouseError;

/// Postgres truncates identifiers past 63 bytes; leave room for `_pYYYYMM`.
const MAX_TABLE_LEN: usize = 55;

/// `dataset.table`, both parts plain lower-case identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableRef {
    dataset: String,
    table: String,
}

impl TableRef {
    pub fn new(dataset: impl Into<String>, table: impl Into<String>) -> Result<Self, WarehouseError> {
        let dataset = dataset.into();
        let table = table.into();
        if !is_identifier(&dataset) || dataset.len() > MAX_TABLE_LEN {
            return Err(WarehouseError::InvalidIdentifier(dataset));
        }
        if !is_identifier(&table) || table.len() > MAX_TABLE_LEN {
            return Err(WarehouseError::InvalidIdentifier(table));
        }
        Ok(Self { dataset, table })
    }

    /// Parse `dataset.table`.
    pub fn parse(qualified: &str) -> Result<Self, WarehouseError> {
        match qualified.split_once('.') {
            Some((dataset, table)) => Self::new(dataset, table),
            None => Err(WarehouseError::InvalidIdentifier(qualified.to_string())),
        }
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Quoted `"dataset"."table"` for SQL.
    pub fn quoted(&self) -> String {
        format!("\"{}\".\"{}\"", self.dataset, self.table)
    }

    /// Name of the partition holding the month that starts at `month`.
    pub fn partition_name(&self, month: ReportDate) -> String {
        format!("{}_p{}", self.table, month.as_naive().format("%Y%m"))
    }

    /// Quoted partition name for the month that starts at `month`.
    pub fn quoted_partition(&self, month: ReportDate) -> String {
        format!("\"{}\".\"{}\"", self.dataset, self.partition_name(month))
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.table)
    }
}

impl std::str::FromStr for TableRef {
    type Err = WarehouseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One destination table per report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSet {
    pub google_campaign: TableRef,
    pub google_conversion: TableRef,
    pub tiktok_campaign: TableRef,
}

impl TableSet {
    /// The default `*_staging` tables in `dataset`.
    pub fn staging(dataset: &str) -> Result<Self, WarehouseError> {
        Ok(Self {
            google_campaign: TableRef::new(dataset, "google_campaign_staging")?,
            google_conversion: TableRef::new(dataset, "google_conversion_staging")?,
            tiktok_campaign: TableRef::new(dataset, "tiktok_campaign_staging")?,
        })
    }

    pub fn table_for(&self, kind: ReportKind) -> &TableRef {
        match kind {
            ReportKind::GoogleCampaign => &self.google_campaign,
            ReportKind::GoogleConversion => &self.google_conversion,
            ReportKind::TiktokCampaign => &self.tiktok_campaign,
        }
    }
}
