//! # Error Hierarchy
//!
//! Structured error types for the foundational layer, built with `thiserror`.
//! Each variant carries the offending input so operators can fix
//! configuration without guesswork.

use thiserror::Error;

/// Validation errors for identifier newtypes and calendar dates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Google Ads customer ID is not a (possibly dashed) run of digits.
    #[error("invalid customer ID: \"{0}\" (expected digits, optionally as XXX-XXX-XXXX)")]
    InvalidCustomerId(String),

    /// TikTok advertiser ID is empty.
    #[error("invalid advertiser ID: must be non-empty")]
    InvalidAdvertiserId,

    /// Date string could not be read as a calendar day.
    #[error("invalid date: \"{value}\" ({reason})")]
    InvalidDate {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A half-open date range whose end does not come after its start.
    #[error("invalid date range: end {end} must be after start {start}")]
    InvalidDateRange {
        /// Inclusive start.
        start: String,
        /// Exclusive end.
        end: String,
    },
}

/// Inconsistencies in a [`TableSchema`](crate::schema::TableSchema) declaration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Two columns share a name.
    #[error("table {table}: duplicate column {column}")]
    DuplicateColumn { table: String, column: String },

    /// A column name is not a plain SQL identifier.
    #[error("table {table}: column name {column:?} is not a valid identifier")]
    InvalidColumnName { table: String, column: String },

    /// A primary-key column is missing from the column list.
    #[error("table {table}: key column {column} is not declared")]
    UnknownKeyColumn { table: String, column: String },

    /// The first key column must be the DATE partition column.
    #[error("table {table}: first key column must be the DATE partition column {partition}")]
    KeyMustStartWithDate { table: String, partition: String },

    /// Key columns after the date must be REQUIRED strings.
    #[error("table {table}: key column {column} must be a REQUIRED STRING")]
    InvalidKeyColumn { table: String, column: String },
}
