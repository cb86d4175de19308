//! Warehouse, loader and export error types.

use std::path::PathBuf;

use adsync_core::SchemaError;

/// Errors from a [`Warehouse`](crate::Warehouse) operation.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// The database rejected or failed a statement.
    #[error("database error on {table}: {source}")]
    Database {
        table: String,
        source: sqlx::Error,
    },
    /// A dataset or table name is not a plain SQL identifier.
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    /// The destination cannot serve the request right now.
    #[error("{table} unavailable: {reason}")]
    Unavailable { table: String, reason: String },
    /// A row does not match the table's column types or nullability.
    #[error("row rejected by {table}: {reason}")]
    Rejected { table: String, reason: String },
}

impl WarehouseError {
    pub(crate) fn database(table: impl std::fmt::Display, source: sqlx::Error) -> Self {
        Self::Database {
            table: table.to_string(),
            source,
        }
    }
}

/// Errors from [`IncrementalLoader::load`](crate::IncrementalLoader::load).
///
/// Every variant is fatal for the batch. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),
    #[error("could not create {table}: {source}")]
    CreateTable {
        table: String,
        source: WarehouseError,
    },
    /// Reading existing keys failed under [`ReadPolicy::Strict`](crate::ReadPolicy::Strict).
    #[error("could not read existing keys from {table}: {source}")]
    ExistingRead {
        table: String,
        source: WarehouseError,
    },
    #[error("append to {table} failed: {source}")]
    Write {
        table: String,
        source: WarehouseError,
    },
}

/// Errors writing a Parquet snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    /// A row did not match the column type declared for its position.
    #[error("column {column} expects {expected}")]
    CellType {
        column: &'static str,
        expected: adsync_core::ColumnType,
    },
}
