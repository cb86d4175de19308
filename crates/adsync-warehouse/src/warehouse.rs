//! The destination capability the loader writes through.

use std::collections::HashSet;

use async_trait::async_trait;

use adsync_core::{CellValue, DateWindow, KeyTuple, TableSchema};

use crate::error::WarehouseError;
use crate::table::TableRef;

/// A columnar destination partitioned by month on the schema's date column.
///
/// Rows are passed in schema column order, as produced by
/// [`ReportRecord::cells`](adsync_core::ReportRecord::cells).
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Create `table` if it does not exist. Calling this on an existing
    /// table is a no-op.
    async fn create_table(&self, table: &TableRef, schema: &TableSchema)
        -> Result<(), WarehouseError>;

    /// Key tuples of every row in `table` whose date falls in `window`
    /// (inclusive on both ends).
    async fn existing_keys(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        window: &DateWindow,
    ) -> Result<HashSet<KeyTuple>, WarehouseError>;

    /// Append rows. Returns the number of rows written.
    async fn append(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        rows: &[Vec<CellValue>],
    ) -> Result<u64, WarehouseError>;
}
