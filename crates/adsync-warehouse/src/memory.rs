//! In-process [`Warehouse`] backed by a `parking_lot` mutex.
//!
//! Used by the pipeline tests and anywhere a real database is not wanted.
//! Each operation can be made to fail on demand so error paths can be
//! exercised without a broken database.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use adsync_core::{CellValue, ColumnMode, DateWindow, KeyTuple, TableSchema};

use crate::error::WarehouseError;
use crate::table::TableRef;
use crate::warehouse::Warehouse;

/// How many times each operation was called.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallLog {
    pub create_table: usize,
    pub existing_keys: usize,
    pub append: usize,
}

impl CallLog {
    pub fn total(&self) -> usize {
        self.create_table + self.existing_keys + self.append
    }
}

#[derive(Debug, Default)]
struct Faults {
    create: bool,
    read: bool,
    write: bool,
}

#[derive(Debug)]
struct MemTable {
    schema: TableSchema,
    rows: Vec<Vec<CellValue>>,
}

#[derive(Debug, Default)]
pub struct MemoryWarehouse {
    tables: Mutex<BTreeMap<TableRef, MemTable>>,
    faults: Mutex<Faults>,
    calls: Mutex<CallLog>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_table` fail until reset.
    pub fn fail_creates(&self, fail: bool) {
        self.faults.lock().create = fail;
    }

    /// Make `existing_keys` fail until reset.
    pub fn fail_reads(&self, fail: bool) {
        self.faults.lock().read = fail;
    }

    /// Make `append` fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.faults.lock().write = fail;
    }

    /// Put rows into `table` directly, creating it if needed. Not counted
    /// in [`Self::calls`].
    pub fn seed(&self, table: &TableRef, schema: &TableSchema, rows: Vec<Vec<CellValue>>) {
        self.tables
            .lock()
            .entry(table.clone())
            .or_insert_with(|| MemTable {
                schema: *schema,
                rows: Vec::new(),
            })
            .rows
            .extend(rows);
    }

    pub fn has_table(&self, table: &TableRef) -> bool {
        self.tables.lock().contains_key(table)
    }

    /// Snapshot of every row in `table`, in insertion order.
    pub fn rows(&self, table: &TableRef) -> Vec<Vec<CellValue>> {
        self.tables
            .lock()
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn row_count(&self, table: &TableRef) -> usize {
        self.tables.lock().get(table).map_or(0, |t| t.rows.len())
    }

    /// Key tuples of every row in `table`, in insertion order, duplicates
    /// included.
    pub fn keys(&self, table: &TableRef) -> Vec<KeyTuple> {
        self.tables
            .lock()
            .get(table)
            .map(|t| {
                t.rows
                    .iter()
                    .filter_map(|row| KeyTuple::project(&t.schema, row))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn calls(&self) -> CallLog {
        *self.calls.lock()
    }
}

#[async_trait]
impl Warehouse for MemoryWarehouse {
    async fn create_table(
        &self,
        table: &TableRef,
        schema: &TableSchema,
    ) -> Result<(), WarehouseError> {
        self.calls.lock().create_table += 1;
        if self.faults.lock().create {
            return Err(unavailable(table, "create disabled"));
        }
        self.tables
            .lock()
            .entry(table.clone())
            .or_insert_with(|| MemTable {
                schema: *schema,
                rows: Vec::new(),
            });
        Ok(())
    }

    async fn existing_keys(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        window: &DateWindow,
    ) -> Result<HashSet<KeyTuple>, WarehouseError> {
        self.calls.lock().existing_keys += 1;
        if self.faults.lock().read {
            return Err(unavailable(table, "read disabled"));
        }
        let tables = self.tables.lock();
        let Some(t) = tables.get(table) else {
            return Ok(HashSet::new());
        };
        Ok(t.rows
            .iter()
            .filter_map(|row| KeyTuple::project(schema, row))
            .filter(|key| window.contains(key.date))
            .collect())
    }

    async fn append(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        rows: &[Vec<CellValue>],
    ) -> Result<u64, WarehouseError> {
        self.calls.lock().append += 1;
        if self.faults.lock().write {
            return Err(unavailable(table, "write disabled"));
        }
        for row in rows {
            check_row(schema, row).map_err(|reason| WarehouseError::Rejected {
                table: table.to_string(),
                reason,
            })?;
        }
        let mut tables = self.tables.lock();
        let t = tables
            .get_mut(table)
            .ok_or_else(|| unavailable(table, "table does not exist"))?;
        t.rows.extend(rows.iter().cloned());
        Ok(rows.len() as u64)
    }
}

fn unavailable(table: &TableRef, reason: &str) -> WarehouseError {
    WarehouseError::Unavailable {
        table: table.to_string(),
        reason: reason.to_string(),
    }
}

/// Same checks a typed SQL table would make on insert.
fn check_row(schema: &TableSchema, row: &[CellValue]) -> Result<(), String> {
    if row.len() != schema.columns.len() {
        return Err(format!(
            "expected {} columns, got {}",
            schema.columns.len(),
            row.len()
        ));
    }
    for (col, cell) in schema.columns.iter().zip(row) {
        if cell.column_type() != col.ty {
            return Err(format!("{} expects {}, got {}", col.name, col.ty, cell.column_type()));
        }
        if col.mode == ColumnMode::Required && cell.is_null() {
            return Err(format!("{} is REQUIRED", col.name));
        }
    }
    Ok(())
}
