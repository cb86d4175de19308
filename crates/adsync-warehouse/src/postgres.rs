//! PostgreSQL [`Warehouse`].
//!
//! Each destination table is a declaratively partitioned parent
//! (`PARTITION BY RANGE` on the schema's date column) with one child per
//! month, named `<table>_pYYYYMM`. Child partitions are created on demand,
//! in the same transaction as the rows that need them.
//!
//! Tables carry a non-unique index on the key columns. Key uniqueness is
//! the loader's job; the table does not enforce it.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder, Row};

use adsync_core::{CellValue, DateWindow, KeyTuple, ReportDate, TableSchema};

use crate::config::WarehouseConfig;
use crate::error::WarehouseError;
use crate::table::TableRef;
use crate::warehouse::Warehouse;

/// Postgres caps bind parameters per statement at `u16::MAX`.
const MAX_BINDS: usize = u16::MAX as usize;

#[derive(Debug, Clone)]
pub struct PgWarehouse {
    pool: PgPool,
}

impl PgWarehouse {
    /// Open a connection pool from configuration.
    pub async fn connect(config: &WarehouseConfig) -> Result<Self, WarehouseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(config.database_url.as_str())
            .await
            .map_err(|e| WarehouseError::database(&config.dataset, e))?;
        tracing::info!(dataset = %config.dataset, "connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn create_table(
        &self,
        table: &TableRef,
        schema: &TableSchema,
    ) -> Result<(), WarehouseError> {
        for statement in create_table_sql(table, schema) {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| WarehouseError::database(table, e))?;
        }
        tracing::debug!(table = %table, "destination table ready");
        Ok(())
    }

    async fn existing_keys(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        window: &DateWindow,
    ) -> Result<HashSet<KeyTuple>, WarehouseError> {
        let rows = sqlx::query(&existing_keys_sql(table, schema))
            .bind(window.first.as_naive())
            .bind(window.last.as_naive())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| WarehouseError::database(table, e))?;

        let width = schema.primary_key.len();
        rows.iter()
            .map(|row| -> Result<KeyTuple, sqlx::Error> {
                let date: NaiveDate = row.try_get(0)?;
                let parts = (1..width)
                    .map(|i| row.try_get::<String, _>(i))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(KeyTuple::new(ReportDate::new(date), parts))
            })
            .collect::<Result<HashSet<_>, sqlx::Error>>()
            .map_err(|e| WarehouseError::database(table, e))
    }

    async fn append(
        &self,
        table: &TableRef,
        schema: &TableSchema,
        rows: &[Vec<CellValue>],
    ) -> Result<u64, WarehouseError> {
        let Some(window) = DateWindow::spanning(rows.iter().filter_map(|r| partition_date(schema, r)))
        else {
            return Ok(0);
        };
        let db = |e: sqlx::Error| WarehouseError::database(table, e);

        let mut tx = self.pool.begin().await.map_err(db)?;
        for month in window.months() {
            let statement = partition_sql(table, month)?;
            sqlx::query(&statement).execute(&mut *tx).await.map_err(db)?;
        }

        let columns = quoted_columns(schema.column_names());
        let per_statement = (MAX_BINDS / schema.columns.len().max(1)).max(1);
        let mut written = 0u64;
        for chunk in rows.chunks(per_statement) {
            let mut qb: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO {} ({columns}) ", table.quoted()));
            qb.push_values(chunk, |mut b, row| {
                for cell in row {
                    match cell {
                        CellValue::Date(d) => b.push_bind(d.as_naive()),
                        CellValue::Text(v) => b.push_bind(v.clone()),
                        CellValue::Integer(v) => b.push_bind(*v),
                        CellValue::Float(v) => b.push_bind(*v),
                    };
                }
            });
            written += qb
                .build()
                .execute(&mut *tx)
                .await
                .map_err(db)?
                .rows_affected();
        }
        tx.commit().await.map_err(db)?;

        tracing::debug!(table = %table, rows = written, "insert committed");
        Ok(written)
    }
}

fn partition_date(schema: &TableSchema, row: &[CellValue]) -> Option<ReportDate> {
    match row.get(schema.column_index(schema.partition_column)?)? {
        CellValue::Date(d) => Some(*d),
        _ => None,
    }
}

fn quoted_columns<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names
        .map(|n| format!("\"{n}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Statements that create the dataset, the partitioned parent table and its
/// key index. All are idempotent.
pub fn create_table_sql(table: &TableRef, schema: &TableSchema) -> Vec<String> {
    let columns = schema
        .columns
        .iter()
        .map(|c| {
            let null = if c.is_nullable() { "" } else { " NOT NULL" };
            format!("\"{}\" {}{null}", c.name, c.ty.sql_type())
        })
        .collect::<Vec<_>>()
        .join(", ");
    vec![
        format!("CREATE SCHEMA IF NOT EXISTS \"{}\"", table.dataset()),
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({columns}) PARTITION BY RANGE (\"{}\")",
            table.quoted(),
            schema.partition_column
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS \"{}_key_idx\" ON {} ({})",
            table.table(),
            table.quoted(),
            quoted_columns(schema.primary_key.iter().copied())
        ),
    ]
}

/// Child partition covering the calendar month that starts at `month`.
pub fn partition_sql(table: &TableRef, month: ReportDate) -> Result<String, WarehouseError> {
    let month = month.month_start();
    let next = month.next_month_start().ok_or_else(|| WarehouseError::Unavailable {
        table: table.to_string(),
        reason: format!("no partition bound after {month}"),
    })?;
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} PARTITION OF {} FOR VALUES FROM ('{month}') TO ('{next}')",
        table.quoted_partition(month),
        table.quoted()
    ))
}

fn existing_keys_sql(table: &TableRef, schema: &TableSchema) -> String {
    format!(
        "SELECT {} FROM {} WHERE \"{}\" BETWEEN $1 AND $2",
        quoted_columns(schema.primary_key.iter().copied()),
        table.quoted(),
        schema.partition_column
    )
}
