//! # adsync-warehouse — Destination Side of the Pipeline
//!
//! - [`Warehouse`]: the three operations the loader needs from a
//!   destination (idempotent create, key read for a date window, append).
//! - [`IncrementalLoader`]: appends only rows whose composite key is not
//!   already present for the batch's date window.
//! - [`PgWarehouse`]: PostgreSQL implementation with month-partitioned
//!   tables.
//! - [`MemoryWarehouse`]: in-process implementation for tests and dry
//!   tooling, with failure injection.
//! - [`ParquetExporter`]: local Parquet snapshot of a batch.
//!
//! ## Concurrency
//!
//! The key read and the append are two separate statements. Two processes
//! loading the same key range at the same time can both see the range as
//! empty and both append. Runs against one destination table are expected
//! to be serialized by whoever schedules them.

pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod memory;
pub mod postgres;
pub mod table;
pub mod warehouse;

pub use config::{ConfigError, WarehouseConfig};
pub use error::{ExportError, LoadError, WarehouseError};
pub use export::ParquetExporter;
pub use loader::{IncrementalLoader, LoadOutcome, ReadPolicy};
pub use memory::MemoryWarehouse;
pub use postgres::PgWarehouse;
pub use table::{TableRef, TableSet};
pub use warehouse::Warehouse;
