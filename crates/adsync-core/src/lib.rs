//! # adsync-core — Foundational Types for adsync
//!
//! This crate defines the types every other adsync crate agrees on. It
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for platform identifiers.** `CustomerId` and
//!    `AdvertiserId` are validated at construction. Platform-assigned IDs are
//!    kept as strings end to end; they are never parsed into integers.
//!
//! 2. **Calendar dates, not timestamps.** `ReportDate` has no time of day and
//!    no timezone, and always renders as `YYYY-MM-DD`.
//!
//! 3. **One static schema registry.** Each report shape is a `TableSchema`
//!    constant: ordered columns, composite primary key, partition column.
//!    Table creation, key lookups, and export all read from it.
//!
//! 4. **Typed records.** Each report shape has a struct implementing
//!    [`ReportRecord`], so field lists are checked at compile time and
//!    rows convert to schema-ordered [`CellValue`]s in exactly one place.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `adsync-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod coerce;
pub mod error;
pub mod identity;
pub mod record;
pub mod reports;
pub mod schema;
pub mod temporal;
pub mod value;

pub use error::{SchemaError, ValidationError};
pub use identity::{AdvertiserId, CustomerId};
pub use record::ReportRecord;
pub use reports::{GoogleCampaignRow, GoogleConversionRow, TiktokCampaignRow};
pub use schema::{Column, ColumnMode, ColumnType, ReportKind, TableSchema};
pub use temporal::{DateRange, DateWindow, ReportDate};
pub use value::{CellValue, KeyTuple};
