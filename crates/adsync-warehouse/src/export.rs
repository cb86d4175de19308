//! Parquet snapshots of report batches.
//!
//! One file per batch, laid out as
//! `<root>/<report dir>/YYYY/MM/DD/<prefix>_report_YYYYMMDD_HHMMSS.parquet`
//! where the date parts are the report date and the suffix is the wall-clock
//! time of the export. Columns follow the report's [`TableSchema`].

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDateTime};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use adsync_core::{CellValue, ColumnType, ReportDate, ReportKind, ReportRecord, TableSchema};

use crate::error::ExportError;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

// =============================================================================
// Exporter
// =============================================================================

#[derive(Debug, Clone)]
pub struct ParquetExporter {
    root: PathBuf,
}

impl ParquetExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a snapshot of `kind` for `date`, taken at `stamp`, is written.
    pub fn path_for(&self, kind: ReportKind, date: ReportDate, stamp: NaiveDateTime) -> PathBuf {
        let (year, month, day) = date.path_parts();
        self.root
            .join(kind.export_subdir())
            .join(year)
            .join(month)
            .join(day)
            .join(format!(
                "{}_report_{}.parquet",
                kind.export_prefix(),
                stamp.format("%Y%m%d_%H%M%S")
            ))
    }

    /// Write `rows` to a new Parquet file and return its path.
    ///
    /// Creates missing directories. An existing file at the same path (same
    /// report, date and second) is overwritten.
    pub fn export<R: ReportRecord>(
        &self,
        date: ReportDate,
        rows: &[R],
        stamp: NaiveDateTime,
    ) -> Result<PathBuf, ExportError> {
        let path = self.path_for(R::KIND, date, stamp);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| ExportError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let cells: Vec<Vec<CellValue>> = rows.iter().map(ReportRecord::cells).collect();
        let schema = arrow_schema(R::SCHEMA);
        let batch = record_batch(R::SCHEMA, Arc::clone(&schema), &cells)?;

        let file = File::create(&path).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        tracing::info!(
            report = %R::KIND,
            date = %date,
            rows = rows.len(),
            path = %path.display(),
            "wrote parquet snapshot"
        );
        Ok(path)
    }
}

// =============================================================================
// Arrow conversion
// =============================================================================

/// Arrow schema for a table: one field per column, REQUIRED columns
/// non-nullable.
pub fn arrow_schema(schema: &TableSchema) -> SchemaRef {
    let fields: Vec<Field> = schema
        .columns
        .iter()
        .map(|c| {
            let ty = match c.ty {
                ColumnType::Date => DataType::Date32,
                ColumnType::String => DataType::Utf8,
                ColumnType::Integer => DataType::Int64,
                ColumnType::Float => DataType::Float64,
            };
            Field::new(c.name, ty, c.is_nullable())
        })
        .collect();
    Arc::new(Schema::new(fields))
}

/// Columnar batch from schema-ordered rows.
pub fn record_batch(
    table: &TableSchema,
    schema: SchemaRef,
    rows: &[Vec<CellValue>],
) -> Result<RecordBatch, ExportError> {
    let columns = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| -> Result<ArrayRef, ExportError> {
            let mismatch = || ExportError::CellType {
                column: col.name,
                expected: col.ty,
            };
            let cells = rows.iter().map(|r| r.get(i));
            let array: ArrayRef = match col.ty {
                ColumnType::Date => Arc::new(Date32Array::from(
                    cells
                        .map(|c| match c {
                            Some(CellValue::Date(d)) => Ok(epoch_days(*d)),
                            _ => Err(mismatch()),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                ColumnType::String => Arc::new(StringArray::from(
                    cells
                        .map(|c| match c {
                            Some(CellValue::Text(v)) => Ok(v.clone()),
                            _ => Err(mismatch()),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                ColumnType::Integer => Arc::new(Int64Array::from(
                    cells
                        .map(|c| match c {
                            Some(CellValue::Integer(v)) => Ok(*v),
                            _ => Err(mismatch()),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                )),
                ColumnType::Float => Arc::new(Float64Array::from(
                    cells
                        .map(|c| match c {
                            Some(CellValue::Float(v)) => Ok(*v),
                            _ => Err(mismatch()),
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                )),
            };
            Ok(array)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordBatch::try_new(schema, columns)?)
}

fn epoch_days(date: ReportDate) -> i32 {
    date.as_naive().num_days_from_ce() - UNIX_EPOCH_FROM_CE
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_core::{GoogleConversionRow, TiktokCampaignRow};
    use arrow::array::Array;
    use chrono::NaiveDate;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn date() -> ReportDate {
        ReportDate::parse("2024-03-01").unwrap()
    }

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(6, 30, 5)
            .unwrap()
    }

    #[test]
    fn snapshot_paths() {
        let exporter = ParquetExporter::new("/lake");
        assert_eq!(
            exporter.path_for(ReportKind::GoogleCampaign, date(), stamp()),
            PathBuf::from("/lake/google_ads/campaign/2024/03/01/google_report_20240302_063005.parquet")
        );
        assert_eq!(
            exporter.path_for(ReportKind::GoogleConversion, date(), stamp()),
            PathBuf::from(
                "/lake/google_ads/conversion_goal/2024/03/01/google_conversion_report_20240302_063005.parquet"
            )
        );
        assert_eq!(
            exporter.path_for(ReportKind::TiktokCampaign, date(), stamp()),
            PathBuf::from("/lake/tiktok_ads/2024/03/01/tiktok_report_20240302_063005.parquet")
        );
    }

    #[test]
    fn epoch_day_numbers() {
        assert_eq!(epoch_days(ReportDate::parse("1970-01-01").unwrap()), 0);
        assert_eq!(epoch_days(ReportDate::parse("2024-03-01").unwrap()), 19_783);
    }

    #[test]
    fn export_writes_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = ParquetExporter::new(dir.path());

        let mut a = TiktokCampaignRow::empty(date(), "advX", "campY");
        a.impressions = Some(10);
        a.spend = Some(1.5);
        let b = TiktokCampaignRow::empty(date(), "advX", "campZ");

        let path = exporter.export(date(), &[a, b], stamp()).unwrap();
        assert!(path.starts_with(dir.path().join("tiktok_ads/2024/03/01")));

        let file = File::open(&path).unwrap();
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 2);

        let batch = &batches[0];
        assert_eq!(batch.schema().field(0).name(), "date");
        assert_eq!(batch.schema().field(0).data_type(), &DataType::Date32);
        let campaigns = batch
            .column_by_name("campaign_id")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(campaigns.value(1), "campZ");
        let impressions = batch
            .column_by_name("impressions")
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(impressions.value(0), 10);
        assert!(impressions.is_null(1));
    }

    #[test]
    fn conversion_schema_has_every_column() {
        let schema = arrow_schema(GoogleConversionRow::SCHEMA);
        assert_eq!(schema.fields().len(), GoogleConversionRow::SCHEMA.columns.len());
        assert!(!schema.field_with_name("conversion_action").unwrap().is_nullable());
        assert!(schema.field_with_name("conversion_action_name").unwrap().is_nullable());
    }

    #[test]
    fn mistyped_cell_is_rejected() {
        let table = TiktokCampaignRow::SCHEMA;
        let mut row = TiktokCampaignRow::empty(date(), "advX", "campY").cells();
        row[7] = CellValue::Float(Some(1.0));
        let err = record_batch(table, arrow_schema(table), &[row]).unwrap_err();
        assert!(matches!(err, ExportError::CellType { column: "impressions", .. }));
    }
}
