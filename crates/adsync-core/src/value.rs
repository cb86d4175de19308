//! # Cell Values and Key Tuples
//!
//! [`CellValue`] is the schema-ordered, warehouse-neutral form of one field
//! of one row. [`KeyTuple`] is the composite business key of a row: the
//! date, then the remaining key columns as strings.
//!
//! Key tuples compare on every component. Two rows that agree on the date
//! and campaign but differ on the customer are different rows.

use serde::{Deserialize, Serialize};

use crate::schema::{ColumnType, TableSchema};
use crate::temporal::ReportDate;

/// One typed field value. `None` is a SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Date(ReportDate),
    Text(Option<String>),
    Integer(Option<i64>),
    Float(Option<f64>),
}

impl CellValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Date(_) => ColumnType::Date,
            Self::Text(_) => ColumnType::String,
            Self::Integer(_) => ColumnType::Integer,
            Self::Float(_) => ColumnType::Float,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Self::Date(_) => false,
            Self::Text(v) => v.is_none(),
            Self::Integer(v) => v.is_none(),
            Self::Float(v) => v.is_none(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }
}

/// Composite primary key of one row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyTuple {
    pub date: ReportDate,
    /// Remaining key columns in key order.
    pub parts: Vec<String>,
}

impl KeyTuple {
    pub fn new<I, S>(date: ReportDate, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            date,
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Project a key out of a schema-ordered row.
    ///
    /// Returns `None` if the row does not have the shape the schema
    /// declares for its key columns (wrong type or `NULL`).
    pub fn project(schema: &TableSchema, cells: &[CellValue]) -> Option<Self> {
        let mut indices = schema.key_indices().into_iter();
        let date = match cells.get(indices.next()?)? {
            CellValue::Date(d) => *d,
            _ => return None,
        };
        let parts = indices
            .map(|i| match cells.get(i) {
                Some(CellValue::Text(Some(s))) => Some(s.clone()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { date, parts })
    }
}

impl std::fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.date)?;
        for p in &self.parts {
            write!(f, ", {p}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TIKTOK_CAMPAIGN;

    fn date() -> ReportDate {
        ReportDate::parse("2024-03-01").unwrap()
    }

    #[test]
    fn key_display() {
        let k = KeyTuple::new(date(), ["advX", "campZ"]);
        assert_eq!(k.to_string(), "(2024-03-01, advX, campZ)");
    }

    #[test]
    fn keys_differ_on_any_component() {
        let a = KeyTuple::new(date(), ["advX", "campY"]);
        let b = KeyTuple::new(date(), ["advW", "campY"]);
        assert_ne!(a, b);
    }

    #[test]
    fn project_reads_key_columns() {
        let mut cells = vec![
            CellValue::Date(date()),
            CellValue::text("advX"),
            CellValue::text("campY"),
        ];
        cells.extend(std::iter::repeat(CellValue::Integer(None)).take(13));
        let key = KeyTuple::project(&TIKTOK_CAMPAIGN, &cells).unwrap();
        assert_eq!(key, KeyTuple::new(date(), ["advX", "campY"]));
    }

    #[test]
    fn project_rejects_null_key() {
        let cells = vec![
            CellValue::Date(date()),
            CellValue::Text(None),
            CellValue::text("campY"),
        ];
        assert!(KeyTuple::project(&TIKTOK_CAMPAIGN, &cells).is_none());
    }
}
