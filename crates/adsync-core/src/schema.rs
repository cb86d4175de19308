//! # Schema & Type Registry
//!
//! Static declarations of every destination table: ordered columns with a
//! semantic type and nullability, the composite primary key used for
//! dedup, and the DATE column the warehouse partitions on (by month).
//!
//! Descriptors are `const` and never mutated at runtime. Column order is the
//! order of [`ReportRecord::cells`](crate::record::ReportRecord::cells),
//! of `CREATE TABLE`, and of exported Parquet files.
//!
//! ## Key invariants
//!
//! [`TableSchema::validate`] enforces what the loader relies on:
//!
//! - the first key column is the partition column and has type `DATE`;
//! - every other key column is a `REQUIRED` `STRING`;
//! - column names are unique, lower-case SQL identifiers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Semantic column type, independent of any one warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Date,
    String,
    Integer,
    Float,
}

impl ColumnType {
    /// PostgreSQL type used when creating the column.
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Date => "DATE",
            Self::String => "TEXT",
            Self::Integer => "BIGINT",
            Self::Float => "DOUBLE PRECISION",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date => write!(f, "DATE"),
            Self::String => write!(f, "STRING"),
            Self::Integer => write!(f, "INTEGER"),
            Self::Float => write!(f, "FLOAT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnMode {
    Required,
    Nullable,
}

/// One column of a destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub mode: ColumnMode,
}

impl Column {
    pub const fn required(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty, mode: ColumnMode::Required }
    }

    pub const fn nullable(name: &'static str, ty: ColumnType) -> Self {
        Self { name, ty, mode: ColumnMode::Nullable }
    }

    pub fn is_nullable(&self) -> bool {
        self.mode == ColumnMode::Nullable
    }
}

/// Declarative description of one destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableSchema {
    /// Logical report name, also used in logs.
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Composite business key, date column first.
    pub primary_key: &'static [&'static str],
    /// DATE column used for month partitioning.
    pub partition_column: &'static str,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Positions of the key columns within [`Self::columns`], in key order.
    pub fn key_indices(&self) -> Vec<usize> {
        self.primary_key
            .iter()
            .filter_map(|k| self.column_index(k))
            .collect()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Check the invariants the loader and warehouse rely on.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let table = self.name.to_string();
        let mut seen = HashSet::new();
        for col in self.columns {
            if !is_identifier(col.name) {
                return Err(SchemaError::InvalidColumnName {
                    table,
                    column: col.name.to_string(),
                });
            }
            if !seen.insert(col.name) {
                return Err(SchemaError::DuplicateColumn {
                    table,
                    column: col.name.to_string(),
                });
            }
        }

        let date_first = self.primary_key.first() == Some(&self.partition_column)
            && self
                .column(self.partition_column)
                .is_some_and(|c| c.ty == ColumnType::Date && !c.is_nullable());
        if !date_first {
            return Err(SchemaError::KeyMustStartWithDate {
                table,
                partition: self.partition_column.to_string(),
            });
        }

        for key in &self.primary_key[1..] {
            let col = self.column(key).ok_or_else(|| SchemaError::UnknownKeyColumn {
                table: table.clone(),
                column: key.to_string(),
            })?;
            if col.ty != ColumnType::String || col.is_nullable() {
                return Err(SchemaError::InvalidKeyColumn {
                    table,
                    column: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Lower-case ASCII identifier: `[a-z_][a-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

use ColumnType::{Date, Float, Integer, String as Text};

/// Google Ads daily campaign performance.
pub const GOOGLE_CAMPAIGN: TableSchema = TableSchema {
    name: "google_campaign",
    columns: &[
        Column::required("date", Date),
        Column::required("customer_id", Text),
        Column::required("campaign_id", Text),
        Column::nullable("campaign_name", Text),
        Column::nullable("currency_code", Text),
        Column::nullable("impressions", Integer),
        Column::nullable("clicks", Integer),
        Column::nullable("video_views", Integer),
        Column::nullable("engagements", Integer),
        Column::nullable("conversions", Float),
        Column::nullable("all_conversions", Float),
        Column::nullable("view_through_conversions", Float),
        Column::nullable("cost_micros", Float),
        Column::nullable("ctr", Float),
        Column::nullable("average_cpc", Float),
        Column::nullable("absolute_top_impression_percentage", Float),
        Column::nullable("top_impression_percentage", Float),
        Column::nullable("cost_per_conversion", Float),
    ],
    primary_key: &["date", "customer_id", "campaign_id"],
    partition_column: "date",
};

/// Google Ads daily conversions broken down by conversion action.
pub const GOOGLE_CONVERSION: TableSchema = TableSchema {
    name: "google_conversion",
    columns: &[
        Column::required("date", Date),
        Column::required("customer_id", Text),
        Column::required("campaign_id", Text),
        Column::nullable("campaign_name", Text),
        Column::required("conversion_action", Text),
        Column::nullable("conversion_action_name", Text),
        Column::nullable("conversion_action_category", Text),
        Column::nullable("conversions", Float),
        Column::nullable("all_conversions", Float),
        Column::nullable("view_through_conversions", Float),
    ],
    primary_key: &["date", "customer_id", "campaign_id", "conversion_action"],
    partition_column: "date",
};

/// TikTok daily auction-campaign performance.
pub const TIKTOK_CAMPAIGN: TableSchema = TableSchema {
    name: "tiktok_campaign",
    columns: &[
        Column::required("date", Date),
        Column::required("advertiser_id", Text),
        Column::required("campaign_id", Text),
        Column::nullable("advertiser_name", Text),
        Column::nullable("campaign_name", Text),
        Column::nullable("objective_type", Text),
        Column::nullable("reach", Integer),
        Column::nullable("impressions", Integer),
        Column::nullable("clicks", Integer),
        Column::nullable("video_play_actions", Integer),
        Column::nullable("result", Integer),
        Column::nullable("checkout", Integer),
        Column::nullable("spend", Float),
        Column::nullable("ctr", Float),
        Column::nullable("cpc", Float),
        Column::nullable("cost_per_result", Float),
    ],
    primary_key: &["date", "advertiser_id", "campaign_id"],
    partition_column: "date",
};

/// The three report shapes the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    GoogleCampaign,
    GoogleConversion,
    TiktokCampaign,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [
        ReportKind::GoogleCampaign,
        ReportKind::GoogleConversion,
        ReportKind::TiktokCampaign,
    ];

    pub fn schema(&self) -> &'static TableSchema {
        match self {
            Self::GoogleCampaign => &GOOGLE_CAMPAIGN,
            Self::GoogleConversion => &GOOGLE_CONVERSION,
            Self::TiktokCampaign => &TIKTOK_CAMPAIGN,
        }
    }

    /// File-name prefix for Parquet snapshots.
    pub fn export_prefix(&self) -> &'static str {
        match self {
            Self::GoogleCampaign => "google",
            Self::GoogleConversion => "google_conversion",
            Self::TiktokCampaign => "tiktok",
        }
    }

    /// Directory under the export root, before the `YYYY/MM/DD` parts.
    pub fn export_subdir(&self) -> &'static str {
        match self {
            Self::GoogleCampaign => "google_ads/campaign",
            Self::GoogleConversion => "google_ads/conversion_goal",
            Self::TiktokCampaign => "tiktok_ads",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.schema().name)
    }
}
