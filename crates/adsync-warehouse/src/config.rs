//! Warehouse configuration.

use zeroize::Zeroizing;

use crate::loader::ReadPolicy;
use crate::table::{TableRef, TableSet};

/// Destination database and table names.
#[derive(Clone)]
pub struct WarehouseConfig {
    pub database_url: Zeroizing<String>,
    pub dataset: String,
    pub tables: TableSet,
    pub read_policy: ReadPolicy,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl std::fmt::Debug for WarehouseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseConfig")
            .field("database_url", &"[REDACTED]")
            .field("dataset", &self.dataset)
            .field("tables", &self.tables)
            .field("read_policy", &self.read_policy)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl WarehouseConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `DATABASE_URL` (required)
    /// - `WAREHOUSE_DATASET` (default: `ads`)
    /// - `WAREHOUSE_TABLE_GOOGLE` (default: `google_campaign_staging`)
    /// - `WAREHOUSE_TABLE_GOOGLE_CONVERSION` (default: `google_conversion_staging`)
    /// - `WAREHOUSE_TABLE_TIKTOK` (default: `tiktok_campaign_staging`)
    /// - `WAREHOUSE_READ_POLICY` (`lenient` | `strict`, default `lenient`)
    /// - `WAREHOUSE_MAX_CONNECTIONS` (default: 5)
    /// - `WAREHOUSE_ACQUIRE_TIMEOUT_SECS` (default: 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL")
            .map(Zeroizing::new)
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let dataset = get("WAREHOUSE_DATASET").unwrap_or_else(|| "ads".to_string());

        let table = |name: &str, default: &str| -> Result<TableRef, ConfigError> {
            let raw = get(name).unwrap_or_else(|| default.to_string());
            TableRef::new(dataset.as_str(), raw.trim()).map_err(|e| ConfigError::InvalidValue {
                var: name.to_string(),
                reason: e.to_string(),
            })
        };
        let tables = TableSet {
            google_campaign: table("WAREHOUSE_TABLE_GOOGLE", "google_campaign_staging")?,
            google_conversion: table(
                "WAREHOUSE_TABLE_GOOGLE_CONVERSION",
                "google_conversion_staging",
            )?,
            tiktok_campaign: table("WAREHOUSE_TABLE_TIKTOK", "tiktok_campaign_staging")?,
        };

        let read_policy = match get("WAREHOUSE_READ_POLICY") {
            Some(raw) => raw.parse::<ReadPolicy>().map_err(|reason| ConfigError::InvalidValue {
                var: "WAREHOUSE_READ_POLICY".into(),
                reason,
            })?,
            None => ReadPolicy::default(),
        };

        let number = |name: &str, default: u64| -> Result<u64, ConfigError> {
            match get(name) {
                Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::InvalidValue {
                        var: name.to_string(),
                        reason: e.to_string(),
                    }
                }),
                None => Ok(default),
            }
        };
        let max_connections = u32::try_from(number("WAREHOUSE_MAX_CONNECTIONS", 5)?)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::InvalidValue {
                var: "WAREHOUSE_MAX_CONNECTIONS".into(),
                reason: "must be between 1 and 4294967295".into(),
            })?;

        Ok(Self {
            database_url,
            dataset,
            tables,
            read_policy,
            max_connections,
            acquire_timeout_secs: number("WAREHOUSE_ACQUIRE_TIMEOUT_SECS", 5)?,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsync_core::ReportKind;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = WarehouseConfig::from_vars(vars(&[("DATABASE_URL", "postgres://u:p@db/ads")]))
            .unwrap();
        assert_eq!(cfg.dataset, "ads");
        assert_eq!(
            cfg.tables.table_for(ReportKind::GoogleConversion).to_string(),
            "ads.google_conversion_staging"
        );
        assert_eq!(cfg.tables.tiktok_campaign.table(), "tiktok_campaign_staging");
        assert_eq!(cfg.read_policy, ReadPolicy::Lenient);
        assert_eq!(cfg.max_connections, 5);
    }

    #[test]
    fn overrides() {
        let cfg = WarehouseConfig::from_vars(vars(&[
            ("DATABASE_URL", "postgres://db"),
            ("WAREHOUSE_DATASET", "marketing"),
            ("WAREHOUSE_TABLE_TIKTOK", "tt_daily"),
            ("WAREHOUSE_READ_POLICY", "strict"),
        ]))
        .unwrap();
        assert_eq!(cfg.tables.table_for(ReportKind::TiktokCampaign).to_string(), "marketing.tt_daily");
        assert_eq!(cfg.read_policy, ReadPolicy::Strict);
    }

    #[test]
    fn missing_url_and_bad_values() {
        assert!(matches!(
            WarehouseConfig::from_vars(vars(&[])),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        for (var, value) in [
            ("WAREHOUSE_TABLE_GOOGLE", "drop table;"),
            ("WAREHOUSE_READ_POLICY", "maybe"),
            ("WAREHOUSE_MAX_CONNECTIONS", "0"),
        ] {
            let err = WarehouseConfig::from_vars(vars(&[("DATABASE_URL", "postgres://db"), (var, value)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }), "{var}");
        }
    }

    #[test]
    fn debug_redacts_url() {
        let cfg = WarehouseConfig::from_vars(vars(&[("DATABASE_URL", "postgres://u:hunter2@db")]))
            .unwrap();
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
