//! Process-wide configuration, built once in `main`.

use std::path::PathBuf;

use adsync_warehouse::WarehouseConfig;

/// Default root for Parquet snapshots.
pub const DEFAULT_EXPORT_DIR: &str = "data_lake";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub warehouse: WarehouseConfig,
    /// Root directory for `--export` snapshots.
    pub export_root: PathBuf,
}

impl AppConfig {
    /// Variables: everything [`WarehouseConfig::from_env`] reads, plus
    /// `ADSYNC_EXPORT_DIR` (default: `data_lake`).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|k| std::env::var(k).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let warehouse = WarehouseConfig::from_vars(&var)?;
        let export_root = var("ADSYNC_EXPORT_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));
        Ok(Self {
            warehouse,
            export_root,
        })
    }
}
