//! `adsync prepare-tables`: create every destination table.

use anyhow::{Context, Result};

use adsync_pipeline::Orchestrator;
use adsync_warehouse::PgWarehouse;

use crate::config::AppConfig;

pub async fn run_prepare_tables(config: &AppConfig) -> Result<u8> {
    let warehouse = PgWarehouse::connect(&config.warehouse)
        .await
        .context("connecting to the warehouse")?;
    let prepared = Orchestrator::new(&warehouse, config.warehouse.tables.clone())
        .prepare_tables()
        .await?;

    let names: Vec<String> = prepared.iter().map(ToString::to_string).collect();
    println!("{}", serde_json::to_string_pretty(&names)?);
    Ok(0)
}
