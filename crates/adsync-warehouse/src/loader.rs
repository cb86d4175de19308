//! # Incremental Loader
//!
//! Persists only the rows of a batch whose composite key is not already in
//! the destination.
//!
//! ## Algorithm
//!
//! 1. An empty batch returns [`LoadOutcome::EmptyBatch`] without touching
//!    the warehouse.
//! 2. Create the destination table if needed.
//! 3. Read the key tuples already stored for `[min(date), max(date)]` of
//!    the batch.
//! 4. Drop every row whose key was read in step 3, and every repeat of a
//!    key within the batch (first occurrence wins).
//! 5. Append what is left, or return [`LoadOutcome::NothingNew`].
//!
//! Loading the same batch twice leaves the destination as loading it once.
//! Steps 3 and 5 are not atomic with respect to other writers; see the
//! crate docs.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use adsync_core::{DateWindow, KeyTuple, ReportRecord};

use crate::error::LoadError;
use crate::table::TableRef;
use crate::warehouse::Warehouse;

/// What to do when reading existing keys fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadPolicy {
    /// Treat the destination as empty and carry on. The batch may then
    /// duplicate rows that were already loaded; a warning is logged.
    #[default]
    Lenient,
    /// Fail the batch with [`LoadError::ExistingRead`].
    Strict,
}

impl std::str::FromStr for ReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown read policy {other:?} (expected lenient or strict)")),
        }
    }
}

impl std::fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lenient => write!(f, "lenient"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Result of one successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The batch had no rows. The warehouse was not called.
    EmptyBatch,
    /// Every row was already present (or repeated within the batch).
    NothingNew { skipped: usize },
    Appended { rows: u64, skipped: usize },
}

impl LoadOutcome {
    pub fn rows_appended(&self) -> u64 {
        match self {
            Self::Appended { rows, .. } => *rows,
            _ => 0,
        }
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyBatch => write!(f, "empty batch"),
            Self::NothingNew { skipped } => write!(f, "nothing new ({skipped} already present)"),
            Self::Appended { rows, skipped } => {
                write!(f, "appended {rows} rows ({skipped} already present)")
            }
        }
    }
}

/// Idempotent appender over a [`Warehouse`].
pub struct IncrementalLoader<'a, W: ?Sized> {
    warehouse: &'a W,
    read_policy: ReadPolicy,
}

impl<'a, W: Warehouse + ?Sized> IncrementalLoader<'a, W> {
    pub fn new(warehouse: &'a W, read_policy: ReadPolicy) -> Self {
        Self {
            warehouse,
            read_policy,
        }
    }

    pub fn read_policy(&self) -> ReadPolicy {
        self.read_policy
    }

    /// Load `batch` into `table`, skipping rows whose key is already there.
    pub async fn load<R: ReportRecord>(
        &self,
        table: &TableRef,
        batch: &[R],
    ) -> Result<LoadOutcome, LoadError> {
        let Some(window) = DateWindow::spanning(batch.iter().map(R::date)) else {
            tracing::info!(table = %table, report = %R::KIND, "empty batch, nothing to load");
            return Ok(LoadOutcome::EmptyBatch);
        };
        let schema = R::SCHEMA;
        schema.validate()?;

        self.warehouse
            .create_table(table, schema)
            .await
            .map_err(|source| LoadError::CreateTable {
                table: table.to_string(),
                source,
            })?;

        let existing = match self.warehouse.existing_keys(table, schema, &window).await {
            Ok(keys) => keys,
            Err(source) => match self.read_policy {
                ReadPolicy::Lenient => {
                    tracing::warn!(
                        table = %table,
                        window = %window,
                        error = %source,
                        "existing-key read failed; treating destination as empty, rows may be duplicated"
                    );
                    HashSet::new()
                }
                ReadPolicy::Strict => {
                    return Err(LoadError::ExistingRead {
                        table: table.to_string(),
                        source,
                    })
                }
            },
        };

        let mut seen: HashSet<KeyTuple> = HashSet::with_capacity(batch.len());
        let mut already_present = 0usize;
        let mut repeated = 0usize;
        let mut fresh = Vec::new();
        for record in batch {
            let key = record.key();
            if existing.contains(&key) {
                already_present += 1;
            } else if !seen.insert(key) {
                repeated += 1;
            } else {
                fresh.push(record.cells());
            }
        }
        if repeated > 0 {
            tracing::warn!(table = %table, repeated, "batch repeats keys; keeping first occurrence");
        }
        let skipped = already_present + repeated;

        if fresh.is_empty() {
            tracing::info!(
                table = %table,
                window = %window,
                skipped,
                "every row already loaded, nothing new to append"
            );
            return Ok(LoadOutcome::NothingNew { skipped });
        }

        let rows = self
            .warehouse
            .append(table, schema, &fresh)
            .await
            .map_err(|source| LoadError::Write {
                table: table.to_string(),
                source,
            })?;

        tracing::info!(table = %table, window = %window, rows, skipped, "appended new rows");
        Ok(LoadOutcome::Appended { rows, skipped })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryWarehouse;
    use crate::error::WarehouseError;
    use adsync_core::schema::TIKTOK_CAMPAIGN;
    use adsync_core::{ReportDate, TiktokCampaignRow};
    use proptest::prelude::*;

    fn table() -> TableRef {
        TableRef::new("ads", "tiktok_campaign_staging").unwrap()
    }

    fn row(date: &str, adv: &str, camp: &str) -> TiktokCampaignRow {
        let mut r = TiktokCampaignRow::empty(ReportDate::parse(date).unwrap(), adv, camp);
        r.impressions = Some(10);
        r
    }

    fn key(date: &str, adv: &str, camp: &str) -> KeyTuple {
        KeyTuple::new(ReportDate::parse(date).unwrap(), [adv, camp])
    }

    #[tokio::test]
    async fn empty_batch_makes_no_calls() {
        let wh = MemoryWarehouse::new();
        let outcome = IncrementalLoader::new(&wh, ReadPolicy::Lenient)
            .load::<TiktokCampaignRow>(&table(), &[])
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::EmptyBatch);
        assert_eq!(wh.calls().total(), 0);
        assert!(!wh.has_table(&table()));
    }

    #[tokio::test]
    async fn appends_only_unseen_keys() {
        let wh = MemoryWarehouse::new();
        wh.seed(
            &table(),
            &TIKTOK_CAMPAIGN,
            vec![row("2024-03-01", "advX", "campY").cells()],
        );

        let batch = [row("2024-03-01", "advX", "campY"), row("2024-03-01", "advX", "campZ")];
        let outcome = IncrementalLoader::new(&wh, ReadPolicy::Lenient)
            .load(&table(), &batch)
            .await
            .unwrap();

        assert_eq!(outcome, LoadOutcome::Appended { rows: 1, skipped: 1 });
        assert_eq!(
            wh.keys(&table()),
            vec![key("2024-03-01", "advX", "campY"), key("2024-03-01", "advX", "campZ")]
        );
    }

    #[tokio::test]
    async fn second_load_is_nothing_new() {
        let wh = MemoryWarehouse::new();
        let loader = IncrementalLoader::new(&wh, ReadPolicy::Lenient);
        let batch = [row("2024-03-01", "advX", "campA"), row("2024-03-02", "advX", "campA")];

        let first = loader.load(&table(), &batch).await.unwrap();
        assert_eq!(first.rows_appended(), 2);
        let second = loader.load(&table(), &batch).await.unwrap();
        assert_eq!(second, LoadOutcome::NothingNew { skipped: 2 });
        assert_eq!(wh.row_count(&table()), 2);
    }

    #[tokio::test]
    async fn same_campaign_under_another_account_is_new() {
        let wh = MemoryWarehouse::new();
        wh.seed(
            &table(),
            &TIKTOK_CAMPAIGN,
            vec![row("2024-03-01", "advX", "campY").cells()],
        );
        let outcome = IncrementalLoader::new(&wh, ReadPolicy::Lenient)
            .load(&table(), &[row("2024-03-01", "advW", "campY")])
            .await
            .unwrap();
        assert_eq!(outcome.rows_appended(), 1);
    }

    #[tokio::test]
    async fn repeated_keys_in_batch_keep_first() {
        let wh = MemoryWarehouse::new();
        let mut first = row("2024-03-01", "advX", "campY");
        first.campaign_name = Some("first".into());
        let mut second = row("2024-03-01", "advX", "campY");
        second.campaign_name = Some("second".into());

        let outcome = IncrementalLoader::new(&wh, ReadPolicy::Lenient)
            .load(&table(), &[first.clone(), second])
            .await
            .unwrap();
        assert_eq!(outcome, LoadOutcome::Appended { rows: 1, skipped: 1 });
        assert_eq!(wh.rows(&table()), vec![first.cells()]);
    }

    #[tokio::test]
    async fn lenient_read_failure_loads_everything() {
        let wh = MemoryWarehouse::new();
        wh.seed(
            &table(),
            &TIKTOK_CAMPAIGN,
            vec![row("2024-03-01", "advX", "campY").cells()],
        );
        wh.fail_reads(true);
        let outcome = IncrementalLoader::new(&wh, ReadPolicy::Lenient)
            .load(&table(), &[row("2024-03-01", "advX", "campY")])
            .await
            .unwrap();
        assert_eq!(outcome.rows_appended(), 1);
        assert_eq!(wh.row_count(&table()), 2);
    }

    #[tokio::test]
    async fn strict_read_failure_fails_batch() {
        let wh = MemoryWarehouse::new();
        wh.fail_reads(true);
        let err = IncrementalLoader::new(&wh, ReadPolicy::Strict)
            .load(&table(), &[row("2024-03-01", "advX", "campY")])
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::ExistingRead { .. }));
        assert_eq!(wh.calls().append, 0);
    }

    #[tokio::test]
    async fn write_failure_is_fatal() {
        let wh = MemoryWarehouse::new();
        wh.fail_writes(true);
        let err = IncrementalLoader::new(&wh, ReadPolicy::Lenient)
            .load(&table(), &[row("2024-03-01", "advX", "campY")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Write { source: WarehouseError::Unavailable { .. }, .. }
        ));
        assert_eq!(wh.calls().append, 1);
    }

    #[tokio::test]
    async fn create_failure_stops_before_read() {
        let wh = MemoryWarehouse::new();
        wh.fail_creates(true);
        let err = IncrementalLoader::new(&wh, ReadPolicy::Lenient)
            .load(&table(), &[row("2024-03-01", "advX", "campY")])
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::CreateTable { .. }));
        assert_eq!(wh.calls().existing_keys, 0);
    }

    #[test]
    fn read_policy_parsing() {
        assert_eq!("strict".parse::<ReadPolicy>().unwrap(), ReadPolicy::Strict);
        assert_eq!(" Lenient ".parse::<ReadPolicy>().unwrap(), ReadPolicy::Lenient);
        assert!("sometimes".parse::<ReadPolicy>().is_err());
        assert_eq!(ReadPolicy::default(), ReadPolicy::Lenient);
    }

    fn arb_batch() -> impl Strategy<Value = Vec<TiktokCampaignRow>> {
        prop::collection::vec((1u32..=5, 0usize..2, 0usize..3), 0..20).prop_map(|specs| {
            specs
                .into_iter()
                .map(|(day, adv, camp)| {
                    let date = ReportDate::from_ymd(2024, 3, day).unwrap();
                    let mut r = TiktokCampaignRow::empty(
                        date,
                        ["advX", "advW"][adv],
                        ["campA", "campB", "campC"][camp],
                    );
                    r.impressions = Some(1);
                    r
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn loading_twice_equals_loading_once(batch in arb_batch()) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let wh = MemoryWarehouse::new();
                let loader = IncrementalLoader::new(&wh, ReadPolicy::Lenient);
                loader.load(&table(), &batch).await.unwrap();
                let once = wh.rows(&table());
                loader.load(&table(), &batch).await.unwrap();
                prop_assert_eq!(wh.rows(&table()), once);

                let keys = wh.keys(&table());
                let distinct: HashSet<_> = keys.iter().cloned().collect();
                prop_assert_eq!(keys.len(), distinct.len());
                let expected: HashSet<_> = batch.iter().map(|r| r.key()).collect();
                prop_assert_eq!(distinct, expected);
                Ok(())
            })?;
        }
    }
}
