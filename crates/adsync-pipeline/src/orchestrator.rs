//! # Report Orchestrator
//!
//! One run covers one platform and one date:
//!
//! 1. Resolve accounts once (hierarchy walk for Google Ads, the authorized
//!    advertiser list for TikTok).
//! 2. For each distinct account, in resolution order, fetch every report
//!    the platform produces. A failed fetch is logged and skips that
//!    account for that report only.
//! 3. For each report with rows: export a Parquet snapshot if asked, then
//!    hand the batch to the [`IncrementalLoader`].
//!
//! A dry run stops after step 2. Zero accounts, or accounts with no rows,
//! end the run normally without touching the warehouse. A persistence
//! failure in one report does not stop the next report of the same run.

use std::collections::HashSet;

use adsync_core::{
    AdvertiserId, CustomerId, DateRange, GoogleCampaignRow, GoogleConversionRow, ReportDate,
    ReportKind, ReportRecord, TiktokCampaignRow,
};
use adsync_source::{
    AccountDirectory, AdvertiserDirectory, GoogleAdsConfig, HierarchyResolver, LeafPolicy,
    ReportFetcher, ReportSource,
};
use adsync_warehouse::{
    IncrementalLoader, ParquetExporter, ReadPolicy, TableRef, TableSet, Warehouse,
};

use crate::error::{PersistError, PipelineError};
use crate::summary::{ReportStatus, ReportSummary, RunSummary};

/// Everything the Google Ads run needs from a platform client.
pub trait GoogleSource:
    ReportSource<GoogleCampaignRow> + ReportSource<GoogleConversionRow> + AccountDirectory
{
}

impl<T> GoogleSource for T where
    T: ReportSource<GoogleCampaignRow>
        + ReportSource<GoogleConversionRow>
        + AccountDirectory
        + ?Sized
{
}

/// Everything the TikTok run needs from a platform client.
pub trait TiktokSource: ReportSource<TiktokCampaignRow> + AdvertiserDirectory {}

impl<T> TiktokSource for T where T: ReportSource<TiktokCampaignRow> + AdvertiserDirectory + ?Sized {}

/// Which Google Ads accounts a run covers.
#[derive(Debug, Clone, Default)]
pub struct GoogleScope {
    /// Hierarchy seeds. Empty means every customer the credentials can
    /// access.
    pub seeds: Vec<CustomerId>,
    pub leaf_policy: LeafPolicy,
}

impl GoogleScope {
    pub fn from_config(config: &GoogleAdsConfig) -> Self {
        Self {
            seeds: config.seed_customer_ids.clone(),
            leaf_policy: config.leaf_policy,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Fetch only. Nothing is exported or loaded.
    pub dry_run: bool,
    /// Write a Parquet snapshot of each batch before loading it.
    pub export: bool,
}

/// Rows accumulated for one report across every account of a run.
struct Batch<R> {
    summary: ReportSummary,
    rows: Vec<R>,
}

impl<R: ReportRecord> Batch<R> {
    fn new() -> Self {
        Self {
            summary: ReportSummary::new(R::KIND),
            rows: Vec::new(),
        }
    }
}

pub struct Orchestrator<'a, W: ?Sized> {
    warehouse: &'a W,
    tables: TableSet,
    read_policy: ReadPolicy,
    fetcher: ReportFetcher,
    exporter: Option<ParquetExporter>,
}

impl<'a, W: Warehouse + ?Sized> Orchestrator<'a, W> {
    pub fn new(warehouse: &'a W, tables: TableSet) -> Self {
        Self {
            warehouse,
            tables,
            read_policy: ReadPolicy::default(),
            fetcher: ReportFetcher::default(),
            exporter: None,
        }
    }

    pub fn with_read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    pub fn with_fetcher(mut self, fetcher: ReportFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Where `RunOptions::export` writes snapshots.
    pub fn with_exporter(mut self, exporter: ParquetExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    /// Google Ads campaign and conversion reports for `date`.
    pub async fn run_google<S>(
        &self,
        source: &S,
        scope: &GoogleScope,
        date: ReportDate,
        options: RunOptions,
    ) -> Result<RunSummary, PipelineError>
    where
        S: GoogleSource + ?Sized,
    {
        let range = DateRange::day(date)?;
        let resolver = HierarchyResolver::new(source, scope.leaf_policy);
        let resolution = if scope.seeds.is_empty() {
            resolver
                .resolve_accessible()
                .await
                .map_err(PipelineError::Resolve)?
        } else {
            resolver.resolve(&scope.seeds).await
        };
        let accounts = resolution.leaf_accounts();
        let failed_seeds: Vec<String> = resolution
            .failed_seeds
            .iter()
            .map(ToString::to_string)
            .collect();
        tracing::info!(
            date = %date,
            accounts = accounts.len(),
            failed_seeds = failed_seeds.len(),
            "resolved Google Ads accounts"
        );

        let mut campaigns = Batch::<GoogleCampaignRow>::new();
        let mut conversions = Batch::<GoogleConversionRow>::new();
        for account in &accounts {
            self.fetch_into(&mut campaigns, source, account, &range).await;
            self.fetch_into(&mut conversions, source, account, &range).await;
        }

        let mut failures = Vec::new();
        let reports = vec![
            self.persist(campaigns, date, options, &mut failures).await,
            self.persist(conversions, date, options, &mut failures).await,
        ];
        finish(date, options, failed_seeds, reports, failures)
    }

    /// TikTok campaign report for `date`.
    pub async fn run_tiktok<S>(
        &self,
        source: &S,
        date: ReportDate,
        options: RunOptions,
    ) -> Result<RunSummary, PipelineError>
    where
        S: TiktokSource + ?Sized,
    {
        let range = DateRange::day(date)?;
        let advertisers = source
            .advertisers()
            .await
            .map_err(PipelineError::Resolve)?;
        let mut seen = HashSet::new();
        let accounts: Vec<AdvertiserId> = advertisers
            .into_iter()
            .map(|a| a.id)
            .filter(|id| seen.insert(id.clone()))
            .collect();
        tracing::info!(date = %date, accounts = accounts.len(), "resolved TikTok advertisers");

        let mut campaigns = Batch::<TiktokCampaignRow>::new();
        for account in &accounts {
            self.fetch_into(&mut campaigns, source, account, &range).await;
        }

        let mut failures = Vec::new();
        let reports = vec![self.persist(campaigns, date, options, &mut failures).await];
        finish(date, options, Vec::new(), reports, failures)
    }

    /// Create every destination table that does not exist yet.
    pub async fn prepare_tables(&self) -> Result<Vec<TableRef>, PipelineError> {
        let mut prepared = Vec::new();
        for kind in ReportKind::ALL {
            let table = self.tables.table_for(kind);
            self.warehouse
                .create_table(table, kind.schema())
                .await
                .map_err(|source| PipelineError::Prepare {
                    table: table.to_string(),
                    source,
                })?;
            tracing::info!(table = %table, report = %kind, "table ready");
            prepared.push(table.clone());
        }
        Ok(prepared)
    }

    async fn fetch_into<R, S>(
        &self,
        batch: &mut Batch<R>,
        source: &S,
        account: &R::Account,
        range: &DateRange,
    ) where
        R: ReportRecord,
        S: ReportSource<R> + ?Sized,
    {
        batch.summary.accounts_attempted += 1;
        match self.fetcher.fetch::<R, S>(source, account, range).await {
            Ok(fetched) => {
                tracing::info!(
                    report = %R::KIND,
                    account = %account,
                    date = %range.start(),
                    fetched = fetched.rows_fetched,
                    kept = fetched.rows.len(),
                    "fetched report"
                );
                batch.summary.rows_fetched += fetched.rows_fetched;
                batch.rows.extend(fetched.rows);
            }
            Err(err) => {
                tracing::error!(
                    report = %R::KIND,
                    account = %account,
                    date = %range.start(),
                    error = %err,
                    "fetch failed, skipping account"
                );
                batch
                    .summary
                    .accounts_failed
                    .push((account.to_string(), err.to_string()));
            }
        }
    }

    async fn persist<R: ReportRecord>(
        &self,
        batch: Batch<R>,
        date: ReportDate,
        options: RunOptions,
        failures: &mut Vec<(ReportKind, PersistError)>,
    ) -> ReportSummary {
        let Batch { mut summary, rows } = batch;
        summary.rows_kept = rows.len();

        if summary.accounts_attempted == 0 {
            tracing::info!(report = %R::KIND, date = %date, "no accounts, nothing to load");
            summary.status = ReportStatus::NoAccounts;
            return summary;
        }
        if rows.is_empty() {
            tracing::info!(report = %R::KIND, date = %date, "no rows for any account");
            summary.status = ReportStatus::NoRows;
            return summary;
        }
        if options.dry_run {
            tracing::info!(
                report = %R::KIND,
                date = %date,
                rows = rows.len(),
                "dry run, skipping export and load"
            );
            summary.status = ReportStatus::DryRun;
            return summary;
        }

        if options.export {
            match &self.exporter {
                Some(exporter) => {
                    let stamp = chrono::Local::now().naive_local();
                    match exporter.export(date, &rows, stamp) {
                        Ok(path) => summary.export_path = Some(path),
                        Err(err) => {
                            tracing::error!(report = %R::KIND, date = %date, error = %err, "export failed");
                            summary.status = ReportStatus::Failed {
                                reason: err.to_string(),
                            };
                            failures.push((R::KIND, err.into()));
                            return summary;
                        }
                    }
                }
                None => {
                    tracing::warn!(report = %R::KIND, "export requested but no export root configured")
                }
            }
        }

        let table = self.tables.table_for(R::KIND);
        let loader = IncrementalLoader::new(self.warehouse, self.read_policy);
        match loader.load(table, &rows).await {
            Ok(outcome) => {
                tracing::info!(report = %R::KIND, date = %date, table = %table, %outcome, "report loaded");
                summary.status = ReportStatus::Loaded { outcome };
            }
            Err(err) => {
                tracing::error!(report = %R::KIND, date = %date, table = %table, error = %err, "load failed");
                summary.status = ReportStatus::Failed {
                    reason: err.to_string(),
                };
                failures.push((R::KIND, err.into()));
            }
        }
        summary
    }
}

fn finish(
    date: ReportDate,
    options: RunOptions,
    failed_seeds: Vec<String>,
    reports: Vec<ReportSummary>,
    failures: Vec<(ReportKind, PersistError)>,
) -> Result<RunSummary, PipelineError> {
    let summary = RunSummary {
        date,
        dry_run: options.dry_run,
        failed_seeds,
        reports,
    };
    if failures.is_empty() {
        tracing::info!(
            date = %date,
            appended = summary.rows_appended(),
            accounts_failed = summary.accounts_failed(),
            "run complete"
        );
        Ok(summary)
    } else {
        Err(PipelineError::Persist {
            summary: Box::new(summary),
            failures,
        })
    }
}
