//! # Report Fetcher
//!
//! Drives a [`ReportSource`] through every page of one report for one
//! account and date range, then applies the post-fetch impression filter.
//!
//! ## Paging
//!
//! Pages are requested strictly in order starting at 1. The loop stops when
//! the current page number reaches the total page count the platform
//! reported, or immediately when page 1 is empty and reports zero total
//! rows. Rows that arrive are never discarded because of the reported
//! totals. Cursor platforms report one more page than the current one while
//! a continuation token exists, so the same loop serves both styles.
//!
//! Each page is requested once. Transport retries live in the HTTP clients;
//! any error from the source ends the fetch for this account.

use adsync_core::{DateRange, ReportRecord};

use crate::adapter::{PageRequest, ReportSource};
use crate::error::SourceError;

/// Default page size, the largest TikTok accepts.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Upper bound on pages per fetch, so a source that never stops reporting
/// more pages cannot loop forever.
pub const MAX_PAGES: u32 = 10_000;

/// Result of a complete fetch for one account.
#[derive(Debug, Clone)]
pub struct FetchedReport<R> {
    /// Rows that survived the impression filter, in page order.
    pub rows: Vec<R>,
    pub pages_requested: u32,
    /// Rows received across all pages, before filtering.
    pub rows_fetched: usize,
}

impl<R> FetchedReport<R> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Paged fetch loop shared by every report source.
#[derive(Debug, Clone, Copy)]
pub struct ReportFetcher {
    page_size: u32,
}

impl Default for ReportFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ReportFetcher {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch every page of `R` for `account` over `range`.
    pub async fn fetch<R, S>(
        &self,
        source: &S,
        account: &R::Account,
        range: &DateRange,
    ) -> Result<FetchedReport<R>, SourceError>
    where
        R: ReportRecord,
        S: ReportSource<R> + ?Sized,
    {
        let mut request = PageRequest::first(self.page_size);
        let mut rows = Vec::new();
        let mut rows_fetched = 0;
        let mut pages_requested = 0;

        loop {
            let page = source.fetch_page(account, range, &request).await?;
            pages_requested += 1;

            if request.page == 1 && page.rows.is_empty() && page.total_rows == 0 {
                tracing::debug!(
                    report = R::SCHEMA.name,
                    account = %account,
                    range = %range,
                    "no rows reported"
                );
                break;
            }

            rows_fetched += page.rows.len();
            rows.extend(page.rows);

            if request.page >= page.total_pages {
                break;
            }
            if request.page >= MAX_PAGES {
                return Err(SourceError::malformed(
                    R::SCHEMA.name,
                    format!("more than {MAX_PAGES} pages reported for account {account}"),
                ));
            }
            request = request.next(page.next_cursor);
        }

        rows.retain(R::has_impressions);

        tracing::debug!(
            report = R::SCHEMA.name,
            account = %account,
            pages = pages_requested,
            fetched = rows_fetched,
            kept = rows.len(),
            "report fetched"
        );

        Ok(FetchedReport {
            rows,
            pages_requested,
            rows_fetched,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ReportPage;
    use adsync_core::{AdvertiserId, ReportDate, TiktokCampaignRow};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct PagedSource {
        pages: Vec<Vec<Option<i64>>>,
        calls: Mutex<Vec<u32>>,
    }

    impl PagedSource {
        fn new(pages: Vec<Vec<Option<i64>>>) -> Self {
            Self { pages, calls: Mutex::new(Vec::new()) }
        }
    }

    fn row(campaign: usize, impressions: Option<i64>) -> TiktokCampaignRow {
        let mut r = TiktokCampaignRow::empty(day(), "advX", &format!("camp{campaign}"));
        r.impressions = impressions;
        r
    }

    fn day() -> ReportDate {
        ReportDate::parse("2024-03-01").unwrap()
    }

    #[async_trait]
    impl ReportSource<TiktokCampaignRow> for PagedSource {
        async fn fetch_page(
            &self,
            _account: &AdvertiserId,
            _range: &DateRange,
            page: &PageRequest,
        ) -> Result<ReportPage<TiktokCampaignRow>, SourceError> {
            self.calls.lock().unwrap().push(page.page);
            let total_rows: usize = self.pages.iter().map(Vec::len).sum();
            let rows = self.pages[(page.page - 1) as usize]
                .iter()
                .enumerate()
                .map(|(i, imp)| row(i, *imp))
                .collect();
            Ok(ReportPage {
                rows,
                total_rows: total_rows as u64,
                total_pages: self.pages.len() as u32,
                next_cursor: None,
            })
        }
    }

    /// Returns rows on page 1 but claims there are none in total.
    struct UnderreportingSource;

    #[async_trait]
    impl ReportSource<TiktokCampaignRow> for UnderreportingSource {
        async fn fetch_page(
            &self,
            _account: &AdvertiserId,
            _range: &DateRange,
            _page: &PageRequest,
        ) -> Result<ReportPage<TiktokCampaignRow>, SourceError> {
            Ok(ReportPage {
                rows: vec![row(0, Some(10)), row(1, Some(20))],
                total_rows: 0,
                total_pages: 1,
                next_cursor: None,
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ReportSource<TiktokCampaignRow> for FailingSource {
        async fn fetch_page(
            &self,
            _account: &AdvertiserId,
            _range: &DateRange,
            _page: &PageRequest,
        ) -> Result<ReportPage<TiktokCampaignRow>, SourceError> {
            Err(SourceError::Platform {
                endpoint: "report/integrated/get".into(),
                code: 40100,
                message: "rate limited".into(),
            })
        }
    }

    fn account() -> AdvertiserId {
        AdvertiserId::new("advX").unwrap()
    }

    fn range() -> DateRange {
        DateRange::day(day()).unwrap()
    }

    #[tokio::test]
    async fn requests_every_reported_page_in_order() {
        let source = PagedSource::new(vec![
            vec![Some(1), Some(2)],
            vec![Some(3)],
            vec![Some(4), Some(5), Some(6)],
        ]);
        let fetched = ReportFetcher::new(2)
            .fetch(&source, &account(), &range())
            .await
            .unwrap();
        assert_eq!(*source.calls.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(fetched.pages_requested, 3);
        assert_eq!(fetched.rows_fetched, 6);
        assert_eq!(fetched.rows.len(), 6);
    }

    #[tokio::test]
    async fn zero_and_missing_impressions_dropped() {
        let source = PagedSource::new(vec![vec![Some(0), Some(7), None, Some(1)]]);
        let fetched = ReportFetcher::default()
            .fetch(&source, &account(), &range())
            .await
            .unwrap();
        assert_eq!(fetched.rows_fetched, 4);
        assert_eq!(fetched.rows.len(), 2);
        assert!(fetched.rows.iter().all(|r| r.impressions.unwrap_or(0) > 0));
    }

    #[tokio::test]
    async fn empty_first_page_stops_immediately() {
        let source = PagedSource::new(vec![vec![]]);
        let fetched = ReportFetcher::default()
            .fetch(&source, &account(), &range())
            .await
            .unwrap();
        assert!(fetched.is_empty());
        assert_eq!(fetched.pages_requested, 1);
        assert_eq!(*source.calls.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn rows_are_kept_when_total_is_underreported() {
        let fetched = ReportFetcher::default()
            .fetch(&UnderreportingSource, &account(), &range())
            .await
            .unwrap();
        assert_eq!(fetched.pages_requested, 1);
        assert_eq!(fetched.rows_fetched, 2);
        assert_eq!(fetched.rows.len(), 2);
    }

    #[tokio::test]
    async fn source_error_is_returned() {
        let err = ReportFetcher::default()
            .fetch(&FailingSource, &account(), &range())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Platform { code: 40100, .. }));
    }
}
