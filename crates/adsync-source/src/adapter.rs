//! # Platform Capabilities
//!
//! The report fetcher and hierarchy resolver never talk HTTP. They work
//! against the three traits in this module, which the Google Ads and TikTok
//! clients implement and which tests replace with in-process fakes.
//!
//! | Trait | Capability |
//! |-------|------------|
//! | [`ReportSource`] | one page of one report for one account and date range |
//! | [`AccountDirectory`] | Google Ads seed discovery and direct-children lookup |
//! | [`AdvertiserDirectory`] | TikTok advertisers authorized for the app |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use adsync_core::{AdvertiserId, CustomerId, DateRange, ReportRecord};

use crate::error::SourceError;

/// Which page of a paged report to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    /// Opaque continuation token from the previous page, for platforms that
    /// page by token instead of by number.
    pub cursor: Option<String>,
}

impl PageRequest {
    pub fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            cursor: None,
        }
    }

    pub fn next(&self, cursor: Option<String>) -> Self {
        Self {
            page: self.page + 1,
            page_size: self.page_size,
            cursor,
        }
    }
}

/// One page of typed rows plus the paging metadata the platform reported.
#[derive(Debug, Clone)]
pub struct ReportPage<R> {
    pub rows: Vec<R>,
    /// Total rows across all pages, as reported by the platform.
    pub total_rows: u64,
    /// Total pages, as reported by the platform.
    pub total_pages: u32,
    pub next_cursor: Option<String>,
}

impl<R> ReportPage<R> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total_rows: 0,
            total_pages: 0,
            next_cursor: None,
        }
    }
}

/// A platform reporting capability for one report shape.
#[async_trait]
pub trait ReportSource<R: ReportRecord>: Send + Sync {
    /// Fetch one page of `R` for `account` over the half-open `range`.
    async fn fetch_page(
        &self,
        account: &R::Account,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<ReportPage<R>, SourceError>;
}

/// One row of a Google Ads `customer_client` lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerClient {
    pub id: CustomerId,
    /// 0 for the queried account itself, 1 for its direct children.
    pub level: u32,
    pub manager: bool,
    pub descriptive_name: Option<String>,
    pub currency_code: Option<String>,
    pub time_zone: Option<String>,
}

/// Google Ads account-hierarchy capability.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Accounts the credentials can access directly; the traversal seeds.
    async fn accessible_customers(&self) -> Result<Vec<CustomerId>, SourceError>;

    /// The account itself (level 0) and its direct children (level 1).
    async fn direct_children(&self, customer: &CustomerId)
        -> Result<Vec<CustomerClient>, SourceError>;
}

/// A TikTok advertiser account authorized for the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertiser {
    pub id: AdvertiserId,
    pub name: Option<String>,
}

/// TikTok advertiser-list capability.
#[async_trait]
pub trait AdvertiserDirectory: Send + Sync {
    async fn advertisers(&self) -> Result<Vec<Advertiser>, SourceError>;
}
