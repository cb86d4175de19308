//! # adsync-source — Ad-Platform Report Sources
//!
//! Everything between an ad platform and a typed batch of report rows:
//!
//! - [`ReportFetcher`]: the paged fetch loop and the impression filter.
//! - [`HierarchyResolver`]: Google Ads manager/client tree flattening.
//! - [`GoogleAdsClient`] and [`TiktokClient`]: HTTP implementations of the
//!   capability traits in [`adapter`].
//!
//! ## Architecture
//!
//! The fetcher and resolver depend only on the traits in [`adapter`]. The
//! HTTP clients are one implementation; tests and the pipeline crate supply
//! in-process fakes.
//!
//! ## Retry
//!
//! The HTTP clients retry transport failures (connect errors, timeouts) with
//! exponential backoff. Nothing retries on a response status, and the
//! fetcher never re-requests a page.

pub mod adapter;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod google;
pub mod hierarchy;
pub(crate) mod http;
pub(crate) mod retry;
pub mod tiktok;

pub use adapter::{
    AccountDirectory, Advertiser, AdvertiserDirectory, CustomerClient, PageRequest, ReportPage,
    ReportSource,
};
pub use config::{ConfigError, GoogleAdsConfig, TiktokConfig};
pub use error::SourceError;
pub use fetcher::{FetchedReport, ReportFetcher};
pub use google::{GaqlReport, GoogleAdsClient};
pub use hierarchy::{ClientLink, HierarchyResolver, LeafPolicy, Resolution};
pub use tiktok::TiktokClient;
