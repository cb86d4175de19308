//! Google Ads: GAQL reports over the REST `googleAds:search` method, and the
//! `customer_client` hierarchy lookup.

mod client;
pub mod query;

pub use client::GoogleAdsClient;
pub use query::GaqlReport;
