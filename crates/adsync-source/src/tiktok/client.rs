//! TikTok Business API client.
//!
//! Every response is wrapped in `{"code", "message", "request_id", "data"}`.
//! HTTP 200 with a non-zero `code` is a platform error.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use zeroize::Zeroizing;

use adsync_core::coerce::to_text;
use adsync_core::{AdvertiserId, DateRange, ReportRecord, TiktokCampaignRow};

use crate::adapter::{Advertiser, AdvertiserDirectory, PageRequest, ReportPage, ReportSource};
use crate::config::TiktokConfig;
use crate::error::SourceError;
use crate::http::{secret_header, send_json};
use crate::tiktok::rows;

const REPORT: &str = "report/integrated/get";
const ADVERTISERS: &str = "oauth2/advertiser/get";

/// `data` is decoded only after `code` says the call succeeded, since
/// error responses carry an empty or partial `data` object.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<Value>,
}

impl Envelope {
    fn into_data<T: DeserializeOwned>(self, endpoint: &str) -> Result<T, SourceError> {
        if self.code != 0 {
            return Err(SourceError::Platform {
                endpoint: endpoint.to_string(),
                code: self.code,
                message: self.message,
            });
        }
        let data = self
            .data
            .ok_or_else(|| SourceError::malformed(endpoint, "missing data"))?;
        serde_json::from_value(data).map_err(|e| SourceError::malformed(endpoint, e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ReportData {
    #[serde(default)]
    list: Vec<Value>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    total_number: u64,
    total_page: u32,
}

#[derive(Debug, Deserialize)]
struct AdvertiserData {
    #[serde(default)]
    list: Vec<Value>,
}

/// Typed client for the TikTok Business API (v1.3).
#[derive(Clone)]
pub struct TiktokClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    secret: Zeroizing<String>,
}

impl std::fmt::Debug for TiktokClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokClient")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TiktokClient {
    pub fn new(config: &TiktokConfig) -> Result<Self, SourceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "access-token",
            secret_header(config.access_token.as_str(), "TIKTOK_ACCESS_TOKEN")?,
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: format!(
                "{}/open_api/v1.3",
                config.api_url.as_str().trim_end_matches('/')
            ),
            app_id: config.app_id.clone(),
            secret: config.secret.clone(),
        })
    }
}

#[async_trait]
impl ReportSource<TiktokCampaignRow> for TiktokClient {
    async fn fetch_page(
        &self,
        account: &AdvertiserId,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<ReportPage<TiktokCampaignRow>, SourceError> {
        let url = format!("{}/{REPORT}/", self.base_url);
        let dimensions = serde_json::to_string(TiktokCampaignRow::DIMENSIONS)
            .map_err(|e| SourceError::malformed(REPORT, e.to_string()))?;
        let metrics = serde_json::to_string(TiktokCampaignRow::METRICS)
            .map_err(|e| SourceError::malformed(REPORT, e.to_string()))?;
        let start_date = range.start().to_string();
        let end_date = range.last_day().to_string();
        let page_number = page.page.to_string();
        let page_size = page.page_size.to_string();

        let params: [(&str, &str); 13] = [
            ("advertiser_id", account.as_str()),
            ("report_type", "BASIC"),
            ("data_level", "AUCTION_CAMPAIGN"),
            ("service_type", "AUCTION"),
            ("query_mode", "REGULAR"),
            ("dimensions", &dimensions),
            ("metrics", &metrics),
            ("start_date", &start_date),
            ("end_date", &end_date),
            ("page", &page_number),
            ("page_size", &page_size),
            ("order_field", "campaign_name"),
            ("order_type", "ASC"),
        ];

        let envelope: Envelope =
            send_json(REPORT, || self.http.get(&url).query(&params)).await?;
        let data: ReportData = envelope.into_data(REPORT)?;

        let rows = data
            .list
            .iter()
            .map(|row| {
                rows::campaign_row(row, account).map_err(|reason| SourceError::malformed(REPORT, reason))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReportPage {
            rows,
            total_rows: data.page_info.total_number,
            total_pages: data.page_info.total_page,
            next_cursor: None,
        })
    }
}

#[async_trait]
impl AdvertiserDirectory for TiktokClient {
    async fn advertisers(&self) -> Result<Vec<Advertiser>, SourceError> {
        let url = format!("{}/{ADVERTISERS}/", self.base_url);
        let params = [("app_id", self.app_id.as_str()), ("secret", self.secret.as_str())];
        let envelope: Envelope =
            send_json(ADVERTISERS, || self.http.get(&url).query(&params)).await?;
        let data: AdvertiserData = envelope.into_data(ADVERTISERS)?;

        data.list
            .iter()
            .map(|entry| -> Result<Advertiser, SourceError> {
                let id = to_text(entry.get("advertiser_id"))
                    .ok_or_else(|| SourceError::malformed(ADVERTISERS, "missing advertiser_id"))?;
                Ok(Advertiser {
                    id: AdvertiserId::new(&id)
                        .map_err(|e| SourceError::malformed(ADVERTISERS, e.to_string()))?,
                    name: to_text(entry.get("advertiser_name")),
                })
            })
            .collect()
    }
}
