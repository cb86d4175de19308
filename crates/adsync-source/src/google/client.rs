//! Google Ads REST client.
//!
//! ## Endpoints
//!
//! | Method | Path | Used for |
//! |--------|------|----------|
//! | GET | `/{version}/customers:listAccessibleCustomers` | hierarchy seeds |
//! | POST | `/{version}/customers/{id}/googleAds:search` | reports and `customer_client` |

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use adsync_core::coerce::to_int;
use adsync_core::{CustomerId, DateRange};

use crate::adapter::{AccountDirectory, CustomerClient, PageRequest, ReportPage, ReportSource};
use crate::config::GoogleAdsConfig;
use crate::error::SourceError;
use crate::google::query::{self, GaqlReport};
use crate::http::{secret_header, send_json};

const SEARCH: &str = "googleAds:search";
const LIST_ACCESSIBLE: &str = "customers:listAccessibleCustomers";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<&'a str>,
    return_total_results_count: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Value>,
    next_page_token: Option<String>,
    /// int64, so usually a JSON string.
    total_results_count: Option<Value>,
}

impl SearchResponse {
    fn next_token(&self) -> Option<String> {
        self.next_page_token.clone().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAccessibleResponse {
    #[serde(default)]
    resource_names: Vec<String>,
}

/// Typed client for the Google Ads REST interface.
#[derive(Debug, Clone)]
pub struct GoogleAdsClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleAdsClient {
    pub fn new(config: &GoogleAdsConfig) -> Result<Self, SourceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            secret_header(
                &format!("Bearer {}", config.access_token.as_str()),
                "GOOGLE_ADS_ACCESS_TOKEN",
            )?,
        );
        headers.insert(
            "developer-token",
            secret_header(config.developer_token.as_str(), "GOOGLE_ADS_DEVELOPER_TOKEN")?,
        );
        if let Some(login) = &config.login_customer_id {
            headers.insert(
                "login-customer-id",
                reqwest::header::HeaderValue::from_str(login.as_str()).map_err(|_| {
                    crate::config::ConfigError::InvalidHeader("GOOGLE_ADS_LOGIN_CUSTOMER_ID")
                })?,
            );
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        let base_url = format!(
            "{}/{}",
            config.api_url.as_str().trim_end_matches('/'),
            config.api_version
        );
        Ok(Self { http, base_url })
    }

    async fn search(
        &self,
        customer: &CustomerId,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchResponse, SourceError> {
        let url = format!("{}/customers/{}/{SEARCH}", self.base_url, customer);
        let body = SearchRequest {
            query,
            page_token,
            return_total_results_count: true,
        };
        send_json(SEARCH, || self.http.post(&url).json(&body)).await
    }
}

#[async_trait]
impl<R: GaqlReport> ReportSource<R> for GoogleAdsClient {
    async fn fetch_page(
        &self,
        account: &CustomerId,
        range: &DateRange,
        page: &PageRequest,
    ) -> Result<ReportPage<R>, SourceError> {
        let query = query::report_query::<R>(range);
        let resp = self.search(account, &query, page.cursor.as_deref()).await?;

        let rows = resp
            .results
            .iter()
            .map(|row| R::from_search_row(row).map_err(|reason| SourceError::malformed(SEARCH, reason)))
            .collect::<Result<Vec<_>, _>>()?;

        let next_cursor = resp.next_token();
        let total_rows = to_int(resp.total_results_count.as_ref())
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(rows.len() as u64);
        // Token paging: there is exactly one more page while a token exists.
        let total_pages = if next_cursor.is_some() {
            page.page + 1
        } else {
            page.page
        };

        Ok(ReportPage {
            rows,
            total_rows,
            total_pages,
            next_cursor,
        })
    }
}

#[async_trait]
impl AccountDirectory for GoogleAdsClient {
    async fn accessible_customers(&self) -> Result<Vec<CustomerId>, SourceError> {
        let url = format!("{}/{LIST_ACCESSIBLE}", self.base_url);
        let resp: ListAccessibleResponse =
            send_json(LIST_ACCESSIBLE, || self.http.get(&url)).await?;
        resp.resource_names
            .iter()
            .map(|name| {
                CustomerId::from_resource_name(name)
                    .map_err(|e| SourceError::malformed(LIST_ACCESSIBLE, e.to_string()))
            })
            .collect()
    }

    async fn direct_children(
        &self,
        customer: &CustomerId,
    ) -> Result<Vec<CustomerClient>, SourceError> {
        let mut clients = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .search(customer, query::CUSTOMER_CLIENT_QUERY, token.as_deref())
                .await?;
            for row in &resp.results {
                clients.push(
                    query::customer_client(row)
                        .map_err(|reason| SourceError::malformed(SEARCH, reason))?,
                );
            }
            match resp.next_token() {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(clients)
    }
}
