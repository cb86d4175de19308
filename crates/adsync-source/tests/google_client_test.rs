//! Contract tests for GoogleAdsClient against a wiremock Google Ads REST API.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST | `/v17/customers/{id}/googleAds:search` | `campaign_report_*`, `conversion_*`, `search_*` |
//! | GET  | `/v17/customers:listAccessibleCustomers` | `hierarchy_*` |

use adsync_core::{CustomerId, DateRange, GoogleCampaignRow, GoogleConversionRow, ReportDate};
use adsync_source::{
    GoogleAdsClient, GoogleAdsConfig, HierarchyResolver, LeafPolicy, ReportFetcher, SourceError,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> GoogleAdsClient {
    let config = GoogleAdsConfig {
        api_url: server.uri().parse().unwrap(),
        api_version: "v17".into(),
        developer_token: zeroize::Zeroizing::new("dev-token".into()),
        access_token: zeroize::Zeroizing::new("access".into()),
        login_customer_id: Some(CustomerId::new("999").unwrap()),
        seed_customer_ids: vec![],
        leaf_policy: LeafPolicy::PerManager,
        timeout_secs: 5,
    };
    GoogleAdsClient::new(&config).unwrap()
}

fn day() -> DateRange {
    DateRange::day(ReportDate::parse("2024-03-01").unwrap()).unwrap()
}

fn campaign_result(campaign: &str, impressions: &str) -> serde_json::Value {
    json!({
        "segments": {"date": "2024-03-01"},
        "customer": {"id": "100", "currencyCode": "EUR"},
        "campaign": {"id": campaign, "name": format!("Campaign {campaign}")},
        "metrics": {"impressions": impressions, "clicks": "3", "costMicros": "1500000"}
    })
}

fn customer() -> CustomerId {
    CustomerId::new("100").unwrap()
}

// ── POST googleAds:search ────────────────────────────────────────────

#[tokio::test]
async fn campaign_report_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/100/googleAds:search"))
        .and(body_partial_json(json!({"pageToken": "page-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [campaign_result("3", "40")],
            "totalResultsCount": "3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/100/googleAds:search"))
        .and(header("developer-token", "dev-token"))
        .and(header("authorization", "Bearer access"))
        .and(header("login-customer-id", "999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [campaign_result("1", "10"), campaign_result("2", "0")],
            "nextPageToken": "page-2",
            "totalResultsCount": "3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let fetched = ReportFetcher::default()
        .fetch::<GoogleCampaignRow, _>(&client, &customer(), &day())
        .await
        .unwrap();

    assert_eq!(fetched.pages_requested, 2);
    assert_eq!(fetched.rows_fetched, 3);
    let kept: Vec<_> = fetched.rows.iter().map(|r| r.campaign_id.as_str()).collect();
    assert_eq!(kept, vec!["1", "3"]);
    assert_eq!(fetched.rows[0].cost_micros, Some(1_500_000.0));
}

#[tokio::test]
async fn search_sends_gaql_for_the_day() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/100/googleAds:search"))
        .and(body_partial_json(json!({"returnTotalResultsCount": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let fetched = ReportFetcher::default()
        .fetch::<GoogleConversionRow, _>(&client, &customer(), &day())
        .await
        .unwrap();
    assert!(fetched.is_empty());
    assert_eq!(fetched.pages_requested, 1);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let query = body["query"].as_str().unwrap();
    assert!(query.contains("FROM campaign"));
    assert!(query.contains("'2024-03-01' AND '2024-03-01'"));
    assert!(body.get("pageToken").is_none());
}

#[tokio::test]
async fn conversion_report_keeps_zero_impression_rows() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/100/googleAds:search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "segments": {
                    "date": "2024-03-01",
                    "conversionAction": "customers/100/conversionActions/7",
                    "conversionActionCategory": "SIGNUP"
                },
                "customer": {"id": "100"},
                "campaign": {"id": "5"},
                "metrics": {"conversions": 2.0}
            }]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let fetched = ReportFetcher::default()
        .fetch::<GoogleConversionRow, _>(&client, &customer(), &day())
        .await
        .unwrap();
    assert_eq!(fetched.rows.len(), 1);
    assert_eq!(fetched.rows[0].conversion_action_category.as_deref(), Some("SIGNUP"));
}

#[tokio::test]
async fn search_error_status_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/100/googleAds:search"))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = ReportFetcher::default()
        .fetch::<GoogleCampaignRow, _>(&client, &customer(), &day())
        .await
        .unwrap_err();
    match err {
        SourceError::Api { status, body, .. } => {
            assert_eq!(status, 403);
            assert!(body.contains("PERMISSION_DENIED"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn search_row_without_key_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/100/googleAds:search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"customer": {"id": "100"}, "metrics": {"impressions": "5"}}]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = ReportFetcher::default()
        .fetch::<GoogleCampaignRow, _>(&client, &customer(), &day())
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Malformed { .. }));
}

// ── hierarchy ────────────────────────────────────────────────────────

fn customer_client(id: &str, level: &str, manager: bool) -> serde_json::Value {
    json!({"customerClient": {"id": id, "level": level, "manager": manager}})
}

#[tokio::test]
async fn hierarchy_walks_accessible_managers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v17/customers:listAccessibleCustomers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceNames": ["customers/100"]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/100/googleAds:search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                customer_client("100", "0", true),
                customer_client("1", "1", false),
                customer_client("2", "1", true),
                customer_client("3", "1", false)
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/2/googleAds:search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                customer_client("2", "0", true),
                customer_client("4", "1", false)
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let resolution = HierarchyResolver::new(&client, LeafPolicy::PerManager)
        .resolve_accessible()
        .await
        .unwrap();

    let leaves: Vec<String> = resolution
        .leaf_accounts()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(leaves, vec!["1", "3", "4"]);
    assert!(resolution.failed_seeds.is_empty());
}

#[tokio::test]
async fn hierarchy_seed_failure_is_isolated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/100/googleAds:search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v17/customers/200/googleAds:search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [customer_client("200", "0", true), customer_client("7", "1", false)]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let resolution = HierarchyResolver::new(&client, LeafPolicy::PerManager)
        .resolve(&[CustomerId::new("100").unwrap(), CustomerId::new("200").unwrap()])
        .await;

    assert_eq!(resolution.failed_seeds, vec![CustomerId::new("100").unwrap()]);
    assert_eq!(resolution.leaf_accounts(), vec![CustomerId::new("7").unwrap()]);
}
