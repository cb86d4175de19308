//! GAQL query text and `googleAds:search` row decoding.
//!
//! Search rows come back as proto3 JSON: nested objects keyed by camelCase
//! field names (`metrics.costMicros`), int64 values as strings, and
//! zero-valued fields omitted entirely. An absent metric therefore reads as
//! zero, while a present but unparsable one reads as missing.

use serde_json::Value;

use adsync_core::coerce::{to_float, to_int, to_text};
use adsync_core::{
    CustomerId, DateRange, GoogleCampaignRow, GoogleConversionRow, ReportDate, ReportRecord,
};

use crate::adapter::CustomerClient;

/// A report that can be pulled with a GAQL `SELECT` over `googleAds:search`.
pub trait GaqlReport: ReportRecord<Account = CustomerId> {
    /// Resource named in the `FROM` clause.
    const RESOURCE: &'static str;

    /// Decode one search result row.
    fn from_search_row(row: &Value) -> Result<Self, String>;
}

/// Build the GAQL query for `R` over a half-open date range.
pub fn report_query<R: GaqlReport>(range: &DateRange) -> String {
    let fields = R::DIMENSIONS
        .iter()
        .chain(R::METRICS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    let mut query = format!(
        "SELECT {fields} FROM {} WHERE segments.date BETWEEN '{}' AND '{}'",
        R::RESOURCE,
        range.start(),
        range.last_day(),
    );
    if R::FILTERS_ZERO_IMPRESSIONS {
        query.push_str(" AND metrics.impressions > 0");
    }
    query
}

/// The account itself and its direct children.
pub const CUSTOMER_CLIENT_QUERY: &str = "SELECT customer_client.client_customer, \
     customer_client.level, customer_client.manager, customer_client.descriptive_name, \
     customer_client.currency_code, customer_client.time_zone, customer_client.id \
     FROM customer_client WHERE customer_client.level <= 1";

/// Look up a GAQL field path (`metrics.cost_micros`) in a JSON search row.
pub fn field<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(row, |node, segment| node.get(camel_case(segment)))
        .filter(|v| !v.is_null())
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for c in segment.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn metric_int(row: &Value, path: &str) -> Option<i64> {
    match field(row, path) {
        None => Some(0),
        v => to_int(v),
    }
}

fn metric_float(row: &Value, path: &str) -> Option<f64> {
    match field(row, path) {
        None => Some(0.0),
        v => to_float(v),
    }
}

fn text(row: &Value, path: &str) -> Option<String> {
    to_text(field(row, path))
}

fn required_text(row: &Value, path: &str) -> Result<String, String> {
    text(row, path).ok_or_else(|| format!("missing {path}"))
}

fn date(row: &Value) -> Result<ReportDate, String> {
    let raw = required_text(row, "segments.date")?;
    ReportDate::parse(&raw).map_err(|e| e.to_string())
}

impl GaqlReport for GoogleCampaignRow {
    const RESOURCE: &'static str = "campaign";

    fn from_search_row(row: &Value) -> Result<Self, String> {
        Ok(Self {
            date: date(row)?,
            customer_id: required_text(row, "customer.id")?,
            campaign_id: required_text(row, "campaign.id")?,
            campaign_name: text(row, "campaign.name"),
            currency_code: text(row, "customer.currency_code"),
            impressions: metric_int(row, "metrics.impressions"),
            clicks: metric_int(row, "metrics.clicks"),
            video_views: metric_int(row, "metrics.video_views"),
            engagements: metric_int(row, "metrics.engagements"),
            conversions: metric_float(row, "metrics.conversions"),
            all_conversions: metric_float(row, "metrics.all_conversions"),
            view_through_conversions: metric_float(row, "metrics.view_through_conversions"),
            cost_micros: metric_float(row, "metrics.cost_micros"),
            ctr: metric_float(row, "metrics.ctr"),
            average_cpc: metric_float(row, "metrics.average_cpc"),
            absolute_top_impression_percentage: metric_float(
                row,
                "metrics.absolute_top_impression_percentage",
            ),
            top_impression_percentage: metric_float(row, "metrics.top_impression_percentage"),
            cost_per_conversion: metric_float(row, "metrics.cost_per_conversion"),
        })
    }
}

impl GaqlReport for GoogleConversionRow {
    const RESOURCE: &'static str = "campaign";

    fn from_search_row(row: &Value) -> Result<Self, String> {
        Ok(Self {
            date: date(row)?,
            customer_id: required_text(row, "customer.id")?,
            campaign_id: required_text(row, "campaign.id")?,
            campaign_name: text(row, "campaign.name"),
            conversion_action: required_text(row, "segments.conversion_action")?,
            conversion_action_name: text(row, "segments.conversion_action_name"),
            conversion_action_category: text(row, "segments.conversion_action_category"),
            conversions: metric_float(row, "metrics.conversions"),
            all_conversions: metric_float(row, "metrics.all_conversions"),
            view_through_conversions: metric_float(row, "metrics.view_through_conversions"),
        })
    }
}

/// Decode one `customer_client` search row.
pub fn customer_client(row: &Value) -> Result<CustomerClient, String> {
    let id = required_text(row, "customer_client.id")?;
    let level = to_int(field(row, "customer_client.level")).unwrap_or(0);
    Ok(CustomerClient {
        id: CustomerId::new(&id).map_err(|e| e.to_string())?,
        level: u32::try_from(level).map_err(|_| format!("invalid level {level}"))?,
        manager: field(row, "customer_client.manager")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        descriptive_name: text(row, "customer_client.descriptive_name"),
        currency_code: text(row, "customer_client.currency_code"),
        time_zone: text(row, "customer_client.time_zone"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn range() -> DateRange {
        DateRange::day(ReportDate::parse("2024-03-01").unwrap()).unwrap()
    }

    #[test]
    fn campaign_query_filters_impressions() {
        let q = report_query::<GoogleCampaignRow>(&range());
        assert!(q.starts_with("SELECT segments.date, customer.id, campaign.id"));
        assert!(q.contains("FROM campaign"));
        assert!(q.contains("BETWEEN '2024-03-01' AND '2024-03-01'"));
        assert!(q.ends_with("AND metrics.impressions > 0"));
    }

    #[test]
    fn conversion_query_does_not_filter() {
        let q = report_query::<GoogleConversionRow>(&range());
        assert!(q.contains("segments.conversion_action_category"));
        assert!(!q.contains("metrics.impressions"));
    }

    #[test]
    fn campaign_row_decodes_proto_json() {
        let row = json!({
            "segments": {"date": "2024-03-01"},
            "customer": {"id": "1234567890", "currencyCode": "USD"},
            "campaign": {"id": "98765", "name": "Spring"},
            "metrics": {
                "impressions": "1200",
                "clicks": "34",
                "costMicros": "5670000",
                "ctr": 0.0283,
                "averageCpc": 166764.7
            }
        });
        let r = GoogleCampaignRow::from_search_row(&row).unwrap();
        assert_eq!(r.customer_id, "1234567890");
        assert_eq!(r.currency_code.as_deref(), Some("USD"));
        assert_eq!(r.impressions, Some(1200));
        assert_eq!(r.cost_micros, Some(5_670_000.0));
        // omitted in proto3 JSON means zero
        assert_eq!(r.video_views, Some(0));
        assert_eq!(r.conversions, Some(0.0));
    }

    #[test]
    fn row_without_date_is_rejected() {
        let row = json!({"customer": {"id": "1"}, "campaign": {"id": "2"}});
        let err = GoogleCampaignRow::from_search_row(&row).unwrap_err();
        assert!(err.contains("segments.date"));
    }

    #[test]
    fn conversion_row_keeps_category_name() {
        let row = json!({
            "segments": {
                "date": "2024-03-01",
                "conversionAction": "customers/1/conversionActions/9",
                "conversionActionName": "Checkout",
                "conversionActionCategory": "PURCHASE"
            },
            "customer": {"id": "1"},
            "campaign": {"id": "2"},
            "metrics": {"conversions": 3.0}
        });
        let r = GoogleConversionRow::from_search_row(&row).unwrap();
        assert_eq!(r.conversion_action, "customers/1/conversionActions/9");
        assert_eq!(r.conversion_action_category.as_deref(), Some("PURCHASE"));
        assert_eq!(r.conversions, Some(3.0));
    }

    #[test]
    fn customer_client_row() {
        let row = json!({"customerClient": {
            "id": "555", "level": "1", "manager": true, "descriptiveName": "Agency"
        }});
        let c = customer_client(&row).unwrap();
        assert_eq!(c.id.as_str(), "555");
        assert_eq!(c.level, 1);
        assert!(c.manager);
        // level 0 is omitted as a zero value
        let root = customer_client(&json!({"customerClient": {"id": "1"}})).unwrap();
        assert_eq!(root.level, 0);
        assert!(!root.manager);
    }
}
