//! Decoding of TikTok integrated-report rows.
//!
//! Each row is `{"dimensions": {...}, "metrics": {...}}` with every value a
//! string. Attribute fields (`advertiser_name`, `campaign_name`, ...) ride in
//! `metrics`. Numeric fields that do not parse, such as `"-"`, become
//! missing; the row is kept.

use serde_json::Value;

use adsync_core::coerce::{to_float, to_int, to_text};
use adsync_core::{AdvertiserId, ReportDate, TiktokCampaignRow};

/// Decode one report row fetched for `account`.
pub fn campaign_row(row: &Value, account: &AdvertiserId) -> Result<TiktokCampaignRow, String> {
    let dims = row.get("dimensions").ok_or("missing dimensions")?;
    let metrics = row.get("metrics").ok_or("missing metrics")?;

    let day = to_text(dims.get("stat_time_day")).ok_or("missing stat_time_day")?;
    let date = ReportDate::parse(&day).map_err(|e| e.to_string())?;
    let campaign_id = to_text(dims.get("campaign_id")).ok_or("missing campaign_id")?;

    let text = |k: &str| to_text(metrics.get(k));
    let int = |k: &str| to_int(metrics.get(k));
    let float = |k: &str| to_float(metrics.get(k));

    Ok(TiktokCampaignRow {
        date,
        advertiser_id: text("advertiser_id").unwrap_or_else(|| account.to_string()),
        campaign_id,
        advertiser_name: text("advertiser_name"),
        campaign_name: text("campaign_name"),
        objective_type: text("objective_type"),
        reach: int("reach"),
        impressions: int("impressions"),
        clicks: int("clicks"),
        video_play_actions: int("video_play_actions"),
        result: int("result"),
        checkout: int("checkout"),
        spend: float("spend"),
        ctr: float("ctr"),
        cpc: float("cpc"),
        cost_per_result: float("cost_per_result"),
    })
}
