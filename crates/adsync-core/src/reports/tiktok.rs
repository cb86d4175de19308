use serde::{Deserialize, Serialize};

use crate::identity::AdvertiserId;
use crate::record::ReportRecord;
use crate::schema::{ReportKind, TableSchema, TIKTOK_CAMPAIGN};
use crate::temporal::ReportDate;
use crate::value::{CellValue, KeyTuple};

/// One campaign-day of TikTok auction-campaign performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiktokCampaignRow {
    pub date: ReportDate,
    pub advertiser_id: String,
    pub campaign_id: String,
    pub advertiser_name: Option<String>,
    pub campaign_name: Option<String>,
    pub objective_type: Option<String>,
    pub reach: Option<i64>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub video_play_actions: Option<i64>,
    pub result: Option<i64>,
    pub checkout: Option<i64>,
    pub spend: Option<f64>,
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub cost_per_result: Option<f64>,
}

impl TiktokCampaignRow {
    pub fn empty(date: ReportDate, advertiser_id: &str, campaign_id: &str) -> Self {
        Self {
            date,
            advertiser_id: advertiser_id.to_string(),
            campaign_id: campaign_id.to_string(),
            advertiser_name: None,
            campaign_name: None,
            objective_type: None,
            reach: None,
            impressions: None,
            clicks: None,
            video_play_actions: None,
            result: None,
            checkout: None,
            spend: None,
            ctr: None,
            cpc: None,
            cost_per_result: None,
        }
    }
}

impl ReportRecord for TiktokCampaignRow {
    type Account = AdvertiserId;

    const KIND: ReportKind = ReportKind::TiktokCampaign;

    const SCHEMA: &'static TableSchema = &TIKTOK_CAMPAIGN;

    const DIMENSIONS: &'static [&'static str] = &["stat_time_day", "campaign_id"];

    // Attribute fields (advertiser_id .. objective_type) are requested as
    // metrics; the platform returns them alongside the numeric ones.
    const METRICS: &'static [&'static str] = &[
        "advertiser_id",
        "advertiser_name",
        "campaign_name",
        "objective_type",
        "reach",
        "impressions",
        "clicks",
        "video_play_actions",
        "result",
        "checkout",
        "spend",
        "ctr",
        "cpc",
        "cost_per_result",
    ];

    const FILTERS_ZERO_IMPRESSIONS: bool = true;

    fn date(&self) -> ReportDate {
        self.date
    }

    fn impressions(&self) -> Option<i64> {
        self.impressions
    }

    fn key(&self) -> KeyTuple {
        KeyTuple::new(self.date, [self.advertiser_id.as_str(), self.campaign_id.as_str()])
    }

    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Date(self.date),
            CellValue::text(&self.advertiser_id),
            CellValue::text(&self.campaign_id),
            CellValue::Text(self.advertiser_name.clone()),
            CellValue::Text(self.campaign_name.clone()),
            CellValue::Text(self.objective_type.clone()),
            CellValue::Integer(self.reach),
            CellValue::Integer(self.impressions),
            CellValue::Integer(self.clicks),
            CellValue::Integer(self.video_play_actions),
            CellValue::Integer(self.result),
            CellValue::Integer(self.checkout),
            CellValue::Float(self.spend),
            CellValue::Float(self.ctr),
            CellValue::Float(self.cpc),
            CellValue::Float(self.cost_per_result),
        ]
    }
}
