use serde::{Deserialize, Serialize};

use crate::identity::CustomerId;
use crate::record::ReportRecord;
use crate::schema::{ReportKind, TableSchema, GOOGLE_CAMPAIGN, GOOGLE_CONVERSION};
use crate::temporal::ReportDate;
use crate::value::{CellValue, KeyTuple};

/// One campaign-day of Google Ads performance.
///
/// `cost_micros` stays in micros, as the platform reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleCampaignRow {
    pub date: ReportDate,
    pub customer_id: String,
    pub campaign_id: String,
    pub campaign_name: Option<String>,
    pub currency_code: Option<String>,
    pub impressions: Option<i64>,
    pub clicks: Option<i64>,
    pub video_views: Option<i64>,
    pub engagements: Option<i64>,
    pub conversions: Option<f64>,
    pub all_conversions: Option<f64>,
    pub view_through_conversions: Option<f64>,
    pub cost_micros: Option<f64>,
    pub ctr: Option<f64>,
    pub average_cpc: Option<f64>,
    pub absolute_top_impression_percentage: Option<f64>,
    pub top_impression_percentage: Option<f64>,
    pub cost_per_conversion: Option<f64>,
}

impl GoogleCampaignRow {
    /// A row with only its key set.
    pub fn empty(date: ReportDate, customer_id: &str, campaign_id: &str) -> Self {
        Self {
            date,
            customer_id: customer_id.to_string(),
            campaign_id: campaign_id.to_string(),
            campaign_name: None,
            currency_code: None,
            impressions: None,
            clicks: None,
            video_views: None,
            engagements: None,
            conversions: None,
            all_conversions: None,
            view_through_conversions: None,
            cost_micros: None,
            ctr: None,
            average_cpc: None,
            absolute_top_impression_percentage: None,
            top_impression_percentage: None,
            cost_per_conversion: None,
        }
    }
}

impl ReportRecord for GoogleCampaignRow {
    type Account = CustomerId;

    const KIND: ReportKind = ReportKind::GoogleCampaign;

    const SCHEMA: &'static TableSchema = &GOOGLE_CAMPAIGN;

    const DIMENSIONS: &'static [&'static str] = &[
        "segments.date",
        "customer.id",
        "campaign.id",
        "campaign.name",
        "customer.currency_code",
    ];

    const METRICS: &'static [&'static str] = &[
        "metrics.impressions",
        "metrics.clicks",
        "metrics.video_views",
        "metrics.engagements",
        "metrics.conversions",
        "metrics.all_conversions",
        "metrics.view_through_conversions",
        "metrics.cost_micros",
        "metrics.ctr",
        "metrics.average_cpc",
        "metrics.absolute_top_impression_percentage",
        "metrics.top_impression_percentage",
        "metrics.cost_per_conversion",
    ];

    const FILTERS_ZERO_IMPRESSIONS: bool = true;

    fn date(&self) -> ReportDate {
        self.date
    }

    fn impressions(&self) -> Option<i64> {
        self.impressions
    }

    fn key(&self) -> KeyTuple {
        KeyTuple::new(self.date, [self.customer_id.as_str(), self.campaign_id.as_str()])
    }

    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Date(self.date),
            CellValue::text(&self.customer_id),
            CellValue::text(&self.campaign_id),
            CellValue::Text(self.campaign_name.clone()),
            CellValue::Text(self.currency_code.clone()),
            CellValue::Integer(self.impressions),
            CellValue::Integer(self.clicks),
            CellValue::Integer(self.video_views),
            CellValue::Integer(self.engagements),
            CellValue::Float(self.conversions),
            CellValue::Float(self.all_conversions),
            CellValue::Float(self.view_through_conversions),
            CellValue::Float(self.cost_micros),
            CellValue::Float(self.ctr),
            CellValue::Float(self.average_cpc),
            CellValue::Float(self.absolute_top_impression_percentage),
            CellValue::Float(self.top_impression_percentage),
            CellValue::Float(self.cost_per_conversion),
        ]
    }
}

/// One campaign-day-conversion-action of Google Ads conversions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleConversionRow {
    pub date: ReportDate,
    pub customer_id: String,
    pub campaign_id: String,
    pub campaign_name: Option<String>,
    /// Resource name, e.g. `customers/123/conversionActions/456`.
    pub conversion_action: String,
    pub conversion_action_name: Option<String>,
    /// Category enum name, e.g. `PURCHASE`.
    pub conversion_action_category: Option<String>,
    pub conversions: Option<f64>,
    pub all_conversions: Option<f64>,
    pub view_through_conversions: Option<f64>,
}

impl GoogleConversionRow {
    pub fn empty(
        date: ReportDate,
        customer_id: &str,
        campaign_id: &str,
        conversion_action: &str,
    ) -> Self {
        Self {
            date,
            customer_id: customer_id.to_string(),
            campaign_id: campaign_id.to_string(),
            campaign_name: None,
            conversion_action: conversion_action.to_string(),
            conversion_action_name: None,
            conversion_action_category: None,
            conversions: None,
            all_conversions: None,
            view_through_conversions: None,
        }
    }
}

impl ReportRecord for GoogleConversionRow {
    type Account = CustomerId;

    const KIND: ReportKind = ReportKind::GoogleConversion;

    const SCHEMA: &'static TableSchema = &GOOGLE_CONVERSION;

    const DIMENSIONS: &'static [&'static str] = &[
        "segments.date",
        "customer.id",
        "campaign.id",
        "campaign.name",
        "segments.conversion_action",
        "segments.conversion_action_name",
        "segments.conversion_action_category",
    ];

    const METRICS: &'static [&'static str] = &[
        "metrics.conversions",
        "metrics.all_conversions",
        "metrics.view_through_conversions",
    ];

    // Conversion rows carry no impressions.
    const FILTERS_ZERO_IMPRESSIONS: bool = false;

    fn date(&self) -> ReportDate {
        self.date
    }

    fn key(&self) -> KeyTuple {
        KeyTuple::new(
            self.date,
            [
                self.customer_id.as_str(),
                self.campaign_id.as_str(),
                self.conversion_action.as_str(),
            ],
        )
    }

    fn cells(&self) -> Vec<CellValue> {
        vec![
            CellValue::Date(self.date),
            CellValue::text(&self.customer_id),
            CellValue::text(&self.campaign_id),
            CellValue::Text(self.campaign_name.clone()),
            CellValue::text(&self.conversion_action),
            CellValue::Text(self.conversion_action_name.clone()),
            CellValue::Text(self.conversion_action_category.clone()),
            CellValue::Float(self.conversions),
            CellValue::Float(self.all_conversions),
            CellValue::Float(self.view_through_conversions),
        ]
    }
}
