//! Typed rows for each registered report shape.

mod google;
mod tiktok;

pub use google::{GoogleCampaignRow, GoogleConversionRow};
pub use tiktok::TiktokCampaignRow;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ReportRecord;
    use crate::temporal::ReportDate;
    use crate::value::{CellValue, KeyTuple};

    fn day() -> ReportDate {
        ReportDate::parse("2024-03-01").unwrap()
    }

    fn check_shape<R: ReportRecord>(row: &R) {
        let cells = row.cells();
        assert_eq!(cells.len(), R::SCHEMA.columns.len());
        for (cell, col) in cells.iter().zip(R::SCHEMA.columns) {
            assert_eq!(cell.column_type(), col.ty, "column {}", col.name);
        }
        assert_eq!(KeyTuple::project(R::SCHEMA, &cells), Some(row.key()));
    }

    #[test]
    fn google_campaign_cells_match_schema() {
        let row = GoogleCampaignRow {
            date: day(),
            customer_id: "123".into(),
            campaign_id: "456".into(),
            impressions: Some(10),
            ..GoogleCampaignRow::empty(day(), "123", "456")
        };
        check_shape(&row);
        assert!(row.has_impressions());
    }

    #[test]
    fn google_conversion_is_not_impression_filtered() {
        let row = GoogleConversionRow::empty(day(), "123", "456", "customers/123/conversionActions/9");
        check_shape(&row);
        assert!(row.has_impressions());
        assert_eq!(row.key().parts.len(), 3);
    }

    #[test]
    fn tiktok_zero_and_missing_impressions_filtered() {
        let mut row = TiktokCampaignRow::empty(day(), "advX", "campY");
        check_shape(&row);
        assert!(!row.has_impressions());
        row.impressions = Some(0);
        assert!(!row.has_impressions());
        row.impressions = Some(3);
        assert!(row.has_impressions());
        assert_eq!(row.cells()[7], CellValue::Integer(Some(3)));
    }
}
