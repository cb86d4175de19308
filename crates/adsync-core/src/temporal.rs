//! # Temporal Types — Calendar Days and Ranges
//!
//! Reports are keyed by calendar day. `ReportDate` carries no time of day
//! and no timezone; its only rendering is `YYYY-MM-DD`.
//!
//! Two range types exist because the pipeline needs both shapes:
//!
//! - [`DateRange`] is half-open `[start, end)`. It describes what to fetch.
//!   Platform APIs take an inclusive last day, available via
//!   [`DateRange::last_day`].
//! - [`DateWindow`] is inclusive `[first, last]`. It describes the span a
//!   fetched batch actually covers, and bounds the existing-key query.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Display and wire format for every date at an I/O boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar day with no time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportDate(NaiveDate);

impl ReportDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from year, month and day, rejecting impossible dates.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidDate {
                value: format!("{year:04}-{month:02}-{day:02}"),
                reason: "no such calendar day".into(),
            })
    }

    /// Parse a day as platforms send it.
    ///
    /// Accepts `2024-03-01`, `2024-03-01 00:00:00` (TikTok `stat_time_day`),
    /// and RFC 3339 timestamps. Any time of day is dropped; an RFC 3339
    /// offset is not applied, the local calendar day is kept.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
            return Ok(Self(d));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(Self(dt.date()));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.date_naive()))
            .map_err(|e| ValidationError::InvalidDate {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// The following calendar day.
    pub fn succ(&self) -> Option<Self> {
        self.0.checked_add_days(Days::new(1)).map(Self)
    }

    /// The preceding calendar day.
    pub fn pred(&self) -> Option<Self> {
        self.0.checked_sub_days(Days::new(1)).map(Self)
    }

    /// First day of this date's month, the warehouse partition boundary.
    pub fn month_start(&self) -> Self {
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    /// First day of the following month.
    pub fn next_month_start(&self) -> Option<Self> {
        let (y, m) = if self.0.month() == 12 {
            (self.0.year() + 1, 1)
        } else {
            (self.0.year(), self.0.month() + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1).map(Self)
    }

    /// Zero-padded `YYYY`, `MM`, `DD` parts, used for export directories.
    pub fn path_parts(&self) -> (String, String, String) {
        (
            format!("{:04}", self.0.year()),
            format!("{:02}", self.0.month()),
            format!("{:02}", self.0.day()),
        )
    }
}

impl std::fmt::Display for ReportDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl std::str::FromStr for ReportDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReportDate {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReportDate> for String {
    fn from(d: ReportDate) -> Self {
        d.to_string()
    }
}

impl From<NaiveDate> for ReportDate {
    fn from(d: NaiveDate) -> Self {
        Self(d)
    }
}

/// Half-open range of days `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: ReportDate,
    end: ReportDate,
}

impl DateRange {
    pub fn new(start: ReportDate, end: ReportDate) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The single-day range `[day, day + 1)`.
    pub fn day(day: ReportDate) -> Result<Self, ValidationError> {
        let end = day.succ().ok_or_else(|| ValidationError::InvalidDate {
            value: day.to_string(),
            reason: "day after is out of range".into(),
        })?;
        Self::new(day, end)
    }

    pub fn start(&self) -> ReportDate {
        self.start
    }

    pub fn end(&self) -> ReportDate {
        self.end
    }

    /// Inclusive last day, as the platform report APIs expect it.
    pub fn last_day(&self) -> ReportDate {
        self.end.pred().unwrap_or(self.start)
    }

    pub fn contains(&self, day: ReportDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = ReportDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.succ()).take_while(move |d| *d < end)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Inclusive span `[first, last]` covered by a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub first: ReportDate,
    pub last: ReportDate,
}

impl DateWindow {
    /// Min and max of the given dates, or `None` for an empty input.
    pub fn spanning(dates: impl IntoIterator<Item = ReportDate>) -> Option<Self> {
        dates.into_iter().fold(None, |acc, d| match acc {
            None => Some(Self { first: d, last: d }),
            Some(w) => Some(Self {
                first: w.first.min(d),
                last: w.last.max(d),
            }),
        })
    }

    pub fn contains(&self, day: ReportDate) -> bool {
        self.first <= day && day <= self.last
    }

    /// First day of every month the window touches, in order.
    pub fn months(&self) -> Vec<ReportDate> {
        let last = self.last.month_start();
        std::iter::successors(Some(self.first.month_start()), |m| m.next_month_start())
            .take_while(|m| *m <= last)
            .collect()
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.first, self.last)
    }
}
