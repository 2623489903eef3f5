//! Conversion configuration.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::timestamp::{from_naive_utc, Timestamp, DATE_KEY_FORMAT};

const NAIVE_BOUND_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const OFFSET_BOUND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Filters and output options for one conversion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Inclusive lower bound on a record's start (else end) time
    pub start_date: Option<Timestamp>,
    /// Inclusive upper bound on a record's start (else end) time
    pub end_date: Option<Timestamp>,
    /// Minimum accuracy in meters. Accepted but inert: records carry no accuracy.
    pub min_accuracy: Option<f64>,
    pub include_activities: bool,
    pub include_visits: bool,
    /// Tracks are derived from included activities only
    pub include_tracks: bool,
    /// Emit one folder per calendar day instead of flat category folders
    pub group_by_day: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            min_accuracy: None,
            include_activities: true,
            include_visits: true,
            include_tracks: true,
            group_by_day: false,
        }
    }
}

impl ConvertConfig {
    pub fn with_date_range(mut self, start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_group_by_day(mut self, group_by_day: bool) -> Self {
        self.group_by_day = group_by_day;
        self
    }

    pub fn with_categories(mut self, activities: bool, visits: bool, tracks: bool) -> Self {
        self.include_activities = activities;
        self.include_visits = visits;
        self.include_tracks = tracks;
        self
    }

    pub fn has_date_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Reject a start bound that lies after the end bound.
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            if start > end {
                return Err(ConvertError::InvalidDateRange {
                    start: start.to_rfc3339(),
                    end: end.to_rfc3339(),
                });
            }
        }
        Ok(())
    }
}

/// Parse a date bound given on the command line.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS+HHMM` and RFC 3339. Bounds without a zone are UTC.
///
/// # Example
/// ```
/// use location_history_kml::parse_date_bound;
/// let start = parse_date_bound("2024-01-01").unwrap();
/// assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
/// assert!(parse_date_bound("01/02/2024").is_err());
/// ```
pub fn parse_date_bound(text: &str) -> Result<Timestamp> {
    let text = text.trim();

    if let Some(midnight) = NaiveDate::parse_from_str(text, DATE_KEY_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(from_naive_utc(midnight));
    }

    for format in NAIVE_BOUND_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(from_naive_utc(naive));
        }
    }

    DateTime::parse_from_str(text, OFFSET_BOUND_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .map_err(|_| ConvertError::InvalidDate {
            input: text.to_string(),
        })
}
