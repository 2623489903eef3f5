//! Timestamp decoding and display helpers.
//!
//! Timestamps keep the UTC offset they were written with. Display strings and
//! day keys are rendered in that offset, so a record stamped
//! `2024-03-01T23:30:00+08:00` lands on 2024-03-01 regardless of where the
//! conversion runs.

use std::borrow::Cow;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// A parsed point in time with an explicit UTC offset.
///
/// "Unknown" is modelled as `Option<Timestamp>::None` throughout the crate.
pub type Timestamp = DateTime<FixedOffset>;

/// Display pattern used in placemark names.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Day key pattern; zero padded so lexicographic order is chronological.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Placeholder rendered for an unknown timestamp.
pub const UNKNOWN: &str = "Unknown";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Shortest prefix that can carry a zone designator: `YYYY-MM-DDTHH:MM`.
const MIN_ZONED_PREFIX: usize = 16;

/// Parse an ISO-8601 timestamp.
///
/// Accepts a trailing `Z`, an explicit numeric offset (`+08:00`, `+0800` or
/// `+08`), or no zone designator at all (interpreted as UTC). Seconds and
/// fractions are optional. A bare `YYYY-MM-DD` date resolves to midnight
/// UTC. Anything else yields `None`.
///
/// # Example
/// ```
/// use location_history_kml::parse_timestamp;
/// let ts = parse_timestamp("2024-06-01T08:00:00.000+08:00").unwrap();
/// assert_eq!(ts.offset().local_minus_utc(), 8 * 3600);
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts);
    }

    let zoned = normalize_zone(text);
    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(&zoned, format) {
            return Some(ts);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(from_naive_utc(naive));
        }
    }

    NaiveDate::parse_from_str(text, DATE_KEY_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(from_naive_utc)
}

/// Rewrite zone designators `%z` cannot read: `Z` becomes `+00:00` and an
/// hour-only offset gains `:00`.
fn normalize_zone(text: &str) -> Cow<'_, str> {
    if let Some(rest) = text.strip_suffix(['Z', 'z']) {
        return Cow::Owned(format!("{}+00:00", rest));
    }

    let bytes = text.as_bytes();
    if bytes.len() >= MIN_ZONED_PREFIX + 3 {
        let sign = bytes.len() - 3;
        if matches!(bytes[sign], b'+' | b'-') && bytes[sign + 1..].iter().all(u8::is_ascii_digit) {
            return Cow::Owned(format!("{}:00", text));
        }
    }
    Cow::Borrowed(text)
}

/// Attach a UTC offset to a zone-less date-time.
pub(crate) fn from_naive_utc(naive: NaiveDateTime) -> Timestamp {
    Utc.from_utc_datetime(&naive).fixed_offset()
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS`, or `Unknown`.
pub fn format_for_display(ts: Option<&Timestamp>) -> String {
    match ts {
        Some(ts) => ts.format(DISPLAY_FORMAT).to_string(),
        None => UNKNOWN.to_string(),
    }
}

/// Calendar day (`YYYY-MM-DD`) of a timestamp in its own offset.
pub fn date_key(ts: &Timestamp) -> String {
    ts.format(DATE_KEY_FORMAT).to_string()
}

/// Human-readable duration: hours with one decimal from one hour up,
/// otherwise whole minutes.
pub fn format_duration(duration: Duration) -> String {
    let seconds = duration.num_milliseconds() as f64 / 1000.0;
    let hours = seconds / 3600.0;
    if hours >= 1.0 {
        format!("{:.1} hours", hours)
    } else {
        format!("{:.0} minutes", seconds / 60.0)
    }
}

/// Duration between two optional timestamps, when both are known.
pub fn elapsed(start: Option<&Timestamp>, end: Option<&Timestamp>) -> Option<Duration> {
    match (start, end) {
        (Some(start), Some(end)) => Some(end.signed_duration_since(*start)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_zulu() {
        let ts = parse_timestamp("2024-06-01T08:00:00Z").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(format_for_display(Some(&ts)), "2024-06-01 08:00:00");
    }

    #[test]
    fn test_parse_offset_and_fraction() {
        let ts = parse_timestamp("2024-03-01T23:30:15.123+08:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(format_for_display(Some(&ts)), "2024-03-01 23:30:15");
        assert_eq!(date_key(&ts), "2024-03-01");
    }

    #[test]
    fn test_parse_compact_offset() {
        let ts = parse_timestamp("2024-03-01T10:00:00-0500").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_parse_minute_precision() {
        let zulu = parse_timestamp("2024-06-01T08:00Z").unwrap();
        assert_eq!(zulu.offset().local_minus_utc(), 0);
        assert_eq!(format_for_display(Some(&zulu)), "2024-06-01 08:00:00");

        let offset = parse_timestamp("2024-06-01 08:15+02:00").unwrap();
        assert_eq!(offset.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(format_for_display(Some(&offset)), "2024-06-01 08:15:00");

        let naive = parse_timestamp("2024-06-01T08:15").unwrap();
        assert_eq!(naive, parse_timestamp("2024-06-01T08:15:00Z").unwrap());
    }

    #[test]
    fn test_parse_hour_only_offset() {
        let ts = parse_timestamp("2024-06-01T08:00:00+08").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 8 * 3600);
        assert_eq!(format_for_display(Some(&ts)), "2024-06-01 08:00:00");

        let west = parse_timestamp("2024-06-01T08:00:00.500-05").unwrap();
        assert_eq!(west.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(date_key(&west), "2024-06-01");
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let ts = parse_timestamp("2024-03-01T10:00:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts, parse_timestamp("2024-03-01T10:00:00Z").unwrap());

        let midnight = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(format_for_display(Some(&midnight)), "2024-03-01 00:00:00");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a time").is_none());
        assert!(parse_timestamp("2024-13-45T99:00:00Z").is_none());
    }

    #[test]
    fn test_unknown_display() {
        assert_eq!(format_for_display(None), "Unknown");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::minutes(10)), "10 minutes");
        assert_eq!(format_duration(Duration::seconds(59 * 60 + 20)), "59 minutes");
        assert_eq!(format_duration(Duration::minutes(60)), "1.0 hours");
        assert_eq!(format_duration(Duration::minutes(150)), "2.5 hours");
    }

    #[test]
    fn test_elapsed() {
        let start = parse_timestamp("2024-06-01T08:00:00Z").unwrap();
        let end = parse_timestamp("2024-06-01T09:00:00+01:00").unwrap();
        assert_eq!(elapsed(Some(&start), Some(&end)), Some(Duration::zero()));
        assert_eq!(elapsed(Some(&start), None), None);
    }
}
