//! Filter stage: decides which classified records reach the output.
//!
//! Date bounds are inclusive at both ends. Timestamps are compared as
//! absolute instants, so offsets never need to be dropped to make two values
//! comparable; zone-less input was already pinned to UTC when parsed.

use crate::classify::Classified;
use crate::config::ConvertConfig;
use crate::timestamp::Timestamp;

/// Check a record time against the configured date range.
///
/// With no bounds configured everything passes. A record whose time is
/// unknown also passes, since it cannot be evaluated.
pub fn within_date_range(time: Option<&Timestamp>, config: &ConvertConfig) -> bool {
    if !config.has_date_range() {
        return true;
    }

    let Some(time) = time else {
        return true;
    };

    if config.start_date.as_ref().is_some_and(|start| time < start) {
        return false;
    }
    if config.end_date.as_ref().is_some_and(|end| time > end) {
        return false;
    }
    true
}

/// Accuracy filter. Location-history records expose no per-point accuracy,
/// so this accepts everything whatever `min_accuracy` is set to.
pub fn passes_accuracy(_record: &Classified, _min_accuracy: Option<f64>) -> bool {
    true
}

/// Category toggle for a classified record.
pub fn category_enabled(record: &Classified, config: &ConvertConfig) -> bool {
    match record {
        Classified::Activity(_) => config.include_activities,
        Classified::Visit(_) => config.include_visits,
        Classified::Dropped(_) => false,
    }
}

/// Full inclusion decision for a classified record.
pub fn include(record: &Classified, config: &ConvertConfig) -> bool {
    category_enabled(record, config)
        && within_date_range(record.reference_time(), config)
        && passes_accuracy(record, config.min_accuracy)
}

/// Whether tracks should be derived from included activities.
pub fn tracks_enabled(config: &ConvertConfig) -> bool {
    config.include_activities && config.include_tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::timestamp::parse_timestamp;
    use serde_json::json;

    fn ts(text: &str) -> Timestamp {
        parse_timestamp(text).unwrap()
    }

    fn bounded() -> ConvertConfig {
        ConvertConfig::default().with_date_range(
            Some(ts("2024-03-01T00:00:00Z")),
            Some(ts("2024-03-31T23:59:59Z")),
        )
    }

    #[test]
    fn test_no_bounds_includes_everything() {
        let config = ConvertConfig::default();
        assert!(within_date_range(Some(&ts("1999-01-01T00:00:00Z")), &config));
        assert!(within_date_range(None, &config));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let config = bounded();
        assert!(within_date_range(Some(&ts("2024-03-01T00:00:00Z")), &config));
        assert!(within_date_range(Some(&ts("2024-03-31T23:59:59Z")), &config));
        assert!(!within_date_range(Some(&ts("2024-02-29T23:59:59Z")), &config));
        assert!(!within_date_range(Some(&ts("2024-04-01T00:00:00Z")), &config));
    }

    #[test]
    fn test_unknown_time_included() {
        assert!(within_date_range(None, &bounded()));
    }

    #[test]
    fn test_offsets_compared_as_instants() {
        let config = bounded();
        // 2024-03-01T07:00 at +08:00 is still February in UTC
        assert!(!within_date_range(Some(&ts("2024-03-01T07:00:00+08:00")), &config));
        assert!(within_date_range(Some(&ts("2024-03-01T08:00:00+08:00")), &config));
    }

    #[test]
    fn test_end_time_fallback() {
        let raw = json!({
            "endTime": "2024-05-01T00:00:00Z",
            "activity": {"start": "geo:1.0,2.0"}
        });
        let record = classify(&raw);
        assert!(!include(&record, &bounded()));
    }

    #[test]
    fn test_category_toggles() {
        let activity = classify(&json!({"activity": {"start": "geo:1.0,2.0"}}));
        let visit = classify(&json!({"visit": {"topCandidate": {"placeLocation": "geo:1.0,2.0"}}}));
        let config = ConvertConfig::default().with_categories(false, true, true);

        assert!(!include(&activity, &config));
        assert!(include(&visit, &config));
        assert!(!tracks_enabled(&config));
    }

    #[test]
    fn test_accuracy_is_inert() {
        let activity = classify(&json!({"activity": {"start": "geo:1.0,2.0"}}));
        assert!(passes_accuracy(&activity, Some(5.0)));
        let config = ConvertConfig {
            min_accuracy: Some(1.0),
            ..ConvertConfig::default()
        };
        assert!(include(&activity, &config));
    }
}
