//! Category collections and the optional per-day index.
//!
//! Every included record lands in its flat collection in input order. With
//! day grouping on, it is additionally indexed under the calendar day of its
//! start time; records with an unknown start time stay out of the day index
//! but remain in the flat collections.

use std::collections::BTreeMap;

use crate::classify::{Activity, Track, Visit};
use crate::timestamp::{date_key, Timestamp};

/// Calendar day (`YYYY-MM-DD`) used as a grouping key.
pub type DayKey = String;

/// Positions into the flat collections for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayIndex {
    pub activities: Vec<usize>,
    pub visits: Vec<usize>,
    pub tracks: Vec<usize>,
}

/// Accumulated, filtered records of one run.
#[derive(Debug, Clone, Default)]
pub struct Categories {
    pub activities: Vec<Activity>,
    pub visits: Vec<Visit>,
    pub tracks: Vec<Track>,
    /// Ascending by key, which is chronological for zero-padded dates
    pub by_day: BTreeMap<DayKey, DayIndex>,
}

/// One unit of folder output: everything under a single grouping key.
///
/// `day` is `None` for the flat (ungrouped) layout.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub day: Option<&'a str>,
    pub activities: Vec<&'a Activity>,
    pub visits: Vec<&'a Visit>,
    pub tracks: Vec<&'a Track>,
}

impl Group<'_> {
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.visits.is_empty() && self.tracks.is_empty()
    }
}

impl Categories {
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.visits.is_empty() && self.tracks.is_empty()
    }

    /// Groups to emit, in document order.
    ///
    /// Flat mode yields a single group holding every record. Grouped mode
    /// yields one group per day key present in any category.
    pub fn groups(&self, group_by_day: bool) -> Vec<Group<'_>> {
        if !group_by_day {
            return vec![Group {
                day: None,
                activities: self.activities.iter().collect(),
                visits: self.visits.iter().collect(),
                tracks: self.tracks.iter().collect(),
            }];
        }

        self.by_day
            .iter()
            .map(|(day, index)| Group {
                day: Some(day.as_str()),
                activities: index.activities.iter().map(|&i| &self.activities[i]).collect(),
                visits: index.visits.iter().map(|&i| &self.visits[i]).collect(),
                tracks: index.tracks.iter().map(|&i| &self.tracks[i]).collect(),
            })
            .collect()
    }
}

/// Builds [`Categories`] from included records.
#[derive(Debug, Default)]
pub struct Aggregator {
    categories: Categories,
    group_by_day: bool,
}

impl Aggregator {
    pub fn new(group_by_day: bool) -> Self {
        Self {
            categories: Categories::default(),
            group_by_day,
        }
    }

    fn day_entry(&mut self, start_time: Option<&Timestamp>) -> Option<&mut DayIndex> {
        if !self.group_by_day {
            return None;
        }
        let key = date_key(start_time?);
        Some(self.categories.by_day.entry(key).or_default())
    }

    pub fn push_activity(&mut self, activity: Activity) {
        let position = self.categories.activities.len();
        if let Some(day) = self.day_entry(activity.start_time.as_ref()) {
            day.activities.push(position);
        }
        self.categories.activities.push(activity);
    }

    pub fn push_visit(&mut self, visit: Visit) {
        let position = self.categories.visits.len();
        if let Some(day) = self.day_entry(visit.start_time.as_ref()) {
            day.visits.push(position);
        }
        self.categories.visits.push(visit);
    }

    pub fn push_track(&mut self, track: Track) {
        let position = self.categories.tracks.len();
        if let Some(day) = self.day_entry(track.start_time.as_ref()) {
            day.tracks.push(position);
        }
        self.categories.tracks.push(track);
    }

    pub fn finish(self) -> Categories {
        self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, Classified};
    use serde_json::json;

    fn activity_at(start: Option<&str>) -> Activity {
        let mut raw = json!({"activity": {"start": "geo:1.0,2.0", "end": "geo:3.0,4.0"}});
        if let Some(start) = start {
            raw["startTime"] = json!(start);
        }
        match classify(&raw) {
            Classified::Activity(a) => a,
            other => panic!("expected activity, got {:?}", other),
        }
    }

    fn visit_at(start: &str) -> Visit {
        let raw = json!({
            "startTime": start,
            "visit": {"topCandidate": {"placeLocation": "geo:5.0,6.0"}}
        });
        match classify(&raw) {
            Classified::Visit(v) => v,
            other => panic!("expected visit, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_mode_single_group() {
        let mut agg = Aggregator::new(false);
        agg.push_activity(activity_at(Some("2024-03-02T10:00:00Z")));
        agg.push_activity(activity_at(Some("2024-03-01T10:00:00Z")));
        let categories = agg.finish();

        assert!(categories.by_day.is_empty());
        let groups = categories.groups(false);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].day, None);
        // Input order preserved
        assert_eq!(
            groups[0].activities[0].start_time,
            categories.activities[0].start_time
        );
    }

    #[test]
    fn test_grouped_days_ascending() {
        let mut agg = Aggregator::new(true);
        agg.push_visit(visit_at("2024-03-02T09:00:00Z"));
        agg.push_activity(activity_at(Some("2024-03-01T10:00:00Z")));
        agg.push_activity(activity_at(Some("2024-03-01T12:00:00Z")));
        let categories = agg.finish();

        let groups = categories.groups(true);
        let days: Vec<_> = groups.iter().map(|g| g.day).collect();
        assert_eq!(days, vec![Some("2024-03-01"), Some("2024-03-02")]);
        assert_eq!(groups[0].activities.len(), 2);
        assert!(groups[0].visits.is_empty());
        assert_eq!(groups[1].visits.len(), 1);
        assert!(groups[1].activities.is_empty());
    }

    #[test]
    fn test_unknown_start_skips_day_index_only() {
        let mut agg = Aggregator::new(true);
        agg.push_activity(activity_at(None));
        let categories = agg.finish();

        assert_eq!(categories.activities.len(), 1);
        assert!(categories.by_day.is_empty());
        assert!(categories.groups(true).is_empty());
        assert_eq!(categories.groups(false)[0].activities.len(), 1);
    }

    #[test]
    fn test_day_key_uses_record_offset() {
        let mut agg = Aggregator::new(true);
        // 2024-03-01 locally, 2024-02-29 in UTC
        agg.push_activity(activity_at(Some("2024-03-01T01:00:00+08:00")));
        let categories = agg.finish();
        assert!(categories.by_day.contains_key("2024-03-01"));
    }
}
