//! Record classification.
//!
//! Turns one raw record into a normalized [`Activity`] or [`Visit`], or a
//! [`DropReason`] saying why it contributes nothing. Tracks are a derived view
//! of an activity, computed on demand by [`Activity::track`].
//!
//! ## Path precedence
//!
//! An activity can carry several path representations. The first one present
//! with a non-empty point list wins:
//!
//! 1. `simplifiedRawPath.points` (GPS samples)
//! 2. `waypointPath.waypoints`
//! 3. `transitPath.transitStops`
//! 4. the activity's own start and end coordinates
//!
//! Points decoding to (0, 0) are skipped. If the winning source leaves fewer
//! than [`MIN_TRACK_POINTS`] usable points, the activity has no track; lower
//! priority sources are not consulted.

use serde_json::Value;

use crate::records::{decode_lat_lng_e7, decode_transit_stops, ActivityView, RecordView};
use crate::timestamp::{elapsed, Timestamp};
use crate::Coordinate;
use chrono::Duration;

/// Minimum number of points for a track line.
pub const MIN_TRACK_POINTS: usize = 2;

/// Label used when a record does not name its activity or place type.
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Hierarchy level of a primary (top-level) visit.
pub const PRIMARY_HIERARCHY_LEVEL: &str = "0";

/// Which path representation an activity's points came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    Gps,
    Waypoint,
    Transit,
    /// No path data; a track falls back to the start/end pair
    None,
}

/// Provenance of a derived track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource {
    GpsTrack,
    WaypointTrack,
    TransitTrack,
    SimpleTrack,
}

impl TrackSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackSource::GpsTrack => "gps_track",
            TrackSource::WaypointTrack => "waypoint_track",
            TrackSource::TransitTrack => "transit_track",
            TrackSource::SimpleTrack => "simple_track",
        }
    }

    /// Title-cased label shown in placemark descriptions.
    pub fn label(&self) -> &'static str {
        match self {
            TrackSource::GpsTrack => "Gps Track",
            TrackSource::WaypointTrack => "Waypoint Track",
            TrackSource::TransitTrack => "Transit Track",
            TrackSource::SimpleTrack => "Simple Track",
        }
    }
}

impl From<PathSource> for TrackSource {
    fn from(source: PathSource) -> Self {
        match source {
            PathSource::Gps => TrackSource::GpsTrack,
            PathSource::Waypoint => TrackSource::WaypointTrack,
            PathSource::Transit => TrackSource::TransitTrack,
            PathSource::None => TrackSource::SimpleTrack,
        }
    }
}

/// A movement segment between two points.
///
/// At least one of `start_coord`/`end_coord` is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Movement category, e.g. "walking", "in passenger vehicle"
    pub kind: String,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub start_coord: Option<Coordinate>,
    pub end_coord: Option<Coordinate>,
    /// Confidence in `kind`, 0.0..=1.0
    pub probability: f64,
    pub distance_meters: Option<f64>,
    /// Decoded points of the winning path source (empty for `PathSource::None`)
    pub raw_path_points: Vec<Coordinate>,
    pub path_source: PathSource,
}

impl Activity {
    /// Derive the track line for this activity, if it has enough points.
    pub fn track(&self) -> Option<Track> {
        let coordinates: Vec<Coordinate> = match self.path_source {
            PathSource::None => [self.start_coord, self.end_coord]
                .into_iter()
                .flatten()
                .collect(),
            _ => self.raw_path_points.clone(),
        };

        if coordinates.len() < MIN_TRACK_POINTS {
            return None;
        }

        Some(Track {
            coordinates,
            start_time: self.start_time,
            end_time: self.end_time,
            activity_type: self.kind.clone(),
            distance_meters: self.distance_meters,
            source: self.path_source.into(),
        })
    }
}

/// A dwell at a single place.
#[derive(Debug, Clone, PartialEq)]
pub struct Visit {
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub coord: Coordinate,
    pub place_id: Option<String>,
    /// e.g. "Home", "Work", "Unknown"
    pub semantic_type: String,
    pub probability: f64,
    /// Categorical level, compared as a string; "0" is a primary visit
    pub hierarchy_level: String,
}

impl Visit {
    pub fn is_primary(&self) -> bool {
        self.hierarchy_level == PRIMARY_HIERARCHY_LEVEL
    }

    /// Time shown for the visit: start, else end.
    pub fn display_time(&self) -> Option<&Timestamp> {
        self.start_time.as_ref().or(self.end_time.as_ref())
    }

    pub fn duration(&self) -> Option<Duration> {
        elapsed(self.start_time.as_ref(), self.end_time.as_ref())
    }
}

/// A polyline through all resolvable path points of an activity.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// At least [`MIN_TRACK_POINTS`] points, in path order
    pub coordinates: Vec<Coordinate>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub activity_type: String,
    pub distance_meters: Option<f64>,
    pub source: TrackSource,
}

impl Track {
    pub fn duration(&self) -> Option<Duration> {
        elapsed(self.start_time.as_ref(), self.end_time.as_ref())
    }
}

/// Why a record produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Neither an `activity` nor a `visit` sub-structure
    Unrecognized,
    /// Activity with neither start nor end coordinate
    ActivityWithoutCoordinates,
    /// Visit whose place location is missing or malformed
    VisitWithoutLocation,
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Activity(Activity),
    Visit(Visit),
    Dropped(DropReason),
}

impl Classified {
    /// Time used by the date filter: start, else end.
    pub fn reference_time(&self) -> Option<&Timestamp> {
        match self {
            Classified::Activity(a) => a.start_time.as_ref().or(a.end_time.as_ref()),
            Classified::Visit(v) => v.display_time(),
            Classified::Dropped(_) => None,
        }
    }
}

/// Classify a raw record.
///
/// A record carrying both sub-structures is treated as an activity.
pub fn classify(raw: &Value) -> Classified {
    let record = RecordView::new(raw);

    if let Some(view) = record.activity() {
        return match extract_activity(&record, &view) {
            Some(activity) => Classified::Activity(activity),
            None => Classified::Dropped(DropReason::ActivityWithoutCoordinates),
        };
    }

    if record.visit().is_some() {
        return match extract_visit(&record) {
            Some(visit) => Classified::Visit(visit),
            None => Classified::Dropped(DropReason::VisitWithoutLocation),
        };
    }

    Classified::Dropped(DropReason::Unrecognized)
}

fn extract_activity(record: &RecordView<'_>, view: &ActivityView<'_>) -> Option<Activity> {
    let start_coord = view.start();
    let end_coord = view.end();
    if start_coord.is_none() && end_coord.is_none() {
        return None;
    }

    let (path_source, raw_path_points) = resolve_path(view);

    Some(Activity {
        kind: view.activity_type().unwrap_or(UNKNOWN_TYPE).to_string(),
        start_time: record.start_time(),
        end_time: record.end_time(),
        start_coord,
        end_coord,
        probability: unit_probability(view.probability()),
        distance_meters: view.distance_meters(),
        raw_path_points,
        path_source,
    })
}

/// Pick the highest-priority path source with a non-empty point list.
fn resolve_path(view: &ActivityView<'_>) -> (PathSource, Vec<Coordinate>) {
    if let Some(points) = view.raw_path() {
        (PathSource::Gps, decode_lat_lng_e7(points))
    } else if let Some(waypoints) = view.waypoint_path() {
        (PathSource::Waypoint, decode_lat_lng_e7(waypoints))
    } else if let Some(stops) = view.transit_stops() {
        (PathSource::Transit, decode_transit_stops(stops))
    } else {
        (PathSource::None, Vec::new())
    }
}

fn extract_visit(record: &RecordView<'_>) -> Option<Visit> {
    let view = record.visit()?;
    let coord = view.place_location()?;

    Some(Visit {
        start_time: record.start_time(),
        end_time: record.end_time(),
        coord,
        place_id: view.place_id().map(str::to_string),
        semantic_type: view.semantic_type().unwrap_or(UNKNOWN_TYPE).to_string(),
        probability: unit_probability(view.probability()),
        hierarchy_level: view
            .hierarchy_level()
            .unwrap_or_else(|| PRIMARY_HIERARCHY_LEVEL.to_string()),
    })
}

fn unit_probability(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0).clamp(0.0, 1.0)
}
