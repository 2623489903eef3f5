//! Read-only views over decoded location-history records.
//!
//! Records arrive as loosely-typed JSON. These views expose each field the
//! converter needs through an accessor that returns `None` for a missing or
//! malformed value, so a single odd field never aborts a run.
//!
//! Numeric fields are accepted as JSON numbers or numeric strings, since
//! exports stringify them inconsistently.

use serde_json::Value;

use crate::geo_utils::{parse_e7, parse_geo};
use crate::timestamp::{parse_timestamp, Timestamp};
use crate::Coordinate;

/// Read a numeric field from a number or a numeric string.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key)?.as_str()
}

fn number_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(as_number)
}

fn object_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|v| v.is_object())
}

/// Non-empty array at `parent.key`.
fn non_empty_list<'a>(value: &'a Value, key: &str) -> Option<&'a [Value]> {
    value
        .get(key)?
        .as_array()
        .map(Vec::as_slice)
        .filter(|list| !list.is_empty())
}

/// Decode an E7 point object, e.g. `{"latE7": 223357990, "lngE7": 1141736730}`.
fn e7_point(point: &Value, lat_key: &str, lng_key: &str) -> Option<Coordinate> {
    let lat = number_field(point, lat_key)?;
    let lng = number_field(point, lng_key)?;
    parse_e7(lat, lng)
}

/// A single top-level entry of the export.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    raw: &'a Value,
}

impl<'a> RecordView<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        str_field(self.raw, "startTime").and_then(parse_timestamp)
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        str_field(self.raw, "endTime").and_then(parse_timestamp)
    }

    /// The `activity` sub-structure, if the record carries one.
    pub fn activity(&self) -> Option<ActivityView<'a>> {
        object_field(self.raw, "activity").map(|raw| ActivityView { raw })
    }

    /// The `visit` sub-structure, if the record carries one.
    pub fn visit(&self) -> Option<VisitView<'a>> {
        object_field(self.raw, "visit").map(|raw| VisitView { raw })
    }
}

/// The `activity` object of a record.
#[derive(Debug, Clone, Copy)]
pub struct ActivityView<'a> {
    raw: &'a Value,
}

impl<'a> ActivityView<'a> {
    pub fn start(&self) -> Option<Coordinate> {
        str_field(self.raw, "start").and_then(parse_geo)
    }

    pub fn end(&self) -> Option<Coordinate> {
        str_field(self.raw, "end").and_then(parse_geo)
    }

    /// `topCandidate.type`, e.g. "walking" or "in passenger vehicle".
    pub fn activity_type(&self) -> Option<&'a str> {
        object_field(self.raw, "topCandidate").and_then(|c| str_field(c, "type"))
    }

    pub fn probability(&self) -> Option<f64> {
        number_field(self.raw, "probability")
    }

    pub fn distance_meters(&self) -> Option<f64> {
        number_field(self.raw, "distanceMeters")
    }

    /// `simplifiedRawPath.points`, when present and non-empty.
    pub fn raw_path(&self) -> Option<&'a [Value]> {
        object_field(self.raw, "simplifiedRawPath").and_then(|p| non_empty_list(p, "points"))
    }

    /// `waypointPath.waypoints`, when present and non-empty.
    pub fn waypoint_path(&self) -> Option<&'a [Value]> {
        object_field(self.raw, "waypointPath").and_then(|p| non_empty_list(p, "waypoints"))
    }

    /// `transitPath.transitStops`, when present and non-empty.
    pub fn transit_stops(&self) -> Option<&'a [Value]> {
        object_field(self.raw, "transitPath").and_then(|p| non_empty_list(p, "transitStops"))
    }
}

/// Decode raw-path or waypoint points (`latE7`/`lngE7`), skipping unusable ones.
pub fn decode_lat_lng_e7(points: &[Value]) -> Vec<Coordinate> {
    points
        .iter()
        .filter_map(|p| e7_point(p, "latE7", "lngE7"))
        .collect()
}

/// Decode transit stops (`latitudeE7`/`longitudeE7`), skipping unusable ones.
pub fn decode_transit_stops(stops: &[Value]) -> Vec<Coordinate> {
    stops
        .iter()
        .filter_map(|s| e7_point(s, "latitudeE7", "longitudeE7"))
        .collect()
}

/// The `visit` object of a record.
#[derive(Debug, Clone, Copy)]
pub struct VisitView<'a> {
    raw: &'a Value,
}

impl<'a> VisitView<'a> {
    fn top_candidate(&self) -> Option<&'a Value> {
        object_field(self.raw, "topCandidate")
    }

    /// `topCandidate.placeLocation`.
    pub fn place_location(&self) -> Option<Coordinate> {
        self.top_candidate()
            .and_then(|c| str_field(c, "placeLocation"))
            .and_then(parse_geo)
    }

    /// `topCandidate.placeID`.
    pub fn place_id(&self) -> Option<&'a str> {
        self.top_candidate()
            .and_then(|c| str_field(c, "placeID"))
            .filter(|id| !id.is_empty())
    }

    /// `topCandidate.semanticType`, e.g. "Home" or "Unknown".
    pub fn semantic_type(&self) -> Option<&'a str> {
        self.top_candidate().and_then(|c| str_field(c, "semanticType"))
    }

    pub fn probability(&self) -> Option<f64> {
        number_field(self.raw, "probability")
    }

    /// `hierarchyLevel`, kept as a string whether written as text or integer.
    pub fn hierarchy_level(&self) -> Option<String> {
        match self.raw.get("hierarchyLevel")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
