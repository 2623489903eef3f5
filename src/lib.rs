//! # Location History KML
//!
//! Converts a location-history export (a JSON list of timestamped activity and
//! visit records) into a KML document for Google Earth and other map viewers.
//!
//! This library provides:
//! - Lenient decoding of `geo:` strings, E7 fixed-point coordinates and ISO-8601 timestamps
//! - Classification of raw records into activities, visits and derived tracks
//! - Date-range and category filtering
//! - Streaming KML output, flat or grouped into per-day folders
//!
//! ## Features
//!
//! - **`parallel`** - Classify records in parallel with rayon (output is unchanged)
//!
//! ## Quick Start
//!
//! ```rust
//! use location_history_kml::{convert_records, ConvertConfig};
//! use serde_json::json;
//!
//! let records = vec![json!({
//!     "startTime": "2024-06-01T08:00:00Z",
//!     "endTime": "2024-06-01T08:10:00Z",
//!     "activity": {
//!         "start": "geo:1.0,2.0",
//!         "end": "geo:3.0,4.0",
//!         "topCandidate": { "type": "walking" },
//!         "probability": 0.9
//!     }
//! })];
//!
//! let mut kml = Vec::new();
//! let stats = convert_records(&records, &ConvertConfig::default(), &mut kml).unwrap();
//! assert_eq!(stats.activities, 1);
//! assert_eq!(stats.tracks, 1);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{ConvertError, Result};

// Coordinate decoding (geo: strings, E7 fixed point)
pub mod geo_utils;
pub use geo_utils::{parse_e7, parse_geo};

// Timestamp decoding and display
pub mod timestamp;
pub use timestamp::{date_key, format_for_display, parse_timestamp, Timestamp};

// Optional-field accessors over decoded JSON records
pub mod records;
pub use records::RecordView;

// Record classification and track derivation
pub mod classify;
pub use classify::{classify, Activity, Classified, PathSource, Track, TrackSource, Visit};

// Run configuration
pub mod config;
pub use config::{parse_date_bound, ConvertConfig};

// Filter stage
pub mod filter;

// Category collections and day index
pub mod aggregate;
pub use aggregate::{Aggregator, Categories, DayKey, Group};

// Run statistics
pub mod stats;
pub use stats::RunStats;

// KML serialization
pub mod kml;
pub use kml::write_kml;

// Pipeline driver and input loading
pub mod converter;
pub use converter::{
    collect_records, convert_file, convert_records, load_records, load_records_from_reader,
};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude in degrees.
///
/// Kept in natural (latitude, longitude) order everywhere in the crate; the
/// swap to KML's `longitude,latitude` happens only when writing.
///
/// # Example
/// ```
/// use location_history_kml::Coordinate;
/// let point = Coordinate::new(22.335799, 114.173673); // Hong Kong
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the coordinate is finite and within the valid lat/lon range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// True when both components are exactly zero (an unset fixed-point field).
    pub fn is_null_island(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(51.5074, -0.1278).is_valid());
        assert!(Coordinate::new(90.0, 180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.1).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_null_island() {
        assert!(Coordinate::new(0.0, 0.0).is_null_island());
        assert!(!Coordinate::new(0.0, 1.0).is_null_island());
    }

    #[test]
    fn test_coordinate_serde() {
        let point = Coordinate::new(22.335799, 114.173673);
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json["latitude"], 22.335799);
        assert_eq!(json["longitude"], 114.173673);

        let restored: Coordinate = serde_json::from_value(json).unwrap();
        assert_eq!(restored, point);
    }
}
