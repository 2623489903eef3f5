//! Coordinate decoding for the two encodings found in location-history exports.
//!
//! - `geo:<lat>,<lon>` strings, used for activity endpoints and visit places
//! - integer degrees scaled by 10^7 ("E7"), used for path points
//!
//! Every failure path yields `None`; nothing here returns an error.

use crate::Coordinate;

/// Scale factor for E7 fixed-point degrees.
pub const E7_SCALE: f64 = 10_000_000.0;

const GEO_PREFIX: &str = "geo:";

/// Parse a `geo:<lat>,<lon>` string.
///
/// Returns `None` when the prefix is missing, the payload does not split into
/// exactly two numeric fields, or the result is outside the valid range.
///
/// # Example
/// ```
/// use location_history_kml::parse_geo;
/// let c = parse_geo("geo:22.335799,114.173673").unwrap();
/// assert_eq!(c.latitude, 22.335799);
/// assert_eq!(c.longitude, 114.173673);
/// assert!(parse_geo("22.3,114.1").is_none());
/// ```
pub fn parse_geo(value: &str) -> Option<Coordinate> {
    let payload = value.strip_prefix(GEO_PREFIX)?;

    let mut fields = payload.split(',');
    let lat = fields.next()?.trim().parse::<f64>().ok()?;
    let lon = fields.next()?.trim().parse::<f64>().ok()?;
    if fields.next().is_some() {
        return None;
    }

    let coord = Coordinate::new(lat, lon);
    coord.is_valid().then_some(coord)
}

/// Decode an E7 fixed-point pair into degrees.
///
/// A pair where both components are exactly zero is treated as an unset
/// field and dropped, even though (0, 0) is a real place in the Atlantic.
///
/// # Example
/// ```
/// use location_history_kml::parse_e7;
/// let c = parse_e7(223357990.0, 1141736730.0).unwrap();
/// assert!((c.latitude - 22.335799).abs() < 1e-9);
/// assert!(parse_e7(0.0, 0.0).is_none());
/// ```
pub fn parse_e7(lat_e7: f64, lng_e7: f64) -> Option<Coordinate> {
    let coord = Coordinate::new(lat_e7 / E7_SCALE, lng_e7 / E7_SCALE);
    if coord.is_null_island() || !coord.is_valid() {
        return None;
    }
    Some(coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geo_valid() {
        let c = parse_geo("geo:1.0,2.0").unwrap();
        assert_eq!(c, Coordinate::new(1.0, 2.0));

        let c = parse_geo("geo:-33.8688,151.2093").unwrap();
        assert_eq!(c.latitude, -33.8688);
        assert_eq!(c.longitude, 151.2093);
    }

    #[test]
    fn test_parse_geo_rejects_malformed() {
        assert!(parse_geo("").is_none());
        assert!(parse_geo("1.0,2.0").is_none());
        assert!(parse_geo("geo:").is_none());
        assert!(parse_geo("geo:1.0").is_none());
        assert!(parse_geo("geo:1.0,2.0,3.0").is_none());
        assert!(parse_geo("geo:abc,2.0").is_none());
        assert!(parse_geo("geo:1.0,").is_none());
    }

    #[test]
    fn test_parse_geo_rejects_out_of_range() {
        assert!(parse_geo("geo:91.0,0.0").is_none());
        assert!(parse_geo("geo:0.5,181.0").is_none());
    }

    #[test]
    fn test_parse_e7() {
        let c = parse_e7(223357990.0, 1141736730.0).unwrap();
        assert!((c.latitude - 22.335799).abs() < 1e-9);
        assert!((c.longitude - 114.173673).abs() < 1e-9);
    }

    #[test]
    fn test_parse_e7_zero_pair_dropped() {
        assert!(parse_e7(0.0, 0.0).is_none());
        // Only the exact zero pair is dropped
        assert!(parse_e7(0.0, 1141736730.0).is_some());
    }
}
