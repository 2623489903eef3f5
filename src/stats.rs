//! Per-run counters and the post-run summary.

use serde::Serialize;
use std::fmt;

/// Counters for one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Records seen
    pub total: u64,
    pub activities: u64,
    pub visits: u64,
    pub tracks: u64,
    /// Records that contributed nothing to the output
    pub filtered_out: u64,
}

impl RunStats {
    /// Placemarks the run accounts for; each activity counts as two points.
    pub fn total_placemarks(&self) -> u64 {
        self.activities * 2 + self.visits + self.tracks
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Conversion Statistics ===")?;
        writeln!(f, "Total entries processed: {}", self.total)?;
        writeln!(f, "Activities: {}", self.activities)?;
        writeln!(f, "Visits: {}", self.visits)?;
        writeln!(f, "Tracks: {}", self.tracks)?;
        writeln!(f, "Filtered out: {}", self.filtered_out)?;
        write!(f, "Total placemarks created: {}", self.total_placemarks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_placemarks() {
        let stats = RunStats {
            total: 10,
            activities: 3,
            visits: 2,
            tracks: 1,
            filtered_out: 4,
        };
        assert_eq!(stats.total_placemarks(), 9);
    }

    #[test]
    fn test_summary_and_json() {
        let stats = RunStats {
            total: 1,
            activities: 1,
            ..RunStats::default()
        };
        let summary = stats.to_string();
        assert!(summary.contains("Total entries processed: 1"));
        assert!(summary.ends_with("Total placemarks created: 2"));

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["activities"], 1);
        assert_eq!(json["filtered_out"], 0);
    }
}
