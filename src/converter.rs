//! Conversion pipeline: load → classify → filter → aggregate → write.
//!
//! All per-run state lives in a [`Pipeline`] value, so two conversions in the
//! same process never share counters or collections.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, info};
use serde_json::Value;

use crate::aggregate::{Aggregator, Categories};
use crate::classify::{classify, Classified};
use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::filter;
use crate::kml::write_kml;
use crate::stats::RunStats;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ============================================================================
// Input
// ============================================================================

/// Load the export file as a list of raw records.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConvertError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => ConvertError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    // Read failures surface through serde_json; keep them apart from bad syntax
    let records = load_records_from_reader(BufReader::new(file)).map_err(|err| match err {
        ConvertError::InvalidJson(e) if e.is_io() => ConvertError::InputUnreadable {
            path: path.to_path_buf(),
            source: io::Error::from(e),
        },
        other => other,
    })?;
    info!("[Loader] Loaded {} entries from {}", records.len(), path.display());
    Ok(records)
}

/// Decode a JSON list of raw records from any reader.
pub fn load_records_from_reader<R: Read>(reader: R) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_reader(reader)?;
    match value {
        Value::Array(records) => Ok(records),
        other => Err(ConvertError::NotAList {
            found: json_type_name(&other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Mutable state of one conversion run.
struct Pipeline<'c> {
    config: &'c ConvertConfig,
    aggregator: Aggregator,
    stats: RunStats,
}

impl<'c> Pipeline<'c> {
    fn new(config: &'c ConvertConfig) -> Self {
        Self {
            config,
            aggregator: Aggregator::new(config.group_by_day),
            stats: RunStats::default(),
        }
    }

    fn ingest(&mut self, index: usize, record: Classified) {
        self.stats.total += 1;

        if let Classified::Dropped(reason) = &record {
            debug!("[Convert] Entry {} dropped: {:?}", index, reason);
            self.stats.filtered_out += 1;
            return;
        }

        if !filter::include(&record, self.config) {
            debug!("[Convert] Entry {} filtered out", index);
            self.stats.filtered_out += 1;
            return;
        }

        match record {
            Classified::Activity(activity) => {
                if filter::tracks_enabled(self.config) {
                    if let Some(track) = activity.track() {
                        self.stats.tracks += 1;
                        self.aggregator.push_track(track);
                    }
                }
                self.stats.activities += 1;
                self.aggregator.push_activity(activity);
            }
            Classified::Visit(visit) => {
                self.stats.visits += 1;
                self.aggregator.push_visit(visit);
            }
            Classified::Dropped(_) => {}
        }
    }

    fn finish(self) -> (Categories, RunStats) {
        (self.aggregator.finish(), self.stats)
    }
}

/// Classify every record, keeping input order.
#[cfg(feature = "parallel")]
fn classify_all(records: &[Value]) -> Vec<Classified> {
    records.par_iter().map(classify).collect()
}

#[cfg(not(feature = "parallel"))]
fn classify_all(records: &[Value]) -> Vec<Classified> {
    records.iter().map(classify).collect()
}

/// Filter and aggregate already-loaded records without writing anything.
pub fn collect_records(
    records: &[Value],
    config: &ConvertConfig,
) -> Result<(Categories, RunStats)> {
    config.validate()?;

    let mut pipeline = Pipeline::new(config);
    for (index, record) in classify_all(records).into_iter().enumerate() {
        pipeline.ingest(index, record);
    }
    let (categories, stats) = pipeline.finish();

    info!(
        "[Convert] Processed {} activities and {} visits, filtered out {} of {} entries",
        stats.activities, stats.visits, stats.filtered_out, stats.total
    );
    Ok((categories, stats))
}

/// Convert already-loaded records and stream the KML document to `out`.
pub fn convert_records<W: Write>(
    records: &[Value],
    config: &ConvertConfig,
    out: W,
) -> Result<RunStats> {
    let (categories, stats) = collect_records(records, config)?;
    write_kml(out, &categories, config)?;
    Ok(stats)
}

/// Convert an export file into a KML file.
///
/// The input is loaded and validated before the output file is created, so a
/// structural input error leaves no output behind.
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConvertConfig,
) -> Result<RunStats> {
    let records = load_records(input)?;
    let (categories, stats) = collect_records(&records, config)?;

    let output = output.as_ref();
    let file = File::create(output)?;
    info!("[Convert] Writing KML to {}", output.display());
    write_kml(BufWriter::new(file), &categories, config)?;
    Ok(stats)
}
