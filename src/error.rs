//! Unified error handling for the converter.
//!
//! Only structural failures surface here. Malformed fields inside a record
//! (bad geo strings, timestamps, numbers) resolve to `None` where they are
//! read and never become errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors for a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input file does not exist
    #[error("Input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    /// Input file exists but could not be read
    #[error("Cannot read input file {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Input is not valid JSON
    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Top-level JSON value is not a list of entries
    #[error("JSON data should be a list of location entries, found {found}")]
    NotAList { found: &'static str },

    /// A date bound matched none of the accepted formats
    #[error("Unable to parse date: {input}")]
    InvalidDate { input: String },

    /// Start bound is after end bound
    #[error("Start date must be before end date ({start} > {end})")]
    InvalidDateRange { start: String, end: String },

    /// Writing the output document failed
    #[error("Failed to write KML output: {0}")]
    Output(#[from] io::Error),
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
