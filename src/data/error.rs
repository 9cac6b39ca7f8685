//! Error types for the data module

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or aligning return series.
///
/// All of these are fatal: they abort a run before any backtest state exists.
#[derive(Error, Debug)]
pub enum DataError {
    /// File could not be opened or read
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Timestamp column could not be parsed
    #[error("Invalid timestamp '{value}' in {path}")]
    InvalidTimestamp { path: PathBuf, value: String },

    /// Instrument file had no usable rows
    #[error("No price data for instrument {0}")]
    EmptyInstrument(String),

    /// Nothing to align
    #[error("No instruments supplied")]
    NoInstruments,

    /// Pairs need at least two instruments
    #[error("Need at least 2 instruments, got {0}")]
    TooFewInstruments(usize),

    /// A series does not cover the shared time axis
    #[error("Series for {instrument} has {actual} points, expected {expected}")]
    Misaligned {
        instrument: String,
        expected: usize,
        actual: usize,
    },

    /// Time axis is not strictly increasing
    #[error("Timestamps must be strictly increasing (violation at index {index})")]
    NonMonotonicTimestamps { index: usize },
}
