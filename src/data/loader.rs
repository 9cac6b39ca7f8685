//! CSV price ingestion and hourly return alignment
//!
//! Reads one `<INSTRUMENT>.csv` per instrument (`timestamp,close`), resamples
//! to hourly bars, forward-fills short gaps and converts prices to returns on
//! a common hourly axis.

use super::error::DataError;
use super::store::ReturnSeriesStore;
use crate::types::InstrumentId;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SECONDS_PER_HOUR: i64 = 3600;

/// Hourly close prices keyed by bar start
pub type HourlyBars = BTreeMap<DateTime<Utc>, f64>;

#[derive(Debug, Deserialize)]
struct PriceRow {
    timestamp: String,
    close: f64,
}

/// Parse a timestamp as unix seconds, RFC 3339, or `%Y-%m-%d %H:%M:%S` (UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Utc.timestamp_opt(secs, 0).single();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Floor a timestamp to the start of its hour.
pub fn floor_to_hour(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let secs = ts.timestamp();
    Utc.timestamp_opt(secs - secs.rem_euclid(SECONDS_PER_HOUR), 0)
        .single()
}

/// Load raw `(timestamp, close)` rows from a CSV file.
///
/// # Errors
/// `Io` if the file cannot be opened, `Csv` on malformed rows,
/// `InvalidTimestamp` on an unparseable timestamp.
pub fn load_price_csv(path: &Path) -> Result<Vec<(DateTime<Utc>, f64)>, DataError> {
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let row: PriceRow = result.map_err(|source| DataError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let ts = parse_timestamp(&row.timestamp).ok_or_else(|| DataError::InvalidTimestamp {
            path: path.to_path_buf(),
            value: row.timestamp.clone(),
        })?;
        rows.push((ts, row.close));
    }

    debug!(path = %path.display(), rows = rows.len(), "Loaded price rows");
    Ok(rows)
}

/// Resample rows to hourly bars; the last close inside each hour wins.
pub fn resample_hourly(rows: &[(DateTime<Utc>, f64)]) -> HourlyBars {
    let mut sorted: Vec<_> = rows
        .iter()
        .filter(|(_, close)| close.is_finite())
        .copied()
        .collect();
    sorted.sort_by_key(|(ts, _)| *ts);

    let mut bars = HourlyBars::new();
    for (ts, close) in sorted {
        if let Some(hour) = floor_to_hour(ts) {
            bars.insert(hour, close);
        }
    }
    bars
}

/// Align hourly bars of several instruments into a return store.
///
/// The axis runs hourly from the earliest to the latest bar. Prices are
/// forward-filled over gaps of at most `max_fill_gap_hours`. Returns that
/// cannot be computed after an instrument's first observation are filled
/// with 0.0; before it they are `None`.
///
/// # Errors
/// `NoInstruments` if `bars` is empty, `EmptyInstrument` if any instrument
/// has no bars.
pub fn align_returns(
    bars: &BTreeMap<InstrumentId, HourlyBars>,
    max_fill_gap_hours: u32,
) -> Result<ReturnSeriesStore, DataError> {
    if bars.is_empty() {
        return Err(DataError::NoInstruments);
    }

    let mut first: Option<DateTime<Utc>> = None;
    let mut last: Option<DateTime<Utc>> = None;
    for (instrument, series) in bars {
        let (Some((lo, _)), Some((hi, _))) = (series.first_key_value(), series.last_key_value())
        else {
            return Err(DataError::EmptyInstrument(instrument.clone()));
        };
        first = Some(first.map_or(*lo, |f| f.min(*lo)));
        last = Some(last.map_or(*hi, |l| l.max(*hi)));
    }
    let (Some(first), Some(last)) = (first, last) else {
        return Err(DataError::NoInstruments);
    };

    let hours = (last - first).num_hours();
    let axis: Vec<DateTime<Utc>> = (0..=hours).map(|h| first + Duration::hours(h)).collect();

    let mut returns = BTreeMap::new();
    for (instrument, series) in bars {
        let prices = forward_fill(&axis, series, max_fill_gap_hours);
        let values = prices_to_returns(&prices);
        let filled = prices
            .iter()
            .filter(|p| p.is_some())
            .count()
            .saturating_sub(series.len());
        if filled > 0 {
            debug!(instrument = %instrument, filled, "Forward-filled price gaps");
        }
        returns.insert(instrument.clone(), values);
    }

    info!(
        instruments = returns.len(),
        hours = axis.len(),
        start = %first,
        end = %last,
        "Aligned return series"
    );
    ReturnSeriesStore::new(axis, returns)
}

fn forward_fill(
    axis: &[DateTime<Utc>],
    series: &HourlyBars,
    max_fill_gap_hours: u32,
) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(axis.len());
    let mut last_seen: Option<(usize, f64)> = None;

    for (i, ts) in axis.iter().enumerate() {
        match series.get(ts) {
            Some(close) => {
                last_seen = Some((i, *close));
                out.push(Some(*close));
            }
            None => {
                let filled = last_seen
                    .filter(|(idx, _)| i - idx <= max_fill_gap_hours as usize)
                    .map(|(_, close)| close);
                out.push(filled);
            }
        }
    }
    out
}

fn prices_to_returns(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    let first_obs = prices.iter().position(|p| p.is_some());
    let mut out = Vec::with_capacity(prices.len());

    for i in 0..prices.len() {
        let started = first_obs.is_some_and(|f| i > f);
        if !started {
            out.push(None);
            continue;
        }
        let value = match (prices[i - 1], prices[i]) {
            (Some(prev), Some(cur)) if prev > 0.0 => cur / prev - 1.0,
            // No-movement assumption across unfilled gaps
            _ => 0.0,
        };
        out.push(Some(value));
    }
    out
}

/// Load `<data_dir>/<INSTRUMENT>.csv` for each instrument and align them.
///
/// # Errors
/// Any I/O, CSV or timestamp failure aborts the load.
pub fn load_directory(
    data_dir: &Path,
    instruments: &[String],
    max_fill_gap_hours: u32,
) -> Result<ReturnSeriesStore, DataError> {
    if instruments.is_empty() {
        return Err(DataError::NoInstruments);
    }

    let mut bars = BTreeMap::new();
    for instrument in instruments {
        let path = instrument_path(data_dir, instrument);
        info!(instrument = %instrument, path = %path.display(), "Loading CSV data");
        let rows = load_price_csv(&path)?;
        let hourly = resample_hourly(&rows);
        if hourly.is_empty() {
            warn!(instrument = %instrument, "No usable rows");
            return Err(DataError::EmptyInstrument(instrument.clone()));
        }
        bars.insert(instrument.clone(), hourly);
    }

    align_returns(&bars, max_fill_gap_hours)
}

fn instrument_path(data_dir: &Path, instrument: &str) -> PathBuf {
    data_dir.join(format!("{}.csv", instrument))
}
