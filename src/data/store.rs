//! Aligned return series storage
//!
//! Every instrument shares one strictly increasing timestamp axis. Values
//! are `None` where no return could be computed.

use super::error::DataError;
use crate::types::InstrumentId;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::ops::Range;

/// Return sequence for one instrument, aligned to the store's time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    instrument: InstrumentId,
    values: Vec<Option<f64>>,
}

impl ReturnSeries {
    pub fn new(instrument: impl Into<InstrumentId>, values: Vec<Option<f64>>) -> Self {
        Self {
            instrument: instrument.into(),
            values,
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Holds aligned per-instrument return sequences on a common time axis.
#[derive(Debug, Clone)]
pub struct ReturnSeriesStore {
    timestamps: Vec<DateTime<Utc>>,
    /// Keyed by instrument; BTreeMap fixes the enumeration order
    series: BTreeMap<InstrumentId, ReturnSeries>,
}

impl ReturnSeriesStore {
    /// Build a store, validating alignment.
    ///
    /// # Errors
    /// - `NoInstruments` if `series` is empty
    /// - `NonMonotonicTimestamps` if the axis is not strictly increasing
    /// - `Misaligned` if any series length differs from the axis length
    pub fn new(
        timestamps: Vec<DateTime<Utc>>,
        series: BTreeMap<InstrumentId, Vec<Option<f64>>>,
    ) -> Result<Self, DataError> {
        if series.is_empty() {
            return Err(DataError::NoInstruments);
        }

        if let Some(index) = timestamps
            .windows(2)
            .position(|pair| pair[1] <= pair[0])
        {
            return Err(DataError::NonMonotonicTimestamps { index: index + 1 });
        }

        let expected = timestamps.len();
        let mut aligned = BTreeMap::new();
        for (instrument, values) in series {
            if values.len() != expected {
                return Err(DataError::Misaligned {
                    instrument,
                    expected,
                    actual: values.len(),
                });
            }
            // Non-finite inputs are treated as missing
            let values = values
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect();
            aligned.insert(instrument.clone(), ReturnSeries::new(instrument, values));
        }

        Ok(Self {
            timestamps,
            series: aligned,
        })
    }

    /// Instrument identifiers in sorted order.
    pub fn instruments(&self) -> Vec<&str> {
        self.series.keys().map(|k| k.as_str()).collect()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Number of points on the time axis
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn series(&self, instrument: &str) -> Option<&ReturnSeries> {
        self.series.get(instrument)
    }

    /// Return of `instrument` at axis position `index`.
    ///
    /// `None` for an unknown instrument, an out-of-range index, or a missing value.
    pub fn return_at(&self, instrument: &str, index: usize) -> Option<f64> {
        self.series
            .get(instrument)
            .and_then(|s| s.values.get(index).copied().flatten())
    }

    /// Axis indices falling within the optional inclusive bounds.
    pub fn index_range(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Range<usize> {
        let lo = match start {
            Some(s) => self.timestamps.partition_point(|t| *t < s),
            None => 0,
        };
        let hi = match end {
            Some(e) => self.timestamps.partition_point(|t| *t <= e),
            None => self.timestamps.len(),
        };
        lo..hi.max(lo)
    }
}
