//! Deterministic synthetic return generator for CI runs.
//!
//! The first half of the instruments are leaders driven by pseudo-random
//! noise; every other instrument reacts against one leader after a fixed lag.

use super::error::DataError;
use super::store::ReturnSeriesStore;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::info;

/// Leader return volatility (uniform returns span ±half of this)
const LEADER_VOLATILITY: f64 = 0.008;
/// Follower idiosyncratic noise
const FOLLOWER_NOISE: f64 = 0.002;
/// How strongly a follower reacts against its leader
const RESPONSE: f64 = -0.6;

/// Unix seconds of the first synthetic bar (2024-01-01T00:00:00Z)
const SYNTHETIC_START_SECS: i64 = 1_704_067_200;

/// Fixed start of the synthetic axis
pub fn synthetic_start() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(SYNTHETIC_START_SECS)
}

/// Generate aligned hourly returns with a planted lead/lag structure.
///
/// # Errors
/// `TooFewInstruments` if fewer than two instruments are given.
pub fn generate_lead_lag_returns(
    instruments: &[String],
    hours: usize,
    lag: usize,
    seed: u64,
) -> Result<ReturnSeriesStore, DataError> {
    if instruments.len() < 2 {
        return Err(DataError::TooFewInstruments(instruments.len()));
    }

    info!(
        instruments = instruments.len(),
        hours,
        lag,
        "Generating synthetic data"
    );

    let leaders = instruments.len().div_ceil(2);
    let mut rng = StdRng::seed_from_u64(seed);

    let leader_series: Vec<Vec<f64>> = (0..leaders)
        .map(|_| (0..hours).map(|_| LEADER_VOLATILITY * rng.random_range(-0.5f64..0.5)).collect())
        .collect();

    let mut series = BTreeMap::new();
    for (i, instrument) in instruments.iter().enumerate() {
        let values: Vec<Option<f64>> = if i < leaders {
            leader_series[i].iter().map(|r| Some(*r)).collect()
        } else {
            let leader = &leader_series[(i - leaders) % leaders];
            (0..hours)
                .map(|t| {
                    let driven = if t >= lag { RESPONSE * leader[t - lag] } else { 0.0 };
                    Some(driven + FOLLOWER_NOISE * rng.random_range(-0.5f64..0.5))
                })
                .collect()
        };
        series.insert(instrument.clone(), values);
    }

    let start = synthetic_start();
    let axis = (0..hours).map(|h| start + Duration::hours(h as i64)).collect();
    ReturnSeriesStore::new(axis, series)
}
