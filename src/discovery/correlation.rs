//! Rolling lagged correlation between leader and follower returns
//!
//! For each ordered instrument pair and each lag, slides a window over the
//! leader series and correlates it with the follower window shifted forward
//! by the lag. The absolute correlations of all qualifying windows are
//! summarised into a `CorrelationRecord`.

use super::config::{DiscoveryConfig, MIN_VALID_OBSERVATIONS};
use super::error::DiscoveryError;
use crate::data::ReturnSeriesStore;
use crate::types::InstrumentId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-triple counts of how each rolling window was treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowDiagnostics {
    /// Windows that fit inside both series
    pub evaluated: usize,
    /// Windows whose correlation entered the aggregate
    pub counted: usize,
    /// Skipped: not more than `MIN_VALID_OBSERVATIONS` valid pairs
    pub insufficient: usize,
    /// Discarded: correlation undefined (zero variance)
    pub degenerate: usize,
}

impl std::ops::AddAssign for WindowDiagnostics {
    fn add_assign(&mut self, rhs: Self) {
        self.evaluated += rhs.evaluated;
        self.counted += rhs.counted;
        self.insufficient += rhs.insufficient;
        self.degenerate += rhs.degenerate;
    }
}

/// Aggregate of the absolute window correlations for one (leader, follower, lag)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationStats {
    pub mean_abs: f64,
    /// Population standard deviation
    pub std_abs: f64,
    pub max_abs: f64,
    /// Mean of the signed correlations (used by the correlation-sign policy)
    pub mean_signed: f64,
}

/// Result of scanning every rolling window of one triple
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaggedScan {
    /// `None` when no window qualified
    pub stats: Option<CorrelationStats>,
    pub diagnostics: WindowDiagnostics,
}

/// Lagged correlation summary for a leader → follower relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub leader: InstrumentId,
    pub follower: InstrumentId,
    /// Hours the follower trails the leader (always >= 1)
    pub lag: usize,
    pub mean_abs_correlation: f64,
    pub std_abs_correlation: f64,
    pub max_abs_correlation: f64,
    pub mean_signed_correlation: f64,
    pub diagnostics: WindowDiagnostics,
}

/// Calculate Pearson correlation coefficient between two series
///
/// Returns a value in [-1.0, 1.0], or None if either series has zero
/// variance, lengths differ, or fewer than two points are given.
///
/// # Mathematical Definition
/// r = Σ[(xi - x̄)(yi - ȳ)] / √[Σ(xi - x̄)² × Σ(yi - ȳ)²]
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }

    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }

    let correlation = covariance / (var_a.sqrt() * var_b.sqrt());

    if correlation.is_finite() {
        Some(correlation.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Scan all rolling windows of `leader` against `follower` shifted by `lag`.
///
/// Window `i` pairs `leader[i..i+window]` with `follower[i+lag..i+window+lag]`,
/// dropping positions where either value is missing.
pub fn scan_lagged_windows(
    leader: &[Option<f64>],
    follower: &[Option<f64>],
    lag: usize,
    window: usize,
) -> LaggedScan {
    let mut diagnostics = WindowDiagnostics::default();
    let n = leader.len().min(follower.len());

    let fits = window.checked_add(lag).is_some_and(|need| n >= need);
    if window == 0 || !fits {
        return LaggedScan {
            stats: None,
            diagnostics,
        };
    }

    let mut xs = Vec::with_capacity(window);
    let mut ys = Vec::with_capacity(window);
    let mut correlations = Vec::new();

    for start in 0..=(n - window - lag) {
        diagnostics.evaluated += 1;
        xs.clear();
        ys.clear();

        let lead = &leader[start..start + window];
        let follow = &follower[start + lag..start + window + lag];
        for (x, y) in lead.iter().zip(follow.iter()) {
            if let (Some(x), Some(y)) = (x, y) {
                xs.push(*x);
                ys.push(*y);
            }
        }

        if xs.len() <= MIN_VALID_OBSERVATIONS {
            diagnostics.insufficient += 1;
            continue;
        }

        match pearson_correlation(&xs, &ys) {
            Some(r) => {
                diagnostics.counted += 1;
                correlations.push(r);
            }
            None => diagnostics.degenerate += 1,
        }
    }

    LaggedScan {
        stats: summarize(&correlations),
        diagnostics,
    }
}

/// Aggregate statistics for one triple, or `None` if no window qualified.
pub fn lagged_window_stats(
    leader: &[Option<f64>],
    follower: &[Option<f64>],
    lag: usize,
    window: usize,
) -> Option<CorrelationStats> {
    scan_lagged_windows(leader, follower, lag, window).stats
}

fn summarize(correlations: &[f64]) -> Option<CorrelationStats> {
    if correlations.is_empty() {
        return None;
    }

    let n = correlations.len() as f64;
    let abs: Vec<f64> = correlations.iter().map(|r| r.abs()).collect();
    let mean_abs = abs.iter().sum::<f64>() / n;
    let variance = abs.iter().map(|x| (x - mean_abs).powi(2)).sum::<f64>() / n;
    let max_abs = abs.iter().copied().fold(0.0, f64::max);
    let mean_signed = correlations.iter().sum::<f64>() / n;

    Some(CorrelationStats {
        mean_abs,
        std_abs: variance.sqrt(),
        max_abs,
        mean_signed,
    })
}

/// Compute lagged correlation records for every ordered pair and lag.
///
/// Triples are enumerated leader → follower → lag in sorted instrument
/// order; the output keeps that order whether or not the parallel stage is
/// used. Triples with no qualifying window are omitted.
///
/// # Errors
/// Invalid configuration or fewer than two instruments.
pub fn compute_correlations<'a>(
    store: &'a ReturnSeriesStore,
    config: &DiscoveryConfig,
) -> Result<Vec<CorrelationRecord>, DiscoveryError> {
    config.validate().map_err(DiscoveryError::InvalidConfig)?;

    let instruments = store.instruments();
    if instruments.len() < 2 {
        return Err(DiscoveryError::TooFewInstruments(instruments.len()));
    }

    let mut triples: Vec<(&'a str, &'a str, usize)> = Vec::new();
    for leader in &instruments {
        for follower in &instruments {
            if leader == follower {
                continue;
            }
            for lag in 1..=config.max_lag {
                triples.push((*leader, *follower, lag));
            }
        }
    }

    info!(
        instruments = instruments.len(),
        triples = triples.len(),
        window = config.window,
        max_lag = config.max_lag,
        parallel = config.parallel,
        "Computing lagged correlations"
    );

    let evaluate = |triple: &(&'a str, &'a str, usize)| -> (&'a str, &'a str, usize, LaggedScan) {
        let (leader, follower, lag) = *triple;
        let scan = match (store.series(leader), store.series(follower)) {
            (Some(a), Some(b)) => scan_lagged_windows(a.values(), b.values(), lag, config.window),
            _ => LaggedScan {
                stats: None,
                diagnostics: WindowDiagnostics::default(),
            },
        };
        (leader, follower, lag, scan)
    };

    let scans: Vec<_> = if config.parallel {
        triples.par_iter().map(evaluate).collect()
    } else {
        triples.iter().map(evaluate).collect()
    };

    let mut totals = WindowDiagnostics::default();
    let mut records = Vec::new();
    for (leader, follower, lag, scan) in scans {
        totals += scan.diagnostics;
        let Some(stats) = scan.stats else {
            debug!(leader, follower, lag, "No qualifying window");
            continue;
        };
        records.push(CorrelationRecord {
            leader: leader.to_string(),
            follower: follower.to_string(),
            lag,
            mean_abs_correlation: stats.mean_abs,
            std_abs_correlation: stats.std_abs,
            max_abs_correlation: stats.max_abs,
            mean_signed_correlation: stats.mean_signed,
            diagnostics: scan.diagnostics,
        });
    }

    info!(
        records = records.len(),
        windows = totals.evaluated,
        counted = totals.counted,
        insufficient = totals.insufficient,
        degenerate = totals.degenerate,
        "Correlation scan complete"
    );
    Ok(records)
}
