//! Signal ranking and selection
//!
//! Keeps correlation records whose mean absolute correlation clears the
//! threshold, scores them by stability (mean / std) and retains the top K.

use super::config::{DirectionPolicy, DiscoveryConfig};
use super::correlation::CorrelationRecord;
use crate::types::{Direction, InstrumentId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A selected leader → follower relationship. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Zero-based position in the ranking; identifies the signal in the backtest
    pub rank: usize,
    pub leader: InstrumentId,
    pub follower: InstrumentId,
    /// Hours between the leader's move and unwinding the follower leg
    pub lag: usize,
    /// Mean absolute correlation of the underlying record
    pub correlation: f64,
    pub score: f64,
    pub direction: Direction,
}

/// Score = mean / std of the absolute correlations; 0 when std is not positive.
pub fn signal_score(record: &CorrelationRecord) -> f64 {
    if record.std_abs_correlation > 0.0 {
        record.mean_abs_correlation * (1.0 / record.std_abs_correlation)
    } else {
        0.0
    }
}

/// Ranks correlation records into a bounded set of signals
#[derive(Debug, Clone)]
pub struct SignalSelector {
    min_correlation: f64,
    top_k: usize,
    direction_policy: DirectionPolicy,
}

impl SignalSelector {
    pub fn new(min_correlation: f64, top_k: usize, direction_policy: DirectionPolicy) -> Self {
        Self {
            min_correlation,
            top_k,
            direction_policy,
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(config.min_correlation, config.top_k, config.direction_policy)
    }

    /// Select the top-K signals, best score first.
    ///
    /// Ties keep the order in which records were supplied. An empty result
    /// is logged but is not an error.
    pub fn select(&self, records: &[CorrelationRecord]) -> Vec<Signal> {
        let mut scored: Vec<(&CorrelationRecord, f64)> = records
            .iter()
            .filter(|r| r.mean_abs_correlation > self.min_correlation)
            .map(|r| (r, signal_score(r)))
            .collect();

        let qualifying = scored.len();

        // sort_by is stable
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(self.top_k);

        let signals: Vec<Signal> = scored
            .into_iter()
            .enumerate()
            .map(|(rank, (record, score))| Signal {
                rank,
                leader: record.leader.clone(),
                follower: record.follower.clone(),
                lag: record.lag,
                correlation: record.mean_abs_correlation,
                score,
                direction: self.direction_for(record),
            })
            .collect();

        if signals.is_empty() {
            warn!(
                records = records.len(),
                min_corr = self.min_correlation,
                "No qualifying signals"
            );
        } else {
            info!(
                records = records.len(),
                qualifying,
                selected = signals.len(),
                "Signals selected"
            );
            for s in &signals {
                info!(
                    rank = s.rank,
                    leader = %s.leader,
                    follower = %s.follower,
                    lag = s.lag,
                    correlation = format!("{:.3}", s.correlation),
                    score = format!("{:.2}", s.score),
                    direction = %s.direction,
                    "Signal"
                );
            }
        }

        signals
    }

    fn direction_for(&self, record: &CorrelationRecord) -> Direction {
        match self.direction_policy {
            DirectionPolicy::AlwaysOpposite => Direction::Opposite,
            DirectionPolicy::CorrelationSign => {
                if record.mean_signed_correlation < 0.0 {
                    Direction::Opposite
                } else {
                    Direction::Same
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::correlation::WindowDiagnostics;

    fn record(leader: &str, follower: &str, lag: usize, mean: f64, std: f64) -> CorrelationRecord {
        CorrelationRecord {
            leader: leader.to_string(),
            follower: follower.to_string(),
            lag,
            mean_abs_correlation: mean,
            std_abs_correlation: std,
            max_abs_correlation: mean,
            mean_signed_correlation: mean,
            diagnostics: WindowDiagnostics::default(),
        }
    }

    #[test]
    fn test_threshold_is_strict() {
        let records = vec![
            record("EURUSD", "GBPUSD", 1, 0.3, 0.1),
            record("EURUSD", "GBPUSD", 2, 0.31, 0.1),
        ];
        let signals = SignalSelector::new(0.3, 10, DirectionPolicy::AlwaysOpposite).select(&records);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].lag, 2);
    }

    #[test]
    fn test_sorted_by_score_and_truncated() {
        let records = vec![
            record("A", "B", 1, 0.4, 0.2),  // 2.0
            record("A", "B", 2, 0.5, 0.1),  // 5.0
            record("B", "A", 1, 0.6, 0.2),  // 3.0
            record("B", "A", 2, 0.35, 0.05), // 7.0
        ];
        let signals = SignalSelector::new(0.3, 3, DirectionPolicy::AlwaysOpposite).select(&records);
        let scores: Vec<f64> = signals.iter().map(|s| s.score).collect();
        assert_eq!(signals.len(), 3);
        assert!((scores[0] - 7.0).abs() < 1e-9);
        assert!((scores[1] - 5.0).abs() < 1e-9);
        assert!((scores[2] - 3.0).abs() < 1e-9);
        assert_eq!(signals.iter().map(|s| s.rank).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let records = vec![
            record("A", "B", 1, 0.4, 0.2),
            record("A", "C", 1, 0.6, 0.3),
            record("B", "C", 3, 0.8, 0.4),
        ];
        let signals = SignalSelector::new(0.3, 10, DirectionPolicy::AlwaysOpposite).select(&records);
        let order: Vec<_> = signals.iter().map(|s| s.follower.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "C"]);
        assert_eq!(signals[2].leader, "B");
    }

    #[test]
    fn test_zero_std_scores_zero() {
        let records = vec![
            record("A", "B", 1, 0.9, 0.0),
            record("A", "B", 2, 0.4, 0.4),
        ];
        let signals = SignalSelector::new(0.3, 10, DirectionPolicy::AlwaysOpposite).select(&records);
        assert_eq!(signals[0].lag, 2);
        assert_eq!(signals[1].score, 0.0);
    }

    #[test]
    fn test_direction_policies() {
        let mut positive = record("A", "B", 1, 0.5, 0.1);
        positive.mean_signed_correlation = 0.4;
        let mut negative = record("A", "B", 2, 0.5, 0.2);
        negative.mean_signed_correlation = -0.4;
        let records = vec![positive, negative];

        let fixed = SignalSelector::new(0.3, 10, DirectionPolicy::AlwaysOpposite).select(&records);
        assert!(fixed.iter().all(|s| s.direction == Direction::Opposite));

        let by_sign = SignalSelector::new(0.3, 10, DirectionPolicy::CorrelationSign).select(&records);
        assert_eq!(by_sign[0].direction, Direction::Same);
        assert_eq!(by_sign[1].direction, Direction::Opposite);
    }

    #[test]
    fn test_empty_input_yields_no_signals() {
        let signals = SignalSelector::new(0.3, 10, DirectionPolicy::AlwaysOpposite).select(&[]);
        assert!(signals.is_empty());
    }
}
