//! Configuration for lead/lag signal discovery

use serde::{Deserialize, Serialize};

/// A rolling window contributes only with more than this many valid pairs
pub const MIN_VALID_OBSERVATIONS: usize = 10;

/// How a selected signal's trade direction is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DirectionPolicy {
    /// Every signal trades the follower against the leader
    #[default]
    AlwaysOpposite,
    /// Opposite when the mean signed correlation is negative, same otherwise
    CorrelationSign,
}

impl std::str::FromStr for DirectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "always-opposite" | "opposite" => Ok(Self::AlwaysOpposite),
            "correlation-sign" | "sign" => Ok(Self::CorrelationSign),
            _ => Err(format!(
                "Unknown direction policy: '{}'. Use 'always-opposite' or 'correlation-sign'",
                s
            )),
        }
    }
}

/// Configuration for the discovery pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Rolling correlation window (hours)
    #[serde(default = "default_window")]
    pub window: usize,

    /// Largest lag tested; lags run 1..=max_lag (hours)
    #[serde(default = "default_max_lag")]
    pub max_lag: usize,

    /// Mean absolute correlation must exceed this to qualify
    #[serde(default = "default_min_correlation")]
    pub min_correlation: f64,

    /// Number of signals retained after ranking
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub direction_policy: DirectionPolicy,

    /// Evaluate (leader, follower, lag) triples on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_window() -> usize {
    48
}
fn default_max_lag() -> usize {
    6
}
fn default_min_correlation() -> f64 {
    0.3
}
fn default_top_k() -> usize {
    10
}
fn default_parallel() -> bool {
    true
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            max_lag: default_max_lag(),
            min_correlation: default_min_correlation(),
            top_k: default_top_k(),
            direction_policy: DirectionPolicy::default(),
            parallel: default_parallel(),
        }
    }
}

impl DiscoveryConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window <= MIN_VALID_OBSERVATIONS {
            return Err(format!(
                "window must exceed {} observations, got {}",
                MIN_VALID_OBSERVATIONS, self.window
            ));
        }
        if self.max_lag == 0 {
            return Err("max_lag must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_correlation) {
            return Err(format!(
                "min_correlation must be between 0.0 and 1.0, got {}",
                self.min_correlation
            ));
        }
        if self.top_k == 0 {
            return Err("top_k must be at least 1".to_string());
        }
        Ok(())
    }
}
