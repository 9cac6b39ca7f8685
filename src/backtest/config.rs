//! Configuration for the trigger backtest

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Leader moves with |return| strictly above this trigger a follower leg
    #[serde(default = "default_trigger_threshold")]
    pub trigger_threshold: f64,

    /// Leg size for a move exactly at the threshold
    #[serde(default = "default_base_size")]
    pub base_size: Decimal,

    /// Size increase per threshold-multiple of excess move (0.5 = +50%)
    #[serde(default = "default_size_scale")]
    pub size_scale: f64,

    /// Cap on leg size as a multiple of `base_size`
    #[serde(default = "default_max_size_multiplier")]
    pub max_size_multiplier: f64,

    /// Inclusive replay bounds
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

fn default_trigger_threshold() -> f64 {
    0.003
}
fn default_base_size() -> Decimal {
    dec!(1.0)
}
fn default_size_scale() -> f64 {
    0.5
}
fn default_max_size_multiplier() -> f64 {
    3.0
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            trigger_threshold: default_trigger_threshold(),
            base_size: default_base_size(),
            size_scale: default_size_scale(),
            max_size_multiplier: default_max_size_multiplier(),
            start: None,
            end: None,
        }
    }
}

impl BacktestConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.trigger_threshold > 0.0 && self.trigger_threshold.is_finite()) {
            return Err(format!(
                "trigger_threshold must be positive, got {}",
                self.trigger_threshold
            ));
        }
        if self.base_size <= Decimal::ZERO {
            return Err(format!("base_size must be positive, got {}", self.base_size));
        }
        if !(self.size_scale >= 0.0 && self.size_scale.is_finite()) {
            return Err(format!(
                "size_scale cannot be negative, got {}",
                self.size_scale
            ));
        }
        if !(self.max_size_multiplier >= 1.0 && self.max_size_multiplier.is_finite()) {
            return Err(format!(
                "max_size_multiplier must be at least 1.0, got {}",
                self.max_size_multiplier
            ));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(format!("start {} is after end {}", start, end));
            }
        }
        Ok(())
    }
}
