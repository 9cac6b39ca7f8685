//! Position sizing policies

use super::config::BacktestConfig;
use rust_decimal::Decimal;

/// Decimal places kept when converting the size multiplier
const MULTIPLIER_DP: u32 = 8;

/// Maps a trigger magnitude (|leader return|) to an unsigned leg size.
pub trait PositionSizer {
    fn size(&self, magnitude: f64) -> Decimal;
}

/// size = base × min(1 + ((m − θ) / θ) × scale, max_multiplier)
#[derive(Debug, Clone)]
pub struct LinearScaleSizer {
    base_size: Decimal,
    threshold: f64,
    scale: f64,
    max_multiplier: f64,
}

impl LinearScaleSizer {
    pub fn new(base_size: Decimal, threshold: f64, scale: f64, max_multiplier: f64) -> Self {
        Self {
            base_size,
            threshold,
            scale,
            max_multiplier,
        }
    }

    pub fn from_config(config: &BacktestConfig) -> Self {
        Self::new(
            config.base_size,
            config.trigger_threshold,
            config.size_scale,
            config.max_size_multiplier,
        )
    }

    /// Multiplier applied to the base size, clamped to [0, max_multiplier]
    pub fn multiplier(&self, magnitude: f64) -> f64 {
        let excess = (magnitude - self.threshold) / self.threshold;
        (1.0 + excess * self.scale).clamp(0.0, self.max_multiplier)
    }
}

impl PositionSizer for LinearScaleSizer {
    fn size(&self, magnitude: f64) -> Decimal {
        let multiplier = Decimal::from_f64_retain(self.multiplier(magnitude))
            .map(|m| m.round_dp(MULTIPLIER_DP))
            .unwrap_or(Decimal::ZERO);
        self.base_size * multiplier
    }
}
