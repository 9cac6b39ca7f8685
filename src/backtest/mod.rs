//! Backtesting engine for lead/lag signals.
//!
//! Replays aligned returns, opening follower legs when a leader moves beyond
//! the trigger threshold and unwinding them after the signal's lag.

pub mod config;
pub mod engine;
pub mod error;
pub mod sizing;

pub use config::BacktestConfig;
pub use engine::{
    BacktestContext, BacktestDiagnostics, BacktestReport, OpenLeg, PnlPoint, TriggerBacktestEngine,
};
pub use error::BacktestError;
pub use sizing::{LinearScaleSizer, PositionSizer};

use crate::data::ReturnSeriesStore;
use crate::discovery::Signal;

/// Run the default-sized engine over `store` for `signals`.
///
/// # Errors
/// `InvalidConfig` if `config` does not validate.
pub fn run(
    store: &ReturnSeriesStore,
    signals: &[Signal],
    config: &BacktestConfig,
) -> Result<BacktestReport, BacktestError> {
    let engine = TriggerBacktestEngine::new(config.clone())?;
    Ok(engine.run(store, signals))
}
