//! CLI command handlers.
//!
//! This module contains the implementation for each CLI subcommand,
//! delegating to the discovery and backtest pipelines.

mod backtest;
mod discover;

pub use backtest::run_backtest;
pub use discover::run_discover;

use crate::cli::DataConfig;
use crate::data::{generate_lead_lag_returns, load_directory, DataError, ReturnSeriesStore};
use tracing::info;

/// Build the return store from CSV files or the synthetic generator.
pub(crate) fn load_store(config: &DataConfig) -> Result<ReturnSeriesStore, DataError> {
    let store = if config.synthetic {
        generate_lead_lag_returns(
            &config.instruments,
            config.synthetic_hours,
            config.synthetic_lag,
            config.seed,
        )?
    } else {
        load_directory(
            &config.data_dir,
            &config.instruments,
            config.max_fill_gap_hours,
        )?
    };
    info!(
        instruments = store.instruments().len(),
        hours = store.len(),
        synthetic = config.synthetic,
        "Return data loaded"
    );
    Ok(store)
}
