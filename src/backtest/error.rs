//! Error types for the backtest module

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
