//! CLI argument parsing using clap.
//!
//! This module defines the command-line interface for leadlag, including
//! all subcommands and their arguments.

mod config;

pub use config::{ConfigError, DataConfig, PipelineConfig, DEFAULT_INSTRUMENTS};

use crate::data::loader::parse_timestamp;
use crate::discovery::DirectionPolicy;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// leadlag - lagged cross-asset correlation discovery and trigger backtesting
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Set the verbosity level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub verbose: String,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Rank leader → follower signals and write them as JSON
    Discover {
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Output file for the ranked signals
        #[arg(long, default_value = "signals.json")]
        output: PathBuf,
    },

    /// Discover signals, then replay them through the trigger backtest
    Backtest {
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[command(flatten)]
        backtest: BacktestArgs,
        /// Output directory for signals, trades, PnL and summary
        #[arg(long, default_value = "backtest_results")]
        output_dir: PathBuf,
        /// Also emit every trade as a structured log event
        #[arg(long, default_value_t = false)]
        log_trades: bool,
    },
}

/// Data and discovery options shared by every command.
///
/// Unset flags fall back to the config file, then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory of <INSTRUMENT>.csv price files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Instruments to analyse (comma-separated, e.g., "EURUSD,GBPUSD")
    #[arg(long, value_delimiter = ',')]
    pub instruments: Option<Vec<String>>,
    /// Longest price gap bridged by forward-fill (hours)
    #[arg(long)]
    pub max_fill_gap: Option<u32>,
    /// Use synthetic data (no CSV files required)
    #[arg(long, default_value_t = false)]
    pub synthetic: bool,
    /// Rolling correlation window (hours)
    #[arg(long)]
    pub window: Option<usize>,
    /// Largest lag tested (hours)
    #[arg(long)]
    pub max_lag: Option<usize>,
    /// Minimum mean absolute correlation
    #[arg(long)]
    pub min_correlation: Option<f64>,
    /// Number of signals kept
    #[arg(long)]
    pub top_k: Option<usize>,
    /// 'always-opposite' or 'correlation-sign'
    #[arg(long)]
    pub direction: Option<DirectionPolicy>,
    /// Run the correlation scan on a single thread
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
}

/// Trigger backtest options
#[derive(Args, Debug, Clone, Default)]
pub struct BacktestArgs {
    /// Leader move that triggers a trade (fraction, e.g., 0.003)
    #[arg(long)]
    pub trigger_threshold: Option<f64>,
    /// Leg size for a move at the threshold
    #[arg(long)]
    pub base_size: Option<Decimal>,
    /// Size increase per threshold-multiple of excess move
    #[arg(long)]
    pub size_scale: Option<f64>,
    /// Cap on leg size as a multiple of the base size
    #[arg(long)]
    pub max_size_multiplier: Option<f64>,
    /// First timestamp replayed (inclusive)
    #[arg(long, value_parser = parse_cli_timestamp)]
    pub start: Option<DateTime<Utc>>,
    /// Last timestamp replayed (inclusive)
    #[arg(long, value_parser = parse_cli_timestamp)]
    pub end: Option<DateTime<Utc>>,
}

fn parse_cli_timestamp(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    parse_timestamp(raw).ok_or_else(|| ConfigError::InvalidTimestamp(raw.to_string()))
}

impl PipelineArgs {
    /// Load the config file (if any) and apply flag overrides.
    pub fn resolve(&self) -> Result<PipelineConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)?,
            None => PipelineConfig::default(),
        };

        let data = &mut config.data;
        if let Some(dir) = &self.data_dir {
            data.data_dir = dir.clone();
        }
        if let Some(instruments) = &self.instruments {
            data.instruments = instruments
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(gap) = self.max_fill_gap {
            data.max_fill_gap_hours = gap;
        }
        if self.synthetic {
            data.synthetic = true;
        }

        let discovery = &mut config.discovery;
        if let Some(window) = self.window {
            discovery.window = window;
        }
        if let Some(max_lag) = self.max_lag {
            discovery.max_lag = max_lag;
        }
        if let Some(min_corr) = self.min_correlation {
            discovery.min_correlation = min_corr;
        }
        if let Some(top_k) = self.top_k {
            discovery.top_k = top_k;
        }
        if let Some(direction) = self.direction {
            discovery.direction_policy = direction;
        }
        if self.sequential {
            discovery.parallel = false;
        }

        Ok(config)
    }
}

impl BacktestArgs {
    /// Apply flag overrides onto an already resolved configuration.
    pub fn apply(&self, config: &mut PipelineConfig) {
        let backtest = &mut config.backtest;
        if let Some(threshold) = self.trigger_threshold {
            backtest.trigger_threshold = threshold;
        }
        if let Some(base) = self.base_size {
            backtest.base_size = base;
        }
        if let Some(scale) = self.size_scale {
            backtest.size_scale = scale;
        }
        if let Some(cap) = self.max_size_multiplier {
            backtest.max_size_multiplier = cap;
        }
        if self.start.is_some() {
            backtest.start = self.start;
        }
        if self.end.is_some() {
            backtest.end = self.end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_parses_backtest() {
        let cli = Cli::try_parse_from([
            "leadlag",
            "backtest",
            "--synthetic",
            "--instruments",
            "EURUSD,GBPUSD,USDJPY",
            "--window",
            "24",
            "--base-size",
            "2.5",
            "--start",
            "2024-01-02T00:00:00Z",
        ])
        .unwrap();

        let Commands::Backtest {
            pipeline, backtest, ..
        } = cli.command
        else {
            panic!("expected backtest command");
        };
        let mut config = pipeline.resolve().unwrap();
        backtest.apply(&mut config);

        assert!(config.data.synthetic);
        assert_eq!(config.data.instruments, vec!["EURUSD", "GBPUSD", "USDJPY"]);
        assert_eq!(config.discovery.window, 24);
        assert_eq!(config.backtest.base_size, dec!(2.5));
        assert!(config.backtest.start.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_rejects_bad_timestamp() {
        let result = Cli::try_parse_from(["leadlag", "backtest", "--end", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = PipelineArgs::default().resolve().unwrap();
        assert_eq!(config.discovery.min_correlation, 0.3);
        assert!(config.discovery.parallel);
        assert!(!config.data.synthetic);
    }
}
