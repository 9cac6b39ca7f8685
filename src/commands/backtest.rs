//! Backtest command handler.
//!
//! Implements the `backtest` subcommand: discovery followed by the trigger
//! replay, with results written for charting and review.

use super::discover::write_signals;
use super::load_store;
use crate::backtest::{self, BacktestReport, OpenLeg, PnlPoint};
use crate::cli::PipelineConfig;
use crate::discovery::{discover_signals, Signal};
use crate::ledger::{CsvRecorder, LedgerSummary, MultiRecorder, TracingRecorder};

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Backtest results in JSON-serializable format.
#[derive(Debug, Serialize)]
struct BacktestOutput<'a> {
    no_qualifying_signals: bool,
    signals: &'a [Signal],
    ticks: usize,
    total_pnl: f64,
    instrument_pnl: &'a BTreeMap<String, f64>,
    final_positions: &'a BTreeMap<String, Decimal>,
    open_legs: &'a [OpenLeg],
    summary: LedgerSummary,
    missing_leader_ticks: usize,
    missing_mark_ticks: usize,
}

/// Run discovery and the trigger backtest, writing results to `output_dir`.
///
/// Files written: `signals.json`, `trades.csv`, `pnl.csv`, `results.json`.
///
/// # Errors
/// Returns error if configuration, data loading or writing fails. Data
/// errors abort before any backtest state is created.
pub fn run_backtest(
    config: &PipelineConfig,
    output_dir: &Path,
    log_trades: bool,
) -> Result<BacktestReport, Box<dyn std::error::Error>> {
    info!("--- Running Backtest ---");
    config.validate()?;

    let store = load_store(&config.data)?;
    let signals = discover_signals(&store, &config.discovery)?;
    if signals.is_empty() {
        warn!("No qualifying signals; backtest will produce an empty trade history");
    }

    let report = backtest::run(&store, &signals, &config.backtest)?;
    let summary = report.ledger.summary();

    info!("--- Backtest Results ---");
    info!("Signals:         {}", report.signals.len());
    info!("Ticks:           {}", report.diagnostics.ticks);
    info!("Opens:           {}", summary.opens);
    info!("Closes:          {}", summary.closes);
    info!("Open at end:     {}", report.open_legs.len());
    info!("Avg Leg Size:    {}", summary.average_open_size);
    info!("Max Leg Size:    {}", summary.max_open_size);
    info!("Total PnL:       {:.6}", report.total_pnl());
    info!("------------------------");

    fs::create_dir_all(output_dir)?;

    write_signals(&report.signals, &output_dir.join("signals.json"))?;

    let mut recorder = MultiRecorder::default();
    recorder.add(Box::new(CsvRecorder::create(&output_dir.join("trades.csv"))?));
    if log_trades {
        recorder.add(Box::new(TracingRecorder::new()));
    }
    report.ledger.replay_into(&mut recorder)?;

    write_pnl(&report.pnl, &output_dir.join("pnl.csv"))?;

    let output = BacktestOutput {
        no_qualifying_signals: report.no_qualifying_signals(),
        signals: &report.signals,
        ticks: report.diagnostics.ticks,
        total_pnl: report.total_pnl(),
        instrument_pnl: &report.instrument_pnl,
        final_positions: report.final_positions(),
        open_legs: &report.open_legs,
        summary,
        missing_leader_ticks: report.diagnostics.missing_leader_ticks,
        missing_mark_ticks: report.diagnostics.missing_mark_ticks,
    };
    let results_path = output_dir.join("results.json");
    let mut file = File::create(&results_path)?;
    file.write_all(serde_json::to_string_pretty(&output)?.as_bytes())?;
    info!(path = %output_dir.display(), "Results written");

    Ok(report)
}

/// Write the PnL series as `timestamp,pnl,cumulative`.
fn write_pnl(points: &[PnlPoint], path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    // Header written explicitly so an empty replay still yields one
    writer.write_record(["timestamp", "pnl", "cumulative"])?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}
