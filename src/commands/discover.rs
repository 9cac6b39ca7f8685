//! Signal discovery command handler.
//!
//! Implements the `discover` subcommand: load returns, scan lagged
//! correlations and write the ranked signals as JSON.

use super::load_store;
use crate::cli::PipelineConfig;
use crate::discovery::{discover_signals, Signal};

use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Run discovery and write the ranked signals to `output`.
///
/// # Errors
/// Returns error if configuration, data loading or writing fails.
pub fn run_discover(
    config: &PipelineConfig,
    output: &Path,
) -> Result<Vec<Signal>, Box<dyn std::error::Error>> {
    info!("--- Running Signal Discovery ---");
    config.validate()?;

    let store = load_store(&config.data)?;
    let signals = discover_signals(&store, &config.discovery)?;

    if signals.is_empty() {
        warn!(
            min_corr = config.discovery.min_correlation,
            "No qualifying signals; writing empty list"
        );
    }

    write_signals(&signals, output)?;
    info!(path = %output.display(), count = signals.len(), "Signals written");
    Ok(signals)
}

/// Write signals as pretty JSON.
pub(crate) fn write_signals(signals: &[Signal], path: &Path) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(signals)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())
}
