use clap::Parser;
use leadlag::cli::{Cli, Commands};
use leadlag::commands::{run_backtest, run_discover};
use tracing_subscriber::EnvFilter;

// --- Main Application Logic ---
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize Logger: RUST_LOG wins over --verbose
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.verbose)),
        )
        .init();

    match &cli.command {
        Commands::Discover { pipeline, output } => {
            let config = pipeline.resolve()?;
            run_discover(&config, output)?;
        }
        Commands::Backtest {
            pipeline,
            backtest,
            output_dir,
            log_trades,
        } => {
            let mut config = pipeline.resolve()?;
            backtest.apply(&mut config);
            run_backtest(&config, output_dir, *log_trades)?;
        }
    }

    Ok(())
}
