//! Lead/Lag Signal Discovery Module
//!
//! Measures rolling lagged correlations between every ordered pair of
//! instruments and ranks the most stable leader → follower relationships.
//!
//! # Example
//!
//! ```ignore
//! use leadlag::discovery::{discover_signals, DiscoveryConfig};
//!
//! let config = DiscoveryConfig::default();
//! let signals = discover_signals(&store, &config)?;
//! ```

pub mod config;
pub mod correlation;
pub mod error;
pub mod selector;

pub use config::{DirectionPolicy, DiscoveryConfig};
pub use correlation::{compute_correlations, CorrelationRecord};
pub use error::DiscoveryError;
pub use selector::{Signal, SignalSelector};

use crate::data::ReturnSeriesStore;

/// Run correlation scan and selection in one step.
///
/// # Errors
/// Propagates configuration errors from the correlation stage.
pub fn discover_signals(
    store: &ReturnSeriesStore,
    config: &DiscoveryConfig,
) -> Result<Vec<Signal>, DiscoveryError> {
    let records = compute_correlations(store, config)?;
    Ok(SignalSelector::from_config(config).select(&records))
}
