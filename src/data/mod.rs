//! Return series ingestion and storage
//!
//! - `ReturnSeriesStore` - aligned per-instrument returns on one time axis
//! - `loader` - CSV ingestion, hourly resampling and forward-fill
//! - `synthetic` - deterministic generated data for CI

pub mod error;
pub mod loader;
pub mod store;
pub mod synthetic;

pub use error::DataError;
pub use loader::load_directory;
pub use store::{ReturnSeries, ReturnSeriesStore};
pub use synthetic::generate_lead_lag_returns;
