//! Error types for the discovery module

use thiserror::Error;

/// Errors that can occur during signal discovery
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Not enough instruments to form a leader/follower pair
    #[error("Need at least 2 instruments, got {0}")]
    TooFewInstruments(usize),
}
