//! Trade Recording System
//!
//! Provides a pluggable `TradeRecorder` trait for exporting trade history:
//! - CSV (reporting)
//! - tracing events (observability)

use super::record::TradeRecord;
use thiserror::Error;

/// Error type for trade recording operations
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for recording trades to various backends
pub trait TradeRecorder {
    fn record(&mut self, trade: &TradeRecord) -> Result<(), RecordError>;

    /// Flush any buffered records (optional, default no-op)
    fn flush(&mut self) -> Result<(), RecordError> {
        Ok(())
    }
}

/// A recorder that fans out to multiple backends
#[derive(Default)]
pub struct MultiRecorder {
    recorders: Vec<Box<dyn TradeRecorder>>,
}

impl MultiRecorder {
    /// Create a new multi-recorder with the given backends
    pub fn new(recorders: Vec<Box<dyn TradeRecorder>>) -> Self {
        Self { recorders }
    }

    /// Add a recorder
    pub fn add(&mut self, recorder: Box<dyn TradeRecorder>) {
        self.recorders.push(recorder);
    }
}

impl TradeRecorder for MultiRecorder {
    fn record(&mut self, trade: &TradeRecord) -> Result<(), RecordError> {
        let mut error_count = 0;
        let mut last_error = None;

        for recorder in &mut self.recorders {
            if let Err(e) = recorder.record(trade) {
                // Best-effort: one failing backend does not stop the others
                tracing::error!(error = %e, "Failed to record trade to backend");
                last_error = Some(e);
                error_count += 1;
            }
        }

        if error_count > 0 && error_count == self.recorders.len() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), RecordError> {
        for recorder in &mut self.recorders {
            recorder.flush()?;
        }
        Ok(())
    }
}
