//! Tracing-based Trade Recorder
//!
//! Emits one structured event per trade on the `trades` target.

use super::record::TradeRecord;
use super::recorder::{RecordError, TradeRecorder};
use tracing::info;

#[derive(Debug, Default)]
pub struct TracingRecorder;

impl TracingRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl TradeRecorder for TracingRecorder {
    fn record(&mut self, trade: &TradeRecord) -> Result<(), RecordError> {
        info!(
            target: "trades",
            sequence = trade.sequence,
            timestamp = %trade.timestamp.to_rfc3339(),
            signal = trade.signal_rank,
            leader = %trade.leader,
            instrument = %trade.instrument,
            action = %trade.action,
            size = %trade.size,
            position = %trade.position_after,
            "Trade recorded"
        );
        Ok(())
    }
}
