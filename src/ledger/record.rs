//! Trade history entries

use crate::types::InstrumentId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether an entry opened a leg or unwound one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Open,
    Close,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Open => write!(f, "OPEN"),
            TradeAction::Close => write!(f, "CLOSE"),
        }
    }
}

/// A position adjustment before it is applied to the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub timestamp: DateTime<Utc>,
    pub signal_rank: usize,
    pub leader: InstrumentId,
    pub instrument: InstrumentId,
    pub action: TradeAction,
    /// Signed size added to the instrument's position
    pub size: Decimal,
    /// Leader return that triggered an open
    pub leader_return: Option<f64>,
}

/// Immutable record of one applied open or close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Position in the trade history, starting at 0
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub signal_rank: usize,
    pub leader: InstrumentId,
    pub instrument: InstrumentId,
    pub action: TradeAction,
    pub size: Decimal,
    /// Instrument position after this adjustment
    pub position_after: Decimal,
    pub leader_return: Option<f64>,
}

impl TradeRecord {
    pub(crate) fn from_event(sequence: u64, event: TradeEvent, position_after: Decimal) -> Self {
        Self {
            sequence,
            timestamp: event.timestamp,
            signal_rank: event.signal_rank,
            leader: event.leader,
            instrument: event.instrument,
            action: event.action,
            size: event.size,
            position_after,
            leader_return: event.leader_return,
        }
    }

    /// Format as CSV line (allocates a new String).
    pub fn to_csv_line(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.write_csv_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Write CSV line directly to a writer.
    pub fn write_csv_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(
            writer,
            "{},{},{},{},{},{},{},{},{}",
            self.sequence,
            self.timestamp.to_rfc3339(),
            self.signal_rank,
            self.leader,
            self.instrument,
            self.action,
            self.size,
            self.position_after,
            self.leader_return.map(|r| r.to_string()).unwrap_or_default(),
        )
    }

    /// CSV header
    pub fn csv_header() -> &'static str {
        "sequence,timestamp,signal_rank,leader,instrument,action,size,position_after,leader_return"
    }
}
