//! Position Ledger and Trade Recording
//!
//! - `PositionLedger` - running net position per instrument and trade history
//! - `TradeRecorder` trait - pluggable export of the history
//! - `CsvRecorder` - CSV file export
//! - `TracingRecorder` - structured log events

pub mod csv_recorder;
pub mod position_ledger;
pub mod record;
pub mod recorder;
pub mod tracing_recorder;

pub use csv_recorder::CsvRecorder;
pub use position_ledger::{LedgerSummary, PositionLedger};
pub use record::{TradeAction, TradeEvent, TradeRecord};
pub use recorder::{MultiRecorder, RecordError, TradeRecorder};
pub use tracing_recorder::TracingRecorder;
