//! Running positions and trade history

use super::record::{TradeAction, TradeEvent, TradeRecord};
use super::recorder::{RecordError, TradeRecorder};
use crate::types::InstrumentId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates derived from the trade history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub opens: usize,
    pub closes: usize,
    /// Number of legs opened per follower instrument
    pub opens_per_instrument: BTreeMap<InstrumentId, usize>,
    /// Mean absolute size of opened legs
    pub average_open_size: Decimal,
    /// Largest absolute size of an opened leg
    pub max_open_size: Decimal,
    /// Largest absolute running position reached per instrument
    pub peak_exposure: BTreeMap<InstrumentId, Decimal>,
}

/// Net exposure per instrument plus the ordered trade history.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: BTreeMap<InstrumentId, Decimal>,
    peak_exposure: BTreeMap<InstrumentId, Decimal>,
    trades: Vec<TradeRecord>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a signed adjustment and append it to the history.
    pub fn apply(&mut self, event: TradeEvent) -> &TradeRecord {
        let position = self.positions.entry(event.instrument.clone()).or_default();
        *position += event.size;
        let position_after = *position;

        let peak = self
            .peak_exposure
            .entry(event.instrument.clone())
            .or_default();
        if position_after.abs() > *peak {
            *peak = position_after.abs();
        }

        let sequence = self.trades.len() as u64;
        self.trades
            .push(TradeRecord::from_event(sequence, event, position_after));
        &self.trades[self.trades.len() - 1]
    }

    /// Current position; zero for instruments never traded
    pub fn position(&self, instrument: &str) -> Decimal {
        self.positions.get(instrument).copied().unwrap_or_default()
    }

    pub fn positions(&self) -> &BTreeMap<InstrumentId, Decimal> {
        &self.positions
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary {
            peak_exposure: self.peak_exposure.clone(),
            ..Default::default()
        };
        let mut total_open_size = Decimal::ZERO;

        for trade in &self.trades {
            match trade.action {
                TradeAction::Open => {
                    summary.opens += 1;
                    *summary
                        .opens_per_instrument
                        .entry(trade.instrument.clone())
                        .or_default() += 1;
                    let size = trade.size.abs();
                    total_open_size += size;
                    if size > summary.max_open_size {
                        summary.max_open_size = size;
                    }
                }
                TradeAction::Close => summary.closes += 1,
            }
        }

        if summary.opens > 0 {
            summary.average_open_size = total_open_size / Decimal::from(summary.opens);
        }
        summary
    }

    /// Send the whole history to a recorder, then flush it.
    ///
    /// # Errors
    /// The first recorder failure.
    pub fn replay_into(&self, recorder: &mut dyn TradeRecorder) -> Result<(), RecordError> {
        for trade in &self.trades {
            recorder.record(trade)?;
        }
        recorder.flush()
    }
}
