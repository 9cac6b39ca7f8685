//! Trigger-driven lead/lag backtest
//!
//! Replays the time axis once. At each timestamp every signal whose leader
//! moved beyond the trigger threshold opens a follower leg; afterwards every
//! leg whose maturity has been reached is unwound with an equal and opposite
//! adjustment. Positions are marked to market on each tick.

use super::config::BacktestConfig;
use super::error::BacktestError;
use super::sizing::{LinearScaleSizer, PositionSizer};
use crate::data::ReturnSeriesStore;
use crate::discovery::Signal;
use crate::ledger::{PositionLedger, TradeAction, TradeEvent};
use crate::types::InstrumentId;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info};

/// A pending follower adjustment awaiting maturity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenLeg {
    pub signal_rank: usize,
    pub instrument: InstrumentId,
    /// Signed size that was added on open
    pub size: Decimal,
    pub opened_at: DateTime<Utc>,
    pub matures_at: DateTime<Utc>,
}

/// Pending legs of one signal, oldest first.
///
/// Lag is fixed per signal, so maturities are non-decreasing along the queue.
#[derive(Debug, Clone)]
struct SignalBook {
    signal_rank: usize,
    leader: InstrumentId,
    legs: VecDeque<OpenLeg>,
}

/// Mutable replay state, owned by a single run
#[derive(Debug)]
pub struct BacktestContext {
    books: Vec<SignalBook>,
    ledger: PositionLedger,
}

impl BacktestContext {
    pub fn new(signals: &[Signal]) -> Self {
        Self {
            books: signals
                .iter()
                .map(|s| SignalBook {
                    signal_rank: s.rank,
                    leader: s.leader.clone(),
                    legs: VecDeque::new(),
                })
                .collect(),
            ledger: PositionLedger::new(),
        }
    }

    /// Queue a leg for the signal at `book` and apply it to the ledger.
    fn open_leg(&mut self, book: usize, leg: OpenLeg, leader_return: f64) {
        let Some(book) = self.books.get_mut(book) else {
            return;
        };
        self.ledger.apply(TradeEvent {
            timestamp: leg.opened_at,
            signal_rank: book.signal_rank,
            leader: book.leader.clone(),
            instrument: leg.instrument.clone(),
            action: TradeAction::Open,
            size: leg.size,
            leader_return: Some(leader_return),
        });
        book.legs.push_back(leg);
    }

    /// Unwind every leg with `matures_at <= now`. Returns the number closed.
    pub fn settle_matured(&mut self, now: DateTime<Utc>) -> usize {
        let mut closed = 0;
        for book in &mut self.books {
            while book.legs.front().is_some_and(|leg| leg.matures_at <= now) {
                let Some(leg) = book.legs.pop_front() else {
                    break;
                };
                self.ledger.apply(TradeEvent {
                    timestamp: now,
                    signal_rank: book.signal_rank,
                    leader: book.leader.clone(),
                    instrument: leg.instrument,
                    action: TradeAction::Close,
                    size: -leg.size,
                    leader_return: None,
                });
                closed += 1;
            }
        }
        closed
    }

    pub fn pending_legs(&self) -> usize {
        self.books.iter().map(|b| b.legs.len()).sum()
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    fn into_parts(self) -> (PositionLedger, Vec<OpenLeg>) {
        let open = self.books.into_iter().flat_map(|b| b.legs).collect();
        (self.ledger, open)
    }
}

/// One point of the PnL series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PnlPoint {
    pub timestamp: DateTime<Utc>,
    pub pnl: f64,
    pub cumulative: f64,
}

/// Counts of skipped or degraded ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BacktestDiagnostics {
    pub ticks: usize,
    /// Signal evaluations where the leader had no return (treated as flat)
    pub missing_leader_ticks: usize,
    /// Held positions whose instrument had no return at the tick
    pub missing_mark_ticks: usize,
}

/// Everything a run produces for reporting
#[derive(Debug)]
pub struct BacktestReport {
    pub signals: Vec<Signal>,
    pub ledger: PositionLedger,
    pub pnl: Vec<PnlPoint>,
    pub instrument_pnl: BTreeMap<InstrumentId, f64>,
    /// Legs still pending when the replay range ended
    pub open_legs: Vec<OpenLeg>,
    pub diagnostics: BacktestDiagnostics,
}

impl BacktestReport {
    /// True when the run had nothing to trade
    pub fn no_qualifying_signals(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn total_pnl(&self) -> f64 {
        self.pnl.last().map(|p| p.cumulative).unwrap_or(0.0)
    }

    pub fn final_positions(&self) -> &BTreeMap<InstrumentId, Decimal> {
        self.ledger.positions()
    }
}

/// Replays signals over a return store
pub struct TriggerBacktestEngine<S: PositionSizer = LinearScaleSizer> {
    config: BacktestConfig,
    sizer: S,
}

impl TriggerBacktestEngine<LinearScaleSizer> {
    /// Engine with the default linear sizing policy.
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration does not validate.
    pub fn new(config: BacktestConfig) -> Result<Self, BacktestError> {
        let sizer = LinearScaleSizer::from_config(&config);
        Self::with_sizer(config, sizer)
    }
}

impl<S: PositionSizer> TriggerBacktestEngine<S> {
    pub fn with_sizer(config: BacktestConfig, sizer: S) -> Result<Self, BacktestError> {
        config.validate().map_err(BacktestError::InvalidConfig)?;
        Ok(Self { config, sizer })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run the replay once over the configured range.
    pub fn run(&self, store: &ReturnSeriesStore, signals: &[Signal]) -> BacktestReport {
        let range = store.index_range(self.config.start, self.config.end);
        let timestamps = store.timestamps();

        info!(
            signals = signals.len(),
            ticks = range.len(),
            threshold = self.config.trigger_threshold,
            base_size = %self.config.base_size,
            "Starting backtest replay"
        );

        let mut ctx = BacktestContext::new(signals);
        let mut diagnostics = BacktestDiagnostics::default();
        let mut pnl = Vec::with_capacity(range.len());
        let mut instrument_pnl: BTreeMap<InstrumentId, f64> = BTreeMap::new();
        let mut cumulative = 0.0;

        for idx in range {
            let now = timestamps[idx];
            diagnostics.ticks += 1;

            // Mark positions carried into this tick
            let mut tick_pnl = 0.0;
            for (instrument, position) in ctx.ledger.positions() {
                if position.is_zero() {
                    continue;
                }
                let Some(ret) = store.return_at(instrument, idx) else {
                    diagnostics.missing_mark_ticks += 1;
                    continue;
                };
                let contribution = position.to_f64().unwrap_or(0.0) * ret;
                *instrument_pnl.entry(instrument.clone()).or_default() += contribution;
                tick_pnl += contribution;
            }
            cumulative += tick_pnl;
            pnl.push(PnlPoint {
                timestamp: now,
                pnl: tick_pnl,
                cumulative,
            });

            for (book, signal) in signals.iter().enumerate() {
                self.evaluate_trigger(&mut ctx, store, book, signal, idx, now, &mut diagnostics);
            }

            // Closing after triggers keeps a leg from closing on its opening tick
            let closed = ctx.settle_matured(now);
            if closed > 0 {
                debug!(timestamp = %now, closed, "Legs matured");
            }
        }

        let pending = ctx.pending_legs();
        let (ledger, open_legs) = ctx.into_parts();
        let summary = ledger.summary();

        info!(
            ticks = diagnostics.ticks,
            opens = summary.opens,
            closes = summary.closes,
            pending,
            total_pnl = format!("{:.6}", cumulative),
            missing_leader = diagnostics.missing_leader_ticks,
            "Backtest complete"
        );

        BacktestReport {
            signals: signals.to_vec(),
            ledger,
            pnl,
            instrument_pnl,
            open_legs,
            diagnostics,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn evaluate_trigger(
        &self,
        ctx: &mut BacktestContext,
        store: &ReturnSeriesStore,
        book: usize,
        signal: &Signal,
        idx: usize,
        now: DateTime<Utc>,
        diagnostics: &mut BacktestDiagnostics,
    ) {
        let Some(leader_return) = store.return_at(&signal.leader, idx) else {
            diagnostics.missing_leader_ticks += 1;
            return;
        };

        let magnitude = leader_return.abs();
        if magnitude <= self.config.trigger_threshold {
            return;
        }

        let sign = signal.direction.position_sign(leader_return);
        let size = self.sizer.size(magnitude) * Decimal::from(sign);
        if size.is_zero() {
            return;
        }

        let leg = OpenLeg {
            signal_rank: signal.rank,
            instrument: signal.follower.clone(),
            size,
            opened_at: now,
            matures_at: now + Duration::hours(signal.lag as i64),
        };

        debug!(
            signal = signal.rank,
            leader = %signal.leader,
            follower = %signal.follower,
            leader_return,
            size = %size,
            matures_at = %leg.matures_at,
            "Trigger fired"
        );
        ctx.open_leg(book, leg, leader_return);
    }
}
