//! The contract between the generator and whatever stores/renders trades.

use crate::domain::{Trade, TradeId};

/// Receiver of trade creations and change signals.
///
/// The sink owns the live set. The generator never removes trades; clearing
/// and resetting are the driver's business.
pub trait TradeSink {
    /// Register a newly created trade, keyed by `trade.id`.
    fn add(&mut self, trade: Trade);

    /// Fields on the trade with this id were mutated in place.
    fn notify_changed(&mut self, id: TradeId);

    /// Current live set, for random selection. May be empty.
    fn live_trades(&self) -> &[Trade];

    fn live_trades_mut(&mut self) -> &mut [Trade];
}

/// Sink that just keeps trades in a `Vec` and records change signals.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    pub trades: Vec<Trade>,
    pub changed: Vec<TradeId>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TradeSink for VecSink {
    fn add(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    fn notify_changed(&mut self, id: TradeId) {
        self.changed.push(id);
    }

    fn live_trades(&self) -> &[Trade] {
        &self.trades
    }

    fn live_trades_mut(&mut self) -> &mut [Trade] {
        &mut self.trades
    }
}
