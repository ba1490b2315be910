//! Trade mutator — random fill progress and status changes on live trades.
//!
//! Fill progress wraps modulo the quantity, so `filled < quantity` always
//! holds; the price is that `filled` occasionally goes down. Status is drawn
//! independently of the previous status and of `filled`.

use crate::domain::{Trade, TradeId, TradeStatus};
use crate::rng::RandomSource;
use crate::sink::TradeSink;
use log::trace;
use rand::rngs::StdRng;

/// Default fill amplitude `K`: each mutation adds up to `K` to `filled`.
pub const DEFAULT_FILL_AMPLITUDE: f64 = 50.0;

#[derive(Debug)]
pub struct TradeMutator<R = StdRng> {
    rng: R,
    fill_amplitude: f64,
}

impl<R: RandomSource> TradeMutator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            fill_amplitude: DEFAULT_FILL_AMPLITUDE,
        }
    }

    /// Set the fill amplitude. Panics unless `k` is finite and positive.
    pub fn with_fill_amplitude(mut self, k: f64) -> Self {
        assert!(k.is_finite() && k > 0.0, "fill amplitude must be finite and > 0, got {k}");
        self.fill_amplitude = k;
        self
    }

    pub fn fill_amplitude(&self) -> f64 {
        self.fill_amplitude
    }

    /// Mutate one trade in place, then call `on_changed` with its id.
    ///
    /// `filled ← floor((filled + u·K) mod quantity)`, then a fresh status.
    pub fn mutate<F: FnOnce(TradeId)>(&mut self, trade: &mut Trade, on_changed: F) {
        debug_assert!(trade.quantity > 0, "trade {} has zero quantity", trade.id);
        let raw = trade.filled as f64 + self.rng.next_unit() * self.fill_amplitude;
        trade.filled = (raw % trade.quantity as f64).floor() as u32;

        let idx = self.rng.next_index(TradeStatus::ALL.len());
        trade.status = TradeStatus::ALL[idx];

        trace!("trade {} → filled {}/{} {}", trade.id, trade.filled, trade.quantity, trade.status);
        on_changed(trade.id);
    }

    /// Mutate a uniformly chosen trade from `pool`.
    ///
    /// An empty pool is a no-op: nothing is drawn, nothing is signalled and
    /// `None` is returned.
    pub fn mutate_random<F: FnOnce(TradeId)>(&mut self, pool: &mut [Trade], on_changed: F) -> Option<TradeId> {
        if pool.is_empty() {
            return None;
        }
        let idx = self.rng.next_index(pool.len());
        let trade = &mut pool[idx];
        let id = trade.id;
        self.mutate(trade, on_changed);
        Some(id)
    }

    /// Mutate a random live trade of `sink` and signal the sink.
    pub fn mutate_in<S: TradeSink + ?Sized>(&mut self, sink: &mut S) -> Option<TradeId> {
        let mut changed = None;
        self.mutate_random(sink.live_trades_mut(), |id| changed = Some(id))?;
        if let Some(id) = changed {
            sink.notify_changed(id);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Instrument, Side};
    use crate::rng::ScriptedSource;
    use crate::sink::VecSink;
    use std::sync::Arc;

    fn trade(id: u64, quantity: u32, filled: u32) -> Trade {
        Trade {
            id: TradeId(id),
            instrument: Arc::new(Instrument::new("RIO AU", "AU")),
            side: Side::Buy,
            quantity,
            filled,
            status: TradeStatus::New,
        }
    }

    #[test]
    fn fill_wraps_around_quantity() {
        // 480 + 0.5 * 100 = 530 → 530 mod 500 = 30
        let mut m = TradeMutator::new(ScriptedSource::new(vec![0.5, 0.0])).with_fill_amplitude(100.0);
        let mut t = trade(1, 500, 480);
        m.mutate(&mut t, |_| {});
        assert_eq!(t.filled, 30);
        assert_eq!(t.status, TradeStatus::Unsent);
    }

    #[test]
    fn fill_floors_fractional_progress() {
        // 10 + 0.33 * 50 = 26.5 → 26
        let mut m = TradeMutator::new(ScriptedSource::new(vec![0.33, 0.99]));
        let mut t = trade(1, 200, 10);
        m.mutate(&mut t, |_| {});
        assert_eq!(t.filled, 26);
        assert_eq!(t.status, TradeStatus::Filled);
    }

    #[test]
    fn mutate_signals_once_with_id() {
        let mut m = TradeMutator::new(ScriptedSource::new(vec![0.1]));
        let mut t = trade(7, 100, 0);
        let mut seen = Vec::new();
        m.mutate(&mut t, |id| seen.push(id));
        assert_eq!(seen, [TradeId(7)]);
    }

    #[test]
    fn empty_pool_is_silent_noop() {
        let mut m = TradeMutator::new(ScriptedSource::new(vec![0.1]));
        let mut signalled = false;
        let result = m.mutate_random(&mut [], |_| signalled = true);
        assert!(result.is_none());
        assert!(!signalled);
        assert_eq!(m.rng.draws(), 0);
    }

    #[test]
    fn mutate_random_picks_by_draw() {
        // index draw 0.7 of 3 → slot 2
        let mut m = TradeMutator::new(ScriptedSource::new(vec![0.7, 0.0, 0.0]));
        let mut pool = vec![trade(1, 100, 0), trade(2, 100, 0), trade(3, 100, 0)];
        let picked = m.mutate_random(&mut pool, |_| {});
        assert_eq!(picked, Some(TradeId(3)));
        assert_eq!(pool[2].status, TradeStatus::Unsent);
        assert_eq!(pool[0].status, TradeStatus::New);
    }

    #[test]
    fn mutate_in_notifies_sink() {
        let mut m = TradeMutator::new(ScriptedSource::new(vec![0.0, 0.2, 0.5]));
        let mut sink = VecSink::new();
        sink.add(trade(4, 300, 0));
        assert_eq!(m.mutate_in(&mut sink), Some(TradeId(4)));
        assert_eq!(sink.changed, [TradeId(4)]);
        assert_eq!(sink.trades[0].filled, 10);
    }

    #[test]
    fn mutate_in_empty_sink_does_nothing() {
        let mut m = TradeMutator::new(ScriptedSource::new(vec![0.0]));
        let mut sink = VecSink::new();
        assert_eq!(m.mutate_in(&mut sink), None);
        assert!(sink.changed.is_empty());
    }

    #[test]
    #[should_panic(expected = "fill amplitude")]
    fn non_positive_amplitude_panics() {
        let _ = TradeMutator::new(ScriptedSource::new(vec![0.0])).with_fill_amplitude(0.0);
    }
}
