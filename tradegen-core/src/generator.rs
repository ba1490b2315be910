//! Trade generator — draws new trades from the catalog with ascending ids.

use crate::catalog::InstrumentCatalog;
use crate::domain::{IdSequence, Side, Trade, TradeId, TradeStatus, MAX_QUANTITY, MIN_QUANTITY};
use crate::rng::RandomSource;
use crate::sink::TradeSink;
use log::debug;
use rand::rngs::StdRng;

/// Width of the quantity draw: quantities fall in `[100, 100 + QUANTITY_SPAN)`.
const QUANTITY_SPAN: f64 = (MAX_QUANTITY - MIN_QUANTITY) as f64;

/// Creates trades. Owns the id counter, so ids are unique per generator and
/// never reused, whatever happens to the trades afterwards.
#[derive(Debug)]
pub struct TradeGenerator<R = StdRng> {
    catalog: InstrumentCatalog,
    ids: IdSequence,
    rng: R,
}

impl<R: RandomSource> TradeGenerator<R> {
    pub fn new(catalog: InstrumentCatalog, rng: R) -> Self {
        Self {
            catalog,
            ids: IdSequence::new(),
            rng,
        }
    }

    /// Continue numbering from an existing sequence.
    pub fn with_id_sequence(mut self, ids: IdSequence) -> Self {
        self.ids = ids;
        self
    }

    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    /// The id the next created trade will get.
    pub fn peek_next_id(&self) -> TradeId {
        self.ids.peek()
    }

    /// Draw one new trade: `status = new`, `filled = 0`.
    ///
    /// Draw order is instrument, side, quantity.
    pub fn create_trade(&mut self) -> Trade {
        let id = self.ids.next_id();
        let instrument = self.catalog.pick_random(&mut self.rng);
        let side = if self.rng.next_unit() > 0.5 {
            Side::Buy
        } else {
            Side::Sell
        };
        let quantity = draw_quantity(self.rng.next_unit());
        Trade {
            id,
            instrument,
            side,
            quantity,
            filled: 0,
            status: TradeStatus::New,
        }
    }

    /// Create `count` trades and hand each to the sink in ascending id order.
    ///
    /// Returns the ids created; `count == 0` does nothing.
    pub fn create_trades<S: TradeSink + ?Sized>(&mut self, count: usize, sink: &mut S) -> Vec<TradeId> {
        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            let trade = self.create_trade();
            created.push(trade.id);
            sink.add(trade);
        }
        if let (Some(first), Some(last)) = (created.first(), created.last()) {
            debug!("created {count} trades ({first}..={last})");
        }
        created
    }
}

/// Map a unit draw onto `[MIN_QUANTITY, MAX_QUANTITY)`.
fn draw_quantity(u: f64) -> u32 {
    let offset = (u * QUANTITY_SPAN).floor() as u32;
    (MIN_QUANTITY + offset).min(MAX_QUANTITY - 1)
}
