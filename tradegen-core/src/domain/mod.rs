//! Domain types for tradegen

pub mod ids;
pub mod instrument;
pub mod trade;

pub use ids::{IdSequence, TradeId};
pub use instrument::Instrument;
pub use trade::{Side, Trade, TradeStatus, MAX_QUANTITY, MIN_QUANTITY};
