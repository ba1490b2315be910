//! tradegen core — synthetic trade generation and an observable trade store.
//!
//! This crate contains:
//! - Domain types (instruments, trades, ids, statuses)
//! - The fixed instrument catalog
//! - Injectable random sources and a seed hierarchy
//! - The trade generator (creation, ascending ids) and mutator (fill/status)
//! - The sink contract and the in-memory `TradeStore` with change notification

pub mod catalog;
pub mod domain;
pub mod generator;
pub mod mutator;
pub mod rng;
pub mod sink;
pub mod store;

pub use catalog::{CatalogError, InstrumentCatalog};
pub use domain::{IdSequence, Instrument, Side, Trade, TradeId, TradeStatus};
pub use generator::TradeGenerator;
pub use mutator::{TradeMutator, DEFAULT_FILL_AMPLITUDE};
pub use rng::{RandomSource, RngHierarchy, ScriptedSource};
pub use sink::{TradeSink, VecSink};
pub use store::{StoreEvent, SubscriptionId, TradeStore};
