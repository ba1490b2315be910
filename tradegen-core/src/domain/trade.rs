//! Trade — a synthetic order record with quantity, fill progress and status.

use super::ids::TradeId;
use super::instrument::Instrument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Quantities are drawn from `[MIN_QUANTITY, MAX_QUANTITY)`.
pub const MIN_QUANTITY: u32 = 100;
pub const MAX_QUANTITY: u32 = 1100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Upper-case label shown in the side column.
    pub fn label(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// Lifecycle label of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Unsent,
    New,
    Rejected,
    Cancelled,
    Partial,
    Filled,
}

impl TradeStatus {
    /// Every status, in declaration order.
    pub const ALL: [TradeStatus; 6] = [
        TradeStatus::Unsent,
        TradeStatus::New,
        TradeStatus::Rejected,
        TradeStatus::Cancelled,
        TradeStatus::Partial,
        TradeStatus::Filled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TradeStatus::Unsent => "unsent",
            TradeStatus::New => "new",
            TradeStatus::Rejected => "rejected",
            TradeStatus::Cancelled => "cancelled",
            TradeStatus::Partial => "partial",
            TradeStatus::Filled => "filled",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live trade.
///
/// Invariant: `filled < quantity` and `quantity >= MIN_QUANTITY`. The
/// generator is the only code that writes `filled` and `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub instrument: Arc<Instrument>,
    pub side: Side,
    pub quantity: u32,
    pub filled: u32,
    pub status: TradeStatus,
}

impl Trade {
    /// Fraction filled, in `[0, 1)`.
    pub fn fill_ratio(&self) -> f64 {
        if self.quantity == 0 {
            return 0.0;
        }
        self.filled as f64 / self.quantity as f64
    }

    /// Hue (degrees) for a fill-progress bar: red at 0, sweeping round the wheel.
    pub fn fill_hue(&self) -> f64 {
        360.0 * self.fill_ratio()
    }

    /// Row class name used by grid renderers.
    pub fn row_class(&self) -> String {
        format!("order-{}", self.status)
    }

    /// Unfilled quantity; 0 for a trade that breaks the fill invariant.
    pub fn remaining(&self) -> u32 {
        self.quantity.saturating_sub(self.filled)
    }

    /// Check the fill invariant.
    pub fn is_consistent(&self) -> bool {
        self.quantity >= MIN_QUANTITY && self.filled < self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(quantity: u32, filled: u32) -> Trade {
        Trade {
            id: TradeId(1),
            instrument: Arc::new(Instrument::new("IBM US", "US")),
            side: Side::Buy,
            quantity,
            filled,
            status: TradeStatus::New,
        }
    }

    #[test]
    fn fill_ratio_and_hue() {
        let t = trade(400, 100);
        assert_eq!(t.fill_ratio(), 0.25);
        assert_eq!(t.fill_hue(), 90.0);
        assert_eq!(t.remaining(), 300);
    }

    #[test]
    fn remaining_never_underflows() {
        assert_eq!(trade(100, 99).remaining(), 1);
        assert_eq!(trade(100, 150).remaining(), 0);
    }

    #[test]
    fn row_class_uses_status_label() {
        let mut t = trade(100, 0);
        assert_eq!(t.row_class(), "order-new");
        t.status = TradeStatus::Cancelled;
        assert_eq!(t.row_class(), "order-cancelled");
    }

    #[test]
    fn side_labels() {
        assert_eq!(Side::Buy.label(), "BUY");
        assert_eq!(Side::Sell.label(), "SELL");
    }

    #[test]
    fn status_labels_are_distinct() {
        let mut labels: Vec<_> = TradeStatus::ALL.iter().map(|s| s.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), TradeStatus::ALL.len());
    }

    #[test]
    fn consistency_check() {
        assert!(trade(100, 99).is_consistent());
        assert!(!trade(100, 100).is_consistent());
        assert!(!trade(99, 0).is_consistent());
    }

    #[test]
    fn serializes_status_as_label() {
        let json = serde_json::to_value(trade(500, 30)).unwrap();
        assert_eq!(json["status"], "new");
        assert_eq!(json["side"], "buy");
        assert_eq!(json["id"], 1);
        assert_eq!(json["instrument"]["symbol"], "IBM US");
    }
}
