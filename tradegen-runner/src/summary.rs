//! Run summary — what a simulation or live session left behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tradegen_core::{Side, Trade, TradeId, TradeStatus};

use crate::driver::ActionStats;

/// Current schema version for persisted summaries.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub seed: Option<u64>,
    pub elapsed_ms: u64,
    pub stats: ActionStats,
    pub live_trades: usize,
    pub next_id: TradeId,
    /// Live trades per status label; every label is present.
    pub status_counts: BTreeMap<String, usize>,
    pub buy_count: usize,
    pub sell_count: usize,
    /// Mean `filled / quantity` over live trades; 0 when there are none.
    pub mean_fill_ratio: f64,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunSummary {
    pub fn collect(
        trades: &[Trade],
        stats: &ActionStats,
        seed: Option<u64>,
        next_id: TradeId,
        elapsed_ms: u64,
    ) -> Self {
        let mut status_counts: BTreeMap<String, usize> = TradeStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut buy_count = 0;
        let mut fill_sum = 0.0;
        for t in trades {
            *status_counts.entry(t.status.as_str().to_string()).or_default() += 1;
            if t.side == Side::Buy {
                buy_count += 1;
            }
            fill_sum += t.fill_ratio();
        }
        let mean_fill_ratio = if trades.is_empty() {
            0.0
        } else {
            fill_sum / trades.len() as f64
        };

        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            seed,
            elapsed_ms,
            stats: stats.clone(),
            live_trades: trades.len(),
            next_id,
            status_counts,
            buy_count,
            sell_count: trades.len() - buy_count,
            mean_fill_ratio,
        }
    }

    pub fn status_count(&self, status: TradeStatus) -> usize {
        self.status_counts.get(status.as_str()).copied().unwrap_or(0)
    }
}
