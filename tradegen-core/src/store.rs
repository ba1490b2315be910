//! In-memory trade store with change notification.
//!
//! `TradeStore` is the reference [`TradeSink`]: it keeps the live set keyed by
//! trade id in insertion order and tells observers what happened. Trades
//! themselves carry no behaviour; the store owns the mapping from identity to
//! callbacks.
//!
//! Two kinds of observer:
//! - subscribers see every [`StoreEvent`]
//! - watchers are attached to one trade id and see only `Changed`/`Removed`
//!   for that id; they are dropped when the trade leaves the store

use crate::domain::{Trade, TradeId};
use crate::sink::TradeSink;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;

/// What happened to the live set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(TradeId),
    Changed(TradeId),
    Removed(TradeId),
    Cleared { removed: usize },
    Reset { count: usize },
}

pub type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct TradeStore {
    trades: Vec<Trade>,
    /// id → position in `trades`.
    index: HashMap<TradeId, usize>,
    /// id → number of change signals received since the trade was added.
    revisions: HashMap<TradeId, u64>,
    subscribers: Vec<(SubscriptionId, Listener)>,
    watchers: HashMap<TradeId, Vec<Listener>>,
    next_subscription: u64,
}

impl fmt::Debug for TradeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeStore")
            .field("len", &self.trades.len())
            .field("subscribers", &self.subscribers.len())
            .field("watched_ids", &self.watchers.len())
            .finish()
    }
}

impl TradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Observers ──────────────────────────────────────────────────────

    /// Receive every store event until unsubscribed.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Watch one trade. Returns false (and drops the listener) if the id is
    /// not live.
    pub fn watch(&mut self, id: TradeId, listener: impl FnMut(&StoreEvent) + Send + 'static) -> bool {
        if !self.index.contains_key(&id) {
            return false;
        }
        self.watchers.entry(id).or_default().push(Box::new(listener));
        true
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn get(&self, id: TradeId) -> Option<&Trade> {
        self.index.get(&id).map(|&pos| &self.trades[pos])
    }

    /// Mutable access without a change signal; follow up with
    /// `notify_changed` (or use `update`).
    pub fn get_mut(&mut self, id: TradeId) -> Option<&mut Trade> {
        let pos = *self.index.get(&id)?;
        self.trades.get_mut(pos)
    }

    pub fn contains(&self, id: TradeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// All live trades in insertion order.
    pub fn all_items(&self) -> &[Trade] {
        &self.trades
    }

    pub fn ids(&self) -> impl Iterator<Item = TradeId> + '_ {
        self.trades.iter().map(|t| t.id)
    }

    /// Change signals received for this id since it was added.
    pub fn revision(&self, id: TradeId) -> Option<u64> {
        self.revisions.get(&id).copied()
    }

    // ── Mutation ───────────────────────────────────────────────────────

    /// Insert a trade. An existing trade with the same id is replaced in place
    /// and reported as `Changed`.
    pub fn insert(&mut self, trade: Trade) {
        let id = trade.id;
        if let Some(&pos) = self.index.get(&id) {
            warn!("trade {id} already live; replacing");
            self.trades[pos] = trade;
            self.changed(id);
            return;
        }
        self.index.insert(id, self.trades.len());
        self.revisions.insert(id, 0);
        self.trades.push(trade);
        self.emit(StoreEvent::Added(id));
    }

    /// Apply `f` to a live trade and signal the change.
    ///
    /// `f` must not change the trade's id. Returns false if the id is not live.
    pub fn update(&mut self, id: TradeId, f: impl FnOnce(&mut Trade)) -> bool {
        let Some(&pos) = self.index.get(&id) else {
            return false;
        };
        f(&mut self.trades[pos]);
        debug_assert_eq!(self.trades[pos].id, id, "update must not change the trade id");
        self.changed(id);
        true
    }

    /// Remove a single trade.
    pub fn remove(&mut self, id: TradeId) -> Option<Trade> {
        let pos = self.index.remove(&id)?;
        let trade = self.trades.remove(pos);
        for t in &self.trades[pos..] {
            if let Some(p) = self.index.get_mut(&t.id) {
                *p -= 1;
            }
        }
        self.revisions.remove(&id);
        let event = StoreEvent::Removed(id);
        if let Some(mut watchers) = self.watchers.remove(&id) {
            for w in watchers.iter_mut() {
                w(&event);
            }
        }
        self.emit(event);
        Some(trade)
    }

    /// Remove every trade.
    pub fn clear(&mut self) {
        let removed = self.drain_all();
        info!("store cleared ({removed} trades removed)");
        self.emit(StoreEvent::Cleared { removed });
    }

    /// Replace the live set. Later duplicates of an id win.
    pub fn reset(&mut self, trades: Vec<Trade>) {
        self.drain_all();
        for trade in trades {
            let id = trade.id;
            if let Some(&pos) = self.index.get(&id) {
                self.trades[pos] = trade;
                continue;
            }
            self.index.insert(id, self.trades.len());
            self.revisions.insert(id, 0);
            self.trades.push(trade);
        }
        let count = self.trades.len();
        info!("store reset with {count} trades");
        self.emit(StoreEvent::Reset { count });
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn changed(&mut self, id: TradeId) {
        if let Some(rev) = self.revisions.get_mut(&id) {
            *rev += 1;
        }
        let event = StoreEvent::Changed(id);
        if let Some(watchers) = self.watchers.get_mut(&id) {
            for w in watchers.iter_mut() {
                w(&event);
            }
        }
        self.emit(event);
    }

    /// Drop all rows, telling watchers their trade is gone.
    fn drain_all(&mut self) -> usize {
        for (id, mut watchers) in self.watchers.drain() {
            let event = StoreEvent::Removed(id);
            for w in watchers.iter_mut() {
                w(&event);
            }
        }
        let removed = self.trades.len();
        self.trades.clear();
        self.index.clear();
        self.revisions.clear();
        removed
    }

    fn emit(&mut self, event: StoreEvent) {
        for (_, listener) in self.subscribers.iter_mut() {
            listener(&event);
        }
    }
}

impl TradeSink for TradeStore {
    fn add(&mut self, trade: Trade) {
        self.insert(trade);
    }

    fn notify_changed(&mut self, id: TradeId) {
        if self.contains(id) {
            self.changed(id);
        } else {
            debug!("change signal for trade {id} which is not live; ignored");
        }
    }

    fn live_trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Mutable view of the live set. Ids must not be changed through it.
    fn live_trades_mut(&mut self) -> &mut [Trade] {
        &mut self.trades
    }
}
