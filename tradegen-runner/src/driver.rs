//! Driver — turns timer or button actions into generator/store operations.
//!
//! Each `apply` is one atomic logical operation. The driver owns the
//! generator, the mutator and the store; nothing else writes to the live set.

use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tradegen_core::rng::RngHierarchy;
use tradegen_core::{
    InstrumentCatalog, RandomSource, TradeGenerator, TradeId, TradeMutator, TradeStore, VecSink,
};

use crate::config::{ConfigError, DemoConfig};
use crate::summary::RunSummary;

/// Stream names for the seed hierarchy.
pub const CREATE_STREAM: &str = "create";
pub const MUTATE_STREAM: &str = "mutate";

/// Something a timer or a button can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Create `count` new trades.
    Create { count: usize },
    /// Mutate one random live trade.
    Mutate,
    /// Remove every live trade.
    Clear,
    /// Replace the live set with `rows` freshly created trades.
    Reset { rows: usize },
    /// Remove one trade (the row's cancel button).
    Cancel { id: TradeId },
}

/// What an action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Created(Vec<TradeId>),
    Mutated(TradeId),
    /// Mutate with no live trades.
    Skipped,
    Cleared { removed: usize },
    Reset { ids: Vec<TradeId> },
    Cancelled(TradeId),
    /// Cancel for an id that is not live.
    NotLive(TradeId),
}

/// Running totals of applied actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub created: usize,
    pub mutated: usize,
    pub skipped_mutations: usize,
    pub clears: usize,
    pub resets: usize,
    #[serde(default)]
    pub cancels: usize,
    #[serde(default)]
    pub skipped_cancels: usize,
}

#[derive(Debug)]
pub struct Driver<R = StdRng> {
    generator: TradeGenerator<R>,
    mutator: TradeMutator<R>,
    store: TradeStore,
    stats: ActionStats,
    seed: Option<u64>,
}

impl Driver<StdRng> {
    /// Build a driver from a config: catalog, seed streams, amplitude, and
    /// the initial rows.
    pub fn from_config(config: &DemoConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = config.load_catalog()?;
        let hierarchy = match config.seed {
            Some(seed) => RngHierarchy::new(seed),
            None => RngHierarchy::from_entropy(),
        };
        info!(
            "driver seeded with {} ({} instruments, K = {})",
            hierarchy.master_seed(),
            catalog.len(),
            config.fill_amplitude
        );

        let generator = TradeGenerator::new(catalog, hierarchy.rng_for(CREATE_STREAM));
        let mutator = TradeMutator::new(hierarchy.rng_for(MUTATE_STREAM))
            .with_fill_amplitude(config.fill_amplitude);
        let mut driver = Driver::new(generator, mutator);
        driver.seed = Some(hierarchy.master_seed());
        driver.seed_rows(config.initial_rows);
        Ok(driver)
    }

    /// Standard catalog, default amplitude, fixed seed, no rows.
    pub fn seeded(seed: u64) -> Self {
        let hierarchy = RngHierarchy::new(seed);
        let mut driver = Driver::new(
            TradeGenerator::new(InstrumentCatalog::standard(), hierarchy.rng_for(CREATE_STREAM)),
            TradeMutator::new(hierarchy.rng_for(MUTATE_STREAM)),
        );
        driver.seed = Some(seed);
        driver
    }
}

impl<R: RandomSource> Driver<R> {
    pub fn new(generator: TradeGenerator<R>, mutator: TradeMutator<R>) -> Self {
        Self {
            generator,
            mutator,
            store: TradeStore::new(),
            stats: ActionStats::default(),
            seed: None,
        }
    }

    /// Populate the store before any timer runs. Not counted in the stats.
    pub fn seed_rows(&mut self, rows: usize) {
        let mut batch = VecSink::new();
        self.generator.create_trades(rows, &mut batch);
        self.store.reset(batch.trades);
    }

    pub fn apply(&mut self, action: &Action) -> ActionOutcome {
        match action {
            Action::Create { count } => {
                let ids = self.generator.create_trades(*count, &mut self.store);
                self.stats.created += ids.len();
                ActionOutcome::Created(ids)
            }
            Action::Mutate => match self.mutator.mutate_in(&mut self.store) {
                Some(id) => {
                    self.stats.mutated += 1;
                    ActionOutcome::Mutated(id)
                }
                None => {
                    debug!("mutate skipped: no live trades");
                    self.stats.skipped_mutations += 1;
                    ActionOutcome::Skipped
                }
            },
            Action::Clear => {
                let removed = self.store.len();
                self.store.clear();
                self.stats.clears += 1;
                ActionOutcome::Cleared { removed }
            }
            Action::Reset { rows } => {
                let mut batch = VecSink::new();
                let ids = self.generator.create_trades(*rows, &mut batch);
                self.store.reset(batch.trades);
                self.stats.resets += 1;
                self.stats.created += ids.len();
                ActionOutcome::Reset { ids }
            }
            Action::Cancel { id } => match self.store.remove(*id) {
                Some(_) => {
                    info!("trade {id} cancelled");
                    self.stats.cancels += 1;
                    ActionOutcome::Cancelled(*id)
                }
                None => {
                    debug!("cancel skipped: trade {id} is not live");
                    self.stats.skipped_cancels += 1;
                    ActionOutcome::NotLive(*id)
                }
            },
        }
    }

    pub fn store(&self) -> &TradeStore {
        &self.store
    }

    /// Store access for subscribing and watching. Rows should be changed
    /// through `apply`.
    pub fn store_mut(&mut self) -> &mut TradeStore {
        &mut self.store
    }

    pub fn stats(&self) -> &ActionStats {
        &self.stats
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn next_id(&self) -> TradeId {
        self.generator.peek_next_id()
    }

    /// Summary of the current state. `elapsed_ms` is whatever clock the caller ran.
    pub fn summary(&self, elapsed_ms: u64) -> RunSummary {
        RunSummary::collect(self.store.all_items(), &self.stats, self.seed, self.next_id(), elapsed_ms)
    }
}
