//! End-to-end scenarios: generator + mutator against the in-memory store.

use std::sync::{Arc, Mutex};
use tradegen_core::domain::{Side, TradeId, TradeStatus};
use tradegen_core::rng::{seeded, RngHierarchy, ScriptedSource};
use tradegen_core::{
    InstrumentCatalog, StoreEvent, TradeGenerator, TradeMutator, TradeSink, TradeStore, VecSink,
};

fn record(store: &mut TradeStore) -> Arc<Mutex<Vec<StoreEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    store.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    log
}

#[test]
fn create_three_trades_into_sink() {
    let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), seeded(2024));
    let mut sink = VecSink::new();

    gen.create_trades(3, &mut sink);

    assert_eq!(sink.trades.len(), 3);
    let ids: Vec<_> = sink.trades.iter().map(|t| t.id).collect();
    assert_eq!(ids, [TradeId(1), TradeId(2), TradeId(3)]);
    for t in &sink.trades {
        assert_eq!(t.filled, 0);
        assert_eq!(t.status, TradeStatus::New);
        assert!((100..1100).contains(&t.quantity));
    }
    assert!(sink.changed.is_empty());
}

#[test]
fn store_sees_adds_then_changes() {
    let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), seeded(5));
    let mut mutator = TradeMutator::new(seeded(6));
    let mut store = TradeStore::new();
    let events = record(&mut store);

    gen.create_trades(3, &mut store);
    let changed = mutator.mutate_in(&mut store).unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        events[..3],
        [
            StoreEvent::Added(TradeId(1)),
            StoreEvent::Added(TradeId(2)),
            StoreEvent::Added(TradeId(3)),
        ]
    );
    assert_eq!(events[3], StoreEvent::Changed(changed));
    assert_eq!(store.revision(changed), Some(1));
}

#[test]
fn wrap_around_through_store() {
    // Trade draws: instrument 0.0, side 0.9 (Buy), quantity 0.4 → 500.
    let gen_src = ScriptedSource::new(vec![0.0, 0.9, 0.4]);
    let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), gen_src);
    let mut store = TradeStore::new();
    gen.create_trades(1, &mut store);
    store.update(TradeId(1), |t| t.filled = 480);

    // Mutation draws: pick 0.0, fill 0.5 * 100 = 50, status 0.7 → partial.
    let mut_src = ScriptedSource::new(vec![0.0, 0.5, 0.7]);
    let mut mutator = TradeMutator::new(mut_src).with_fill_amplitude(100.0);
    mutator.mutate_in(&mut store);

    let t = store.get(TradeId(1)).unwrap();
    assert_eq!(t.quantity, 500);
    assert_eq!(t.side, Side::Buy);
    assert_eq!(t.filled, 30);
    assert_eq!(t.status, TradeStatus::Partial);
}

#[test]
fn empty_store_mutation_is_invisible() {
    let mut mutator = TradeMutator::new(seeded(1));
    let mut store = TradeStore::new();
    let events = record(&mut store);

    assert!(mutator.mutate_in(&mut store).is_none());
    assert!(events.lock().unwrap().is_empty());
    assert!(store.is_empty());
}

#[test]
fn ids_are_not_reused_after_clear() {
    let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), seeded(9));
    let mut store = TradeStore::new();
    gen.create_trades(5, &mut store);
    store.clear();
    gen.create_trades(2, &mut store);
    assert_eq!(store.ids().collect::<Vec<_>>(), [TradeId(6), TradeId(7)]);
}

#[test]
fn creation_stream_independent_of_mutations() {
    let hierarchy = RngHierarchy::new(77);

    let run = |mutations: usize| {
        let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), hierarchy.rng_for("create"));
        let mut mutator = TradeMutator::new(hierarchy.rng_for("mutate"));
        let mut store = TradeStore::new();
        gen.create_trades(10, &mut store);
        for _ in 0..mutations {
            mutator.mutate_in(&mut store);
        }
        gen.create_trades(10, &mut store);
        store.live_trades()[10..]
            .iter()
            .map(|t| (t.id, t.instrument.symbol.clone(), t.side, t.quantity))
            .collect::<Vec<_>>()
    };

    assert_eq!(run(0), run(250));
}

#[test]
fn watchers_follow_a_single_trade() {
    let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), seeded(3));
    let mut mutator = TradeMutator::new(seeded(4));
    let mut store = TradeStore::new();
    gen.create_trades(4, &mut store);

    let hits = Arc::new(Mutex::new(0usize));
    let h = Arc::clone(&hits);
    store.watch(TradeId(2), move |_| *h.lock().unwrap() += 1);

    let mut expected = 0;
    for _ in 0..200 {
        if mutator.mutate_in(&mut store) == Some(TradeId(2)) {
            expected += 1;
        }
    }
    assert_eq!(*hits.lock().unwrap(), expected);
    assert_eq!(store.revision(TradeId(2)), Some(expected as u64));
}
