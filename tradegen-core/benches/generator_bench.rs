//! Criterion benchmarks for tradegen hot paths.
//!
//! Benchmarks:
//! 1. Trade creation into the store (initial blotter fill)
//! 2. Random mutation with change notification (the 5 ms ticker)
//! 3. Store clear + reset

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tradegen_core::rng::seeded;
use tradegen_core::{InstrumentCatalog, TradeGenerator, TradeMutator, TradeStore};

fn filled_store(rows: usize) -> TradeStore {
    let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), seeded(1));
    let mut store = TradeStore::new();
    gen.create_trades(rows, &mut store);
    store
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_trades");
    for rows in [100usize, 400, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), seeded(1));
                let mut store = TradeStore::new();
                gen.create_trades(black_box(rows), &mut store);
                store
            })
        });
    }
    group.finish();
}

fn bench_mutate(c: &mut Criterion) {
    let mut group = c.benchmark_group("mutate_in");
    for rows in [400usize, 10_000] {
        let mut store = filled_store(rows);
        store.subscribe(|e| {
            black_box(e);
        });
        let mut mutator = TradeMutator::new(seeded(2));
        group.bench_function(BenchmarkId::from_parameter(rows), |b| {
            b.iter(|| mutator.mutate_in(&mut store))
        });
    }
    group.finish();
}

fn bench_reset(c: &mut Criterion) {
    let mut gen = TradeGenerator::new(InstrumentCatalog::standard(), seeded(3));
    let mut scratch = TradeStore::new();
    gen.create_trades(400, &mut scratch);
    let rows = scratch.all_items().to_vec();

    c.bench_function("reset_400", |b| {
        let mut store = TradeStore::new();
        b.iter(|| {
            store.reset(black_box(rows.clone()));
            store.clear();
        })
    });
}

criterion_group!(benches, bench_create, bench_mutate, bench_reset);
criterion_main!(benches);
