//! Win evaluation benchmarks
//!
//! Full 25-line evaluation (with overlap removal) on random and dense grids.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rf_slot_core::{GridSpec, SymbolCatalog, SymbolGenerator, SymbolGrid, SymbolKind, WinEvaluator};

fn random_grids(count: usize, seed: u64) -> Vec<SymbolGrid> {
    let mut generator = SymbolGenerator::with_seed(SymbolCatalog::standard(), seed);
    (0..count)
        .map(|_| SymbolGrid::generate(&mut generator, GridSpec::standard_5x3()))
        .collect()
}

fn bench_evaluate_random(c: &mut Criterion) {
    let evaluator = WinEvaluator::standard();
    let grids = random_grids(256, 42);

    c.bench_function("evaluate_random_grid", |b| {
        let mut i = 0;
        b.iter(|| {
            let grid = &grids[i % grids.len()];
            i += 1;
            black_box(evaluator.evaluate(black_box(grid), 1.0))
        })
    });
}

fn bench_evaluate_dense(c: &mut Criterion) {
    let evaluator = WinEvaluator::standard();
    let mut group = c.benchmark_group("evaluate_dense_grid");

    // Every payline wins on a single-symbol grid, the worst case for overlap removal
    for kind in [SymbolKind::Cherry, SymbolKind::Seven] {
        let grid = SymbolGrid::new(vec![vec![kind; 3]; 5]).expect("5x3 grid");
        group.bench_with_input(BenchmarkId::from_parameter(kind), &grid, |b, grid| {
            b.iter(|| black_box(evaluator.evaluate(black_box(grid), 1.0)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate_random, bench_evaluate_dense);
criterion_main!(benches);
