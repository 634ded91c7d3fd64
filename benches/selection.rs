//! Benchmark indexed selection performance.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dcd_map::provider::{CountMapKey, CountMapSchema};
use dcd_map::{DcdMapCount, Operation, TableGroup, TableSchema};

/// Count map with `times` steps, `nodes` nodes and a `side` x `side` grid.
fn count_map(times: usize, nodes: usize, side: usize) -> DcdMapCount {
    let mut g = TableGroup::new(
        CountMapSchema::GROUP,
        CountMapSchema::KEY_ORDER,
        CountMapSchema::COLUMNS,
    );
    for t in 0..times {
        for x in 0..side {
            for y in 0..side {
                for id in 0..=nodes {
                    let err = ((t + x + y + id) % 5) as f64 - 2.0;
                    g.insert(
                        vec![t as f64, x as f64 * 5.0, y as f64 * 5.0, id as f64],
                        vec![1.0, err, (x + y) as f64, err * err],
                    )
                    .unwrap();
                }
            }
        }
    }
    DcdMapCount::attach(Arc::new(g)).unwrap()
}

fn bench_leading_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("leading_key");

    for times in [10, 50, 200] {
        let p = count_map(times, 10, 10);
        group.bench_with_input(BenchmarkId::new("simtime_exact", times), &p, |b, p| {
            b.iter(|| black_box(p.select_simtime_exact(black_box(5.0), Operation::Eq).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("simtime_range", times), &p, |b, p| {
            b.iter(|| black_box(p.select_simtime_range(black_box(2.0), black_box(6.0)).unwrap()))
        });
    }

    group.finish();
}

fn bench_compound(c: &mut Criterion) {
    let p = count_map(50, 10, 10);

    c.bench_function("simtime_and_node", |b| {
        b.iter(|| {
            black_box(
                p.select_simtime_and_node_id_exact(black_box(25.0), black_box(3), Operation::Eq)
                    .unwrap(),
            )
        })
    });

    // trailing level only: full scan
    c.bench_function("node_only", |b| {
        b.iter(|| black_box(p.select_id_exact(black_box(3.0), Operation::Eq).unwrap()))
    });

    let conditions = [
        DcdMapCount::build_range(CountMapKey::SIMTIME, 10.0, 20.0).unwrap(),
        DcdMapCount::build_exact(CountMapKey::ERR, 0.0, Operation::Gt).unwrap(),
    ];
    c.bench_function("range_and_value", |b| {
        b.iter(|| black_box(p.select_where(black_box(&conditions)).unwrap()))
    });
}

criterion_group!(benches, bench_leading_key, bench_compound);
criterion_main!(benches);
