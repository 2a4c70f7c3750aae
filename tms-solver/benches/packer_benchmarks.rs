//! Criterion benchmarks for the greedy packer and re-planner.
//!
//! Measures packing time across problem sizes (50, 100, 200 orders) and the
//! cost of generating three alternatives, to track regressions.
//!
//! Run benchmarks with:
//! ```bash
//! cargo bench --package tms-solver
//! ```

// Criterion macros generate code that triggers missing_docs warnings.
#![allow(missing_docs, reason = "Criterion macros generate undocumented code")]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tms_core::test_support::{PlanarDistanceProvider, base_time, depot};
use tms_core::{
    AlternativeGenerator, Cancellation, CapacityPacker, DisruptionEvent, DisruptionKind,
    PackOptions, ReplanRequest,
};
use tms_scorer::{DeadlineLatenessClassifier, WeightedAlternativeScorer};
use tms_solver::{GreedyPacker, Replanner};


use bench_support::{BENCHMARK_SEED, generate_clustered_orders, generate_fleet};

/// Problem sizes to benchmark: 50, 100, 200 orders.
const PROBLEM_SIZES: &[usize] = &[50, 100, 200];

/// One vehicle per this many orders.
const ORDERS_PER_VEHICLE: usize = 10;

fn fleet_size(orders: usize) -> usize {
    orders.div_ceil(ORDERS_PER_VEHICLE)
}

fn bench_pack_times(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_time");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(10));

    let packer = GreedyPacker::new(PlanarDistanceProvider);
    for &size in PROBLEM_SIZES {
        let orders = generate_clustered_orders(size, BENCHMARK_SEED);
        let vehicles = generate_fleet(fleet_size(size));
        let options = PackOptions::default();

        group.throughput(Throughput::Elements(
            u64::try_from(size).unwrap_or(u64::MAX),
        ));
        group.bench_with_input(BenchmarkId::new("orders", size), &size, |b, _| {
            b.iter(|| {
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Benchmarking pack performance, result is intentionally discarded"
                )]
                let _ = packer.pack(&orders, &vehicles, &depot(), &options);
            });
        });
    }

    group.finish();
}

fn bench_replan_times(c: &mut Criterion) {
    let mut group = c.benchmark_group("replan_time");
    let replanner = Replanner::new(
        GreedyPacker::new(PlanarDistanceProvider),
        DeadlineLatenessClassifier::default(),
        WeightedAlternativeScorer::default(),
    );
    for &size in PROBLEM_SIZES {
        let request = ReplanRequest {
            event: DisruptionEvent {
                kind: DisruptionKind::TrafficDelay,
                route_id: None,
                vehicle_id: None,
                description: String::new(),
                occurred_at: base_time(),
            },
            current_routes: Vec::new(),
            orders: generate_clustered_orders(size, BENCHMARK_SEED),
            vehicles: generate_fleet(fleet_size(size)),
            depot: depot(),
        };
        group.bench_with_input(BenchmarkId::new("orders", size), &size, |b, _| {
            b.iter(|| {
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Benchmarking re-plan performance, result is intentionally discarded"
                )]
                let _ = replanner.generate_alternatives(&request, &Cancellation::default());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pack_times, bench_replan_times);
criterion_main!(benches);
