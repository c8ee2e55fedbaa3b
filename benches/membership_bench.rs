//! ComparableSet membership and construction benchmark.
//!
//! Compares the three equivalence strategies. `Intrinsic` and `ByKey` use
//! fingerprint buckets, `Comparator` scans, so the gap should widen with size.

use comparable_sets::{ByKey, Comparator, ComparableSet, Intrinsic, set_from};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const SIZES: [i32; 3] = [100, 1000, 10000];

fn generate_elements(size: i32) -> Vec<i32> {
    (0..size).chain(0..size / 2).collect()
}

fn same_value(left: &i32, right: &i32) -> bool {
    left == right
}

fn benchmark_construction(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("comparable_set_construction");

    for size in SIZES {
        let elements = generate_elements(size);
        group.bench_with_input(BenchmarkId::new("intrinsic", size), &size, |bencher, _| {
            bencher.iter_batched(
                || elements.clone(),
                |input| black_box(set_from(input, Intrinsic)),
                BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("by_key", size), &size, |bencher, _| {
            bencher.iter_batched(
                || elements.clone(),
                |input| black_box(set_from(input, ByKey::new(|value: &i32| *value))),
                BatchSize::SmallInput,
            );
        });
        // Quadratic; keep the comparator run to the smaller inputs.
        if size <= 1000 {
            group.bench_with_input(BenchmarkId::new("comparator", size), &size, |bencher, _| {
                bencher.iter_batched(
                    || elements.clone(),
                    |input| black_box(set_from(input, Comparator::new(same_value))),
                    BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

fn benchmark_membership(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("comparable_set_has");

    for size in SIZES {
        let intrinsic: ComparableSet<i32> = (0..size).collect();
        let by_key = set_from(0..size, ByKey::new(|value: &i32| *value));
        let comparator = set_from(0..size, Comparator::new(same_value));
        let probes: Vec<i32> = (0..size).step_by(7).collect();

        group.bench_with_input(BenchmarkId::new("intrinsic", size), &probes, |bencher, probes| {
            bencher.iter(|| probes.iter().filter(|probe| intrinsic.has(probe)).count());
        });
        group.bench_with_input(BenchmarkId::new("by_key", size), &probes, |bencher, probes| {
            bencher.iter(|| probes.iter().filter(|probe| by_key.has(probe)).count());
        });
        group.bench_with_input(BenchmarkId::new("comparator", size), &probes, |bencher, probes| {
            bencher.iter(|| probes.iter().filter(|probe| comparator.has(probe)).count());
        });
    }

    group.finish();
}

fn benchmark_algebra(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("comparable_set_algebra");

    for size in SIZES {
        let left: ComparableSet<i32> = (0..size).collect();
        let right: ComparableSet<i32> = (size / 2..size + size / 2).collect();

        group.bench_with_input(BenchmarkId::new("union", size), &size, |bencher, _| {
            bencher.iter(|| black_box(left.union(&right)));
        });
        group.bench_with_input(BenchmarkId::new("intersection", size), &size, |bencher, _| {
            bencher.iter(|| black_box(left.intersection(&right)));
        });
        group.bench_with_input(BenchmarkId::new("symmetric_difference", size), &size, |bencher, _| {
            bencher.iter(|| black_box(left.symmetric_difference(&right)));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_construction, benchmark_membership, benchmark_algebra);

criterion_main!(benches);
