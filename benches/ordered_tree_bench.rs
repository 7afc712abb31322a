//! RedBlackTree benchmark.
//!
//! Compares insertion, lookup, erase and iteration against `BTreeSet`.
//! Keys are a fixed pseudo-random permutation so both structures see the
//! same workload.

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use ordtree::tree::RedBlackTree;
use std::collections::BTreeSet;
use std::hint::black_box;

const SIZES: [u32; 3] = [100, 1000, 10000];

/// Multiplicative permutation of `0..size`; 2654435761 is coprime to every
/// benchmark size.
fn shuffled_keys(size: u32) -> Vec<u32> {
    (0..size)
        .map(|index| (u64::from(index) * 2_654_435_761 % u64::from(size)) as u32)
        .collect()
}

fn build_tree(keys: &[u32]) -> RedBlackTree<u32> {
    let mut tree = RedBlackTree::with_capacity(keys.len());
    tree.extend_unique(keys.iter().copied());
    tree
}

/// Returns the appropriate BatchSize based on input size.
fn batch_size_for(size: u32) -> BatchSize {
    if size < 1000 {
        BatchSize::SmallInput
    } else {
        BatchSize::LargeInput
    }
}

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert_unique");

    for size in SIZES {
        let keys = shuffled_keys(size);

        group.bench_with_input(BenchmarkId::new("RedBlackTree", size), &keys, |bencher, keys| {
            bencher.iter(|| black_box(build_tree(black_box(keys))));
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let set: BTreeSet<u32> = black_box(keys).iter().copied().collect();
                black_box(set)
            });
        });
    }

    group.finish();
}

fn benchmark_insert_equal(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert_equal");

    for size in SIZES {
        let keys: Vec<u32> = shuffled_keys(size).into_iter().map(|key| key % 16).collect();

        group.bench_with_input(BenchmarkId::new("RedBlackTree", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                let mut tree: RedBlackTree<u32> = RedBlackTree::new();
                tree.extend_equal(black_box(keys).iter().copied());
                black_box(tree)
            });
        });
    }

    group.finish();
}

fn benchmark_find(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("find");

    for size in SIZES {
        let keys = shuffled_keys(size);
        let tree = build_tree(&keys);
        let set: BTreeSet<u32> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("RedBlackTree", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                for key in keys {
                    black_box(tree.contains(black_box(key)));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &keys, |bencher, keys| {
            bencher.iter(|| {
                for key in keys {
                    black_box(set.contains(black_box(key)));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_erase(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("erase_key");

    for size in SIZES {
        let keys = shuffled_keys(size);
        let tree = build_tree(&keys);
        let set: BTreeSet<u32> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("RedBlackTree", size), &size, |bencher, &size| {
            bencher.iter_batched(
                || tree.clone(),
                |mut tree| {
                    for key in &keys {
                        tree.erase_key(key);
                    }
                    black_box(tree)
                },
                batch_size_for(size),
            );
        });

        group.bench_with_input(BenchmarkId::new("BTreeSet", size), &size, |bencher, &size| {
            bencher.iter_batched(
                || set.clone(),
                |mut set| {
                    for key in &keys {
                        set.remove(key);
                    }
                    black_box(set)
                },
                batch_size_for(size),
            );
        });
    }

    group.finish();
}

fn benchmark_iterate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iterate");

    for size in SIZES {
        let keys = shuffled_keys(size);
        let tree = build_tree(&keys);
        let set: BTreeSet<u32> = keys.iter().copied().collect();

        group.bench_function(BenchmarkId::new("RedBlackTree", size), |bencher| {
            bencher.iter(|| black_box(tree.iter().fold(0_u64, |sum, key| sum + u64::from(*key))));
        });

        group.bench_function(BenchmarkId::new("BTreeSet", size), |bencher| {
            bencher.iter(|| black_box(set.iter().fold(0_u64, |sum, key| sum + u64::from(*key))));
        });
    }

    group.finish();
}

fn benchmark_clone(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("clone");

    for size in SIZES {
        let tree = build_tree(&shuffled_keys(size));

        group.bench_function(BenchmarkId::new("RedBlackTree", size), |bencher| {
            bencher.iter(|| black_box(tree.clone()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_insert_equal,
    benchmark_find,
    benchmark_erase,
    benchmark_iterate,
    benchmark_clone
);
criterion_main!(benches);
