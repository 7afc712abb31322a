//! IAI-Callgrind benchmark for RedBlackTree.
//!
//! Measures instruction counts for insertion with both duplicate policies,
//! erasure of every key, and whole-tree copy.
//! Data sizes: 1000 and 10000.

use iai_callgrind::{library_benchmark, library_benchmark_group, main};
use ordtree::tree::RedBlackTree;
use std::hint::black_box;

// Setup functions for different data sizes
fn setup_keys(size: u32) -> Vec<u32> {
    (0..size)
        .map(|index| (u64::from(index) * 2_654_435_761 % u64::from(size)) as u32)
        .collect()
}

fn setup_tree(size: u32) -> (RedBlackTree<u32>, Vec<u32>) {
    let keys = setup_keys(size);
    let mut tree: RedBlackTree<u32> = RedBlackTree::new();
    tree.extend_unique(keys.iter().copied());
    (tree, keys)
}

// insert benchmarks
#[library_benchmark]
#[bench::small(setup_keys(1000))]
#[bench::large(setup_keys(10000))]
fn insert_unique(keys: Vec<u32>) -> RedBlackTree<u32> {
    let mut tree: RedBlackTree<u32> = RedBlackTree::new();
    for key in black_box(keys) {
        tree.insert_unique(key);
    }
    black_box(tree)
}

#[library_benchmark]
#[bench::small(setup_keys(1000))]
#[bench::large(setup_keys(10000))]
fn insert_equal(keys: Vec<u32>) -> RedBlackTree<u32> {
    let mut tree: RedBlackTree<u32> = RedBlackTree::new();
    for key in black_box(keys) {
        tree.insert_equal(key % 32);
    }
    black_box(tree)
}

// erase benchmarks
#[library_benchmark]
#[bench::small(setup_tree(1000))]
#[bench::large(setup_tree(10000))]
fn erase_every_key(input: (RedBlackTree<u32>, Vec<u32>)) -> RedBlackTree<u32> {
    let (mut tree, keys) = input;
    for key in &keys {
        tree.erase_key(black_box(key));
    }
    black_box(tree)
}

// copy benchmarks
#[library_benchmark]
#[bench::small(setup_tree(1000))]
#[bench::large(setup_tree(10000))]
fn clone_tree(input: (RedBlackTree<u32>, Vec<u32>)) -> RedBlackTree<u32> {
    black_box(black_box(&input.0).clone())
}

library_benchmark_group!(
    name = ordered_tree_group;
    benchmarks = insert_unique, insert_equal, erase_every_key, clone_tree
);

main!(library_benchmark_groups = ordered_tree_group);
