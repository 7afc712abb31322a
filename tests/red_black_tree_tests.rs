//! Integration tests for RedBlackTree.
//!
//! These tests exercise the public engine API: insertion with both duplicate
//! policies, erasure by position, key and range, bound queries, positions
//! and cursors, and whole-tree copy and teardown.

use ordtree::tree::{
    First, FnCompare, Identity, NaturalOrder, Position, RedBlackTree, ReverseOrder, TreeError,
};
use rstest::rstest;
use std::cell::RefCell;
use std::ops::Bound;
use std::rc::Rc;

fn collect<K, C>(tree: &RedBlackTree<i32, K, C>) -> Vec<i32> {
    tree.iter().copied().collect()
}

fn scenario_tree() -> RedBlackTree<i32> {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    for value in [10, 20, 5, 15, 25, 1] {
        tree.insert_unique(value);
    }
    tree
}

// =============================================================================
// Scenario
// =============================================================================

#[rstest]
fn test_scenario_sequence() {
    let mut tree = scenario_tree();
    assert_eq!(collect(&tree), vec![1, 5, 10, 15, 20, 25]);

    let ten = tree.find(&10);
    assert_eq!(tree.erase(ten), Ok(10));
    assert_eq!(collect(&tree), vec![1, 5, 15, 20, 25]);
    assert!(tree.validate().is_ok());

    assert_eq!(tree.find(&99), tree.end());
    assert_eq!(tree.get(tree.lower_bound(&12)), Some(&15));
    assert_eq!(tree.get(tree.upper_bound(&15)), Some(&20));
}

// =============================================================================
// Insertion Tests
// =============================================================================

#[rstest]
fn test_insert_unique_then_find() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    let (position, inserted) = tree.insert_unique(7);
    assert!(inserted);
    assert_eq!(tree.find(&7), position);
    assert_eq!(tree.get(position), Some(&7));
}

#[rstest]
fn test_insert_unique_duplicate_leaves_length() {
    let mut tree = scenario_tree();
    let before = tree.len();
    let (position, inserted) = tree.insert_unique(15);
    assert!(!inserted);
    assert_eq!(tree.len(), before);
    assert_eq!(tree.get(position), Some(&15));
}

#[rstest]
fn test_insert_equal_grows_and_orders_by_insertion() {
    let mut tree = RedBlackTree::with_policies(First, NaturalOrder);
    tree.insert_equal(("k", 1));
    tree.insert_equal(("a", 0));
    tree.insert_equal(("k", 2));
    tree.insert_equal(("z", 0));
    tree.insert_equal(("k", 3));

    assert_eq!(tree.len(), 5);
    let run: Vec<_> = tree.equal_values(&"k").map(|(_, order)| *order).collect();
    assert_eq!(run, vec![1, 2, 3]);
    assert_eq!(tree.get(tree.find(&"k")), Some(&("k", 1)));
}

#[rstest]
fn test_extend_unique_reports_inserted_count() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    assert_eq!(tree.extend_unique([3, 1, 3, 2, 1]), 3);
    assert_eq!(collect(&tree), vec![1, 2, 3]);
}

#[rstest]
fn test_fallible_inserts_succeed_with_memory_available() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::with_capacity(4);
    assert!(tree.capacity() >= 4);
    for value in [4, 2, 6] {
        assert!(tree.try_insert_unique(value).is_ok());
    }
    assert_eq!(tree.try_insert_unique(4).map(|(_, inserted)| inserted), Ok(false));
    assert!(tree.try_insert_equal(4).is_ok());
    assert_eq!(tree.count(&4), 2);
    assert!(tree.validate().is_ok());
}

// =============================================================================
// Erasure Tests
// =============================================================================

#[rstest]
#[case(1)]
#[case(10)]
#[case(25)]
#[case(15)]
fn test_erase_single_value_keeps_invariants(#[case] target: i32) {
    let mut tree = scenario_tree();
    let position = tree.find(&target);
    assert_eq!(tree.erase(position), Ok(target));
    assert!(!tree.contains(&target));
    assert_eq!(tree.len(), 5);
    assert!(tree.validate().is_ok());
}

#[rstest]
fn test_erase_preserves_other_positions() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    let positions: Vec<(i32, Position)> =
        (0..64).map(|value| (value, tree.insert_unique(value).0)).collect();

    for &(value, position) in positions.iter().filter(|(value, _)| value % 3 == 0) {
        assert_eq!(tree.erase(position), Ok(value));
    }
    for &(value, position) in &positions {
        if value % 3 == 0 {
            assert_eq!(tree.get(position), None);
        } else {
            assert_eq!(tree.get(position), Some(&value));
        }
    }
    assert!(tree.validate().is_ok());
}

#[rstest]
fn test_erase_every_value_empties_tree() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_unique((0..200).map(|value| (value * 37) % 200));
    for value in (0..200).map(|value| (value * 91) % 200) {
        assert_eq!(tree.erase_key(&value), 1);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.begin(), tree.end());
    assert_eq!(tree.first(), None);
    assert_eq!(tree.last(), None);
    assert_eq!(tree.validate(), Ok(0));
}

#[rstest]
fn test_erase_errors_leave_tree_unchanged() {
    let mut tree = scenario_tree();
    let foreign = scenario_tree().begin();
    let end = tree.end();

    assert_eq!(tree.erase(end), Err(TreeError::EndPosition));
    assert_eq!(tree.erase(foreign), Err(TreeError::ForeignPosition));
    assert_eq!(
        tree.erase_range(foreign, end),
        Err(TreeError::ForeignPosition)
    );
    assert_eq!(collect(&tree), vec![1, 5, 10, 15, 20, 25]);
}

#[rstest]
fn test_erase_range_and_keys() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_equal([1, 2, 2, 3, 4, 5, 5, 6]);

    let first = tree.lower_bound(&2);
    let last = tree.upper_bound(&3);
    assert_eq!(tree.erase_range(first, last), Ok(3));
    assert_eq!(collect(&tree), vec![1, 4, 5, 5, 6]);

    assert_eq!(tree.erase_keys(&[5, 6, 7]), 3);
    assert_eq!(collect(&tree), vec![1, 4]);
    assert!(tree.validate().is_ok());
}

#[rstest]
#[case(5, 2)]
#[case(9, 0)]
#[case(-1, 3)]
fn test_erase_range_rejects_inverted_positions(#[case] first: i32, #[case] last: i32) {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_unique(0..10);
    // -1 stands for the end position.
    let first = if first < 0 { tree.end() } else { tree.find(&first) };
    let last = tree.find(&last);

    assert_eq!(tree.erase_range(first, last), Err(TreeError::InvertedRange));
    assert_eq!(
        tree.range_between(first, last).err(),
        Some(TreeError::InvertedRange)
    );
    assert_eq!(collect(&tree), (0..10).collect::<Vec<_>>());
    assert!(tree.validate().is_ok());
}

#[rstest]
fn test_erase_range_of_empty_span() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_unique(0..10);
    let four = tree.find(&4);
    assert_eq!(tree.erase_range(four, four), Ok(0));
    let end = tree.end();
    assert_eq!(tree.erase_range(end, end), Ok(0));
    assert_eq!(tree.len(), 10);
}

#[rstest]
fn test_pop_and_retain() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_unique(1..=10);
    assert_eq!(tree.pop_first(), Some(1));
    assert_eq!(tree.pop_last(), Some(10));
    tree.retain(|value| value % 2 == 1);
    assert_eq!(collect(&tree), vec![3, 5, 7, 9]);
}

// =============================================================================
// Query Tests
// =============================================================================

#[rstest]
#[case(0, Some(1), Some(1))]
#[case(1, Some(1), Some(5))]
#[case(12, Some(15), Some(15))]
#[case(25, Some(25), None)]
#[case(26, None, None)]
fn test_bounds(#[case] key: i32, #[case] lower: Option<i32>, #[case] upper: Option<i32>) {
    let tree = scenario_tree();
    assert_eq!(tree.get(tree.lower_bound(&key)).copied(), lower);
    assert_eq!(tree.get(tree.upper_bound(&key)).copied(), upper);
}

#[rstest]
fn test_equal_range_and_count_on_duplicates() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_equal([7, 3, 7, 7, 9]);
    let (first, last) = tree.equal_range(&7);
    let run: Vec<_> = tree
        .range_between(first, last)
        .expect("own positions")
        .copied()
        .collect();
    assert_eq!(run, vec![7, 7, 7]);
    assert_eq!(tree.count(&7), 3);
    assert_eq!(tree.count(&8), 0);

    let (first, last) = tree.equal_range(&8);
    assert_eq!(first, last);
}

#[rstest]
fn test_range_with_bounds() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_unique(0..20);
    let selected: Vec<_> = tree
        .range((Bound::Excluded(4), Bound::Included(8)))
        .copied()
        .collect();
    assert_eq!(selected, vec![5, 6, 7, 8]);
    assert_eq!(tree.range(..).count(), 20);
    assert_eq!(tree.range(30..).count(), 0);
}

#[rstest]
#[case((Bound::Included(10), Bound::Excluded(3)))]
#[case((Bound::Excluded(9), Bound::Included(3)))]
#[case((Bound::Excluded(9), Bound::Unbounded))]
#[case((Bound::Included(12), Bound::Unbounded))]
#[case((Bound::Included(6), Bound::Excluded(6)))]
#[case((Bound::Excluded(5), Bound::Excluded(5)))]
#[case((Bound::Excluded(5), Bound::Included(4)))]
fn test_range_empty_or_inverted_in_both_directions(#[case] bounds: (Bound<i32>, Bound<i32>)) {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_unique(0..10);
    assert_eq!(tree.range(bounds).next(), None);
    assert_eq!(tree.range(bounds).next_back(), None);
}

#[rstest]
fn test_range_from_excluded_start_in_both_directions() {
    let mut tree: RedBlackTree<i32> = RedBlackTree::new();
    tree.extend_unique(0..10);
    let bounds = (Bound::Excluded(6), Bound::Unbounded);
    assert_eq!(tree.range(bounds).copied().collect::<Vec<_>>(), vec![7, 8, 9]);
    assert_eq!(
        tree.range(bounds).rev().copied().collect::<Vec<_>>(),
        vec![9, 8, 7]
    );
}

#[rstest]
fn test_custom_comparator_by_length() {
    let by_length = FnCompare::new(|left: &&str, right: &&str| left.len() < right.len());
    let mut tree = RedBlackTree::with_policies(Identity, by_length);
    assert!(tree.insert_unique("three").1);
    assert!(tree.insert_unique("a").1);
    assert!(!tree.insert_unique("b").1);
    assert!(tree.insert_unique("to").1);
    assert_eq!(
        tree.iter().copied().collect::<Vec<_>>(),
        vec!["a", "to", "three"]
    );
}

#[rstest]
fn test_policy_accessors() {
    let tree: RedBlackTree<i32, Identity, ReverseOrder> = RedBlackTree::default();
    assert_eq!(*tree.key_comp(), ReverseOrder);
    assert_eq!(*tree.key_extractor(), Identity);
}

// =============================================================================
// Position and Cursor Tests
// =============================================================================

#[rstest]
fn test_next_and_prev_positions_wrap_through_end() {
    let tree = scenario_tree();
    let last = tree.prev_position(tree.end()).expect("own position");
    assert_eq!(tree.get(last), Some(&25));
    assert_eq!(tree.next_position(last), Ok(tree.end()));
    assert_eq!(tree.prev_position(tree.begin()), Ok(tree.end()));
}

#[rstest]
fn test_cursor_walks_from_position() {
    let tree = scenario_tree();
    let mut cursor = tree.cursor(tree.find(&10)).expect("own position");
    cursor.increment();
    assert_eq!(cursor.get(), Some(&15));
    cursor.decrement();
    cursor.decrement();
    assert_eq!(cursor.get(), Some(&5));
    assert_eq!(cursor.position(), tree.find(&5));
}

#[rstest]
fn test_stale_position_after_clear() {
    let mut tree = scenario_tree();
    let five = tree.find(&5);
    tree.clear();
    assert_eq!(tree.next_position(five), Err(TreeError::StalePosition));
    assert!(tree.is_empty());
}

// =============================================================================
// Whole-tree Tests
// =============================================================================

#[rstest]
fn test_clone_then_mutate_independently() {
    let original = scenario_tree();
    let mut copy = original.clone();
    assert_eq!(copy, original);

    copy.insert_unique(30);
    copy.erase_key(&1);
    assert_ne!(copy, original);
    assert_eq!(collect(&original), vec![1, 5, 10, 15, 20, 25]);
    assert_eq!(collect(&copy), vec![5, 10, 15, 20, 25, 30]);
    assert!(copy.validate().is_ok());
    assert_eq!(copy.erase(original.begin()), Err(TreeError::ForeignPosition));
}

#[rstest]
fn test_clear_drops_every_value_once() {
    let witness = Rc::new(RefCell::new(0));
    let mut tree = RedBlackTree::with_policies(First, NaturalOrder);
    for key in 0..50 {
        tree.insert_unique((key, DropCounter(Rc::clone(&witness))));
    }
    tree.clear();
    assert_eq!(*witness.borrow(), 50);
    assert!(tree.is_empty());
}

#[rstest]
fn test_drop_releases_every_value() {
    let witness = Rc::new(RefCell::new(0));
    {
        let mut tree = RedBlackTree::with_policies(First, NaturalOrder);
        for key in 0..10 {
            tree.insert_equal((key % 3, DropCounter(Rc::clone(&witness))));
        }
    }
    assert_eq!(*witness.borrow(), 10);
}

#[rstest]
fn test_large_ascending_and_descending_insertions() {
    let mut ascending: RedBlackTree<u32> = RedBlackTree::new();
    ascending.extend_unique(0..10_000);
    let mut descending: RedBlackTree<u32> = RedBlackTree::new();
    descending.extend_unique((0..10_000).rev());

    assert_eq!(ascending, descending);
    let black_height = ascending.validate().expect("balanced");
    assert!(black_height <= 14);
}

struct DropCounter(Rc<RefCell<usize>>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        *self.0.borrow_mut() += 1;
    }
}
