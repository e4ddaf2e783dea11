//! Structural invariants of `IntervalTree` under randomized insert/erase sequences.
//!
//! Mirrors the properties spec.md calls out as universal: BST order on `low`, red-black coloring
//! (no red-red violation, equal black height on every root-to-nil path), the `max` augmentation
//! (every node's cached max equals the greatest `high` in its subtree), and size tracking the
//! number of reachable nodes.

use interval_tree::{Color, Interval, IntervalKind, IntervalTree, NodeId};
use proptest::prelude::*;

type Tree = IntervalTree<i32>;

fn no_red_red_violation(tree: &Tree, id: Option<NodeId>, parent_is_red: bool) -> bool {
    let cur = tree.at(id);
    match cur.node() {
        None => true,
        Some(_) => {
            let is_red = cur.color().unwrap() == Color::Red;
            if is_red && parent_is_red {
                return false;
            }
            no_red_red_violation(tree, cur.left().unwrap().node(), is_red)
                && no_red_red_violation(tree, cur.right().unwrap().node(), is_red)
        }
    }
}

/// Returns `Some(black_height)` if every root-to-nil path under `id` has the same black height,
/// `None` otherwise.
fn black_height(tree: &Tree, id: Option<NodeId>) -> Option<usize> {
    let cur = tree.at(id);
    match cur.node() {
        None => Some(1),
        Some(_) => {
            let left = black_height(tree, cur.left().unwrap().node())?;
            let right = black_height(tree, cur.right().unwrap().node())?;
            if left != right {
                return None;
            }
            Some(left + if cur.color().unwrap() == Color::Black { 1 } else { 0 })
        }
    }
}

/// Returns `Some(max_in_subtree)` if every node's cached `max` matches the greatest `high` in its
/// subtree, `None` on the first mismatch.
fn max_is_consistent(tree: &Tree, id: Option<NodeId>) -> Option<i32> {
    let cur = tree.at(id);
    match cur.node() {
        None => None,
        Some(_) => {
            let own_high = cur.interval().unwrap().high();
            let left_max = max_is_consistent(tree, cur.left().unwrap().node());
            let right_max = max_is_consistent(tree, cur.right().unwrap().node());
            let mut expected = own_high;
            if let Some(l) = left_max {
                expected = expected.max(l);
            }
            if let Some(r) = right_max {
                expected = expected.max(r);
            }
            if expected != cur.max().unwrap() {
                panic!("max mismatch: cached {} != expected {}", cur.max().unwrap(), expected);
            }
            Some(expected)
        }
    }
}

fn root_is_black(tree: &Tree) -> bool {
    match tree.root().node() {
        None => true,
        Some(_) => tree.root().color().unwrap() == Color::Black,
    }
}

fn assert_invariants(tree: &Tree) {
    assert!(root_is_black(tree), "root must be black");
    assert!(no_red_red_violation(tree, tree.root().node(), false), "red node with a red child");
    assert!(black_height(tree, tree.root().node()).is_some(), "unequal black heights across paths");
    if tree.root().node().is_some() {
        max_is_consistent(tree, tree.root().node());
    }

    let lows: Vec<i32> = tree.iter().map(|i| i.low()).collect();
    assert_eq!(lows.len(), tree.size());
    assert!(lows.windows(2).all(|w| w[0] <= w[1]), "in-order traversal is not sorted by low: {:?}", lows);
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Insert(i32, u8),
    EraseFirst,
    EraseLast,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<i32>(), any::<u8>()).prop_map(|(low, width)| Op::Insert(low, width)),
        1 => Just(Op::EraseFirst),
        1 => Just(Op::EraseLast),
    ]
}

proptest! {
    #[test]
    fn random_insert_erase_sequences_preserve_invariants(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut tree = Tree::new();
        let mut model_size = 0usize;

        for op in ops {
            match op {
                Op::Insert(low, width) => {
                    let high = low.saturating_add(width as i32);
                    let ival = Interval::new(low, high, IntervalKind::Closed).unwrap();
                    tree.insert(ival);
                    model_size += 1;
                }
                Op::EraseFirst => {
                    let id = tree.iter().node();
                    if let Some(id) = id {
                        tree.erase(Some(id)).unwrap();
                        model_size -= 1;
                    }
                }
                Op::EraseLast => {
                    let id = tree.iter_rev().node();
                    if let Some(id) = id {
                        tree.erase(Some(id)).unwrap();
                        model_size -= 1;
                    }
                }
            }
            assert_eq!(tree.size(), model_size);
            assert_invariants(&tree);
        }
    }

    #[test]
    fn deoverlap_never_leaves_overlapping_intervals(
        segments in prop::collection::vec((any::<i8>(), any::<u8>()), 0..60)
    ) {
        let mut tree = Tree::new();
        for (low, width) in segments {
            let low = low as i32;
            let high = low + width as i32 + 1;
            tree.insert(Interval::new(low, high, IntervalKind::Closed).unwrap());
        }
        tree.deoverlap();
        assert_invariants(&tree);

        let ivals: Vec<_> = tree.iter().collect();
        for pair in ivals.windows(2) {
            assert!(!pair[0].overlaps(&pair[1]), "deoverlap left overlapping neighbors: {:?}, {:?}", pair[0], pair[1]);
        }
    }
}
