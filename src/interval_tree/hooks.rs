//! Observer hooks: optional callbacks fired at well-defined mutation/search points.
//!
//! Hooks must not mutate the tree they are attached to; doing so from within a callback is
//! undefined behavior for the tree's invariants. [`NoopHooks`] is the default, zero-cost hook set.

use crate::interval_tree::arena::NodeId;
use crate::interval_tree::bound::Bound;
use crate::interval_tree::interval::Interval;
use crate::interval_tree::tree::IntervalTree;

/// Observer callbacks fired by [`IntervalTree`] at designated points in its mutating and
/// searching operations. All methods default to doing nothing, so implementers only override the
/// events they care about.
#[allow(unused_variables)]
pub trait TreeHooks<V: Bound>: Sized {
    /// Fired once, as the tree is dropped (before its nodes are released).
    fn on_destroy(tree: &IntervalTree<V, Self>) {}

    /// Fired after `insert` links the new node in and completes its fixup/augmentation.
    fn on_after_insert(tree: &IntervalTree<V, Self>, node: NodeId) {}

    fn on_before_insert_fixup(tree: &IntervalTree<V, Self>, node: NodeId) {}
    fn on_after_insert_fixup(tree: &IntervalTree<V, Self>, node: NodeId) {}

    /// `other_is_left_child` is whether the erased node's replacement hangs off its parent's left.
    fn on_before_erase_fixup(
        tree: &IntervalTree<V, Self>,
        node: Option<NodeId>,
        node_parent: Option<NodeId>,
        other_is_left_child: bool,
    ) {
    }
    fn on_after_erase_fixup(
        tree: &IntervalTree<V, Self>,
        node: Option<NodeId>,
        node_parent: Option<NodeId>,
        other_is_left_child: bool,
    ) {
    }

    fn on_before_recalculate_max(tree: &IntervalTree<V, Self>, node: NodeId) {}
    fn on_after_recalculate_max(tree: &IntervalTree<V, Self>, node: NodeId) {}

    /// Fired at every node visited while [`IntervalTree::find_by`] descends. `compare` is the
    /// caller-supplied match criterion for this call.
    fn on_find(
        tree: &IntervalTree<V, Self>,
        node: NodeId,
        ival: &Interval<V>,
        compare: &dyn Fn(&Interval<V>, &Interval<V>) -> bool,
    ) {
    }
    /// Fired at every node visited while [`IntervalTree::find_all_by`] descends. `compare` is the
    /// caller-supplied match criterion for this call.
    fn on_find_all(
        tree: &IntervalTree<V, Self>,
        node: NodeId,
        ival: &Interval<V>,
        compare: &dyn Fn(&Interval<V>, &Interval<V>) -> bool,
    ) {
    }
    /// Fired at every node visited while [`IntervalTree::overlap_find`] descends.
    fn on_overlap_find(tree: &IntervalTree<V, Self>, node: NodeId, ival: &Interval<V>) {}
    /// Fired at every node visited while [`IntervalTree::overlap_find_all`] descends.
    fn on_overlap_find_all(tree: &IntervalTree<V, Self>, node: NodeId, ival: &Interval<V>) {}
}

/// The default, no-op hook set.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl<V: Bound> TreeHooks<V> for NoopHooks {}
