//! Storage for a single interval plus its red-black/augmentation bookkeeping.

use crate::interval_tree::arena::NodeId;
use crate::interval_tree::bound::Bound;
use crate::interval_tree::interval::Interval;

/// The color of a red-black tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// One node of the tree: an interval, the cached subtree max, its color, and links to its
/// parent/children by [`NodeId`]. Linkage is mutated only by [`crate::interval_tree::tree::IntervalTree`];
/// nodes do not manage their own structure.
pub struct Node<V: Bound> {
    interval: Interval<V>,
    max: V,
    color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<V: Bound> Node<V> {
    pub fn new(interval: Interval<V>, color: Color, parent: Option<NodeId>) -> Self {
        let max = interval.high();
        Self { interval, max, color, parent, left: None, right: None }
    }

    pub fn interval(&self) -> &Interval<V> {
        &self.interval
    }

    /// Whether this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn set_interval(&mut self, interval: Interval<V>) {
        self.interval = interval;
    }

    pub fn max(&self) -> V {
        self.max
    }

    pub fn set_max(&mut self, max: V) {
        self.max = max;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn set_left(&mut self, left: Option<NodeId>) {
        self.left = left;
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub fn set_right(&mut self, right: Option<NodeId>) {
        self.right = right;
    }
}
