//! In-order traversal cursors over an [`IntervalTree`].
//!
//! Four flavors arise from {read-only, mutable} x {forward, reverse}: [`Iter`]/[`IterMut`] each
//! parameterized by a `REVERSE` const generic. All four are forward-iterator-category: even the
//! reverse flavors only ever step via `next()`, just walking the tree highest-to-lowest.
//!
//! An iterator is a non-owning `(tree, node)` pair; the node half becomes `None` at `end`/`rend`.
//! Navigating structurally (`parent`/`left`/`right`) from a live node that simply has no such
//! neighbor yields an iterator equal to `end()`; navigating from `end()` itself, or dereferencing
//! it, fails with [`Error::OutOfRange`]. Erasing the node an iterator points at invalidates that
//! iterator; every other iterator remains valid.

use crate::interval_tree::arena::NodeId;
use crate::interval_tree::bound::Bound;
use crate::interval_tree::error::{Error, Result};
use crate::interval_tree::hooks::TreeHooks;
use crate::interval_tree::interval::Interval;
use crate::interval_tree::node::Color;
use crate::interval_tree::tree::IntervalTree;

fn leftmost<V: Bound, H: TreeHooks<V>>(tree: &IntervalTree<V, H>, mut node: NodeId) -> NodeId {
    while let Some(left) = tree.node(node).left() {
        node = left;
    }
    node
}

fn rightmost<V: Bound, H: TreeHooks<V>>(tree: &IntervalTree<V, H>, mut node: NodeId) -> NodeId {
    while let Some(right) = tree.node(node).right() {
        node = right;
    }
    node
}

/// Standard in-order successor: right-then-leftmost, or the nearest ancestor we're a left
/// descendant of.
fn step_forward<V: Bound, H: TreeHooks<V>>(tree: &IntervalTree<V, H>, node: NodeId) -> Option<NodeId> {
    if let Some(right) = tree.node(node).right() {
        return Some(leftmost(tree, right));
    }
    let mut current = node;
    let mut parent = tree.node(current).parent();
    while let Some(p) = parent {
        if tree.node(p).left() == Some(current) {
            return Some(p);
        }
        current = p;
        parent = tree.node(p).parent();
    }
    None
}

/// Mirror of [`step_forward`]: left-then-rightmost, or the nearest ancestor we're a right
/// descendant of.
fn step_reverse<V: Bound, H: TreeHooks<V>>(tree: &IntervalTree<V, H>, node: NodeId) -> Option<NodeId> {
    if let Some(left) = tree.node(node).left() {
        return Some(rightmost(tree, left));
    }
    let mut current = node;
    let mut parent = tree.node(current).parent();
    while let Some(p) = parent {
        if tree.node(p).right() == Some(current) {
            return Some(p);
        }
        current = p;
        parent = tree.node(p).parent();
    }
    None
}

pub(crate) fn begin<V: Bound, H: TreeHooks<V>>(tree: &IntervalTree<V, H>) -> Option<NodeId> {
    tree.root_id().map(|root| leftmost(tree, root))
}

pub(crate) fn rbegin<V: Bound, H: TreeHooks<V>>(tree: &IntervalTree<V, H>) -> Option<NodeId> {
    tree.root_id().map(|root| rightmost(tree, root))
}

/// A read-only in-order cursor. `REVERSE = false` yields ascending `low`; `REVERSE = true`
/// descends.
pub struct Iter<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> {
    tree: &'a IntervalTree<V, H>,
    current: Option<NodeId>,
}

impl<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> Clone for Iter<'a, V, H, REVERSE> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> Copy for Iter<'a, V, H, REVERSE> {}

impl<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> PartialEq for Iter<'a, V, H, REVERSE> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}
impl<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> Eq for Iter<'a, V, H, REVERSE> {}

impl<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> Iter<'a, V, H, REVERSE> {
    pub(crate) fn new(tree: &'a IntervalTree<V, H>, current: Option<NodeId>) -> Self {
        Self { tree, current }
    }

    /// Returns the sentinel iterator (`end`/`rend`, per `REVERSE`).
    pub fn end(tree: &'a IntervalTree<V, H>) -> Self {
        Self { tree, current: None }
    }

    pub(crate) fn node_id(&self) -> Option<NodeId> {
        self.current
    }

    /// Dereferences to the interval stored at this position.
    pub fn interval(&self) -> Result<Interval<V>> {
        self.current.map(|id| *self.tree.node(id).interval()).ok_or(Error::OutOfRange)
    }

    /// The cached subtree max at this position.
    pub fn max(&self) -> Result<V> {
        self.current.map(|id| self.tree.node(id).max()).ok_or(Error::OutOfRange)
    }

    /// The color of the node at this position.
    pub fn color(&self) -> Result<Color> {
        self.current.map(|id| self.tree.node(id).color()).ok_or(Error::OutOfRange)
    }

    /// The underlying node id, or `None` at `end`.
    pub fn node(&self) -> Option<NodeId> {
        self.current
    }

    /// Whether this position has no parent. Fails if called from `end()`.
    pub fn is_root(&self) -> Result<bool> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(self.tree.node(id).is_root())
    }

    /// Whether this position is its parent's left child. `false` at the root. Fails if called from
    /// `end()`.
    pub fn is_left(&self) -> Result<bool> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(self.tree.node(id).parent().map(|p| self.tree.node(p).left() == Some(id)).unwrap_or(false))
    }

    /// Whether this position is its parent's right child. `false` at the root. Fails if called
    /// from `end()`.
    pub fn is_right(&self) -> Result<bool> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(self.tree.node(id).parent().map(|p| self.tree.node(p).right() == Some(id)).unwrap_or(false))
    }

    /// The number of steps up to the root (`0` at the root itself). Fails if called from `end()`.
    pub fn height(&self) -> Result<usize> {
        let mut id = self.current.ok_or(Error::OutOfRange)?;
        let mut steps = 0;
        while let Some(p) = self.tree.node(id).parent() {
            steps += 1;
            id = p;
        }
        Ok(steps)
    }

    /// Moves to the parent; `end()` if this is the root. Fails if called from `end()`.
    pub fn parent(&self) -> Result<Self> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(Self { tree: self.tree, current: self.tree.node(id).parent() })
    }

    /// Moves to the left child; `end()` if there is none. Fails if called from `end()`.
    pub fn left(&self) -> Result<Self> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(Self { tree: self.tree, current: self.tree.node(id).left() })
    }

    /// Moves to the right child; `end()` if there is none. Fails if called from `end()`.
    pub fn right(&self) -> Result<Self> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(Self { tree: self.tree, current: self.tree.node(id).right() })
    }
}

impl<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> Iterator for Iter<'a, V, H, REVERSE> {
    type Item = Interval<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let item = *self.tree.node(id).interval();
        self.current = if REVERSE { step_reverse(self.tree, id) } else { step_forward(self.tree, id) };
        Some(item)
    }
}

/// A mutation-capable in-order cursor, distinguished from [`Iter`] only by holding an exclusive
/// tree borrow (so further tree-mutating calls can be chained through it); navigation therefore
/// consumes `self` rather than borrowing it, since `&mut IntervalTree` cannot be copied.
pub struct IterMut<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> {
    tree: &'a mut IntervalTree<V, H>,
    current: Option<NodeId>,
}

impl<'a, V: Bound, H: TreeHooks<V>, const REVERSE: bool> IterMut<'a, V, H, REVERSE> {
    pub(crate) fn new(tree: &'a mut IntervalTree<V, H>, current: Option<NodeId>) -> Self {
        Self { tree, current }
    }

    pub(crate) fn node_id(&self) -> Option<NodeId> {
        self.current
    }

    pub fn interval(&self) -> Result<Interval<V>> {
        self.current.map(|id| *self.tree.node(id).interval()).ok_or(Error::OutOfRange)
    }

    pub fn max(&self) -> Result<V> {
        self.current.map(|id| self.tree.node(id).max()).ok_or(Error::OutOfRange)
    }

    pub fn color(&self) -> Result<Color> {
        self.current.map(|id| self.tree.node(id).color()).ok_or(Error::OutOfRange)
    }

    pub fn node(&self) -> Option<NodeId> {
        self.current
    }

    /// Whether this position has no parent. Fails if called from `end()`.
    pub fn is_root(&self) -> Result<bool> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(self.tree.node(id).is_root())
    }

    /// Whether this position is its parent's left child. `false` at the root. Fails if called from
    /// `end()`.
    pub fn is_left(&self) -> Result<bool> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(self.tree.node(id).parent().map(|p| self.tree.node(p).left() == Some(id)).unwrap_or(false))
    }

    /// Whether this position is its parent's right child. `false` at the root. Fails if called
    /// from `end()`.
    pub fn is_right(&self) -> Result<bool> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        Ok(self.tree.node(id).parent().map(|p| self.tree.node(p).right() == Some(id)).unwrap_or(false))
    }

    /// The number of steps up to the root (`0` at the root itself). Fails if called from `end()`.
    pub fn height(&self) -> Result<usize> {
        let mut id = self.current.ok_or(Error::OutOfRange)?;
        let mut steps = 0;
        while let Some(p) = self.tree.node(id).parent() {
            steps += 1;
            id = p;
        }
        Ok(steps)
    }

    pub fn parent(self) -> Result<Self> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        let next = self.tree.node(id).parent();
        Ok(Self { tree: self.tree, current: next })
    }

    pub fn left(self) -> Result<Self> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        let next = self.tree.node(id).left();
        Ok(Self { tree: self.tree, current: next })
    }

    pub fn right(self) -> Result<Self> {
        let id = self.current.ok_or(Error::OutOfRange)?;
        let next = self.tree.node(id).right();
        Ok(Self { tree: self.tree, current: next })
    }

    /// Advances and returns the next item, consuming this cursor (mirrors `Iterator::next` without
    /// requiring `&mut self`, since moving forward may need to re-borrow `tree` mutably).
    pub fn step(mut self) -> (Option<Interval<V>>, Self) {
        match self.current {
            None => (None, self),
            Some(id) => {
                let item = *self.tree.node(id).interval();
                self.current = if REVERSE { step_reverse(self.tree, id) } else { step_forward(self.tree, id) };
                (Some(item), self)
            }
        }
    }
}
