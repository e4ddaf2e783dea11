//! The balanced interval tree itself: BST-on-low-endpoint, red-black rebalanced, augmented with a
//! per-subtree `max` of the highest `high` it contains.
//!
//! Ported from the classic CLRS left/right rotation and insert/erase fixups, adapted to operate
//! over [`NodeId`] indices into an [`Arena`] instead of raw/owning pointers. A `None` child or
//! parent plays the role of a red-black tree's sentinel `nil`: always colored [`Color::Black`].

use std::marker::PhantomData;

use crate::interval_tree::arena::{Arena, NodeId};
use crate::interval_tree::bound::Bound;
use crate::interval_tree::error::{Error, Result};
use crate::interval_tree::hooks::{NoopHooks, TreeHooks};
use crate::interval_tree::interval::Interval;
use crate::interval_tree::iter::{self, Iter, IterMut};
use crate::interval_tree::kind::IntervalKind;
use crate::interval_tree::node::{Color, Node};

/// An augmented red-black tree of intervals, generic over the value domain `V` and an optional
/// observer hook set `H`.
///
/// Equal-`low` intervals are ordered stably: new entries with a `low` equal to an existing node's
/// descend to the right, so in-order traversal preserves insertion order among ties.
pub struct IntervalTree<V: Bound, H: TreeHooks<V> = NoopHooks> {
    arena: Arena<V>,
    root: Option<NodeId>,
    size: usize,
    hooks: PhantomData<H>,
}

impl<V: Bound, H: TreeHooks<V>> Default for IntervalTree<V, H> {
    fn default() -> Self {
        Self { arena: Arena::new(), root: None, size: 0, hooks: PhantomData }
    }
}

impl<V: Bound, H: TreeHooks<V>> Drop for IntervalTree<V, H> {
    fn drop(&mut self) {
        H::on_destroy(self);
    }
}

fn color_of<V: Bound, H: TreeHooks<V>>(tree: &IntervalTree<V, H>, id: Option<NodeId>) -> Color {
    id.map(|id| tree.node(id).color()).unwrap_or(Color::Black)
}

impl<V: Bound, H: TreeHooks<V>> IntervalTree<V, H> {
    /// Constructs an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of intervals stored.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Releases every node, leaving the tree empty.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
        self.size = 0;
    }

    pub(crate) fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<V> {
        self.arena.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        self.arena.get_mut(id)
    }

    fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left()
    }

    fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right()
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    fn max_of(&self, id: NodeId) -> V {
        self.node(id).max()
    }

    fn interval_of(&self, id: NodeId) -> Interval<V> {
        *self.node(id).interval()
    }

    fn is_left_child(&self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(p) => self.left(p) == Some(id),
            None => false,
        }
    }

    // -- cursor access ----------------------------------------------------

    pub fn iter(&self) -> Iter<'_, V, H, false> {
        Iter::new(self, iter::begin(self))
    }

    pub fn iter_rev(&self) -> Iter<'_, V, H, true> {
        Iter::new(self, iter::rbegin(self))
    }

    pub fn end(&self) -> Iter<'_, V, H, false> {
        Iter::end(self)
    }

    /// A cursor positioned at the root, or `end()` if the tree is empty.
    pub fn root(&self) -> Iter<'_, V, H, false> {
        Iter::new(self, self.root)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, V, H, false> {
        let start = iter::begin(self);
        IterMut::new(self, start)
    }

    pub fn iter_rev_mut(&mut self) -> IterMut<'_, V, H, true> {
        let start = iter::rbegin(self);
        IterMut::new(self, start)
    }

    /// Returns a cursor positioned at `id`, or at `end` if `id` is `None`.
    pub fn at(&self, id: Option<NodeId>) -> Iter<'_, V, H, false> {
        Iter::new(self, id)
    }

    pub fn at_mut(&mut self, id: Option<NodeId>) -> IterMut<'_, V, H, false> {
        IterMut::new(self, id)
    }

    // -- rotations and augmentation ---------------------------------------

    fn recompute_local_max(&mut self, id: NodeId) -> V {
        let mut m = self.interval_of(id).high();
        if let Some(l) = self.left(id) {
            let v = self.max_of(l);
            if v > m {
                m = v;
            }
        }
        if let Some(r) = self.right(id) {
            let v = self.max_of(r);
            if v > m {
                m = v;
            }
        }
        m
    }

    fn left_rotate(&mut self, x: NodeId) {
        let y = self.right(x).expect("left_rotate requires a right child");
        let y_left = self.left(y);
        self.node_mut(x).set_right(y_left);
        if let Some(yl) = y_left {
            self.node_mut(yl).set_parent(Some(x));
        }

        let x_parent = self.parent(x);
        self.node_mut(y).set_parent(x_parent);
        match x_parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.left(p) == Some(x) {
                    self.node_mut(p).set_left(Some(y));
                } else {
                    self.node_mut(p).set_right(Some(y));
                }
            }
        }

        self.node_mut(y).set_left(Some(x));
        self.node_mut(x).set_parent(Some(y));

        let x_max = self.recompute_local_max(x);
        self.node_mut(x).set_max(x_max);

        let mut y_max = self.interval_of(y).high();
        if x_max > y_max {
            y_max = x_max;
        }
        if let Some(yr) = self.right(y) {
            let v = self.max_of(yr);
            if v > y_max {
                y_max = v;
            }
        }
        self.node_mut(y).set_max(y_max);
    }

    fn right_rotate(&mut self, y: NodeId) {
        let x = self.left(y).expect("right_rotate requires a left child");
        let x_right = self.right(x);
        self.node_mut(y).set_left(x_right);
        if let Some(xr) = x_right {
            self.node_mut(xr).set_parent(Some(y));
        }

        let y_parent = self.parent(y);
        self.node_mut(x).set_parent(y_parent);
        match y_parent {
            None => self.root = Some(x),
            Some(p) => {
                if self.left(p) == Some(y) {
                    self.node_mut(p).set_left(Some(x));
                } else {
                    self.node_mut(p).set_right(Some(x));
                }
            }
        }

        self.node_mut(x).set_right(Some(y));
        self.node_mut(y).set_parent(Some(x));

        let y_max = self.recompute_local_max(y);
        self.node_mut(y).set_max(y_max);

        let mut x_max = self.interval_of(x).high();
        if y_max > x_max {
            x_max = y_max;
        }
        if let Some(xl) = self.left(x) {
            let v = self.max_of(xl);
            if v > x_max {
                x_max = v;
            }
        }
        self.node_mut(x).set_max(x_max);
    }

    /// Propagates a possible `max` increase from `start` up to the root. Early-exits once an
    /// ancestor's existing `max` already dominates, since only increases are being chased here
    /// (an insertion can only ever raise a subtree's max, never lower it).
    fn recalculate_max(&mut self, start: NodeId) {
        H::on_before_recalculate_max(self, start);

        let mut root_max = self.max_of(start);
        let mut current = Some(start);
        while let Some(id) = current {
            if self.max_of(id) > root_max {
                break;
            }
            let m = self.recompute_local_max(id);
            self.node_mut(id).set_max(m);
            if id == start {
                root_max = m;
            }
            current = self.parent(id);
        }

        H::on_after_recalculate_max(self, start);
    }

    /// Fully recomputes `max` from `start` up to the root, without early-exit. Used after `erase`,
    /// where removing a node can only ever shrink a subtree's max, so an increase-only early exit
    /// would miss the shrink.
    fn recompute_max_upward(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            let m = self.recompute_local_max(id);
            self.node_mut(id).set_max(m);
            current = self.parent(id);
        }
    }

    // -- insert -------------------------------------------------------------

    /// Inserts `ival`, returning the id of the newly created node.
    pub fn insert(&mut self, ival: Interval<V>) -> NodeId {
        let mut parent = None;
        let mut cursor = self.root;
        while let Some(id) = cursor {
            parent = Some(id);
            cursor = if ival.low() < self.interval_of(id).low() { self.left(id) } else { self.right(id) };
        }

        let node = Node::new(ival, Color::Red, parent);
        let z = self.arena.insert(node);

        match parent {
            None => self.root = Some(z),
            Some(p) => {
                if ival.low() < self.interval_of(p).low() {
                    self.node_mut(p).set_left(Some(z));
                } else {
                    self.node_mut(p).set_right(Some(z));
                }
            }
        }

        self.insert_fixup(z);
        self.recalculate_max(z);
        self.size += 1;

        H::on_after_insert(self, z);
        z
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        H::on_before_insert_fixup(self, z);

        while let Some(p) = self.parent(z) {
            if self.node(p).color() != Color::Red {
                break;
            }
            let Some(grandparent) = self.parent(p) else { break };

            if self.left(grandparent) == Some(p) {
                let uncle = self.right(grandparent);
                if color_of(self, uncle) == Color::Red {
                    self.node_mut(p).set_color(Color::Black);
                    self.node_mut(uncle.unwrap()).set_color(Color::Black);
                    self.node_mut(grandparent).set_color(Color::Red);
                    z = grandparent;
                } else {
                    if self.right(p) == Some(z) {
                        z = p;
                        self.left_rotate(z);
                    }
                    let p = self.parent(z).unwrap();
                    let gp = self.parent(p).unwrap();
                    self.node_mut(p).set_color(Color::Black);
                    self.node_mut(gp).set_color(Color::Red);
                    self.right_rotate(gp);
                }
            } else {
                let uncle = self.left(grandparent);
                if color_of(self, uncle) == Color::Red {
                    self.node_mut(p).set_color(Color::Black);
                    self.node_mut(uncle.unwrap()).set_color(Color::Black);
                    self.node_mut(grandparent).set_color(Color::Red);
                    z = grandparent;
                } else {
                    if self.is_left_child(z) {
                        z = p;
                        self.right_rotate(z);
                    }
                    let p = self.parent(z).unwrap();
                    let gp = self.parent(p).unwrap();
                    self.node_mut(p).set_color(Color::Black);
                    self.node_mut(gp).set_color(Color::Red);
                    self.left_rotate(gp);
                }
            }
        }

        if let Some(root) = self.root {
            self.node_mut(root).set_color(Color::Black);
        }

        H::on_after_insert_fixup(self, z);
    }

    /// Locates any interval overlapping `ival`; if none exists, inserts it outright. Otherwise
    /// joins the overlapping entry with `ival`, erases it, and reinserts each piece of the join
    /// (recursively merging further overlaps when `recurse` is set).
    ///
    /// Returns the id of the last interval inserted, or `None` if the join produced no pieces.
    pub fn insert_overlap(&mut self, ival: Interval<V>, exclusive: bool, recurse: bool) -> Option<NodeId> {
        let hit = self.overlap_find(&ival, exclusive);
        let Some(hit) = hit else {
            return Some(self.insert(ival));
        };

        let merged = self.interval_of(hit).join(&ival);
        self.erase(Some(hit)).expect("overlap_find returned a live node");

        let mut last = None;
        for piece in merged {
            last = if recurse {
                self.insert_overlap(piece, exclusive, true)
            } else {
                Some(self.insert(piece))
            };
        }
        last
    }

    // -- erase ----------------------------------------------------------

    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(r) = self.right(id) {
            let mut cur = r;
            while let Some(l) = self.left(cur) {
                cur = l;
            }
            return Some(cur);
        }
        let mut node = id;
        let mut y = self.parent(node);
        while let Some(p) = y {
            if self.right(p) != Some(node) {
                break;
            }
            node = p;
            y = self.parent(p);
        }
        y
    }

    /// Removes the node at `at`, returning the id of its in-order successor (the "next" position),
    /// or `Ok(None)` if none remains. Fails with [`Error::OutOfRange`] if `at` is `None`.
    pub fn erase(&mut self, at: Option<NodeId>) -> Result<Option<NodeId>> {
        let target = at.ok_or(Error::OutOfRange)?;

        let next = if self.left(target).is_none() || self.right(target).is_none() {
            self.successor(target)
        } else {
            Some(target)
        };

        let y = if self.left(target).is_some() && self.right(target).is_some() {
            self.successor(target).expect("node with two children has a successor")
        } else {
            target
        };

        let x = self.left(y).or_else(|| self.right(y));
        let y_parent = self.parent(y);

        if let Some(x) = x {
            self.node_mut(x).set_parent(y_parent);
        }

        let y_was_left = self.is_left_child(y);
        match y_parent {
            None => self.root = x,
            Some(p) => {
                if y_was_left {
                    self.node_mut(p).set_left(x);
                } else {
                    self.node_mut(p).set_right(x);
                }
            }
        }

        if y != target {
            let y_interval = self.interval_of(y);
            self.node_mut(target).set_interval(y_interval);
        }

        let y_color = self.node(y).color();
        self.arena.remove(y);
        self.size -= 1;

        if y_color == Color::Black {
            H::on_before_erase_fixup(self, x, y_parent, y_was_left);
            self.erase_fixup(x, y_parent, y_was_left);
            H::on_after_erase_fixup(self, x, y_parent, y_was_left);
        }

        let recompute_from = if y != target { Some(target) } else { y_parent };
        self.recompute_max_upward(recompute_from);

        Ok(next)
    }

    fn erase_fixup(&mut self, mut x: Option<NodeId>, mut x_parent: Option<NodeId>, mut y_is_left: bool) {
        while x != self.root && color_of(self, x) == Color::Black {
            let Some(xp) = x_parent else { break };

            if y_is_left {
                let mut w = self.right(xp).expect("sibling must exist for a black node with a black leaf side");
                if self.node(w).color() == Color::Red {
                    self.node_mut(w).set_color(Color::Black);
                    self.node_mut(xp).set_color(Color::Red);
                    self.left_rotate(xp);
                    w = self.right(xp).unwrap();
                }

                if color_of(self, self.left(w)) == Color::Black && color_of(self, self.right(w)) == Color::Black {
                    self.node_mut(w).set_color(Color::Red);
                    x = Some(xp);
                    x_parent = self.parent(xp);
                    y_is_left = x_parent.map(|p| self.left(p) == x).unwrap_or(false);
                } else {
                    if color_of(self, self.right(w)) == Color::Black {
                        if let Some(wl) = self.left(w) {
                            self.node_mut(wl).set_color(Color::Black);
                        }
                        self.node_mut(w).set_color(Color::Red);
                        self.right_rotate(w);
                        w = self.right(xp).unwrap();
                    }

                    self.node_mut(w).set_color(self.node(xp).color());
                    self.node_mut(xp).set_color(Color::Black);
                    if let Some(wr) = self.right(w) {
                        self.node_mut(wr).set_color(Color::Black);
                    }

                    self.left_rotate(xp);
                    x = self.root;
                    x_parent = None;
                }
            } else {
                let mut w = self.left(xp).expect("sibling must exist for a black node with a black leaf side");
                if self.node(w).color() == Color::Red {
                    self.node_mut(w).set_color(Color::Black);
                    self.node_mut(xp).set_color(Color::Red);
                    self.right_rotate(xp);
                    w = self.left(xp).unwrap();
                }

                if color_of(self, self.right(w)) == Color::Black && color_of(self, self.left(w)) == Color::Black {
                    self.node_mut(w).set_color(Color::Red);
                    x = Some(xp);
                    x_parent = self.parent(xp);
                    y_is_left = x_parent.map(|p| self.left(p) == x).unwrap_or(false);
                } else {
                    if color_of(self, self.left(w)) == Color::Black {
                        if let Some(wr) = self.right(w) {
                            self.node_mut(wr).set_color(Color::Black);
                        }
                        self.node_mut(w).set_color(Color::Red);
                        self.left_rotate(w);
                        w = self.left(xp).unwrap();
                    }

                    self.node_mut(w).set_color(self.node(xp).color());
                    self.node_mut(xp).set_color(Color::Black);
                    if let Some(wl) = self.left(w) {
                        self.node_mut(wl).set_color(Color::Black);
                    }

                    self.right_rotate(xp);
                    x = self.root;
                    x_parent = None;
                }
            }
        }

        if let Some(x) = x {
            self.node_mut(x).set_color(Color::Black);
        }
    }

    // -- find -------------------------------------------------------------

    /// Finds the first interval structurally equal to `ival`.
    pub fn find(&self, ival: &Interval<V>) -> Option<NodeId> {
        self.find_by(ival, |a, b| a == b)
    }

    /// Finds the first interval matching `ival` per `cmp`, pruning subtrees the max-augmentation
    /// rule rules out.
    pub fn find_by(&self, ival: &Interval<V>, cmp: impl Fn(&Interval<V>, &Interval<V>) -> bool + Copy) -> Option<NodeId> {
        let root = self.root?;
        self.find_i(root, ival, cmp)
    }

    fn find_i(&self, ptr: NodeId, ival: &Interval<V>, cmp: impl Fn(&Interval<V>, &Interval<V>) -> bool + Copy) -> Option<NodeId> {
        H::on_find(self, ptr, ival, &cmp);
        let here = self.interval_of(ptr);
        if cmp(&here, ival) {
            return Some(ptr);
        }
        self.find_i_ex(ptr, ival, cmp)
    }

    fn find_i_ex(&self, ptr: NodeId, ival: &Interval<V>, cmp: impl Fn(&Interval<V>, &Interval<V>) -> bool + Copy) -> Option<NodeId> {
        if let Some(l) = self.left(ptr) {
            if ival.high() <= self.max_of(l) {
                let right_viable = self.right(ptr).map(|r| ival.low() <= self.max_of(r)).unwrap_or(false);
                if !right_viable {
                    return self.find_i(l, ival, cmp);
                }
                if let Some(found) = self.find_i(l, ival, cmp) {
                    return Some(found);
                }
            }
        }
        if let Some(r) = self.right(ptr) {
            if ival.high() <= self.max_of(r) {
                let left_viable = self.left(ptr).map(|l| ival.low() <= self.max_of(l)).unwrap_or(false);
                if !left_viable {
                    return self.find_i(r, ival, cmp);
                }
                if let Some(found) = self.find_i(r, ival, cmp) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Finds the next interval structurally equal to `ival`, reachable from `from` and excluding
    /// `from` itself.
    pub fn find_next_in_subtree(&self, from: NodeId, ival: &Interval<V>) -> Option<NodeId> {
        self.find_next_in_subtree_by(from, ival, |a, b| a == b)
    }

    /// Finds the next exact match reachable from `from`, excluding `from` itself.
    pub fn find_next_in_subtree_by(
        &self,
        from: NodeId,
        ival: &Interval<V>,
        cmp: impl Fn(&Interval<V>, &Interval<V>) -> bool + Copy,
    ) -> Option<NodeId> {
        self.find_i_ex(from, ival, cmp)
    }

    /// Visits every node structurally equal to `ival`, in the max-pruned traversal order, until
    /// `visitor` returns `false` or every match has been visited.
    pub fn find_all(&self, ival: &Interval<V>, visitor: &mut impl FnMut(NodeId) -> bool) {
        self.find_all_by(ival, |a, b| a == b, visitor)
    }

    /// Visits every node matching `ival` per `cmp`, in the max-pruned traversal order, until
    /// `visitor` returns `false` or every match has been visited.
    pub fn find_all_by(
        &self,
        ival: &Interval<V>,
        cmp: impl Fn(&Interval<V>, &Interval<V>) -> bool + Copy,
        visitor: &mut impl FnMut(NodeId) -> bool,
    ) {
        if let Some(root) = self.root {
            self.find_all_i(root, ival, cmp, visitor);
        }
    }

    fn find_all_i(
        &self,
        ptr: NodeId,
        ival: &Interval<V>,
        cmp: impl Fn(&Interval<V>, &Interval<V>) -> bool + Copy,
        visitor: &mut impl FnMut(NodeId) -> bool,
    ) -> bool {
        H::on_find_all(self, ptr, ival, &cmp);
        let here = self.interval_of(ptr);
        if cmp(&here, ival) && !visitor(ptr) {
            return false;
        }
        if let Some(l) = self.left(ptr) {
            if ival.high() <= self.max_of(l) {
                let right_viable = self.right(ptr).map(|r| ival.low() <= self.max_of(r)).unwrap_or(false);
                if !right_viable {
                    return self.find_all_i(l, ival, cmp, visitor);
                }
                if !self.find_all_i(l, ival, cmp, visitor) {
                    return false;
                }
            }
        }
        if let Some(r) = self.right(ptr) {
            if ival.high() <= self.max_of(r) {
                let left_viable = self.left(ptr).map(|l| ival.low() <= self.max_of(l)).unwrap_or(false);
                if !left_viable {
                    return self.find_all_i(r, ival, cmp, visitor);
                }
                if !self.find_all_i(r, ival, cmp, visitor) {
                    return false;
                }
            }
        }
        true
    }

    // -- overlap find -------------------------------------------------------

    /// Finds the first interval overlapping `ival` (strict when `exclusive` is set).
    pub fn overlap_find(&self, ival: &Interval<V>, exclusive: bool) -> Option<NodeId> {
        let root = self.root?;
        self.overlap_find_i(root, ival, exclusive)
    }

    fn matches_overlap(&self, ptr: NodeId, ival: &Interval<V>, exclusive: bool) -> bool {
        let here = self.interval_of(ptr);
        if exclusive { here.overlaps_exclusive(ival) } else { here.overlaps(ival) }
    }

    fn overlap_find_i(&self, ptr: NodeId, ival: &Interval<V>, exclusive: bool) -> Option<NodeId> {
        H::on_overlap_find(self, ptr, ival);
        if self.matches_overlap(ptr, ival, exclusive) {
            return Some(ptr);
        }
        self.overlap_find_i_ex(ptr, ival, exclusive)
    }

    fn overlap_find_i_ex(&self, ptr: NodeId, ival: &Interval<V>, exclusive: bool) -> Option<NodeId> {
        if let Some(l) = self.left(ptr) {
            if self.max_of(l) >= ival.low() {
                let right_viable = self.right(ptr).map(|r| ival.low() <= self.max_of(r)).unwrap_or(false);
                if !right_viable {
                    return self.overlap_find_i(l, ival, exclusive);
                }
                if let Some(found) = self.overlap_find_i(l, ival, exclusive) {
                    return Some(found);
                }
            }
        }
        if let Some(r) = self.right(ptr) {
            if self.max_of(r) >= ival.low() {
                let left_viable = self.left(ptr).map(|l| ival.low() <= self.max_of(l)).unwrap_or(false);
                if !left_viable {
                    return self.overlap_find_i(r, ival, exclusive);
                }
                if let Some(found) = self.overlap_find_i(r, ival, exclusive) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn overlap_find_next_in_subtree(&self, from: NodeId, ival: &Interval<V>, exclusive: bool) -> Option<NodeId> {
        self.overlap_find_i_ex(from, ival, exclusive)
    }

    /// Visits every interval overlapping `ival`, until `visitor` returns `false` or every overlap
    /// has been visited exactly once.
    pub fn overlap_find_all(&self, ival: &Interval<V>, exclusive: bool, visitor: &mut impl FnMut(NodeId) -> bool) {
        if let Some(root) = self.root {
            self.overlap_find_all_i(root, ival, exclusive, visitor);
        }
    }

    fn overlap_find_all_i(
        &self,
        ptr: NodeId,
        ival: &Interval<V>,
        exclusive: bool,
        visitor: &mut impl FnMut(NodeId) -> bool,
    ) -> bool {
        H::on_overlap_find_all(self, ptr, ival);
        if self.matches_overlap(ptr, ival, exclusive) && !visitor(ptr) {
            return false;
        }
        if let Some(l) = self.left(ptr) {
            if self.max_of(l) >= ival.low() {
                let right_viable = self.right(ptr).map(|r| ival.low() <= self.max_of(r)).unwrap_or(false);
                if !right_viable {
                    return self.overlap_find_all_i(l, ival, exclusive, visitor);
                }
                if !self.overlap_find_all_i(l, ival, exclusive, visitor) {
                    return false;
                }
            }
        }
        if let Some(r) = self.right(ptr) {
            if self.max_of(r) >= ival.low() {
                let left_viable = self.left(ptr).map(|l| ival.low() <= self.max_of(l)).unwrap_or(false);
                if !left_viable {
                    return self.overlap_find_all_i(r, ival, exclusive, visitor);
                }
                if !self.overlap_find_all_i(r, ival, exclusive, visitor) {
                    return false;
                }
            }
        }
        true
    }

    // -- deoverlap / punch / erase_range -------------------------------------

    /// Rebuilds the tree in place so that no two stored intervals overlap.
    pub fn deoverlap(&mut self) {
        *self = self.deoverlap_copy();
    }

    /// As [`IntervalTree::deoverlap`], but returns the deoverlapped tree rather than mutating in
    /// place.
    pub fn deoverlap_copy(&self) -> Self {
        let mut fresh = Self::new();
        for ival in self.iter() {
            fresh.insert_overlap(ival, false, false);
        }
        fresh
    }

    /// Produces the complement of the stored intervals within `[min_low, root.max]`.
    ///
    /// Requires the tree to already be deoverlapped.
    pub fn punch(&self) -> Self {
        match self.root {
            None => Self::new(),
            Some(root) => {
                let min_low = self.iter().next().expect("non-empty tree has a first interval").low();
                let range = Interval::new(min_low, self.max_of(root), IntervalKind::Closed)
                    .expect("min_low <= root max by construction");
                self.punch_range(&range)
            }
        }
    }

    /// As [`IntervalTree::punch`], but bounded to `range` rather than the tree's own extent.
    ///
    /// Requires the tree to already be deoverlapped.
    pub fn punch_range(&self, range: &Interval<V>) -> Self {
        let mut result = Self::new();
        if self.root.is_none() {
            return result;
        }

        let mut prev: Option<Interval<V>> = None;
        for ival in self.iter() {
            match prev {
                None => {
                    if let Some(gap) = gap_before(&ival, range) {
                        result.insert(gap);
                    }
                }
                Some(p) => {
                    if let Some(gap) = gap_between(&p, &ival) {
                        result.insert(gap);
                    }
                }
            }
            prev = Some(ival);
        }

        if let Some(last) = prev {
            if let Some(gap) = gap_after(&last, range) {
                result.insert(gap);
            }
        }

        result
    }

    /// Removes every interval overlapping `range`. When `reinsert_slices` is set, the portion of
    /// each removed interval not covered by `range` (per [`Interval::slice`]) is merged back in
    /// via [`IntervalTree::insert_overlap`], so pieces that touch a neighboring survivor coalesce
    /// rather than leaving redundant entries.
    pub fn erase_range(&mut self, range: &Interval<V>, reinsert_slices: bool) {
        let mut victims = Vec::new();
        self.overlap_find_all(range, false, &mut |id| {
            victims.push(id);
            true
        });

        let mut slices = Vec::new();
        for id in victims {
            let ival = self.interval_of(id);
            if reinsert_slices {
                let sliced = ival.slice(range);
                slices.extend(sliced.left);
                slices.extend(sliced.right);
            }
            self.erase(Some(id)).expect("overlap_find_all only yields live nodes");
        }

        for piece in slices {
            self.insert_overlap(piece, false, true);
        }
    }
}

/// For kinds with closed-style borders, the gap one step away from `at` does not itself touch
/// `at`; for open-style borders the bare endpoint already doesn't touch it.
fn step_away_from_border<V: Bound>(at: V, inclusive_here: bool) -> V {
    if V::DISCRETE && inclusive_here {
        at.pred()
    } else {
        at
    }
}

fn step_toward_from_border<V: Bound>(at: V, inclusive_here: bool) -> V {
    if V::DISCRETE && inclusive_here {
        at.succ()
    } else {
        at
    }
}

fn left_is_inclusive<V: Bound>(ival: &Interval<V>) -> bool {
    matches!(
        ival.kind(),
        IntervalKind::Closed | IntervalKind::RightOpen | IntervalKind::ClosedAdjacent
    ) || (ival.kind() == IntervalKind::Dynamic
        && matches!(ival.left_border(), crate::interval_tree::kind::Border::Closed | crate::interval_tree::kind::Border::ClosedAdjacent))
}

fn right_is_inclusive<V: Bound>(ival: &Interval<V>) -> bool {
    matches!(
        ival.kind(),
        IntervalKind::Closed | IntervalKind::LeftOpen | IntervalKind::ClosedAdjacent
    ) || (ival.kind() == IntervalKind::Dynamic
        && matches!(ival.right_border(), crate::interval_tree::kind::Border::Closed | crate::interval_tree::kind::Border::ClosedAdjacent))
}

fn gap_before<V: Bound>(first: &Interval<V>, range: &Interval<V>) -> Option<Interval<V>> {
    if range.low() >= first.low() {
        return None;
    }
    let high = step_away_from_border(first.low(), left_is_inclusive(first));
    if high < range.low() {
        return None;
    }
    Interval::new(range.low(), high, IntervalKind::Closed).ok()
}

fn gap_after<V: Bound>(last: &Interval<V>, range: &Interval<V>) -> Option<Interval<V>> {
    if range.high() <= last.high() {
        return None;
    }
    let low = step_toward_from_border(last.high(), right_is_inclusive(last));
    if low > range.high() {
        return None;
    }
    Interval::new(low, range.high(), IntervalKind::Closed).ok()
}

fn gap_between<V: Bound>(a: &Interval<V>, b: &Interval<V>) -> Option<Interval<V>> {
    let low = step_toward_from_border(a.high(), right_is_inclusive(a));
    let high = step_away_from_border(b.low(), left_is_inclusive(b));
    if low > high {
        return None;
    }
    Interval::new(low, high, IntervalKind::Closed).ok()
}

impl<V: Bound, H: TreeHooks<V>> Clone for IntervalTree<V, H> {
    /// Structurally clones the tree: a fresh arena with new nodes mirroring every
    /// parent/child/color/max/interval, not merely a reference copy.
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        copy.size = self.size;
        copy.root = self.clone_subtree(self.root, None, &mut copy);
        copy
    }
}

impl<V: Bound, H: TreeHooks<V>> IntervalTree<V, H> {
    fn clone_subtree(&self, node: Option<NodeId>, parent: Option<NodeId>, out: &mut Self) -> Option<NodeId> {
        let id = node?;
        let interval = self.interval_of(id);
        let new_id = out.arena.insert(Node::new(interval, self.node(id).color(), parent));
        let left = self.clone_subtree(self.left(id), Some(new_id), out);
        let right = self.clone_subtree(self.right(id), Some(new_id), out);
        out.node_mut(new_id).set_left(left);
        out.node_mut(new_id).set_right(right);
        out.node_mut(new_id).set_max(self.max_of(id));
        Some(new_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::interval_tree::hooks::NoopHooks;

    fn closed(low: i32, high: i32) -> Interval<i32> {
        Interval::new(low, high, IntervalKind::Closed).unwrap()
    }

    fn insert_all(tree: &mut IntervalTree<i32, NoopHooks>, pairs: &[(i32, i32)]) {
        for &(l, h) in pairs {
            tree.insert(closed(l, h));
        }
    }

    #[test]
    fn scenario_s1_ten_interval_tree() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(
            &mut tree,
            &[(16, 21), (8, 9), (25, 30), (5, 8), (15, 23), (17, 19), (26, 26), (0, 3), (6, 10), (19, 20)],
        );
        let lows: Vec<_> = tree.iter().map(|i| i.low()).collect();
        assert_eq!(lows, vec![0, 5, 6, 8, 15, 16, 17, 19, 25, 26]);
        assert_eq!(tree.size(), 10);
        assert!(tree.max_of(tree.root_id().unwrap()) >= 30);
    }

    #[test]
    fn scenario_s2_deoverlap_collapses_to_one_interval() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(
            &mut tree,
            &[
                (-51, 11),
                (26, 68),
                (11, 100),
                (-97, 65),
                (-85, 18),
                (-31, -20),
                (-91, -6),
                (-17, 71),
                (-58, 37),
                (-50, -1),
                (11, 61),
                (6, 74),
                (13, 78),
                (-83, -62),
                (-80, 93),
                (-2, 84),
                (-62, -18),
                (-96, -53),
                (56, 91),
                (37, 79),
            ],
        );
        tree.deoverlap();
        assert_eq!(tree.size(), 1);
        let only = tree.iter().next().unwrap();
        assert_eq!((only.low(), only.high()), (-97, 100));
    }

    #[test]
    fn scenario_s3_overlap_find_all_inclusive_and_exclusive() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(&mut tree, &[(0, 5), (5, 10), (10, 15), (15, 20)]);
        let query = closed(5, 5);

        let mut inclusive = Vec::new();
        tree.overlap_find_all(&query, false, &mut |id| {
            inclusive.push((tree.node(id).interval().low(), tree.node(id).interval().high()));
            true
        });
        inclusive.sort();
        assert_eq!(inclusive, vec![(0, 5), (5, 10)]);

        let mut exclusive = Vec::new();
        tree.overlap_find_all(&query, true, &mut |id| {
            exclusive.push(id);
            true
        });
        assert!(exclusive.is_empty());
    }

    #[test]
    fn find_all_defaults_to_structural_equality() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(&mut tree, &[(5, 10), (5, 10), (6, 9)]);

        let mut hits = Vec::new();
        tree.find_all(&closed(5, 10), &mut |id| {
            hits.push(id);
            true
        });
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn find_next_in_subtree_defaults_to_structural_equality() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(&mut tree, &[(5, 10), (5, 10), (6, 9)]);

        let query = closed(5, 10);
        let first = tree.find(&query).unwrap();
        let second = tree.find_next_in_subtree(first, &query);
        assert!(second.is_some());
        assert_ne!(second, Some(first));
    }

    #[test]
    fn scenario_s4_punch_produces_gaps_in_order() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(&mut tree, &[(0, 5), (10, 15), (20, 25), (30, 35)]);
        let range = closed(-5, 40);
        let gaps = tree.punch_range(&range);
        let collected: Vec<_> = gaps.iter().map(|i| (i.low(), i.high())).collect();
        assert_eq!(collected, vec![(-5, -1), (6, 9), (16, 19), (26, 29), (36, 40)]);
    }

    #[test]
    fn scenario_s5_erase_range_reinserts_slices() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(&mut tree, &[(0, 10), (5, 15), (10, 20)]);
        tree.erase_range(&closed(3, 12), true);
        let remaining: Vec<_> = tree.iter().map(|i| (i.low(), i.high())).collect();
        assert_eq!(remaining, vec![(0, 2), (13, 20)]);
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn insert_then_erase_restores_prior_tree() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(&mut tree, &[(16, 21), (8, 9), (25, 30), (5, 8), (15, 23)]);
        let before: Vec<_> = tree.iter().map(|i| (i.low(), i.high())).collect();
        let before_size = tree.size();

        let id = tree.insert(closed(100, 200));
        tree.erase(Some(id)).unwrap();

        let after: Vec<_> = tree.iter().map(|i| (i.low(), i.high())).collect();
        assert_eq!(before, after);
        assert_eq!(before_size, tree.size());
    }

    #[test]
    fn erase_on_empty_position_fails() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        assert_eq!(tree.erase(None).unwrap_err(), Error::OutOfRange);
    }

    #[test]
    fn clone_preserves_structure_and_order() {
        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        insert_all(&mut tree, &[(16, 21), (8, 9), (25, 30), (5, 8), (15, 23), (17, 19)]);
        let cloned = tree.clone();
        let a: Vec<_> = tree.iter().map(|i| (i.low(), i.high())).collect();
        let b: Vec<_> = cloned.iter().map(|i| (i.low(), i.high())).collect();
        assert_eq!(a, b);
        assert_eq!(tree.size(), cloned.size());
    }

    #[test]
    fn overlap_find_on_empty_tree_is_none() {
        let tree = IntervalTree::<i32, NoopHooks>::new();
        assert!(tree.overlap_find(&closed(0, 1), false).is_none());
    }

    #[test]
    fn scenario_s6_dynamic_join_promotes_open_to_closed_then_is_found() {
        use crate::interval_tree::kind::Border;

        let a = Interval::new_dynamic(-50, 100, Border::Open, Border::Open).unwrap();
        let b = Interval::new_safe(-100, 50, IntervalKind::Closed).unwrap();
        let b = Interval::new_dynamic(b.low(), b.high(), Border::Closed, Border::Open).unwrap();
        let joined = a.join(&b);
        assert_eq!(joined.len(), 1);
        let expected = joined[0];
        assert_eq!((expected.low(), expected.high()), (-100, 100));
        assert_eq!(expected.left_border(), Border::Closed);
        assert_eq!(expected.right_border(), Border::Open);

        let mut tree = IntervalTree::<i32, NoopHooks>::new();
        tree.insert(expected);
        tree.insert(closed(0, 1));
        tree.insert(closed(200, 201));

        // A kind-ignoring comparator: match purely on numeric bounds, independent of either
        // interval's border style.
        let query = closed(-100, 100);
        let found = tree.find_by(&query, |a, b| a.low() == b.low() && a.high() == b.high());
        assert!(found.is_some());
        assert_eq!(tree.node(found.unwrap()).interval().left_border(), Border::Closed);
    }

    struct RecordingHooks;

    std::thread_local! {
        static INSERT_FIRED: std::cell::Cell<usize> = std::cell::Cell::new(0);
        static ERASE_FIXUP_FIRED: std::cell::Cell<usize> = std::cell::Cell::new(0);
        static FIND_FIRED: std::cell::Cell<usize> = std::cell::Cell::new(0);
        static OVERLAP_FIND_FIRED: std::cell::Cell<usize> = std::cell::Cell::new(0);
    }

    impl crate::interval_tree::hooks::TreeHooks<i32> for RecordingHooks {
        fn on_after_insert(_tree: &IntervalTree<i32, Self>, _node: NodeId) {
            INSERT_FIRED.with(|c| c.set(c.get() + 1));
        }

        fn on_before_erase_fixup(
            _tree: &IntervalTree<i32, Self>,
            _node: Option<NodeId>,
            _node_parent: Option<NodeId>,
            _other_is_left_child: bool,
        ) {
            ERASE_FIXUP_FIRED.with(|c| c.set(c.get() + 1));
        }

        fn on_find(
            _tree: &IntervalTree<i32, Self>,
            _node: NodeId,
            _ival: &Interval<i32>,
            _compare: &dyn Fn(&Interval<i32>, &Interval<i32>) -> bool,
        ) {
            FIND_FIRED.with(|c| c.set(c.get() + 1));
        }

        fn on_overlap_find(_tree: &IntervalTree<i32, Self>, _node: NodeId, _ival: &Interval<i32>) {
            OVERLAP_FIND_FIRED.with(|c| c.set(c.get() + 1));
        }
    }

    #[test]
    fn hooks_fire_on_insert_find_and_overlap_find() {
        INSERT_FIRED.with(|c| c.set(0));
        FIND_FIRED.with(|c| c.set(0));
        OVERLAP_FIND_FIRED.with(|c| c.set(0));

        let mut tree = IntervalTree::<i32, RecordingHooks>::new();
        insert_all_generic(&mut tree, &[(0, 5), (10, 15), (20, 25)]);
        assert_eq!(INSERT_FIRED.with(|c| c.get()), 3);

        tree.find(&closed(10, 15));
        assert!(FIND_FIRED.with(|c| c.get()) > 0);

        tree.overlap_find(&closed(12, 13), false);
        assert!(OVERLAP_FIND_FIRED.with(|c| c.get()) > 0);
    }

    #[test]
    fn erase_fixup_hook_fires_while_draining_a_tree() {
        ERASE_FIXUP_FIRED.with(|c| c.set(0));

        let mut tree = IntervalTree::<i32, RecordingHooks>::new();
        insert_all_generic(
            &mut tree,
            &[(16, 21), (8, 9), (25, 30), (5, 8), (15, 23), (17, 19), (26, 26), (0, 3), (6, 10), (19, 20)],
        );

        while let Some(id) = tree.iter().node() {
            tree.erase(Some(id)).unwrap();
        }
        assert!(ERASE_FIXUP_FIRED.with(|c| c.get()) > 0);
    }

    fn insert_all_generic<H: crate::interval_tree::hooks::TreeHooks<i32>>(
        tree: &mut IntervalTree<i32, H>,
        pairs: &[(i32, i32)],
    ) {
        for &(l, h) in pairs {
            tree.insert(closed(l, h));
        }
    }
}
