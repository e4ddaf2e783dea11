//! `Interval<V>`: an immutable `(low, high)` pair plus its interpretation [`IntervalKind`].

use smallvec::SmallVec;
use std::fmt::{self, Debug, Display, Formatter};

use crate::interval_tree::bound::Bound;
use crate::interval_tree::error::{Error, Result};
use crate::interval_tree::kind::{self, Border, IntervalKind};

/// The result of [`Interval::join`]: a finite, usually single-element, sequence of intervals.
///
/// Modelled as a small inline vector rather than a boxed lazy iterator: every kind this crate
/// ships produces exactly one interval, so the common case never touches the heap, while still
/// letting a custom interval kind (see [`crate::interval_tree::IntervalTree::insert_overlap`])
/// return more than one piece for the tree to insert.
pub type JoinSeq<V> = SmallVec<[Interval<V>; 2]>;

/// The outcome of [`Interval::slice`]: the portions of an interval not covered by a cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceResult<V: Bound> {
    /// The portion of the sliced interval strictly before the cut, if any remains.
    pub left: Option<Interval<V>>,
    /// The portion of the sliced interval strictly after the cut, if any remains.
    pub right: Option<Interval<V>>,
}

/// An interval `[low, high]` (or another border style per [`IntervalKind`]) over a value domain `V`.
///
/// `low <= high` always holds for a live `Interval`. Construction fails with
/// [`Error::InvalidBounds`] when that would not hold, unless [`Interval::new_safe`] is used, which
/// swaps the bounds instead. `ClosedAdjacent` and `Dynamic` kinds additionally require `V` to be
/// discrete (`V::DISCRETE`); attempting either over a floating-point domain fails with
/// [`Error::DomainUnsupported`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval<V: Bound> {
    low: V,
    high: V,
    kind: IntervalKind,
    left_border: Border,
    right_border: Border,
}

impl<V: Bound> Interval<V> {
    /// Constructs an interval, failing if `low > high` or the kind is unsupported over `V`.
    pub fn new(low: V, high: V, kind: IntervalKind) -> Result<Self> {
        if kind.requires_discrete() && !V::DISCRETE {
            return Err(Error::DomainUnsupported);
        }
        if low > high {
            return Err(Error::InvalidBounds);
        }
        Ok(Self { low, high, kind, left_border: Border::Closed, right_border: Border::Closed })
    }

    /// Constructs an interval, swapping `low`/`high` instead of failing when `low > high`.
    pub fn new_safe(low: V, high: V, kind: IntervalKind) -> Result<Self> {
        if kind.requires_discrete() && !V::DISCRETE {
            return Err(Error::DomainUnsupported);
        }
        let (low, high) = if low > high { (high, low) } else { (low, high) };
        Ok(Self { low, high, kind, left_border: Border::Closed, right_border: Border::Closed })
    }

    /// Constructs a [`IntervalKind::Dynamic`] interval with explicit per-side borders.
    pub fn new_dynamic(low: V, high: V, left_border: Border, right_border: Border) -> Result<Self> {
        if !V::DISCRETE {
            return Err(Error::DomainUnsupported);
        }
        if low > high {
            return Err(Error::InvalidBounds);
        }
        Ok(Self { low, high, kind: IntervalKind::Dynamic, left_border, right_border })
    }

    /// Returns the lower bound.
    pub fn low(&self) -> V {
        self.low
    }

    /// Returns the upper bound.
    pub fn high(&self) -> V {
        self.high
    }

    /// Returns the kind that interprets this interval's borders.
    pub fn kind(&self) -> IntervalKind {
        self.kind
    }

    /// Returns the left border style. Only meaningful for [`IntervalKind::Dynamic`] intervals.
    pub fn left_border(&self) -> Border {
        self.left_border
    }

    /// Returns the right border style. Only meaningful for [`IntervalKind::Dynamic`] intervals.
    pub fn right_border(&self) -> Border {
        self.right_border
    }

    /// Returns whether `p` falls within this interval, per its kind.
    pub fn within(&self, p: V) -> bool {
        match self.kind {
            IntervalKind::Closed => kind::closed_within(self.low, self.high, p),
            IntervalKind::Open => kind::open_within(self.low, self.high, p),
            IntervalKind::LeftOpen => kind::left_open_within(self.low, self.high, p),
            IntervalKind::RightOpen => kind::right_open_within(self.low, self.high, p),
            IntervalKind::ClosedAdjacent => kind::closed_adjacent_within(self.low, self.high, p),
            IntervalKind::Dynamic => {
                kind::dynamic_within(self.low, self.high, self.left_border, self.right_border, p)
            }
        }
    }

    /// Returns whether `other` is entirely contained within this interval.
    pub fn within_interval(&self, other: &Interval<V>) -> bool {
        self.within(other.low) && self.within(other.high)
    }

    /// Returns whether the intervals overlap, per this interval's kind.
    pub fn overlaps(&self, other: &Interval<V>) -> bool {
        match self.kind {
            IntervalKind::Closed => kind::closed_overlaps(self.low, self.high, other.low, other.high),
            IntervalKind::Open => kind::open_overlaps(self.low, self.high, other.low, other.high),
            IntervalKind::LeftOpen => kind::left_open_overlaps(self.low, self.high, other.low, other.high),
            IntervalKind::RightOpen => kind::right_open_overlaps(self.low, self.high, other.low, other.high),
            IntervalKind::ClosedAdjacent => {
                kind::closed_adjacent_overlaps(self.low, self.high, other.low, other.high)
            }
            IntervalKind::Dynamic => kind::dynamic_overlaps(
                self.low,
                self.high,
                self.left_border,
                self.right_border,
                other.low,
                other.high,
                other.left_border,
                other.right_border,
            ),
        }
    }

    /// Returns whether the intervals overlap under strict (open-style) borders, independent of
    /// either interval's own kind.
    pub fn overlaps_exclusive(&self, other: &Interval<V>) -> bool {
        self.low < other.high && other.low < self.high
    }

    /// Returns the gap size between the two intervals, or the zero-equivalent step when they
    /// overlap (i.e. `V::ONE - V::ONE`, which equals the domain's zero for every `Bound` impl).
    pub fn distance(&self, other: &Interval<V>) -> V {
        if self.overlaps(other) {
            return V::ONE - V::ONE;
        }
        if self.kind == IntervalKind::Dynamic && other.kind == IntervalKind::Dynamic {
            return kind::dynamic_distance(
                self.low,
                self.high,
                self.left_border,
                self.right_border,
                other.low,
                other.high,
                other.left_border,
                other.right_border,
            );
        }
        if self.high <= other.low {
            other.low - self.high
        } else {
            self.low - other.high
        }
    }

    /// Merges this interval with `other`, returning the resulting sequence of intervals.
    ///
    /// For every built-in kind this returns exactly one interval spanning both; for
    /// [`IntervalKind::Dynamic`], the join assumes the two intervals overlap and widens each
    /// border independently (`closed_adjacent` dominates `closed` dominates `open`).
    pub fn join(&self, other: &Interval<V>) -> JoinSeq<V> {
        let mut out = JoinSeq::new();
        if self.kind == IntervalKind::Dynamic {
            let (low, left_border) =
                kind::dynamic_join_low(self.low, self.left_border, other.low, other.left_border);
            let (high, right_border) =
                kind::dynamic_join_high(self.high, self.right_border, other.high, other.right_border);
            out.push(Interval { low, high, kind: IntervalKind::Dynamic, left_border, right_border });
        } else {
            let low = if self.low < other.low { self.low } else { other.low };
            let high = if self.high > other.high { self.high } else { other.high };
            out.push(Interval { low, high, kind: self.kind, left_border: self.left_border, right_border: self.right_border });
        }
        out
    }

    /// Returns the measure of this interval under its kind.
    pub fn size(&self) -> V {
        match self.kind {
            IntervalKind::Closed => kind::closed_size(self.low, self.high),
            IntervalKind::Open => kind::open_size(self.low, self.high),
            IntervalKind::LeftOpen | IntervalKind::RightOpen => kind::half_open_size(self.low, self.high),
            IntervalKind::ClosedAdjacent => kind::closed_adjacent_size(self.low, self.high),
            IntervalKind::Dynamic => kind::dynamic_size(self.low, self.high, self.left_border, self.right_border),
        }
    }

    /// Whether this interval's kind treats its left border as inclusive (`Closed`/`ClosedAdjacent`).
    fn left_is_closed_style(&self) -> bool {
        match self.kind {
            IntervalKind::Closed | IntervalKind::RightOpen | IntervalKind::ClosedAdjacent => true,
            IntervalKind::Open | IntervalKind::LeftOpen => false,
            IntervalKind::Dynamic => matches!(self.left_border, Border::Closed | Border::ClosedAdjacent),
        }
    }

    /// Whether this interval's kind treats its right border as inclusive (`Closed`/`ClosedAdjacent`).
    fn right_is_closed_style(&self) -> bool {
        match self.kind {
            IntervalKind::Closed | IntervalKind::LeftOpen | IntervalKind::ClosedAdjacent => true,
            IntervalKind::Open | IntervalKind::RightOpen => false,
            IntervalKind::Dynamic => matches!(self.right_border, Border::Closed | Border::ClosedAdjacent),
        }
    }

    /// Partitions this interval by removing the portion covered by `cut`, returning whatever
    /// remains to the left and/or right.
    ///
    /// On an integral domain, a border this interval treats as inclusive is stepped away from the
    /// cut by one so the remaining pieces do not themselves overlap `cut`; on a floating-point
    /// domain (only possible for non-adjacent kinds) the cut's own endpoint is reused verbatim.
    pub fn slice(&self, cut: &Interval<V>) -> SliceResult<V> {
        let left_needs_offset = V::DISCRETE && self.right_is_closed_style();
        let right_needs_offset = V::DISCRETE && self.left_is_closed_style();

        let left = if cut.low > self.low {
            let new_high = if left_needs_offset { cut.low.pred() } else { cut.low };
            (new_high >= self.low).then(|| Interval {
                low: self.low,
                high: new_high,
                kind: self.kind,
                left_border: self.left_border,
                right_border: self.right_border,
            })
        } else {
            None
        };

        let right = if cut.high < self.high {
            let new_low = if right_needs_offset { cut.high.succ() } else { cut.high };
            (new_low <= self.high).then(|| Interval {
                low: new_low,
                high: self.high,
                kind: self.kind,
                left_border: self.left_border,
                right_border: self.right_border,
            })
        } else {
            None
        };

        SliceResult { left, right }
    }
}

impl<V: Bound + Debug> Debug for Interval<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (lb, rb) = match self.kind {
            IntervalKind::Closed | IntervalKind::ClosedAdjacent => ('[', ']'),
            IntervalKind::Open => ('(', ')'),
            IntervalKind::LeftOpen => ('(', ']'),
            IntervalKind::RightOpen => ('[', ')'),
            IntervalKind::Dynamic => (
                if self.left_border == Border::Open { '(' } else { '[' },
                if self.right_border == Border::Open { ')' } else { ']' },
            ),
        };
        write!(f, "{}{:?}, {:?}{}", lb, self.low, self.high, rb)
    }
}

impl<V: Bound + Display> Display for Interval<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn construct_rejects_inverted_bounds() {
        assert_eq!(Interval::new(5, 1, IntervalKind::Closed).unwrap_err(), Error::InvalidBounds);
    }

    #[test]
    fn construct_safe_swaps_bounds() {
        let ival = Interval::new_safe(5, 1, IntervalKind::Closed).unwrap();
        assert_eq!((ival.low(), ival.high()), (1, 5));
    }

    #[test]
    fn closed_adjacent_on_floats_is_rejected() {
        assert_eq!(Interval::new(0.0, 1.0, IntervalKind::ClosedAdjacent).unwrap_err(), Error::DomainUnsupported);
    }

    #[test]
    fn closed_adjacent_overlap_example() {
        let a = Interval::new(0, 5, IntervalKind::ClosedAdjacent).unwrap();
        let b = Interval::new(6, 10, IntervalKind::ClosedAdjacent).unwrap();
        let c = Interval::new(7, 10, IntervalKind::ClosedAdjacent).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn open_overlap_example() {
        let a = Interval::new(0, 5, IntervalKind::Open).unwrap();
        let b = Interval::new(5, 10, IntervalKind::Open).unwrap();
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn join_spans_both_intervals() {
        let a = Interval::new(0, 5, IntervalKind::Closed).unwrap();
        let b = Interval::new(3, 10, IntervalKind::Closed).unwrap();
        let joined = a.join(&b);
        assert_eq!(joined.len(), 1);
        assert_eq!((joined[0].low(), joined[0].high()), (0, 10));
    }

    #[test]
    fn dynamic_join_promotes_open_to_closed() {
        let a = Interval::new_dynamic(-50, 100, Border::Open, Border::Open).unwrap();
        let b = Interval::new_dynamic(-100, 50, Border::Closed, Border::Open).unwrap();
        let joined = a.join(&b);
        assert_eq!(joined.len(), 1);
        let j = joined[0];
        assert_eq!((j.low(), j.high()), (-100, 100));
        assert_eq!(j.left_border(), Border::Closed);
        assert_eq!(j.right_border(), Border::Open);
    }

    #[test]
    fn slice_closed_offsets_by_one() {
        let this = Interval::new(0, 10, IntervalKind::Closed).unwrap();
        let cut = Interval::new(3, 12, IntervalKind::Closed).unwrap();
        let result = this.slice(&cut);
        assert_eq!(result.left.unwrap().high(), 2);
        assert!(result.right.is_none());
    }

    #[test]
    fn slice_open_leaves_endpoints_as_is() {
        let this = Interval::new(0, 10, IntervalKind::Open).unwrap();
        let cut = Interval::new(3, 8, IntervalKind::Open).unwrap();
        let result = this.slice(&cut);
        assert_eq!(result.left.unwrap().high(), 3);
        assert_eq!(result.right.unwrap().low(), 8);
    }
}
