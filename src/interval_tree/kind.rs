//! Interval kinds: pure, stateless predicates over a pair of endpoints.
//!
//! Each kind decides what `within`, `overlaps` and `size` mean for its border style. The
//! functions here hold no state; [`crate::interval_tree::Interval`] dispatches to them based on
//! its [`IntervalKind`] tag (and, for [`IntervalKind::Dynamic`], its per-instance [`Border`]
//! flags).

use crate::interval_tree::bound::Bound;

/// The border style of one side of a [`IntervalKind::Dynamic`] interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Border {
    /// The endpoint is included in the interval.
    Closed,
    /// The endpoint is excluded from the interval.
    Open,
    /// The endpoint is excluded, but integral abutment on this side still counts as overlap.
    ClosedAdjacent,
}

/// The six interval kinds the core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalKind {
    /// `[low, high]`.
    Closed,
    /// `(low, high)`.
    Open,
    /// `(low, high]`.
    LeftOpen,
    /// `[low, high)`.
    RightOpen,
    /// `[low, high]`, where integral abutment (`h1 + 1 == l2`) also counts as overlap.
    ClosedAdjacent,
    /// Per-instance border flags, resolved at runtime via the interval's own `left`/`right`.
    Dynamic,
}

impl IntervalKind {
    /// Whether this kind requires an integral (`Bound::DISCRETE`) value type.
    pub fn requires_discrete(self) -> bool {
        matches!(self, Self::ClosedAdjacent | Self::Dynamic)
    }
}

pub(crate) fn closed_within<V: Bound>(low: V, high: V, p: V) -> bool {
    low <= p && p <= high
}

pub(crate) fn closed_overlaps<V: Bound>(l1: V, h1: V, l2: V, h2: V) -> bool {
    l1 <= h2 && l2 <= h1
}

pub(crate) fn closed_size<V: Bound>(low: V, high: V) -> V {
    if V::DISCRETE {
        high.succ() - low
    } else {
        high - low
    }
}

pub(crate) fn open_within<V: Bound>(low: V, high: V, p: V) -> bool {
    low < p && p < high
}

pub(crate) fn open_overlaps<V: Bound>(l1: V, h1: V, l2: V, h2: V) -> bool {
    l1 < h2 && l2 < h1
}

pub(crate) fn open_size<V: Bound>(low: V, high: V) -> V {
    if V::DISCRETE {
        high.pred() - low
    } else {
        high - low
    }
}

pub(crate) fn left_open_within<V: Bound>(low: V, high: V, p: V) -> bool {
    low < p && p <= high
}

pub(crate) fn left_open_overlaps<V: Bound>(l1: V, h1: V, l2: V, h2: V) -> bool {
    l1 < h2 && l2 <= h1
}

pub(crate) fn right_open_within<V: Bound>(low: V, high: V, p: V) -> bool {
    low <= p && p < high
}

pub(crate) fn right_open_overlaps<V: Bound>(l1: V, h1: V, l2: V, h2: V) -> bool {
    l1 <= h2 && l2 < h1
}

pub(crate) fn half_open_size<V: Bound>(low: V, high: V) -> V {
    high - low
}

pub(crate) fn closed_adjacent_within<V: Bound>(low: V, high: V, p: V) -> bool {
    low <= p && p <= high
}

pub(crate) fn closed_adjacent_overlaps<V: Bound>(l1: V, h1: V, l2: V, h2: V) -> bool {
    l1 <= h2.succ() && l2.pred() <= h1
}

pub(crate) fn closed_adjacent_size<V: Bound>(low: V, high: V) -> V {
    high.succ() - low
}

/// Converts a dynamic border's endpoint to its closed-equivalent value.
fn low_to_closed<V: Bound>(low: V, border: Border) -> V {
    if border == Border::Open {
        low.succ()
    } else {
        low
    }
}

fn high_to_closed<V: Bound>(high: V, border: Border) -> V {
    if border == Border::Open {
        high.pred()
    } else {
        high
    }
}

pub(crate) fn dynamic_overlaps<V: Bound>(
    l1: V,
    h1: V,
    left1: Border,
    right1: Border,
    l2: V,
    h2: V,
    left2: Border,
    right2: Border,
) -> bool {
    let cl1 = low_to_closed(l1, left1);
    let ch1 = high_to_closed(h1, right1);
    let cl2 = low_to_closed(l2, left2);
    let ch2 = high_to_closed(h2, right2);

    if closed_overlaps(cl1, ch1, cl2, ch2) {
        return true;
    }
    if ch1.succ() == cl2 && (right1 == Border::ClosedAdjacent || left2 == Border::ClosedAdjacent) {
        return true;
    }
    if ch2.succ() == cl1 && (right2 == Border::ClosedAdjacent || left1 == Border::ClosedAdjacent) {
        return true;
    }
    false
}

pub(crate) fn dynamic_within<V: Bound>(low: V, high: V, left: Border, right: Border, p: V) -> bool {
    let left_ok = match left {
        Border::Open => low < p,
        Border::Closed | Border::ClosedAdjacent => low <= p,
    };
    let right_ok = match right {
        Border::Open => p < high,
        Border::Closed | Border::ClosedAdjacent => p <= high,
    };
    left_ok && right_ok
}

pub(crate) fn dynamic_distance<V: Bound>(
    l1: V,
    h1: V,
    left1: Border,
    right1: Border,
    l2: V,
    h2: V,
    left2: Border,
    right2: Border,
) -> V {
    let adjusted_low1 = if left1 == Border::Open { l1.succ() } else { l1 };
    let adjusted_high1 = if right1 == Border::Open { h1.pred() } else { h1 };
    let adjusted_low2 = if left2 == Border::Open { l2.succ() } else { l2 };
    let adjusted_high2 = if right2 == Border::Open { h2.pred() } else { h2 };

    if adjusted_high1 < adjusted_low2 {
        adjusted_low2 - adjusted_high1
    } else {
        adjusted_low1 - adjusted_high2
    }
}

/// `closed_adjacent` dominates `closed` which dominates `open`.
pub(crate) fn border_promote(a: Border, b: Border) -> Border {
    if a == Border::ClosedAdjacent || b == Border::ClosedAdjacent {
        Border::ClosedAdjacent
    } else if a == Border::Closed || b == Border::Closed {
        Border::Closed
    } else {
        Border::Open
    }
}

fn any_closed(b: Border) -> bool {
    matches!(b, Border::Closed | Border::ClosedAdjacent)
}

/// Computes the joined low endpoint and border for two dynamic intervals (assumes overlap).
pub(crate) fn dynamic_join_low<V: Bound>(l1: V, left1: Border, l2: V, left2: Border) -> (V, Border) {
    if left1 == left2 || (any_closed(left1) && any_closed(left2)) {
        (
            if l1 < l2 { l1 } else { l2 },
            border_promote(left1, left2),
        )
    } else {
        let (open_low, open_border, closed_low, closed_border) = if left1 == Border::Open {
            (l1, left1, l2, left2)
        } else {
            (l2, left2, l1, left1)
        };
        let open_adjusted = open_low.succ();
        if open_adjusted == closed_low {
            (closed_low, closed_border)
        } else if open_low < closed_low {
            (open_low, open_border)
        } else {
            (closed_low, closed_border)
        }
    }
}

/// Computes the joined high endpoint and border for two dynamic intervals (assumes overlap).
pub(crate) fn dynamic_join_high<V: Bound>(h1: V, right1: Border, h2: V, right2: Border) -> (V, Border) {
    if right1 == right2 || (any_closed(right1) && any_closed(right2)) {
        (
            if h1 > h2 { h1 } else { h2 },
            border_promote(right1, right2),
        )
    } else {
        let (open_high, open_border, closed_high, closed_border) = if right1 == Border::Open {
            (h1, right1, h2, right2)
        } else {
            (h2, right2, h1, right1)
        };
        let open_adjusted = open_high.pred();
        if open_adjusted == closed_high {
            (closed_high, closed_border)
        } else if open_high > closed_high {
            (open_high, open_border)
        } else {
            (closed_high, closed_border)
        }
    }
}

pub(crate) fn dynamic_size<V: Bound>(low: V, high: V, left: Border, right: Border) -> V {
    let left = if left == Border::ClosedAdjacent { Border::Closed } else { left };
    let right = if right == Border::ClosedAdjacent { Border::Closed } else { right };

    if left == right {
        return if left == Border::Open { open_size(low, high) } else { closed_size(low, high) };
    }
    half_open_size(low, high)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn closed_adjacent_overlap_examples() {
        assert!(closed_adjacent_overlaps(0, 5, 6, 10));
        assert!(!closed_adjacent_overlaps(0, 5, 7, 10));
    }

    #[test]
    fn open_overlap_examples() {
        assert!(!open_overlaps(0, 5, 5, 10));
        assert!(open_overlaps(0, 5, 4, 10));
    }

    #[test]
    fn closed_size_examples() {
        assert_eq!(closed_size(0, 5), 6);
        assert_eq!(open_size(0, 5), 4);
        assert_eq!(half_open_size(0, 5), 5);
        assert_eq!(closed_adjacent_size(0, 5), 6);
    }

    #[test]
    fn dynamic_overlap_matches_closed_when_both_closed() {
        assert!(dynamic_overlaps(0, 5, Border::Closed, Border::Closed, 5, 10, Border::Closed, Border::Closed));
    }

    #[test]
    fn dynamic_overlap_respects_adjacent_border() {
        assert!(dynamic_overlaps(
            0,
            5,
            Border::Closed,
            Border::ClosedAdjacent,
            6,
            10,
            Border::Closed,
            Border::Closed
        ));
        assert!(!dynamic_overlaps(
            0,
            5,
            Border::Closed,
            Border::Closed,
            6,
            10,
            Border::Closed,
            Border::Closed
        ));
    }
}
