//! A generic, augmented red-black interval tree, with closed/open/half-open/closed-adjacent and
//! runtime-configurable `dynamic` interval kinds.

pub mod interval_tree;

pub use interval_tree::{Border, Bound, Color, Error, Interval, IntervalKind, IntervalTree, NodeId, Result};
