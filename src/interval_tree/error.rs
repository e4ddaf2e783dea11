//! Error types produced by the interval tree and its interval constructors.

use thiserror::Error as ThisError;

/// Failure modes surfaced by the interval tree crate.
///
/// No operation on [`crate::interval_tree::IntervalTree`] partially mutates the tree: either the
/// invariant holds before and after a call, or the call did not commit any visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Error {
    /// An interval was constructed with `low > high` in strict mode.
    #[error("interval low border is not lower than or equal to its high border")]
    InvalidBounds,
    /// An iterator was dereferenced or navigated from while positioned at `end`/`rend`.
    #[error("iterator is out of range")]
    OutOfRange,
    /// Node allocation failed during `insert`, `copy`, `punch`, or `deoverlap`.
    ///
    /// Never raised by this crate's `Vec`-backed arena, whose own allocation failure is an abort
    /// rather than a catchable error; kept for parity with callers porting code from an
    /// implementation where node allocation can fail recoverably.
    #[error("failed to allocate a tree node")]
    AllocationFailure,
    /// `closed_adjacent` or `dynamic` semantics were requested over a non-integral value type.
    #[error("closed_adjacent/dynamic interval kinds require an integral value type")]
    DomainUnsupported,
}

/// Convenience alias used throughout the interval tree module.
pub type Result<T> = std::result::Result<T, Error>;
