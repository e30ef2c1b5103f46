//! Error types for clumping operations.

use thiserror::Error;

/// Result type for clumping operations.
pub type ClumpResult<T> = Result<T, ClumpError>;

/// Errors that can abort a clumping call.
///
/// No partial clump set is ever returned alongside an error. Labels already
/// written to the caller's intervals before the failure are left in place.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClumpError {
    /// Growing a working buffer failed.
    #[error("allocation failed while growing {what}")]
    Allocation {
        /// The buffer that could not be grown.
        what: &'static str,
    },

    /// The intervals or row directory violate the input contract.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
}

impl ClumpError {
    /// Shorthand used with `try_reserve(...).map_err(...)`.
    pub(crate) fn alloc(what: &'static str) -> impl FnOnce(std::collections::TryReserveError) -> Self {
        move |_| ClumpError::Allocation { what }
    }
}

/// Push onto `vec`, doubling its capacity fallibly when full.
pub(crate) fn try_push<T>(vec: &mut Vec<T>, value: T, what: &'static str) -> ClumpResult<()> {
    if vec.len() == vec.capacity() {
        let extra = vec.capacity().max(16);
        vec.try_reserve(extra).map_err(ClumpError::alloc(what))?;
    }
    vec.push(value);
    Ok(())
}

/// Ways the input can break the sorted, non-overlapping interval contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum InvalidInput {
    /// An interval's row id lies outside the grid extent.
    #[error("interval {index} has row {row} but the grid has {nrows} rows")]
    RowOutOfRange {
        /// Index of the interval in the caller's buffer.
        index: usize,
        /// The offending row id.
        row: usize,
        /// Number of row ids in the grid.
        nrows: usize,
    },

    /// Flat input is not sorted by row id.
    #[error("interval {index} has row {row} after an interval of row {previous}")]
    RowsNotSorted {
        /// Index of the interval in the caller's buffer.
        index: usize,
        /// The offending row id.
        row: usize,
        /// Row id of the interval before it.
        previous: usize,
    },

    /// An interval ends before it begins.
    #[error("interval {index} begins at {begin} but ends at {end}")]
    BeginAfterEnd {
        /// Index of the interval in the caller's buffer.
        index: usize,
        /// First column.
        begin: usize,
        /// Last column.
        end: usize,
    },

    /// Two intervals in the same row are out of order or share columns.
    #[error("interval {index} in row {row} overlaps or precedes the interval before it")]
    IntervalsOverlap {
        /// Index of the interval in the caller's buffer.
        index: usize,
        /// Row id shared by both intervals.
        row: usize,
    },

    /// A directory slot was never filled or marked empty.
    #[error("row {row} has not been populated")]
    UninitializedRow {
        /// The row id.
        row: usize,
    },

    /// A directory slot points past the end of the interval buffer.
    #[error("row {row} refers to intervals {start}..{end} but only {len} exist")]
    SlotOutOfBounds {
        /// The row id.
        row: usize,
        /// First referenced index.
        start: usize,
        /// One past the last referenced index.
        end: usize,
        /// Length of the interval buffer.
        len: usize,
    },

    /// Two directory slots claim the same interval.
    #[error("interval {index} is referenced by more than one row")]
    SlotsOverlap {
        /// Index of the shared interval.
        index: usize,
    },

    /// An interval's row id disagrees with the slot holding it.
    #[error("interval {index} has row {found} but is stored in row {expected}")]
    RowMismatch {
        /// Index of the interval in the caller's buffer.
        index: usize,
        /// Row id of the slot.
        expected: usize,
        /// Row id stored on the interval.
        found: usize,
    },

    /// The directory does not have one slot per row of the grid.
    #[error("row directory has {found} rows, expected {expected}")]
    DirectorySize {
        /// Rows implied by the grid extent.
        expected: usize,
        /// Rows in the directory.
        found: usize,
    },

    /// A flat value array does not match its stated dimensions.
    #[error("grid of {nx}x{nrows} needs {expected} values, got {found}")]
    GridSize {
        /// Columns per row.
        nx: usize,
        /// Number of rows.
        nrows: usize,
        /// `nx * nrows`.
        expected: usize,
        /// Length of the value array.
        found: usize,
    },

    /// `ny * nz` does not fit in `usize`.
    #[error("grid extent {ny}x{nz} overflows the row id range")]
    ExtentOverflow {
        /// Rows per plane.
        ny: usize,
        /// Number of planes.
        nz: usize,
    },

    /// No clump id is left above the labels already present.
    #[error("no clump id left after {last}")]
    LabelOverflow {
        /// Highest id in use.
        last: u32,
    },

    /// A grid dimension is zero.
    #[error("grid extent {name} must be non-zero")]
    EmptyExtent {
        /// Which dimension was zero.
        name: &'static str,
    },
}
