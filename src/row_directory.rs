//! Per-row index into an interval buffer
//!
//! A [`RowDirectory`] has one slot for every row id of the grid, including
//! rows that hold no intervals, so neighbor lookups can address any row
//! directly. Each filled slot names a contiguous run of the interval buffer.

use crate::error::{ClumpError, ClumpResult, InvalidInput};
use crate::interval::Interval;
use std::ops::Range;

/// Directory entry for one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowSlot {
    /// Nothing recorded for this row yet
    #[default]
    Uninit,
    /// Intervals `start..start + len` of the buffer belong to this row (`len` may be 0)
    Filled { start: usize, len: usize },
}

/// Row id -> slice of the interval buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDirectory {
    slots: Vec<RowSlot>,
}

impl RowDirectory {
    /// Create a directory of `nrows` uninitialized slots
    ///
    /// Callers that maintain their own directory fill it with
    /// [`set_row`](Self::set_row) and [`mark_empty`](Self::mark_empty). Every
    /// slot must be filled before it is handed to a clumping call.
    pub fn new(nrows: usize) -> Self {
        Self {
            slots: vec![RowSlot::Uninit; nrows],
        }
    }

    /// Number of rows covered
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Point `row` at intervals `start..start + len` of the buffer
    ///
    /// # Panics
    ///
    /// Panics if `row` is not less than [`len`](Self::len).
    pub fn set_row(&mut self, row: usize, start: usize, len: usize) {
        self.slots[row] = RowSlot::Filled { start, len };
    }

    /// Record that `row` has been examined and holds no intervals
    ///
    /// # Panics
    ///
    /// Panics if `row` is not less than [`len`](Self::len).
    pub fn mark_empty(&mut self, row: usize) {
        self.slots[row] = RowSlot::Filled { start: 0, len: 0 };
    }

    pub fn slot(&self, row: usize) -> Option<RowSlot> {
        self.slots.get(row).copied()
    }

    /// Buffer indices of the intervals in `row`, or `None` if the row is
    /// out of range or still uninitialized
    pub fn row(&self, row: usize) -> Option<Range<usize>> {
        match self.slots.get(row)? {
            RowSlot::Uninit => None,
            RowSlot::Filled { start, len } => Some(*start..*start + *len),
        }
    }

    /// Range lookup for a directory that has passed validation
    #[inline]
    pub(crate) fn range(&self, row: usize) -> Range<usize> {
        match self.slots[row] {
            RowSlot::Uninit => 0..0,
            RowSlot::Filled { start, len } => start..start + len,
        }
    }

    /// Build a directory over a flat buffer sorted by row id, then `begin`
    ///
    /// Every row in `0..nrows` gets a slot, empty rows included. The buffer is
    /// checked on the way: row ids must be in range and non-decreasing, and the
    /// intervals of each row must be ascending and share no columns.
    ///
    /// # Example
    ///
    /// ```
    /// use geo_clumps::{Interval, RowDirectory};
    ///
    /// let intervals = vec![Interval::new(0, 0, 3), Interval::new(2, 1, 1), Interval::new(2, 5, 8)];
    /// let rows = RowDirectory::organize(&intervals, 4).unwrap();
    ///
    /// assert_eq!(rows.row(0), Some(0..1));
    /// assert_eq!(rows.row(1), Some(1..1));
    /// assert_eq!(rows.row(2), Some(1..3));
    /// assert_eq!(rows.row(3), Some(3..3));
    /// ```
    pub fn organize(intervals: &[Interval], nrows: usize) -> ClumpResult<Self> {
        if nrows == 0 {
            return Err(InvalidInput::EmptyExtent { name: "rows" }.into());
        }

        let mut previous: Option<usize> = None;
        for (index, run) in intervals.iter().enumerate() {
            if run.row >= nrows {
                return Err(InvalidInput::RowOutOfRange {
                    index,
                    row: run.row,
                    nrows,
                }
                .into());
            }
            if let Some(previous) = previous {
                if run.row < previous {
                    return Err(InvalidInput::RowsNotSorted {
                        index,
                        row: run.row,
                        previous,
                    }
                    .into());
                }
            }
            previous = Some(run.row);
        }

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(nrows)
            .map_err(ClumpError::alloc("row directory"))?;

        let mut start = 0;
        for row in 0..nrows {
            let mut end = start;
            while end < intervals.len() && intervals[end].row == row {
                end += 1;
            }
            check_row(intervals, start..end, row)?;
            slots.push(RowSlot::Filled {
                start,
                len: end - start,
            });
            start = end;
        }

        Ok(Self { slots })
    }

    /// Check a caller-built directory against its interval buffer
    ///
    /// Every slot must be filled and in bounds, no interval may be claimed by
    /// two rows, each interval must carry the row id of its slot, and every
    /// row must be sorted and non-overlapping.
    pub fn validate(&self, intervals: &[Interval]) -> ClumpResult<()> {
        let mut claimed: Vec<bool> = Vec::new();
        claimed
            .try_reserve_exact(intervals.len())
            .map_err(ClumpError::alloc("row directory check"))?;
        claimed.resize(intervals.len(), false);

        for (row, slot) in self.slots.iter().enumerate() {
            let RowSlot::Filled { start, len } = *slot else {
                return Err(InvalidInput::UninitializedRow { row }.into());
            };
            let end = start.saturating_add(len);
            if end > intervals.len() {
                return Err(InvalidInput::SlotOutOfBounds {
                    row,
                    start,
                    end,
                    len: intervals.len(),
                }
                .into());
            }
            for index in start..end {
                if claimed[index] {
                    return Err(InvalidInput::SlotsOverlap { index }.into());
                }
                claimed[index] = true;
                if intervals[index].row != row {
                    return Err(InvalidInput::RowMismatch {
                        index,
                        expected: row,
                        found: intervals[index].row,
                    }
                    .into());
                }
            }
            check_row(intervals, start..end, row)?;
        }

        Ok(())
    }
}

/// Intervals of one row must run strictly left to right without sharing columns.
fn check_row(intervals: &[Interval], range: Range<usize>, row: usize) -> Result<(), InvalidInput> {
    let mut previous_end: Option<usize> = None;
    for index in range {
        let run = &intervals[index];
        if run.begin > run.end {
            return Err(InvalidInput::BeginAfterEnd {
                index,
                begin: run.begin,
                end: run.end,
            });
        }
        if previous_end.is_some_and(|end| run.begin <= end) {
            return Err(InvalidInput::IntervalsOverlap { index, row });
        }
        previous_end = Some(run.end);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid(result: ClumpResult<RowDirectory>) -> InvalidInput {
        match result {
            Err(ClumpError::InvalidInput(reason)) => reason,
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_organize_allocates_every_row() {
        let intervals = vec![Interval::new(1, 0, 2), Interval::new(1, 4, 6)];
        let rows = RowDirectory::organize(&intervals, 5).unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows.row(0), Some(0..0));
        assert_eq!(rows.row(1), Some(0..2));
        for row in 2..5 {
            assert_eq!(rows.row(row), Some(2..2));
        }
    }

    #[test]
    fn test_organize_empty_input() {
        let rows = RowDirectory::organize(&[], 3).unwrap();
        assert_eq!(rows.len(), 3);
        assert!((0..3).all(|r| rows.row(r) == Some(0..0)));
    }

    #[test]
    fn test_organize_rejects_zero_rows() {
        let reason = invalid(RowDirectory::organize(&[], 0));
        assert_eq!(reason, InvalidInput::EmptyExtent { name: "rows" });
    }

    #[test]
    fn test_organize_rejects_unsorted_rows() {
        let intervals = vec![Interval::new(2, 0, 1), Interval::new(1, 0, 1)];
        let reason = invalid(RowDirectory::organize(&intervals, 3));
        assert_eq!(
            reason,
            InvalidInput::RowsNotSorted {
                index: 1,
                row: 1,
                previous: 2
            }
        );
    }

    #[test]
    fn test_organize_rejects_row_out_of_range() {
        let intervals = vec![Interval::new(3, 0, 1)];
        let reason = invalid(RowDirectory::organize(&intervals, 3));
        assert!(matches!(reason, InvalidInput::RowOutOfRange { row: 3, nrows: 3, .. }));
    }

    #[test]
    fn test_organize_rejects_overlap_in_row() {
        let intervals = vec![Interval::new(0, 0, 4), Interval::new(0, 4, 6)];
        let reason = invalid(RowDirectory::organize(&intervals, 1));
        assert_eq!(reason, InvalidInput::IntervalsOverlap { index: 1, row: 0 });
    }

    #[test]
    fn test_organize_rejects_begin_after_end() {
        let mut run = Interval::new(0, 5, 5);
        run.end = 2;
        let reason = invalid(RowDirectory::organize(&[run], 1));
        assert!(matches!(reason, InvalidInput::BeginAfterEnd { index: 0, .. }));
    }

    #[test]
    fn test_adjacent_intervals_in_row_are_allowed() {
        // Touching but not sharing a column is still two distinct runs
        let intervals = vec![Interval::new(0, 0, 4), Interval::new(0, 5, 6)];
        assert!(RowDirectory::organize(&intervals, 1).is_ok());
    }

    #[test]
    fn test_manual_directory_uninitialized() {
        let rows = RowDirectory::new(2);
        assert_eq!(rows.slot(0), Some(RowSlot::Uninit));
        assert_eq!(rows.row(0), None);
        assert_eq!(rows.row(5), None);
    }

    #[test]
    fn test_validate_manual_directory() {
        // Rows stored out of order in the buffer
        let intervals = vec![Interval::new(1, 2, 3), Interval::new(0, 0, 1)];
        let mut rows = RowDirectory::new(3);
        rows.set_row(0, 1, 1);
        rows.set_row(1, 0, 1);
        rows.mark_empty(2);

        assert!(rows.validate(&intervals).is_ok());
    }

    #[test]
    fn test_validate_rejects_uninitialized_row() {
        let intervals = vec![Interval::new(0, 0, 1)];
        let mut rows = RowDirectory::new(2);
        rows.set_row(0, 0, 1);

        match rows.validate(&intervals) {
            Err(ClumpError::InvalidInput(InvalidInput::UninitializedRow { row })) => assert_eq!(row, 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_shared_interval() {
        let intervals = vec![Interval::new(0, 0, 1)];
        let mut rows = RowDirectory::new(2);
        rows.set_row(0, 0, 1);
        rows.set_row(1, 0, 1);

        match rows.validate(&intervals) {
            Err(ClumpError::InvalidInput(InvalidInput::SlotsOverlap { index })) => assert_eq!(index, 0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_out_of_bounds_slot() {
        let intervals = vec![Interval::new(0, 0, 1)];
        let mut rows = RowDirectory::new(1);
        rows.set_row(0, 0, 2);

        assert!(matches!(
            rows.validate(&intervals),
            Err(ClumpError::InvalidInput(InvalidInput::SlotOutOfBounds { row: 0, .. }))
        ));
    }

    #[test]
    fn test_validate_rejects_row_mismatch() {
        let intervals = vec![Interval::new(1, 0, 1)];
        let mut rows = RowDirectory::new(2);
        rows.set_row(0, 0, 1);
        rows.mark_empty(1);

        assert!(matches!(
            rows.validate(&intervals),
            Err(ClumpError::InvalidInput(InvalidInput::RowMismatch {
                index: 0,
                expected: 0,
                found: 1
            }))
        ));
    }
}
