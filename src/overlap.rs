//! Adjacency between intervals in neighboring rows and planes
//!
//! Two intervals in neighboring rows are adjacent when their columns overlap
//! by at least `min_overlap`:
//!
//! | `min_overlap` | Adjacent when |
//! |---------------|---------------|
//! | `+n` | the column ranges share at least `n` columns |
//! | `0` | the ranges share a column or touch at a corner (8-connectivity) |
//! | `-n` | the ranges are separated by a gap of at most `n` columns |
//!
//! All three cases reduce to `min(a.end, b.end) - max(a.begin, b.begin) + 1 >= min_overlap`.
//!
//! Because every row is sorted and its intervals share no columns, both the
//! begins and the ends of a row are ascending. The adjacent neighbors of an
//! interval therefore sit in one contiguous index range, which a two-pointer
//! sweep finds for a whole row pair in a single pass.

use crate::error::{ClumpError, ClumpResult};
use crate::interval::{Direction, Interval};
use crate::row_directory::RowDirectory;
use std::ops::Range;

/// Whether `a` and `b` (in neighboring rows) are adjacent under `min_overlap`
///
/// # Example
///
/// ```
/// use geo_clumps::{overlaps, Interval};
///
/// let a = Interval::new(0, 0, 4);
///
/// // Touching at column 4
/// assert!(overlaps(&a, &Interval::new(1, 4, 8), 0));
/// // Diagonal corner contact counts at zero tolerance only
/// assert!(overlaps(&a, &Interval::new(1, 5, 8), 0));
/// assert!(!overlaps(&a, &Interval::new(1, 5, 8), 1));
/// // Gap of two columns (5 and 6) bridged by a tolerance of -2
/// assert!(overlaps(&a, &Interval::new(1, 7, 10), -2));
/// assert!(!overlaps(&a, &Interval::new(1, 8, 12), -2));
/// ```
#[inline]
pub fn overlaps(a: &Interval, b: &Interval, min_overlap: i32) -> bool {
    shared_columns(a, b) >= i64::from(min_overlap)
}

/// Number of shared columns; zero for corner contact, negative for a gap.
#[inline]
fn shared_columns(a: &Interval, b: &Interval) -> i64 {
    a.end.min(b.end) as i64 - a.begin.max(b.begin) as i64 + 1
}

/// Half-open range of buffer indices in a neighboring row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlapRange {
    /// First candidate
    pub start: usize,
    /// One past the last candidate
    pub end: usize,
}

impl OverlapRange {
    /// No neighbor candidates
    pub const EMPTY: OverlapRange = OverlapRange { start: 0, end: 0 };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Number of candidates
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Candidate buffer indices
    #[inline]
    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Per-interval neighbor ranges, one per [`Direction`]
///
/// Built once per clumping call and dropped with it. The first and last
/// index of every range are adjacent to their interval. When `min_overlap`
/// exceeds 1, an interior neighbor shorter than `min_overlap` can still fail
/// the test, so consumers re-check candidates with [`overlaps`].
#[derive(Debug, Clone)]
pub struct OverlapIndex {
    ranges: Vec<[OverlapRange; 4]>,
    min_overlap: i32,
}

impl OverlapIndex {
    /// Sweep every row against each of its existing neighbor rows
    ///
    /// # Arguments
    ///
    /// * `intervals` - Interval buffer the directory indexes into
    /// * `rows` - Validated directory of `ny * nz` rows
    /// * `ny` - Rows per plane
    /// * `nz` - Number of planes (1 for 2D)
    /// * `min_overlap` - Adjacency tolerance
    pub fn build(
        intervals: &[Interval],
        rows: &RowDirectory,
        ny: usize,
        nz: usize,
        min_overlap: i32,
    ) -> ClumpResult<Self> {
        let mut ranges = Vec::new();
        ranges
            .try_reserve_exact(intervals.len())
            .map_err(ClumpError::alloc("overlap index"))?;
        ranges.resize(intervals.len(), [OverlapRange::EMPTY; 4]);

        for row in 0..rows.len() {
            let current = rows.range(row);
            if current.is_empty() {
                continue;
            }
            for dir in Direction::valid_for(row, ny, nz) {
                let neighbor = rows.range(dir.neighbor_row(row, ny));
                sweep(intervals, current.clone(), neighbor, min_overlap, dir, &mut ranges);
            }
        }

        Ok(Self { ranges, min_overlap })
    }

    /// Neighbor candidates of interval `index` in direction `dir`
    #[inline]
    pub fn range(&self, index: usize, dir: Direction) -> OverlapRange {
        self.ranges[index][dir.index()]
    }

    pub fn min_overlap(&self) -> i32 {
        self.min_overlap
    }

    /// Sum of all range lengths, i.e. the work a full labeling pass does
    pub fn total_candidates(&self) -> usize {
        self.ranges
            .iter()
            .flat_map(|per_dir| per_dir.iter())
            .map(OverlapRange::len)
            .sum()
    }
}

/// Two-pointer sweep of one row against one neighbor row.
///
/// `lo` tracks the first neighbor whose end reaches `begin + min_overlap - 1`,
/// `hi` one past the last neighbor whose begin is at most
/// `end - min_overlap + 1`. Both only move forward as the current row advances.
fn sweep(
    intervals: &[Interval],
    current: Range<usize>,
    neighbor: Range<usize>,
    min_overlap: i32,
    dir: Direction,
    ranges: &mut [[OverlapRange; 4]],
) {
    if neighbor.is_empty() {
        return;
    }

    let m = i64::from(min_overlap);
    let mut lo = neighbor.start;
    let mut hi = neighbor.start;

    for index in current {
        let run = &intervals[index];
        let begin = run.begin as i64;
        let end = run.end as i64;

        while lo < neighbor.end && (intervals[lo].end as i64) < begin + m - 1 {
            lo += 1;
        }
        if hi < lo {
            hi = lo;
        }
        while hi < neighbor.end && (intervals[hi].begin as i64) <= end - m + 1 {
            hi += 1;
        }

        // Short neighbors can pass both bounds and still fall under min_overlap
        let mut first = lo;
        let mut last = hi;
        while first < last && !overlaps(run, &intervals[first], min_overlap) {
            first += 1;
        }
        while last > first && !overlaps(run, &intervals[last - 1], min_overlap) {
            last -= 1;
        }

        ranges[index][dir.index()] = if first < last {
            OverlapRange { start: first, end: last }
        } else {
            OverlapRange::EMPTY
        };
    }
}
