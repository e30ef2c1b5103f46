//! Run-length encoding of a thresholded grid
//!
//! Scans a flat row-major `f32` array (e.g. straight out of a Zarr chunk or a
//! radar Cartesian volume) and emits one [`Interval`] per run of active cells.
//! Volumes are passed as `nz * ny` rows, plane after plane, so the row index
//! of each interval is already the flattened row id.
//!
//! Output is sorted by row then `begin`, which is exactly the order the
//! flat-form clumping entry points expect.

use crate::error::{try_push, ClumpResult, InvalidInput};
use crate::interval::Interval;

/// Intervals of cells with `value >= threshold`
///
/// NaN (missing data) is never active.
///
/// # Arguments
///
/// * `values` - Row-major values, `nx * nrows` long
/// * `nx` - Columns per row
/// * `nrows` - Number of rows (`ny` for a grid, `ny * nz` for a volume)
/// * `threshold` - Lowest active value
///
/// # Example
///
/// ```
/// use geo_clumps::find_intervals;
///
/// let dbz = [
///     10.0, 40.0, 45.0, 12.0,
///     38.0, 36.0,  5.0, 50.0,
/// ];
/// let runs = find_intervals(&dbz, 4, 2, 35.0).unwrap();
///
/// assert_eq!(runs.len(), 3);
/// assert_eq!((runs[0].row, runs[0].begin, runs[0].end), (0, 1, 2));
/// assert_eq!((runs[1].row, runs[1].begin, runs[1].end), (1, 0, 1));
/// assert_eq!((runs[2].row, runs[2].begin, runs[2].end), (1, 3, 3));
/// ```
pub fn find_intervals(values: &[f32], nx: usize, nrows: usize, threshold: f32) -> ClumpResult<Vec<Interval>> {
    scan(values, nx, nrows, |value| value >= threshold)
}

/// Intervals of cells with `value < threshold`
///
/// Useful for clumping minima such as cloud-top temperatures. NaN is never
/// active.
pub fn find_intervals_below(
    values: &[f32],
    nx: usize,
    nrows: usize,
    threshold: f32,
) -> ClumpResult<Vec<Interval>> {
    scan(values, nx, nrows, |value| value < threshold)
}

fn scan<F>(values: &[f32], nx: usize, nrows: usize, active: F) -> ClumpResult<Vec<Interval>>
where
    F: Fn(f32) -> bool,
{
    if nx == 0 {
        return Err(InvalidInput::EmptyExtent { name: "nx" }.into());
    }
    if nrows == 0 {
        return Err(InvalidInput::EmptyExtent { name: "rows" }.into());
    }
    let expected = nx.saturating_mul(nrows);
    if values.len() != expected {
        return Err(InvalidInput::GridSize {
            nx,
            nrows,
            expected,
            found: values.len(),
        }
        .into());
    }

    let mut intervals = Vec::new();
    for (row, cells) in values.chunks_exact(nx).enumerate() {
        let mut begin: Option<usize> = None;
        for (col, &value) in cells.iter().enumerate() {
            match (active(value), begin) {
                (true, None) => begin = Some(col),
                (false, Some(start)) => {
                    try_push(&mut intervals, Interval::new(row, start, col - 1), "intervals")?;
                    begin = None;
                }
                _ => {}
            }
        }
        if let Some(start) = begin {
            try_push(&mut intervals, Interval::new(row, start, nx - 1), "intervals")?;
        }
    }

    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClumpError;

    #[test]
    fn test_runs_touching_both_edges() {
        let values = [1.0, 1.0, 0.0, 1.0];
        let runs = find_intervals(&values, 4, 1, 0.5).unwrap();
        assert_eq!(runs, vec![Interval::new(0, 0, 1), Interval::new(0, 3, 3)]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let values = [20.0, 19.999, 20.0];
        let runs = find_intervals(&values, 3, 1, 20.0).unwrap();
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn test_nan_is_inactive() {
        let values = [5.0, f32::NAN, 5.0];
        assert_eq!(find_intervals(&values, 3, 1, 1.0).unwrap().len(), 2);
        assert_eq!(find_intervals_below(&values, 3, 1, 10.0).unwrap().len(), 2);
    }

    #[test]
    fn test_below_threshold() {
        let values = [-60.0, -55.0, -20.0, -70.0];
        let runs = find_intervals_below(&values, 2, 2, -50.0).unwrap();
        assert_eq!(runs, vec![Interval::new(0, 0, 1), Interval::new(1, 1, 1)]);
    }

    #[test]
    fn test_runs_do_not_wrap_rows() {
        // Active cell at the end of row 0 and start of row 1 are separate runs
        let values = [0.0, 1.0, 1.0, 0.0];
        let runs = find_intervals(&values, 2, 2, 1.0).unwrap();
        assert_eq!(runs, vec![Interval::new(0, 1, 1), Interval::new(1, 0, 0)]);
    }

    #[test]
    fn test_size_mismatch() {
        let values = [0.0; 5];
        assert!(matches!(
            find_intervals(&values, 2, 2, 1.0),
            Err(ClumpError::InvalidInput(InvalidInput::GridSize { expected: 4, found: 5, .. }))
        ));
    }

    #[test]
    fn test_zero_columns() {
        assert!(matches!(
            find_intervals(&[], 0, 2, 1.0),
            Err(ClumpError::InvalidInput(InvalidInput::EmptyExtent { name: "nx" }))
        ));
    }
}
