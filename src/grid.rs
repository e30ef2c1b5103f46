//! Threshold-and-clump in one call
//!
//! Convenience layer for callers that hold the raw field rather than
//! intervals: threshold a flat grid or volume, clump the runs and keep both
//! together in a [`ClumpedGrid`].

use crate::clump::{clump_intervals_3d, ClumpParams, ClumpSet, ClumpSummary};
use crate::error::{ClumpResult, InvalidInput};
use crate::interval::Interval;
use crate::threshold::find_intervals;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Intervals of a thresholded grid and the clumps they form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClumpedGrid {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    /// Labeled intervals, sorted by row id then `begin`
    pub intervals: Vec<Interval>,
    pub clumps: ClumpSet,
}

impl ClumpedGrid {
    /// Number of clumps
    pub fn len(&self) -> usize {
        self.clumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clumps.is_empty()
    }

    /// Members of the `k`-th clump
    ///
    /// # Panics
    ///
    /// Panics if `k` is not less than [`len`](Self::len).
    pub fn clump_intervals(&self, k: usize) -> impl Iterator<Item = &Interval> + '_ {
        self.clumps
            .intervals_of(k)
            .iter()
            .map(move |&index| &self.intervals[index])
    }

    /// The largest clump by grid points, if any
    pub fn largest(&self) -> Option<&ClumpSummary> {
        self.clumps.clumps().iter().max_by_key(|clump| clump.points)
    }

    /// Per-cell clump ids, row-major over `nz * ny * nx`, 0 where inactive
    pub fn label_grid(&self) -> Vec<u32> {
        let mut labels = vec![0; self.nx * self.ny * self.nz];
        for run in &self.intervals {
            let start = run.row * self.nx;
            labels[start + run.begin..=start + run.end].fill(run.label);
        }
        labels
    }
}

/// Threshold and clump a 2D grid
///
/// Cells with `value >= threshold` are active.
///
/// # Example
///
/// ```
/// use geo_clumps::{clump_grid, ClumpParams};
///
/// let values = [
///     50.0, 50.0, 0.0, 0.0,
///     0.0,  0.0,  0.0, 0.0,
///     0.0,  0.0,  0.0, 45.0,
/// ];
/// let grid = clump_grid(&values, 4, 3, 40.0, ClumpParams::default()).unwrap();
///
/// assert_eq!(grid.len(), 2);
/// assert_eq!(grid.label_grid()[11], 2);
/// ```
pub fn clump_grid(
    values: &[f32],
    nx: usize,
    ny: usize,
    threshold: f32,
    params: ClumpParams,
) -> ClumpResult<ClumpedGrid> {
    clump_volume(values, nx, ny, 1, threshold, params)
}

/// Threshold and clump a 3D volume laid out plane after plane
pub fn clump_volume(
    values: &[f32],
    nx: usize,
    ny: usize,
    nz: usize,
    threshold: f32,
    params: ClumpParams,
) -> ClumpResult<ClumpedGrid> {
    if ny == 0 {
        return Err(InvalidInput::EmptyExtent { name: "ny" }.into());
    }
    if nz == 0 {
        return Err(InvalidInput::EmptyExtent { name: "nz" }.into());
    }

    let mut intervals = find_intervals(values, nx, ny.saturating_mul(nz), threshold)?;
    debug!(nx, ny, nz, threshold, n_intervals = intervals.len(), "grid thresholded");

    let clumps = clump_intervals_3d(&mut intervals, ny, nz, params)?;
    Ok(ClumpedGrid {
        nx,
        ny,
        nz,
        intervals,
        clumps,
    })
}
