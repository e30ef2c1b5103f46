//! Parallel clumping of one field at several thresholds
//!
//! Storm identification usually runs a field at a ladder of reflectivity
//! thresholds (e.g. 35, 45, 55 dBZ). Each threshold is an independent
//! clumping call with its own row directory, overlap index and stack, so the
//! levels are spread over Rayon's thread pool with nothing shared but the
//! read-only input.

use crate::clump::ClumpParams;
use crate::error::ClumpResult;
use crate::grid::{clump_volume, ClumpedGrid};
use rayon::prelude::*;
use tracing::debug;

/// Clump a grid or volume at every threshold in parallel
///
/// # Arguments
///
/// * `values` - Row-major values, `nx * ny * nz` long
/// * `nx`, `ny`, `nz` - Grid extent (`nz = 1` for 2D)
/// * `thresholds` - Levels to clump at, each producing one result
/// * `params` - Shared adjacency tolerance and clearing policy
///
/// # Returns
///
/// `(threshold, result)` pairs in the order of `thresholds`. A failure at
/// one level does not affect the others.
///
/// # Example
///
/// ```
/// use geo_clumps::{do_concurrent_grid, ClumpParams};
///
/// let values = [30.0, 50.0, 30.0, 0.0, 50.0];
/// let results = do_concurrent_grid(&values, 5, 1, 1, &[20.0, 40.0], ClumpParams::default());
///
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[0].1.as_ref().unwrap().len(), 2);
/// assert_eq!(results[1].1.as_ref().unwrap().len(), 2);
/// ```
pub fn do_concurrent_grid(
    values: &[f32],
    nx: usize,
    ny: usize,
    nz: usize,
    thresholds: &[f32],
    params: ClumpParams,
) -> Vec<(f32, ClumpResult<ClumpedGrid>)> {
    debug!(
        n_thresholds = thresholds.len(),
        nx,
        ny,
        nz,
        "clumping thresholds concurrently"
    );

    thresholds
        .par_iter()
        .map(|&threshold| (threshold, clump_volume(values, nx, ny, nz, threshold, params)))
        .collect()
}
