//! Clumping driver
//!
//! This module ties the pieces together for one grid or volume:
//! 1. Optionally clears existing labels
//! 2. Organizes a flat interval buffer into a [`RowDirectory`] (flat form only)
//! 3. Builds the [`OverlapIndex`] once
//! 4. Walks rows in row-major order, planes outermost, seeding a new clump at
//!    every interval that is still unlabeled
//!
//! The result is a [`ClumpSet`]: one ordering buffer holding interval indices
//! grouped by clump, plus a [`ClumpSummary`] per clump giving its offset and
//! length in that buffer.

use crate::error::{try_push, ClumpError, ClumpResult, InvalidInput};
use crate::interval::{Interval, UNLABELED};
use crate::overlap::OverlapIndex;
use crate::row_directory::RowDirectory;
use crate::seed_fill::SeedFill;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Parameters for one clumping call
///
/// # Example
///
/// ```
/// use geo_clumps::ClumpParams;
///
/// // 4-connectivity, keep labels from an earlier pass
/// let params = ClumpParams::default().with_min_overlap(1).with_clear(false);
/// assert_eq!(params.min_overlap, 1);
/// assert!(!params.clear);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClumpParams {
    /// Adjacency tolerance between neighboring rows and planes
    ///
    /// Positive values require that many shared columns, zero accepts
    /// touching and diagonal contact, negative values bridge a gap of up to
    /// that many columns.
    pub min_overlap: i32,

    /// Reset every label to [`UNLABELED`] before clumping
    ///
    /// Leave this off only to clump intervals added since the previous call;
    /// intervals that already carry a label are then neither reseeded nor
    /// merged into new clumps.
    pub clear: bool,
}

impl Default for ClumpParams {
    fn default() -> Self {
        Self {
            min_overlap: 0,
            clear: true,
        }
    }
}

impl ClumpParams {
    pub fn new(min_overlap: i32) -> Self {
        Self {
            min_overlap,
            ..Self::default()
        }
    }

    pub fn with_min_overlap(mut self, min_overlap: i32) -> Self {
        self.min_overlap = min_overlap;
        self
    }

    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }
}

/// Inclusive bounding box of a clump in grid indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBox {
    pub xmin: usize,
    pub xmax: usize,
    pub ymin: usize,
    pub ymax: usize,
    pub zmin: usize,
    pub zmax: usize,
}

impl GridBox {
    /// Box around a single interval of a grid with `ny` rows per plane
    pub fn from_interval(run: &Interval, ny: usize) -> Self {
        let y = run.row_in_plane(ny);
        let z = run.plane(ny);
        Self {
            xmin: run.begin,
            xmax: run.end,
            ymin: y,
            ymax: y,
            zmin: z,
            zmax: z,
        }
    }

    /// Grow to cover `run`
    pub fn expand(&mut self, run: &Interval, ny: usize) {
        let y = run.row_in_plane(ny);
        let z = run.plane(ny);
        self.xmin = self.xmin.min(run.begin);
        self.xmax = self.xmax.max(run.end);
        self.ymin = self.ymin.min(y);
        self.ymax = self.ymax.max(y);
        self.zmin = self.zmin.min(z);
        self.zmax = self.zmax.max(z);
    }

    pub fn nx(&self) -> usize {
        self.xmax - self.xmin + 1
    }

    pub fn ny(&self) -> usize {
        self.ymax - self.ymin + 1
    }

    pub fn nz(&self) -> usize {
        self.zmax - self.zmin + 1
    }
}

/// One clump found by a clumping call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClumpSummary {
    /// Label written to every member interval
    pub id: u32,
    /// Start of this clump's members in [`ClumpSet::ordering`]
    pub offset: usize,
    /// Number of member intervals
    pub size: usize,
    /// Number of grid points covered
    pub points: usize,
    pub bbox: GridBox,
}

/// Clumps found in one grid or volume
///
/// `ordering` holds buffer indices of the labeled intervals, grouped so each
/// clump's members are contiguous. Within a clump the order follows the
/// fill's discovery order; only membership is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClumpSet {
    ordering: Vec<usize>,
    clumps: Vec<ClumpSummary>,
}

impl ClumpSet {
    /// Number of clumps
    pub fn len(&self) -> usize {
        self.clumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clumps.is_empty()
    }

    pub fn clumps(&self) -> &[ClumpSummary] {
        &self.clumps
    }

    pub fn ordering(&self) -> &[usize] {
        &self.ordering
    }

    /// Summary of the `k`-th clump found (not its id)
    pub fn get(&self, k: usize) -> Option<&ClumpSummary> {
        self.clumps.get(k)
    }

    /// Buffer indices of the members of the `k`-th clump
    ///
    /// # Panics
    ///
    /// Panics if `k` is not less than [`len`](Self::len).
    pub fn intervals_of(&self, k: usize) -> &[usize] {
        let clump = &self.clumps[k];
        &self.ordering[clump.offset..clump.offset + clump.size]
    }

    /// Each clump together with its member indices
    pub fn iter(&self) -> impl Iterator<Item = (&ClumpSummary, &[usize])> + '_ {
        self.clumps
            .iter()
            .map(move |clump| (clump, &self.ordering[clump.offset..clump.offset + clump.size]))
    }

    /// Total grid points over all clumps
    pub fn total_points(&self) -> usize {
        self.clumps.iter().map(|clump| clump.points).sum()
    }
}

/// Timings and counts for one clumping call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClumpMetrics {
    pub organize_ms: f64,
    pub overlap_ms: f64,
    pub labeling_ms: f64,
    pub total_ms: f64,
    pub n_intervals: usize,
    pub n_clumps: usize,
    /// Sum of all neighbor range lengths in the overlap index
    pub n_candidates: usize,
}

/// Clump a 2D grid from a flat interval buffer
///
/// # Arguments
///
/// * `intervals` - All intervals of the grid, sorted by row then `begin`
/// * `ny` - Number of rows in the grid
/// * `params` - Adjacency tolerance and label clearing
///
/// # Returns
///
/// The clumps found, in discovery order. Every interval's `label` is set to
/// its clump id.
///
/// # Example
///
/// ```
/// use geo_clumps::{clump_intervals_2d, ClumpParams, Interval};
///
/// let mut intervals = vec![
///     Interval::new(0, 0, 4),
///     Interval::new(1, 4, 8),   // touches the run below at column 4
///     Interval::new(3, 20, 22), // isolated
/// ];
///
/// let clumps = clump_intervals_2d(&mut intervals, 4, ClumpParams::default()).unwrap();
///
/// assert_eq!(clumps.len(), 2);
/// assert_eq!(clumps.clumps()[0].points, 10);
/// assert_eq!(intervals[0].label, intervals[1].label);
/// ```
pub fn clump_intervals_2d(
    intervals: &mut [Interval],
    ny: usize,
    params: ClumpParams,
) -> ClumpResult<ClumpSet> {
    clump_intervals_with_metrics(intervals, ny, 1, params).map(|(clumps, _)| clumps)
}

/// Clump a 3D volume from a flat interval buffer
///
/// Row ids are `plane * ny + row_in_plane`; the buffer is sorted by row id
/// then `begin`.
pub fn clump_intervals_3d(
    intervals: &mut [Interval],
    ny: usize,
    nz: usize,
    params: ClumpParams,
) -> ClumpResult<ClumpSet> {
    clump_intervals_with_metrics(intervals, ny, nz, params).map(|(clumps, _)| clumps)
}

/// Flat-form clumping that also reports per-phase timings
///
/// Pass `nz = 1` for a 2D grid.
pub fn clump_intervals_with_metrics(
    intervals: &mut [Interval],
    ny: usize,
    nz: usize,
    params: ClumpParams,
) -> ClumpResult<(ClumpSet, ClumpMetrics)> {
    let organize_start = Instant::now();
    let nrows = check_extent(ny, nz)?;
    let rows = RowDirectory::organize(intervals, nrows)
        .inspect_err(|err| warn!(%err, "rejecting interval buffer"))?;
    let organize_ms = organize_start.elapsed().as_secs_f64() * 1000.0;

    debug!(nrows, n_intervals = intervals.len(), organize_ms, "rows organized");

    let (clumps, mut metrics) = label_volume(intervals, &rows, ny, nz, params)?;
    metrics.organize_ms = organize_ms;
    metrics.total_ms += organize_ms;
    Ok((clumps, metrics))
}

/// Clump a 2D grid through a caller-maintained row directory
///
/// The directory has one slot per row. Intervals of the buffer that no slot
/// refers to are ignored and keep their labels.
pub fn clump_rows_2d(
    intervals: &mut [Interval],
    rows: &RowDirectory,
    params: ClumpParams,
) -> ClumpResult<ClumpSet> {
    clump_rows_3d(intervals, rows, rows.len(), 1, params)
}

/// Clump a 3D volume through a caller-maintained row directory of `ny * nz` rows
pub fn clump_rows_3d(
    intervals: &mut [Interval],
    rows: &RowDirectory,
    ny: usize,
    nz: usize,
    params: ClumpParams,
) -> ClumpResult<ClumpSet> {
    let nrows = check_extent(ny, nz)?;
    if rows.len() != nrows {
        return Err(InvalidInput::DirectorySize {
            expected: nrows,
            found: rows.len(),
        }
        .into());
    }
    rows.validate(intervals)
        .inspect_err(|err| warn!(%err, "rejecting row directory"))?;

    label_volume(intervals, rows, ny, nz, params).map(|(clumps, _)| clumps)
}

fn check_extent(ny: usize, nz: usize) -> ClumpResult<usize> {
    if ny == 0 {
        return Err(InvalidInput::EmptyExtent { name: "ny" }.into());
    }
    if nz == 0 {
        return Err(InvalidInput::EmptyExtent { name: "nz" }.into());
    }
    ny.checked_mul(nz)
        .ok_or_else(|| InvalidInput::ExtentOverflow { ny, nz }.into())
}

/// Shared tail of every entry point: overlap index, then seed every unlabeled interval.
fn label_volume(
    intervals: &mut [Interval],
    rows: &RowDirectory,
    ny: usize,
    nz: usize,
    params: ClumpParams,
) -> ClumpResult<(ClumpSet, ClumpMetrics)> {
    let overlap_start = Instant::now();

    // Only intervals reachable through the directory take part
    let mut last_label = if params.clear {
        for row in 0..rows.len() {
            for run in &mut intervals[rows.range(row)] {
                run.label = UNLABELED;
            }
        }
        UNLABELED
    } else {
        (0..rows.len())
            .flat_map(|row| intervals[rows.range(row)].iter())
            .map(|run| run.label)
            .max()
            .unwrap_or(UNLABELED)
    };

    let index = OverlapIndex::build(intervals, rows, ny, nz, params.min_overlap)?;
    let overlap_ms = overlap_start.elapsed().as_secs_f64() * 1000.0;

    let labeling_start = Instant::now();
    let mut ordering = Vec::new();
    ordering
        .try_reserve_exact(intervals.len())
        .map_err(ClumpError::alloc("interval ordering"))?;
    let mut clumps: Vec<ClumpSummary> = Vec::new();
    let mut filler = SeedFill::new();

    for row in 0..rows.len() {
        for seed in rows.range(row) {
            if intervals[seed].label != UNLABELED {
                continue;
            }

            let label = last_label
                .checked_add(1)
                .ok_or(InvalidInput::LabelOverflow { last: last_label })
                .inspect_err(|err| warn!(%err, "clump ids exhausted"))?;
            let offset = ordering.len();
            let stats = filler.fill(seed, label, intervals, &index, ny, nz, &mut ordering)?;

            let summary = ClumpSummary {
                id: label,
                offset,
                size: stats.size,
                points: stats.points,
                bbox: stats.bbox,
            };
            try_push(&mut clumps, summary, "clump summaries")?;
            last_label = label;
        }
    }
    let labeling_ms = labeling_start.elapsed().as_secs_f64() * 1000.0;

    let metrics = ClumpMetrics {
        organize_ms: 0.0,
        overlap_ms,
        labeling_ms,
        total_ms: overlap_ms + labeling_ms,
        n_intervals: ordering.len(),
        n_clumps: clumps.len(),
        n_candidates: index.total_candidates(),
    };

    debug!(
        n_clumps = metrics.n_clumps,
        n_intervals = metrics.n_intervals,
        n_candidates = metrics.n_candidates,
        overlap_ms,
        labeling_ms,
        "clumping complete"
    );

    Ok((ClumpSet { ordering, clumps }, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default() {
        let params = ClumpParams::default();
        assert_eq!(params.min_overlap, 0);
        assert!(params.clear);
        assert_eq!(ClumpParams::new(-2).min_overlap, -2);
    }

    #[test]
    fn test_params_from_json_fills_defaults() {
        let params: ClumpParams = serde_json::from_str(r#"{ "min_overlap": 2 }"#).unwrap();
        assert_eq!(params, ClumpParams::new(2));
    }

    #[test]
    fn test_grid_box_expand() {
        let ny = 4;
        let mut bbox = GridBox::from_interval(&Interval::new(5, 3, 6), ny);
        assert_eq!((bbox.ymin, bbox.zmin), (1, 1));

        bbox.expand(&Interval::new(10, 1, 2), ny);
        assert_eq!(bbox.nx(), 6);
        assert_eq!(bbox.ny(), 2);
        assert_eq!(bbox.nz(), 2);
    }

    #[test]
    fn test_empty_input_gives_no_clumps() {
        let mut intervals: Vec<Interval> = Vec::new();
        let clumps = clump_intervals_2d(&mut intervals, 10, ClumpParams::default()).unwrap();
        assert!(clumps.is_empty());
        assert!(clumps.ordering().is_empty());
    }

    #[test]
    fn test_zero_extent_rejected() {
        let mut intervals = vec![Interval::new(0, 0, 1)];
        assert!(matches!(
            clump_intervals_2d(&mut intervals, 0, ClumpParams::default()),
            Err(ClumpError::InvalidInput(InvalidInput::EmptyExtent { name: "ny" }))
        ));
        assert!(matches!(
            clump_intervals_3d(&mut intervals, 1, 0, ClumpParams::default()),
            Err(ClumpError::InvalidInput(InvalidInput::EmptyExtent { name: "nz" }))
        ));
    }

    #[test]
    fn test_directory_size_mismatch() {
        let mut intervals = vec![Interval::new(0, 0, 1)];
        let rows = RowDirectory::organize(&intervals, 3).unwrap();
        assert!(matches!(
            clump_rows_3d(&mut intervals, &rows, 2, 2, ClumpParams::default()),
            Err(ClumpError::InvalidInput(InvalidInput::DirectorySize { expected: 4, found: 3 }))
        ));
    }

    #[test]
    fn test_extent_overflow_rejected() {
        let mut intervals: Vec<Interval> = Vec::new();
        assert!(matches!(
            clump_intervals_3d(&mut intervals, usize::MAX, 2, ClumpParams::default()),
            Err(ClumpError::InvalidInput(InvalidInput::ExtentOverflow { ny: usize::MAX, nz: 2 }))
        ));
    }

    #[test]
    fn test_highest_label_without_new_clumps() {
        let mut intervals = vec![Interval::new(0, 0, 3)];
        intervals[0].label = u32::MAX;
        let params = ClumpParams::default().with_clear(false);

        let clumps = clump_intervals_2d(&mut intervals, 1, params).unwrap();
        assert!(clumps.is_empty());
        assert_eq!(intervals[0].label, u32::MAX);
    }

    #[test]
    fn test_label_overflow_rejected() {
        let mut intervals = vec![Interval::new(0, 0, 3), Interval::new(1, 10, 12)];
        intervals[0].label = u32::MAX;
        let params = ClumpParams::default().with_clear(false);

        assert!(matches!(
            clump_intervals_2d(&mut intervals, 2, params),
            Err(ClumpError::InvalidInput(InvalidInput::LabelOverflow { last: u32::MAX }))
        ));
        assert_eq!(intervals[1].label, UNLABELED);
    }

    #[test]
    fn test_last_free_label_is_used() {
        let mut intervals = vec![Interval::new(0, 0, 3), Interval::new(1, 10, 12)];
        intervals[0].label = u32::MAX - 1;
        let params = ClumpParams::default().with_clear(false);

        let clumps = clump_intervals_2d(&mut intervals, 2, params).unwrap();
        assert_eq!(clumps.clumps()[0].id, u32::MAX);
        assert_eq!(intervals[1].label, u32::MAX);
    }

    #[test]
    fn test_summary_offsets_partition_ordering() {
        let mut intervals = vec![
            Interval::new(0, 0, 1),
            Interval::new(0, 5, 6),
            Interval::new(1, 1, 2),
            Interval::new(2, 9, 9),
        ];
        let clumps = clump_intervals_2d(&mut intervals, 3, ClumpParams::new(1)).unwrap();

        assert_eq!(clumps.len(), 3);
        let mut offset = 0;
        for (clump, members) in clumps.iter() {
            assert_eq!(clump.offset, offset);
            assert_eq!(members.len(), clump.size);
            for &index in members {
                assert_eq!(intervals[index].label, clump.id);
            }
            offset += clump.size;
        }
        assert_eq!(offset, intervals.len());
        assert_eq!(clumps.total_points(), 2 + 2 + 2 + 1);
    }

    #[test]
    fn test_ids_follow_row_major_seed_order() {
        let mut intervals = vec![
            Interval::new(0, 10, 12),
            Interval::new(1, 0, 2),
            Interval::new(1, 10, 12),
        ];
        let clumps = clump_intervals_2d(&mut intervals, 2, ClumpParams::default()).unwrap();

        // First seed is row 0, so [10,12] in both rows is clump 1
        assert_eq!(intervals[0].label, 1);
        assert_eq!(intervals[2].label, 1);
        assert_eq!(intervals[1].label, 2);
        assert_eq!(clumps.get(1).map(|c| c.id), Some(2));
    }

    #[test]
    fn test_metrics_counts() {
        let mut intervals = vec![Interval::new(0, 0, 3), Interval::new(1, 2, 5), Interval::new(1, 9, 9)];
        let (clumps, metrics) =
            clump_intervals_with_metrics(&mut intervals, 2, 1, ClumpParams::default()).unwrap();

        assert_eq!(metrics.n_clumps, clumps.len());
        assert_eq!(metrics.n_intervals, 3);
        // [0,3] <-> [2,5] in both directions
        assert_eq!(metrics.n_candidates, 2);
        assert!(metrics.total_ms >= metrics.labeling_ms);
    }

    #[test]
    fn test_clump_set_serializes() {
        let mut intervals = vec![Interval::new(0, 2, 4)];
        let clumps = clump_intervals_2d(&mut intervals, 1, ClumpParams::default()).unwrap();
        let json = serde_json::to_value(&clumps).unwrap();

        assert_eq!(json["ordering"], serde_json::json!([0]));
        assert_eq!(json["clumps"][0]["points"], serde_json::json!(3));
        assert_eq!(json["clumps"][0]["bbox"]["xmax"], serde_json::json!(4));
    }
}
