//! Explicit-stack region growing over the overlap index
//!
//! A clump can chain through thousands of rows (a long squall line crossing
//! the whole domain), so the fill keeps its frontier on a heap stack instead
//! of recursing.

use crate::clump::GridBox;
use crate::error::{try_push, ClumpError, ClumpResult};
use crate::interval::{Direction, Interval, UNLABELED};
use crate::overlap::{overlaps, OverlapIndex};
use tracing::trace;

const INITIAL_STACK: usize = 64;

/// Totals for one grown clump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStats {
    /// Number of intervals labeled
    pub size: usize,
    /// Number of grid points covered
    pub points: usize,
    pub bbox: GridBox,
}

/// Working state for labeling clumps within one clumping call
///
/// Holds only the stack, which is reused from seed to seed and released
/// when the context is dropped. Each call owns its own context, so
/// independent grids can be clumped on separate threads.
#[derive(Debug, Default)]
pub struct SeedFill {
    stack: Vec<usize>,
}

impl SeedFill {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// Label everything reachable from `seed` with `label`
    ///
    /// The seed and every interval reached from it are labeled, appended to
    /// `ordering` in the order they are discovered, and pushed on the stack.
    /// Popped intervals scan their neighbor ranges in every direction that
    /// exists for their row; unlabeled neighbors that pass the adjacency test
    /// join the clump.
    ///
    /// # Arguments
    ///
    /// * `seed` - Buffer index of an unlabeled interval
    /// * `label` - Clump id to assign
    /// * `intervals` - Interval buffer, labels are written in place
    /// * `index` - Overlap index built over the same buffer
    /// * `ny` - Rows per plane
    /// * `nz` - Number of planes
    /// * `ordering` - Output ordering the clump's members are appended to
    ///
    /// # Errors
    ///
    /// [`ClumpError::Allocation`] if the stack cannot grow. Labels written so
    /// far stay in place.
    #[allow(clippy::too_many_arguments)]
    pub fn fill(
        &mut self,
        seed: usize,
        label: u32,
        intervals: &mut [Interval],
        index: &OverlapIndex,
        ny: usize,
        nz: usize,
        ordering: &mut Vec<usize>,
    ) -> ClumpResult<FillStats> {
        debug_assert_eq!(intervals[seed].label, UNLABELED);
        self.stack.clear();

        let mut stats = FillStats {
            size: 0,
            points: 0,
            bbox: GridBox::from_interval(&intervals[seed], ny),
        };

        intervals[seed].label = label;
        try_push(ordering, seed, "interval ordering")?;
        self.push(seed)?;

        let min_overlap = index.min_overlap();
        while let Some(current) = self.stack.pop() {
            let run = intervals[current];
            stats.size += 1;
            stats.points += run.len();
            stats.bbox.expand(&run, ny);

            for dir in Direction::valid_for(run.row, ny, nz) {
                for neighbor in index.range(current, dir).indices() {
                    let candidate = &mut intervals[neighbor];
                    if candidate.label != UNLABELED || !overlaps(&run, candidate, min_overlap) {
                        continue;
                    }
                    candidate.label = label;
                    try_push(ordering, neighbor, "interval ordering")?;
                    self.push(neighbor)?;
                }
            }
        }

        trace!(label, size = stats.size, points = stats.points, "clump filled");
        Ok(stats)
    }

    fn push(&mut self, index: usize) -> ClumpResult<()> {
        if self.stack.capacity() == 0 {
            self.stack
                .try_reserve(INITIAL_STACK)
                .map_err(ClumpError::alloc("seed-fill stack"))?;
        }
        try_push(&mut self.stack, index, "seed-fill stack")
    }
}
