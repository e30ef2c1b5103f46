//! Run-length representation of active grid cells
//!
//! An [`Interval`] is one maximal run of active cells inside a single row.
//! For volumes the row id is flattened as `plane * ny + row_in_plane`, so a
//! 3D grid is just `nz * ny` rows stacked plane after plane.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Label carried by an interval that has not been assigned to a clump yet.
pub const UNLABELED: u32 = 0;

/// A run of active cells `begin..=end` in one row
///
/// Rows hold their intervals sorted by `begin` and never sharing a column.
/// The thresholding step produces them that way; the clumping entry points
/// check it and reject anything else.
///
/// # Example
///
/// ```
/// use geo_clumps::{Interval, UNLABELED};
///
/// let run = Interval::new(3, 10, 14);
/// assert_eq!(run.len(), 5);
/// assert_eq!(run.label, UNLABELED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Row id (row in plane for 2D, `plane * ny + row` for 3D)
    pub row: usize,

    /// First active column
    pub begin: usize,

    /// Last active column (inclusive)
    pub end: usize,

    /// Clump id, or [`UNLABELED`]
    pub label: u32,
}

impl Interval {
    /// Create an unlabeled interval covering columns `begin..=end` of `row`
    pub fn new(row: usize, begin: usize, end: usize) -> Self {
        Self {
            row,
            begin,
            end,
            label: UNLABELED,
        }
    }

    /// Number of grid points covered, `end - begin + 1`
    #[allow(clippy::len_without_is_empty)]
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.begin + 1
    }

    /// True once a clump id has been written
    #[inline]
    pub fn is_labeled(&self) -> bool {
        self.label != UNLABELED
    }

    /// Plane index for a grid with `ny` rows per plane
    #[inline]
    pub fn plane(&self, ny: usize) -> usize {
        self.row / ny
    }

    /// Row index within its plane
    #[inline]
    pub fn row_in_plane(&self, ny: usize) -> usize {
        self.row % ny
    }
}

/// Neighbor directions searched when growing a clump
///
/// South and North step one row within the same plane; Down and Up step one
/// plane at the same row. 2D grids only ever use South and North.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    South,
    North,
    Down,
    Up,
}

impl Direction {
    /// Every direction, in [`index`](Self::index) order
    pub const ALL: [Direction; 4] = [
        Direction::South,
        Direction::North,
        Direction::Down,
        Direction::Up,
    ];

    /// Slot of this direction in per-interval arrays
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Direction::South => 0,
            Direction::North => 1,
            Direction::Down => 2,
            Direction::Up => 3,
        }
    }

    /// Directions that lead to an existing row from `row`
    ///
    /// `ny` is rows per plane and `nz` the number of planes (1 for 2D). Rows on
    /// the edge of a plane or volume get fewer directions.
    pub fn valid_for(row: usize, ny: usize, nz: usize) -> ArrayVec<Direction, 4> {
        let mut dirs = ArrayVec::new();
        let row_in_plane = row % ny;
        let plane = row / ny;

        if row_in_plane > 0 {
            dirs.push(Direction::South);
        }
        if row_in_plane + 1 < ny {
            dirs.push(Direction::North);
        }
        if plane > 0 {
            dirs.push(Direction::Down);
        }
        if plane + 1 < nz {
            dirs.push(Direction::Up);
        }
        dirs
    }

    /// Row id reached by stepping from `row` in this direction
    ///
    /// Only meaningful for directions returned by [`Direction::valid_for`].
    #[inline]
    pub fn neighbor_row(self, row: usize, ny: usize) -> usize {
        match self {
            Direction::South => row - 1,
            Direction::North => row + 1,
            Direction::Down => row - ny,
            Direction::Up => row + ny,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_creation() {
        let run = Interval::new(2, 4, 9);
        assert_eq!(run.row, 2);
        assert_eq!(run.begin, 4);
        assert_eq!(run.end, 9);
        assert_eq!(run.len(), 6);
        assert!(!run.is_labeled());
    }

    #[test]
    fn test_single_cell_interval() {
        let run = Interval::new(0, 7, 7);
        assert_eq!(run.len(), 1);
    }

    #[test]
    fn test_plane_and_row_in_plane() {
        // 3 planes of 5 rows: row id 12 is plane 2, row 2
        let run = Interval::new(12, 0, 0);
        assert_eq!(run.plane(5), 2);
        assert_eq!(run.row_in_plane(5), 2);
    }

    #[test]
    fn test_directions_2d_edges() {
        assert_eq!(Direction::valid_for(0, 4, 1).as_slice(), &[Direction::North]);
        assert_eq!(
            Direction::valid_for(2, 4, 1).as_slice(),
            &[Direction::South, Direction::North]
        );
        assert_eq!(Direction::valid_for(3, 4, 1).as_slice(), &[Direction::South]);
    }

    #[test]
    fn test_directions_single_row_grid() {
        assert!(Direction::valid_for(0, 1, 1).is_empty());
    }

    #[test]
    fn test_directions_3d() {
        // ny = 3, nz = 3: row id 4 is plane 1, row 1 -> all four directions
        let dirs = Direction::valid_for(4, 3, 3);
        assert_eq!(dirs.len(), 4);

        // bottom plane, top row
        let dirs = Direction::valid_for(2, 3, 3);
        assert_eq!(dirs.as_slice(), &[Direction::South, Direction::Up]);

        // top plane, first row
        let dirs = Direction::valid_for(6, 3, 3);
        assert_eq!(dirs.as_slice(), &[Direction::North, Direction::Down]);
    }

    #[test]
    fn test_neighbor_rows() {
        assert_eq!(Direction::South.neighbor_row(4, 3), 3);
        assert_eq!(Direction::North.neighbor_row(4, 3), 5);
        assert_eq!(Direction::Down.neighbor_row(4, 3), 1);
        assert_eq!(Direction::Up.neighbor_row(4, 3), 7);
    }

    #[test]
    fn test_direction_indices_unique() {
        let mut seen = [false; 4];
        for dir in Direction::ALL {
            assert!(!seen[dir.index()]);
            seen[dir.index()] = true;
        }
    }
}
