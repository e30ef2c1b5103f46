//! # geo-clumps
//!
//! Connected-component labeling ("clumping") for thresholded 2D grids and 3D
//! volumes, the object-identification step in front of storm tracking and
//! cell-property tools.
//!
//! Active cells are described run-length encoded: each [`Interval`] is one
//! maximal run of active cells in a row. The engine groups intervals into
//! clumps, the maximal sets connected through neighboring rows (and planes,
//! for volumes) under a tunable column tolerance.
//!
//! ## Pipeline
//!
//! 1. **Row organization** - a flat buffer sorted by row is indexed into a
//!    [`RowDirectory`] with a slot for every row, empty rows included
//! 2. **Overlap index** - a two-pointer sweep per row pair records, for each
//!    interval and direction, the contiguous range of adjacent neighbors
//! 3. **Seed fill** - every still-unlabeled interval seeds a new clump that
//!    grows over the overlap index on an explicit heap stack
//!
//! ## Adjacency tolerance
//!
//! | `min_overlap` | Neighbors in adjacent rows join when |
//! |---------------|--------------------------------------|
//! | `+n` | they share at least `n` columns |
//! | `0` | they share a column or touch diagonally |
//! | `-n` | the gap between them is at most `n` columns |
//!
//! ## Examples
//!
//! ### From intervals
//!
//! ```rust
//! use geo_clumps::{clump_intervals_2d, ClumpParams, Interval};
//!
//! let mut intervals = vec![
//!     Interval::new(0, 0, 4),
//!     Interval::new(1, 7, 10), // gap of two columns to the run below
//! ];
//!
//! let touching = clump_intervals_2d(&mut intervals, 2, ClumpParams::new(0)).unwrap();
//! assert_eq!(touching.len(), 2);
//!
//! let bridged = clump_intervals_2d(&mut intervals, 2, ClumpParams::new(-2)).unwrap();
//! assert_eq!(bridged.len(), 1);
//! assert_eq!(bridged.clumps()[0].points, 9);
//! ```
//!
//! ### From a flat field
//!
//! ```rust
//! use geo_clumps::{clump_grid, ClumpParams};
//!
//! // Row-major reflectivity, e.g. from a Zarr chunk
//! let dbz = vec![
//!     10.0, 42.0, 44.0, 10.0, 10.0,
//!     10.0, 10.0, 47.0, 10.0, 38.0,
//!     10.0, 10.0, 10.0, 10.0, 41.0,
//! ];
//!
//! let storms = clump_grid(&dbz, 5, 3, 35.0, ClumpParams::default()).unwrap();
//! for (clump, members) in storms.clumps.iter() {
//!     println!("clump {}: {} runs, {} cells", clump.id, members.len(), clump.points);
//! }
//! assert_eq!(storms.len(), 2);
//! ```
//!
//! ### Several thresholds in parallel
//!
//! ```rust,ignore
//! use geo_clumps::{do_concurrent_grid, ClumpParams};
//!
//! let volume: Vec<f32> = load_cartesian_volume();
//! let levels = [35.0, 45.0, 55.0];
//! for (level, result) in do_concurrent_grid(&volume, 300, 300, 20, &levels, ClumpParams::default()) {
//!     println!("{} dBZ: {} storms", level, result?.len());
//! }
//! ```
//!
//! ## Concurrency
//!
//! Every call owns its directory, overlap index and stack; nothing is kept in
//! statics. Independent grids can be clumped from as many threads as needed.

mod clump;
mod concurrent;
mod error;
mod geometry;
mod grid;
mod interval;
mod overlap;
mod row_directory;
mod seed_fill;
mod threshold;

pub use clump::{
    clump_intervals_2d,
    clump_intervals_3d,
    clump_intervals_with_metrics,
    clump_rows_2d,
    clump_rows_3d,
    ClumpMetrics,
    ClumpParams,
    ClumpSet,
    ClumpSummary,
    GridBox,
};
pub use concurrent::do_concurrent_grid;
pub use error::{ClumpError, ClumpResult, InvalidInput};
pub use geometry::interval_polygon;
pub use grid::{clump_grid, clump_volume, ClumpedGrid};
pub use interval::{Direction, Interval, UNLABELED};
pub use overlap::{overlaps, OverlapIndex, OverlapRange};
pub use row_directory::{RowDirectory, RowSlot};
pub use seed_fill::{FillStats, SeedFill};
pub use threshold::{find_intervals, find_intervals_below};
