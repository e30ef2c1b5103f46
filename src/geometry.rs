//! GeoJSON output of clumps in grid space
//!
//! Every interval becomes one cell-edge rectangle, `[begin, row]` to
//! `[end + 1, row + 1]`, so a clump renders as the exact set of cells it
//! covers. Coordinates stay in grid indices; projecting them onto the map is
//! left to the caller, who knows the grid's origin and spacing.

use crate::grid::ClumpedGrid;
use crate::interval::Interval;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Position, Value};
use std::collections::BTreeMap;

/// Closed counter-clockwise ring around the cells of one interval
pub fn interval_polygon(run: &Interval, ny: usize) -> Vec<Vec<Position>> {
    let x0 = run.begin as f64;
    let x1 = (run.end + 1) as f64;
    let y0 = run.row_in_plane(ny) as f64;
    let y1 = y0 + 1.0;

    vec![vec![
        vec![x0, y0],
        vec![x1, y0],
        vec![x1, y1],
        vec![x0, y1],
        vec![x0, y0],
    ]]
}

impl ClumpedGrid {
    /// One MultiPolygon feature per clump and plane
    ///
    /// Properties: `clump_id`, `plane`, `n_intervals` and `n_points` (both
    /// counted within that plane). Features come out in clump order, planes
    /// ascending within a clump.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut features = Vec::new();

        for (clump, members) in self.clumps.iter() {
            let mut planes: BTreeMap<usize, (Vec<Vec<Vec<Position>>>, usize)> = BTreeMap::new();
            for &index in members {
                let run = &self.intervals[index];
                let entry = planes.entry(run.plane(self.ny)).or_default();
                entry.0.push(interval_polygon(run, self.ny));
                entry.1 += run.len();
            }

            for (plane, (polygons, points)) in planes {
                let mut properties = JsonObject::new();
                properties.insert("clump_id".to_string(), serde_json::json!(clump.id));
                properties.insert("plane".to_string(), serde_json::json!(plane));
                properties.insert("n_intervals".to_string(), serde_json::json!(polygons.len()));
                properties.insert("n_points".to_string(), serde_json::json!(points));

                features.push(Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(Value::MultiPolygon(polygons))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                });
            }
        }

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}
