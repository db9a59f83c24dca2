use crate::matrix::TileMatrix;
use crate::region::Region;
use crate::stats::median_or;
use crate::types::{ColonyCenter, Point};
use serde::Serialize;

/// Row/column alignment of colony centers across the whole plate.
///
/// Pinned colonies sit on a very regular lattice, so the median position of
/// the detected centers in a row (column) is a better estimate of every
/// colony's y (x) than any single tile's own detection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CenterConsensus {
    /// Median tile-local y per row; `None` when no center was found in the row.
    pub row_y: Vec<Option<f64>>,
    /// Median tile-local x per column.
    pub column_x: Vec<Option<f64>>,
}

impl CenterConsensus {
    pub fn from_centers(centers: &TileMatrix<ColonyCenter>) -> Self {
        let row_y = (0..centers.rows())
            .map(|r| median_of(centers.row(r).iter().filter_map(|c| c.map(|p| p.y))))
            .collect();
        let column_x = (0..centers.columns())
            .map(|c| median_of(centers.column(c).filter_map(|p| p.map(|p| p.x))))
            .collect();
        Self { row_y, column_x }
    }

    /// Tile-local center to measure around; rows/columns without any detection
    /// fall back to the tile's geometric center.
    pub fn center_for(&self, row: usize, column: usize, tile: &Region) -> Point {
        let fallback = tile.local().center();
        Point::new(
            self.column_x.get(column).copied().flatten().unwrap_or(fallback.x),
            self.row_y.get(row).copied().flatten().unwrap_or(fallback.y),
        )
    }
}

fn median_of(values: impl Iterator<Item = f64>) -> Option<f64> {
    let sample: Vec<f64> = values.collect();
    (!sample.is_empty()).then(|| median_or(&sample, 0.0))
}
