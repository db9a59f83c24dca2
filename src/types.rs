use serde::{Deserialize, Serialize};

/// Sub-pixel position in image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Colony position in tile-local coordinates; `None` when no colony was found.
pub type ColonyCenter = Option<Point>;

/// Rows × columns of the colony array pinned on a plate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub columns: usize,
}

impl GridShape {
    pub const SINGLE: GridShape = GridShape {
        rows: 1,
        columns: 1,
    };

    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    pub fn cells(&self) -> usize {
        self.rows * self.columns
    }
}

impl Default for GridShape {
    fn default() -> Self {
        // 1536-format plate
        Self::new(32, 48)
    }
}
