//! Gridding quality control.
//!
//! A misregistered grid shows up as whole rows or columns of "empty" tiles:
//! the colonies are there, but every tile boundary cuts through them. A row
//! fails when more than half of its tiles are empty, a column likewise.
use crate::matrix::TileMatrix;
use crate::measure::TileMeasurement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the pipeline does with a plate that fails gridding QC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QcFailurePolicy {
    /// Write the overlay only.
    #[default]
    Abort,
    /// Log a warning and write results anyway.
    WarnAndWrite,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GriddingReport {
    /// 0-based indices of rows with too many empty tiles.
    pub failing_rows: Vec<usize>,
    pub failing_columns: Vec<usize>,
}

impl GriddingReport {
    pub fn from_empty<T>(cells: &TileMatrix<T>, is_empty: impl Fn(&T) -> bool) -> Self {
        let (rows, columns) = (cells.rows(), cells.columns());
        let failing_rows = (0..rows)
            .filter(|&r| cells.row(r).iter().filter(|t| is_empty(t)).count() > columns / 2)
            .collect();
        let failing_columns = (0..columns)
            .filter(|&c| cells.column(c).filter(|t| is_empty(t)).count() > rows / 2)
            .collect();
        Self {
            failing_rows,
            failing_columns,
        }
    }

    pub fn from_measurements(measurements: &TileMatrix<TileMeasurement>) -> Self {
        Self::from_empty(measurements, TileMeasurement::is_empty)
    }

    pub fn failed(&self) -> bool {
        !self.failing_rows.is_empty() || !self.failing_columns.is_empty()
    }
}

impl fmt::Display for GriddingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.failed() {
            return f.write_str("gridding ok");
        }
        write!(
            f,
            "rows {:?} and columns {:?} are mostly empty",
            self.failing_rows, self.failing_columns
        )
    }
}

/// `true` when the grid looks misregistered.
pub fn check_incorrect_gridding(measurements: &TileMatrix<TileMeasurement>) -> bool {
    GriddingReport::from_measurements(measurements).failed()
}
