//! Grid segmentation: recover the rows × columns tile lattice of a cropped
//! plate.
//!
//! The segmenter is a small state machine:
//!
//! `ScanningColumns → ScanningRows → Validating → {Success, Failed}`
//!
//! Each scan projects the image onto one axis, smooths the projection and
//! collects valley candidates; the rising-tide selection in [`tide`] picks
//! `cells + 1` boundaries. Validation never stops at the first problem: every
//! violated condition is reported so the caller can print all of them.
//!
//! ```no_run
//! use colony_grid::image::GrayImageU8;
//! use colony_grid::segment::{segment, SegmenterParams};
//! use colony_grid::types::GridShape;
//!
//! # fn example(plate: GrayImageU8) {
//! let result = segment(plate.as_view(), GridShape::new(16, 24), &SegmenterParams::default());
//! if let Some(tiles) = result.usable_tiles() {
//!     println!("{} tiles", tiles.len());
//! } else {
//!     for reason in result.failures.reasons() {
//!         eprintln!("{reason}");
//!     }
//! }
//! # }
//! ```
pub mod breathing;
pub mod profile;
pub mod tide;

pub use self::breathing::apply_breathing;
pub use self::tide::{spacing_within_band, AxisScan};

use crate::image::ImageU8;
use crate::matrix::TileMatrix;
use crate::region::Region;
use crate::types::GridShape;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterParams {
    /// Smoothing radius as a fraction of the nominal pitch.
    pub smoothing_fraction: f64,
}

impl Default for SegmenterParams {
    fn default() -> Self {
        Self {
            smoothing_fraction: 0.1,
        }
    }
}

impl SegmenterParams {
    fn smoothing_radius(&self, extent: usize, cells: usize) -> usize {
        if cells == 0 {
            return 1;
        }
        let nominal = extent as f64 / cells as f64;
        ((nominal * self.smoothing_fraction).round() as usize).max(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmenterState {
    ScanningColumns,
    ScanningRows,
    Validating,
    Success,
    Failed,
}

/// Independent failure flags; any of them makes the tiles untrustworthy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationFailures {
    pub not_enough_columns: bool,
    pub not_enough_rows: bool,
    pub incorrect_column_spacing: bool,
    pub incorrect_row_spacing: bool,
}

impl SegmentationFailures {
    pub fn any(&self) -> bool {
        self.not_enough_columns
            || self.not_enough_rows
            || self.incorrect_column_spacing
            || self.incorrect_row_spacing
    }

    /// Every violated condition, in a fixed order.
    pub fn reasons(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if self.not_enough_columns {
            reasons.push("not enough columns found");
        }
        if self.not_enough_rows {
            reasons.push("not enough rows found");
        }
        if self.incorrect_column_spacing {
            reasons.push("incorrect column spacing");
        }
        if self.incorrect_row_spacing {
            reasons.push("incorrect row spacing");
        }
        reasons
    }
}

impl fmt::Display for SegmentationFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons = self.reasons();
        if reasons.is_empty() {
            write!(f, "no failure")
        } else {
            write!(f, "{}", reasons.join("; "))
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationResult {
    pub grid: GridShape,
    pub columns: AxisScan,
    pub rows: AxisScan,
    pub failures: SegmentationFailures,
    /// Band intersections, present whenever both axes found all boundaries.
    /// Only trustworthy when no failure flag is set.
    pub tiles: Option<TileMatrix<Region>>,
    pub states: Vec<SegmenterState>,
}

impl SegmentationResult {
    pub fn error_occurred(&self) -> bool {
        self.failures.any()
    }

    /// Tiles safe to measure.
    pub fn usable_tiles(&self) -> Option<&TileMatrix<Region>> {
        if self.error_occurred() {
            None
        } else {
            self.tiles.as_ref()
        }
    }

    /// Top-left corner of the first tile.
    pub fn top_left(&self) -> Option<(usize, usize)> {
        self.tiles.as_ref()?.first().map(|t| (t.x, t.y))
    }

    /// Bottom-right corner of the last tile.
    pub fn bottom_right(&self) -> Option<(usize, usize)> {
        self.tiles.as_ref()?.last().map(|t| (t.right(), t.bottom()))
    }
}

/// Explicit state machine driving one segmentation.
pub struct GridSegmenter<'a> {
    image: ImageU8<'a>,
    grid: GridShape,
    params: SegmenterParams,
    state: SegmenterState,
    columns: Option<AxisScan>,
    rows: Option<AxisScan>,
    trace: Vec<SegmenterState>,
}

impl<'a> GridSegmenter<'a> {
    pub fn new(image: ImageU8<'a>, grid: GridShape, params: SegmenterParams) -> Self {
        Self {
            image,
            grid,
            params,
            state: SegmenterState::ScanningColumns,
            columns: None,
            rows: None,
            trace: vec![SegmenterState::ScanningColumns],
        }
    }

    pub fn state(&self) -> SegmenterState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SegmenterState::Success | SegmenterState::Failed)
    }

    /// Perform the work of the current state and move to the next one.
    pub fn step(&mut self) -> SegmenterState {
        let next = match self.state {
            SegmenterState::ScanningColumns => {
                let raw = profile::column_profile(&self.image);
                self.columns = Some(self.scan(&raw, self.grid.columns));
                SegmenterState::ScanningRows
            }
            SegmenterState::ScanningRows => {
                let raw = profile::row_profile(&self.image);
                self.rows = Some(self.scan(&raw, self.grid.rows));
                SegmenterState::Validating
            }
            SegmenterState::Validating => {
                if self.failures().any() {
                    SegmenterState::Failed
                } else {
                    SegmenterState::Success
                }
            }
            done @ (SegmenterState::Success | SegmenterState::Failed) => done,
        };
        if next != self.state {
            self.trace.push(next);
        }
        self.state = next;
        next
    }

    pub fn run(mut self) -> SegmentationResult {
        while !self.is_finished() {
            self.step();
        }
        self.finish()
    }

    fn scan(&self, raw: &[u64], cells: usize) -> AxisScan {
        let radius = self.params.smoothing_radius(raw.len(), cells);
        let smoothed = profile::smooth(raw, radius);
        let candidates = profile::valley_candidates(&smoothed);
        let scan = tide::scan_axis(&smoothed, &candidates, cells);
        debug!(
            "GridSegmenter::scan extent={} cells={} radius={} candidates={} boundaries={:?}",
            scan.extent, cells, radius, scan.candidates, scan.boundaries
        );
        scan
    }

    fn failures(&self) -> SegmentationFailures {
        let columns = self.columns.as_ref();
        let rows = self.rows.as_ref();
        SegmentationFailures {
            not_enough_columns: columns.map_or(true, |s| s.not_enough),
            not_enough_rows: rows.map_or(true, |s| s.not_enough),
            incorrect_column_spacing: columns.map_or(false, |s| s.incorrect_spacing),
            incorrect_row_spacing: rows.map_or(false, |s| s.incorrect_spacing),
        }
    }

    fn finish(self) -> SegmentationResult {
        let failures = self.failures();
        let columns = self.columns.unwrap_or_default();
        let rows = self.rows.unwrap_or_default();
        let tiles = (columns.has_all_boundaries() && rows.has_all_boundaries()).then(|| {
            TileMatrix::from_fn(self.grid.rows, self.grid.columns, |r, c| {
                let (x0, x1) = (columns.boundaries[c], columns.boundaries[c + 1]);
                let (y0, y1) = (rows.boundaries[r], rows.boundaries[r + 1]);
                Region::new(x0, y0, x1 - x0, y1 - y0)
            })
        });
        SegmentationResult {
            grid: self.grid,
            columns,
            rows,
            failures,
            tiles,
            states: self.trace,
        }
    }
}

/// Segment a cropped grayscale plate into `grid` tiles.
pub fn segment(image: ImageU8<'_>, grid: GridShape, params: &SegmenterParams) -> SegmentationResult {
    GridSegmenter::new(image, grid, params.clone()).run()
}

/// The whole picture as one tile, for pictures of a single colony.
pub fn single_tile(width: usize, height: usize) -> SegmentationResult {
    let axis = |extent: usize| AxisScan {
        extent,
        cells: 1,
        boundaries: vec![0, extent],
        candidates: 0,
        not_enough: extent == 0,
        incorrect_spacing: false,
    };
    let (columns, rows) = (axis(width), axis(height));
    let failures = SegmentationFailures {
        not_enough_columns: columns.not_enough,
        not_enough_rows: rows.not_enough,
        ..SegmentationFailures::default()
    };
    let outcome = if failures.any() {
        SegmenterState::Failed
    } else {
        SegmenterState::Success
    };
    SegmentationResult {
        grid: GridShape::SINGLE,
        columns,
        rows,
        failures,
        tiles: Some(TileMatrix::from_fn(1, 1, |_, _| Region::new(0, 0, width, height))),
        states: vec![SegmenterState::Validating, outcome],
    }
}
