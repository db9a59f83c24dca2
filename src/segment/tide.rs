//! Rising-tide boundary selection along one axis.
//!
//! Valleys between colony rows/columns are the darkest stretches of the
//! projection. Raising a water level from the bottom, candidates are accepted
//! in the order they become submerged, as long as they keep a minimum distance
//! of two thirds of the nominal pitch to every boundary already accepted.
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;

/// Outcome of scanning one axis.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScan {
    pub extent: usize,
    pub cells: usize,
    /// Sorted accepted boundaries (pixel positions).
    pub boundaries: Vec<usize>,
    pub candidates: usize,
    pub not_enough: bool,
    pub incorrect_spacing: bool,
}

impl AxisScan {
    pub fn nominal(&self) -> f64 {
        if self.cells == 0 {
            0.0
        } else {
            self.extent as f64 / self.cells as f64
        }
    }

    pub fn has_all_boundaries(&self) -> bool {
        self.cells > 0 && self.boundaries.len() == self.cells + 1
    }
}

/// Whether `spacing` lies in `[2/3, 4/3] × extent / cells`, inclusive.
/// Evaluated in integers so band edges are exact.
pub fn spacing_within_band(spacing: usize, cells: usize, extent: usize) -> bool {
    let scaled = 3 * spacing * cells;
    scaled >= 2 * extent && scaled <= 4 * extent
}

/// Twice the distance (scaled by `cells`) from `position` to the nearest
/// nominal boundary `k × extent / cells`, `k = 0..=cells`.
fn nominal_offset(position: usize, cells: usize, extent: usize) -> usize {
    let scaled = position * cells;
    (0..=cells)
        .map(|k| scaled.abs_diff(k * extent))
        .min()
        .unwrap_or(usize::MAX)
}

/// Accept up to `cells + 1` boundaries from `candidates` by rising tide.
pub fn rising_tide(profile: &[f64], candidates: &[usize], cells: usize, extent: usize) -> Vec<usize> {
    let wanted = cells + 1;
    let mut order: Vec<usize> = candidates.to_vec();
    order.sort_by(|&a, &b| {
        profile[a]
            .partial_cmp(&profile[b])
            .unwrap_or(Ordering::Equal)
            .then_with(|| nominal_offset(a, cells, extent).cmp(&nominal_offset(b, cells, extent)))
            .then_with(|| a.cmp(&b))
    });

    let mut accepted: Vec<usize> = Vec::with_capacity(wanted);
    for position in order {
        if accepted.len() == wanted {
            break;
        }
        // |p - a| >= 2/3 * extent / cells
        let clear = accepted
            .iter()
            .all(|&a| 3 * position.abs_diff(a) * cells >= 2 * extent);
        if clear {
            accepted.push(position);
        } else {
            debug!("GridSegmenter::rising_tide skip candidate {position}: too close");
        }
    }
    accepted.sort_unstable();
    accepted
}

/// Run selection and validation for one axis.
pub fn scan_axis(profile: &[f64], candidates: &[usize], cells: usize) -> AxisScan {
    let extent = profile.len();
    if cells == 0 || extent == 0 {
        return AxisScan {
            extent,
            cells,
            boundaries: Vec::new(),
            candidates: candidates.len(),
            not_enough: true,
            incorrect_spacing: false,
        };
    }
    let boundaries = rising_tide(profile, candidates, cells, extent);
    let not_enough = boundaries.len() < cells + 1;
    let incorrect_spacing = boundaries
        .windows(2)
        .any(|pair| !spacing_within_band(pair[1] - pair[0], cells, extent));
    AxisScan {
        extent,
        cells,
        boundaries,
        candidates: candidates.len(),
        not_enough,
        incorrect_spacing,
    }
}
