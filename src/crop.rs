//! Plate cropping: isolate the colony array from the plate border.
//!
//! The adaptive strategy looks at foreground projections. Colonies produce
//! runs of foreground columns (rows); runs touching the image border are plate
//! rim, glare or labels and are ignored. The surviving runs bound the array,
//! and half the estimated gap between neighbouring colonies is kept as margin
//! so the outer tiles have the same size as the inner ones.
use crate::image::{GrayImageU8, ImageView, PlateImage};
use crate::region::Region;
use crate::stats::{binarize, median_or, otsu_threshold, Histogram};
use crate::types::GridShape;
use log::debug;
use serde::{Deserialize, Serialize};

/// Runs narrower than this are specks, not colonies.
const MIN_RUN_WIDTH: usize = 2;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum CropStrategy {
    /// Locate the colony array from foreground projections.
    #[default]
    GenericAdaptive,
    /// Fixed pixel rectangle; `*_end` coordinates are exclusive.
    #[serde(rename_all = "camelCase")]
    FixedRectangle {
        x_start: usize,
        y_start: usize,
        x_end: usize,
        y_end: usize,
    },
    /// The picture is already cropped by the user.
    UserCropped,
    /// Single colony picture; analysis restricted to the inscribed oval.
    SingleColonyOval,
}

impl CropStrategy {
    /// Strategies for pictures that hold exactly one colony.
    pub fn is_single_colony(&self) -> bool {
        matches!(self, CropStrategy::UserCropped | CropStrategy::SingleColonyOval)
    }
}

/// Cropped plate plus where it came from.
#[derive(Clone, Debug)]
pub struct CroppedPlate {
    pub image: PlateImage,
    /// Crop rectangle in the coordinates of the input image.
    pub bounds: Region,
    /// Analysis ROI in cropped coordinates, when the strategy restricts it.
    pub roi: Option<Region>,
}

pub fn crop_plate(image: &PlateImage, strategy: &CropStrategy, grid: GridShape) -> CroppedPlate {
    let full = Region::new(0, 0, image.width(), image.height());
    let (bounds, roi) = match strategy {
        CropStrategy::GenericAdaptive => (adaptive_bounds(&image.to_gray(), grid), None),
        CropStrategy::FixedRectangle {
            x_start,
            y_start,
            x_end,
            y_end,
        } => {
            let rect = Region::new(
                *x_start,
                *y_start,
                x_end.saturating_sub(*x_start),
                y_end.saturating_sub(*y_start),
            );
            (rect.clamp_to(image.width(), image.height()), None)
        }
        CropStrategy::UserCropped => (full, None),
        CropStrategy::SingleColonyOval => {
            let oval = Region::oval(0, 0, image.width(), image.height());
            (full, Some(oval))
        }
    };
    debug!(
        "PlateCropper::crop strategy={:?} bounds=({}, {}, {}x{})",
        strategy, bounds.x, bounds.y, bounds.width, bounds.height
    );
    let cropped = if bounds.x == 0
        && bounds.y == 0
        && bounds.width == image.width()
        && bounds.height == image.height()
    {
        image.duplicate()
    } else {
        image.crop(&bounds)
    };
    CroppedPlate {
        image: cropped,
        bounds,
        roi,
    }
}

/// Bounding rectangle of the colony array, padded by half a gap.
pub fn adaptive_bounds(gray: &GrayImageU8, grid: GridShape) -> Region {
    let (w, h) = (gray.width(), gray.height());
    let threshold = otsu_threshold(&Histogram::from_view(gray));
    let mask = binarize(gray, threshold);

    let mut column_counts = vec![0usize; w];
    let mut row_counts = vec![0usize; h];
    for (y, row) in mask.rows().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            if v != 0 {
                column_counts[x] += 1;
                row_counts[y] += 1;
            }
        }
    }

    let (x0, x1) = axis_extent(&column_counts, grid.columns).unwrap_or((0, w.saturating_sub(1)));
    let (y0, y1) = axis_extent(&row_counts, grid.rows).unwrap_or((0, h.saturating_sub(1)));
    if w == 0 || h == 0 {
        return Region::new(0, 0, w, h);
    }
    Region::new(x0, y0, x1 + 1 - x0, y1 + 1 - y0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Run {
    start: usize,
    end: usize, // inclusive
}

impl Run {
    fn width(&self) -> usize {
        self.end + 1 - self.start
    }
}

fn foreground_runs(counts: &[usize]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &n) in counts.iter().enumerate() {
        match (n > 0, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(Run { start: s, end: i - 1 });
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(Run {
            start: s,
            end: counts.len() - 1,
        });
    }
    runs
}

/// Inclusive `[start, end]` of the padded colony array along one axis.
fn axis_extent(counts: &[usize], cells: usize) -> Option<(usize, usize)> {
    let len = counts.len();
    let runs: Vec<Run> = foreground_runs(counts)
        .into_iter()
        .filter(|r| r.start > 0 && r.end + 1 < len && r.width() >= MIN_RUN_WIDTH)
        .collect();
    let first = runs.first()?;
    let last = runs.last()?;

    let widths: Vec<f64> = runs.iter().map(|r| r.width() as f64).collect();
    let diameter = median_or(&widths, 0.0);
    let span = (last.end + 1 - first.start) as f64;
    let margin = if cells > 1 {
        let pitch = (span - diameter) / (cells - 1) as f64;
        ((pitch - diameter) * 0.5).max(0.0)
    } else {
        diameter * 0.5
    };
    let margin = margin.round() as usize;
    Some((
        first.start.saturating_sub(margin),
        (last.end + margin).min(len - 1),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk_plate(size: usize, centers: &[(usize, usize)], radius: usize) -> GrayImageU8 {
        let mut img = GrayImageU8::filled(size, size, 20);
        let r2 = (radius * radius) as isize;
        for &(cx, cy) in centers {
            for y in cy - radius..=cy + radius {
                for x in cx - radius..=cx + radius {
                    let dx = x as isize - cx as isize;
                    let dy = y as isize - cy as isize;
                    if dx * dx + dy * dy <= r2 {
                        img.set(x, y, 220);
                    }
                }
            }
        }
        img
    }

    #[test]
    fn adaptive_crop_pads_by_half_the_gap() {
        let centers: Vec<(usize, usize)> = (0..2)
            .flat_map(|r| (0..3).map(move |c| (100 + c * 50, 100 + r * 50)))
            .collect();
        let gray = disk_plate(300, &centers, 10);
        let bounds = adaptive_bounds(&gray, GridShape::new(2, 3));
        // runs are 21 px wide, pitch 50 -> margin round(14.5) = 15
        assert_eq!(bounds.x, 90 - 15);
        assert_eq!(bounds.right(), 211 + 15);
        assert_eq!(bounds.y, 90 - 15);
        assert_eq!(bounds.bottom(), 161 + 15);
    }

    #[test]
    fn border_runs_are_ignored() {
        let mut gray = disk_plate(200, &[(100, 100)], 10);
        for y in 0..200 {
            for x in 0..6 {
                gray.set(x, y, 250);
            }
        }
        let bounds = adaptive_bounds(&gray, GridShape::SINGLE);
        assert!(bounds.x >= 75 && bounds.right() <= 125, "{bounds:?}");
    }

    #[test]
    fn blank_image_keeps_full_extent() {
        let gray = GrayImageU8::filled(50, 40, 0);
        assert_eq!(adaptive_bounds(&gray, GridShape::new(2, 2)), Region::new(0, 0, 50, 40));
    }

    #[test]
    fn fixed_rectangle_is_clamped() {
        let image = PlateImage::Gray(GrayImageU8::filled(100, 80, 5));
        let strategy = CropStrategy::FixedRectangle {
            x_start: 10,
            y_start: 20,
            x_end: 150,
            y_end: 60,
        };
        let cropped = crop_plate(&image, &strategy, GridShape::SINGLE);
        assert_eq!(cropped.bounds, Region::new(10, 20, 90, 40));
        assert_eq!((cropped.image.width(), cropped.image.height()), (90, 40));
    }

    #[test]
    fn single_colony_oval_keeps_image_and_sets_roi() {
        let image = PlateImage::Gray(GrayImageU8::filled(60, 40, 5));
        let cropped = crop_plate(&image, &CropStrategy::SingleColonyOval, GridShape::SINGLE);
        assert_eq!(cropped.image, image);
        let roi = cropped.roi.expect("oval roi");
        assert!(roi.contains(30, 20));
        assert!(!roi.contains(0, 0));
    }
}
