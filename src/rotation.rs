//! Small-angle deskew estimation.
//!
//! A pinned colony array is most "aligned" when its rows and columns project
//! onto sharp peaks and valleys: the variance of the row sums plus the variance
//! of the column sums is maximal. The estimator evaluates that score over a
//! sweep of candidate angles on the binarized central quarter of the plate.
//!
//! Every candidate is rendered onto one canvas sized for the widest angle of
//! the sweep, so all scores are computed over the same number of samples.
use crate::angle::{best_by_score, AngleSweep};
use crate::image::transform::{rotate_gray_onto, rotated_canvas_size};
use crate::image::{ImageView, PlateImage};
use crate::region::Region;
use crate::stats::{binarize, otsu_threshold, sample_variance, Histogram};
use log::debug;
use serde::{Deserialize, Serialize};

/// How the plate rotation is obtained.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum RotationMode {
    /// Search the sweep for the angle maximising row/column sum variance.
    Auto {
        #[serde(default)]
        sweep: AngleSweep,
    },
    /// Apply a fixed, user-supplied angle without scanning.
    Manual { degrees: f64 },
}

impl Default for RotationMode {
    fn default() -> Self {
        RotationMode::Auto {
            sweep: AngleSweep::default(),
        }
    }
}

impl RotationMode {
    /// Angle the pipeline should rotate by, with the search trace when one ran.
    pub fn resolve(&self, image: &PlateImage) -> (f64, Option<RotationEstimate>) {
        match self {
            RotationMode::Manual { degrees } => (*degrees, None),
            RotationMode::Auto { sweep } => {
                let estimate = estimate_rotation_detailed(image, sweep);
                (estimate.angle_deg, Some(estimate))
            }
        }
    }
}

/// Outcome of a rotation search.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationEstimate {
    pub angle_deg: f64,
    pub score: f64,
    /// `(angle, score)` for every evaluated candidate, in sweep order.
    pub scores: Vec<(f64, f64)>,
}

/// Estimated deskew angle in degrees, or 0.0 under manual rotation.
pub fn estimate_rotation(image: &PlateImage, mode: &RotationMode) -> f64 {
    match mode {
        RotationMode::Manual { .. } => 0.0,
        RotationMode::Auto { sweep } => estimate_rotation_detailed(image, sweep).angle_deg,
    }
}

/// Central 25% × 25% window, offset 37.5% from each edge.
pub fn central_region(width: usize, height: usize) -> Region {
    let x = (3.0 * width as f64 / 8.0).round() as usize;
    let y = (3.0 * height as f64 / 8.0).round() as usize;
    let w = (width as f64 / 4.0).round() as usize;
    let h = (height as f64 / 4.0).round() as usize;
    Region::new(x, y, w, h).clamp_to(width, height)
}

pub fn estimate_rotation_detailed(image: &PlateImage, sweep: &AngleSweep) -> RotationEstimate {
    let roi = central_region(image.width(), image.height());
    if roi.is_empty() {
        return RotationEstimate::default();
    }
    let gray = image.crop(&roi).to_gray();
    let threshold = otsu_threshold(&Histogram::from_view(&gray));
    let binary = binarize(&gray, threshold);
    drop(gray);

    let (canvas_w, canvas_h) = rotated_canvas_size(binary.width(), binary.height(), sweep.max_abs());
    let scores: Vec<(f64, f64)> = sweep
        .angles()
        .map(|angle| {
            let rotated = rotate_gray_onto(binary.as_view(), angle, canvas_w, canvas_h);
            (angle, projection_score(&rotated))
        })
        .collect();

    let (angle_deg, score) = best_by_score(&scores).unwrap_or((0.0, 0.0));
    debug!(
        "RotationEstimator::estimate roi={}x{} threshold={} angle={:.2} score={:.1}",
        roi.width, roi.height, threshold, angle_deg, score
    );
    RotationEstimate {
        angle_deg,
        score,
        scores,
    }
}

/// Variance of row sums plus variance of column sums.
fn projection_score<I: ImageView<Pixel = u8>>(image: &I) -> f64 {
    let mut column_sums = vec![0.0f64; image.width()];
    let mut row_sums = Vec::with_capacity(image.height());
    for row in image.rows() {
        let mut total = 0u64;
        for (x, &v) in row.iter().enumerate() {
            total += v as u64;
            column_sums[x] += v as f64;
        }
        row_sums.push(total as f64);
    }
    sample_variance(&row_sums) + sample_variance(&column_sums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImageU8;

    fn bars(width: usize, height: usize) -> PlateImage {
        let mut img = GrayImageU8::filled(width, height, 10);
        for y in 0..height {
            for x in 0..width {
                if (x / 8) % 2 == 0 && (y / 8) % 2 == 0 {
                    img.set(x, y, 230);
                }
            }
        }
        PlateImage::Gray(img)
    }

    #[test]
    fn central_region_is_the_middle_quarter() {
        assert_eq!(central_region(800, 600), Region::new(300, 225, 200, 150));
        assert!(central_region(1, 1).is_empty());
    }

    #[test]
    fn manual_mode_returns_zero_without_scanning() {
        let image = bars(64, 64);
        let mode = RotationMode::Manual { degrees: 1.5 };
        assert_eq!(estimate_rotation(&image, &mode), 0.0);
        assert_eq!(mode.resolve(&image).0, 1.5);
    }

    #[test]
    fn aligned_pattern_scores_best_at_zero() {
        let image = bars(256, 256);
        let estimate = estimate_rotation_detailed(&image, &AngleSweep::default());
        assert_eq!(estimate.angle_deg, 0.0);
        assert_eq!(estimate.scores.len(), 17);
    }

    #[test]
    fn degenerate_images_return_zero_and_stay_in_range() {
        let black = PlateImage::Gray(GrayImageU8::filled(40, 40, 0));
        let sweep = AngleSweep::new(-1.0, 1.0, 0.5);
        let angle = estimate_rotation(&black, &RotationMode::Auto { sweep });
        assert_eq!(angle, -1.0);
        let tiny = PlateImage::Gray(GrayImageU8::filled(1, 1, 0));
        assert_eq!(estimate_rotation_detailed(&tiny, &sweep).angle_deg, 0.0);
    }
}
