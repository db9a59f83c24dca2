use crate::image::{GrayImageU8, ImageU8, ImageView};
use crate::region::RegionMask;
use crate::stats::{binarize, otsu_threshold, Histogram};
use serde::{Deserialize, Serialize};

/// Foreground segmentation of a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum ThresholdMethod {
    /// Global Otsu threshold over the tile (or its ROI).
    #[default]
    Otsu,
    /// Pixel is foreground when brighter than the mean of its
    /// `(2 * radius + 1)²` neighbourhood.
    LocalMean { radius: usize },
}

/// Binary tile (255 = foreground). Pixels outside `roi` are background, and
/// the Otsu histogram only sees pixels inside it.
pub fn threshold_tile(
    tile: &ImageU8<'_>,
    method: ThresholdMethod,
    roi: Option<&RegionMask>,
) -> GrayImageU8 {
    let mut binary = match method {
        ThresholdMethod::Otsu => {
            let hist = match roi {
                Some(mask) => Histogram::from_masked(tile, mask),
                None => Histogram::from_view(tile),
            };
            binarize(tile, otsu_threshold(&hist))
        }
        ThresholdMethod::LocalMean { radius } => local_mean(tile, radius),
    };
    if let Some(mask) = roi {
        for y in 0..binary.height() {
            for x in 0..binary.width() {
                if !mask.get(x, y) {
                    binary.set(x, y, 0);
                }
            }
        }
    }
    binary
}

fn local_mean(tile: &ImageU8<'_>, radius: usize) -> GrayImageU8 {
    let (w, h) = (tile.width(), tile.height());
    // integral image with a zero guard row/column
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for (x, &v) in tile.row(y).iter().enumerate() {
            row_sum += v as u64;
            integral[(y + 1) * (w + 1) + x + 1] = integral[y * (w + 1) + x + 1] + row_sum;
        }
    }
    let mut out = GrayImageU8::filled(w, h, 0);
    for y in 0..h {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(h);
        for x in 0..w {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(w);
            let sum = integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                - integral[y0 * (w + 1) + x1]
                - integral[y1 * (w + 1) + x0];
            let count = ((x1 - x0) * (y1 - y0)) as u64;
            // v > sum / count, kept in integers
            if tile.get(x, y) as u64 * count > sum {
                out.set(x, y, 255);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mean_ignores_flat_background() {
        let mut img = GrayImageU8::filled(30, 30, 40);
        for y in 12..18 {
            for x in 12..18 {
                img.set(x, y, 200);
            }
        }
        let binary = threshold_tile(&img.as_view(), ThresholdMethod::LocalMean { radius: 5 }, None);
        assert_eq!(binary.get(15, 15), 255);
        assert_eq!(binary.get(2, 2), 0);
        assert_eq!(binary.get(25, 25), 0);
    }

    #[test]
    fn roi_excludes_outside_pixels() {
        let img = GrayImageU8::new(4, 1, vec![10, 200, 10, 200]);
        let mut roi = RegionMask::new(4, 1);
        roi.set(0, 0, true);
        roi.set(1, 0, true);
        roi.set(2, 0, true);
        let binary = threshold_tile(&img.as_view(), ThresholdMethod::Otsu, Some(&roi));
        assert_eq!(binary.as_raw(), &[0, 255, 0, 0]);
    }
}
