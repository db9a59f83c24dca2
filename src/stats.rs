//! Sample statistics and intensity histograms shared by the pipeline stages.
use crate::image::{GrayImageU8, ImageView};
use crate::region::RegionMask;

/// Median of `values`; even counts average the two middle values and an
/// empty sample yields `default`.
pub fn median_or(values: &[f64], default: f64) -> f64 {
    if values.is_empty() {
        return default;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) * 0.5
    } else {
        sorted[mid]
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Unbiased (N−1) sample variance; fewer than two samples give 0.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64
}

/// 256-bin intensity histogram of an 8-bit image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    pub bins: [u64; 256],
}

impl Histogram {
    pub fn from_view<I: ImageView<Pixel = u8>>(image: &I) -> Self {
        let mut bins = [0u64; 256];
        for row in image.rows() {
            for &v in row {
                bins[v as usize] += 1;
            }
        }
        Self { bins }
    }

    /// Histogram restricted to the pixels set in `mask` (same dimensions).
    pub fn from_masked<I: ImageView<Pixel = u8>>(image: &I, mask: &RegionMask) -> Self {
        let mut bins = [0u64; 256];
        for (y, row) in image.rows().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if mask.get(x, y) {
                    bins[v as usize] += 1;
                }
            }
        }
        Self { bins }
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    pub fn highest_level(&self) -> Option<u8> {
        self.bins.iter().rposition(|&n| n > 0).map(|i| i as u8)
    }

    pub fn distinct_levels(&self) -> usize {
        self.bins.iter().filter(|&&n| n > 0).count()
    }
}

/// Otsu threshold: foreground is `value > t`.
///
/// Maximises the between-class variance over all splits with two non-empty
/// classes; ties keep the lowest `t`. A histogram with fewer than two levels
/// returns its highest populated level (nothing is foreground), and an empty
/// histogram returns 0.
pub fn otsu_threshold(hist: &Histogram) -> u8 {
    let total = hist.total();
    let Some(highest) = hist.highest_level() else {
        return 0;
    };
    if hist.distinct_levels() < 2 {
        return highest;
    }
    let total_f = total as f64;
    let sum_all: f64 = hist
        .bins
        .iter()
        .enumerate()
        .map(|(i, &n)| i as f64 * n as f64)
        .sum();

    let mut best_t = highest;
    let mut best_var = f64::NEG_INFINITY;
    let mut w0 = 0u64;
    let mut sum0 = 0.0;
    for t in 0..255usize {
        w0 += hist.bins[t];
        sum0 += t as f64 * hist.bins[t] as f64;
        if w0 == 0 {
            continue;
        }
        let w1 = total - w0;
        if w1 == 0 {
            break;
        }
        let m0 = sum0 / w0 as f64;
        let m1 = (sum_all - sum0) / w1 as f64;
        let between = (w0 as f64 / total_f) * (w1 as f64 / total_f) * (m0 - m1) * (m0 - m1);
        if between > best_var {
            best_var = between;
            best_t = t as u8;
        }
    }
    best_t
}

/// Map `value > threshold` to 255 and everything else to 0.
pub fn binarize<I: ImageView<Pixel = u8>>(image: &I, threshold: u8) -> GrayImageU8 {
    let mut data = Vec::with_capacity(image.width() * image.height());
    for row in image.rows() {
        data.extend(row.iter().map(|&v| if v > threshold { 255 } else { 0 }));
    }
    GrayImageU8::new(image.width(), image.height(), data)
}
