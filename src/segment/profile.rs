//! 1-D brightness projections and valley candidates.
use crate::image::{ImageU8, ImageView};

/// Sum of intensities per column.
pub fn column_profile(image: &ImageU8<'_>) -> Vec<u64> {
    let mut sums = vec![0u64; image.width()];
    for row in image.rows() {
        for (x, &v) in row.iter().enumerate() {
            sums[x] += v as u64;
        }
    }
    sums
}

/// Sum of intensities per row.
pub fn row_profile(image: &ImageU8<'_>) -> Vec<u64> {
    image
        .rows()
        .map(|row| row.iter().map(|&v| v as u64).sum())
        .collect()
}

/// Moving-window mean with a window of `2 * radius + 1` samples, truncated at
/// the ends. Window sums are exact integers, so flat stretches of the profile
/// stay bit-for-bit flat after smoothing.
pub fn smooth(profile: &[u64], radius: usize) -> Vec<f64> {
    let n = profile.len();
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0u64);
    for &v in profile {
        let last = *prefix.last().unwrap_or(&0);
        prefix.push(last + v);
    }
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(n);
            (prefix[hi] - prefix[lo]) as f64 / (hi - lo) as f64
        })
        .collect()
}

/// Centers of plateau-aware local minima.
///
/// A maximal run of equal values is a minimum when every existing neighbour
/// of the run is strictly greater. A profile without any neighbour (a single
/// flat run) has no minimum.
pub fn valley_candidates(profile: &[f64]) -> Vec<usize> {
    let n = profile.len();
    let mut candidates = Vec::new();
    let mut start = 0;
    while start < n {
        let value = profile[start];
        let mut end = start;
        while end + 1 < n && profile[end + 1] == value {
            end += 1;
        }
        let left = (start > 0).then(|| profile[start - 1]);
        let right = (end + 1 < n).then(|| profile[end + 1]);
        let is_min = match (left, right) {
            (None, None) => false,
            (l, r) => l.map_or(true, |l| l > value) && r.map_or(true, |r| r > value),
        };
        if is_min {
            candidates.push((start + end) / 2);
        }
        start = end + 1;
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_keeps_flat_runs_exact() {
        let profile = [30u64, 30, 30, 30, 90, 90, 30, 30, 30, 30];
        let s = smooth(&profile, 1);
        assert_eq!(s[0], 30.0);
        assert_eq!(s[1], 30.0);
        assert_eq!(s[2], 30.0);
        assert_eq!(s[4], 70.0);
        assert_eq!(s[8], 30.0);
        assert_eq!(s[9], 30.0);
    }

    #[test]
    fn plateau_minima_report_their_center() {
        let profile = [5.0, 1.0, 1.0, 1.0, 1.0, 6.0, 2.0, 7.0, 3.0, 3.0];
        assert_eq!(valley_candidates(&profile), vec![2, 6, 8]);
        assert!(valley_candidates(&[4.0; 6]).is_empty());
        assert_eq!(valley_candidates(&[2.0, 2.0, 9.0]), vec![0]);
    }

    #[test]
    fn profiles_sum_the_right_axis() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let view = ImageU8 {
            w: 3,
            h: 2,
            stride: 3,
            data: &data,
        };
        assert_eq!(column_profile(&view), vec![5, 7, 9]);
        assert_eq!(row_profile(&view), vec![6, 15]);
    }
}
