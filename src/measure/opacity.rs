use super::scorer::{colony_pixels, disk_pixels, ScoreError, ScoreRecord, TileImages, TileScorer};
use super::ColonyExtraction;
use crate::region::Region;
use crate::stats::median_or;

/// Integrated brightness of the colony above the agar background.
///
/// - `opacity`: Σ (v − background) over colony pixels.
/// - `center opacity`: same sum over a fixed disk around the colony center.
/// - `max 10% opacity`: mean of the brightest tenth of the colony minus
///   background.
///
/// The background is the median of the tile pixels outside the colony.
pub struct OpacityScorer {
    center_diameter: usize,
}

impl OpacityScorer {
    pub fn new(center_diameter: usize) -> Self {
        Self { center_diameter }
    }
}

const COLUMNS: [&str; 3] = ["opacity", "center opacity", "max 10% opacity"];

impl TileScorer for OpacityScorer {
    fn name(&self) -> &'static str {
        "opacity"
    }

    fn columns(&self) -> &[&'static str] {
        &COLUMNS
    }

    fn measure(
        &self,
        colony: &Region,
        tile: &TileImages<'_>,
        _prior: &ColonyExtraction,
    ) -> Result<ScoreRecord, ScoreError> {
        let gray = &tile.gray;
        let (w, h) = (gray.w, gray.h);
        let mut colony_values: Vec<f64> = colony_pixels(colony)
            .filter(|&(x, y)| x < w && y < h)
            .map(|(x, y)| gray.get(x, y) as f64)
            .collect();
        if colony_values.is_empty() {
            return Err(ScoreError::EmptyColony);
        }
        let mut background_values = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                if !colony.contains(x, y) {
                    background_values.push(gray.get(x, y) as f64);
                }
            }
        }
        let background = median_or(&background_values, 0.0);

        let opacity: f64 = colony_values.iter().map(|v| (v - background).max(0.0)).sum();
        let center_opacity: f64 = disk_pixels(tile.center, self.center_diameter, w, h)
            .map(|(x, y)| (gray.get(x, y) as f64 - background).max(0.0))
            .sum();

        colony_values.sort_by(|a, b| b.total_cmp(a));
        let top = ((colony_values.len() as f64) * 0.1).ceil().max(1.0) as usize;
        let top_mean = colony_values[..top].iter().sum::<f64>() / top as f64;
        let max_ten_percent = (top_mean - background).max(0.0);

        Ok(ScoreRecord::new(vec![opacity, center_opacity, max_ten_percent]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImageU8;
    use crate::measure::ColonyExtraction;
    use crate::region::RegionMask;
    use crate::types::Point;

    #[test]
    fn opacity_sums_brightness_above_background() {
        let mut img = GrayImageU8::filled(20, 20, 40);
        let mut mask = RegionMask::new(4, 4);
        for y in 8..12 {
            for x in 8..12 {
                img.set(x, y, 140);
                mask.set(x - 8, y - 8, true);
            }
        }
        let colony = Region::new(8, 8, 4, 4).with_mask(mask);
        let tile = TileImages {
            gray: img.as_view(),
            color: None,
            center: Point::new(9.5, 9.5),
        };
        let prior = ColonyExtraction::empty(Point::new(9.5, 9.5));
        let record = OpacityScorer::new(2).measure(&colony, &tile, &prior).unwrap();
        assert_eq!(record.values[0], 16.0 * 100.0);
        // disk of diameter 2 around (9.5, 9.5) touches the four middle pixels
        assert_eq!(record.values[1], 4.0 * 100.0);
        assert_eq!(record.values[2], 100.0);
    }
}
