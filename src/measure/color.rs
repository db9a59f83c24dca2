//! Colour readouts for chromogenic assays.
use super::scorer::{colony_pixels, disk_pixels, ScoreError, ScoreRecord, TileImages, TileScorer};
use super::ColonyExtraction;
use crate::image::{rgb_to_hsb, Hsb, RgbImageU8};
use crate::region::{Region, RegionMask};

/// Hue (degrees) that maps to zero relative intensity.
const CPRG_REFERENCE_HUE: f64 = 290.0;
/// Relative intensities above this are the wrong side of the colour wheel.
const CPRG_MAX_RELATIVE: f64 = 190.0;
/// Nominal tile area the tile sum is normalised to.
const TYPICAL_TILE_AREA: f64 = 15_000.0;
/// Colony border left out of the colony sum.
const COLONY_EROSION: usize = 3;

/// Distance of a pixel's hue from the CPRG reference, on the side of the
/// colour wheel where the substrate turns red/purple. Achromatic pixels have
/// no hue and score zero.
pub fn cprg_relative_intensity(hsb: Hsb) -> u32 {
    if hsb.saturation == 0.0 {
        return 0;
    }
    let relative = (720.0 - CPRG_REFERENCE_HUE - hsb.hue).rem_euclid(360.0).round();
    if relative > CPRG_MAX_RELATIVE {
        0
    } else {
        relative as u32
    }
}

/// CPRG (chlorophenol red-β-D-galactopyranoside) colour sums.
pub struct CprgHueScorer;

const CPRG_COLUMNS: [&str; 2] = ["color sum in tile", "color sum in colony"];

impl TileScorer for CprgHueScorer {
    fn name(&self) -> &'static str {
        "cprg"
    }

    fn columns(&self) -> &[&'static str] {
        &CPRG_COLUMNS
    }

    fn needs_color(&self) -> bool {
        true
    }

    fn measure(
        &self,
        colony: &Region,
        tile: &TileImages<'_>,
        _prior: &ColonyExtraction,
    ) -> Result<ScoreRecord, ScoreError> {
        let color = tile.color.as_ref().ok_or(ScoreError::MissingColor(self.name()))?;
        let (w, h) = (color.width(), color.height());
        if w == 0 || h == 0 {
            return Err(ScoreError::EmptyColony);
        }

        let mut tile_sum = 0u64;
        for y in 0..h {
            for x in 0..w {
                tile_sum += cprg_relative_intensity(rgb_to_hsb(color.get(x, y))) as u64;
            }
        }
        let normalised = (tile_sum as f64 * TYPICAL_TILE_AREA / (w * h) as f64).round();

        let core = eroded_colony(colony);
        let colony_sum: u64 = colony_pixels(&core)
            .filter(|&(x, y)| x < w && y < h)
            .map(|(x, y)| cprg_relative_intensity(rgb_to_hsb(color.get(x, y))) as u64)
            .sum();

        Ok(ScoreRecord::new(vec![
            normalised.sqrt().ceil(),
            (colony_sum as f64).sqrt().ceil(),
        ]))
    }
}

fn eroded_colony(colony: &Region) -> Region {
    let mask = colony
        .mask
        .clone()
        .unwrap_or_else(|| full_mask(colony.width, colony.height));
    Region::new(colony.x, colony.y, colony.width, colony.height)
        .with_mask(mask.eroded(COLONY_EROSION))
}

fn full_mask(width: usize, height: usize) -> RegionMask {
    let mut mask = RegionMask::new(width, height);
    for y in 0..height {
        for x in 0..width {
            mask.set(x, y, true);
        }
    }
    mask
}

/// Saturation × brightness of colony pixels whose hue falls in a window.
///
/// Used for pigmentation readouts (sporulation reporters and the like), where
/// colour strength rather than hue position is what varies.
pub struct HsbColorScorer {
    hue_min: f64,
    hue_max: f64,
    center_diameter: usize,
}

impl HsbColorScorer {
    pub fn new(hue_min: f64, hue_max: f64, center_diameter: usize) -> Self {
        Self {
            hue_min,
            hue_max,
            center_diameter,
        }
    }

    fn strength(&self, color: &RgbImageU8, x: usize, y: usize) -> f64 {
        let hsb = rgb_to_hsb(color.get(x, y));
        if hsb.saturation > 0.0 && hsb.hue >= self.hue_min && hsb.hue <= self.hue_max {
            hsb.saturation * hsb.brightness
        } else {
            0.0
        }
    }
}

const HSB_COLUMNS: [&str; 3] = ["color intensity", "relative color intensity", "center color"];

impl TileScorer for HsbColorScorer {
    fn name(&self) -> &'static str {
        "hsb color"
    }

    fn columns(&self) -> &[&'static str] {
        &HSB_COLUMNS
    }

    fn needs_color(&self) -> bool {
        true
    }

    fn measure(
        &self,
        colony: &Region,
        tile: &TileImages<'_>,
        prior: &ColonyExtraction,
    ) -> Result<ScoreRecord, ScoreError> {
        let color = tile.color.as_ref().ok_or(ScoreError::MissingColor(self.name()))?;
        let (w, h) = (color.width(), color.height());

        let intensity: f64 = colony_pixels(colony)
            .filter(|&(x, y)| x < w && y < h)
            .map(|(x, y)| self.strength(color, x, y))
            .sum();
        if prior.size == 0 {
            return Err(ScoreError::EmptyColony);
        }
        let relative = intensity / prior.size as f64;

        let (mut center_sum, mut center_count) = (0.0, 0usize);
        for (x, y) in disk_pixels(tile.center, self.center_diameter, w, h) {
            center_sum += self.strength(color, x, y);
            center_count += 1;
        }
        let center = if center_count == 0 {
            0.0
        } else {
            center_sum / center_count as f64
        };

        Ok(ScoreRecord::new(vec![intensity, relative, center]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImageU8;
    use crate::types::Point;

    fn colony_square(x0: usize, y0: usize, side: usize) -> Region {
        Region::new(x0, y0, side, side).with_mask(full_mask(side, side))
    }

    fn extraction(size: usize, center: Point) -> ColonyExtraction {
        ColonyExtraction {
            size,
            circularity: 1.0,
            colony: None,
            center,
            empty_reason: None,
        }
    }

    #[test]
    fn relative_intensity_follows_the_hue_wheel() {
        let magenta = rgb_to_hsb([255, 0, 255]);
        assert_eq!(cprg_relative_intensity(magenta), 130);
        let blue = rgb_to_hsb([0, 0, 255]);
        assert_eq!(cprg_relative_intensity(blue), 190);
        let green = rgb_to_hsb([0, 255, 0]);
        assert_eq!(cprg_relative_intensity(green), 0);
        let gray = rgb_to_hsb([128, 128, 128]);
        assert_eq!(cprg_relative_intensity(gray), 0);
    }

    #[test]
    fn cprg_sums_over_tile_and_eroded_colony() {
        let mut color = RgbImageU8::filled(10, 10, [128, 128, 128]);
        for y in 0..10 {
            for x in 0..10 {
                if (1..9).contains(&x) && (1..9).contains(&y) {
                    color.set(x, y, [255, 0, 255]);
                }
            }
        }
        let gray = GrayImageU8::filled(10, 10, 0);
        let tile = TileImages {
            gray: gray.as_view(),
            color: Some(color),
            center: Point::new(4.5, 4.5),
        };
        let colony = colony_square(1, 1, 8);
        let prior = extraction(64, tile.center);
        let record = CprgHueScorer.measure(&colony, &tile, &prior).unwrap();
        // 64 magenta pixels at 130 over a 100 pixel tile
        let expected_tile = (64.0f64 * 130.0 * 15_000.0 / 100.0).round().sqrt().ceil();
        assert_eq!(record.values[0], expected_tile);
        // three erosions leave the inner 2×2 block
        assert_eq!(record.values[1], (4.0f64 * 130.0).sqrt().ceil());
    }

    #[test]
    fn cprg_without_colour_reports_missing_input() {
        let gray = GrayImageU8::filled(4, 4, 0);
        let tile = TileImages {
            gray: gray.as_view(),
            color: None,
            center: Point::new(2.0, 2.0),
        };
        let prior = extraction(4, tile.center);
        let err = CprgHueScorer.measure(&colony_square(0, 0, 2), &tile, &prior);
        assert!(matches!(err, Err(ScoreError::MissingColor(_))));
    }

    #[test]
    fn hsb_colour_counts_only_pixels_inside_the_hue_window() {
        let mut color = RgbImageU8::filled(6, 6, [0, 255, 0]);
        color.set(2, 2, [255, 0, 255]);
        color.set(3, 2, [255, 0, 255]);
        let gray = GrayImageU8::filled(6, 6, 0);
        let tile = TileImages {
            gray: gray.as_view(),
            color: Some(color),
            center: Point::new(2.0, 2.0),
        };
        let colony = colony_square(2, 2, 2);
        let prior = extraction(4, tile.center);
        let record = HsbColorScorer::new(300.0, 360.0, 1)
            .measure(&colony, &tile, &prior)
            .unwrap();
        assert_eq!(record.values[0], 2.0);
        assert_eq!(record.values[1], 0.5);
        assert_eq!(record.values[2], 1.0);
    }
}
