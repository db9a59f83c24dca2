use super::particles::{find_particles, Particle};
use super::threshold::{threshold_tile, ThresholdMethod};
use crate::image::ImageU8;
use crate::matrix::TileMatrix;
use crate::region::{Region, RegionMask};
use crate::types::ColonyCenter;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocatorParams {
    pub threshold: ThresholdMethod,
    /// Particles smaller than this (pixels) are noise.
    pub min_particle_area: usize,
    /// Largest particle above this aspect ratio is a smear, not a colony.
    pub max_aspect_ratio: f64,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::Otsu,
            min_particle_area: 5,
            max_aspect_ratio: 2.0,
        }
    }
}

/// Largest particle by area; ties keep the first in raster order.
pub fn largest_particle(particles: &[Particle]) -> Option<&Particle> {
    particles
        .iter()
        .fold(None, |best: Option<&Particle>, p| match best {
            Some(b) if b.area >= p.area => Some(b),
            _ => Some(p),
        })
}

/// Thresholded particles of a tile with noise removed.
pub fn tile_particles(
    tile: &ImageU8<'_>,
    roi: Option<&RegionMask>,
    params: &LocatorParams,
) -> Vec<Particle> {
    let binary = threshold_tile(tile, params.threshold, roi);
    let mut particles = find_particles(&binary, roi);
    particles.retain(|p| p.area >= params.min_particle_area);
    particles
}

/// Colony centroid in tile-local coordinates, or `None` for an empty or
/// contaminated tile.
pub fn locate_center(
    tile: &ImageU8<'_>,
    roi: Option<&RegionMask>,
    params: &LocatorParams,
) -> ColonyCenter {
    let particles = tile_particles(tile, roi, params);
    let largest = largest_particle(&particles)?;
    if largest.aspect_ratio > params.max_aspect_ratio {
        return None;
    }
    Some(largest.centroid)
}

/// Run [`locate_center`] on every tile of the matrix.
pub fn locate_all(
    plate: &ImageU8<'_>,
    tiles: &TileMatrix<Region>,
    roi: Option<&Region>,
    params: &LocatorParams,
) -> TileMatrix<ColonyCenter> {
    tiles.map(|_, _, tile| {
        let view = plate.sub_view(tile);
        let mask = roi.map(|r| tile_roi_mask(r, tile));
        locate_center(&view, mask.as_ref(), params)
    })
}

/// The part of a plate-level ROI falling inside `tile`, as a tile-local mask.
pub fn tile_roi_mask(roi: &Region, tile: &Region) -> RegionMask {
    let mut mask = RegionMask::new(tile.width, tile.height);
    for y in 0..tile.height {
        for x in 0..tile.width {
            if roi.contains(tile.x + x, tile.y + y) {
                mask.set(x, y, true);
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::GrayImageU8;

    fn tile_with_disk(cx: usize, cy: usize, r: usize) -> GrayImageU8 {
        let mut img = GrayImageU8::filled(60, 60, 30);
        let r2 = (r * r) as isize;
        for y in 0..60isize {
            for x in 0..60isize {
                let dx = x - cx as isize;
                let dy = y - cy as isize;
                if dx * dx + dy * dy <= r2 {
                    img.set(x as usize, y as usize, 210);
                }
            }
        }
        img
    }

    #[test]
    fn finds_disk_centroid() {
        let img = tile_with_disk(25, 34, 8);
        let center = locate_center(&img.as_view(), None, &LocatorParams::default()).expect("center");
        assert!((center.x - 25.0).abs() < 1e-9);
        assert!((center.y - 34.0).abs() < 1e-9);
    }

    #[test]
    fn empty_tile_has_no_center() {
        let img = GrayImageU8::filled(40, 40, 30);
        assert_eq!(locate_center(&img.as_view(), None, &LocatorParams::default()), None);
    }

    #[test]
    fn smear_is_rejected() {
        let mut img = GrayImageU8::filled(60, 60, 30);
        for y in 28..32 {
            for x in 5..55 {
                img.set(x, y, 210);
            }
        }
        assert_eq!(locate_center(&img.as_view(), None, &LocatorParams::default()), None);
    }

    #[test]
    fn specks_below_min_area_are_ignored() {
        let mut img = GrayImageU8::filled(30, 30, 30);
        img.set(3, 3, 210);
        img.set(4, 3, 210);
        assert_eq!(locate_center(&img.as_view(), None, &LocatorParams::default()), None);
    }

    #[test]
    fn largest_ties_keep_first() {
        let mut img = GrayImageU8::filled(40, 40, 0);
        for y in 2..6 {
            for x in 2..6 {
                img.set(x, y, 255);
                img.set(x + 20, y + 20, 255);
            }
        }
        let particles = find_particles(&img, None);
        let largest = largest_particle(&particles).unwrap();
        assert_eq!(largest.region.x, 2);
    }
}
