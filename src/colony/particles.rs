//! Connected-component ("particle") analysis on binary tiles.
//!
//! Particles are 8-connected sets of foreground pixels. Each one carries its
//! area, bounding box with pixel mask, centroid, moment-based aspect ratio and
//! a Crofton perimeter estimate that stays close to `2πr` for digital disks,
//! which keeps circularity meaningful for round colonies.
use super::accumulator::ParticleAccumulator;
use crate::image::{GrayImageU8, ImageView};
use crate::region::{Region, RegionMask};
use crate::types::Point;
use nalgebra::{Matrix2, SymmetricEigen};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Variance of a unit pixel along one axis; keeps thin particles finite.
const PIXEL_VARIANCE: f64 = 1.0 / 12.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub area: usize,
    /// Bounding box in tile coordinates, masked to the particle's pixels.
    pub region: Region,
    pub centroid: Point,
    pub perimeter: f64,
    pub circularity: f64,
    pub aspect_ratio: f64,
}

impl Particle {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.region.contains(x, y)
    }
}

/// Extract all particles of `binary` (non-zero = foreground), optionally
/// restricted to the pixels allowed by `roi` (same dimensions as the image).
/// Particles are returned in raster order of their first pixel.
pub fn find_particles(binary: &GrayImageU8, roi: Option<&RegionMask>) -> Vec<Particle> {
    ParticleExtractor::new(binary, roi).extract()
}

struct ParticleExtractor<'a> {
    binary: &'a GrayImageU8,
    roi: Option<&'a RegionMask>,
    width: usize,
    height: usize,
    used: Vec<u8>,
    stack: Vec<usize>,
    region: ParticleAccumulator,
    particles: Vec<Particle>,
}

impl<'a> ParticleExtractor<'a> {
    fn new(binary: &'a GrayImageU8, roi: Option<&'a RegionMask>) -> Self {
        let width = binary.width();
        let height = binary.height();
        Self {
            binary,
            roi,
            width,
            height,
            used: vec![0u8; width * height],
            stack: Vec::with_capacity(64),
            region: ParticleAccumulator::with_capacity(256),
            particles: Vec::new(),
        }
    }

    fn extract(mut self) -> Vec<Particle> {
        for idx in 0..(self.width * self.height) {
            self.process_seed(idx);
        }
        self.particles
    }

    #[inline]
    fn is_foreground(&self, x: usize, y: usize) -> bool {
        self.binary.get(x, y) != 0 && self.roi.map_or(true, |m| m.get(x, y))
    }

    fn process_seed(&mut self, idx: usize) {
        if self.used[idx] != 0 {
            return;
        }
        let x = idx % self.width;
        let y = idx / self.width;
        if !self.is_foreground(x, y) {
            return;
        }
        self.region.reset();
        self.stack.clear();
        self.used[idx] = 1;
        self.stack.push(idx);
        self.flood();
        if let Some(particle) = self.build_particle() {
            self.particles.push(particle);
        }
    }

    fn flood(&mut self) {
        while let Some(idx) = self.stack.pop() {
            let x = idx % self.width;
            let y = idx / self.width;
            self.region.push(idx, x, y);
            for (dx, dy) in NEIGH_OFFSETS {
                let xn = x as isize + dx;
                let yn = y as isize + dy;
                if xn < 0 || yn < 0 || xn >= self.width as isize || yn >= self.height as isize {
                    continue;
                }
                let (nx, ny) = (xn as usize, yn as usize);
                let neighbor_idx = ny * self.width + nx;
                if self.used[neighbor_idx] != 0 || !self.is_foreground(nx, ny) {
                    continue;
                }
                self.used[neighbor_idx] = 1;
                self.stack.push(neighbor_idx);
            }
        }
    }

    fn build_particle(&self) -> Option<Particle> {
        let (cx, cy) = self.region.centroid()?;
        let (cxx, cxy, cyy) = self.region.covariance()?;
        let cov = Matrix2::new(cxx + PIXEL_VARIANCE, cxy, cxy, cyy + PIXEL_VARIANCE);
        let eig = SymmetricEigen::new(cov);
        let (l0, l1) = (eig.eigenvalues[0], eig.eigenvalues[1]);
        let (major, minor) = if l0 >= l1 { (l0, l1) } else { (l1, l0) };
        let aspect_ratio = if minor > 0.0 {
            (major / minor).sqrt()
        } else {
            f64::INFINITY
        };

        let bw = self.region.max_x + 1 - self.region.min_x;
        let bh = self.region.max_y + 1 - self.region.min_y;
        let mut mask = RegionMask::new(bw, bh);
        for &idx in &self.region.indices {
            let x = idx % self.width - self.region.min_x;
            let y = idx / self.width - self.region.min_y;
            mask.set(x, y, true);
        }
        let area = self.region.len();
        let perimeter = crofton_perimeter(&mask);
        let circularity = if perimeter > 0.0 {
            (4.0 * PI * area as f64 / (perimeter * perimeter)).min(1.0)
        } else {
            0.0
        };
        let region = Region::new(self.region.min_x, self.region.min_y, bw, bh).with_mask(mask);
        Some(Particle {
            area,
            region,
            centroid: Point::new(cx, cy),
            perimeter,
            circularity,
            aspect_ratio,
        })
    }
}

/// Cauchy–Crofton perimeter from boundary crossings in four directions.
///
/// `P ≈ π/8 · (N0 + N90 + (N45 + N135) / √2)`, where `Nθ` counts pixel pairs
/// along direction θ with exactly one member inside the shape. Pixels outside
/// the mask count as background.
pub fn crofton_perimeter(mask: &RegionMask) -> f64 {
    let (w, h) = (mask.width() as isize, mask.height() as isize);
    let inside = |x: isize, y: isize| {
        x >= 0 && y >= 0 && x < w && y < h && mask.get(x as usize, y as usize)
    };
    let mut n0 = 0usize;
    let mut n90 = 0usize;
    let mut n45 = 0usize;
    let mut n135 = 0usize;
    for y in -1..=h {
        for x in -1..=w {
            let here = inside(x, y);
            if here != inside(x + 1, y) {
                n0 += 1;
            }
            if here != inside(x, y + 1) {
                n90 += 1;
            }
            if here != inside(x + 1, y + 1) {
                n45 += 1;
            }
            if here != inside(x - 1, y + 1) {
                n135 += 1;
            }
        }
    }
    PI / 8.0 * ((n0 + n90) as f64 + (n45 + n135) as f64 * FRAC_1_SQRT_2)
}
