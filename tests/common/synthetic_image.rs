use colony_grid::image::{GrayImageU8, PlateImage};

/// Agar background level.
pub const BACKGROUND: u8 = 20;
/// Colony level.
pub const COLONY: u8 = 220;

/// Layout of a synthetic pinned plate: `rows × columns` disks on a square
/// lattice, optionally skewed about the image center.
#[derive(Clone, Debug)]
pub struct SyntheticPlate {
    pub size: usize,
    pub rows: usize,
    pub columns: usize,
    pub first: f64,
    pub pitch: f64,
    pub radius: f64,
    /// Rotation applied to the lattice, in degrees; positive is clockwise on
    /// screen.
    pub skew_deg: f64,
    /// `(row, column)` positions left without a colony.
    pub missing: Vec<(usize, usize)>,
}

impl Default for SyntheticPlate {
    fn default() -> Self {
        Self {
            size: 800,
            rows: 4,
            columns: 4,
            first: 250.0,
            pitch: 100.0,
            radius: 20.0,
            skew_deg: 0.0,
            missing: Vec::new(),
        }
    }
}

impl SyntheticPlate {
    /// Colony centers after skew, row-major, missing positions excluded.
    pub fn centers(&self) -> Vec<(usize, usize, f64, f64)> {
        let c = (self.size as f64 - 1.0) * 0.5;
        let (s, co) = self.skew_deg.to_radians().sin_cos();
        let mut out = Vec::new();
        for r in 0..self.rows {
            for col in 0..self.columns {
                if self.missing.contains(&(r, col)) {
                    continue;
                }
                let px = self.first + col as f64 * self.pitch - c;
                let py = self.first + r as f64 * self.pitch - c;
                out.push((r, col, c + co * px - s * py, c + s * px + co * py));
            }
        }
        out
    }

    pub fn render_gray(&self) -> GrayImageU8 {
        let mut img = GrayImageU8::filled(self.size, self.size, BACKGROUND);
        let r2 = self.radius * self.radius;
        let reach = self.radius.ceil() as isize + 1;
        for (_, _, cx, cy) in self.centers() {
            let (ix, iy) = (cx.round() as isize, cy.round() as isize);
            for y in iy - reach..=iy + reach {
                for x in ix - reach..=ix + reach {
                    if x < 0 || y < 0 || x as usize >= self.size || y as usize >= self.size {
                        continue;
                    }
                    let dx = x as f64 - cx;
                    let dy = y as f64 - cy;
                    if dx * dx + dy * dy <= r2 {
                        img.set(x as usize, y as usize, COLONY);
                    }
                }
            }
        }
        img
    }

    pub fn render(&self) -> PlateImage {
        PlateImage::Gray(self.render_gray())
    }

    /// Pixel count of one unskewed colony disk.
    pub fn disk_area(&self) -> usize {
        let reach = self.radius.ceil() as i64;
        let r2 = self.radius * self.radius;
        let mut n = 0;
        for y in -reach..=reach {
            for x in -reach..=reach {
                if ((x * x + y * y) as f64) <= r2 {
                    n += 1;
                }
            }
        }
        n
    }
}
