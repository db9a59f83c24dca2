//! Annotated debug picture of a gridded plate.
//!
//! Grid boundaries are drawn in cyan, colony outlines in green and the
//! consensus centers as small red crosses. The overlay is produced for failed
//! analyses too, showing whatever boundaries the segmenter found.
use crate::image::{PlateImage, RgbImageU8};
use crate::matrix::TileMatrix;
use crate::measure::TileMeasurement;
use crate::region::Region;
use crate::types::Point;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_line_segment_mut};

pub const GRID_COLOR: [u8; 3] = [0, 255, 255];
pub const COLONY_COLOR: [u8; 3] = [0, 255, 0];
pub const CENTER_COLOR: [u8; 3] = [255, 0, 0];

pub struct OverlayPainter {
    canvas: RgbImage,
}

impl OverlayPainter {
    pub fn new(base: &PlateImage) -> Self {
        let rgb = base.to_rgb();
        let canvas = RgbImage::from_fn(rgb.width() as u32, rgb.height() as u32, |x, y| {
            Rgb(rgb.get(x as usize, y as usize))
        });
        Self { canvas }
    }

    /// Vertical and horizontal lines at the given boundaries. A boundary equal
    /// to the image extent is drawn on the last pixel.
    pub fn draw_grid(&mut self, columns: &[usize], rows: &[usize]) {
        let (w, h) = self.canvas.dimensions();
        if w == 0 || h == 0 {
            return;
        }
        let (right, bottom) = ((w - 1) as f32, (h - 1) as f32);
        for &x in columns {
            let x = (x as f32).min(right);
            draw_line_segment_mut(&mut self.canvas, (x, 0.0), (x, bottom), Rgb(GRID_COLOR));
        }
        for &y in rows {
            let y = (y as f32).min(bottom);
            draw_line_segment_mut(&mut self.canvas, (0.0, y), (right, y), Rgb(GRID_COLOR));
        }
    }

    /// Outline of a tile-local colony region inside `tile`.
    pub fn draw_colony(&mut self, tile: &Region, colony: &Region) {
        let abs = colony.translate(tile.x, tile.y);
        let (w, h) = self.canvas.dimensions();
        for y in abs.y..abs.bottom() {
            for x in abs.x..abs.right() {
                if !abs.contains(x, y) || x >= w as usize || y >= h as usize {
                    continue;
                }
                let edge = x == 0
                    || y == 0
                    || !abs.contains(x - 1, y)
                    || !abs.contains(x + 1, y)
                    || !abs.contains(x, y - 1)
                    || !abs.contains(x, y + 1);
                if edge {
                    self.canvas.put_pixel(x as u32, y as u32, Rgb(COLONY_COLOR));
                }
            }
        }
    }

    /// Small cross at an absolute position.
    pub fn draw_center(&mut self, center: Point) {
        let (cx, cy) = (center.x.round() as i32, center.y.round() as i32);
        draw_cross_mut(&mut self.canvas, Rgb(CENTER_COLOR), cx, cy);
    }

    pub fn finish(self) -> PlateImage {
        let (w, h) = self.canvas.dimensions();
        PlateImage::Rgb(RgbImageU8::new(
            w as usize,
            h as usize,
            self.canvas.into_raw(),
        ))
    }
}

/// Overlay for an analysed plate; `measured` pairs tiles with their results
/// when measurement ran.
pub fn render_overlay(
    base: &PlateImage,
    column_boundaries: &[usize],
    row_boundaries: &[usize],
    measured: Option<(&TileMatrix<Region>, &TileMatrix<TileMeasurement>)>,
) -> PlateImage {
    let mut painter = OverlayPainter::new(base);
    painter.draw_grid(column_boundaries, row_boundaries);
    if let Some((tiles, measurements)) = measured {
        for (r, c, m) in measurements.iter() {
            let Some(tile) = tiles.get(r, c) else {
                continue;
            };
            if let Some(colony) = &m.colony {
                painter.draw_colony(tile, colony);
            }
            let center = Point::new(tile.x as f64 + m.center.x, tile.y as f64 + m.center.y);
            painter.draw_center(center);
        }
    }
    painter.finish()
}
