//! Geometric transforms on plate images.
//!
//! Rotation uses the inverse mapping with bilinear interpolation. A positive
//! angle turns the content clockwise on screen (y axis pointing down), and the
//! destination canvas can be enlarged so no corner is clipped. Pixels that map
//! outside the source are filled with the background value (0).
use super::{GrayImageU8, ImageU8, ImageView, PlateImage, RgbImageU8};

/// Canvas size able to hold a `width × height` image rotated by `angle_deg`.
///
/// The padding is symmetric, so the canvas keeps the parity of the source and
/// both centers differ by an integer offset; a zero angle is an exact copy.
pub fn rotated_canvas_size(width: usize, height: usize, angle_deg: f64) -> (usize, usize) {
    let (s, c) = angle_deg.to_radians().sin_cos();
    let (w, h) = (width as f64, height as f64);
    let need_w = (w * c.abs() + h * s.abs()).ceil() as usize;
    let need_h = (w * s.abs() + h * c.abs()).ceil() as usize;
    let pad_x = (need_w.saturating_sub(width) + 1) / 2;
    let pad_y = (need_h.saturating_sub(height) + 1) / 2;
    (width + 2 * pad_x, height + 2 * pad_y)
}

/// Rotate a whole plate image onto an enlarged canvas.
pub fn rotate(image: &PlateImage, angle_deg: f64) -> PlateImage {
    let (cw, ch) = rotated_canvas_size(image.width(), image.height(), angle_deg);
    match image {
        PlateImage::Gray(img) => {
            let data = rotate_channels(img.as_raw(), img.width(), img.height(), 1, angle_deg, cw, ch);
            PlateImage::Gray(GrayImageU8::new(cw, ch, data))
        }
        PlateImage::Rgb(img) => {
            let data = rotate_channels(img.as_raw(), img.width(), img.height(), 3, angle_deg, cw, ch);
            PlateImage::Rgb(RgbImageU8::new(cw, ch, data))
        }
    }
}

/// Rotate a grayscale view about its center onto a caller-sized canvas.
pub fn rotate_gray_onto(
    src: ImageU8<'_>,
    angle_deg: f64,
    canvas_w: usize,
    canvas_h: usize,
) -> GrayImageU8 {
    let mut packed = Vec::with_capacity(src.width() * src.height());
    for row in src.rows() {
        packed.extend_from_slice(row);
    }
    let data = rotate_channels(
        &packed,
        src.width(),
        src.height(),
        1,
        angle_deg,
        canvas_w,
        canvas_h,
    );
    GrayImageU8::new(canvas_w, canvas_h, data)
}

fn rotate_channels(
    src: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    angle_deg: f64,
    canvas_w: usize,
    canvas_h: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; canvas_w * canvas_h * channels];
    if width == 0 || height == 0 {
        return out;
    }
    let raster = Raster {
        data: src,
        width,
        height,
        channels,
    };
    let (s, c) = angle_deg.to_radians().sin_cos();
    let cx_in = (width as f64 - 1.0) * 0.5;
    let cy_in = (height as f64 - 1.0) * 0.5;
    let cx_out = (canvas_w as f64 - 1.0) * 0.5;
    let cy_out = (canvas_h as f64 - 1.0) * 0.5;

    for qy in 0..canvas_h {
        let dy = qy as f64 - cy_out;
        for qx in 0..canvas_w {
            let dx = qx as f64 - cx_out;
            let sx = cx_in + c * dx + s * dy;
            let sy = cy_in - s * dx + c * dy;
            if sx <= -1.0 || sy <= -1.0 || sx >= width as f64 || sy >= height as f64 {
                continue;
            }
            let base = (qy * canvas_w + qx) * channels;
            for ch in 0..channels {
                out[base + ch] = raster.bilinear(sx, sy, ch);
            }
        }
    }
    out
}

/// Packed interleaved pixels; samples outside the raster read as 0.
struct Raster<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    channels: usize,
}

impl Raster<'_> {
    fn sample(&self, x: isize, y: isize, ch: usize) -> f64 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            0.0
        } else {
            self.data[(y as usize * self.width + x as usize) * self.channels + ch] as f64
        }
    }

    fn bilinear(&self, x: f64, y: f64, ch: usize) -> u8 {
        let (x0, y0) = (x.floor(), y.floor());
        let (dx, dy) = (x - x0, y - y0);
        let (x0, y0) = (x0 as isize, y0 as isize);
        let v = self.sample(x0, y0, ch) * (1.0 - dx) * (1.0 - dy)
            + self.sample(x0 + 1, y0, ch) * dx * (1.0 - dy)
            + self.sample(x0, y0 + 1, ch) * (1.0 - dx) * dy
            + self.sample(x0 + 1, y0 + 1, ch) * dx * dy;
        v.round().clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_angle_is_an_exact_copy() {
        let data: Vec<u8> = (0..35).map(|v| (v * 7) as u8).collect();
        let img = PlateImage::Gray(GrayImageU8::new(7, 5, data.clone()));
        let out = rotate(&img, 0.0);
        assert_eq!(out, img);
    }

    #[test]
    fn canvas_preserves_parity_and_grows_with_angle() {
        let (w, h) = rotated_canvas_size(200, 200, 2.0);
        assert_eq!(w % 2, 0);
        assert_eq!(h % 2, 0);
        assert!(w >= 207 && h >= 207);
        let (w, h) = rotated_canvas_size(201, 100, -2.0);
        assert_eq!((w % 2, h % 2), (1, 0));
        assert_eq!(rotated_canvas_size(64, 48, 0.0), (64, 48));
    }

    #[test]
    fn uniform_interior_survives_small_rotations() {
        let img = GrayImageU8::filled(60, 40, 20);
        let out = rotate_gray_onto(img.as_view(), 1.3, 60, 40);
        for y in 5..35 {
            for x in 5..55 {
                assert_eq!(out.get(x, y), 20, "({x}, {y})");
            }
        }
    }

    #[test]
    fn quarter_turn_moves_right_edge_to_bottom() {
        // Bright pixel in the middle of the right edge turns clockwise.
        let mut img = GrayImageU8::filled(5, 5, 0);
        img.set(4, 2, 200);
        let out = rotate_gray_onto(img.as_view(), 90.0, 5, 5);
        assert_eq!(out.get(2, 4), 200);
        assert_eq!(out.get(4, 2), 0);
    }
}
