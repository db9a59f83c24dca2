use super::GrayImageU8;
use crate::region::Region;

/// Owned packed 8-bit RGB buffer (`r, g, b` per pixel, row-major).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbImageU8 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImageU8 {
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * 3, "buffer size mismatch");
        Self {
            width,
            height,
            data,
        }
    }

    pub fn filled(width: usize, height: usize, color: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width * height * 3);
        for _ in 0..width * height {
            data.extend_from_slice(&color);
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&color);
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Unweighted `(r + g + b) / 3` conversion.
    pub fn to_gray(&self) -> GrayImageU8 {
        self.map_to_gray(|[r, g, b]| ((r as u16 + g as u16 + b as u16) / 3) as u8)
    }

    /// HSB brightness channel, `max(r, g, b)`.
    pub fn to_brightness(&self) -> GrayImageU8 {
        self.map_to_gray(|[r, g, b]| r.max(g).max(b))
    }

    fn map_to_gray(&self, f: impl Fn([u8; 3]) -> u8) -> GrayImageU8 {
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| f([px[0], px[1], px[2]]))
            .collect();
        GrayImageU8::new(self.width, self.height, data)
    }

    pub fn crop(&self, region: &Region) -> RgbImageU8 {
        let r = region.clamp_to(self.width, self.height);
        let mut data = Vec::with_capacity(r.width * r.height * 3);
        for y in r.y..r.y + r.height {
            let start = (y * self.width + r.x) * 3;
            data.extend_from_slice(&self.data[start..start + r.width * 3]);
        }
        RgbImageU8::new(r.width, r.height, data)
    }

    pub fn inverted(&self) -> RgbImageU8 {
        RgbImageU8::new(
            self.width,
            self.height,
            self.data.iter().map(|&v| 255 - v).collect(),
        )
    }

    /// Replicate a grayscale buffer into three channels.
    pub fn from_gray(gray: &GrayImageU8) -> RgbImageU8 {
        let mut data = Vec::with_capacity(gray.width() * gray.height() * 3);
        for &v in gray.as_raw() {
            data.extend_from_slice(&[v, v, v]);
        }
        RgbImageU8::new(gray.width(), gray.height(), data)
    }
}

/// Hue (degrees, `[0, 360)`), saturation and brightness (both `[0, 1]`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsb {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
}

pub fn rgb_to_hsb([r, g, b]: [u8; 3]) -> Hsb {
    let max = r.max(g).max(b) as f64;
    let min = r.min(g).min(b) as f64;
    let brightness = max / 255.0;
    if max == 0.0 {
        return Hsb {
            hue: 0.0,
            saturation: 0.0,
            brightness,
        };
    }
    let delta = max - min;
    let saturation = delta / max;
    if delta == 0.0 {
        return Hsb {
            hue: 0.0,
            saturation,
            brightness,
        };
    }
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let sector = if max == r {
        (g - b) / delta
    } else if max == g {
        2.0 + (b - r) / delta
    } else {
        4.0 + (r - g) / delta
    };
    Hsb {
        hue: (sector * 60.0).rem_euclid(360.0),
        saturation,
        brightness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsb_of_primary_colors() {
        let red = rgb_to_hsb([255, 0, 0]);
        assert_eq!(red.hue, 0.0);
        assert_eq!(red.saturation, 1.0);
        let green = rgb_to_hsb([0, 255, 0]);
        assert!((green.hue - 120.0).abs() < 1e-9);
        let blue = rgb_to_hsb([0, 0, 255]);
        assert!((blue.hue - 240.0).abs() < 1e-9);
        let magenta = rgb_to_hsb([255, 0, 255]);
        assert!((magenta.hue - 300.0).abs() < 1e-9);
        let gray = rgb_to_hsb([90, 90, 90]);
        assert_eq!(gray.saturation, 0.0);
        assert!((gray.brightness - 90.0 / 255.0).abs() < 1e-12);
    }

    #[test]
    fn gray_and_brightness_conversions() {
        let mut img = RgbImageU8::filled(2, 1, [0, 0, 0]);
        img.set(1, 0, [30, 60, 90]);
        assert_eq!(img.to_gray().as_raw(), &[0, 60]);
        assert_eq!(img.to_brightness().as_raw(), &[0, 90]);
        assert_eq!(img.inverted().get(1, 0), [225, 195, 165]);
    }
}
