//! Integer regions of interest.
//!
//! A [`Region`] is an axis-aligned rectangle with an optional [`RegionMask`]
//! restricting it to an arbitrary shape (oval single-colony ROIs, colony
//! particles). Coordinates are pixels; `right()`/`bottom()` are exclusive.
use crate::types::Point;
use serde::Serialize;

/// Bit mask covering the bounding rectangle of a [`Region`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl RegionMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Ellipse inscribed in a `width × height` rectangle.
    pub fn ellipse(width: usize, height: usize) -> Self {
        let mut mask = Self::new(width, height);
        let (a, b) = (width as f64 * 0.5, height as f64 * 0.5);
        if a <= 0.0 || b <= 0.0 {
            return mask;
        }
        for y in 0..height {
            let ny = (y as f64 + 0.5 - b) / b;
            for x in 0..width {
                let nx = (x as f64 + 0.5 - a) / a;
                if nx * nx + ny * ny <= 1.0 {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.bits[y * self.width + x] = value;
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Morphological erosion with a 3×3 structuring element, `iterations` times.
    pub fn eroded(&self, iterations: usize) -> RegionMask {
        let mut current = self.clone();
        for _ in 0..iterations {
            let mut next = RegionMask::new(self.width, self.height);
            for y in 0..self.height {
                for x in 0..self.width {
                    if !current.get(x, y) {
                        continue;
                    }
                    let interior = (-1isize..=1).all(|dy| {
                        (-1isize..=1).all(|dx| {
                            let nx = x as isize + dx;
                            let ny = y as isize + dy;
                            nx >= 0 && ny >= 0 && current.get(nx as usize, ny as usize)
                        })
                    });
                    next.set(x, y, interior);
                }
            }
            current = next;
        }
        current
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    #[serde(skip)]
    pub mask: Option<RegionMask>,
}

impl Region {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            mask: None,
        }
    }

    /// Oval inscribed in the given rectangle.
    pub fn oval(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self::new(x, y, width, height).with_mask(RegionMask::ellipse(width, height))
    }

    pub fn with_mask(mut self, mask: RegionMask) -> Self {
        debug_assert_eq!((mask.width, mask.height), (self.width, self.height));
        self.mask = Some(mask);
        self
    }

    #[inline]
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count, honouring the mask when present.
    pub fn area(&self) -> usize {
        match &self.mask {
            Some(mask) => mask.count(),
            None => self.width * self.height,
        }
    }

    /// Whether the absolute pixel `(px, py)` lies inside the region.
    pub fn contains(&self, px: usize, py: usize) -> bool {
        if px < self.x || py < self.y || px >= self.right() || py >= self.bottom() {
            return false;
        }
        match &self.mask {
            Some(mask) => mask.get(px - self.x, py - self.y),
            None => true,
        }
    }

    /// Geometric center of the bounding rectangle.
    pub fn center(&self) -> Point {
        Point::new(
            self.x as f64 + self.width as f64 * 0.5,
            self.y as f64 + self.height as f64 * 0.5,
        )
    }

    /// Same shape, origin moved to `(0, 0)`.
    pub fn local(&self) -> Region {
        Region {
            x: 0,
            y: 0,
            ..self.clone()
        }
    }

    /// Shift by `(dx, dy)`; the mask travels with the rectangle.
    pub fn translate(&self, dx: usize, dy: usize) -> Region {
        Region {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }

    /// Rectangular intersection. The mask is dropped.
    pub fn intersect(&self, other: &Region) -> Region {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Region::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    /// Clamp to an image of `width × height`. The mask survives only when the
    /// bounds are unchanged.
    pub fn clamp_to(&self, width: usize, height: usize) -> Region {
        let clamped = self.intersect(&Region::new(0, 0, width, height));
        if clamped.x == self.x
            && clamped.y == self.y
            && clamped.width == self.width
            && clamped.height == self.height
        {
            self.clone()
        } else {
            clamped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oval_contains_center_but_not_corners() {
        let oval = Region::oval(10, 20, 40, 30);
        assert!(oval.contains(30, 35));
        assert!(!oval.contains(10, 20));
        assert!(!oval.contains(49, 49));
        assert!(!oval.contains(5, 35));
        let expected = std::f64::consts::PI * 20.0 * 15.0;
        assert!((oval.area() as f64 - expected).abs() / expected < 0.05);
    }

    #[test]
    fn intersect_and_clamp() {
        let a = Region::new(5, 5, 10, 10);
        let b = Region::new(12, 0, 10, 8);
        assert_eq!(a.intersect(&b), Region::new(12, 5, 3, 3));
        assert!(a.intersect(&Region::new(40, 40, 2, 2)).is_empty());
        assert_eq!(a.clamp_to(8, 100), Region::new(5, 5, 3, 10));
    }

    #[test]
    fn erosion_shrinks_a_square_by_one_pixel_per_pass() {
        let mut mask = RegionMask::new(9, 9);
        for y in 1..8 {
            for x in 1..8 {
                mask.set(x, y, true);
            }
        }
        assert_eq!(mask.count(), 49);
        assert_eq!(mask.eroded(1).count(), 25);
        assert_eq!(mask.eroded(3).count(), 1);
        assert_eq!(mask.eroded(4).count(), 0);
    }
}
