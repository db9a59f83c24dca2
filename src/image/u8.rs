use crate::region::Region;

/// Borrowed 8-bit grayscale view. Tiles are expressed as strided sub-views of
/// the plate buffer, so no pixel data is copied per tile.
#[derive(Clone, Copy, Debug)]
pub struct ImageU8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize, // bytes between rows
    pub data: &'a [u8],
}

impl<'a> ImageU8<'a> {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride + x]
    }

    /// Borrow the rectangle of `region` clamped to this view.
    ///
    /// The returned view shares the parent's stride; an empty region yields a
    /// zero-sized view.
    pub fn sub_view(&self, region: &Region) -> ImageU8<'a> {
        let clamped = region.clamp_to(self.w, self.h);
        if clamped.is_empty() {
            return ImageU8 {
                w: 0,
                h: 0,
                stride: self.stride,
                data: &[],
            };
        }
        let start = clamped.y * self.stride + clamped.x;
        let end = (clamped.y + clamped.height - 1) * self.stride + clamped.x + clamped.width;
        ImageU8 {
            w: clamped.width,
            h: clamped.height,
            stride: self.stride,
            data: &self.data[start..end],
        }
    }

    /// Sum of all pixel values.
    pub fn sum(&self) -> u64 {
        (0..self.h)
            .map(|y| self.row_slice(y).iter().map(|&v| v as u64).sum::<u64>())
            .sum()
    }

    #[inline]
    fn row_slice(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl<'a> crate::image::traits::ImageView for ImageU8<'a> {
    type Pixel = u8;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[u8] {
        self.row_slice(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageView;

    #[test]
    fn sub_view_shares_stride_and_offsets_rows() {
        let data: Vec<u8> = (0..(6 * 4) as u8).collect();
        let view = ImageU8 {
            w: 6,
            h: 4,
            stride: 6,
            data: &data,
        };
        let sub = view.sub_view(&Region::new(2, 1, 3, 2));
        assert_eq!(sub.width(), 3);
        assert_eq!(sub.height(), 2);
        assert_eq!(sub.row(0), &[8, 9, 10]);
        assert_eq!(sub.row(1), &[14, 15, 16]);
        assert_eq!(sub.get(2, 1), 16);
    }

    #[test]
    fn sub_view_clamps_out_of_bounds_regions() {
        let data = vec![1u8; 16];
        let view = ImageU8 {
            w: 4,
            h: 4,
            stride: 4,
            data: &data,
        };
        let sub = view.sub_view(&Region::new(3, 3, 10, 10));
        assert_eq!((sub.width(), sub.height()), (1, 1));
        assert_eq!(sub.sum(), 1);
        let outside = view.sub_view(&Region::new(8, 8, 2, 2));
        assert!(outside.is_empty());
    }
}
