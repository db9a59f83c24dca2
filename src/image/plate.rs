use super::{GrayImageU8, RgbImageU8};
use crate::region::Region;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PixelFormat {
    Gray8,
    Rgb8,
}

/// A plate photograph as handed between pipeline stages.
///
/// Stages never mutate their input; every transformation returns a new owned
/// image and the previous one can be dropped once no longer needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlateImage {
    Gray(GrayImageU8),
    Rgb(RgbImageU8),
}

impl PlateImage {
    pub fn width(&self) -> usize {
        match self {
            PlateImage::Gray(img) => img.width(),
            PlateImage::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            PlateImage::Gray(img) => img.height(),
            PlateImage::Rgb(img) => img.height(),
        }
    }

    pub fn format(&self) -> PixelFormat {
        match self {
            PlateImage::Gray(_) => PixelFormat::Gray8,
            PlateImage::Rgb(_) => PixelFormat::Rgb8,
        }
    }

    /// Explicit copy, for call sites that must keep the original around.
    pub fn duplicate(&self) -> PlateImage {
        self.clone()
    }

    pub fn to_gray(&self) -> GrayImageU8 {
        match self {
            PlateImage::Gray(img) => img.clone(),
            PlateImage::Rgb(img) => img.to_gray(),
        }
    }

    /// HSB brightness channel; a gray image is its own brightness.
    pub fn to_brightness(&self) -> GrayImageU8 {
        match self {
            PlateImage::Gray(img) => img.clone(),
            PlateImage::Rgb(img) => img.to_brightness(),
        }
    }

    pub fn to_rgb(&self) -> RgbImageU8 {
        match self {
            PlateImage::Gray(img) => RgbImageU8::from_gray(img),
            PlateImage::Rgb(img) => img.clone(),
        }
    }

    pub fn as_rgb(&self) -> Option<&RgbImageU8> {
        match self {
            PlateImage::Gray(_) => None,
            PlateImage::Rgb(img) => Some(img),
        }
    }

    pub fn crop(&self, region: &Region) -> PlateImage {
        match self {
            PlateImage::Gray(img) => PlateImage::Gray(img.crop(region)),
            PlateImage::Rgb(img) => PlateImage::Rgb(img.crop(region)),
        }
    }

    pub fn inverted(&self) -> PlateImage {
        match self {
            PlateImage::Gray(img) => PlateImage::Gray(img.inverted()),
            PlateImage::Rgb(img) => PlateImage::Rgb(img.inverted()),
        }
    }
}

impl From<GrayImageU8> for PlateImage {
    fn from(value: GrayImageU8) -> Self {
        PlateImage::Gray(value)
    }
}

impl From<RgbImageU8> for PlateImage {
    fn from(value: RgbImageU8) -> Self {
        PlateImage::Rgb(value)
    }
}
