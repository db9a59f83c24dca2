//! I/O helpers for plate images and JSON.
//!
//! - `load_plate_image`: decode a PNG/JPEG/TIFF/BMP into a gray or RGB buffer.
//! - `save_plate_image`: encode a plate image, format chosen by extension.
//! - `write_text_file` / `write_json_file`: write outputs, creating parent dirs.
use super::{GrayImageU8, PlateImage, RgbImageU8};
use crate::error::{PipelineError, Result};
use image::{DynamicImage, ImageBuffer, Luma, Rgb};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk. Images without colour information become
/// grayscale; everything else is converted to 8-bit RGB.
pub fn load_plate_image(path: &Path) -> Result<PlateImage> {
    let dynamic = image::open(path).map_err(|source| PipelineError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(from_dynamic(dynamic))
}

pub fn from_dynamic(dynamic: DynamicImage) -> PlateImage {
    if dynamic.color().has_color() {
        let rgb = dynamic.into_rgb8();
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        PlateImage::Rgb(RgbImageU8::new(w, h, rgb.into_raw()))
    } else {
        let gray = dynamic.into_luma8();
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        PlateImage::Gray(GrayImageU8::new(w, h, gray.into_raw()))
    }
}

/// Save a plate image; the encoder is picked from the file extension.
pub fn save_plate_image(image: &PlateImage, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let (w, h) = (image.width() as u32, image.height() as u32);
    let dynamic = match image {
        PlateImage::Gray(img) => {
            let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                ImageBuffer::from_raw(w, h, img.as_raw().to_vec())
                    .ok_or_else(|| buffer_error(path))?;
            DynamicImage::ImageLuma8(buffer)
        }
        PlateImage::Rgb(img) => {
            let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                ImageBuffer::from_raw(w, h, img.as_raw().to_vec())
                    .ok_or_else(|| buffer_error(path))?;
            DynamicImage::ImageRgb8(buffer)
        }
    };
    dynamic.save(path).map_err(|source| PipelineError::Save {
        path: path.to_path_buf(),
        source,
    })
}

fn buffer_error(path: &Path) -> PipelineError {
    PipelineError::InvalidParameter {
        parameter: "image buffer".to_string(),
        value: path.display().to_string(),
    }
}

/// Write UTF-8 text to `path`, creating parent directories.
pub fn write_text_file(path: &Path, contents: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, contents).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_text_file(path, &json)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| PipelineError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
