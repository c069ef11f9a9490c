//! Utility functions for image handling.
//!
//! This module provides functions for loading, converting, and encoding
//! page images in the separation pipeline.

use crate::core::{SepResult, SeparationError};
use image::{DynamicImage, GrayImage, ImageBuffer, RgbImage};
use std::io::Cursor;

/// Number of pages above which batch loading switches to parallel I/O.
const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Converts a DynamicImage to a GrayImage.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns [`SeparationError::ImageLoad`] if the image cannot be read or
/// decoded.
pub fn load_image(path: &std::path::Path) -> SepResult<RgbImage> {
    let img = image::open(path).map_err(SeparationError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Creates an RgbImage from raw pixel data.
///
/// The data must be packed RGB (3 bytes per pixel) and its length must
/// match the declared dimensions; `None` otherwise. This is the entry
/// point for page buffers handed over by a document rasterizer.
pub fn create_rgb_image(width: u32, height: u32, data: Vec<u8>) -> Option<RgbImage> {
    if data.len() != (width * height * 3) as usize {
        return None;
    }
    ImageBuffer::from_raw(width, height, data)
}

/// Encodes an image as PNG bytes, as required by the hosted vision
/// service payload.
pub fn encode_png(image: &RgbImage) -> SepResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(SeparationError::ImageLoad)?;
    Ok(bytes)
}

/// Loads a batch of page images from file paths.
///
/// Uses parallel loading when the number of pages exceeds the default
/// threshold.
pub fn load_images_batch<P: AsRef<std::path::Path> + Send + Sync>(
    paths: &[P],
) -> SepResult<Vec<RgbImage>> {
    load_images_batch_with_threshold(paths, None)
}

/// Loads a batch of page images with a custom parallel threshold.
///
/// # Arguments
///
/// * `paths` - Paths of the page images to load.
/// * `parallel_threshold` - Page count above which loading runs in
///   parallel; `None` uses the default.
pub fn load_images_batch_with_threshold<P: AsRef<std::path::Path> + Send + Sync>(
    paths: &[P],
    parallel_threshold: Option<usize>,
) -> SepResult<Vec<RgbImage>> {
    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

    if paths.len() > threshold {
        use rayon::prelude::*;
        paths.par_iter().map(|p| load_image(p.as_ref())).collect()
    } else {
        paths.iter().map(|p| load_image(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rgb_image_checks_length() {
        assert!(create_rgb_image(2, 2, vec![0u8; 12]).is_some());
        assert!(create_rgb_image(2, 2, vec![0u8; 11]).is_none());
    }

    #[test]
    fn encode_png_roundtrips() {
        let img = RgbImage::from_pixel(8, 6, image::Rgb([120, 60, 30]));
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(3, 3), img.get_pixel(3, 3));
    }
}
