//! Background reconstruction via masked diffusion inpainting.
//!
//! Masked pixels are reconstructed from surrounding texture so the
//! removed content is visually undetectable. The fill proceeds
//! front-to-back from the mask boundary: pixels are processed in
//! increasing distance from known territory, each taking a
//! distance-weighted average of the already-known pixels inside its
//! neighborhood, then a few diffusion passes smooth the filled region.
//! Pixels outside the mask are never touched.

use crate::core::BackgroundConfig;
use crate::domain::GraphicObject;
use crate::processors::BoundingBox;
use crate::processors::mask::combined_background_mask;
use image::{GrayImage, Rgb, RgbImage};
use std::collections::VecDeque;
use tracing::debug;

/// Number of smoothing passes applied after the initial fill.
const DIFFUSION_PASSES: usize = 2;

#[derive(Clone, Copy, PartialEq)]
enum PixelState {
    Known,
    Unknown,
    Filled,
}

/// Fills masked pixels from surrounding texture.
///
/// `mask` marks the pixels to reconstruct (non-zero = fill). `radius` is
/// the neighborhood radius consulted for each fill, typically 3-5
/// pixels. Pixels outside the mask are returned bit-identical to the
/// input. A fully masked image cannot be reconstructed and is returned
/// unchanged.
pub fn inpaint(image: &RgbImage, mask: &GrayImage, radius: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || mask.dimensions() != (width, height) {
        return image.clone();
    }

    let mut result = image.clone();
    let mut state = vec![PixelState::Known; (width * height) as usize];
    let idx = |x: u32, y: u32| (y * width + x) as usize;

    let mut unknown_count = 0usize;
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] != 0 {
            state[idx(x, y)] = PixelState::Unknown;
            unknown_count += 1;
        }
    }
    if unknown_count == 0 {
        return result;
    }
    if unknown_count == (width * height) as usize {
        return result;
    }

    // Seed the fill front with unknown pixels bordering known territory.
    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();
    let mut queued = vec![false; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            if state[idx(x, y)] != PixelState::Unknown {
                continue;
            }
            if neighbors4(x, y, width, height)
                .into_iter()
                .flatten()
                .any(|(nx, ny)| state[idx(nx, ny)] == PixelState::Known)
            {
                queue.push_back((x, y));
                queued[idx(x, y)] = true;
            }
        }
    }

    // Front-to-back fill in BFS order.
    while let Some((x, y)) = queue.pop_front() {
        let color = neighborhood_average(&result, &state, x, y, radius, width, height);
        result.put_pixel(x, y, color);
        state[idx(x, y)] = PixelState::Filled;

        for (nx, ny) in neighbors4(x, y, width, height).into_iter().flatten() {
            let n = idx(nx, ny);
            if state[n] == PixelState::Unknown && !queued[n] {
                queue.push_back((nx, ny));
                queued[n] = true;
            }
        }
    }

    // Diffusion passes over the filled region smooth out fill-order
    // artifacts.
    for _ in 0..DIFFUSION_PASSES {
        let snapshot = result.clone();
        for y in 0..height {
            for x in 0..width {
                if state[idx(x, y)] == PixelState::Known {
                    continue;
                }
                result.put_pixel(x, y, window_mean(&snapshot, x, y, width, height));
            }
        }
    }

    debug!(filled = unknown_count, "inpainting complete");
    result
}

/// Removes only the watermark overlay from a page image.
///
/// Resolves the configured relative region against the page size and
/// inpaints it, leaving the rest of the page untouched. Useful when the
/// caller wants the original page back minus the overlay mark, without
/// running the full separation.
pub fn remove_watermark(
    image: &RgbImage,
    watermark: &crate::core::WatermarkConfig,
    config: &BackgroundConfig,
) -> RgbImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let region = watermark.resolve(width, height);
    let mut mask = GrayImage::new(width, height);
    crate::processors::mask::fill_rect(&mut mask, &region);
    let mask = crate::processors::mask::dilate_mask(
        &mask,
        config.mask_dilation_radius,
        config.mask_dilation_iterations,
    );

    inpaint(image, &mask, config.inpaint_radius)
}

/// Reconstructs the clean background for a page.
///
/// Builds the combined mask (dilated text mask, padded graphic boxes,
/// and the watermark region, which is always included) and inpaints it.
pub fn reconstruct_background(
    image: &RgbImage,
    text_mask: &GrayImage,
    graphics: &[GraphicObject],
    watermark_region: &BoundingBox,
    config: &BackgroundConfig,
) -> RgbImage {
    let mask = combined_background_mask(text_mask, graphics, watermark_region, config);
    inpaint(image, &mask, config.inpaint_radius)
}

/// Distance-weighted average of known/filled pixels within a Chebyshev
/// neighborhood. Falls back to mid-gray if the neighborhood holds no
/// usable pixel, which cannot happen for pixels processed in fill order.
fn neighborhood_average(
    image: &RgbImage,
    state: &[PixelState],
    x: u32,
    y: u32,
    radius: u32,
    width: u32,
    height: u32,
) -> Rgb<u8> {
    let r = radius as i64;
    let mut acc = [0.0f64; 3];
    let mut total_weight = 0.0f64;

    for dy in -r..=r {
        for dx in -r..=r {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            if state[(ny * width + nx) as usize] == PixelState::Unknown {
                continue;
            }

            let dist_sq = (dx * dx + dy * dy) as f64;
            let weight = 1.0 / (1.0 + dist_sq);
            let pixel = image.get_pixel(nx, ny);
            for (channel, value) in acc.iter_mut().zip(pixel.0.iter()) {
                *channel += weight * *value as f64;
            }
            total_weight += weight;
        }
    }

    if total_weight == 0.0 {
        return Rgb([128, 128, 128]);
    }
    Rgb([
        (acc[0] / total_weight).round() as u8,
        (acc[1] / total_weight).round() as u8,
        (acc[2] / total_weight).round() as u8,
    ])
}

/// Plain 3x3 window mean used by the diffusion passes.
fn window_mean(image: &RgbImage, x: u32, y: u32, width: u32, height: u32) -> Rgb<u8> {
    let mut acc = [0u32; 3];
    let mut count = 0u32;

    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let pixel = image.get_pixel(nx as u32, ny as u32);
            for (channel, value) in acc.iter_mut().zip(pixel.0.iter()) {
                *channel += *value as u32;
            }
            count += 1;
        }
    }

    Rgb([
        (acc[0] / count) as u8,
        (acc[1] / count) as u8,
        (acc[2] / count) as u8,
    ])
}

/// The four edge-adjacent neighbors of a pixel, `None` where the pixel
/// sits on the image border.
fn neighbors4(x: u32, y: u32, width: u32, height: u32) -> [Option<(u32, u32)>; 4] {
    [
        (x > 0).then(|| (x - 1, y)),
        (x + 1 < width).then_some((x + 1, y)),
        (y > 0).then(|| (x, y - 1)),
        (y + 1 < height).then_some((x, y + 1)),
    ]
}
