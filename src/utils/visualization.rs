//! Visualization utilities for separation results.
//!
//! Draws the detected regions of a packaged page over a copy of the
//! input image: green outlines for final text spans, red outlines for
//! graphic objects, blue for the resolved watermark region. Intended for
//! debugging threshold choices; never part of the packaged output.

use crate::domain::SlideLayers;
use crate::processors::BoundingBox;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const TEXT_COLOR: Rgb<u8> = Rgb([0, 200, 0]);

const GRAPHIC_COLOR: Rgb<u8> = Rgb([220, 0, 0]);

const WATERMARK_COLOR: Rgb<u8> = Rgb([0, 80, 220]);

/// Draws a hollow rectangle with the given outline thickness.
fn draw_box(image: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    for inset in 0..thickness as i32 {
        let width = bbox.width as i32 - 2 * inset;
        let height = bbox.height as i32 - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(bbox.x + inset, bbox.y + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Renders a debug overlay for a separated page.
///
/// The overlay is drawn on a copy of `original`; text spans get thin
/// green outlines, graphic objects thick red outlines around their
/// unpadded regions, and the watermark region a blue outline when
/// provided.
pub fn render_debug_overlay(
    original: &RgbImage,
    layers: &SlideLayers,
    watermark_region: Option<&BoundingBox>,
) -> RgbImage {
    let mut canvas = original.clone();

    for graphic in &layers.graphics {
        draw_box(&mut canvas, &graphic.bbox_original, GRAPHIC_COLOR, 2);
    }
    for span in &layers.text_spans {
        draw_box(&mut canvas, &span.bbox, TEXT_COLOR, 1);
    }
    if let Some(region) = watermark_region {
        draw_box(&mut canvas, region, WATERMARK_COLOR, 1);
    }

    canvas
}
