//! Graphic object detection via image segmentation.
//!
//! Detects discrete non-text visual regions (diagrams, icons, charts) in
//! a page image. The page is thresholded so that any non-background ink
//! becomes foreground, accepted text is masked out, and the remainder is
//! dilated until fragmented strokes connect into shapes whose external
//! contours become candidate regions.

use crate::core::GraphicDetectionConfig;
use crate::domain::{GraphicObject, TextSpan};
use crate::processors::mask::{MASK_ON, dilate_mask};
use crate::processors::{BoundingBox, point_in_bbox};
use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{BorderType, Contour, find_contours};
use tracing::debug;

/// Detects graphic objects in a page image.
///
/// `text_mask` is the text-occupancy mask built from the accepted spans;
/// masked pixels never contribute to graphic foreground. `spans` are the
/// same accepted spans, used to count how much text sits inside each
/// candidate region. A region enclosing more than `max_text_spans`
/// centers is a text-dense area, not a standalone diagram, and is left
/// to the text layer.
pub fn detect_graphics(
    image: &RgbImage,
    text_mask: &GrayImage,
    spans: &[TextSpan],
    config: &GraphicDetectionConfig,
) -> Vec<GraphicObject> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let foreground = ink_foreground(image, text_mask, config.luminance_threshold);
    let dilated = dilate_mask(
        &foreground,
        config.dilation_radius,
        config.dilation_iterations,
    );

    let contours: Vec<Contour<u32>> = find_contours(&dilated);
    debug!(contours = contours.len(), "graphic candidate contours");

    let mut graphics = Vec::new();

    for contour in &contours {
        // External contours only; holes belong to their parent shape.
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }

        let Some(region) = contour_bounding_rect(contour) else {
            continue;
        };

        if region.width < config.min_width
            || region.height < config.min_height
            || region.area() < config.min_area
        {
            continue;
        }

        // A region spanning nearly the whole page in both dimensions is a
        // border artifact, not a graphic.
        if region.width as f32 > config.border_cover_ratio * width as f32
            && region.height as f32 > config.border_cover_ratio * height as f32
        {
            continue;
        }

        let text_count = spans
            .iter()
            .filter(|span| point_in_bbox(span.center(), &region))
            .count();
        if text_count > config.max_text_spans {
            debug!(
                ?region,
                text_count, "rejecting text-dense region as graphic"
            );
            continue;
        }

        let padded = region.padded(config.crop_padding, width, height);
        let crop = image::imageops::crop_imm(
            image,
            padded.x as u32,
            padded.y as u32,
            padded.width,
            padded.height,
        )
        .to_image();

        graphics.push(GraphicObject {
            id: graphics.len(),
            bbox: padded,
            bbox_original: region,
            crop,
            text_count,
            path: None,
        });
    }

    debug!(accepted = graphics.len(), "graphic objects detected");
    graphics
}

/// Thresholds the page into an ink-foreground map with text removed.
///
/// Pixels at or below the luminance cutoff (anything darker than the
/// near-white background) become foreground, except where the text mask
/// claims them.
fn ink_foreground(image: &RgbImage, text_mask: &GrayImage, cutoff: u8) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let mut foreground = GrayImage::new(gray.width(), gray.height());

    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel[0] <= cutoff && text_mask.get_pixel(x, y)[0] == 0 {
            foreground.put_pixel(x, y, Luma([MASK_ON]));
        }
    }

    foreground
}

/// Computes the bounding rectangle of a contour.
fn contour_bounding_rect(contour: &Contour<u32>) -> Option<BoundingBox> {
    let first = contour.points.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;

    for point in &contour.points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Some(BoundingBox::from_edges(
        min_x as i32,
        min_y as i32,
        max_x as i32 + 1,
        max_y as i32 + 1,
    ))
}
