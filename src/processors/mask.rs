//! Binary mask construction for text occupancy and inpainting.

use crate::core::BackgroundConfig;
use crate::domain::{GraphicObject, TextSpan};
use crate::processors::BoundingBox;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

/// Foreground value used in all binary masks.
pub const MASK_ON: u8 = 255;

/// Dilates a binary mask with a square (Chebyshev) kernel.
///
/// Applied `iterations` times with the given radius per pass, matching
/// the repeated small-kernel dilation used when bridging strokes or
/// widening inpainting fronts.
pub fn dilate_mask(mask: &GrayImage, radius: u8, iterations: usize) -> GrayImage {
    if radius == 0 || iterations == 0 {
        return mask.clone();
    }

    let mut dilated = morphology::dilate(mask, Norm::LInf, radius);
    for _ in 1..iterations {
        dilated = morphology::dilate(&dilated, Norm::LInf, radius);
    }
    dilated
}

/// Fills a rectangle in a mask, clamped to the mask bounds.
pub fn fill_rect(mask: &mut GrayImage, bbox: &BoundingBox) {
    let (width, height) = mask.dimensions();
    let left = bbox.left().max(0) as u32;
    let top = bbox.top().max(0) as u32;
    let right = (bbox.right().max(0) as u32).min(width);
    let bottom = (bbox.bottom().max(0) as u32).min(height);

    for y in top..bottom {
        for x in left..right {
            mask.put_pixel(x, y, Luma([MASK_ON]));
        }
    }
}

/// Builds the text-occupancy mask for a page.
///
/// Every accepted span is rendered as a filled rectangle padded by
/// `text_mask_padding`, then the whole mask is dilated so the inpainting
/// front clears anti-aliased glyph edges.
pub fn text_occupancy_mask(
    image_width: u32,
    image_height: u32,
    spans: &[TextSpan],
    config: &BackgroundConfig,
) -> GrayImage {
    let mut mask = GrayImage::new(image_width, image_height);

    for span in spans {
        let padded = span
            .bbox
            .padded(config.text_mask_padding, image_width, image_height);
        fill_rect(&mut mask, &padded);
    }

    dilate_mask(
        &mask,
        config.mask_dilation_radius,
        config.mask_dilation_iterations,
    )
}

/// Builds the combined inpainting mask for background reconstruction.
///
/// Union of the (already dilated) text mask, the padded boxes of all
/// accepted graphics, and the resolved watermark region, which is always
/// forced opaque regardless of detection. The union is dilated once more
/// to avoid ghosting seams at mask edges.
pub fn combined_background_mask(
    text_mask: &GrayImage,
    graphics: &[GraphicObject],
    watermark_region: &BoundingBox,
    config: &BackgroundConfig,
) -> GrayImage {
    let mut mask = text_mask.clone();

    for graphic in graphics {
        fill_rect(&mut mask, &graphic.bbox);
    }
    fill_rect(&mut mask, watermark_region);

    dilate_mask(
        &mask,
        config.mask_dilation_radius,
        config.mask_dilation_iterations,
    )
}
