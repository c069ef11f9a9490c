//! Graphic object types produced by the graphic object detector.

use crate::processors::BoundingBox;
use image::RgbImage;
use std::path::PathBuf;

/// A discrete non-text visual region extracted from a page.
///
/// The detector records two rectangles: `bbox` is the padded region the
/// crop was taken from, `bbox_original` the unpadded detected region.
/// Arbitration between text and graphics always uses the unpadded box so
/// that padding never swallows adjacent text.
#[derive(Debug, Clone)]
pub struct GraphicObject {
    /// Identifier unique within the page.
    pub id: usize,
    /// Padded extraction region in page pixel space.
    pub bbox: BoundingBox,
    /// Unpadded detected region in page pixel space.
    pub bbox_original: BoundingBox,
    /// Pixel crop of the padded region, copied out of the source image.
    pub crop: RgbImage,
    /// Number of accepted text-span centers inside the unpadded region.
    pub text_count: usize,
    /// Where the crop was written, assigned by the presentation writer
    /// after it stores the crop. `None` until then.
    pub path: Option<PathBuf>,
}

impl GraphicObject {
    /// Width of the padded crop in pixels.
    #[inline]
    pub fn crop_width(&self) -> u32 {
        self.crop.width()
    }

    /// Height of the padded crop in pixels.
    #[inline]
    pub fn crop_height(&self) -> u32 {
        self.crop.height()
    }
}
