//! Arbitration between the text layer and detected graphics.
//!
//! A span whose content is already visible inside an extracted graphic
//! crop must not appear a second time in the editable text layer. This
//! stage runs after the duplicate/overlap resolver and before the text
//! list is finalized.

use crate::core::{ArbiterConfig, ArbitrationMode};
use crate::domain::{GraphicObject, TextSpan};
use tracing::debug;

/// Drops spans that are already baked into a detected graphic.
///
/// In [`ArbitrationMode::CenterPoint`] a span is dropped when its center
/// falls inside any graphic's *unpadded* rectangle. In
/// [`ArbitrationMode::Overlap`] a span is additionally dropped when its
/// box overlaps a graphic's padded box by more than
/// `overlap_threshold` of the span's own area.
pub fn filter_text_in_graphics(
    spans: &[TextSpan],
    graphics: &[GraphicObject],
    config: &ArbiterConfig,
) -> Vec<TextSpan> {
    if graphics.is_empty() {
        return spans.to_vec();
    }

    let kept: Vec<TextSpan> = spans
        .iter()
        .filter(|span| !is_inside_graphic(span, graphics, config))
        .cloned()
        .collect();

    if kept.len() != spans.len() {
        debug!(
            dropped = spans.len() - kept.len(),
            "spans absorbed into graphics"
        );
    }
    kept
}

fn is_inside_graphic(
    span: &TextSpan,
    graphics: &[GraphicObject],
    config: &ArbiterConfig,
) -> bool {
    let (cx, cy) = span.center();
    let span_area = span.bbox.area();

    graphics.iter().any(|graphic| {
        if graphic.bbox_original.contains_point(cx, cy) {
            return true;
        }
        if config.mode == ArbitrationMode::Overlap && span_area > 0 {
            let intersection = span.bbox.intersection_area(&graphic.bbox);
            return intersection as f32 / span_area as f32 > config.overlap_threshold;
        }
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::BoundingBox;
    use image::RgbImage;

    fn graphic(x: i32, y: i32, w: u32, h: u32) -> GraphicObject {
        let original = BoundingBox::new(x, y, w, h);
        GraphicObject {
            id: 0,
            bbox: original.padded(10, 2000, 2000),
            bbox_original: original,
            crop: RgbImage::new(w, h),
            text_count: 0,
            path: None,
        }
    }

    fn span(x: i32, y: i32, w: u32, h: u32) -> TextSpan {
        TextSpan::new("s", BoundingBox::new(x, y, w, h))
    }

    #[test]
    fn center_inside_graphic_is_dropped() {
        let graphics = vec![graphic(100, 100, 300, 200)];
        let spans = vec![span(150, 150, 80, 20), span(600, 600, 80, 20)];

        let kept = filter_text_in_graphics(&spans, &graphics, &ArbiterConfig::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].bbox.x, 600);
    }

    #[test]
    fn center_outside_padded_area_survives_center_mode() {
        // Span straddles the padded edge but its center is outside the
        // unpadded region.
        let graphics = vec![graphic(100, 100, 100, 100)];
        let spans = vec![span(195, 120, 100, 20)];

        let kept = filter_text_in_graphics(&spans, &graphics, &ArbiterConfig::default());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn overlap_mode_drops_heavily_overlapping_span() {
        let graphics = vec![graphic(100, 100, 100, 100)];
        // Center at (201, 130), just outside the unpadded box, but ~67%
        // of the span lies within the padded box (90..210).
        let spans = vec![span(175, 120, 52, 20)];

        let config = ArbiterConfig {
            mode: ArbitrationMode::Overlap,
            overlap_threshold: 0.6,
        };
        let kept = filter_text_in_graphics(&spans, &graphics, &config);
        assert!(kept.is_empty());
    }

    #[test]
    fn no_graphics_keeps_everything() {
        let spans = vec![span(0, 0, 10, 10)];
        let kept = filter_text_in_graphics(&spans, &[], &ArbiterConfig::default());
        assert_eq!(kept.len(), 1);
    }
}
