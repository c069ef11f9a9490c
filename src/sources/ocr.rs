//! Local OCR text source adapter.
//!
//! Wraps an external OCR engine behind the [`OcrBackend`] trait: the
//! engine reports `(polygon, text, score)` detections, the adapter turns
//! them into pipeline [`TextSpan`]s. Detection polygons are reduced to
//! their axis-aligned bounding rectangles, known watermark phrases are
//! discarded immediately, and a spacing-repair pass fixes the word
//! fusions local OCR engines tend to produce.

use crate::core::{SepResult, WatermarkConfig};
use crate::domain::{TextRole, TextSpan};
use crate::processors::{polygon_bounding_rect, validate_bbox_in_bounds};
use image::RgbImage;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// A single detection reported by an OCR engine.
#[derive(Debug, Clone)]
pub struct OcrDetection {
    /// Detection polygon in page pixel space.
    pub points: Vec<(f32, f32)>,
    /// Recognized text.
    pub text: String,
    /// Recognition score in [0, 1].
    pub score: f32,
}

/// Contract for a local OCR engine.
///
/// The engine works purely on pixel data; one call per page.
pub trait OcrBackend: Send + Sync {
    /// Runs detection and recognition on a page image.
    fn detect(&self, image: &RgbImage) -> SepResult<Vec<OcrDetection>>;
}

/// Text source adapter over a local OCR engine.
pub struct OcrTextSource {
    backend: Arc<dyn OcrBackend>,
}

impl OcrTextSource {
    /// Creates an adapter over the given backend.
    pub fn new(backend: Arc<dyn OcrBackend>) -> Self {
        Self { backend }
    }

    /// Extracts raw text spans from a page image.
    ///
    /// Spans matching a known watermark phrase are dropped here, before
    /// any merging. Roles default to body since OCR cannot classify
    /// layout; the pixel font height is the box height.
    pub fn extract(
        &self,
        image: &RgbImage,
        watermark: &WatermarkConfig,
    ) -> SepResult<Vec<TextSpan>> {
        let detections = self.backend.detect(image)?;
        let (width, height) = image.dimensions();

        let mut spans = Vec::with_capacity(detections.len());
        for detection in detections {
            let text = repair_spacing(&detection.text);
            if text.is_empty() {
                continue;
            }
            if watermark.matches(&text) {
                debug!(text = %text, "discarding watermark span");
                continue;
            }

            let Some(rect) = polygon_bounding_rect(&detection.points) else {
                continue;
            };
            let bbox = validate_bbox_in_bounds(&rect, width, height);

            spans.push(
                TextSpan::new(text, bbox)
                    .with_role(TextRole::Body)
                    .with_confidence(detection.score.clamp(0.0, 1.0)),
            );
        }

        debug!(spans = spans.len(), "OCR spans extracted");
        Ok(spans)
    }
}

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static PUNCT_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([,;:])([A-Za-z])").unwrap());
static PERIOD_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.([A-Z])").unwrap());
static LETTER_LPAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z])\(").unwrap());
static RPAREN_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\)([A-Za-z])").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").unwrap());

/// Repairs common OCR word fusions.
///
/// Splits camelCase boundaries, inserts a space after `,;:` and sentence
/// periods when a letter follows, separates letters from adjacent
/// parentheses, and collapses runs of spaces. Idempotent on clean text.
pub fn repair_spacing(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = CAMEL_BOUNDARY.replace_all(text, "$1 $2");
    let text = PUNCT_LETTER.replace_all(&text, "$1 $2");
    let text = PERIOD_UPPER.replace_all(&text, ". $1");
    let text = LETTER_LPAREN.replace_all(&text, "$1 (");
    let text = RPAREN_LETTER.replace_all(&text, ") $1");
    let text = MULTI_SPACE.replace_all(&text, " ");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend(Vec<OcrDetection>);

    impl OcrBackend for FixedBackend {
        fn detect(&self, _image: &RgbImage) -> SepResult<Vec<OcrDetection>> {
            Ok(self.0.clone())
        }
    }

    fn detection(points: Vec<(f32, f32)>, text: &str, score: f32) -> OcrDetection {
        OcrDetection {
            points,
            text: text.to_string(),
            score,
        }
    }

    #[test]
    fn polygon_is_reduced_to_bounding_rect() {
        let backend = Arc::new(FixedBackend(vec![detection(
            vec![(10.0, 20.0), (210.0, 24.0), (208.0, 52.0), (12.0, 50.0)],
            "slanted line",
            0.92,
        )]));
        let source = OcrTextSource::new(backend);
        let image = RgbImage::new(640, 480);

        let spans = source.extract(&image, &WatermarkConfig::default()).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].bbox.x, 10);
        assert_eq!(spans[0].bbox.y, 20);
        assert_eq!(spans[0].bbox.right(), 210);
        assert_eq!(spans[0].bbox.bottom(), 52);
        assert_eq!(spans[0].role, TextRole::Body);
    }

    #[test]
    fn watermark_phrase_is_discarded() {
        let watermark = WatermarkConfig {
            phrases: vec!["Made with SlideTool".to_string()],
            ..WatermarkConfig::default()
        };
        let backend = Arc::new(FixedBackend(vec![
            detection(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 20.0)], "made with slidetool", 0.9),
            detection(vec![(0.0, 40.0), (100.0, 40.0), (100.0, 60.0)], "real content", 0.9),
        ]));
        let source = OcrTextSource::new(backend);
        let image = RgbImage::new(640, 480);

        let spans = source.extract(&image, &watermark).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "real content");
    }

    #[test]
    fn spacing_repair_splits_fused_words() {
        assert_eq!(repair_spacing("TheStrategic Gap"), "The Strategic Gap");
        assert_eq!(repair_spacing("first,second"), "first, second");
        assert_eq!(repair_spacing("done.Next step"), "done. Next step");
        assert_eq!(repair_spacing("value(unit)next"), "value (unit) next");
        assert_eq!(repair_spacing("too   many  spaces"), "too many spaces");
    }

    #[test]
    fn spacing_repair_is_idempotent_on_clean_text() {
        let clean = "A perfectly normal sentence, with (balanced) parts.";
        assert_eq!(repair_spacing(clean), clean);
        assert_eq!(repair_spacing(&repair_spacing(clean)), repair_spacing(clean));
    }

    #[test]
    fn out_of_bounds_polygon_is_clamped() {
        let backend = Arc::new(FixedBackend(vec![detection(
            vec![(600.0, 460.0), (700.0, 460.0), (700.0, 500.0)],
            "edge",
            0.8,
        )]));
        let source = OcrTextSource::new(backend);
        let image = RgbImage::new(640, 480);

        let spans = source.extract(&image, &WatermarkConfig::default()).unwrap();
        assert_eq!(spans.len(), 1);
        assert!(spans[0].bbox.right() <= 640);
        assert!(spans[0].bbox.bottom() <= 480);
    }
}
