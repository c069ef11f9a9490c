//! Document-text-layer source adapter.
//!
//! When the source document carries an embedded text layer, reading it
//! directly beats OCR on both accuracy and style fidelity. The layer is
//! supplied by an external [`TextLayerProvider`]; this adapter filters
//! sub-minimum font runs, transforms document-unit coordinates into page
//! pixel space, and strips the invisible duplicate layer some exporters
//! stack exactly on top of the visible text.

use crate::core::{DocTextConfig, ResolverConfig, SepResult, SeparationError};
use crate::domain::{TextRole, TextSpan};
use crate::processors::{BoundingBox, remove_hidden_duplicates, validate_bbox_in_bounds};
use std::sync::Arc;
use tracing::debug;

/// One text run from a document's embedded text layer, in document
/// units.
#[derive(Debug, Clone)]
pub struct TextRun {
    /// The run's text content.
    pub text: String,
    /// Run extent as `(x0, y0, x1, y1)` in document units with a
    /// top-left origin.
    pub bbox: (f32, f32, f32, f32),
    /// Font size in document units.
    pub font_size: f32,
    /// Font name, when the document records one.
    pub font_name: Option<String>,
    /// Font color as a packed sRGB integer, when recorded.
    pub color: Option<u32>,
}

/// Contract for reading a document's embedded text layer.
pub trait TextLayerProvider: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Page size `(width, height)` in document units.
    fn page_size(&self, page_index: usize) -> SepResult<(f32, f32)>;

    /// All text runs on a page.
    fn text_runs(&self, page_index: usize) -> SepResult<Vec<TextRun>>;
}

/// Text source adapter over a document's embedded text layer.
pub struct DocTextSource {
    provider: Arc<dyn TextLayerProvider>,
}

impl DocTextSource {
    /// Creates an adapter over the given provider.
    pub fn new(provider: Arc<dyn TextLayerProvider>) -> Self {
        Self { provider }
    }

    /// Extracts raw text spans for a page, transformed into the pixel
    /// space of an `image_width` x `image_height` rendering.
    ///
    /// Runs below `config.min_font_size` are discarded as noise, and
    /// hidden-layer duplicates are removed before the spans are
    /// returned.
    pub fn extract(
        &self,
        page_index: usize,
        image_width: u32,
        image_height: u32,
        config: &DocTextConfig,
        resolver: &ResolverConfig,
    ) -> SepResult<Vec<TextSpan>> {
        let (doc_width, doc_height) = self.provider.page_size(page_index)?;
        if doc_width <= 0.0 || doc_height <= 0.0 {
            return Err(SeparationError::invalid_input(format!(
                "page {page_index} has degenerate document size {doc_width}x{doc_height}"
            )));
        }

        // Independent x/y scale factors: image pixels per document unit.
        let scale_x = image_width as f32 / doc_width;
        let scale_y = image_height as f32 / doc_height;

        let runs = self.provider.text_runs(page_index)?;
        let mut spans = Vec::with_capacity(runs.len());

        for run in runs {
            let text = run.text.trim();
            if text.is_empty() {
                continue;
            }
            if run.font_size < config.min_font_size {
                continue;
            }

            let (x0, y0, x1, y1) = run.bbox;
            let bbox = BoundingBox::from_edges(
                (x0 * scale_x) as i32,
                (y0 * scale_y) as i32,
                (x1 * scale_x) as i32,
                (y1 * scale_y) as i32,
            );
            let bbox = validate_bbox_in_bounds(&bbox, image_width, image_height);

            spans.push(TextSpan {
                text: text.to_string(),
                bbox,
                role: TextRole::Unknown,
                size_class: None,
                font_px: run.font_size * scale_y,
                font_name: run.font_name.clone(),
                font_color: run.color,
                confidence: 1.0,
            });
        }

        let before = spans.len();
        let spans = remove_hidden_duplicates(&spans, resolver);
        if spans.len() != before {
            debug!(
                dropped = before - spans.len(),
                "hidden text layer duplicates removed"
            );
        }

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLayer {
        size: (f32, f32),
        runs: Vec<TextRun>,
    }

    impl TextLayerProvider for FixedLayer {
        fn page_count(&self) -> usize {
            1
        }

        fn page_size(&self, _page_index: usize) -> SepResult<(f32, f32)> {
            Ok(self.size)
        }

        fn text_runs(&self, _page_index: usize) -> SepResult<Vec<TextRun>> {
            Ok(self.runs.clone())
        }
    }

    fn run(text: &str, bbox: (f32, f32, f32, f32), size: f32) -> TextRun {
        TextRun {
            text: text.to_string(),
            bbox,
            font_size: size,
            font_name: Some("Helvetica".to_string()),
            color: Some(0x202020),
        }
    }

    #[test]
    fn coordinates_scale_by_independent_factors() {
        // 960x540 document rendered at 1920x1080: both factors are 2.
        let provider = Arc::new(FixedLayer {
            size: (960.0, 540.0),
            runs: vec![run("hello", (100.0, 50.0, 300.0, 70.0), 12.0)],
        });
        let source = DocTextSource::new(provider);

        let spans = source
            .extract(
                0,
                1920,
                1080,
                &DocTextConfig::default(),
                &ResolverConfig::default(),
            )
            .unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].bbox, BoundingBox::new(200, 100, 400, 40));
        assert!((spans[0].font_px - 24.0).abs() < f32::EPSILON);
        assert_eq!(spans[0].font_name.as_deref(), Some("Helvetica"));
    }

    #[test]
    fn tiny_font_runs_are_discarded_as_noise() {
        let provider = Arc::new(FixedLayer {
            size: (960.0, 540.0),
            runs: vec![
                run("metadata junk", (0.0, 0.0, 50.0, 3.0), 2.0),
                run("real text", (100.0, 100.0, 300.0, 115.0), 12.0),
            ],
        });
        let source = DocTextSource::new(provider);

        let spans = source
            .extract(
                0,
                960,
                540,
                &DocTextConfig::default(),
                &ResolverConfig::default(),
            )
            .unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "real text");
    }

    #[test]
    fn invisible_duplicate_layer_is_removed() {
        let provider = Arc::new(FixedLayer {
            size: (960.0, 540.0),
            runs: vec![
                run("visible", (100.0, 100.0, 300.0, 120.0), 12.0),
                run("visible", (100.5, 100.5, 300.5, 120.5), 12.0),
            ],
        });
        let source = DocTextSource::new(provider);

        let spans = source
            .extract(
                0,
                960,
                540,
                &DocTextConfig::default(),
                &ResolverConfig::default(),
            )
            .unwrap();
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn degenerate_page_size_is_an_error() {
        let provider = Arc::new(FixedLayer {
            size: (0.0, 540.0),
            runs: vec![],
        });
        let source = DocTextSource::new(provider);
        let result = source.extract(
            0,
            960,
            540,
            &DocTextConfig::default(),
            &ResolverConfig::default(),
        );
        assert!(result.is_err());
    }
}
