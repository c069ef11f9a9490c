//! Configuration for the slide separation pipeline.
//!
//! Every threshold and padding value the pipeline consumes lives here in
//! one named structure, passed explicitly into each component. There are
//! no implicit module-level defaults: a component receives the section
//! of [`SeparationConfig`] it needs and nothing else.

use crate::core::{SepResult, SeparationError};
use crate::domain::SourceKind;
use crate::processors::{BoundingBox, validate_bbox_in_bounds};
use serde::{Deserialize, Serialize};

/// Thresholds steering the paragraph merger.
///
/// Two presets are in use: a strict one for sources that already return
/// logical blocks with precise boxes (the vision service, the document
/// text layer) and a loose one for noisy OCR output where each span is a
/// single physical line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Maximum vertical gap between two spans, as a fraction of the
    /// current paragraph's height.
    pub max_gap_ratio: f32,
    /// Minimum vertical gap in pixels. Slightly negative to tolerate
    /// marginal overlap between stacked lines.
    pub min_gap_px: f32,
    /// Maximum difference between the left edges of two spans, in
    /// pixels.
    pub max_left_offset_px: f32,
}

impl MergeConfig {
    /// Strict preset for precise sources: tight vertical gap so
    /// unrelated bullet points never merge, tight alignment.
    pub fn strict() -> Self {
        Self {
            max_gap_ratio: 0.3,
            min_gap_px: -5.0,
            max_left_offset_px: 10.0,
        }
    }

    /// Loose preset for OCR output, where spans are single physical
    /// lines with jittery boxes.
    pub fn loose() -> Self {
        Self {
            max_gap_ratio: 0.8,
            min_gap_px: -5.0,
            max_left_offset_px: 50.0,
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self::strict()
    }
}

/// Configuration for the hosted vision-language source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Base URL of the generateContent-style endpoint.
    pub base_url: String,
    /// API key; the adapter is considered unavailable when absent.
    pub api_key: Option<String>,
    /// Model identifier appended to the base URL.
    pub model: String,
    /// Per-page timeout for one service call, in seconds.
    pub timeout_secs: u64,
    /// Maximum retries after a rate-limit signal.
    pub max_retries: usize,
    /// Fixed wait between rate-limit retries, in seconds.
    pub retry_delay_secs: u64,
    /// Token budget requested from the service.
    pub max_output_tokens: u32,
    /// Merge preset applied to spans from this source.
    pub merge: MergeConfig,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            api_key: None,
            model: "gemini-2.0-flash-exp".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_secs: 60,
            max_output_tokens: 8192,
            merge: MergeConfig::strict(),
        }
    }
}

/// Configuration for the local OCR fallback source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSourceConfig {
    /// Whether the OCR fallback participates in source selection.
    pub enabled: bool,
    /// Merge preset applied to spans from this source.
    pub merge: MergeConfig,
}

impl Default for OcrSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            merge: MergeConfig::loose(),
        }
    }
}

/// Configuration for the document-text-layer source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocTextConfig {
    /// Runs below this font size (document units) are discarded as
    /// noise.
    pub min_font_size: f32,
    /// Merge preset applied to spans from this source. Spans are single
    /// physical lines with exact boxes, so the vertical gap is loose
    /// while the alignment stays tight.
    pub merge: MergeConfig,
}

impl Default for DocTextConfig {
    fn default() -> Self {
        Self {
            min_font_size: 4.0,
            merge: MergeConfig {
                max_gap_ratio: 0.8,
                min_gap_px: -5.0,
                max_left_offset_px: 10.0,
            },
        }
    }
}

/// Thresholds for the duplicate/overlap resolver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// A new span is a hidden-layer duplicate when its intersection with
    /// an accepted span exceeds this fraction of its own area.
    pub hidden_duplicate_threshold: f32,
    /// After merging, the smaller of two colliding paragraphs is dropped
    /// when the intersection exceeds this fraction of its area.
    pub collapse_threshold: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            hidden_duplicate_threshold: 0.8,
            collapse_threshold: 0.2,
        }
    }
}

/// Thresholds for the graphic object detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicDetectionConfig {
    /// Luminance cutoff: pixels at or below this become foreground ink.
    pub luminance_threshold: u8,
    /// Chebyshev radius of the square dilation kernel.
    pub dilation_radius: u8,
    /// Number of dilation passes bridging fragmented diagram strokes.
    pub dilation_iterations: usize,
    /// Minimum accepted region width in pixels.
    pub min_width: u32,
    /// Minimum accepted region height in pixels.
    pub min_height: u32,
    /// Minimum accepted region area in square pixels.
    pub min_area: u64,
    /// A region covering more than this fraction of both image
    /// dimensions is treated as a page border artifact.
    pub border_cover_ratio: f32,
    /// A region containing more than this many text-span centers is
    /// left to the text layer instead.
    pub max_text_spans: usize,
    /// Padding around the detected region when extracting the crop.
    pub crop_padding: u32,
}

impl Default for GraphicDetectionConfig {
    fn default() -> Self {
        Self {
            luminance_threshold: 240,
            dilation_radius: 2,
            dilation_iterations: 3,
            min_width: 30,
            min_height: 30,
            min_area: 1000,
            border_cover_ratio: 0.9,
            max_text_spans: 3,
            crop_padding: 10,
        }
    }
}

/// How the text-in-graphic arbiter decides that a span is already baked
/// into a graphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrationMode {
    /// Drop a span when its center falls inside a graphic's unpadded
    /// box.
    CenterPoint,
    /// Additionally drop spans overlapping a graphic's padded box by
    /// more than the configured fraction of the span's own area.
    Overlap,
}

/// Configuration for the text-in-graphic arbiter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Arbitration mode.
    pub mode: ArbitrationMode,
    /// Overlap fraction for [`ArbitrationMode::Overlap`].
    pub overlap_threshold: f32,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            mode: ArbitrationMode::CenterPoint,
            overlap_threshold: 0.6,
        }
    }
}

/// Configuration for mask construction and background inpainting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Padding around each text span when rendering the occupancy mask.
    pub text_mask_padding: u32,
    /// Chebyshev radius used when dilating the combined mask.
    pub mask_dilation_radius: u8,
    /// Dilation passes over the combined mask, pushing the inpainting
    /// front past anti-aliased glyph edges.
    pub mask_dilation_iterations: usize,
    /// Neighborhood radius of the diffusion inpainting fill.
    pub inpaint_radius: u32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            text_mask_padding: 5,
            mask_dilation_radius: 2,
            mask_dilation_iterations: 2,
            inpaint_radius: 4,
        }
    }
}

/// The fixed watermark overlay region, in fractions of the page size.
///
/// Resolved to absolute pixels per page; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Left edge as a fraction of page width.
    pub relative_left: f32,
    /// Top edge as a fraction of page height.
    pub relative_top: f32,
    /// Width as a fraction of page width.
    pub relative_width: f32,
    /// Height as a fraction of page height.
    pub relative_height: f32,
    /// Known watermark phrases; spans matching one (case-insensitive
    /// substring) are discarded at the source.
    pub phrases: Vec<String>,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            relative_left: 0.914,
            relative_top: 0.956,
            relative_width: 0.084,
            relative_height: 0.041,
            phrases: Vec::new(),
        }
    }
}

impl WatermarkConfig {
    /// Resolves the relative region to absolute pixels for a page of the
    /// given size.
    pub fn resolve(&self, image_width: u32, image_height: u32) -> BoundingBox {
        let bbox = BoundingBox::new(
            (self.relative_left * image_width as f32) as i32,
            (self.relative_top * image_height as f32) as i32,
            ((self.relative_width * image_width as f32) as u32).max(1),
            ((self.relative_height * image_height as f32) as u32).max(1),
        );
        validate_bbox_in_bounds(&bbox, image_width, image_height)
    }

    /// Returns true when `text` matches a known watermark phrase
    /// (case-insensitive substring).
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.phrases
            .iter()
            .any(|phrase| lower.contains(&phrase.to_lowercase()))
    }
}

/// Complete configuration for the separation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// Source adapters tried in order until one yields spans.
    pub source_priority: Vec<SourceKind>,
    /// Maximum pages processed concurrently in a batch.
    pub max_concurrent_pages: usize,
    /// Hosted vision-language source settings.
    pub vision: VisionConfig,
    /// Local OCR source settings.
    pub ocr: OcrSourceConfig,
    /// Document-text-layer source settings.
    pub doc_text: DocTextConfig,
    /// Duplicate/overlap resolver thresholds.
    pub resolver: ResolverConfig,
    /// Graphic object detector thresholds.
    pub graphics: GraphicDetectionConfig,
    /// Text-in-graphic arbiter settings.
    pub arbiter: ArbiterConfig,
    /// Mask and inpainting settings.
    pub background: BackgroundConfig,
    /// Watermark region and phrases.
    pub watermark: WatermarkConfig,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            source_priority: vec![
                SourceKind::Vision,
                SourceKind::LocalOcr,
                SourceKind::DocumentText,
            ],
            max_concurrent_pages: 5,
            vision: VisionConfig::default(),
            ocr: OcrSourceConfig::default(),
            doc_text: DocTextConfig::default(),
            resolver: ResolverConfig::default(),
            graphics: GraphicDetectionConfig::default(),
            arbiter: ArbiterConfig::default(),
            background: BackgroundConfig::default(),
            watermark: WatermarkConfig::default(),
        }
    }
}

impl SeparationConfig {
    /// Validates the configuration before use.
    ///
    /// Checks value ranges that would otherwise surface as confusing
    /// geometry errors deep inside the pipeline.
    pub fn validate(&self) -> SepResult<()> {
        if self.source_priority.is_empty() {
            return Err(SeparationError::config_error(
                "source_priority must name at least one text source",
            ));
        }
        if self.max_concurrent_pages == 0 {
            return Err(SeparationError::config_error_with_context(
                "max_concurrent_pages",
                "0",
                "must be at least 1",
            ));
        }

        for (field, value) in [
            ("watermark.relative_left", self.watermark.relative_left),
            ("watermark.relative_top", self.watermark.relative_top),
            ("watermark.relative_width", self.watermark.relative_width),
            ("watermark.relative_height", self.watermark.relative_height),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SeparationError::config_error_with_context(
                    field,
                    &value.to_string(),
                    "must be within [0, 1]",
                ));
            }
        }

        for (field, value) in [
            (
                "resolver.hidden_duplicate_threshold",
                self.resolver.hidden_duplicate_threshold,
            ),
            ("resolver.collapse_threshold", self.resolver.collapse_threshold),
            ("arbiter.overlap_threshold", self.arbiter.overlap_threshold),
            ("graphics.border_cover_ratio", self.graphics.border_cover_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SeparationError::config_error_with_context(
                    field,
                    &value.to_string(),
                    "must be within [0, 1]",
                ));
            }
        }

        if self.graphics.min_width == 0 || self.graphics.min_height == 0 {
            return Err(SeparationError::config_error(
                "graphics.min_width and graphics.min_height must be positive",
            ));
        }
        if self.background.inpaint_radius == 0 {
            return Err(SeparationError::config_error_with_context(
                "background.inpaint_radius",
                "0",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        SeparationConfig::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_watermark_rejected() {
        let mut config = SeparationConfig::default();
        config.watermark.relative_left = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_priority_rejected() {
        let mut config = SeparationConfig::default();
        config.source_priority.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn watermark_resolves_to_bottom_right() {
        let config = WatermarkConfig::default();
        let region = config.resolve(1920, 1080);
        assert!(region.x > 1700);
        assert!(region.y > 1000);
        assert!(region.right() <= 1920);
        assert!(region.bottom() <= 1080);
    }

    #[test]
    fn watermark_phrase_match_is_case_insensitive() {
        let config = WatermarkConfig {
            phrases: vec!["Made with SlideTool".to_string()],
            ..WatermarkConfig::default()
        };
        assert!(config.matches("made with slidetool"));
        assert!(config.matches("  ...MADE WITH SLIDETOOL..."));
        assert!(!config.matches("made with something else"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: SeparationConfig = toml::from_str(
            r#"
            max_concurrent_pages = 2

            [graphics]
            min_width = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.max_concurrent_pages, 2);
        assert_eq!(config.graphics.min_width, 40);
        assert_eq!(config.graphics.min_height, 30);
        assert_eq!(config.resolver.collapse_threshold, 0.2);
    }
}
