//! Text span types produced by the text source adapters.

use crate::processors::BoundingBox;
use serde::{Deserialize, Serialize};

/// Role of a text span within a slide layout.
///
/// Roles come from the hosted vision service when it can classify a span;
/// the local OCR and document-text-layer sources cannot classify and
/// report [`TextRole::Body`] or [`TextRole::Unknown`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextRole {
    /// Slide title.
    Title,
    /// Slide subtitle.
    Subtitle,
    /// Body text.
    Body,
    /// Caption attached to a figure.
    Caption,
    /// Short label, e.g. inside a diagram.
    Label,
    /// The source could not classify the span.
    #[serde(other)]
    Unknown,
}

impl Default for TextRole {
    fn default() -> Self {
        TextRole::Unknown
    }
}

/// Relative font size class reported by the vision service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSizeClass {
    /// Display-sized text (titles).
    Large,
    /// Regular body text.
    Medium,
    /// Fine print.
    #[serde(other)]
    Small,
}

/// A run of text with position and style metadata.
///
/// Spans are immutable values: the paragraph merger produces new spans
/// with concatenated text and a union box instead of mutating in place,
/// and the resolver/arbiter stages only ever drop spans. Once a span is
/// part of a packaged [`SlideLayers`](crate::domain::SlideLayers) it is
/// never touched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content.
    pub text: String,
    /// Position in page pixel space.
    pub bbox: BoundingBox,
    /// Layout role, best-effort.
    pub role: TextRole,
    /// Relative size class, when the source reports one.
    pub size_class: Option<FontSizeClass>,
    /// Font height in page pixels. For sources without font metrics this
    /// is the box height.
    pub font_px: f32,
    /// Font name, only available from the document text layer.
    pub font_name: Option<String>,
    /// Font color as a packed sRGB integer, only available from the
    /// document text layer.
    pub font_color: Option<u32>,
    /// Source confidence in [0, 1].
    pub confidence: f32,
}

impl TextSpan {
    /// Creates a span with the given text and box; everything else takes
    /// source-neutral defaults.
    pub fn new(text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            role: TextRole::Unknown,
            size_class: None,
            font_px: bbox.height as f32,
            font_name: None,
            font_color: None,
            confidence: 1.0,
        }
    }

    /// Returns a copy with the given role.
    pub fn with_role(mut self, role: TextRole) -> Self {
        self.role = role;
        self
    }

    /// Returns a copy with the given confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Center point of the span's box.
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        self.bbox.center()
    }

    /// Merges another span into this one, producing a new span.
    ///
    /// Text is joined with a single space and the box becomes the union
    /// of both boxes. Role, style, and confidence are carried from `self`
    /// (the earlier span in reading order).
    pub fn merged_with(&self, other: &TextSpan) -> TextSpan {
        let mut text = String::with_capacity(self.text.len() + other.text.len() + 1);
        text.push_str(&self.text);
        text.push(' ');
        text.push_str(&other.text);

        TextSpan {
            text,
            bbox: self.bbox.union(&other.bbox),
            role: self.role,
            size_class: self.size_class,
            font_px: self.font_px,
            font_name: self.font_name.clone(),
            font_color: self.font_color,
            confidence: self.confidence.min(other.confidence),
        }
    }
}
