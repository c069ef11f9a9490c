//! The packaged per-page result of the separation engine.

use crate::domain::{GraphicObject, TextSpan};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which text source adapter produced a page's text layer.
///
/// Doubles as the element type of the orchestrator's source priority
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Hosted vision-language service.
    Vision,
    /// Local OCR engine.
    LocalOcr,
    /// The document's embedded text layer.
    DocumentText,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Vision => write!(f, "vision"),
            SourceKind::LocalOcr => write!(f, "local OCR"),
            SourceKind::DocumentText => write!(f, "document text layer"),
        }
    }
}

/// Per-page pipeline stage, in execution order.
///
/// A page always walks these stages front to back; a stage that cannot
/// produce a useful result degrades (empty collections, unmodified
/// background) and the walk continues to [`PageStage::Packaged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PageStage {
    /// Input image accepted, nothing extracted yet.
    Raw,
    /// Raw text spans acquired from a source adapter.
    TextExtracted,
    /// Duplicates removed and paragraphs merged.
    TextResolved,
    /// Graphic objects segmented.
    GraphicsDetected,
    /// Text inside graphics dropped.
    TextArbitrated,
    /// Clean background produced.
    BackgroundCleaned,
    /// Result packaged.
    Packaged,
}

impl fmt::Display for PageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageStage::Raw => write!(f, "raw"),
            PageStage::TextExtracted => write!(f, "text extracted"),
            PageStage::TextResolved => write!(f, "text resolved"),
            PageStage::GraphicsDetected => write!(f, "graphics detected"),
            PageStage::TextArbitrated => write!(f, "text arbitrated"),
            PageStage::BackgroundCleaned => write!(f, "background cleaned"),
            PageStage::Packaged => write!(f, "packaged"),
        }
    }
}

/// A recorded degradation: a stage that could not produce its full
/// result but did not abort the page.
#[derive(Debug, Clone)]
pub struct Degradation {
    /// The stage that degraded.
    pub stage: PageStage,
    /// Human-readable reason.
    pub reason: String,
}

/// The separated layers of one slide page.
///
/// Immutable once produced; the downstream presentation writer consumes
/// it as-is.
#[derive(Debug, Clone)]
pub struct SlideLayers {
    /// Page number this result was derived from.
    pub page_number: usize,
    /// Final text spans in reading order.
    pub text_spans: Vec<TextSpan>,
    /// Final graphic objects.
    pub graphics: Vec<GraphicObject>,
    /// Clean background, same pixel dimensions as the input page.
    pub background: RgbImage,
    /// Which source adapter supplied the text layer, `None` when every
    /// source came up empty.
    pub provenance: Option<SourceKind>,
    /// Degradations recorded while producing this page.
    pub degradations: Vec<Degradation>,
}

impl SlideLayers {
    /// Page width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.background.width()
    }

    /// Page height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.background.height()
    }

    /// Returns true when any stage degraded while producing this page.
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(PageStage::Raw < PageStage::TextExtracted);
        assert!(PageStage::TextExtracted < PageStage::TextResolved);
        assert!(PageStage::TextResolved < PageStage::GraphicsDetected);
        assert!(PageStage::GraphicsDetected < PageStage::TextArbitrated);
        assert!(PageStage::TextArbitrated < PageStage::BackgroundCleaned);
        assert!(PageStage::BackgroundCleaned < PageStage::Packaged);
    }

    #[test]
    fn source_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SourceKind::DocumentText).unwrap(),
            "\"document_text\""
        );
    }
}
