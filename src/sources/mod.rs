//! Text source adapters.
//!
//! Three interchangeable providers of raw text spans sit behind this
//! module: the hosted vision-language service, a local OCR engine, and
//! the source document's embedded text layer. The orchestrator selects
//! between them with an explicit priority list; each adapter only
//! normalizes its source's output into [`TextSpan`](crate::domain::TextSpan)s.

pub mod doc_text;
pub mod ocr;
pub mod vision;

pub use doc_text::{DocTextSource, TextLayerProvider, TextRun};
pub use ocr::{OcrBackend, OcrDetection, OcrTextSource, repair_spacing};
pub use vision::{
    VisionAnalysis, VisionClient, VisionGraphic, VisionTextElement, analysis_to_spans,
    parse_vision_response,
};
