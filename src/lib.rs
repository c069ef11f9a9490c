//! # slidesep
//!
//! A slide layer separation engine: reconstructs an *editable* slide
//! representation from a *flattened* slide image. Each page is split
//! into three independent layers (text content with position/style
//! metadata, discrete graphic objects, and a clean background with both
//! removed) so a downstream presentation-assembly step can rebuild an
//! editable slide.
//!
//! ## Components
//!
//! - **Text sources**: a hosted vision-language service, a local OCR
//!   engine, and the document's embedded text layer, tried in a
//!   configurable priority order with graceful fallback
//! - **Paragraph merging**: greedy reading-order grouping of raw spans
//! - **Duplicate/overlap resolution**: hidden text layers and OCR
//!   double-vision artifacts removed
//! - **Graphic detection**: segmentation of non-text regions into
//!   discrete objects
//! - **Arbitration**: text already baked into a graphic is dropped
//! - **Background reconstruction**: masked diffusion inpainting
//!
//! ## Modules
//!
//! * [`core`] - Error and configuration types
//! * [`domain`] - Data model (spans, graphics, packaged layers)
//! * [`processors`] - Geometry and image processing stages
//! * [`sources`] - Text source adapters
//! * [`pipeline`] - The orchestrator, config loading, and statistics
//! * [`utils`] - Image loading and conversion helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slidesep::prelude::*;
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let separator = SlideSeparator::builder()
//!     .config(SeparationConfig::default())
//!     .build()?;
//!
//! let page = load_image(Path::new("slides/page_0001.png"))?;
//! let layers = separator.separate_page(&page, 1).await?;
//!
//! for span in &layers.text_spans {
//!     println!("{:?} {:?}: {}", span.role, span.bbox, span.text);
//! }
//! println!(
//!     "{} graphics, background {}x{}",
//!     layers.graphics.len(),
//!     layers.width(),
//!     layers.height()
//! );
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod sources;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use slidesep::prelude::*;
/// ```
pub mod prelude {
    // Orchestrator (essential)
    pub use crate::pipeline::{SlideSeparator, SlideSeparatorBuilder};

    // Configuration
    pub use crate::core::{SeparationConfig, SepResult, SeparationError};

    // Data model
    pub use crate::domain::{GraphicObject, SlideLayers, SourceKind, TextRole, TextSpan};

    // Geometry
    pub use crate::processors::BoundingBox;

    // Collaborator traits
    pub use crate::sources::{OcrBackend, OcrDetection, TextLayerProvider, TextRun};

    // Image utility (minimal)
    pub use crate::utils::load_image;
}
