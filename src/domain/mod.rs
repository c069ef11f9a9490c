//! Domain types for slide layer separation.
//!
//! This module defines the data model flowing through the pipeline:
//! text spans with position and style metadata, extracted graphic
//! objects, and the packaged per-page [`SlideLayers`] result.

mod graphic;
mod layers;
mod span;

pub use graphic::GraphicObject;
pub use layers::{Degradation, PageStage, SlideLayers, SourceKind};
pub use span::{FontSizeClass, TextRole, TextSpan};
