//! Image and geometry processors for slide layer separation.
//!
//! This module collects the algorithmic stages of the engine: coordinate
//! utilities, paragraph merging, duplicate/overlap resolution, mask
//! construction, graphic object detection, text-in-graphic arbitration,
//! and background inpainting.
//!
//! # Modules
//!
//! * `geometry` - Bounding boxes and pure coordinate operations
//! * `merge` - Grouping raw spans into paragraphs
//! * `resolve` - Duplicate removal and overlap collapse
//! * `mask` - Text-occupancy and inpainting mask construction
//! * `graphics` - Graphic object detection via segmentation
//! * `arbiter` - Text-vs-graphic arbitration
//! * `inpaint` - Background reconstruction

pub mod arbiter;
mod geometry;
pub mod graphics;
pub mod inpaint;
pub mod mask;
pub mod merge;
pub mod resolve;

pub use arbiter::filter_text_in_graphics;
pub use geometry::*;
pub use graphics::detect_graphics;
pub use inpaint::{inpaint, reconstruct_background, remove_watermark};
pub use mask::{combined_background_mask, dilate_mask, text_occupancy_mask};
pub use merge::merge_paragraphs;
pub use resolve::{collapse_overlaps, remove_hidden_duplicates};
