//! Utility functions for images used across the pipeline.

mod image;
pub mod visualization;

pub use image::{
    create_rgb_image, dynamic_to_gray, dynamic_to_rgb, encode_png, load_image, load_images_batch,
    load_images_batch_with_threshold,
};
pub use visualization::render_debug_overlay;
