//! Core error and configuration types for the separation pipeline.

pub mod config;
pub mod errors;

pub use config::{
    ArbiterConfig, ArbitrationMode, BackgroundConfig, DocTextConfig, GraphicDetectionConfig,
    MergeConfig, OcrSourceConfig, ResolverConfig, SeparationConfig, VisionConfig, WatermarkConfig,
};
pub use errors::{ProcessingStage, SepResult, SeparationError};
