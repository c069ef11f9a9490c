//! Error types for the slide separation pipeline.
//!
//! This module defines the error types that can occur while separating a
//! page into layers, including image loading errors, stage-tagged
//! processing errors, text source failures, and configuration errors,
//! together with utility constructors for creating them with context.

use thiserror::Error;

/// Enum representing different stages of processing in the separation
/// pipeline.
///
/// Used to identify which stage an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingStage {
    /// Error occurred while acquiring raw text spans.
    TextExtraction,
    /// Error occurred while merging spans into paragraphs.
    ParagraphMerge,
    /// Error occurred while resolving duplicate/overlapping spans.
    OverlapResolution,
    /// Error occurred while detecting graphic objects.
    GraphicDetection,
    /// Error occurred while arbitrating text against graphics.
    Arbitration,
    /// Error occurred while reconstructing the background.
    BackgroundCleaning,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::TextExtraction => write!(f, "text extraction"),
            ProcessingStage::ParagraphMerge => write!(f, "paragraph merge"),
            ProcessingStage::OverlapResolution => write!(f, "overlap resolution"),
            ProcessingStage::GraphicDetection => write!(f, "graphic detection"),
            ProcessingStage::Arbitration => write!(f, "arbitration"),
            ProcessingStage::BackgroundCleaning => write!(f, "background cleaning"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Enum representing the errors that can occur in the separation
/// pipeline.
#[derive(Error, Debug)]
pub enum SeparationError {
    /// Error occurred while loading or encoding an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error raised by a text source collaborator (OCR backend or text
    /// layer provider).
    #[error("text source '{name}'")]
    Source {
        /// Name of the failing source.
        name: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating invalid input, e.g. an empty page image.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// HTTP transport error from the hosted vision service.
    #[error("vision transport")]
    Transport(#[from] reqwest::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for separation operations.
pub type SepResult<T> = Result<T, SeparationError>;

impl SeparationError {
    /// Creates a SeparationError for a processing stage.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a SeparationError for a failing text source.
    pub fn source_error(
        name: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Source {
            name: name.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a SeparationError for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a SeparationError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Creates a SeparationError for configuration errors with field
    /// context.
    pub fn config_error_with_context(field: &str, value: &str, reason: &str) -> Self {
        Self::ConfigError {
            message: format!(
                "configuration error in field '{}' with value '{}': {}",
                field, value, reason
            ),
        }
    }
}

impl From<image::ImageError> for SeparationError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_stage_displays() {
        assert_eq!(ProcessingStage::GraphicDetection.to_string(), "graphic detection");
        assert_eq!(ProcessingStage::Generic.to_string(), "processing");
    }

    #[test]
    fn invalid_input_formats_message() {
        let err = SeparationError::invalid_input("empty page image");
        assert_eq!(err.to_string(), "invalid input: empty page image");
    }

    #[test]
    fn config_error_with_context_names_field() {
        let err = SeparationError::config_error_with_context(
            "watermark.relative_left",
            "1.5",
            "must be within [0, 1]",
        );
        assert!(err.to_string().contains("watermark.relative_left"));
    }
}
