//! Error types for the discretization pipelines.
//!
//! Parameters with a sensible clamp (color count, sample count) never reach
//! this type: they are normalized silently. Structurally invalid input fails
//! fast with one of the variants below.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for discretize operations
pub type Result<T> = std::result::Result<T, DiscretizeError>;

/// Main error type for discretize operations
#[derive(Error, Debug)]
pub enum DiscretizeError {
    /// A grid target size was zero, negative, or too large to address.
    #[error("Invalid grid dimension: {rows} rows x {cols} cols (both must be at least 1)")]
    InvalidDimension { rows: i64, cols: i64 },

    /// A parameter with no sensible clamp was out of range.
    #[error("Invalid value for {name}: {value} ({expected})")]
    InvalidRange {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Empty input: {what} contains no data")]
    EmptyInput { what: &'static str },

    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The operation was handed the wrong kind of media.
    #[error("Operation '{operation}' requires {expected} input")]
    InputMismatch {
        operation: &'static str,
        expected: &'static str,
    },

    #[error("Failed to decode image '{}': {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to decode audio '{}': {source}", path.display())]
    AudioDecode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to write artifact '{name}': {source}")]
    Artifact {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiscretizeError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            DiscretizeError::InvalidDimension { .. } => "INVALID_DIMENSION",
            DiscretizeError::InvalidRange { .. } => "INVALID_RANGE",
            DiscretizeError::EmptyInput { .. } => "EMPTY_INPUT",
            DiscretizeError::BufferSizeMismatch { .. } => "BUFFER_SIZE_MISMATCH",
            DiscretizeError::InputMismatch { .. } => "INPUT_MISMATCH",
            DiscretizeError::ImageDecode { .. } => "IMAGE_DECODE",
            DiscretizeError::AudioDecode { .. } => "AUDIO_DECODE",
            DiscretizeError::Artifact { .. } => "ARTIFACT_WRITE",
            DiscretizeError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the error was caused by caller-supplied data rather than the
    /// environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DiscretizeError::InvalidDimension { .. }
                | DiscretizeError::InvalidRange { .. }
                | DiscretizeError::EmptyInput { .. }
                | DiscretizeError::BufferSizeMismatch { .. }
                | DiscretizeError::InputMismatch { .. }
                | DiscretizeError::ImageDecode { .. }
                | DiscretizeError::AudioDecode { .. }
        )
    }
}
