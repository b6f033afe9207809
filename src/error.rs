//! Custom error types for smoothed-upscale.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the smoothed-upscale library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or decode an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    /// Failed to encode or write an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    /// Image dimensions are not supported.
    #[error("unsupported image dimensions {width}x{height}: {reason}")]
    UnsupportedDimensions {
        width: usize,
        height: usize,
        reason: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Two buffers that must share a shape do not.
    #[error("image shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

impl Error {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for smoothed-upscale operations.
pub type Result<T> = std::result::Result<T, Error>;
