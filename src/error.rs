//! Custom error types for train-helpers.

use std::path::PathBuf;
use thiserror::Error;

/// Category of an [`Error`].
///
/// Every argument check maps onto one of these so callers can react to the
/// kind of failure without matching on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong argument type or category.
    Type,
    /// Argument lacks a structural property (length, shape) needed for further checks.
    Attribute,
    /// Numeric or shape constraint violated.
    Range,
    /// Recognised input that is deliberately unsupported.
    NotSupported,
    /// Reading or writing files.
    Io,
}

/// Main error type for the train-helpers library.
#[derive(Error, Debug)]
pub enum Error {
    /// Argument has the wrong type.
    #[error("invalid type for {name}: {reason}")]
    InvalidType { name: String, reason: String },

    /// Argument does not expose a required structural property.
    #[error("{name} has no attribute `{attribute}`")]
    MissingAttribute { name: String, attribute: String },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Shape mismatch in tensor operations.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Input is recognised but not supported.
    #[error("{operation} does not support {reason}")]
    NotSupported { operation: String, reason: String },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to parse a JSON document.
    #[error("failed to parse JSON from {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidType { .. } => ErrorKind::Type,
            Self::MissingAttribute { .. } => ErrorKind::Attribute,
            Self::InvalidParameter { .. } | Self::ShapeMismatch { .. } => ErrorKind::Range,
            Self::NotSupported { .. } => ErrorKind::NotSupported,
            Self::ImageSave { .. } | Self::Json { .. } | Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_type(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidType {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for train-helpers operations.
pub type Result<T> = std::result::Result<T, Error>;
