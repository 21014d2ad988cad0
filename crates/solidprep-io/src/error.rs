//! Error types for STL I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for STL I/O operations.
pub type StlResult<T> = Result<T, StlError>;

/// Errors that can occur while importing or exporting STL files.
#[derive(Debug, Error)]
pub enum StlError {
    /// The input path does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The file does not have an `.stl` extension.
    #[error("expected an .stl file, got extension: .{extension}")]
    UnsupportedFormat {
        /// The offending extension ("(none)" when absent).
        extension: String,
    },

    /// The file parsed successfully but contained zero triangles.
    #[error("file contains no triangle geometry")]
    EmptyGeometry,

    /// Refused to export a mesh with no points.
    #[error("mesh has no points to export")]
    EmptyMesh,

    /// The file content is not valid STL.
    #[error("invalid STL content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// A binary STL body ended before the declared triangle count.
    #[error("truncated binary STL: expected {expected} triangles, got {got}")]
    Truncated {
        /// Triangle count declared in the header.
        expected: u32,
        /// Triangles actually read.
        got: u32,
    },

    /// Underlying I/O failure (permissions, disk full, read errors).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A coordinate in an ASCII STL failed to parse.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl StlError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
