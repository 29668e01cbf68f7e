//! Error types for mesh loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while reading a mesh file.
#[derive(Debug, Error)]
pub enum MeshError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Extension is not a mesh format.
    #[error("unknown mesh format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension.
        extension: String,
    },

    /// Invalid file content.
    #[error("invalid mesh content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// Binary STL shorter than its declared triangle count.
    #[error("truncated binary STL: header declares {expected} triangles, found {got}")]
    InvalidFaceCount {
        /// Declared number of triangles.
        expected: u32,
        /// Complete triangles present.
        got: u32,
    },

    /// Face references a vertex that does not exist.
    #[error("face on line {line} references vertex {index}, mesh has {count}")]
    VertexIndex {
        /// 1-based source line.
        line: usize,
        /// Offending index as written.
        index: i64,
        /// Vertices defined so far.
        count: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl MeshError {
    /// Create an `InvalidContent` error with the given message.
    #[must_use]
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    pub(crate) fn from_open(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}
