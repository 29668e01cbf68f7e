//! Error types for IGES import.

use thiserror::Error;

/// Errors that can occur while reading an IGES file.
#[derive(Error, Debug)]
pub enum IgesError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record that does not follow the fixed 80-column layout.
    #[error("Invalid record at line {line}: {message}")]
    InvalidRecord {
        /// Line number in the file (1-indexed).
        line: usize,
        /// Error message.
        message: String,
    },

    /// Unparseable global section.
    #[error("Invalid global section: {0}")]
    InvalidGlobal(String),

    /// A required section is absent.
    #[error("Missing {0} section")]
    MissingSection(&'static str),

    /// Malformed parameter data for one entity.
    #[error("Invalid parameters for entity at directory line {directory_line}: {message}")]
    InvalidParameter {
        /// Sequence number of the entity's first directory line.
        directory_line: usize,
        /// Error message.
        message: String,
    },

    /// The file holds no geometry this reader understands.
    #[error("No supported geometry in IGES file")]
    NoGeometry,
}

impl IgesError {
    pub(crate) fn record(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn parameter(directory_line: usize, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            directory_line,
            message: message.into(),
        }
    }
}
