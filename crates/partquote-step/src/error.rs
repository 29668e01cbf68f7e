//! STEP import failures.

use thiserror::Error;

/// Why a STEP file could not be turned into a model.
#[derive(Error, Debug)]
pub enum StepError {
    /// The file could not be read.
    #[error("cannot read STEP file: {0}")]
    Io(#[from] std::io::Error),

    /// Bad token in the exchange structure.
    #[error("syntax error at {line}:{col}: {message}")]
    Syntax {
        /// 1-based line.
        line: usize,
        /// 1-based column.
        col: usize,
        /// What was wrong.
        message: String,
    },

    /// Well-formed tokens in the wrong order, or bad entity arguments.
    #[error("malformed {}: {message}", entity_id.map_or_else(|| "data section".to_string(), |id| format!("entity #{id}")))]
    Malformed {
        /// Instance the problem belongs to, when known.
        entity_id: Option<u64>,
        /// What was wrong.
        message: String,
    },

    /// A `#id` reference to an instance that does not exist.
    #[error("dangling reference to #{0}")]
    DanglingReference(u64),

    /// A reference resolved to an instance of the wrong type.
    #[error("expected {expected}, found {found}")]
    UnexpectedEntity {
        /// Type the reader needed.
        expected: &'static str,
        /// Type it got.
        found: String,
    },

    /// A face type other than ADVANCED_FACE or FACE_SURFACE.
    #[error("unsupported face type {0}")]
    UnsupportedFace(String),

    /// Degenerate placement or direction.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Topology the reader cannot follow.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// No solid, surface model or shell in the file.
    #[error("STEP file contains no solids or shells")]
    NoSolids,
}

impl StepError {
    pub(crate) fn syntax(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            col,
            message: message.into(),
        }
    }

    pub(crate) fn malformed(entity_id: Option<u64>, message: impl Into<String>) -> Self {
        Self::Malformed {
            entity_id,
            message: message.into(),
        }
    }

    pub(crate) fn unexpected(expected: &'static str, found: impl Into<String>) -> Self {
        Self::UnexpectedEntity {
            expected,
            found: found.into(),
        }
    }
}
