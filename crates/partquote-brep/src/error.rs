use thiserror::Error;

/// Errors raised by boundary-rep queries.
#[derive(Debug, Error)]
pub enum BRepError {
    /// A key does not belong to this model.
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    /// Geometry that cannot be evaluated.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Convenience type alias for results using [`BRepError`].
pub type Result<T> = std::result::Result<T, BRepError>;
