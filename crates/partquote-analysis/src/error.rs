//! Failure taxonomy for loading and analysis.
//!
//! Only [`AnalysisError`] reaches callers of the analyzer. The other types
//! describe failures that are recovered locally and degrade to absent
//! features: they are returned by backends and the loader, collected by the
//! coordinator, and logged.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::record::FeatureRecord;

/// The only error surfaced by [`Analyzer`](crate::Analyzer).
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The input path does not exist or is not a file.
    #[error("model file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

/// How a backend attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file could not be read into a model.
    Load,
    /// The model loaded but a measurement failed.
    Analysis,
    /// The backend panicked.
    Panicked,
    /// The backend did not finish within the configured timeout.
    TimedOut,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Load => "load failed",
            FailureKind::Analysis => "analysis failed",
            FailureKind::Panicked => "panicked",
            FailureKind::TimedOut => "timed out",
        };
        f.write_str(s)
    }
}

/// One failed backend attempt.
#[derive(Error, Debug, Clone, serde::Serialize)]
#[error("backend {backend} {kind}: {message}")]
pub struct BackendFailure {
    /// Name of the backend.
    pub backend: String,
    /// What went wrong.
    pub kind: FailureKind,
    /// Human-readable detail.
    pub message: String,
    /// Features measured before the failure, kept for merging.
    #[serde(skip)]
    pub partial: Option<FeatureRecord>,
}

impl BackendFailure {
    /// A failure without partial results.
    pub fn new(backend: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            kind,
            message: message.into(),
            partial: None,
        }
    }

    /// Attach the features measured before the failure.
    #[must_use]
    pub fn with_partial(mut self, partial: FeatureRecord) -> Self {
        self.partial = Some(partial).filter(|p| !p.is_empty());
        self
    }

    /// A failure for a panic payload caught with `catch_unwind`.
    pub(crate) fn from_panic(backend: &str, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::new(backend, FailureKind::Panicked, message)
    }
}

/// Why no model could be loaded.
#[derive(Error, Debug, Clone)]
pub enum LoadFailure {
    /// No registered backend can attempt this file.
    #[error("no registered backend supports {0}")]
    UnsupportedFormat(String),

    /// The selected backend failed.
    #[error(transparent)]
    Backend(#[from] BackendFailure),
}

/// A single feature that could not be evaluated; the field stays absent.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot compute {field}: {reason}")]
pub struct ComputationFailure {
    /// Feature name.
    pub field: &'static str,
    /// Why it failed.
    pub reason: String,
}

impl ComputationFailure {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
