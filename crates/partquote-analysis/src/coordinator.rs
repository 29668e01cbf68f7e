//! Ranked fallback over the registered backends.
//!
//! Each backend that accepts the format is tried once, in registry order,
//! until one returns a non-empty record. Failures are collected rather
//! than raised; partial records they carry are merged with the final
//! record so that more capable backends win field by field.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::{AnalysisBackend, Capability};
use crate::error::{BackendFailure, FailureKind};
use crate::manufacturability::machining_difficulty;
use crate::model::ModelFormat;
use crate::record::FeatureRecord;
use crate::registry::BackendRegistry;

/// Outcome of one analysis request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Merged features; empty when every backend failed.
    pub features: FeatureRecord,
    /// The backend whose record completed the run.
    pub backend: Option<String>,
    /// Failed attempts, in the order they happened.
    pub failures: Vec<BackendFailure>,
    /// Format detected from the file extension.
    pub format: ModelFormat,
}

#[derive(Clone, Copy)]
enum State {
    Attempt(usize),
    Done,
}

/// Runs backends in rank order and merges what they produce.
#[derive(Debug, Clone)]
pub struct Coordinator {
    registry: Arc<BackendRegistry>,
    timeout: Option<Duration>,
}

impl Coordinator {
    /// Coordinator over `registry`, waiting for each backend indefinitely.
    pub fn new(registry: Arc<BackendRegistry>) -> Self {
        Self {
            registry,
            timeout: None,
        }
    }

    /// Stop waiting for a backend after `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Analyse `path`. Never fails: the report lists what went wrong.
    pub fn run(&self, path: &Path) -> AnalysisReport {
        let format = ModelFormat::from_path(path);
        let backends = self.registry.backends();

        let mut records: Vec<(Capability, FeatureRecord)> = Vec::new();
        let mut failures = Vec::new();
        let mut winner = None;
        let mut state = State::Attempt(0);

        while let State::Attempt(i) = state {
            let Some(backend) = backends.get(i) else {
                state = State::Done;
                continue;
            };
            state = State::Attempt(i + 1);
            if !backend.accepts(format) {
                continue;
            }

            debug!(backend = backend.name(), %format, "attempting backend");
            match self.attempt(backend, path) {
                Ok(record) if record.is_empty() => {
                    debug!(backend = backend.name(), "backend returned no features");
                }
                Ok(record) => {
                    records.push((backend.capability(), record));
                    winner = Some(backend.name().to_string());
                    state = State::Done;
                }
                Err(failure) => {
                    warn!(
                        backend = %failure.backend,
                        kind = %failure.kind,
                        message = %failure.message,
                        "backend failed"
                    );
                    if let Some(partial) = &failure.partial {
                        records.push((backend.capability(), partial.clone()));
                    }
                    failures.push(failure);
                }
            }
        }

        AnalysisReport {
            features: merge(records),
            backend: winner,
            failures,
            format,
        }
    }

    fn attempt(
        &self,
        backend: &Arc<dyn AnalysisBackend>,
        path: &Path,
    ) -> Result<FeatureRecord, BackendFailure> {
        match self.timeout {
            None => catch_unwind(AssertUnwindSafe(|| backend.analyze(path)))
                .unwrap_or_else(|payload| Err(BackendFailure::from_panic(backend.name(), &*payload))),
            Some(timeout) => attempt_with_timeout(Arc::clone(backend), path.to_path_buf(), timeout),
        }
    }
}

/// Run the backend on its own thread and stop waiting after `timeout`.
///
/// A thread that overruns is left detached; its result is discarded.
fn attempt_with_timeout(
    backend: Arc<dyn AnalysisBackend>,
    path: PathBuf,
    timeout: Duration,
) -> Result<FeatureRecord, BackendFailure> {
    let name = backend.name().to_string();
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name(format!("partquote-{name}"))
        .spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| backend.analyze(&path)))
                .unwrap_or_else(|payload| Err(BackendFailure::from_panic(backend.name(), &*payload)));
            // The receiver is gone when the coordinator gave up.
            let _ = tx.send(result);
        });
    if let Err(e) = spawned {
        return Err(BackendFailure::new(
            name,
            FailureKind::Analysis,
            format!("cannot start worker thread: {e}"),
        ));
    }

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(BackendFailure::new(
            name,
            FailureKind::TimedOut,
            format!("no result after {} ms", timeout.as_millis()),
        )),
        Err(RecvTimeoutError::Disconnected) => Err(BackendFailure::new(
            name,
            FailureKind::Panicked,
            "worker exited without a result",
        )),
    }
}

/// Fold records in ascending capability; later values overwrite earlier
/// ones only where present. Equal capabilities keep attempt order.
///
/// Difficulty is scored again on the merged fields whenever one of the
/// inputs carried model-derived features, so it never describes a record
/// that was replaced field by field.
fn merge(mut records: Vec<(Capability, FeatureRecord)>) -> FeatureRecord {
    records.sort_by_key(|(capability, _)| *capability);
    let mut merged = records
        .iter()
        .fold(FeatureRecord::empty(), |mut merged, (_, record)| {
            merged.merge_from(record);
            merged
        });
    let derived = merged.machining_difficulty().is_some()
        || merged.min_corner_radius_mm().is_some()
        || merged.max_aspect_ratio.is_some();
    if derived {
        merged.set_machining_difficulty(Some(machining_difficulty(&merged)));
    }
    merged
}
