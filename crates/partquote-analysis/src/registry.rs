//! The ranked list of enabled backends.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::backend::{
    AnalysisBackend, BestEffortBackend, Capability, MeshKernelBackend, StepKernelBackend,
    StlMinimalBackend,
};
use crate::config::{BackendKind, EngineConfig};
use crate::model::ModelFormat;

/// Backends in rank order, built once and shared read-only.
#[derive(Debug, Clone)]
pub struct BackendRegistry {
    backends: Vec<Arc<dyn AnalysisBackend>>,
}

impl BackendRegistry {
    /// Registry of `backends`, tried in the given order.
    pub fn new(backends: Vec<Arc<dyn AnalysisBackend>>) -> Self {
        Self { backends }
    }

    /// Registry of the built-in backends named by `config`.
    ///
    /// Repeated names are registered once.
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut seen = HashSet::new();
        let backends = config
            .backends
            .iter()
            .filter(|kind| {
                let first = seen.insert(**kind);
                if !first {
                    warn!(backend = %kind, "backend listed twice; ignoring repeat");
                }
                first
            })
            .map(|&kind| build(kind, config))
            .collect();
        Self { backends }
    }

    /// Backends in rank order.
    pub fn backends(&self) -> &[Arc<dyn AnalysisBackend>] {
        &self.backends
    }

    /// Number of backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// True when no backend is registered.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// The highest-ranked backend with `capability` that accepts `format`.
    pub fn find(&self, capability: Capability, format: ModelFormat) -> Option<&Arc<dyn AnalysisBackend>> {
        self.backends
            .iter()
            .find(|b| b.capability() == capability && b.accepts(format))
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

fn build(kind: BackendKind, config: &EngineConfig) -> Arc<dyn AnalysisBackend> {
    match kind {
        BackendKind::StepKernel => Arc::new(StepKernelBackend),
        BackendKind::MeshKernel => Arc::new(MeshKernelBackend::new(config.weld_tolerance_mm)),
        BackendKind::StlMinimal => Arc::new(StlMinimalBackend),
        BackendKind::BestEffort => Arc::new(BestEffortBackend),
    }
}
