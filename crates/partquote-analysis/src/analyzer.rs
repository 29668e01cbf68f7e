//! Entry point tying the registry, loader and coordinator together.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::coordinator::{AnalysisReport, Coordinator};
use crate::error::{AnalysisError, LoadFailure};
use crate::loader;
use crate::model::ModelHandle;
use crate::record::FeatureRecord;
use crate::registry::BackendRegistry;

/// Analyses model files with one shared, immutable backend registry.
#[derive(Debug, Clone)]
pub struct Analyzer {
    registry: Arc<BackendRegistry>,
    config: EngineConfig,
}

impl Analyzer {
    /// Analyzer with the built-in backends enabled by `config`.
    pub fn new(config: EngineConfig) -> Self {
        let registry = Arc::new(BackendRegistry::from_config(&config));
        Self { registry, config }
    }

    /// Analyzer over a caller-built registry.
    pub fn with_registry(registry: Arc<BackendRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// The registry in use.
    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Run the fallback chain on `path`.
    ///
    /// Only a missing file is an error; backend failures end up in the
    /// report and the features degrade to whatever could be measured.
    pub fn analyze(&self, path: &Path) -> Result<AnalysisReport, AnalysisError> {
        if !path.is_file() {
            return Err(AnalysisError::FileNotFound(path.to_path_buf()));
        }
        let report = Coordinator::new(Arc::clone(&self.registry))
            .with_timeout(self.config.backend_timeout())
            .run(path);
        info!(
            path = %path.display(),
            format = %report.format,
            backend = report.backend.as_deref().unwrap_or("none"),
            failures = report.failures.len(),
            "analysis complete"
        );
        Ok(report)
    }

    /// Features of `path`, without the audit trail.
    pub fn analyze_features(&self, path: &Path) -> Result<FeatureRecord, AnalysisError> {
        self.analyze(path).map(|report| report.features)
    }

    /// Load `path` into a model with the best suitable backend.
    pub fn load(&self, path: &Path) -> Result<ModelHandle, LoadFailure> {
        loader::load(path, &self.registry)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
