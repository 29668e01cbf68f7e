//! Analysis backends and the capability ladder.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use partquote_mesh::{load_mesh, read_stl};
use serde::Serialize;

use crate::error::{BackendFailure, FailureKind};
use crate::features::extract;
use crate::manufacturability::{estimate_welded, machining_difficulty, DEFAULT_WELD_TOLERANCE_MM};
use crate::model::{ModelFormat, ModelHandle};
use crate::record::FeatureRecord;

/// How much a backend can measure. Ordered from least to most capable;
/// the order is also the merge precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// File metadata only.
    BestEffort,
    /// Raw STL triangle list.
    MinimalMesh,
    /// Mesh import with welding and adjacency.
    MeshKernel,
    /// Boundary-representation solids.
    SolidKernel,
}

/// One way of turning a model file into features.
///
/// Backends are stateless and shared between threads. Failures are
/// returned, never raised past the backend; the coordinator also contains
/// panics.
pub trait AnalysisBackend: Send + Sync + fmt::Debug {
    /// Stable name used in logs and reports.
    fn name(&self) -> &str;

    /// Rank of this backend.
    fn capability(&self) -> Capability;

    /// Whether this backend can attempt files of `format`.
    fn accepts(&self, format: ModelFormat) -> bool;

    /// Read the file into a model.
    fn load(&self, path: &Path) -> Result<ModelHandle, BackendFailure>;

    /// Load and measure the file.
    ///
    /// The default loads, extracts geometric features and estimates
    /// manufacturability.
    fn analyze(&self, path: &Path) -> Result<FeatureRecord, BackendFailure> {
        let handle = loaded(self, path)?;
        let base = extract(&handle);
        later_stage(self.name(), &base, || {
            estimate_welded(&handle, &base, DEFAULT_WELD_TOLERANCE_MM)
        })
    }
}

/// Run a stage that extends `base`. If it panics, the failure carries
/// `base` so the coordinator can still merge the geometric features.
fn later_stage(
    backend: &str,
    base: &FeatureRecord,
    stage: impl FnOnce() -> FeatureRecord,
) -> Result<FeatureRecord, BackendFailure> {
    catch_unwind(AssertUnwindSafe(stage))
        .map_err(|payload| BackendFailure::from_panic(backend, &*payload).with_partial(base.clone()))
}

/// Load through `backend`, treating a model without geometry as a failure.
fn loaded<B: AnalysisBackend + ?Sized>(backend: &B, path: &Path) -> Result<ModelHandle, BackendFailure> {
    let handle = backend.load(path)?;
    if handle.is_empty() {
        return Err(BackendFailure::new(
            backend.name(),
            FailureKind::Analysis,
            "model contains no geometry",
        ));
    }
    Ok(handle)
}

/// STEP and IGES boundary representations.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepKernelBackend;

impl AnalysisBackend for StepKernelBackend {
    fn name(&self) -> &str {
        "step-kernel"
    }

    fn capability(&self) -> Capability {
        Capability::SolidKernel
    }

    fn accepts(&self, format: ModelFormat) -> bool {
        format.is_brep()
    }

    fn load(&self, path: &Path) -> Result<ModelHandle, BackendFailure> {
        let fail = |message: String| BackendFailure::new(self.name(), FailureKind::Load, message);
        let model = match ModelFormat::from_path(path) {
            ModelFormat::Step => partquote_step::read_step(path).map_err(|e| fail(e.to_string()))?,
            ModelFormat::Iges => partquote_iges::read_iges(path).map_err(|e| fail(e.to_string()))?,
            other => return Err(fail(format!("{other} is not a boundary representation"))),
        };
        Ok(ModelHandle::Solid(model))
    }
}

/// STL and OBJ through the general mesh reader, welded before adjacency.
#[derive(Debug, Clone, Copy)]
pub struct MeshKernelBackend {
    weld_tolerance_mm: f64,
}

impl MeshKernelBackend {
    /// Backend welding vertices closer than `weld_tolerance_mm`.
    pub fn new(weld_tolerance_mm: f64) -> Self {
        Self { weld_tolerance_mm }
    }
}

impl Default for MeshKernelBackend {
    fn default() -> Self {
        Self::new(DEFAULT_WELD_TOLERANCE_MM)
    }
}

impl AnalysisBackend for MeshKernelBackend {
    fn name(&self) -> &str {
        "mesh-kernel"
    }

    fn capability(&self) -> Capability {
        Capability::MeshKernel
    }

    fn accepts(&self, format: ModelFormat) -> bool {
        format.is_mesh()
    }

    fn load(&self, path: &Path) -> Result<ModelHandle, BackendFailure> {
        load_mesh(path)
            .map(ModelHandle::Mesh)
            .map_err(|e| BackendFailure::new(self.name(), FailureKind::Load, e.to_string()))
    }

    fn analyze(&self, path: &Path) -> Result<FeatureRecord, BackendFailure> {
        let handle = loaded(self, path)?;
        let base = extract(&handle);
        later_stage(self.name(), &base, || {
            estimate_welded(&handle, &base, self.weld_tolerance_mm)
        })
    }
}

/// STL triangle list only: geometry and difficulty, no adjacency.
#[derive(Debug, Clone, Copy, Default)]
pub struct StlMinimalBackend;

impl AnalysisBackend for StlMinimalBackend {
    fn name(&self) -> &str {
        "stl-minimal"
    }

    fn capability(&self) -> Capability {
        Capability::MinimalMesh
    }

    fn accepts(&self, format: ModelFormat) -> bool {
        format == ModelFormat::Stl
    }

    fn load(&self, path: &Path) -> Result<ModelHandle, BackendFailure> {
        let fail = |message: String| BackendFailure::new(self.name(), FailureKind::Load, message);
        let bytes = std::fs::read(path).map_err(|e| fail(e.to_string()))?;
        read_stl(&bytes)
            .map(ModelHandle::Mesh)
            .map_err(|e| fail(e.to_string()))
    }

    fn analyze(&self, path: &Path) -> Result<FeatureRecord, BackendFailure> {
        let handle = loaded(self, path)?;
        let mut record = extract(&handle);
        record.set_machining_difficulty(Some(machining_difficulty(&record)));
        Ok(record)
    }
}

/// Bytes of file per complexity point.
const BYTES_PER_COMPLEXITY: f64 = 100_000.0;

/// Any supported file: a complexity score from the file size.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestEffortBackend;

impl BestEffortBackend {
    /// `min(5, max(1, bytes / 100000))`.
    pub fn complexity_from_size(bytes: u64) -> f64 {
        (bytes as f64 / BYTES_PER_COMPLEXITY).clamp(1.0, 5.0)
    }
}

impl AnalysisBackend for BestEffortBackend {
    fn name(&self) -> &str {
        "best-effort"
    }

    fn capability(&self) -> Capability {
        Capability::BestEffort
    }

    fn accepts(&self, format: ModelFormat) -> bool {
        format != ModelFormat::Unknown
    }

    fn load(&self, _path: &Path) -> Result<ModelHandle, BackendFailure> {
        Err(BackendFailure::new(
            self.name(),
            FailureKind::Load,
            "no geometric reader",
        ))
    }

    fn analyze(&self, path: &Path) -> Result<FeatureRecord, BackendFailure> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| BackendFailure::new(self.name(), FailureKind::Load, e.to_string()))?;
        let mut record = FeatureRecord::empty();
        record.complexity_score = Some(Self::complexity_from_size(metadata.len()));
        Ok(record)
    }
}
