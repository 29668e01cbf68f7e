//! Resolve a file into a model handle through the registry.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::backend::{AnalysisBackend, Capability};
use crate::error::{BackendFailure, LoadFailure};
use crate::model::{ModelFormat, ModelHandle};
use crate::registry::BackendRegistry;

/// Load `path` with the most suitable registered backend.
///
/// Boundary-rep files go to a solid kernel when one is registered;
/// otherwise a general mesh kernel is tried, then the minimal STL reader.
/// Backend errors and panics come back as [`LoadFailure`].
pub fn load(path: &Path, registry: &BackendRegistry) -> Result<ModelHandle, LoadFailure> {
    let format = ModelFormat::from_path(path);
    let backend = select(format, registry)
        .ok_or_else(|| LoadFailure::UnsupportedFormat(format.to_string()))?;
    debug!(backend = backend.name(), %format, path = %path.display(), "loading model");

    let handle = catch_unwind(AssertUnwindSafe(|| backend.load(path)))
        .unwrap_or_else(|payload| Err(BackendFailure::from_panic(backend.name(), &*payload)))?;
    debug!(backend = backend.name(), model = %handle.describe(), "loaded model");
    Ok(handle)
}

fn select(format: ModelFormat, registry: &BackendRegistry) -> Option<&Arc<dyn AnalysisBackend>> {
    if format.is_brep() {
        if let Some(solid) = registry.find(Capability::SolidKernel, format) {
            return Some(solid);
        }
    }
    if let Some(mesh) = registry.find(Capability::MeshKernel, format) {
        return Some(mesh);
    }
    if format == ModelFormat::Stl {
        return registry.find(Capability::MinimalMesh, format);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MeshKernelBackend, StlMinimalBackend};
    use crate::error::FailureKind;
    use crate::record::FeatureRecord;
    use std::io::Write;

    const BOX_10MM: &str = include_str!("../../../testdata/box_10mm.step");

    #[derive(Debug)]
    struct PanickingBackend;

    impl AnalysisBackend for PanickingBackend {
        fn name(&self) -> &str {
            "panicky"
        }
        fn capability(&self) -> Capability {
            Capability::SolidKernel
        }
        fn accepts(&self, format: ModelFormat) -> bool {
            format.is_brep()
        }
        fn load(&self, _path: &Path) -> Result<ModelHandle, BackendFailure> {
            panic!("kernel crashed")
        }
        fn analyze(&self, _path: &Path) -> Result<FeatureRecord, BackendFailure> {
            panic!("kernel crashed")
        }
    }

    fn temp_file(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    #[test]
    fn test_step_loads_as_solid() {
        let file = temp_file(".STEP", BOX_10MM.as_bytes());
        let handle = load(file.path(), &BackendRegistry::default()).unwrap();
        assert!(matches!(handle, ModelHandle::Solid(_)));
    }

    #[test]
    fn test_stl_prefers_mesh_kernel_then_minimal() {
        let mesh_only = BackendRegistry::new(vec![
            Arc::new(StlMinimalBackend),
            Arc::new(MeshKernelBackend::default()),
        ]);
        let selected = select(ModelFormat::Stl, &mesh_only).unwrap();
        assert_eq!(selected.name(), "mesh-kernel");

        let minimal = BackendRegistry::new(vec![Arc::new(StlMinimalBackend)]);
        assert_eq!(select(ModelFormat::Stl, &minimal).unwrap().name(), "stl-minimal");
        assert!(select(ModelFormat::Obj, &minimal).is_none());
    }

    #[test]
    fn test_step_without_solid_kernel_is_unsupported() {
        let registry = BackendRegistry::new(vec![Arc::new(MeshKernelBackend::default())]);
        let file = temp_file(".step", BOX_10MM.as_bytes());
        assert!(matches!(
            load(file.path(), &registry),
            Err(LoadFailure::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let file = temp_file(".3mf", b"PK");
        assert!(matches!(
            load(file.path(), &BackendRegistry::default()),
            Err(LoadFailure::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_panic_becomes_load_failure() {
        let registry = BackendRegistry::new(vec![Arc::new(PanickingBackend)]);
        let file = temp_file(".step", BOX_10MM.as_bytes());
        match load(file.path(), &registry) {
            Err(LoadFailure::Backend(failure)) => {
                assert_eq!(failure.kind, FailureKind::Panicked);
                assert_eq!(failure.message, "kernel crashed");
            }
            other => panic!("expected a backend failure, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_file_is_load_failure() {
        let file = temp_file(".stl", b"solid x\nfacet normal 0 0 0\nouter loop\nvertex 1 2\n");
        assert!(matches!(
            load(file.path(), &BackendRegistry::default()),
            Err(LoadFailure::Backend(_))
        ));
    }
}
