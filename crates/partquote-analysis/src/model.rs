//! Input formats and loaded model handles.

use std::fmt;
use std::path::Path;

use partquote_brep::BRepModel;
use partquote_mesh::TriangleMesh;
use serde::Serialize;

/// File format, from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// ISO 10303-21 (`.step`, `.stp`).
    Step,
    /// IGES (`.igs`, `.iges`).
    Iges,
    /// STL (`.stl`).
    Stl,
    /// Wavefront OBJ (`.obj`).
    Obj,
    /// Anything else.
    Unknown,
}

impl ModelFormat {
    /// Detect the format from a path's extension, case-insensitively.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("step" | "stp") => ModelFormat::Step,
            Some("igs" | "iges") => ModelFormat::Iges,
            Some("stl") => ModelFormat::Stl,
            Some("obj") => ModelFormat::Obj,
            _ => ModelFormat::Unknown,
        }
    }

    /// Boundary-representation formats.
    pub fn is_brep(self) -> bool {
        matches!(self, ModelFormat::Step | ModelFormat::Iges)
    }

    /// Triangle mesh formats.
    pub fn is_mesh(self) -> bool {
        matches!(self, ModelFormat::Stl | ModelFormat::Obj)
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelFormat::Step => "STEP",
            ModelFormat::Iges => "IGES",
            ModelFormat::Stl => "STL",
            ModelFormat::Obj => "OBJ",
            ModelFormat::Unknown => "unknown format",
        };
        f.write_str(s)
    }
}

/// A loaded geometric representation, owned by one analysis request.
#[derive(Debug, Clone)]
pub enum ModelHandle {
    /// Triangle soup.
    Mesh(TriangleMesh),
    /// Boundary representation.
    Solid(BRepModel),
}

impl ModelHandle {
    /// True when the model holds no geometry at all.
    pub fn is_empty(&self) -> bool {
        match self {
            ModelHandle::Mesh(mesh) => mesh.is_empty(),
            ModelHandle::Solid(model) => model.is_empty(),
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            ModelHandle::Mesh(mesh) => format!("mesh with {} triangles", mesh.num_triangles()),
            ModelHandle::Solid(model) => format!(
                "solid with {} faces, {} edges",
                model.num_faces(),
                model.num_edges()
            ),
        }
    }
}
