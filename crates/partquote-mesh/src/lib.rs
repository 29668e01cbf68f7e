#![warn(missing_docs)]

//! Triangle mesh loading and measurement.
//!
//! Reads STL (ASCII and binary) and Wavefront OBJ into an indexed
//! [`TriangleMesh`] and measures it: enclosed volume by the divergence
//! theorem, surface area, bounding box and dihedral sharp-edge counts.
//!
//! # Example
//!
//! ```no_run
//! use partquote_mesh::load_mesh;
//!
//! let mesh = load_mesh("bracket.stl").unwrap();
//! println!("{} triangles, {:?} mm³", mesh.num_triangles(), mesh.volume());
//! ```

mod error;
mod mesh;
mod obj;
mod stl;
mod weld;

pub use error::{MeshError, Result};
pub use mesh::{cube, TriangleMesh};
pub use obj::{load_obj, read_obj};
pub use stl::{load_stl, read_stl};
pub use weld::EdgeKey;

use std::path::Path;

/// Mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// STL, binary or ASCII.
    Stl,
    /// Wavefront OBJ.
    Obj,
}

impl MeshFormat {
    /// Detect format from file extension (case-insensitive).
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }
}

/// Load a mesh, choosing the reader from the file extension.
///
/// # Errors
///
/// Returns [`MeshError::UnknownFormat`] for non-mesh extensions, otherwise
/// any reader error.
pub fn load_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path).ok_or_else(|| MeshError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    match format {
        MeshFormat::Stl => load_stl(path),
        MeshFormat::Obj => load_obj(path),
    }
}
