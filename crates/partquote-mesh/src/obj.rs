//! Wavefront OBJ reader.
//!
//! Only geometry is read: `v` records and `f` records. Polygonal faces are
//! fan-triangulated from their first corner. Texture and normal references
//! (`f 1/2/3`) are ignored, negative indices count back from the most
//! recently defined vertex.

use std::path::Path;

use partquote_math::Point3;

use crate::error::{MeshError, Result};
use crate::TriangleMesh;

/// Load an OBJ file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a record is malformed.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| MeshError::from_open(path, e))?;
    read_obj(&String::from_utf8_lossy(&bytes))
}

/// Parse OBJ text.
///
/// # Errors
///
/// Returns an error on malformed coordinates or out-of-range face indices.
pub fn read_obj(text: &str) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::new();

    for (line_idx, line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords: Vec<&str> = parts.take(3).collect();
                if coords.len() < 3 {
                    return Err(MeshError::invalid_content(format!(
                        "line {line_no}: vertex needs 3 coordinates"
                    )));
                }
                mesh.vertices.push(Point3::new(
                    coords[0].parse()?,
                    coords[1].parse()?,
                    coords[2].parse()?,
                ));
            }
            Some("f") => {
                let corners = parts
                    .map(|token| resolve_index(token, mesh.vertices.len(), line_no))
                    .collect::<Result<Vec<u32>>>()?;
                if corners.len() < 3 {
                    return Err(MeshError::invalid_content(format!(
                        "line {line_no}: face needs at least 3 vertices"
                    )));
                }
                for i in 1..corners.len() - 1 {
                    mesh.indices.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    Ok(mesh)
}

fn resolve_index(token: &str, count: usize, line: usize) -> Result<u32> {
    let head = token.split('/').next().unwrap_or(token);
    let index: i64 = head.parse().map_err(|_| {
        MeshError::invalid_content(format!("line {line}: bad face index '{token}'"))
    })?;
    let resolved = if index < 0 {
        count as i64 + index
    } else {
        index - 1
    };
    if resolved < 0 || resolved >= count as i64 {
        return Err(MeshError::VertexIndex { line, index, count });
    }
    Ok(resolved as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const QUAD: &str = "# unit square
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_quad_is_fan_triangulated() {
        let mesh = read_obj(QUAD).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.indices, vec![[0, 1, 2], [0, 2, 3]]);
        assert_relative_eq!(mesh.surface_area(), 1.0);
    }

    #[test]
    fn test_negative_indices() {
        let obj = "v 0 0 0\nv 2 0 0\nv 0 2 0\nf -3 -2 -1\n";
        let mesh = read_obj(obj).unwrap();
        assert_eq!(mesh.indices, vec![[0, 1, 2]]);
        assert_relative_eq!(mesh.surface_area(), 2.0);
    }

    #[test]
    fn test_index_out_of_range() {
        let obj = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        match read_obj(obj) {
            Err(MeshError::VertexIndex { line, index, count }) => {
                assert_eq!((line, index, count), (3, 3, 2));
            }
            other => panic!("expected VertexIndex, got {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_face_rejected() {
        let obj = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(read_obj(obj), Err(MeshError::InvalidContent { .. })));
    }
}
