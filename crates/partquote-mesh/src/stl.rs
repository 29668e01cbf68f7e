//! STL (Stereolithography) reader.
//!
//! Handles both encodings:
//! - ASCII files start with `solid` and list `facet`/`vertex` records
//! - Binary files carry an 80-byte header, a `u32` triangle count and
//!   50 bytes per triangle (normal, three vertices, attribute word)
//!
//! Some exporters write binary files whose header also begins with
//! `solid`. Those are recognised by a NUL byte in the header or by a file
//! length that matches the declared triangle count exactly.

use std::path::Path;

use partquote_math::Point3;
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::TriangleMesh;

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Load an STL file, detecting ASCII vs binary.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid STL.
pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| MeshError::from_open(path, e))?;
    read_stl(&bytes)
}

/// Parse STL content from memory.
///
/// # Errors
///
/// Returns an error if the content is not valid STL.
pub fn read_stl(bytes: &[u8]) -> Result<TriangleMesh> {
    if bytes.len() < 6 {
        return Err(MeshError::invalid_content("file too small to be valid STL"));
    }

    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    let looks_ascii = String::from_utf8_lossy(head).trim_start().starts_with("solid");

    if looks_ascii && !is_binary_stl(bytes) {
        debug!(bytes = bytes.len(), "reading ASCII STL");
        read_stl_ascii(&String::from_utf8_lossy(bytes))
    } else {
        debug!(bytes = bytes.len(), "reading binary STL");
        read_stl_binary(bytes)
    }
}

/// Check whether content starting with `solid` is really binary.
fn is_binary_stl(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_SIZE + 4 {
        return false;
    }
    if bytes[..HEADER_SIZE].contains(&0) {
        return true;
    }
    let count = declared_count(bytes) as usize;
    bytes.len() == HEADER_SIZE + 4 + count * TRIANGLE_SIZE
}

fn declared_count(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ])
}

fn read_stl_binary(bytes: &[u8]) -> Result<TriangleMesh> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(MeshError::invalid_content(format!(
            "binary STL header needs {} bytes, got {}",
            HEADER_SIZE + 4,
            bytes.len()
        )));
    }

    let face_count = declared_count(bytes);
    let body = &bytes[HEADER_SIZE + 4..];
    let available = body.len() / TRIANGLE_SIZE;
    if available < face_count as usize {
        return Err(MeshError::InvalidFaceCount {
            expected: face_count,
            got: available as u32,
        });
    }

    let mut mesh = TriangleMesh {
        vertices: Vec::with_capacity(face_count as usize * 3),
        indices: Vec::with_capacity(face_count as usize),
    };
    for record in body.chunks_exact(TRIANGLE_SIZE).take(face_count as usize) {
        // Skip the stored normal; it is recomputed from winding when needed.
        mesh.push_triangle(
            read_vertex(&record[12..24]),
            read_vertex(&record[24..36]),
            read_vertex(&record[36..48]),
        );
    }
    Ok(mesh)
}

/// Read a vertex from 12 bytes (3 f32s).
fn read_vertex(buf: &[u8]) -> Point3 {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Point3::new(f64::from(x), f64::from(y), f64::from(z))
}

fn read_stl_ascii(text: &str) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::new();
    let mut in_loop = false;
    let mut corners: Vec<Point3> = Vec::with_capacity(3);

    for line in text.lines() {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "outer" => {
                in_loop = true;
                corners.clear();
            }
            "vertex" if in_loop => {
                let coords: Vec<&str> = parts.collect();
                if coords.len() < 3 {
                    return Err(MeshError::invalid_content(format!(
                        "vertex line has {} coordinates",
                        coords.len()
                    )));
                }
                let x: f64 = coords[0].parse()?;
                let y: f64 = coords[1].parse()?;
                let z: f64 = coords[2].parse()?;
                corners.push(Point3::new(x, y, z));
            }
            "endloop" => in_loop = false,
            "endfacet" => {
                if corners.len() == 3 {
                    mesh.push_triangle(corners[0], corners[1], corners[2]);
                }
                corners.clear();
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn binary_stl(triangles: &[[[f32; 3]; 3]], header_text: &[u8]) -> Vec<u8> {
        let mut out = vec![b' '; HEADER_SIZE];
        out[..header_text.len()].copy_from_slice(header_text);
        out.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for tri in triangles {
            out.extend_from_slice(&[0u8; 12]);
            for v in tri {
                for c in v {
                    out.extend_from_slice(&c.to_le_bytes());
                }
            }
            out.extend_from_slice(&0u16.to_le_bytes());
        }
        out
    }

    const TRI: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    #[test]
    fn test_ascii_stl() {
        let stl = "solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test
";
        let mesh = read_stl(stl.as_bytes()).unwrap();
        assert_eq!(mesh.num_triangles(), 1);
        assert_relative_eq!(mesh.surface_area(), 0.5);
    }

    #[test]
    fn test_ascii_stl_bad_number() {
        let stl = "solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 zero 0\n";
        assert!(matches!(read_stl(stl.as_bytes()), Err(MeshError::ParseFloat(_))));
    }

    #[test]
    fn test_binary_stl() {
        let bytes = binary_stl(&[TRI, TRI], b"exported");
        let mesh = read_stl(&bytes).unwrap();
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.triangle(1)[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_binary_stl_with_solid_header() {
        let bytes = binary_stl(&[TRI], b"solid exported by a careless tool");
        let mesh = read_stl(&bytes).unwrap();
        assert_eq!(mesh.num_triangles(), 1);
    }

    #[test]
    fn test_truncated_binary_stl() {
        let mut bytes = binary_stl(&[TRI, TRI], b"bin");
        bytes.truncate(bytes.len() - 10);
        match read_stl(&bytes) {
            Err(MeshError::InvalidFaceCount { expected, got }) => {
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("expected InvalidFaceCount, got {other:?}"),
        }
    }

    #[test]
    fn test_too_small() {
        assert!(matches!(
            read_stl(b"sol"),
            Err(MeshError::InvalidContent { .. })
        ));
    }

    #[test]
    fn test_load_stl_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".stl").tempfile().unwrap();
        file.write_all(&binary_stl(&[TRI], b"disk")).unwrap();
        let mesh = load_stl(file.path()).unwrap();
        assert_eq!(mesh.num_triangles(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_stl("/nonexistent/part.stl");
        assert!(matches!(result, Err(MeshError::FileNotFound { .. })));
    }
}
