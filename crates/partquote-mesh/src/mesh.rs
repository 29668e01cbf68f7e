//! Indexed triangle mesh and its measurements.

use partquote_math::{Aabb3, Point3, Vec3};

/// Indexed triangle mesh in millimetres.
///
/// Readers produce one vertex per triangle corner; call
/// [`TriangleMesh::weld`](crate::TriangleMesh::weld) to share coincident
/// vertices before adjacency queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangles as indices into `vertices`.
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an unwelded mesh from a triangle list.
    pub fn from_triangles(triangles: &[[Point3; 3]]) -> Self {
        let mut mesh = Self {
            vertices: Vec::with_capacity(triangles.len() * 3),
            indices: Vec::with_capacity(triangles.len()),
        };
        for tri in triangles {
            mesh.push_triangle(tri[0], tri[1], tri[2]);
        }
        mesh
    }

    /// Append a triangle with three fresh vertices.
    pub fn push_triangle(&mut self, a: Point3, b: Point3, c: Point3) {
        let base = self.vertices.len() as u32;
        self.vertices.extend([a, b, c]);
        self.indices.push([base, base + 1, base + 2]);
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// True if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Corner positions of triangle `i`.
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.indices[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Iterate over triangle corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        (0..self.indices.len()).map(move |i| self.triangle(i))
    }

    /// Unnormalized triangle normal (length is twice the triangle area).
    pub fn triangle_normal(&self, i: usize) -> Vec3 {
        let [a, b, c] = self.triangle(i);
        (b - a).cross(&(c - a))
    }

    /// Signed volume from the divergence theorem, in mm³.
    ///
    /// Positive for outward-wound closed meshes.
    pub fn signed_volume(&self) -> f64 {
        let sum: f64 = self
            .triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
            .sum();
        sum / 6.0
    }

    /// Enclosed volume in mm³, clamped to zero for inverted or open meshes.
    ///
    /// `None` when a vertex is NaN or infinite.
    pub fn volume(&self) -> Option<f64> {
        let signed = self.signed_volume();
        signed.is_finite().then(|| signed.max(0.0))
    }

    /// Total triangle area in mm².
    pub fn surface_area(&self) -> f64 {
        (0..self.indices.len())
            .map(|i| self.triangle_normal(i).norm() / 2.0)
            .sum()
    }

    /// Axis-aligned bounds of all referenced vertices.
    pub fn bounding_box(&self) -> Option<Aabb3> {
        if self.is_empty() {
            return None;
        }
        Aabb3::from_points(&self.vertices)
    }
}

/// Axis-aligned cube from `min` with edge `size`, outward winding.
///
/// Used by tests across the workspace.
pub fn cube(min: Point3, size: f64) -> TriangleMesh {
    let p = |x: f64, y: f64, z: f64| Point3::new(min.x + x * size, min.y + y * size, min.z + z * size);
    let v = [
        p(0.0, 0.0, 0.0),
        p(1.0, 0.0, 0.0),
        p(1.0, 1.0, 0.0),
        p(0.0, 1.0, 0.0),
        p(0.0, 0.0, 1.0),
        p(1.0, 0.0, 1.0),
        p(1.0, 1.0, 1.0),
        p(0.0, 1.0, 1.0),
    ];
    let faces: [[usize; 3]; 12] = [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [1, 2, 6],
        [1, 6, 5],
        [2, 3, 7],
        [2, 7, 6],
        [3, 0, 4],
        [3, 4, 7],
    ];
    let triangles: Vec<[Point3; 3]> = faces.iter().map(|f| [v[f[0]], v[f[1]], v[f[2]]]).collect();
    TriangleMesh::from_triangles(&triangles)
}
