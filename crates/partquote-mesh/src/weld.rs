//! Vertex welding and edge adjacency.

use std::collections::HashMap;

use partquote_math::angle_between;
use tracing::debug;

use crate::TriangleMesh;

/// An undirected edge keyed by its sorted vertex indices.
pub type EdgeKey = (u32, u32);

fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl TriangleMesh {
    /// Merge vertices closer than `tolerance` (per axis, grid-snapped).
    ///
    /// Triangles that collapse to fewer than three distinct vertices are
    /// dropped.
    pub fn weld(&self, tolerance: f64) -> TriangleMesh {
        let tolerance = if tolerance > 0.0 { tolerance } else { 1e-9 };
        let mut lookup: HashMap<[i64; 3], u32> = HashMap::with_capacity(self.vertices.len());
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut vertices = Vec::new();

        for v in &self.vertices {
            let key = [
                (v.x / tolerance).round() as i64,
                (v.y / tolerance).round() as i64,
                (v.z / tolerance).round() as i64,
            ];
            let idx = *lookup.entry(key).or_insert_with(|| {
                vertices.push(*v);
                (vertices.len() - 1) as u32
            });
            remap.push(idx);
        }

        let indices: Vec<[u32; 3]> = self
            .indices
            .iter()
            .map(|&[a, b, c]| [remap[a as usize], remap[b as usize], remap[c as usize]])
            .filter(|[a, b, c]| a != b && b != c && a != c)
            .collect();

        debug!(
            before = self.vertices.len(),
            after = vertices.len(),
            dropped = self.indices.len() - indices.len(),
            "welded mesh vertices"
        );
        TriangleMesh { vertices, indices }
    }

    /// Map every undirected edge to the triangles that use it.
    pub fn edge_adjacency(&self) -> HashMap<EdgeKey, Vec<usize>> {
        let mut edges: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
        for (t, &[a, b, c]) in self.indices.iter().enumerate() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                edges.entry(edge_key(u, v)).or_default().push(t);
            }
        }
        edges
    }

    /// Count manifold edges whose adjacent triangle normals differ by more
    /// than `threshold` radians.
    ///
    /// Only edges shared by exactly two triangles are considered, so the
    /// mesh should be welded first.
    pub fn sharp_edge_count(&self, threshold: f64) -> usize {
        self.edge_adjacency()
            .values()
            .filter(|tris| tris.len() == 2)
            .filter(|tris| {
                let n0 = self.triangle_normal(tris[0]);
                let n1 = self.triangle_normal(tris[1]);
                angle_between(&n0, &n1).is_some_and(|angle| angle > threshold)
            })
            .count()
    }

    /// Number of edges used by only one triangle.
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_adjacency()
            .values()
            .filter(|tris| tris.len() == 1)
            .count()
    }
}
