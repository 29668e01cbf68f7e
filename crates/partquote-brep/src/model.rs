use std::collections::HashMap;

use partquote_math::{Point3, Vec3};
use slotmap::SlotMap;

use crate::curve::EdgeCurve;
use crate::error::{BRepError, Result};
use crate::surface::Surface;

slotmap::new_key_type! {
    /// Unique identifier for a vertex.
    pub struct VertexId;
    /// Unique identifier for an edge.
    pub struct EdgeId;
    /// Unique identifier for a face.
    pub struct FaceId;
}

/// A topological vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Position in millimetres.
    pub point: Point3,
}

/// A topological edge between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Start vertex.
    pub start: VertexId,
    /// End vertex.
    pub end: VertexId,
    /// Underlying curve.
    pub curve: EdgeCurve,
    /// Whether start→end follows the curve's own direction.
    pub same_sense: bool,
}

/// An edge used by a loop, with its traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopEdge {
    /// The edge.
    pub edge: EdgeId,
    /// `true` to traverse start→end.
    pub forward: bool,
}

/// A closed chain of edges bounding a face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeLoop {
    /// Edges in traversal order.
    pub edges: Vec<LoopEdge>,
    /// Outer boundary (as opposed to a hole).
    pub outer: bool,
}

/// A bounded portion of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Underlying surface.
    pub surface: Surface,
    /// Boundary loops.
    pub loops: Vec<EdgeLoop>,
    /// Whether the face normal agrees with the surface normal.
    pub same_sense: bool,
}

impl Face {
    /// `+1.0` when the face normal follows the surface normal, else `-1.0`.
    pub fn sense(&self) -> f64 {
        if self.same_sense {
            1.0
        } else {
            -1.0
        }
    }
}

/// Arena that owns every vertex, edge and face of a model.
///
/// A model may hold one or more solids, or only edges (wireframe imports).
#[derive(Debug, Clone, Default)]
pub struct BRepModel {
    vertices: SlotMap<VertexId, Vertex>,
    edges: SlotMap<EdgeId, Edge>,
    faces: SlotMap<FaceId, Face>,
}

impl BRepModel {
    /// Creates a new, empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a vertex.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        self.vertices.insert(Vertex { point })
    }

    /// Inserts an edge.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        self.edges.insert(edge)
    }

    /// Inserts a face.
    pub fn add_face(&mut self, face: Face) -> FaceId {
        self.faces.insert(face)
    }

    /// Returns the vertex data.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex does not belong to this model.
    pub fn vertex(&self, id: VertexId) -> Result<&Vertex> {
        self.vertices
            .get(id)
            .ok_or(BRepError::EntityNotFound("vertex"))
    }

    /// Returns the edge data.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not belong to this model.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edges.get(id).ok_or(BRepError::EntityNotFound("edge"))
    }

    /// Returns the face data.
    ///
    /// # Errors
    ///
    /// Returns an error if the face does not belong to this model.
    pub fn face(&self, id: FaceId) -> Result<&Face> {
        self.faces.get(id).ok_or(BRepError::EntityNotFound("face"))
    }

    /// Iterate over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    /// Iterate over all edges.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    /// Iterate over all faces.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// True if the model holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty() && self.faces.is_empty()
    }

    /// Scale every length in the model about the origin.
    pub fn scale(&mut self, factor: f64) {
        for vertex in self.vertices.values_mut() {
            vertex.point = Point3::from(vertex.point.coords * factor);
        }
        for edge in self.edges.values_mut() {
            edge.curve.scale(factor);
        }
        for face in self.faces.values_mut() {
            face.surface.scale(factor);
        }
    }

    /// Sample an edge in the requested direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_points(&self, id: EdgeId, forward: bool) -> Result<Vec<Point3>> {
        let edge = self.edge(id)?;
        let start = self.vertex(edge.start)?.point;
        let end = self.vertex(edge.end)?.point;
        let mut points = edge.curve.discretize(start, end, edge.same_sense);
        if !forward {
            points.reverse();
        }
        Ok(points)
    }

    /// A representative interior point of an edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge or one of its vertices is missing.
    pub fn edge_midpoint(&self, id: EdgeId) -> Result<Point3> {
        let points = self.edge_points(id, true)?;
        if points.len() == 2 {
            Ok(midpoint(&points[0], &points[1]))
        } else {
            Ok(points[points.len() / 2])
        }
    }

    /// Sample a loop as a closed polyline (last point not repeated).
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced edge or vertex is missing.
    pub fn loop_points(&self, edge_loop: &EdgeLoop) -> Result<Vec<Point3>> {
        let mut points: Vec<Point3> = Vec::new();
        for le in &edge_loop.edges {
            let segment = self.edge_points(le.edge, le.forward)?;
            let skip = usize::from(!points.is_empty());
            points.extend(segment.into_iter().skip(skip));
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Ok(points)
    }

    /// Exact vector area of a loop: the [`newell`] vector of its samples
    /// plus what the chords cut off curved edges.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced edge or vertex is missing.
    pub fn loop_vector_area(&self, edge_loop: &EdgeLoop) -> Result<Vec3> {
        let mut area = newell(&self.loop_points(edge_loop)?);
        for le in &edge_loop.edges {
            let edge = self.edge(le.edge)?;
            let start = self.vertex(edge.start)?.point;
            let end = self.vertex(edge.end)?.point;
            let deficit = edge.curve.chord_deficit(start, end, edge.same_sense);
            if le.forward {
                area += deficit;
            } else {
                area -= deficit;
            }
        }
        Ok(area)
    }

    /// All boundary samples of a face.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced edge or vertex is missing.
    pub fn face_boundary_points(&self, id: FaceId) -> Result<Vec<Point3>> {
        let face = self.face(id)?;
        let mut points = Vec::new();
        for edge_loop in &face.loops {
            points.extend(self.loop_points(edge_loop)?);
        }
        Ok(points)
    }

    /// Map every edge to the distinct faces whose loops use it.
    pub fn edge_faces(&self) -> HashMap<EdgeId, Vec<FaceId>> {
        let mut map: HashMap<EdgeId, Vec<FaceId>> = HashMap::new();
        for (face_id, face) in &self.faces {
            for le in face.loops.iter().flat_map(|l| &l.edges) {
                let faces = map.entry(le.edge).or_default();
                if !faces.contains(&face_id) {
                    faces.push(face_id);
                }
            }
        }
        map
    }

    /// Outward face normal near `p`.
    ///
    /// Uses the analytic surface normal where defined, otherwise the
    /// polygon normal of the face's outer loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its boundary entities are missing.
    pub fn face_normal_at(&self, id: FaceId, p: &Point3) -> Result<Option<Vec3>> {
        let face = self.face(id)?;
        if let Some(n) = face.surface.normal_at(p) {
            return Ok(Some(n * face.sense()));
        }
        let Some(outer) = face.loops.iter().find(|l| l.outer).or(face.loops.first()) else {
            return Ok(None);
        };
        let vector_area = newell(&self.loop_points(outer)?);
        Ok((vector_area.norm() > f64::EPSILON).then(|| vector_area.normalize()))
    }
}

fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    Point3::from((a.coords + b.coords) / 2.0)
}

/// Vector area of a closed polyline (Newell's method).
pub fn newell(points: &[Point3]) -> Vec3 {
    let mut n = Vec3::zeros();
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        n += p.coords.cross(&q.coords);
    }
    n / 2.0
}
