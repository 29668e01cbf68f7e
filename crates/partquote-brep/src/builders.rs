//! Reference solids with exact, known mass properties.

use std::collections::HashMap;

use partquote_math::{Dir3, Point3, Vec3};

use crate::curve::{Circle3d, EdgeCurve};
use crate::model::{BRepModel, Edge, EdgeId, EdgeLoop, Face, LoopEdge, VertexId};
use crate::surface::{Frame, Surface};

/// Axis-aligned box with one corner at the origin, six planar faces
/// wound counter-clockwise seen from outside.
pub fn planar_box(size: [f64; 3]) -> BRepModel {
    let [sx, sy, sz] = size;
    let mut model = BRepModel::new();
    let corners = [
        (0.0, 0.0, 0.0),
        (sx, 0.0, 0.0),
        (sx, sy, 0.0),
        (0.0, sy, 0.0),
        (0.0, 0.0, sz),
        (sx, 0.0, sz),
        (sx, sy, sz),
        (0.0, sy, sz),
    ];
    let v: Vec<VertexId> = corners
        .iter()
        .map(|&(x, y, z)| model.add_vertex(Point3::new(x, y, z)))
        .collect();

    let quads: [([usize; 4], Vec3); 6] = [
        ([0, 3, 2, 1], -Vec3::z()),
        ([4, 5, 6, 7], Vec3::z()),
        ([0, 1, 5, 4], -Vec3::y()),
        ([1, 2, 6, 5], Vec3::x()),
        ([2, 3, 7, 6], Vec3::y()),
        ([3, 0, 4, 7], -Vec3::x()),
    ];

    let mut edges: HashMap<(usize, usize), EdgeId> = HashMap::new();
    for (quad, normal) in quads {
        let mut edge_loop = EdgeLoop {
            edges: Vec::with_capacity(4),
            outer: true,
        };
        for i in 0..4 {
            let (a, b) = (quad[i], quad[(i + 1) % 4]);
            let key = (a.min(b), a.max(b));
            let id = *edges.entry(key).or_insert_with(|| {
                model.add_edge(Edge {
                    start: v[key.0],
                    end: v[key.1],
                    curve: EdgeCurve::Line,
                    same_sense: true,
                })
            });
            edge_loop.edges.push(LoopEdge {
                edge: id,
                forward: a < b,
            });
        }
        let (x, y, z) = corners[quad[0]];
        model.add_face(Face {
            surface: Surface::Plane {
                origin: Point3::new(x, y, z),
                normal: Dir3::new_normalize(normal),
            },
            loops: vec![edge_loop],
            same_sense: true,
        });
    }
    model
}

/// Closed cylinder standing on the XY plane along +Z: two discs and a
/// lateral face bounded by two circles and a seam.
pub fn cylinder(radius: f64, height: f64) -> BRepModel {
    let mut model = BRepModel::new();
    let z = Dir3::new_normalize(Vec3::z());
    let bottom = model.add_vertex(Point3::new(radius, 0.0, 0.0));
    let top = model.add_vertex(Point3::new(radius, 0.0, height));

    let circle = |center: Point3| {
        EdgeCurve::Circle(Circle3d::new(center, radius, z, Some(&Vec3::x())))
    };
    let bottom_circle = model.add_edge(Edge {
        start: bottom,
        end: bottom,
        curve: circle(Point3::origin()),
        same_sense: true,
    });
    let top_circle = model.add_edge(Edge {
        start: top,
        end: top,
        curve: circle(Point3::new(0.0, 0.0, height)),
        same_sense: true,
    });
    let seam = model.add_edge(Edge {
        start: bottom,
        end: top,
        curve: EdgeCurve::Line,
        same_sense: true,
    });

    let single = |edge: EdgeId, forward: bool| EdgeLoop {
        edges: vec![LoopEdge { edge, forward }],
        outer: true,
    };
    model.add_face(Face {
        surface: Surface::Plane {
            origin: Point3::origin(),
            normal: Dir3::new_normalize(-Vec3::z()),
        },
        loops: vec![single(bottom_circle, false)],
        same_sense: true,
    });
    model.add_face(Face {
        surface: Surface::Plane {
            origin: Point3::new(0.0, 0.0, height),
            normal: z,
        },
        loops: vec![single(top_circle, true)],
        same_sense: true,
    });
    model.add_face(Face {
        surface: Surface::Cylinder {
            frame: Frame::new(Point3::origin(), z, Some(&Vec3::x())),
            radius,
        },
        loops: vec![EdgeLoop {
            edges: vec![
                LoopEdge {
                    edge: bottom_circle,
                    forward: true,
                },
                LoopEdge {
                    edge: seam,
                    forward: true,
                },
                LoopEdge {
                    edge: top_circle,
                    forward: false,
                },
                LoopEdge {
                    edge: seam,
                    forward: false,
                },
            ],
            outer: true,
        }],
        same_sense: true,
    });
    model
}

/// Full sphere: one face without boundary.
pub fn sphere(center: Point3, radius: f64) -> BRepModel {
    let mut model = BRepModel::new();
    model.add_face(Face {
        surface: Surface::Sphere {
            frame: Frame::new(center, Dir3::new_normalize(Vec3::z()), Some(&Vec3::x())),
            radius,
        },
        loops: Vec::new(),
        same_sense: true,
    });
    model
}
