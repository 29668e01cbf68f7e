#![warn(missing_docs)]

//! Lightweight boundary representation for feature extraction.
//!
//! A [`BRepModel`] owns vertices, edges and faces in slotmap arenas. Edges
//! carry a tagged [`EdgeCurve`] (line, circle, ellipse, B-spline) and faces
//! an analytic [`Surface`]. The model answers the questions manufacturing
//! estimation asks: which faces meet at an edge, what the outward normal is
//! there, how large the part is and how much material it encloses.
//!
//! This is not a modelling kernel: there are no booleans, no trimming and
//! no exact surface evaluation beyond the analytic types.

mod builders;
mod curve;
mod error;
mod mass;
mod model;
mod surface;

pub use builders::{cylinder, planar_box, sphere};
pub use curve::{Circle3d, EdgeCurve, Ellipse3d, SEGMENTS_PER_TURN};
pub use error::{BRepError, Result};
pub use mass::{FaceIntegral, Patch};
pub use model::{
    newell, BRepModel, Edge, EdgeId, EdgeLoop, Face, FaceId, LoopEdge, Vertex, VertexId,
};
pub use surface::{Frame, Surface};
