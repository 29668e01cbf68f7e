//! Topology instances: vertices, edges, loops, faces, shells and solids.
//!
//! Each reader returns ids of the instances it references; [`crate::reader`]
//! walks them and builds the model.

use partquote_math::Point3;

use super::{parse_cartesian_point, EntityArgs};
use crate::error::StepError;
use crate::parser::{StepEntity, StepFile};

/// EDGE_CURVE(name, edge_start, edge_end, edge_geometry, same_sense)
#[derive(Debug, Clone)]
pub struct StepEdge {
    /// VERTEX_POINT at the start.
    pub start_vertex_id: u64,
    /// VERTEX_POINT at the end.
    pub end_vertex_id: u64,
    /// Underlying curve.
    pub curve_id: u64,
    /// False when the curve runs end to start.
    pub same_sense: bool,
}

/// ORIENTED_EDGE(name, *, *, edge_element, orientation)
#[derive(Debug, Clone)]
pub struct StepOrientedEdge {
    /// The EDGE_CURVE used.
    pub edge_id: u64,
    /// False when the loop traverses the edge backwards.
    pub orientation: bool,
}

/// FACE_BOUND or FACE_OUTER_BOUND(name, bound, orientation)
#[derive(Debug, Clone)]
pub struct StepFaceBound {
    /// EDGE_LOOP or VERTEX_LOOP.
    pub loop_id: u64,
    pub orientation: bool,
    /// Written as FACE_OUTER_BOUND.
    pub is_outer: bool,
}

/// ADVANCED_FACE or FACE_SURFACE(name, bounds, face_geometry, same_sense)
#[derive(Debug, Clone)]
pub struct StepFace {
    pub bounds: Vec<StepFaceBound>,
    pub surface_id: u64,
    /// False when the face normal opposes the surface normal.
    pub same_sense: bool,
}

/// A shell as used by a solid. Voids are reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellRef {
    /// CLOSED_SHELL or OPEN_SHELL.
    pub shell_id: u64,
    /// Every face of the shell is flipped.
    pub reversed: bool,
}

/// Resolve `id` and check its type is one of `accepted`; the first entry
/// names the expected type in the error.
fn instance<'f>(file: &'f StepFile, id: u64, accepted: &[&'static str]) -> Result<&'f StepEntity, StepError> {
    let entity = file.require(id)?;
    if accepted.contains(&entity.type_name.as_str()) {
        Ok(entity)
    } else {
        Err(StepError::unexpected(accepted[0], entity.type_name.as_str()))
    }
}

/// Location of a VERTEX_POINT.
pub fn parse_vertex_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let vertex = instance(file, id, &["VERTEX_POINT"])?;
    parse_cartesian_point(file, vertex.entity_ref(1)?)
}

pub fn parse_edge_curve(file: &StepFile, id: u64) -> Result<StepEdge, StepError> {
    let edge = instance(file, id, &["EDGE_CURVE"])?;
    Ok(StepEdge {
        start_vertex_id: edge.entity_ref(1)?,
        end_vertex_id: edge.entity_ref(2)?,
        curve_id: edge.entity_ref(3)?,
        same_sense: edge.boolean(4)?,
    })
}

pub fn parse_oriented_edge(file: &StepFile, id: u64) -> Result<StepOrientedEdge, StepError> {
    let oriented = instance(file, id, &["ORIENTED_EDGE"])?;
    Ok(StepOrientedEdge {
        edge_id: oriented.entity_ref(3)?,
        orientation: oriented.boolean(4)?,
    })
}

/// ORIENTED_EDGE ids of an EDGE_LOOP, or `None` for a VERTEX_LOOP (cone
/// apex, sphere pole).
pub fn parse_loop(file: &StepFile, id: u64) -> Result<Option<Vec<u64>>, StepError> {
    let bound = instance(file, id, &["EDGE_LOOP", "VERTEX_LOOP"])?;
    if bound.type_name == "VERTEX_LOOP" {
        return Ok(None);
    }
    bound.entity_ref_list(1).map(Some)
}

pub fn parse_face_bound(file: &StepFile, id: u64) -> Result<StepFaceBound, StepError> {
    let bound = instance(file, id, &["FACE_BOUND", "FACE_OUTER_BOUND"])?;
    Ok(StepFaceBound {
        loop_id: bound.entity_ref(1)?,
        orientation: bound.boolean(2)?,
        is_outer: bound.type_name == "FACE_OUTER_BOUND",
    })
}

/// Any other face type is [`StepError::UnsupportedFace`].
pub fn parse_face(file: &StepFile, id: u64) -> Result<StepFace, StepError> {
    let face = file.require(id)?;
    if !matches!(face.type_name.as_str(), "ADVANCED_FACE" | "FACE_SURFACE") {
        return Err(StepError::UnsupportedFace(face.type_name.clone()));
    }
    let mut bounds = Vec::new();
    for bound in face.entity_ref_list(1)? {
        bounds.push(parse_face_bound(file, bound)?);
    }
    Ok(StepFace {
        bounds,
        surface_id: face.entity_ref(2)?,
        same_sense: face.boolean(3)?,
    })
}

/// Face ids of a CLOSED_SHELL or OPEN_SHELL.
pub fn parse_shell(file: &StepFile, id: u64) -> Result<Vec<u64>, StepError> {
    instance(file, id, &["CLOSED_SHELL", "OPEN_SHELL"])?.entity_ref_list(1)
}

/// Follow ORIENTED_*_SHELL wrappers down to the plain shell, flipping
/// `reversed` for each `.F.` along the way.
pub fn parse_shell_ref(file: &StepFile, id: u64) -> Result<ShellRef, StepError> {
    let mut reversed = false;
    let mut current = id;
    // Wrappers are never legitimately nested more than once or twice.
    for _ in 0..8 {
        let shell = instance(
            file,
            current,
            &["CLOSED_SHELL", "OPEN_SHELL", "ORIENTED_CLOSED_SHELL", "ORIENTED_OPEN_SHELL"],
        )?;
        if !shell.type_name.starts_with("ORIENTED_") {
            return Ok(ShellRef {
                shell_id: current,
                reversed,
            });
        }
        // (name, *, shell_element, orientation)
        reversed ^= !shell.boolean(3)?;
        current = shell.entity_ref(2)?;
    }
    Err(StepError::InvalidTopology(format!("shell #{id} wraps itself")))
}

/// Shells of a MANIFOLD_SOLID_BREP (outer), BREP_WITH_VOIDS (outer then
/// voids) or SHELL_BASED_SURFACE_MODEL (all listed).
pub fn parse_solid_shells(file: &StepFile, id: u64) -> Result<Vec<ShellRef>, StepError> {
    let solid = instance(
        file,
        id,
        &["MANIFOLD_SOLID_BREP", "BREP_WITH_VOIDS", "SHELL_BASED_SURFACE_MODEL"],
    )?;
    let shell_ids = match solid.type_name.as_str() {
        "MANIFOLD_SOLID_BREP" => vec![solid.entity_ref(1)?],
        "BREP_WITH_VOIDS" => {
            let mut ids = vec![solid.entity_ref(1)?];
            ids.extend(solid.entity_ref_list(2)?);
            ids
        }
        _ => solid.entity_ref_list(1)?,
    };
    shell_ids
        .into_iter()
        .map(|shell| parse_shell_ref(file, shell))
        .collect()
}
