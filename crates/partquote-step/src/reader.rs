//! STEP file reader: converts parsed STEP data to a [`BRepModel`].

use std::collections::{HashMap, HashSet};
use std::path::Path;

use partquote_brep::{BRepModel, Edge, EdgeId, EdgeLoop, Face, LoopEdge, VertexId};
use tracing::debug;

use crate::entities::{
    detect_units, parse_curve, parse_edge_curve, parse_face, parse_loop, parse_oriented_edge,
    parse_shell, parse_solid_shells, parse_surface, parse_vertex_point, ShellRef, Units,
};
use crate::error::StepError;
use crate::parser::{Parser, StepFile};

/// Read a STEP file from a path.
///
/// Every solid in the file lands in one model, scaled to millimetres.
pub fn read_step(path: impl AsRef<Path>) -> Result<BRepModel, StepError> {
    let data = std::fs::read(path)?;
    read_step_from_buffer(&data)
}

/// Read a STEP file from a byte buffer.
pub fn read_step_from_buffer(data: &[u8]) -> Result<BRepModel, StepError> {
    let step_file = Parser::parse(data)?;
    debug!(
        schema = ?step_file.schema(),
        entities = step_file.entities.len(),
        "parsed STEP data section"
    );
    let mut reader = StepReader::new(&step_file);
    reader.read_all_shells()?;
    Ok(reader.finish())
}

/// Context for reading STEP files and building the model.
struct StepReader<'a> {
    file: &'a StepFile,
    units: Units,
    model: BRepModel,
    /// Maps STEP vertex ID to model VertexId.
    vertex_map: HashMap<u64, VertexId>,
    /// Maps STEP edge ID to model EdgeId, so faces share their edges.
    edge_map: HashMap<u64, EdgeId>,
}

impl<'a> StepReader<'a> {
    fn new(file: &'a StepFile) -> Self {
        Self {
            file,
            units: detect_units(file),
            model: BRepModel::new(),
            vertex_map: HashMap::new(),
            edge_map: HashMap::new(),
        }
    }

    /// Shells of every solid; surface models and loose shells if there are none.
    fn shell_refs(&self) -> Result<Vec<ShellRef>, StepError> {
        let mut solids = self.file.entities_of_type("MANIFOLD_SOLID_BREP");
        solids.extend(self.file.entities_of_type("BREP_WITH_VOIDS"));
        if solids.is_empty() {
            solids = self.file.entities_of_type("SHELL_BASED_SURFACE_MODEL");
        }

        let mut shells = Vec::new();
        for solid in solids {
            shells.extend(parse_solid_shells(self.file, solid.id)?);
        }
        if shells.is_empty() {
            let mut loose = self.file.entities_of_type("CLOSED_SHELL");
            loose.extend(self.file.entities_of_type("OPEN_SHELL"));
            shells.extend(loose.into_iter().map(|s| ShellRef {
                shell_id: s.id,
                reversed: false,
            }));
        }

        let mut seen = HashSet::new();
        shells.retain(|s| seen.insert(s.shell_id));
        if shells.is_empty() {
            return Err(StepError::NoSolids);
        }
        Ok(shells)
    }

    fn read_all_shells(&mut self) -> Result<(), StepError> {
        for shell in self.shell_refs()? {
            for face_id in parse_shell(self.file, shell.shell_id)? {
                self.read_face(face_id, shell.reversed)?;
            }
        }
        Ok(())
    }

    fn read_face(&mut self, face_id: u64, reversed: bool) -> Result<(), StepError> {
        let step_face = parse_face(self.file, face_id)?;
        let surface = parse_surface(self.file, step_face.surface_id, &self.units)?;

        let mut loops = Vec::with_capacity(step_face.bounds.len());
        for bound in &step_face.bounds {
            let Some(oriented_edges) = parse_loop(self.file, bound.loop_id)? else {
                continue;
            };
            let mut edges = Vec::with_capacity(oriented_edges.len());
            for oe_id in oriented_edges {
                let oe = parse_oriented_edge(self.file, oe_id)?;
                edges.push(LoopEdge {
                    edge: self.edge(oe.edge_id)?,
                    forward: oe.orientation,
                });
            }
            // A reversed bound, or a face of a reversed shell, runs the other way.
            if bound.orientation == reversed {
                edges.reverse();
                for le in &mut edges {
                    le.forward = !le.forward;
                }
            }
            loops.push(EdgeLoop {
                edges,
                outer: bound.is_outer,
            });
        }
        // Some exporters write FACE_BOUND for every loop.
        if !loops.iter().any(|l| l.outer) {
            if let Some(first) = loops.first_mut() {
                first.outer = true;
            }
        }

        self.model.add_face(Face {
            surface,
            loops,
            same_sense: step_face.same_sense != reversed,
        });
        Ok(())
    }

    fn edge(&mut self, step_id: u64) -> Result<EdgeId, StepError> {
        if let Some(&id) = self.edge_map.get(&step_id) {
            return Ok(id);
        }
        let step_edge = parse_edge_curve(self.file, step_id)?;
        let start = self.vertex(step_edge.start_vertex_id)?;
        let end = self.vertex(step_edge.end_vertex_id)?;
        let curve = parse_curve(self.file, step_edge.curve_id)?;
        let id = self.model.add_edge(Edge {
            start,
            end,
            curve,
            same_sense: step_edge.same_sense,
        });
        self.edge_map.insert(step_id, id);
        Ok(id)
    }

    fn vertex(&mut self, step_id: u64) -> Result<VertexId, StepError> {
        if let Some(&id) = self.vertex_map.get(&step_id) {
            return Ok(id);
        }
        let point = parse_vertex_point(self.file, step_id)?;
        let id = self.model.add_vertex(point);
        self.vertex_map.insert(step_id, id);
        Ok(id)
    }

    fn finish(mut self) -> BRepModel {
        if self.units.length_to_mm != 1.0 {
            self.model.scale(self.units.length_to_mm);
        }
        debug!(
            faces = self.model.num_faces(),
            edges = self.model.num_edges(),
            vertices = self.model.num_vertices(),
            mm_per_unit = self.units.length_to_mm,
            "built model from STEP"
        );
        self.model
    }
}
