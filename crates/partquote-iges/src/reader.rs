//! IGES reader: converts wireframe entities to an edge-only [`BRepModel`].

use std::collections::HashMap;
use std::path::Path;

use partquote_brep::{BRepModel, Circle3d, Edge, EdgeCurve, VertexId};
use partquote_math::{Dir3, Point3, Vec3};
use tracing::debug;

use crate::directory::{entity_type, parse_directory, DirectoryEntry};
use crate::error::IgesError;
use crate::params::{split_params, GlobalParams, Param};
use crate::record::Sections;

/// Vertices closer than this, in file units, are merged.
const VERTEX_QUANTUM: f64 = 1e-6;

/// Read an IGES file from a path.
///
/// Lines, circular arcs, points and B-spline curves become vertices and
/// edges scaled to millimetres. The model has no faces.
pub fn read_iges(path: impl AsRef<Path>) -> Result<BRepModel, IgesError> {
    let data = std::fs::read(path)?;
    read_iges_from_buffer(&data)
}

/// Read an IGES file from a byte buffer.
pub fn read_iges_from_buffer(data: &[u8]) -> Result<BRepModel, IgesError> {
    let sections = Sections::split(data)?;
    let global = GlobalParams::parse(&sections.global).map_err(IgesError::InvalidGlobal)?;
    let directory = parse_directory(&sections.directory)?;
    debug!(
        product = ?global.product_id,
        entities = directory.len(),
        mm_per_unit = global.mm_per_unit,
        "parsed IGES directory"
    );

    let mut reader = IgesReader::new(&global, &sections.parameter);
    for entry in &directory {
        reader.read_entity(entry)?;
    }
    reader.finish()
}

#[derive(Debug, Default)]
struct EntityCounts {
    lines: usize,
    arcs: usize,
    points: usize,
    splines: usize,
    skipped: usize,
}

struct IgesReader<'a> {
    global: &'a GlobalParams,
    parameter: &'a [String],
    model: BRepModel,
    /// Quantized coordinates to vertex, so touching curves share vertices.
    vertex_map: HashMap<[i64; 3], VertexId>,
    counts: EntityCounts,
}

impl<'a> IgesReader<'a> {
    fn new(global: &'a GlobalParams, parameter: &'a [String]) -> Self {
        Self {
            global,
            parameter,
            model: BRepModel::new(),
            vertex_map: HashMap::new(),
            counts: EntityCounts::default(),
        }
    }

    fn read_entity(&mut self, entry: &DirectoryEntry) -> Result<(), IgesError> {
        match entry.entity_type {
            entity_type::LINE => {
                let p = self.params(entry)?;
                let start = point(entry, &p, 1)?;
                let end = point(entry, &p, 4)?;
                self.add_edge(start, end, EdgeCurve::Line);
                self.counts.lines += 1;
            }
            entity_type::CIRCULAR_ARC => {
                let p = self.params(entry)?;
                self.read_arc(entry, &p)?;
                self.counts.arcs += 1;
            }
            entity_type::POINT => {
                let p = self.params(entry)?;
                self.vertex(point(entry, &p, 1)?);
                self.counts.points += 1;
            }
            entity_type::RATIONAL_BSPLINE_CURVE => {
                let p = self.params(entry)?;
                self.read_bspline(entry, &p)?;
                self.counts.splines += 1;
            }
            _ => {
                debug!(
                    entity_type = entry.entity_type,
                    form = entry.form,
                    sequence = entry.sequence,
                    "skipping unsupported IGES entity"
                );
                self.counts.skipped += 1;
            }
        }
        if entry.transform != 0 {
            debug!(sequence = entry.sequence, "transformation matrix not applied");
        }
        Ok(())
    }

    /// Parameters of an entry, checked to start with its entity type.
    fn params(&self, entry: &DirectoryEntry) -> Result<Vec<Param>, IgesError> {
        let first = entry.parameter_pointer.checked_sub(1).ok_or_else(|| {
            IgesError::parameter(entry.sequence, "parameter pointer is zero")
        })?;
        let count = entry.parameter_lines.max(1);
        let lines = self.parameter.get(first..first + count).ok_or_else(|| {
            IgesError::parameter(
                entry.sequence,
                format!("parameter lines {}..{} out of range", first + 1, first + count),
            )
        })?;
        let params = split_params(&lines.concat(), self.global.delimiter, self.global.record)
            .map_err(|message| IgesError::parameter(entry.sequence, message))?;

        if params.first().and_then(Param::as_int) != Some(entry.entity_type) {
            return Err(IgesError::parameter(
                entry.sequence,
                format!("parameter data is not entity {}", entry.entity_type),
            ));
        }
        Ok(params)
    }

    /// Arc in the plane z = ZT, counter-clockwise from start to end.
    fn read_arc(&mut self, entry: &DirectoryEntry, p: &[Param]) -> Result<(), IgesError> {
        let zt = real(entry, p, 1)?;
        let center = Point3::new(real(entry, p, 2)?, real(entry, p, 3)?, zt);
        let start = Point3::new(real(entry, p, 4)?, real(entry, p, 5)?, zt);
        let end = Point3::new(real(entry, p, 6)?, real(entry, p, 7)?, zt);

        let radius = (start - center).norm();
        if radius < VERTEX_QUANTUM {
            return Err(IgesError::parameter(entry.sequence, "arc has zero radius"));
        }
        let circle = Circle3d::new(center, radius, Dir3::new_unchecked(Vec3::z()), Some(&(start - center)));
        self.add_edge(start, end, EdgeCurve::Circle(circle));
        Ok(())
    }

    /// B-spline curve kept as its control polygon.
    fn read_bspline(&mut self, entry: &DirectoryEntry, p: &[Param]) -> Result<(), IgesError> {
        let k = int(entry, p, 1)?;
        let m = int(entry, p, 2)?;
        if k < 1 || m < 1 {
            return Err(IgesError::parameter(
                entry.sequence,
                format!("invalid B-spline indices K={k} M={m}"),
            ));
        }
        let (k, m) = (k as usize, m as usize);
        // 126, K, M, PROP1-4, knots (K+M+2), weights (K+1), control points.
        let first_point = 7 + (k + m + 2) + (k + 1);
        let control_points = (0..=k)
            .map(|i| point(entry, p, first_point + 3 * i))
            .collect::<Result<Vec<_>, _>>()?;

        let (Some(&start), Some(&end)) = (control_points.first(), control_points.last()) else {
            return Ok(());
        };
        self.add_edge(start, end, EdgeCurve::BSpline { control_points });
        Ok(())
    }

    fn add_edge(&mut self, start: Point3, end: Point3, curve: EdgeCurve) {
        let start = self.vertex(start);
        let end = self.vertex(end);
        if start == end && matches!(curve, EdgeCurve::Line) {
            debug!("skipping zero-length line");
            return;
        }
        self.model.add_edge(Edge {
            start,
            end,
            curve,
            same_sense: true,
        });
    }

    fn vertex(&mut self, p: Point3) -> VertexId {
        let key = [p.x, p.y, p.z].map(|c| (c / VERTEX_QUANTUM).round() as i64);
        if let Some(&id) = self.vertex_map.get(&key) {
            return id;
        }
        let id = self.model.add_vertex(p);
        self.vertex_map.insert(key, id);
        id
    }

    fn finish(mut self) -> Result<BRepModel, IgesError> {
        let counts = &self.counts;
        debug!(
            lines = counts.lines,
            arcs = counts.arcs,
            points = counts.points,
            splines = counts.splines,
            skipped = counts.skipped,
            "read IGES entities"
        );
        if self.model.num_vertices() == 0 {
            return Err(IgesError::NoGeometry);
        }
        if self.global.mm_per_unit != 1.0 {
            self.model.scale(self.global.mm_per_unit);
        }
        Ok(self.model)
    }
}

fn real(entry: &DirectoryEntry, p: &[Param], index: usize) -> Result<f64, IgesError> {
    p.get(index).and_then(Param::as_real).ok_or_else(|| {
        IgesError::parameter(entry.sequence, format!("parameter {index} is not a real"))
    })
}

fn int(entry: &DirectoryEntry, p: &[Param], index: usize) -> Result<i64, IgesError> {
    p.get(index).and_then(Param::as_int).ok_or_else(|| {
        IgesError::parameter(entry.sequence, format!("parameter {index} is not an integer"))
    })
}

fn point(entry: &DirectoryEntry, p: &[Param], index: usize) -> Result<Point3, IgesError> {
    Ok(Point3::new(
        real(entry, p, index)?,
        real(entry, p, index + 1)?,
        real(entry, p, index + 2)?,
    ))
}
