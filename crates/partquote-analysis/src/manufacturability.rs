//! Manufacturability: fillet radius, tool diameter, edge counts, difficulty.

use partquote_brep::BRepModel;
use partquote_math::angle_between;
use partquote_mesh::TriangleMesh;
use tracing::debug;

use crate::model::ModelHandle;
use crate::record::FeatureRecord;

/// Dihedral angle above which an edge counts as sharp, degrees.
pub const SHARP_EDGE_ANGLE_DEG: f64 = 80.0;

/// Default vertex weld tolerance for triangle soups, mm.
pub const DEFAULT_WELD_TOLERANCE_MM: f64 = 1e-6;

/// Edges per estimated hole.
const EDGES_PER_HOLE: u32 = 100;
/// Curved faces per estimated undercut.
const CURVED_FACES_PER_UNDERCUT: u32 = 5;

/// Extend `base` with manufacturability features of `handle`.
///
/// Uses [`DEFAULT_WELD_TOLERANCE_MM`] for meshes.
pub fn estimate(handle: &ModelHandle, base: &FeatureRecord) -> FeatureRecord {
    estimate_welded(handle, base, DEFAULT_WELD_TOLERANCE_MM)
}

/// Like [`estimate`], welding mesh vertices closer than `weld_tolerance_mm`.
pub fn estimate_welded(
    handle: &ModelHandle,
    base: &FeatureRecord,
    weld_tolerance_mm: f64,
) -> FeatureRecord {
    let mut record = base.clone();
    match handle {
        ModelHandle::Solid(model) => estimate_solid(model, &mut record),
        ModelHandle::Mesh(mesh) => estimate_mesh(mesh, weld_tolerance_mm, &mut record),
    }
    record.set_machining_difficulty(Some(machining_difficulty(&record)));
    record
}

/// Composite machining difficulty in `[1, 5]`.
///
/// Starts at 1 and adds for long thin parts, for complexity above 1 and
/// for small corner radii. Absent features add nothing, so an empty record
/// scores 1.
pub fn machining_difficulty(record: &FeatureRecord) -> f64 {
    let mut difficulty = 1.0;
    if let Some(ratio) = record.max_aspect_ratio {
        if ratio > 10.0 {
            difficulty += 1.0;
        } else if ratio > 5.0 {
            difficulty += 0.5;
        }
    }
    if let Some(complexity) = record.complexity_score {
        difficulty += 0.5 * (complexity - 1.0);
    }
    if let Some(radius) = record.min_corner_radius_mm() {
        if radius < 0.2 {
            difficulty += 1.0;
        } else if radius < 0.5 {
            difficulty += 0.5;
        }
    }
    difficulty.clamp(1.0, 5.0)
}

fn estimate_solid(model: &BRepModel, record: &mut FeatureRecord) {
    let threshold = SHARP_EDGE_ANGLE_DEG.to_radians();
    let edge_faces = model.edge_faces();
    let mut min_radius: Option<f64> = None;
    let mut sharp = 0u32;

    for (id, edge) in model.edges() {
        if let Some(radius) = edge.curve.radius() {
            if radius > 0.0 {
                min_radius = Some(min_radius.map_or(radius, |r| r.min(radius)));
            }
            continue;
        }
        let Some(&[f0, f1]) = edge_faces.get(&id).map(Vec::as_slice) else {
            continue;
        };
        let dihedral = model.edge_midpoint(id).and_then(|mid| {
            let n0 = model.face_normal_at(f0, &mid)?;
            let n1 = model.face_normal_at(f1, &mid)?;
            Ok(n0.zip(n1).and_then(|(a, b)| angle_between(&a, &b)))
        });
        match dihedral {
            Ok(Some(angle)) if angle > threshold => sharp += 1,
            Ok(_) => {}
            Err(err) => debug!(%err, "skipping edge without dihedral angle"),
        }
    }

    let curved = model.faces().filter(|(_, f)| !f.surface.is_planar()).count() as u32;
    let edges = model.num_edges() as u32;

    record.set_corner_radius(min_radius);
    record.curved_surface_count = Some(curved);
    record.sharp_edge_count = Some(sharp);
    record.hole_count = Some(edges / EDGES_PER_HOLE);
    record.undercut_count = Some(curved / CURVED_FACES_PER_UNDERCUT);
    debug!(
        min_radius = ?min_radius,
        sharp,
        curved,
        edges,
        "classified solid edges"
    );
}

fn estimate_mesh(mesh: &TriangleMesh, weld_tolerance_mm: f64, record: &mut FeatureRecord) {
    if mesh.is_empty() {
        return;
    }
    let welded = mesh.weld(weld_tolerance_mm);
    let sharp = welded.sharp_edge_count(SHARP_EDGE_ANGLE_DEG.to_radians());
    record.sharp_edge_count = Some(sharp as u32);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use partquote_brep::{cylinder, planar_box};
    use partquote_math::Point3;
    use partquote_mesh::cube;

    use crate::features::extract;

    fn analyze(handle: ModelHandle) -> FeatureRecord {
        let base = extract(&handle);
        estimate(&handle, &base)
    }

    #[test]
    fn test_empty_record_difficulty_is_one() {
        assert_eq!(machining_difficulty(&FeatureRecord::empty()), 1.0);
    }

    #[test]
    fn test_difficulty_rules() {
        let mut record = FeatureRecord::empty();
        record.max_aspect_ratio = Some(12.0);
        record.complexity_score = Some(3.0);
        record.set_corner_radius(Some(0.1));
        // 1 + 1 + 1 + 1
        assert_eq!(machining_difficulty(&record), 4.0);

        record.max_aspect_ratio = Some(6.0);
        record.set_corner_radius(Some(0.3));
        // 1 + 0.5 + 1 + 0.5
        assert_eq!(machining_difficulty(&record), 3.0);

        record.complexity_score = Some(5.0);
        record.max_aspect_ratio = Some(20.0);
        record.set_corner_radius(Some(0.01));
        assert_eq!(machining_difficulty(&record), 5.0);

        let mut low = FeatureRecord::empty();
        low.complexity_score = Some(0.0);
        assert_eq!(machining_difficulty(&low), 1.0);
    }

    #[test]
    fn test_difficulty_in_range_for_many_records() {
        for ratio in [None, Some(1.0), Some(5.5), Some(50.0)] {
            for complexity in [None, Some(1.0), Some(3.0), Some(5.0)] {
                for radius in [None, Some(0.05), Some(0.4), Some(3.0)] {
                    let mut record = FeatureRecord::empty();
                    record.max_aspect_ratio = ratio;
                    record.complexity_score = complexity;
                    record.set_corner_radius(radius);
                    let d = machining_difficulty(&record);
                    assert!((1.0..=5.0).contains(&d));
                }
            }
        }
    }

    #[test]
    fn test_box_has_twelve_sharp_edges_and_no_radius() {
        let record = analyze(ModelHandle::Solid(planar_box([10.0, 10.0, 10.0])));
        assert_eq!(record.sharp_edge_count, Some(12));
        assert_eq!(record.curved_surface_count, Some(0));
        assert_eq!(record.hole_count, Some(0));
        assert_eq!(record.undercut_count, Some(0));
        assert_eq!(record.min_corner_radius_mm(), None);
        assert_eq!(record.min_tool_diameter_mm(), None);
        assert_eq!(record.machining_difficulty(), Some(1.0));
    }

    #[test]
    fn test_cylinder_fillet_radius() {
        let record = analyze(ModelHandle::Solid(cylinder(0.3, 1.0)));
        assert_relative_eq!(record.min_corner_radius_mm().unwrap(), 0.3);
        assert_relative_eq!(record.min_tool_diameter_mm().unwrap(), 0.6);
        assert_eq!(record.curved_surface_count, Some(1));
        // The seam joins the lateral face to itself.
        assert_eq!(record.sharp_edge_count, Some(0));
        // complexity 1 (3 faces), radius 0.3 adds 0.5.
        assert_eq!(record.machining_difficulty(), Some(1.5));
    }

    #[test]
    fn test_mesh_cube_sharp_edges() {
        let record = analyze(ModelHandle::Mesh(cube(Point3::origin(), 10.0)));
        // Cube edges are sharp; face diagonals are flat.
        assert_eq!(record.sharp_edge_count, Some(12));
        assert_eq!(record.min_corner_radius_mm(), None);
        assert_eq!(record.curved_surface_count, None);
        assert_eq!(record.hole_count, None);
        assert_eq!(record.machining_difficulty(), Some(1.0));
    }

    #[test]
    fn test_mesh_soup_is_welded_before_counting() {
        let mesh = cube(Point3::origin(), 10.0);
        let soup: Vec<[Point3; 3]> = mesh.triangles().collect();
        let record = analyze(ModelHandle::Mesh(TriangleMesh::from_triangles(&soup)));
        assert_eq!(record.sharp_edge_count, Some(12));
    }

    #[test]
    fn test_base_fields_are_kept() {
        let handle = ModelHandle::Solid(planar_box([1.0, 1.0, 1.0]));
        let mut base = FeatureRecord::empty();
        base.volume_cm3 = Some(42.0);
        assert_eq!(estimate(&handle, &base).volume_cm3, Some(42.0));
    }
}
