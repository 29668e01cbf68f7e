//! Geometric features: volume, area, bounding box, aspect ratio, complexity.

use partquote_brep::BRepModel;
use partquote_math::Aabb3;
use partquote_mesh::TriangleMesh;
use tracing::debug;

use crate::error::ComputationFailure;
use crate::model::ModelHandle;
use crate::record::FeatureRecord;

const MM3_PER_CM3: f64 = 1000.0;
const MM2_PER_CM2: f64 = 100.0;

/// Complexity of a solid that cannot enumerate its faces.
pub const DEFAULT_SOLID_COMPLEXITY: f64 = 3.0;

/// Upper bounds (exclusive) of complexity buckets 1 to 4; larger counts are 5.
const COMPLEXITY_BUCKETS: [usize; 4] = [1_000, 5_000, 20_000, 100_000];

/// Complexity score 1 to 5 from a triangle or face count.
pub fn complexity_bucket(count: usize) -> f64 {
    let bucket = COMPLEXITY_BUCKETS
        .iter()
        .position(|&limit| count < limit)
        .unwrap_or(COMPLEXITY_BUCKETS.len());
    (bucket + 1) as f64
}

/// Largest ratio between two bounding box dimensions, always at least 1.
///
/// Fails when a dimension is zero (a flat or degenerate part).
pub fn aspect_ratio(dims: [f64; 3]) -> Result<f64, ComputationFailure> {
    if dims.iter().any(|d| !d.is_finite()) {
        return Err(ComputationFailure::new("max_aspect_ratio", "non-finite dimension"));
    }
    let largest = dims.iter().copied().fold(f64::MIN, f64::max);
    let smallest = dims.iter().copied().fold(f64::MAX, f64::min);
    if smallest <= 0.0 {
        return Err(ComputationFailure::new(
            "max_aspect_ratio",
            format!("zero dimension in {dims:?}"),
        ));
    }
    Ok(largest / smallest)
}

/// Measure the geometric features of a loaded model.
pub fn extract(handle: &ModelHandle) -> FeatureRecord {
    match handle {
        ModelHandle::Mesh(mesh) => extract_mesh(mesh),
        ModelHandle::Solid(model) => extract_solid(model),
    }
}

fn extract_mesh(mesh: &TriangleMesh) -> FeatureRecord {
    let mut record = FeatureRecord::empty();
    if mesh.is_empty() {
        return record;
    }
    match mesh.volume() {
        Some(v) => record.volume_cm3 = Some(v / MM3_PER_CM3),
        None => log_failure(&ComputationFailure::new("volume_cm3", "non-finite vertex")),
    }
    record.surface_area_cm2 = Some(mesh.surface_area() / MM2_PER_CM2);
    set_bounding_box(&mut record, mesh.bounding_box());
    record.complexity_score = Some(complexity_bucket(mesh.num_triangles()));
    record
}

fn extract_solid(model: &BRepModel) -> FeatureRecord {
    let mut record = FeatureRecord::empty();
    if model.is_empty() {
        return record;
    }

    match model.volume() {
        Some(v) => record.volume_cm3 = Some(v / MM3_PER_CM3),
        None => log_failure(&ComputationFailure::new(
            "volume_cm3",
            "a face cannot be integrated or the model has no faces",
        )),
    }
    record.surface_area_cm2 = model.surface_area().map(|a| a / MM2_PER_CM2);
    set_bounding_box(&mut record, model.bounding_box());

    record.complexity_score = Some(if model.num_faces() > 0 {
        complexity_bucket(model.num_faces())
    } else {
        DEFAULT_SOLID_COMPLEXITY
    });
    record
}

fn set_bounding_box(record: &mut FeatureRecord, bbox: Option<Aabb3>) {
    let Some(bbox) = bbox else {
        log_failure(&ComputationFailure::new("bbox", "no points"));
        return;
    };
    let size = bbox.size();
    record.bbox_length_mm = Some(size.x);
    record.bbox_width_mm = Some(size.y);
    record.bbox_height_mm = Some(size.z);
    match aspect_ratio([size.x, size.y, size.z]) {
        Ok(ratio) => record.max_aspect_ratio = Some(ratio),
        Err(failure) => log_failure(&failure),
    }
}

pub(crate) fn log_failure(failure: &ComputationFailure) {
    debug!(field = failure.field, reason = %failure.reason, "feature left absent");
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use partquote_math::Point3;
    use partquote_mesh::cube;

    #[test]
    fn test_complexity_buckets() {
        assert_eq!(complexity_bucket(0), 1.0);
        assert_eq!(complexity_bucket(999), 1.0);
        assert_eq!(complexity_bucket(1_000), 2.0);
        assert_eq!(complexity_bucket(4_999), 2.0);
        assert_eq!(complexity_bucket(5_000), 3.0);
        assert_eq!(complexity_bucket(19_999), 3.0);
        assert_eq!(complexity_bucket(20_000), 4.0);
        assert_eq!(complexity_bucket(99_999), 4.0);
        assert_eq!(complexity_bucket(100_000), 5.0);
        assert_eq!(complexity_bucket(5_000_000), 5.0);
    }

    #[test]
    fn test_aspect_ratio_at_least_one() {
        for dims in [[10.0, 10.0, 10.0], [1.0, 50.0, 5.0], [3.0, 2.0, 1.0], [0.1, 0.1, 7.0]] {
            let ratio = aspect_ratio(dims).unwrap();
            assert!(ratio >= 1.0, "{dims:?} gave {ratio}");
        }
        assert_relative_eq!(aspect_ratio([2.0, 10.0, 5.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_aspect_ratio_zero_dimension() {
        let err = aspect_ratio([10.0, 0.0, 5.0]).unwrap_err();
        assert_eq!(err.field, "max_aspect_ratio");
        assert!(aspect_ratio([f64::NAN, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_cube_mesh_scenario() {
        let mesh = cube(Point3::origin(), 10.0);
        assert_eq!(mesh.num_triangles(), 12);
        let record = extract(&ModelHandle::Mesh(mesh));
        assert_relative_eq!(record.volume_cm3.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(record.surface_area_cm2.unwrap(), 6.0, epsilon = 1e-12);
        assert_eq!(record.bbox_length_mm, Some(10.0));
        assert_eq!(record.bbox_width_mm, Some(10.0));
        assert_eq!(record.bbox_height_mm, Some(10.0));
        assert_eq!(record.max_aspect_ratio, Some(1.0));
        assert_eq!(record.complexity_score, Some(1.0));
    }

    #[test]
    fn test_inverted_mesh_volume_clamps() {
        let mesh = cube(Point3::origin(), 10.0);
        let inverted: Vec<[Point3; 3]> = mesh.triangles().map(|[a, b, c]| [a, c, b]).collect();
        let record = extract(&ModelHandle::Mesh(TriangleMesh::from_triangles(&inverted)));
        assert_eq!(record.volume_cm3, Some(0.0));
        assert!(record.surface_area_cm2.unwrap() > 0.0);
    }

    #[test]
    fn test_nan_vertex_leaves_volume_absent() {
        let mut mesh = cube(Point3::origin(), 10.0);
        mesh.vertices[3] = Point3::new(0.0, f64::NAN, 0.0);
        let record = extract(&ModelHandle::Mesh(mesh));
        assert_eq!(record.volume_cm3, None);
        assert_eq!(record.complexity_score, Some(1.0));
    }

    #[test]
    fn test_flat_mesh_has_no_aspect_ratio() {
        let flat = TriangleMesh::from_triangles(&[[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ]]);
        let record = extract(&ModelHandle::Mesh(flat));
        assert_eq!(record.bbox_height_mm, Some(0.0));
        assert_eq!(record.max_aspect_ratio, None);
        assert_relative_eq!(record.surface_area_cm2.unwrap(), 0.04);
    }

    #[test]
    fn test_empty_mesh_empty_record() {
        assert!(extract(&ModelHandle::Mesh(TriangleMesh::new())).is_empty());
        assert!(extract(&ModelHandle::Solid(BRepModel::new())).is_empty());
    }

    #[test]
    fn test_solid_box() {
        let record = extract(&ModelHandle::Solid(partquote_brep::planar_box([10.0, 20.0, 40.0])));
        assert_relative_eq!(record.volume_cm3.unwrap(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(record.surface_area_cm2.unwrap(), 28.0, epsilon = 1e-9);
        assert_relative_eq!(record.max_aspect_ratio.unwrap(), 4.0, epsilon = 1e-12);
        assert_eq!(record.complexity_score, Some(1.0));
    }

    #[test]
    fn test_wireframe_solid_uses_default_complexity() {
        let mut model = BRepModel::new();
        let a = model.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(10.0, 5.0, 2.0));
        model.add_edge(partquote_brep::Edge {
            start: a,
            end: b,
            curve: partquote_brep::EdgeCurve::Line,
            same_sense: true,
        });
        let record = extract(&ModelHandle::Solid(model));
        assert_eq!(record.complexity_score, Some(DEFAULT_SOLID_COMPLEXITY));
        assert_eq!(record.volume_cm3, None);
        assert_eq!(record.surface_area_cm2, None);
        assert_relative_eq!(record.max_aspect_ratio.unwrap(), 5.0);
    }
}
