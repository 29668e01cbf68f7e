//! The feature record produced by analysis.

use serde::{Deserialize, Serialize};

/// Geometric and manufacturability features of one part.
///
/// Every field is optional: `None` means "not computed", never zero.
/// Corner radius and tool diameter are written together through
/// [`FeatureRecord::set_corner_radius`], and difficulty is clamped by
/// [`FeatureRecord::set_machining_difficulty`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordFields")]
pub struct FeatureRecord {
    /// Enclosed volume in cm³.
    pub volume_cm3: Option<f64>,
    /// Surface area in cm².
    pub surface_area_cm2: Option<f64>,
    /// Bounding box extent along x, mm.
    pub bbox_length_mm: Option<f64>,
    /// Bounding box extent along y, mm.
    pub bbox_width_mm: Option<f64>,
    /// Bounding box extent along z, mm.
    pub bbox_height_mm: Option<f64>,
    /// Largest pairwise ratio of the bounding box dimensions, at least 1.
    pub max_aspect_ratio: Option<f64>,
    /// Complexity bucket, 1 to 5.
    pub complexity_score: Option<f64>,
    min_corner_radius_mm: Option<f64>,
    min_tool_diameter_mm: Option<f64>,
    machining_difficulty: Option<f64>,
    /// Faces that are not planar.
    pub curved_surface_count: Option<u32>,
    /// Edges whose adjacent faces meet at more than 80°.
    pub sharp_edge_count: Option<u32>,
    /// Coarse hole estimate.
    pub hole_count: Option<u32>,
    /// Coarse undercut estimate.
    pub undercut_count: Option<u32>,
}

impl FeatureRecord {
    /// A record with every field absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Smallest fillet radius, mm.
    pub fn min_corner_radius_mm(&self) -> Option<f64> {
        self.min_corner_radius_mm
    }

    /// Smallest end mill that reaches every corner, mm.
    pub fn min_tool_diameter_mm(&self) -> Option<f64> {
        self.min_tool_diameter_mm
    }

    /// Composite difficulty in `[1, 5]`.
    pub fn machining_difficulty(&self) -> Option<f64> {
        self.machining_difficulty
    }

    /// Set the corner radius; the tool diameter follows as twice the radius.
    pub fn set_corner_radius(&mut self, radius_mm: Option<f64>) {
        self.min_corner_radius_mm = radius_mm;
        self.min_tool_diameter_mm = radius_mm.map(|r| 2.0 * r);
    }

    /// Set the difficulty, clamped to `[1, 5]`.
    pub fn set_machining_difficulty(&mut self, difficulty: Option<f64>) {
        self.machining_difficulty = difficulty.filter(|d| !d.is_nan()).map(|d| d.clamp(1.0, 5.0));
    }

    /// Overwrite fields with every value `other` has; absent values in
    /// `other` leave this record untouched.
    pub fn merge_from(&mut self, other: &FeatureRecord) {
        fn take<T: Copy>(dst: &mut Option<T>, src: Option<T>) {
            if src.is_some() {
                *dst = src;
            }
        }
        take(&mut self.volume_cm3, other.volume_cm3);
        take(&mut self.surface_area_cm2, other.surface_area_cm2);
        take(&mut self.bbox_length_mm, other.bbox_length_mm);
        take(&mut self.bbox_width_mm, other.bbox_width_mm);
        take(&mut self.bbox_height_mm, other.bbox_height_mm);
        take(&mut self.max_aspect_ratio, other.max_aspect_ratio);
        take(&mut self.complexity_score, other.complexity_score);
        if other.min_corner_radius_mm.is_some() {
            self.set_corner_radius(other.min_corner_radius_mm);
        }
        take(&mut self.machining_difficulty, other.machining_difficulty);
        take(&mut self.curved_surface_count, other.curved_surface_count);
        take(&mut self.sharp_edge_count, other.sharp_edge_count);
        take(&mut self.hole_count, other.hole_count);
        take(&mut self.undercut_count, other.undercut_count);
    }
}

/// Wire form; deserialising goes through the setters so the radius/tool
/// pair and the difficulty clamp hold for records read from JSON.
///
/// Reading is not a lossless inverse of writing. A serialised
/// `min_tool_diameter_mm` is ignored and rebuilt as twice the radius, and
/// an out-of-range difficulty comes back clamped.
#[derive(Deserialize)]
struct RecordFields {
    volume_cm3: Option<f64>,
    surface_area_cm2: Option<f64>,
    bbox_length_mm: Option<f64>,
    bbox_width_mm: Option<f64>,
    bbox_height_mm: Option<f64>,
    max_aspect_ratio: Option<f64>,
    complexity_score: Option<f64>,
    min_corner_radius_mm: Option<f64>,
    machining_difficulty: Option<f64>,
    curved_surface_count: Option<u32>,
    sharp_edge_count: Option<u32>,
    hole_count: Option<u32>,
    undercut_count: Option<u32>,
}

impl From<RecordFields> for FeatureRecord {
    fn from(f: RecordFields) -> Self {
        let mut record = FeatureRecord {
            volume_cm3: f.volume_cm3,
            surface_area_cm2: f.surface_area_cm2,
            bbox_length_mm: f.bbox_length_mm,
            bbox_width_mm: f.bbox_width_mm,
            bbox_height_mm: f.bbox_height_mm,
            max_aspect_ratio: f.max_aspect_ratio,
            complexity_score: f.complexity_score,
            curved_surface_count: f.curved_surface_count,
            sharp_edge_count: f.sharp_edge_count,
            hole_count: f.hole_count,
            undercut_count: f.undercut_count,
            ..FeatureRecord::default()
        };
        record.set_corner_radius(f.min_corner_radius_mm);
        record.set_machining_difficulty(f.machining_difficulty);
        record
    }
}
