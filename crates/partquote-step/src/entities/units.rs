//! Length and plane-angle units of the representation context.

use std::f64::consts::PI;

use super::{part_view, EntityArgs};
use crate::parser::{StepEntity, StepFile, StepValue};

/// Conversion factors from file units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Units {
    /// Millimetres per file length unit.
    pub length_to_mm: f64,
    /// Radians per file angle unit.
    pub angle_to_rad: f64,
}

impl Default for Units {
    /// Millimetres and radians, what most exporters write.
    fn default() -> Self {
        Self {
            length_to_mm: 1.0,
            angle_to_rad: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum UnitKind {
    Length,
    Angle,
}

impl UnitKind {
    fn marker(self) -> &'static str {
        match self {
            UnitKind::Length => "LENGTH_UNIT",
            UnitKind::Angle => "PLANE_ANGLE_UNIT",
        }
    }

    /// Target units per SI base unit (metre or radian).
    fn base_factor(self) -> f64 {
        match self {
            UnitKind::Length => 1000.0,
            UnitKind::Angle => 1.0,
        }
    }

    fn named_factor(self, name: &str) -> Option<f64> {
        let name = name.to_ascii_uppercase();
        match (self, name.as_str()) {
            (UnitKind::Length, "INCH" | "IN") => Some(25.4),
            (UnitKind::Length, "FOOT" | "FT") => Some(304.8),
            (UnitKind::Length, "MIL" | "THOU") => Some(0.0254),
            (UnitKind::Length, "YARD") => Some(914.4),
            (UnitKind::Angle, "DEGREE" | "DEG") => Some(PI / 180.0),
            (UnitKind::Angle, "GRAD" | "GON") => Some(PI / 200.0),
            _ => None,
        }
    }
}

/// Unit chains longer than this are treated as malformed.
const MAX_UNIT_NESTING: usize = 4;

/// Find the units used by the geometry.
///
/// Prefers the units assigned by a GLOBAL_UNIT_ASSIGNED_CONTEXT; falls back
/// to the first unit of each kind in the file, then to mm and radians.
pub fn detect_units(file: &StepFile) -> Units {
    let mut candidates: Vec<u64> = Vec::new();
    let mut contexts: Vec<&StepEntity> = file
        .entities
        .values()
        .filter(|e| e.has_part("GLOBAL_UNIT_ASSIGNED_CONTEXT"))
        .collect();
    contexts.sort_by_key(|e| e.id);
    for context in contexts {
        if let Some(view) = part_view(context, "GLOBAL_UNIT_ASSIGNED_CONTEXT") {
            candidates.extend(view.entity_ref_list(0).unwrap_or_default());
        }
    }
    let mut others: Vec<u64> = file
        .entities
        .values()
        .filter(|e| e.has_part("LENGTH_UNIT") || e.has_part("PLANE_ANGLE_UNIT"))
        .map(|e| e.id)
        .collect();
    others.sort_unstable();
    candidates.extend(others);

    let mut units = Units::default();
    let find = |kind: UnitKind| {
        candidates
            .iter()
            .filter_map(|&id| file.get(id))
            .filter(|e| e.has_part(kind.marker()))
            .find_map(|e| unit_factor(file, e, kind, 0))
    };
    if let Some(f) = find(UnitKind::Length) {
        units.length_to_mm = f;
    }
    if let Some(f) = find(UnitKind::Angle) {
        units.angle_to_rad = f;
    }
    units
}

/// Factor from one unit entity to mm or radians.
fn unit_factor(file: &StepFile, unit: &StepEntity, kind: UnitKind, depth: usize) -> Option<f64> {
    if depth > MAX_UNIT_NESTING {
        return None;
    }

    if let Some(si) = part_view(unit, "SI_UNIT") {
        // (prefix, name) as a partial type; simple instances also carry the
        // derived dimensions first.
        let args = si.args();
        let n = args.len();
        if n < 2 {
            return None;
        }
        let prefix = args[n - 2].as_enum().map_or(Some(1.0), si_prefix)?;
        return Some(prefix * kind.base_factor());
    }

    if let Some(conversion) = part_view(unit, "CONVERSION_BASED_UNIT") {
        // (name, conversion_factor)
        let named = conversion
            .string(0)
            .ok()
            .and_then(|name| kind.named_factor(name));
        let measured = conversion
            .entity_ref(1)
            .ok()
            .and_then(|id| file.get(id))
            .and_then(|m| measure_factor(file, m, kind, depth));
        return measured.or(named);
    }

    None
}

/// LENGTH_MEASURE_WITH_UNIT(value, unit) resolved to mm or radians.
fn measure_factor(file: &StepFile, measure: &StepEntity, kind: UnitKind, depth: usize) -> Option<f64> {
    let value = measure.args.first().and_then(StepValue::as_real)?;
    let unit = file.get(measure.args.get(1)?.as_entity_ref()?)?;
    Some(value * unit_factor(file, unit, kind, depth + 1)?)
}

fn si_prefix(prefix: &str) -> Option<f64> {
    let factor = match prefix {
        "EXA" => 1e18,
        "PETA" => 1e15,
        "TERA" => 1e12,
        "GIGA" => 1e9,
        "MEGA" => 1e6,
        "KILO" => 1e3,
        "HECTO" => 1e2,
        "DECA" => 1e1,
        "DECI" => 1e-1,
        "CENTI" => 1e-2,
        "MILLI" => 1e-3,
        "MICRO" => 1e-6,
        "NANO" => 1e-9,
        "PICO" => 1e-12,
        "FEMTO" => 1e-15,
        "ATTO" => 1e-18,
        _ => return None,
    };
    Some(factor)
}
