//! Surface entities: planes, quadrics, tori and freeform surfaces.

use partquote_brep::Surface;

use super::{parse_axis_placement, EntityArgs, Units};
use crate::error::StepError;
use crate::parser::StepFile;

/// Freeform surface types, recognised but not evaluated.
const FREEFORM: &[&str] = &[
    "B_SPLINE_SURFACE",
    "B_SPLINE_SURFACE_WITH_KNOTS",
    "BEZIER_SURFACE",
    "UNIFORM_SURFACE",
    "QUASI_UNIFORM_SURFACE",
    "RATIONAL_B_SPLINE_SURFACE",
];

/// Parse the surface of a face.
///
/// Lengths stay in file units; the cone semi-angle is converted to radians
/// with `units`. Unrecognised surface types become [`Surface::Other`].
pub fn parse_surface(file: &StepFile, id: u64, units: &Units) -> Result<Surface, StepError> {
    let entity = file.require(id)?;

    if entity.is_complex() {
        if FREEFORM.iter().any(|name| entity.has_part(name)) {
            return Ok(Surface::BSpline);
        }
        return Ok(Surface::Other(entity.type_name.to_lowercase()));
    }

    let name = entity.type_name.as_str();
    if FREEFORM.contains(&name) {
        return Ok(Surface::BSpline);
    }

    let frame = || parse_axis_placement(file, entity.entity_ref(1)?);

    let surface = match name {
        // PLANE(name, position)
        "PLANE" => {
            let frame = frame()?;
            Surface::Plane {
                origin: frame.origin,
                normal: frame.z,
            }
        }
        // CYLINDRICAL_SURFACE(name, position, radius)
        "CYLINDRICAL_SURFACE" => Surface::Cylinder {
            frame: frame()?,
            radius: entity.real(2)?,
        },
        // CONICAL_SURFACE(name, position, radius, semi_angle)
        "CONICAL_SURFACE" => Surface::Cone {
            frame: frame()?,
            radius: entity.real(2)?,
            semi_angle: entity.real(3)? * units.angle_to_rad,
        },
        // SPHERICAL_SURFACE(name, position, radius)
        "SPHERICAL_SURFACE" => Surface::Sphere {
            frame: frame()?,
            radius: entity.real(2)?,
        },
        // TOROIDAL_SURFACE(name, position, major_radius, minor_radius)
        "TOROIDAL_SURFACE" | "DEGENERATE_TOROIDAL_SURFACE" => Surface::Torus {
            frame: frame()?,
            major_radius: entity.real(2)?,
            minor_radius: entity.real(3)?,
        },
        other => Surface::Other(other.to_lowercase()),
    };
    Ok(surface)
}
