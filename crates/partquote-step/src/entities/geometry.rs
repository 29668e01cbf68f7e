//! Points, directions and axis placements.

use partquote_brep::Frame;
use partquote_math::{Dir3, Point3, Vec3};

use super::EntityArgs;
use crate::error::StepError;
use crate::parser::{StepEntity, StepFile};

/// Coordinates of a CARTESIAN_POINT or DIRECTION; 2D values get `z = 0`.
fn triple(entity: &StepEntity) -> Result<Vec3, StepError> {
    match entity.real_list(1)?.as_slice() {
        &[x, y, z, ..] => Ok(Vec3::new(x, y, z)),
        &[x, y] => Ok(Vec3::new(x, y, 0.0)),
        other => Err(StepError::malformed(
            Some(entity.id),
            format!("{} has {} coordinates", entity.type_name, other.len()),
        )),
    }
}

/// `CARTESIAN_POINT(name, coordinates)`
pub fn parse_cartesian_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let entity = file.require(id)?;
    if entity.type_name != "CARTESIAN_POINT" {
        return Err(StepError::unexpected("CARTESIAN_POINT", entity.type_name.as_str()));
    }
    triple(entity).map(Point3::from)
}

/// `DIRECTION(name, direction_ratios)`, normalised. Zero ratios are an
/// [`StepError::InvalidGeometry`].
pub fn parse_direction(file: &StepFile, id: u64) -> Result<Dir3, StepError> {
    let entity = file.require(id)?;
    if entity.type_name != "DIRECTION" {
        return Err(StepError::unexpected("DIRECTION", entity.type_name.as_str()));
    }
    Dir3::try_new(triple(entity)?, 1e-15)
        .ok_or_else(|| StepError::InvalidGeometry(format!("zero-length direction #{id}")))
}

fn optional_direction(file: &StepFile, entity: &StepEntity, idx: usize) -> Result<Option<Dir3>, StepError> {
    entity
        .optional_ref(idx)?
        .map(|d| parse_direction(file, d))
        .transpose()
}

/// AXIS1_PLACEMENT or AXIS2_PLACEMENT_3D as a right-handed frame.
///
/// A missing axis means +Z. A missing or skew reference direction is
/// replaced by the nearest perpendicular one.
pub fn parse_axis_placement(file: &StepFile, id: u64) -> Result<Frame, StepError> {
    let entity = file.require(id)?;
    let ref_direction = match entity.type_name.as_str() {
        "AXIS1_PLACEMENT" => None,
        "AXIS2_PLACEMENT_3D" => optional_direction(file, entity, 3)?,
        other => return Err(StepError::unexpected("AXIS2_PLACEMENT_3D", other)),
    };
    let origin = parse_cartesian_point(file, entity.entity_ref(1)?)?;
    let axis = optional_direction(file, entity, 2)?.unwrap_or_else(Vec3::z_axis);
    Ok(Frame::new(origin, axis, ref_direction.as_ref().map(|d| d.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use approx::assert_relative_eq;

    fn instances(lines: &str) -> StepFile {
        let input = format!("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n{lines}\nENDSEC;\nEND-ISO-10303-21;\n");
        Parser::parse(input.as_bytes()).unwrap()
    }

    #[test]
    fn test_points_in_two_and_three_dimensions() {
        let file = instances(
            "#1 = CARTESIAN_POINT('origin', (1.0, 2.0, 3.));\n\
             #2 = CARTESIAN_POINT('', (4.0, 5.0));\n\
             #3 = CARTESIAN_POINT('', (4.0));",
        );
        assert_relative_eq!(parse_cartesian_point(&file, 1).unwrap(), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(parse_cartesian_point(&file, 2).unwrap(), Point3::new(4.0, 5.0, 0.0));
        assert!(matches!(
            parse_cartesian_point(&file, 3),
            Err(StepError::Malformed { entity_id: Some(3), .. })
        ));
    }

    #[test]
    fn test_directions_are_normalised() {
        let file = instances("#1 = DIRECTION('z', (0.0, 0.0, 2.0));\n#2 = DIRECTION('', (0., 0., 0.));");
        assert_relative_eq!(parse_direction(&file, 1).unwrap().z, 1.0);
        assert!(matches!(
            parse_direction(&file, 2),
            Err(StepError::InvalidGeometry(_))
        ));
        assert!(matches!(
            parse_cartesian_point(&file, 1),
            Err(StepError::UnexpectedEntity { .. })
        ));
        assert!(matches!(
            parse_direction(&file, 9),
            Err(StepError::DanglingReference(9))
        ));
    }

    #[test]
    fn test_placements() {
        let file = instances(
            r#"
#1 = CARTESIAN_POINT('', (0.0, 0.0, 5.0));
#2 = DIRECTION('', (0.0, 0.0, 1.0));
#3 = DIRECTION('', (1.0, 0.0, 0.0));
#4 = AXIS2_PLACEMENT_3D('', #1, #2, #3);
#5 = AXIS2_PLACEMENT_3D('', #1, $, $);
#6 = AXIS1_PLACEMENT('', #1, #3);
"#,
        );
        let frame = parse_axis_placement(&file, 4).unwrap();
        assert_relative_eq!(frame.origin.z, 5.0);
        assert_relative_eq!(frame.z.z, 1.0);
        assert_relative_eq!(frame.x.x, 1.0);
        assert_relative_eq!(frame.y.y, 1.0, epsilon = 1e-12);

        let defaulted = parse_axis_placement(&file, 5).unwrap();
        assert_relative_eq!(defaulted.z.z, 1.0);
        assert_relative_eq!(defaulted.x.dot(&defaulted.z.into_inner()), 0.0, epsilon = 1e-12);

        let axis1 = parse_axis_placement(&file, 6).unwrap();
        assert_relative_eq!(axis1.z.x, 1.0);
        assert!(parse_axis_placement(&file, 1).is_err());
    }
}
