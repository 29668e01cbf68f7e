//! Curve entities: lines, conics and B-splines.

use partquote_brep::{Circle3d, EdgeCurve, Ellipse3d};

use super::{parse_axis_placement, parse_cartesian_point, part_view, EntityArgs};
use crate::error::StepError;
use crate::parser::{StepEntity, StepFile};

/// Longest chain of SURFACE_CURVE / TRIMMED_CURVE wrappers followed.
const MAX_CURVE_NESTING: usize = 8;

/// Parse the geometry of an EDGE_CURVE.
///
/// Wrapper curves (`SURFACE_CURVE`, `SEAM_CURVE`, `INTERSECTION_CURVE`,
/// `TRIMMED_CURVE`) resolve to their 3D basis curve. Types without an
/// analytic counterpart are kept by lower-case name.
pub fn parse_curve(file: &StepFile, id: u64) -> Result<EdgeCurve, StepError> {
    parse_curve_nested(file, id, 0)
}

fn parse_curve_nested(file: &StepFile, id: u64, depth: usize) -> Result<EdgeCurve, StepError> {
    if depth > MAX_CURVE_NESTING {
        return Err(StepError::InvalidTopology(format!(
            "curve #{id} nests deeper than {MAX_CURVE_NESTING} levels"
        )));
    }
    let entity = file.require(id)?;

    if entity.is_complex() {
        return parse_complex_curve(file, entity);
    }

    match entity.type_name.as_str() {
        "LINE" | "POLYLINE" => Ok(EdgeCurve::Line),
        "CIRCLE" => parse_circle(file, entity).map(EdgeCurve::Circle),
        "ELLIPSE" => parse_ellipse(file, entity).map(EdgeCurve::Ellipse),
        "B_SPLINE_CURVE_WITH_KNOTS" | "B_SPLINE_CURVE" | "BEZIER_CURVE"
        | "UNIFORM_CURVE" | "QUASI_UNIFORM_CURVE" => {
            // name, degree, control_points, ...
            let control_points = entity
                .entity_ref_list(2)?
                .into_iter()
                .map(|p| parse_cartesian_point(file, p))
                .collect::<Result<_, _>>()?;
            Ok(EdgeCurve::BSpline { control_points })
        }
        "SURFACE_CURVE" | "SEAM_CURVE" | "INTERSECTION_CURVE" | "TRIMMED_CURVE" => {
            // name, curve_3d / basis_curve, ...
            parse_curve_nested(file, entity.entity_ref(1)?, depth + 1)
        }
        other => Ok(EdgeCurve::Other(other.to_lowercase())),
    }
}

/// Parse a CIRCLE entity.
///
/// STEP syntax: `CIRCLE(name, position, radius)`
fn parse_circle(file: &StepFile, entity: &StepEntity) -> Result<Circle3d, StepError> {
    let frame = parse_axis_placement(file, entity.entity_ref(1)?)?;
    Ok(Circle3d::new(
        frame.origin,
        entity.real(2)?,
        frame.z,
        Some(frame.x.as_ref()),
    ))
}

/// Parse an ELLIPSE entity.
///
/// STEP syntax: `ELLIPSE(name, position, semi_axis_1, semi_axis_2)`
fn parse_ellipse(file: &StepFile, entity: &StepEntity) -> Result<Ellipse3d, StepError> {
    let frame = parse_axis_placement(file, entity.entity_ref(1)?)?;
    Ok(Ellipse3d {
        center: frame.origin,
        semi_axis_1: entity.real(2)?,
        semi_axis_2: entity.real(3)?,
        normal: frame.z,
        x_dir: frame.x,
        y_dir: frame.y,
    })
}

/// Rational B-splines appear as complex instances:
/// `( BOUNDED_CURVE() B_SPLINE_CURVE(degree, points, ...) ... )`.
fn parse_complex_curve(file: &StepFile, entity: &StepEntity) -> Result<EdgeCurve, StepError> {
    match part_view(entity, "B_SPLINE_CURVE") {
        Some(bspline) => {
            let control_points = bspline
                .entity_ref_list(1)?
                .into_iter()
                .map(|p| parse_cartesian_point(file, p))
                .collect::<Result<_, _>>()?;
            Ok(EdgeCurve::BSpline { control_points })
        }
        None => Ok(EdgeCurve::Other(entity.type_name.to_lowercase())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use approx::assert_relative_eq;

    fn parse_step(data: &str) -> StepFile {
        let input = format!("ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n");
        Parser::parse(input.as_bytes()).unwrap()
    }

    const PLACEMENT: &str = r#"
#1 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));
#2 = DIRECTION('', (0.0, 0.0, 1.0));
#3 = DIRECTION('', (1.0, 0.0, 0.0));
#4 = AXIS2_PLACEMENT_3D('', #1, #2, #3);
#5 = CARTESIAN_POINT('', (1.0, 1.0, 0.0));
#6 = CARTESIAN_POINT('', (2.0, 0.0, 0.0));
"#;

    #[test]
    fn test_parse_line() {
        let file = parse_step(&format!(
            "{PLACEMENT}#10 = VECTOR('', #2, 10.);\n#11 = LINE('', #1, #10);"
        ));
        assert_eq!(parse_curve(&file, 11).unwrap(), EdgeCurve::Line);
    }

    #[test]
    fn test_parse_circle_through_surface_curve() {
        let file = parse_step(&format!(
            "{PLACEMENT}#10 = CIRCLE('', #4, 2.5);\n#11 = SURFACE_CURVE('', #10, (), .CURVE_3D.);\n#12 = SEAM_CURVE('', #11, (), .CURVE_3D.);"
        ));
        let curve = parse_curve(&file, 12).unwrap();
        assert!(curve.is_circular());
        assert_relative_eq!(curve.radius().unwrap(), 2.5);
    }

    #[test]
    fn test_parse_ellipse() {
        let file = parse_step(&format!("{PLACEMENT}#10 = ELLIPSE('', #4, 4.0, 2.0);"));
        let EdgeCurve::Ellipse(e) = parse_curve(&file, 10).unwrap() else {
            panic!("expected ellipse");
        };
        assert_relative_eq!(e.semi_axis_1, 4.0);
        assert_relative_eq!(e.point_at(0.0).x, 4.0);
    }

    #[test]
    fn test_parse_bspline_simple_and_complex() {
        let file = parse_step(&format!(
            r#"{PLACEMENT}
#10 = B_SPLINE_CURVE_WITH_KNOTS('', 2, (#1, #5, #6), .UNSPECIFIED., .F., .F., (3, 3), (0., 1.), .UNSPECIFIED.);
#11 = ( BOUNDED_CURVE() B_SPLINE_CURVE(2, (#1, #5, #6), .UNSPECIFIED., .F., .F.) B_SPLINE_CURVE_WITH_KNOTS((3, 3), (0., 1.), .UNSPECIFIED.) CURVE() GEOMETRIC_REPRESENTATION_ITEM() RATIONAL_B_SPLINE_CURVE((1., 0.7, 1.)) REPRESENTATION_ITEM('') );
"#
        ));
        for id in [10, 11] {
            let EdgeCurve::BSpline { control_points } = parse_curve(&file, id).unwrap() else {
                panic!("expected bspline for #{id}");
            };
            assert_eq!(control_points.len(), 3);
            assert_relative_eq!(control_points[1].y, 1.0);
        }
    }

    #[test]
    fn test_unknown_curve_kept_by_name() {
        let file = parse_step(&format!("{PLACEMENT}#10 = OFFSET_CURVE_3D('', #4, 1.0, .F., #2);"));
        assert_eq!(
            parse_curve(&file, 10).unwrap(),
            EdgeCurve::Other("offset_curve_3d".into())
        );
    }

    #[test]
    fn test_self_referencing_curve_is_rejected() {
        let file = parse_step("#1 = TRIMMED_CURVE('', #1, (), (), .T., .PARAMETER.);");
        assert!(matches!(
            parse_curve(&file, 1),
            Err(StepError::InvalidTopology(_))
        ));
    }
}
