//! Edge curves and their discretisation.

use std::f64::consts::TAU;

use partquote_math::{coincident, orthonormal_frame, Dir3, Point3, Vec3};

/// Segments used to discretise a full revolution.
pub const SEGMENTS_PER_TURN: usize = 64;

/// A circle in 3D space.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle3d {
    /// Center of the circle.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
    /// Normal to the circle plane; positive sense is counter-clockwise about it.
    pub normal: Dir3,
    /// Reference direction for angle 0.
    pub x_dir: Dir3,
    /// Second in-plane direction.
    pub y_dir: Dir3,
}

impl Circle3d {
    /// Create a circle, taking angle 0 from `ref_dir` projected into the plane.
    pub fn new(center: Point3, radius: f64, normal: Dir3, ref_dir: Option<&Vec3>) -> Self {
        let (x_dir, y_dir) = orthonormal_frame(&normal, ref_dir);
        Self {
            center,
            radius,
            normal,
            x_dir,
            y_dir,
        }
    }

    /// Point at angle `t` radians.
    pub fn point_at(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.center + self.radius * (c * self.x_dir.as_ref() + s * self.y_dir.as_ref())
    }

    /// Angle of the projection of `p`.
    pub fn angle_of(&self, p: &Point3) -> f64 {
        let d = p - self.center;
        d.dot(self.y_dir.as_ref()).atan2(d.dot(self.x_dir.as_ref()))
    }
}

/// An ellipse in 3D space.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse3d {
    /// Center of the ellipse.
    pub center: Point3,
    /// Semi-axis along `x_dir`.
    pub semi_axis_1: f64,
    /// Semi-axis along `y_dir`.
    pub semi_axis_2: f64,
    /// Normal to the ellipse plane.
    pub normal: Dir3,
    /// Direction of the first semi-axis.
    pub x_dir: Dir3,
    /// Direction of the second semi-axis.
    pub y_dir: Dir3,
}

impl Ellipse3d {
    /// Point at parameter `t`.
    pub fn point_at(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        self.center
            + self.semi_axis_1 * c * self.x_dir.as_ref()
            + self.semi_axis_2 * s * self.y_dir.as_ref()
    }

    /// Parameter of the projection of `p`.
    pub fn param_of(&self, p: &Point3) -> f64 {
        let d = p - self.center;
        let x = d.dot(self.x_dir.as_ref()) / self.semi_axis_1.max(f64::MIN_POSITIVE);
        let y = d.dot(self.y_dir.as_ref()) / self.semi_axis_2.max(f64::MIN_POSITIVE);
        y.atan2(x)
    }
}

/// The geometric curve carried by an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeCurve {
    /// Straight segment between the edge vertices.
    Line,
    /// Circle or circular arc.
    Circle(Circle3d),
    /// Ellipse or elliptical arc.
    Ellipse(Ellipse3d),
    /// B-spline, approximated by its control polygon.
    BSpline {
        /// Control points in order.
        control_points: Vec<Point3>,
    },
    /// Any other curve type, kept by name.
    Other(String),
}

impl EdgeCurve {
    /// True for circles and circular arcs.
    pub fn is_circular(&self) -> bool {
        matches!(self, EdgeCurve::Circle(_))
    }

    /// Radius of a circular curve.
    pub fn radius(&self) -> Option<f64> {
        match self {
            EdgeCurve::Circle(c) => Some(c.radius),
            _ => None,
        }
    }

    /// Short type name.
    pub fn kind_name(&self) -> &str {
        match self {
            EdgeCurve::Line => "line",
            EdgeCurve::Circle(_) => "circle",
            EdgeCurve::Ellipse(_) => "ellipse",
            EdgeCurve::BSpline { .. } => "bspline",
            EdgeCurve::Other(name) => name,
        }
    }

    /// Scale all lengths about the origin.
    pub fn scale(&mut self, factor: f64) {
        match self {
            EdgeCurve::Circle(c) => {
                c.center = Point3::from(c.center.coords * factor);
                c.radius *= factor;
            }
            EdgeCurve::Ellipse(e) => {
                e.center = Point3::from(e.center.coords * factor);
                e.semi_axis_1 *= factor;
                e.semi_axis_2 *= factor;
            }
            EdgeCurve::BSpline { control_points } => {
                for p in control_points {
                    *p = Point3::from(p.coords * factor);
                }
            }
            EdgeCurve::Line | EdgeCurve::Other(_) => {}
        }
    }

    /// Sample the curve from `start` to `end`, both included.
    ///
    /// `same_sense` tells whether start→end follows the curve's own
    /// direction. Coincident endpoints on a closed curve mean a full turn.
    pub fn discretize(&self, start: Point3, end: Point3, same_sense: bool) -> Vec<Point3> {
        match self {
            EdgeCurve::Line | EdgeCurve::Other(_) => vec![start, end],
            EdgeCurve::Circle(circle) => {
                let a0 = circle.angle_of(&start);
                let a1 = circle.angle_of(&end);
                let closed = coincident(&start, &end);
                sample_arc(a0, sweep(a0, a1, same_sense, closed), start, end, |t| {
                    circle.point_at(t)
                })
            }
            EdgeCurve::Ellipse(ellipse) => {
                let a0 = ellipse.param_of(&start);
                let a1 = ellipse.param_of(&end);
                let closed = coincident(&start, &end);
                sample_arc(a0, sweep(a0, a1, same_sense, closed), start, end, |t| {
                    ellipse.point_at(t)
                })
            }
            EdgeCurve::BSpline { control_points } => {
                let mut points = Vec::with_capacity(control_points.len().max(2));
                points.push(start);
                if control_points.len() > 2 {
                    let inner = &control_points[1..control_points.len() - 1];
                    if same_sense {
                        points.extend(inner.iter().copied());
                    } else {
                        points.extend(inner.iter().rev().copied());
                    }
                }
                points.push(end);
                points
            }
        }
    }

    /// Area between the true curve and the chords [`discretize`](Self::discretize)
    /// samples, as a vector along the curve normal.
    ///
    /// Adding this to the [`newell`](crate::newell) vector of a sampled
    /// loop gives the exact enclosed area for circular and elliptical
    /// edges. Zero for every other curve.
    pub fn chord_deficit(&self, start: Point3, end: Point3, same_sense: bool) -> Vec3 {
        // ½∮ p × dp over an arc of x = a·cos t, y = b·sin t is ½·a·b·Δt.
        let (a0, a1, ab, normal) = match self {
            EdgeCurve::Circle(c) => (c.angle_of(&start), c.angle_of(&end), c.radius * c.radius, c.normal),
            EdgeCurve::Ellipse(e) => (
                e.param_of(&start),
                e.param_of(&end),
                e.semi_axis_1 * e.semi_axis_2,
                e.normal,
            ),
            _ => return Vec3::zeros(),
        };
        let phi = sweep(a0, a1, same_sense, coincident(&start, &end));
        let n = segment_count(phi) as f64;
        normal.into_inner() * (0.5 * ab * (phi - n * (phi / n).sin()))
    }
}

/// Chords used for an arc of `sweep` radians.
fn segment_count(sweep: f64) -> usize {
    ((SEGMENTS_PER_TURN as f64 * sweep.abs() / TAU).ceil() as usize).max(1)
}

/// Signed angular sweep from `a0` to `a1`.
fn sweep(a0: f64, a1: f64, same_sense: bool, closed: bool) -> f64 {
    if closed {
        return if same_sense { TAU } else { -TAU };
    }
    if same_sense {
        (a1 - a0).rem_euclid(TAU)
    } else {
        -(a0 - a1).rem_euclid(TAU)
    }
}

fn sample_arc<F>(a0: f64, sweep: f64, start: Point3, end: Point3, eval: F) -> Vec<Point3>
where
    F: Fn(f64) -> Point3,
{
    let segments = segment_count(sweep);
    let mut points = Vec::with_capacity(segments + 1);
    points.push(start);
    for i in 1..segments {
        points.push(eval(a0 + sweep * i as f64 / segments as f64));
    }
    points.push(end);
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn unit_circle() -> Circle3d {
        Circle3d::new(
            Point3::origin(),
            1.0,
            Dir3::new_normalize(Vec3::z()),
            Some(&Vec3::x()),
        )
    }

    #[test]
    fn test_circle_point_and_angle() {
        let c = unit_circle();
        let p = c.point_at(FRAC_PI_2);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.angle_of(&p), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_quarter_arc_discretization() {
        let curve = EdgeCurve::Circle(unit_circle());
        let start = Point3::new(1.0, 0.0, 0.0);
        let end = Point3::new(0.0, 1.0, 0.0);
        let pts = curve.discretize(start, end, true);
        assert_eq!(pts.len(), SEGMENTS_PER_TURN / 4 + 1);
        for p in &pts {
            assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-12);
            assert!(p.x >= -1e-12 && p.y >= -1e-12);
        }
    }

    #[test]
    fn test_reverse_sense_takes_long_way() {
        let curve = EdgeCurve::Circle(unit_circle());
        let start = Point3::new(1.0, 0.0, 0.0);
        let end = Point3::new(0.0, 1.0, 0.0);
        let pts = curve.discretize(start, end, false);
        assert_eq!(pts.len(), 3 * SEGMENTS_PER_TURN / 4 + 1);
        assert!(pts.iter().any(|p| p.x < -0.9));
    }

    #[test]
    fn test_full_circle() {
        let curve = EdgeCurve::Circle(unit_circle());
        let p = Point3::new(1.0, 0.0, 0.0);
        let pts = curve.discretize(p, p, true);
        assert_eq!(pts.len(), SEGMENTS_PER_TURN + 1);
        assert!(pts.iter().any(|q| q.y < -0.99));
    }

    #[test]
    fn test_line_and_radius() {
        let a = Point3::origin();
        let b = Point3::new(3.0, 0.0, 0.0);
        assert_eq!(EdgeCurve::Line.discretize(a, b, true), vec![a, b]);
        assert_eq!(EdgeCurve::Line.radius(), None);
        assert_eq!(EdgeCurve::Circle(unit_circle()).radius(), Some(1.0));
        assert!(!EdgeCurve::Other("polyline".into()).is_circular());
        assert_eq!(EdgeCurve::Other("polyline".into()).kind_name(), "polyline");
    }

    #[test]
    fn test_bspline_control_polygon() {
        let cps = vec![
            Point3::origin(),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        let curve = EdgeCurve::BSpline {
            control_points: cps.clone(),
        };
        let fwd = curve.discretize(cps[0], cps[3], true);
        assert_eq!(fwd, cps);
        let rev = curve.discretize(cps[3], cps[0], false);
        assert_eq!(rev[1], cps[2]);
    }
}
