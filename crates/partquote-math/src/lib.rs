#![warn(missing_docs)]

//! Geometry primitives shared by the partquote mesh and B-rep crates.
//!
//! Everything is `f64` nalgebra underneath and every length is in
//! millimetres.

use nalgebra::{Unit, Vector3};

/// Position in model space.
pub type Point3 = nalgebra::Point3<f64>;

/// Displacement or free vector.
pub type Vec3 = Vector3<f64>;

/// Unit-length vector.
pub type Dir3 = Unit<Vector3<f64>>;

/// Distances below this many millimetres count as zero.
pub const LINEAR_TOLERANCE: f64 = 1e-6;

/// Whether `a` and `b` are the same point within [`LINEAR_TOLERANCE`].
pub fn coincident(a: &Point3, b: &Point3) -> bool {
    nalgebra::distance_squared(a, b) < LINEAR_TOLERANCE * LINEAR_TOLERANCE
}

/// Axis-aligned box, `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Lower corner.
    pub min: Point3,
    /// Upper corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Degenerate box around one point.
    pub fn from_point(p: Point3) -> Self {
        Self { min: p, max: p }
    }

    /// Tightest box around `points`; `None` for an empty set.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(Self::from_point(*p)),
            Some(mut b) => {
                b.include(p);
                Some(b)
            }
        })
    }

    /// Extend to cover `p`.
    pub fn include(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Edge lengths.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// `size()` as `[dx, dy, dz]`.
    pub fn dimensions(&self) -> [f64; 3] {
        self.size().into()
    }
}

/// Unsigned angle from `a` to `b` in radians. `None` if either is
/// shorter than [`LINEAR_TOLERANCE`].
pub fn angle_between(a: &Vec3, b: &Vec3) -> Option<f64> {
    if a.norm() < LINEAR_TOLERANCE || b.norm() < LINEAR_TOLERANCE {
        return None;
    }
    Some(a.angle(b))
}

/// Axes `(x, y)` completing `axis` to a right-handed frame.
///
/// `x` is `hint` made perpendicular to `axis`. Without a usable hint the
/// world axis least aligned with `axis` is used instead.
pub fn orthonormal_frame(axis: &Dir3, hint: Option<&Vec3>) -> (Dir3, Dir3) {
    let z = axis.into_inner();
    let reject = |v: Vec3| v - z * z.dot(&v);
    let x = hint
        .map(|h| reject(*h))
        .filter(|h| h.norm() > LINEAR_TOLERANCE)
        .unwrap_or_else(|| reject(if z.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() }));
    let x = Dir3::new_normalize(x);
    let y = Dir3::new_normalize(z.cross(x.as_ref()));
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_bounds_of_points() {
        let corners = [
            Point3::new(1.0, -2.0, 3.0),
            Point3::new(-1.0, 4.0, 0.0),
            Point3::new(0.5, 0.0, 7.0),
        ];
        let bbox = Aabb3::from_points(&corners).unwrap();
        assert_eq!(bbox.min, Point3::new(-1.0, -2.0, 0.0));
        assert_eq!(bbox.max, Point3::new(1.0, 4.0, 7.0));
        assert_eq!(bbox.dimensions(), [2.0, 6.0, 7.0]);

        assert!(Aabb3::from_points(&Vec::<Point3>::new()).is_none());
        assert_eq!(Aabb3::from_point(Point3::origin()).dimensions(), [0.0; 3]);
    }

    #[test]
    fn test_angles() {
        let x = Vec3::x();
        assert_relative_eq!(angle_between(&x, &Vec3::y()).unwrap(), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(angle_between(&x, &-x).unwrap(), PI, epsilon = 1e-12);
        assert_relative_eq!(angle_between(&x, &(x * 3.0)).unwrap(), 0.0, epsilon = 1e-12);
        assert!(angle_between(&x, &Vec3::zeros()).is_none());
    }

    #[test]
    fn test_frame_follows_hint() {
        let axis = Dir3::new_normalize(Vec3::new(0.0, 0.0, 2.0));
        let (x, y) = orthonormal_frame(&axis, Some(&Vec3::new(1.0, 0.0, 1.0)));
        assert_relative_eq!(x.into_inner(), Vec3::x(), epsilon = 1e-12);
        assert_relative_eq!(y.into_inner(), Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_frame_without_usable_hint() {
        let axis = Dir3::new_normalize(Vec3::new(1.0, 1.0, 0.0));
        for hint in [None, Some(axis.into_inner() * 2.0)] {
            let (x, y) = orthonormal_frame(&axis, hint.as_ref());
            assert_relative_eq!(x.dot(axis.as_ref()), 0.0, epsilon = 1e-12);
            assert_relative_eq!(y.dot(x.as_ref()), 0.0, epsilon = 1e-12);
            assert_relative_eq!(x.cross(y.as_ref()), axis.into_inner(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_coincident() {
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(coincident(&a, &Point3::new(1.0 + 1e-7, 2.0, 3.0)));
        assert!(!coincident(&a, &Point3::new(1.001, 2.0, 3.0)));
    }
}
