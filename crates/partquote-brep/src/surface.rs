//! Analytic face surfaces.

use partquote_math::{orthonormal_frame, Dir3, Point3, Vec3, LINEAR_TOLERANCE};

/// Right-handed placement: origin plus orthonormal axes, `z` being the axis
/// of revolution for rotational surfaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Origin.
    pub origin: Point3,
    /// Reference direction (angle 0).
    pub x: Dir3,
    /// Completes the right-handed frame.
    pub y: Dir3,
    /// Main axis.
    pub z: Dir3,
}

impl Frame {
    /// Build a frame from an axis and an optional reference direction.
    pub fn new(origin: Point3, axis: Dir3, ref_dir: Option<&Vec3>) -> Self {
        let (x, y) = orthonormal_frame(&axis, ref_dir);
        Self {
            origin,
            x,
            y,
            z: axis,
        }
    }

    /// Local coordinates of `p`.
    pub fn to_local(&self, p: &Point3) -> Vec3 {
        let d = p - self.origin;
        Vec3::new(
            d.dot(self.x.as_ref()),
            d.dot(self.y.as_ref()),
            d.dot(self.z.as_ref()),
        )
    }

    /// Unit radial direction at angle `theta` about `z`.
    pub fn radial(&self, theta: f64) -> Vec3 {
        let (s, c) = theta.sin_cos();
        c * self.x.as_ref() + s * self.y.as_ref()
    }

    /// `∫ radial(θ) dθ` over `[theta0, theta0 + span]`.
    pub(crate) fn radial_integral(&self, theta0: f64, span: f64) -> Vec3 {
        let theta1 = theta0 + span;
        (theta1.sin() - theta0.sin()) * self.x.as_ref()
            - (theta1.cos() - theta0.cos()) * self.y.as_ref()
    }
}

/// The surface underlying a face. Normals point away from the material
/// when the face's `same_sense` flag is set.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Infinite plane.
    Plane {
        /// A point on the plane.
        origin: Point3,
        /// Plane normal.
        normal: Dir3,
    },
    /// Circular cylinder about `frame.z`.
    Cylinder {
        /// Placement.
        frame: Frame,
        /// Radius.
        radius: f64,
    },
    /// Circular cone about `frame.z`; radius grows along the axis.
    Cone {
        /// Placement; `radius` is measured in its XY plane.
        frame: Frame,
        /// Radius at the frame origin.
        radius: f64,
        /// Half angle in radians.
        semi_angle: f64,
    },
    /// Sphere; the frame fixes latitude and longitude.
    Sphere {
        /// Placement at the centre.
        frame: Frame,
        /// Radius.
        radius: f64,
    },
    /// Torus about `frame.z`.
    Torus {
        /// Placement at the centre.
        frame: Frame,
        /// Distance from the axis to the tube centre.
        major_radius: f64,
        /// Tube radius.
        minor_radius: f64,
    },
    /// Free-form B-spline surface.
    BSpline,
    /// Any other surface type, kept by name.
    Other(String),
}

impl Surface {
    /// True for planes.
    pub fn is_planar(&self) -> bool {
        matches!(self, Surface::Plane { .. })
    }

    /// Short type name.
    pub fn kind_name(&self) -> &str {
        match self {
            Surface::Plane { .. } => "plane",
            Surface::Cylinder { .. } => "cylinder",
            Surface::Cone { .. } => "cone",
            Surface::Sphere { .. } => "sphere",
            Surface::Torus { .. } => "torus",
            Surface::BSpline => "bspline",
            Surface::Other(name) => name,
        }
    }

    /// Rotational frame, if the surface is a surface of revolution.
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            Surface::Cylinder { frame, .. }
            | Surface::Cone { frame, .. }
            | Surface::Sphere { frame, .. }
            | Surface::Torus { frame, .. } => Some(frame),
            _ => None,
        }
    }

    /// Scale all lengths about the origin.
    pub fn scale(&mut self, factor: f64) {
        let scale_point = |p: &mut Point3| *p = Point3::from(p.coords * factor);
        match self {
            Surface::Plane { origin, .. } => scale_point(origin),
            Surface::Cylinder { frame, radius } | Surface::Sphere { frame, radius } => {
                scale_point(&mut frame.origin);
                *radius *= factor;
            }
            Surface::Cone { frame, radius, .. } => {
                scale_point(&mut frame.origin);
                *radius *= factor;
            }
            Surface::Torus {
                frame,
                major_radius,
                minor_radius,
            } => {
                scale_point(&mut frame.origin);
                *major_radius *= factor;
                *minor_radius *= factor;
            }
            Surface::BSpline | Surface::Other(_) => {}
        }
    }

    /// Unit surface normal at (or nearest to) `p`.
    ///
    /// `None` for free-form surfaces and for points on the axis of a
    /// rotational surface where the normal is undefined.
    pub fn normal_at(&self, p: &Point3) -> Option<Vec3> {
        match self {
            Surface::Plane { normal, .. } => Some(normal.into_inner()),
            Surface::Cylinder { frame, .. } => {
                let l = frame.to_local(p);
                let rho = l.x.hypot(l.y);
                (rho > LINEAR_TOLERANCE).then(|| frame.radial(l.y.atan2(l.x)))
            }
            Surface::Cone {
                frame, semi_angle, ..
            } => {
                let l = frame.to_local(p);
                let rho = l.x.hypot(l.y);
                (rho > LINEAR_TOLERANCE).then(|| {
                    semi_angle.cos() * frame.radial(l.y.atan2(l.x))
                        - semi_angle.sin() * frame.z.as_ref()
                })
            }
            Surface::Sphere { frame, .. } => {
                let d = p - frame.origin;
                (d.norm() > LINEAR_TOLERANCE).then(|| d.normalize())
            }
            Surface::Torus {
                frame,
                major_radius,
                ..
            } => {
                let l = frame.to_local(p);
                let rho = l.x.hypot(l.y);
                if rho <= LINEAR_TOLERANCE {
                    return None;
                }
                let phi = l.z.atan2(rho - major_radius);
                let radial = frame.radial(l.y.atan2(l.x));
                Some(phi.cos() * radial + phi.sin() * frame.z.as_ref())
            }
            Surface::BSpline | Surface::Other(_) => None,
        }
    }

    /// Point at parameters `(theta, v)` on a surface of revolution.
    ///
    /// `v` is the axial offset for cylinders and cones and the latitude
    /// angle for spheres and tori.
    pub fn point_at(&self, theta: f64, v: f64) -> Option<Point3> {
        match self {
            Surface::Cylinder { frame, radius } => {
                Some(frame.origin + *radius * frame.radial(theta) + v * frame.z.as_ref())
            }
            Surface::Cone {
                frame,
                radius,
                semi_angle,
            } => {
                let r = radius + v * semi_angle.tan();
                Some(frame.origin + r * frame.radial(theta) + v * frame.z.as_ref())
            }
            Surface::Sphere { frame, radius } => {
                let (s, c) = v.sin_cos();
                Some(frame.origin + *radius * (c * frame.radial(theta) + s * frame.z.as_ref()))
            }
            Surface::Torus {
                frame,
                major_radius,
                minor_radius,
            } => {
                let (s, c) = v.sin_cos();
                Some(
                    frame.origin
                        + (major_radius + minor_radius * c) * frame.radial(theta)
                        + minor_radius * s * frame.z.as_ref(),
                )
            }
            _ => None,
        }
    }

    /// Parameters `(theta, v)` of the projection of `p`, the inverse of
    /// [`Surface::point_at`]. `theta` is `None` on the axis.
    pub fn param_of(&self, p: &Point3) -> Option<(Option<f64>, f64)> {
        let frame = self.frame()?;
        let l = frame.to_local(p);
        let rho = l.x.hypot(l.y);
        let theta = (rho > LINEAR_TOLERANCE).then(|| l.y.atan2(l.x));
        let v = match self {
            Surface::Sphere { radius, .. } => (l.z / radius).clamp(-1.0, 1.0).asin(),
            Surface::Torus { major_radius, .. } => l.z.atan2(rho - major_radius),
            _ => l.z,
        };
        Some((theta, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn z_frame() -> Frame {
        Frame::new(
            Point3::origin(),
            Dir3::new_normalize(Vec3::z()),
            Some(&Vec3::x()),
        )
    }

    #[test]
    fn test_cylinder_normal_and_param() {
        let s = Surface::Cylinder {
            frame: z_frame(),
            radius: 2.0,
        };
        let p = s.point_at(FRAC_PI_2, 5.0).unwrap();
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 5.0, epsilon = 1e-12);
        let n = s.normal_at(&p).unwrap();
        assert_relative_eq!(n.y, 1.0, epsilon = 1e-12);
        let (theta, v) = s.param_of(&p).unwrap();
        assert_relative_eq!(theta.unwrap(), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(v, 5.0, epsilon = 1e-12);
        assert!(s.normal_at(&Point3::new(0.0, 0.0, 3.0)).is_none());
    }

    #[test]
    fn test_cone_normal_tilts_against_axis() {
        let s = Surface::Cone {
            frame: z_frame(),
            radius: 1.0,
            semi_angle: FRAC_PI_4,
        };
        let p = s.point_at(0.0, 1.0).unwrap();
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-12);
        let n = s.normal_at(&p).unwrap();
        assert_relative_eq!(n.x, FRAC_PI_4.cos(), epsilon = 1e-12);
        assert_relative_eq!(n.z, -FRAC_PI_4.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_and_torus_params() {
        let sphere = Surface::Sphere {
            frame: z_frame(),
            radius: 3.0,
        };
        let p = sphere.point_at(0.3, 0.4).unwrap();
        let (theta, phi) = sphere.param_of(&p).unwrap();
        assert_relative_eq!(theta.unwrap(), 0.3, epsilon = 1e-12);
        assert_relative_eq!(phi, 0.4, epsilon = 1e-12);

        let torus = Surface::Torus {
            frame: z_frame(),
            major_radius: 10.0,
            minor_radius: 2.0,
        };
        let q = torus.point_at(1.0, 2.5).unwrap();
        let (theta, phi) = torus.param_of(&q).unwrap();
        assert_relative_eq!(theta.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(phi, 2.5, epsilon = 1e-12);
        let n = torus.normal_at(&q).unwrap();
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_freeform_has_no_normal() {
        assert!(Surface::BSpline.normal_at(&Point3::origin()).is_none());
        assert!(!Surface::BSpline.is_planar());
        assert_eq!(Surface::Other("offset".into()).kind_name(), "offset");
    }
}
