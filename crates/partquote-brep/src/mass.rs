//! Area, volume and bounds of a boundary representation.
//!
//! Each face is integrated analytically over the parameter box spanned by
//! its boundary: the angular span comes from the largest gap between
//! boundary angles, the axial (or latitude) span from the extreme boundary
//! parameters. Volume follows from the divergence theorem,
//! `V = ⅓ Σ ∫ p·n dA`. Results are exact for boxes, cylinders, spheres and
//! tori bounded along parameter lines, and approximate otherwise.

use std::f64::consts::{FRAC_PI_2, TAU};

use partquote_math::{Aabb3, Point3};

use crate::curve::SEGMENTS_PER_TURN;
use crate::error::Result;
use crate::model::{newell, BRepModel, Face, FaceId};
use crate::surface::Surface;

/// Largest boundary gap still considered a closed revolution.
const FULL_TURN_GAP: f64 = 2.5 * TAU / SEGMENTS_PER_TURN as f64;

/// Spans below this are treated as degenerate.
const SPAN_EPS: f64 = 1e-9;

/// Parameter box of a face on a surface of revolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    /// Start angle about the axis.
    pub theta0: f64,
    /// Angular span in `(0, 2π]`.
    pub theta_span: f64,
    /// Lower second parameter (axial offset or latitude).
    pub v0: f64,
    /// Upper second parameter.
    pub v1: f64,
}

/// Area and flux contribution of one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceIntegral {
    /// Face area in mm².
    pub area: f64,
    /// `∫ p·n dA` with the outward normal, in mm³.
    pub flux: f64,
}

/// Angular start and span covered by a set of angles.
fn angular_range(angles: &[f64]) -> (f64, f64) {
    if angles.is_empty() {
        return (0.0, TAU);
    }
    let mut sorted: Vec<f64> = angles.iter().map(|a| a.rem_euclid(TAU)).collect();
    sorted.sort_by(f64::total_cmp);

    let mut best_gap = sorted[0] + TAU - sorted[sorted.len() - 1];
    let mut start = sorted[0];
    for w in sorted.windows(2) {
        let gap = w[1] - w[0];
        if gap > best_gap {
            best_gap = gap;
            start = w[1];
        }
    }

    let span = TAU - best_gap;
    if best_gap <= FULL_TURN_GAP || span < SPAN_EPS {
        (0.0, TAU)
    } else {
        (start, span)
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

impl BRepModel {
    /// Parameter box of a face on a surface of revolution.
    ///
    /// Returns `None` for planes and free-form surfaces.
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its boundary entities are missing.
    pub fn face_patch(&self, id: FaceId) -> Result<Option<Patch>> {
        let face = self.face(id)?;
        let Some(frame) = face.surface.frame() else {
            return Ok(None);
        };
        let boundary = self.face_boundary_points(id)?;

        let mut thetas = Vec::with_capacity(boundary.len());
        let mut vs = Vec::with_capacity(boundary.len());
        for p in &boundary {
            if let Some((theta, v)) = face.surface.param_of(p) {
                thetas.extend(theta);
                vs.push(v);
            }
        }
        let (theta0, theta_span) = angular_range(&thetas);

        let (v0, v1) = match &face.surface {
            Surface::Sphere { .. } => {
                match min_max(&vs) {
                    None => (-FRAC_PI_2, FRAC_PI_2),
                    Some((lo, hi)) if hi - lo < SPAN_EPS => {
                        // Cap bounded by a single parallel: the loop winding
                        // tells which pole it encloses.
                        let mut toward_north = 0.0;
                        for edge_loop in &face.loops {
                            let pts = self.loop_points(edge_loop)?;
                            toward_north += newell(&pts).dot(frame.z.as_ref());
                        }
                        if toward_north * face.sense() >= 0.0 {
                            (lo, FRAC_PI_2)
                        } else {
                            (-FRAC_PI_2, hi)
                        }
                    }
                    Some(range) => range,
                }
            }
            Surface::Torus { .. } => {
                let (start, span) = angular_range(&vs);
                (start, start + span)
            }
            _ => min_max(&vs).unwrap_or((0.0, 0.0)),
        };

        Ok(Some(Patch {
            theta0,
            theta_span,
            v0,
            v1,
        }))
    }

    /// Area and outward flux of one face.
    ///
    /// `None` when the face's surface cannot be integrated (free-form).
    ///
    /// # Errors
    ///
    /// Returns an error if the face or its boundary entities are missing.
    pub fn face_integral(&self, id: FaceId) -> Result<Option<FaceIntegral>> {
        let face = self.face(id)?;
        let integral = match &face.surface {
            Surface::Plane { origin, normal } => {
                let area = self.planar_area(face)?;
                Some(FaceIntegral {
                    area,
                    flux: face.sense() * origin.coords.dot(normal.as_ref()) * area,
                })
            }
            Surface::BSpline | Surface::Other(_) => None,
            surface => {
                let Some(patch) = self.face_patch(id)? else {
                    return Ok(None);
                };
                revolved_integral(surface, &patch).map(|i| FaceIntegral {
                    area: i.area,
                    flux: face.sense() * i.flux,
                })
            }
        };
        Ok(integral)
    }

    /// Planar face area: outer loop minus holes, with arcs integrated
    /// exactly.
    fn planar_area(&self, face: &Face) -> Result<f64> {
        let mut areas = Vec::with_capacity(face.loops.len());
        for edge_loop in &face.loops {
            areas.push((edge_loop.outer, self.loop_vector_area(edge_loop)?.norm()));
        }
        let outer_idx = areas
            .iter()
            .position(|(outer, _)| *outer)
            .or_else(|| {
                areas
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1 .1.total_cmp(&b.1 .1))
                    .map(|(i, _)| i)
            });
        let Some(outer_idx) = outer_idx else {
            return Ok(0.0);
        };
        let holes: f64 = areas
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != outer_idx)
            .map(|(_, (_, a))| a)
            .sum();
        Ok((areas[outer_idx].1 - holes).max(0.0))
    }

    /// Total surface area in mm², `None` if any face is not integrable or
    /// the model has no faces.
    pub fn surface_area(&self) -> Option<f64> {
        self.integrate().map(|(area, _)| area)
    }

    /// Enclosed volume in mm³, `None` if any face is not integrable or the
    /// model has no faces.
    pub fn volume(&self) -> Option<f64> {
        self.integrate().map(|(_, flux)| flux.abs() / 3.0)
    }

    fn integrate(&self) -> Option<(f64, f64)> {
        if self.num_faces() == 0 {
            return None;
        }
        let mut area = 0.0;
        let mut flux = 0.0;
        for (id, _) in self.faces() {
            let integral = self.face_integral(id).ok().flatten()?;
            area += integral.area;
            flux += integral.flux;
        }
        Some((area, flux))
    }

    /// Bounds of vertices, sampled edges and sampled curved faces.
    pub fn bounding_box(&self) -> Option<Aabb3> {
        let mut bbox: Option<Aabb3> = None;
        let mut include = |p: &Point3| match bbox.as_mut() {
            Some(b) => b.include(p),
            None => bbox = Some(Aabb3::from_point(*p)),
        };

        for (_, v) in self.vertices() {
            include(&v.point);
        }
        for (id, _) in self.edges() {
            if let Ok(points) = self.edge_points(id, true) {
                points.iter().for_each(&mut include);
            }
        }
        for (id, face) in self.faces() {
            let Ok(Some(patch)) = self.face_patch(id) else {
                continue;
            };
            for i in 0..=32 {
                let theta = patch.theta0 + patch.theta_span * f64::from(i) / 32.0;
                for j in 0..=8 {
                    let v = patch.v0 + (patch.v1 - patch.v0) * f64::from(j) / 8.0;
                    if let Some(p) = face.surface.point_at(theta, v) {
                        include(&p);
                    }
                }
            }
        }
        bbox
    }
}

/// Closed-form `(area, ∫ p·n dA)` over a patch, natural surface normal.
fn revolved_integral(surface: &Surface, patch: &Patch) -> Option<FaceIntegral> {
    let frame = surface.frame()?;
    let o = frame.origin.coords;
    let dt = patch.theta_span;
    let o_u = o.dot(&frame.radial_integral(patch.theta0, dt));
    let o_a = o.dot(frame.z.as_ref());
    let (v0, v1) = (patch.v0, patch.v1);

    let integral = match *surface {
        Surface::Cylinder { radius: r, .. } => {
            let h = v1 - v0;
            FaceIntegral {
                area: r * dt * h,
                flux: r * h * (r * dt + o_u),
            }
        }
        Surface::Cone {
            radius, semi_angle, ..
        } => {
            let t = semi_angle.tan();
            let d1 = v1 - v0;
            let d2 = v1 * v1 - v0 * v0;
            let d3 = v1.powi(3) - v0.powi(3);
            // ∫r dv, ∫r² dv, ∫r·v dv with r = R + t·v
            let i0 = radius * d1 + t * d2 / 2.0;
            let i1 = radius * radius * d1 + radius * t * d2 + t * t * d3 / 3.0;
            let i2 = radius * d2 / 2.0 + t * d3 / 3.0;
            FaceIntegral {
                area: dt * i0 / semi_angle.cos(),
                flux: o_u * i0 + dt * i1 - t * dt * (o_a * i0 + i2),
            }
        }
        Surface::Sphere { radius: r, .. } => {
            let sin_span = v1.sin() - v0.sin();
            let cos2 = (v1 - v0) / 2.0 + ((2.0 * v1).sin() - (2.0 * v0).sin()) / 4.0;
            let sin_cos = (v1.sin().powi(2) - v0.sin().powi(2)) / 2.0;
            FaceIntegral {
                area: r * r * dt * sin_span,
                flux: r * r * (cos2 * o_u + o_a * dt * sin_cos + r * dt * sin_span),
            }
        }
        Surface::Torus {
            major_radius: big_r,
            minor_radius: r,
            ..
        } => {
            let dphi = v1 - v0;
            let a1 = v1.sin() - v0.sin();
            let a2 = dphi / 2.0 + ((2.0 * v1).sin() - (2.0 * v0).sin()) / 4.0;
            let b1 = v0.cos() - v1.cos();
            let b2 = (v1.sin().powi(2) - v0.sin().powi(2)) / 2.0;
            let radial = o_u * (big_r * a1 + r * a2);
            let axial = dt * o_a * (big_r * b1 + r * b2);
            let own = dt * (big_r * big_r * a1 + big_r * r * a2 + r * big_r * dphi + r * r * a1);
            FaceIntegral {
                area: r * dt * (big_r * dphi + r * a1),
                flux: r * (radial + axial + own),
            }
        }
        _ => return None,
    };
    Some(integral)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{cylinder, planar_box, sphere};
    use crate::curve::{Circle3d, Ellipse3d, EdgeCurve};
    use crate::model::{Edge, EdgeLoop, LoopEdge};
    use crate::surface::Frame;
    use approx::assert_relative_eq;
    use partquote_math::{Dir3, Vec3};
    use std::f64::consts::PI;

    #[test]
    fn test_angular_range() {
        assert_eq!(angular_range(&[]), (0.0, TAU));
        let quarter: Vec<f64> = (0..=16).map(|i| f64::from(i) * PI / 32.0).collect();
        let (start, span) = angular_range(&quarter);
        assert_relative_eq!(start, 0.0, epsilon = 1e-12);
        assert_relative_eq!(span, PI / 2.0, epsilon = 1e-12);

        let wrapped = [-0.2, -0.1, 0.0, 0.1, 0.2];
        let (start, span) = angular_range(&wrapped);
        assert_relative_eq!(start, TAU - 0.2, epsilon = 1e-12);
        assert_relative_eq!(span, 0.4, epsilon = 1e-12);

        let full: Vec<f64> = (0..64).map(|i| f64::from(i) * TAU / 64.0).collect();
        assert_eq!(angular_range(&full), (0.0, TAU));
        assert_eq!(angular_range(&[1.0, 1.0]), (0.0, TAU));
    }

    #[test]
    fn test_box_mass_properties() {
        let model = planar_box([10.0, 20.0, 30.0]);
        assert_relative_eq!(model.volume().unwrap(), 6000.0, epsilon = 1e-9);
        assert_relative_eq!(
            model.surface_area().unwrap(),
            2.0 * (200.0 + 600.0 + 300.0),
            epsilon = 1e-9
        );
        let bbox = model.bounding_box().unwrap();
        assert_eq!(bbox.dimensions(), [10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_cylinder_mass_properties() {
        let model = cylinder(5.0, 10.0);
        assert_relative_eq!(
            model.surface_area().unwrap(),
            2.0 * PI * 25.0 + TAU * 5.0 * 10.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(model.volume().unwrap(), PI * 25.0 * 10.0, max_relative = 1e-12);
        let bbox = model.bounding_box().unwrap();
        assert_relative_eq!(bbox.size().z, 10.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.size().x, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_half_disc_and_ellipse_areas_are_exact() {
        let mut model = BRepModel::new();
        let z = Dir3::new_normalize(Vec3::z());
        let a = model.add_vertex(Point3::new(2.0, 0.0, 0.0));
        let b = model.add_vertex(Point3::new(-2.0, 0.0, 0.0));
        let arc = model.add_edge(Edge {
            start: a,
            end: b,
            curve: EdgeCurve::Circle(Circle3d::new(Point3::origin(), 2.0, z, Some(&Vec3::x()))),
            same_sense: true,
        });
        let chord = model.add_edge(Edge {
            start: a,
            end: b,
            curve: EdgeCurve::Line,
            same_sense: true,
        });
        let half_disc = EdgeLoop {
            edges: vec![
                LoopEdge { edge: arc, forward: true },
                LoopEdge { edge: chord, forward: false },
            ],
            outer: true,
        };
        let area = model.loop_vector_area(&half_disc).unwrap();
        assert_relative_eq!(area, Vec3::new(0.0, 0.0, 2.0 * PI), epsilon = 1e-12);

        // Walking the loop backwards flips the vector, not the magnitude.
        let reversed = EdgeLoop {
            edges: vec![
                LoopEdge { edge: chord, forward: true },
                LoopEdge { edge: arc, forward: false },
            ],
            outer: true,
        };
        assert_relative_eq!(model.loop_vector_area(&reversed).unwrap(), -area, epsilon = 1e-12);

        let frame = Frame::new(Point3::new(1.0, 1.0, 0.0), z, Some(&Vec3::x()));
        let seam = model.add_vertex(Point3::new(4.0, 1.0, 0.0));
        let ellipse = model.add_edge(Edge {
            start: seam,
            end: seam,
            curve: EdgeCurve::Ellipse(Ellipse3d {
                center: frame.origin,
                semi_axis_1: 3.0,
                semi_axis_2: 1.5,
                normal: frame.z,
                x_dir: frame.x,
                y_dir: frame.y,
            }),
            same_sense: false,
        });
        let ring = EdgeLoop {
            edges: vec![LoopEdge { edge: ellipse, forward: true }],
            outer: true,
        };
        assert_relative_eq!(
            model.loop_vector_area(&ring).unwrap(),
            Vec3::new(0.0, 0.0, -PI * 4.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sphere_mass_properties() {
        let model = sphere(Point3::new(3.0, -2.0, 7.0), 2.0);
        assert_relative_eq!(model.volume().unwrap(), 4.0 / 3.0 * PI * 8.0, epsilon = 1e-9);
        assert_relative_eq!(model.surface_area().unwrap(), 16.0 * PI, epsilon = 1e-9);
        let bbox = model.bounding_box().unwrap();
        assert_relative_eq!(bbox.min.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.z, 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hemisphere_cap_direction() {
        let mut model = BRepModel::new();
        let z = Dir3::new_normalize(Vec3::z());
        let seam = model.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let equator = model.add_edge(Edge {
            start: seam,
            end: seam,
            curve: EdgeCurve::Circle(Circle3d::new(Point3::origin(), 1.0, z, Some(&Vec3::x()))),
            same_sense: true,
        });
        let face = model.add_face(Face {
            surface: Surface::Sphere {
                frame: Frame::new(Point3::origin(), z, Some(&Vec3::x())),
                radius: 1.0,
            },
            loops: vec![EdgeLoop {
                edges: vec![LoopEdge {
                    edge: equator,
                    forward: true,
                }],
                outer: true,
            }],
            same_sense: true,
        });
        let patch = model.face_patch(face).unwrap().unwrap();
        assert_relative_eq!(patch.v0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(patch.v1, FRAC_PI_2, epsilon = 1e-12);
        let integral = model.face_integral(face).unwrap().unwrap();
        assert_relative_eq!(integral.area, TAU, epsilon = 1e-9);
        assert_relative_eq!(model.bounding_box().unwrap().max.z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_full_torus() {
        let mut model = BRepModel::new();
        model.add_face(Face {
            surface: Surface::Torus {
                frame: Frame::new(Point3::origin(), Dir3::new_normalize(Vec3::z()), None),
                major_radius: 10.0,
                minor_radius: 2.0,
            },
            loops: Vec::new(),
            same_sense: true,
        });
        assert_relative_eq!(
            model.volume().unwrap(),
            2.0 * PI * PI * 10.0 * 4.0,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            model.surface_area().unwrap(),
            4.0 * PI * PI * 10.0 * 2.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_cone_frustum_lateral_area() {
        // Frustum from r=1 at v=0 to r=2 at v=1 (45° half angle).
        let surface = Surface::Cone {
            frame: Frame::new(Point3::origin(), Dir3::new_normalize(Vec3::z()), None),
            radius: 1.0,
            semi_angle: PI / 4.0,
        };
        let patch = Patch {
            theta0: 0.0,
            theta_span: TAU,
            v0: 0.0,
            v1: 1.0,
        };
        let integral = revolved_integral(&surface, &patch).unwrap();
        let slant = 2f64.sqrt();
        assert_relative_eq!(integral.area, PI * (1.0 + 2.0) * slant, epsilon = 1e-9);
        // Lateral flux plus the two caps (z=1 cap: 4π·1, z=0 cap: 0) gives 3V.
        let frustum = PI / 3.0 * (1.0 + 2.0 + 4.0);
        assert_relative_eq!((integral.flux + 4.0 * PI) / 3.0, frustum, epsilon = 1e-9);
    }

    #[test]
    fn test_freeform_face_has_no_volume() {
        let mut model = planar_box([1.0, 1.0, 1.0]);
        model.add_face(Face {
            surface: Surface::BSpline,
            loops: Vec::new(),
            same_sense: true,
        });
        assert!(model.volume().is_none());
        assert!(model.surface_area().is_none());
        assert!(model.bounding_box().is_some());
    }

    #[test]
    fn test_wireframe_has_bounds_only() {
        let mut model = BRepModel::new();
        let a = model.add_vertex(Point3::origin());
        let b = model.add_vertex(Point3::new(4.0, 0.0, 0.0));
        model.add_edge(Edge {
            start: a,
            end: b,
            curve: EdgeCurve::Line,
            same_sense: true,
        });
        assert!(model.volume().is_none());
        assert_eq!(model.bounding_box().unwrap().dimensions(), [4.0, 0.0, 0.0]);
    }
}
