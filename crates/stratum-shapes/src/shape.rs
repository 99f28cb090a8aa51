//! The shape sum type and its queries.

use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stratum_math::{unit, AffineTransform, Dir3, Point3, Ray, Rotation, Tolerance, Vec3};

use crate::distance::{cuboid_distance, cylinder_distance, sphere_distance};
use crate::intersect::{intersect_cuboid, intersect_cylinder, intersect_sphere};
use crate::{Result, ShapeError};

/// Step used for the finite-difference surface normal.
const NORMAL_STEP: f64 = 1e-6;

/// Classification of a point against a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// Strictly inside (negative signed distance).
    Interior,
    /// Exactly on the boundary.
    Surface,
    /// Strictly outside.
    Exterior,
}

/// Boolean operation of a combined shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    /// Points in either operand.
    Union,
    /// Points in both operands.
    Intersect,
    /// Points in the right operand but not the left.
    Subtract,
}

impl BinaryOp {
    /// Combine the operands' values: `min`, `max` or `max(-left, right)`.
    ///
    /// Used for signed distances and, as an approximation, for ray
    /// parameters.
    #[inline]
    pub fn combine(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Union => left.min(right),
            BinaryOp::Intersect => left.max(right),
            BinaryOp::Subtract => (-left).max(right),
        }
    }
}

/// Geometry of a shape in its own local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Axis-aligned box centred at the origin.
    Box {
        /// Half of the edge length along each axis.
        half_extents: Vec3,
    },
    /// Sphere centred at the origin.
    Sphere {
        /// Sphere radius.
        radius: f64,
    },
    /// Capped cylinder around the Z axis, centred at the origin.
    Cylinder {
        /// Cylinder radius.
        radius: f64,
        /// Distance from the mid-plane to each cap.
        half_height: f64,
    },
    /// Boolean combination of two shapes.
    Combined {
        /// The operation.
        op: BinaryOp,
        /// Left operand.
        left: Arc<Shape>,
        /// Right operand.
        right: Arc<Shape>,
    },
}

/// A solid described by a signed distance function.
///
/// Each shape carries its own placement, stored inverted: incoming points
/// and rays are mapped into the shape's local frame before evaluation.
/// Shapes are immutable once built and shared through [`Arc`].
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    kind: ShapeKind,
    to_local: AffineTransform,
    placed: bool,
}

fn check_dimension(shape: &'static str, name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ShapeError::InvalidParameter { shape, name, value })
    }
}

impl Shape {
    fn unplaced(kind: ShapeKind) -> Self {
        Self {
            kind,
            to_local: AffineTransform::identity(),
            placed: false,
        }
    }

    /// Box from its half-extents.
    pub fn cuboid(half_extents: Vec3) -> Result<Self> {
        check_dimension("box", "x", half_extents.x)?;
        check_dimension("box", "y", half_extents.y)?;
        check_dimension("box", "z", half_extents.z)?;
        Ok(Self::unplaced(ShapeKind::Box { half_extents }))
    }

    /// Sphere from its radius.
    pub fn sphere(radius: f64) -> Result<Self> {
        let radius = check_dimension("sphere", "radius", radius)?;
        Ok(Self::unplaced(ShapeKind::Sphere { radius }))
    }

    /// Cylinder from its radius and half-height.
    pub fn cylinder(radius: f64, half_height: f64) -> Result<Self> {
        let radius = check_dimension("cylinder", "radius", radius)?;
        let half_height = check_dimension("cylinder", "half_height", half_height)?;
        Ok(Self::unplaced(ShapeKind::Cylinder {
            radius,
            half_height,
        }))
    }

    /// Boolean combination `op(left, right)`.
    ///
    /// [`BinaryOp::Subtract`] keeps the part of `right` outside `left`; see
    /// [`Shape::difference`] for the argument order most callers want.
    pub fn combine(op: BinaryOp, left: Arc<Shape>, right: Arc<Shape>) -> Self {
        Self::unplaced(ShapeKind::Combined { op, left, right })
    }

    /// Union of two shapes.
    pub fn union(a: Arc<Shape>, b: Arc<Shape>) -> Self {
        Self::combine(BinaryOp::Union, a, b)
    }

    /// Intersection of two shapes.
    pub fn intersection(a: Arc<Shape>, b: Arc<Shape>) -> Self {
        Self::combine(BinaryOp::Intersect, a, b)
    }

    /// `base` with `cut` removed.
    pub fn difference(base: Arc<Shape>, cut: Arc<Shape>) -> Self {
        Self::combine(BinaryOp::Subtract, cut, base)
    }

    /// Place the shape: rotate by `rotation`, then translate by
    /// `translation`. Composes with any existing placement.
    pub fn placed(self, rotation: &Rotation, translation: &Vec3) -> Result<Self> {
        self.transformed(&AffineTransform::from_parts(rotation, translation))
    }

    /// Apply an arbitrary invertible placement on top of the current one.
    pub fn transformed(self, placement: &AffineTransform) -> Result<Self> {
        let to_local = self.to_local * placement.inverse()?;
        let placed = !to_local.is_identity(&Tolerance::DEFAULT);
        Ok(Self {
            kind: self.kind,
            to_local,
            placed,
        })
    }

    /// The shape's local geometry.
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Transform from the enclosing frame into the shape's local frame.
    pub fn to_local(&self) -> &AffineTransform {
        &self.to_local
    }

    /// Short name of the shape kind.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Box { .. } => "box",
            ShapeKind::Sphere { .. } => "sphere",
            ShapeKind::Cylinder { .. } => "cylinder",
            ShapeKind::Combined { .. } => "combined",
        }
    }

    #[inline]
    fn local_point(&self, p: &Point3) -> Point3 {
        if self.placed {
            self.to_local.apply_point(p)
        } else {
            *p
        }
    }

    #[inline]
    fn local_ray(&self, ray: &Ray) -> Ray {
        if self.placed {
            self.to_local.apply_ray(ray)
        } else {
            *ray
        }
    }

    /// Signed distance from `p` to the surface: negative inside, positive
    /// outside.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        let p = self.local_point(p);
        match &self.kind {
            ShapeKind::Box { half_extents } => cuboid_distance(&p, half_extents),
            ShapeKind::Sphere { radius } => sphere_distance(&p, *radius),
            ShapeKind::Cylinder {
                radius,
                half_height,
            } => cylinder_distance(&p, *radius, *half_height),
            ShapeKind::Combined { op, left, right } => {
                op.combine(left.signed_distance(&p), right.signed_distance(&p))
            }
        }
    }

    /// Smallest strictly positive ray parameter at which the ray crosses the
    /// surface, or `f64::INFINITY`.
    ///
    /// For combined shapes the operands' parameters are merged with the
    /// same combinator as the distances. This is exact for unions of
    /// disjoint convex operands and only approximate otherwise.
    pub fn intersect(&self, ray: &Ray) -> f64 {
        let ray = self.local_ray(ray);
        match &self.kind {
            ShapeKind::Box { half_extents } => intersect_cuboid(&ray, half_extents),
            ShapeKind::Sphere { radius } => intersect_sphere(&ray, *radius),
            ShapeKind::Cylinder {
                radius,
                half_height,
            } => intersect_cylinder(&ray, *radius, *half_height),
            ShapeKind::Combined { op, left, right } => {
                op.combine(left.intersect(&ray), right.intersect(&ray))
            }
        }
    }

    /// Classify `p` by the sign of its signed distance.
    pub fn contains(&self, p: &Point3) -> Location {
        let d = self.signed_distance(p);
        if d < 0.0 {
            Location::Interior
        } else if d > 0.0 {
            Location::Exterior
        } else {
            Location::Surface
        }
    }

    /// Enclosed volume, or `None` for combined shapes.
    pub fn volume(&self) -> Option<f64> {
        let scale = self.to_local.determinant().abs();
        let local = match &self.kind {
            ShapeKind::Box { half_extents } => 8.0 * half_extents.product(),
            ShapeKind::Sphere { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            ShapeKind::Cylinder {
                radius,
                half_height,
            } => PI * radius * radius * 2.0 * half_height,
            ShapeKind::Combined { .. } => return None,
        };
        Some(local / scale)
    }

    /// Outward surface normal near `p`, from the distance gradient.
    ///
    /// Returns `None` where the gradient vanishes.
    pub fn normal(&self, p: &Point3) -> Option<Dir3> {
        let h = NORMAL_STEP;
        let gradient = Vec3::new(
            self.signed_distance(&(p + Vec3::x() * h)) - self.signed_distance(&(p - Vec3::x() * h)),
            self.signed_distance(&(p + Vec3::y() * h)) - self.signed_distance(&(p - Vec3::y() * h)),
            self.signed_distance(&(p + Vec3::z() * h)) - self.signed_distance(&(p - Vec3::z() * h)),
        );
        unit(&gradient).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

    fn unit_box() -> Shape {
        Shape::cuboid(Vec3::new(0.5, 0.5, 0.5)).unwrap()
    }

    fn random_points(seed: u64, count: usize, extent: f64) -> Vec<Point3> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-extent..extent),
                    rng.gen_range(-extent..extent),
                    rng.gen_range(-extent..extent),
                )
            })
            .collect()
    }

    #[test]
    fn test_box_distance_unit_box() {
        let b = unit_box();
        assert_relative_eq!(b.signed_distance(&Point3::origin()), -0.5);
        assert_relative_eq!(b.signed_distance(&Point3::new(2.0, 0.0, 0.0)), 1.5);
        assert_relative_eq!(b.signed_distance(&Point3::new(0.5, 0.5, 0.5)), 0.0);
        assert_relative_eq!(b.signed_distance(&Point3::new(1.5, 0.5, 0.5)), 1.0);
        assert_eq!(b.contains(&Point3::new(0.5, 0.5, 0.5)), Location::Surface);
        assert_relative_eq!(b.volume().unwrap(), 1.0);
    }

    #[test]
    fn test_sphere_distance() {
        let s = Shape::sphere(1.0).unwrap();
        assert_relative_eq!(s.signed_distance(&Point3::new(0.0, 3.0, 4.0)), 4.0);
        assert_relative_eq!(
            s.signed_distance(&Point3::new(1.0, 1.0, 1.0)),
            3.0_f64.sqrt() - 1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(s.volume().unwrap(), 4.0 / 3.0 * PI);
    }

    #[test]
    fn test_translated_box() {
        let b = unit_box()
            .placed(&Rotation::identity(), &Vec3::new(1.0, 2.0, 3.0))
            .unwrap();
        assert_relative_eq!(b.signed_distance(&Point3::new(1.0, 2.0, 3.0)), -0.5, epsilon = 1e-12);
        assert_relative_eq!(b.signed_distance(&Point3::new(0.5, 2.0, 3.0)), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotated_box() {
        let b = unit_box()
            .placed(&Rotation::rotation_z(FRAC_PI_4), &Vec3::zeros())
            .unwrap();
        // The box corner now points along +x
        let d = b.signed_distance(&Point3::new(FRAC_1_SQRT_2, 0.0, 0.0));
        assert!(d.abs() < 1e-12);
    }

    #[test]
    fn test_rotated_cylinder() {
        let c = Shape::cylinder(1.0, 1.0)
            .unwrap()
            .placed(&Rotation::rotation_y(FRAC_PI_2), &Vec3::zeros())
            .unwrap();
        let d = c.signed_distance(&Point3::new(0.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2));
        assert!(d.abs() < 1e-12);
        assert_relative_eq!(c.signed_distance(&Point3::new(2.0, 1.0, 0.0)), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_placement_is_skipped() {
        let b = unit_box().placed(&Rotation::identity(), &Vec3::zeros()).unwrap();
        assert!(!b.placed);
        assert_eq!(b, unit_box());
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            Shape::sphere(0.0),
            Err(ShapeError::InvalidParameter { name: "radius", .. })
        ));
        assert!(Shape::cuboid(Vec3::new(1.0, -1.0, 1.0)).is_err());
        assert!(Shape::cylinder(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_contains() {
        let s = Shape::sphere(1.0).unwrap();
        assert_eq!(s.contains(&Point3::origin()), Location::Interior);
        assert_eq!(s.contains(&Point3::new(1.0, 0.0, 0.0)), Location::Surface);
        assert_eq!(s.contains(&Point3::new(2.0, 0.0, 0.0)), Location::Exterior);
    }

    #[test]
    fn test_sign_consistency() {
        let shapes = [
            unit_box(),
            Shape::sphere(1.5).unwrap(),
            Shape::cylinder(1.0, 2.0)
                .unwrap()
                .placed(&Rotation::rotation_x(0.4), &Vec3::new(0.5, 0.0, 0.0))
                .unwrap(),
        ];
        for shape in &shapes {
            for p in random_points(7, 500, 3.0) {
                let d = shape.signed_distance(&p);
                let expected = if d < 0.0 {
                    Location::Interior
                } else if d > 0.0 {
                    Location::Exterior
                } else {
                    Location::Surface
                };
                assert_eq!(shape.contains(&p), expected);
            }
        }
    }

    #[test]
    fn test_combined_shapes() {
        let b = Arc::new(Shape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap());
        let s = Arc::new(
            Shape::sphere(1.0)
                .unwrap()
                .placed(&Rotation::identity(), &Vec3::new(0.0, 0.0, 2.0))
                .unwrap(),
        );

        let union_ab = Shape::union(b.clone(), s.clone());
        let union_ba = Shape::union(s.clone(), b.clone());
        let inter_ab = Shape::intersection(b.clone(), s.clone());
        let inter_ba = Shape::intersection(s.clone(), b.clone());
        let sub_ab = Shape::combine(BinaryOp::Subtract, b.clone(), s.clone());
        let sub_ba = Shape::combine(BinaryOp::Subtract, s.clone(), b.clone());

        let mut differs = false;
        for p in random_points(42, 1000, 5.0) {
            let (db, ds) = (b.signed_distance(&p), s.signed_distance(&p));
            assert_eq!(union_ab.signed_distance(&p), db.min(ds));
            assert_eq!(union_ab.signed_distance(&p), union_ba.signed_distance(&p));
            assert_eq!(inter_ab.signed_distance(&p), db.max(ds));
            assert_eq!(inter_ab.signed_distance(&p), inter_ba.signed_distance(&p));
            assert_eq!(sub_ab.signed_distance(&p), (-db).max(ds));
            differs |= sub_ab.signed_distance(&p) != sub_ba.signed_distance(&p);
        }
        assert!(differs);
        assert!(union_ab.volume().is_none());
    }

    #[test]
    fn test_difference_removes_cut() {
        let base = Arc::new(Shape::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap());
        let cut = Arc::new(Shape::sphere(0.5).unwrap());
        let shell = Shape::difference(base, cut);
        assert_eq!(shell.contains(&Point3::origin()), Location::Exterior);
        assert_eq!(shell.contains(&Point3::new(0.8, 0.0, 0.0)), Location::Interior);
    }

    fn random_rays(seed: u64, count: usize) -> Vec<Ray> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut rays = Vec::with_capacity(count);
        while rays.len() < count {
            let origin = Point3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
            );
            let dir = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            if let Ok(ray) = Ray::new(origin, dir) {
                rays.push(ray);
            }
        }
        rays
    }

    #[test]
    fn test_intersect_monotonicity() {
        let primitives = [
            unit_box(),
            Shape::sphere(1.0).unwrap(),
            Shape::cylinder(0.5, 1.0).unwrap(),
        ];
        for shape in &primitives {
            for ray in random_rays(3, 300) {
                let t = shape.intersect(&ray);
                assert!(!t.is_nan());
                assert!(t > 0.0);
                if t.is_finite() {
                    assert!(shape.signed_distance(&ray.at(t)).abs() < 1e-9);
                }
            }
        }

        let combined = Shape::union(Arc::new(unit_box()), Arc::new(Shape::sphere(0.7).unwrap()));
        for ray in random_rays(4, 300) {
            let t = combined.intersect(&ray);
            assert!(!t.is_nan());
            assert!(t > 0.0);
        }
    }

    #[test]
    fn test_intersect_placed_sphere() {
        let s = Shape::sphere(1.0)
            .unwrap()
            .placed(&Rotation::identity(), &Vec3::new(0.0, 0.0, 5.0))
            .unwrap();
        let ray = Ray::new(Point3::origin(), Vec3::z()).unwrap();
        assert_relative_eq!(s.intersect(&ray), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normal() {
        let s = Shape::sphere(2.0).unwrap();
        let n = s.normal(&Point3::new(0.0, 2.0, 0.0)).unwrap();
        assert_relative_eq!(n.into_inner(), Vec3::y(), epsilon = 1e-6);

        let b = unit_box();
        let n = b.normal(&Point3::new(0.0, 0.0, -0.5)).unwrap();
        assert_relative_eq!(n.into_inner(), -Vec3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_scaled_volume() {
        let b = unit_box()
            .transformed(&AffineTransform::scale(2.0, 3.0, 1.0))
            .unwrap();
        assert_relative_eq!(b.volume().unwrap(), 6.0, epsilon = 1e-12);
    }
}
