//! Affine transforms of 3D space.

use std::ops::Mul;

use nalgebra::Matrix3;

use crate::{MathError, Point3, Ray, Result, Rotation, Tolerance, Vec3};

/// Determinants smaller than this in magnitude are treated as singular.
const SINGULAR_DETERMINANT: f64 = 1e-14;

/// An affine transform `p -> linear * p + offset` (a 3x4 matrix).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    /// The 3x3 linear part (rotation and scale).
    pub linear: Matrix3<f64>,
    /// The translation column.
    pub offset: Vec3,
}

/// A transform split into scale, rotation and translation.
///
/// Recomposes as `translation * rotation * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposition {
    /// Per-axis scale factors. A reflection shows up as a negative x scale.
    pub scale: Vec3,
    /// The rotation part.
    pub rotation: Rotation,
    /// The translation part.
    pub translation: Vec3,
}

impl AffineTransform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            linear: Matrix3::identity(),
            offset: Vec3::zeros(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self::from_translation(&Vec3::new(dx, dy, dz))
    }

    /// Translation by a vector.
    pub fn from_translation(v: &Vec3) -> Self {
        Self {
            linear: Matrix3::identity(),
            offset: *v,
        }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            linear: Matrix3::from_diagonal(&Vec3::new(sx, sy, sz)),
            offset: Vec3::zeros(),
        }
    }

    /// Pure rotation.
    pub fn from_rotation(rotation: &Rotation) -> Self {
        Self {
            linear: *rotation.matrix(),
            offset: Vec3::zeros(),
        }
    }

    /// Rotate, then translate: `p -> rotation * p + translation`.
    pub fn from_parts(rotation: &Rotation, translation: &Vec3) -> Self {
        Self {
            linear: *rotation.matrix(),
            offset: *translation,
        }
    }

    /// Transform a point.
    #[inline]
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.linear * p.coords + self.offset)
    }

    /// Transform a direction vector (ignores translation).
    #[inline]
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.linear * v
    }

    /// Transform a ray, keeping its parametrization.
    ///
    /// The direction is not renormalized, so
    /// `self.apply_ray(r).at(t) == self.apply_point(&r.at(t))` and ray
    /// parameters stay comparable across frames.
    #[inline]
    pub fn apply_ray(&self, ray: &Ray) -> Ray {
        Ray::new_unnormalized(self.apply_point(&ray.origin), self.apply_vec(&ray.direction))
    }

    /// Determinant of the linear part.
    pub fn determinant(&self) -> f64 {
        self.linear.determinant()
    }

    /// Inverse of this transform.
    ///
    /// Fails when the linear part is singular.
    pub fn inverse(&self) -> Result<Self> {
        let determinant = self.determinant();
        if !determinant.is_finite() || determinant.abs() < SINGULAR_DETERMINANT {
            return Err(MathError::SingularTransform { determinant });
        }
        let linear = self
            .linear
            .try_inverse()
            .ok_or(MathError::SingularTransform { determinant })?;
        Ok(Self {
            linear,
            offset: -(linear * self.offset),
        })
    }

    /// Whether this transform is the identity within `tolerance`.
    pub fn is_identity(&self, tolerance: &Tolerance) -> bool {
        (self.linear - Matrix3::identity()).amax() < tolerance.linear
            && self.offset.amax() < tolerance.linear
    }

    /// The pure-rotation part of this transform, scale and translation removed.
    pub fn rotation_part(&self) -> Result<Self> {
        Ok(Self::from_rotation(&self.decompose()?.rotation))
    }

    /// Split into scale, rotation and translation.
    ///
    /// Scale factors are the column norms of the linear part; sheared
    /// transforms are not supported and decompose to a non-orthonormal
    /// "rotation".
    pub fn decompose(&self) -> Result<Decomposition> {
        let determinant = self.determinant();
        let mut scale = Vec3::new(
            self.linear.column(0).norm(),
            self.linear.column(1).norm(),
            self.linear.column(2).norm(),
        );
        if scale.min() < SINGULAR_DETERMINANT {
            return Err(MathError::SingularTransform { determinant });
        }
        if determinant < 0.0 {
            scale.x = -scale.x;
        }
        let inv_scale = Matrix3::from_diagonal(&scale.map(|s| 1.0 / s));
        Ok(Decomposition {
            scale,
            rotation: Rotation::from_matrix_unchecked(self.linear * inv_scale),
            translation: self.offset,
        })
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for AffineTransform {
    type Output = AffineTransform;

    /// Composition: `(a * b).apply_point(p) == a.apply_point(&b.apply_point(p))`.
    fn mul(self, rhs: AffineTransform) -> AffineTransform {
        AffineTransform {
            linear: self.linear * rhs.linear,
            offset: self.linear * rhs.offset + self.offset,
        }
    }
}

impl Mul<&AffineTransform> for &AffineTransform {
    type Output = AffineTransform;

    fn mul(self, rhs: &AffineTransform) -> AffineTransform {
        *self * *rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EulerConvention;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn random_transform(rng: &mut StdRng) -> AffineTransform {
        let r = Rotation::from_euler(
            rng.gen_range(-PI..PI),
            rng.gen_range(-PI..PI),
            rng.gen_range(-PI..PI),
            EulerConvention::Zyx,
        );
        let translation = Vec3::new(
            rng.gen_range(-50.0..50.0),
            rng.gen_range(-50.0..50.0),
            rng.gen_range(-50.0..50.0),
        );
        AffineTransform::from_parts(&r, &translation)
            * AffineTransform::scale(
                rng.gen_range(0.5..3.0),
                rng.gen_range(0.5..3.0),
                rng.gen_range(0.5..3.0),
            )
    }

    fn random_point(rng: &mut StdRng) -> Point3 {
        Point3::new(
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
        )
    }

    fn sample_transform() -> AffineTransform {
        let r = Rotation::from_euler(0.3, -1.2, 2.5, EulerConvention::Zyx);
        AffineTransform::from_parts(&r, &Vec3::new(1.0, -4.0, 2.5))
            * AffineTransform::scale(2.0, 0.5, 3.0)
    }

    #[test]
    fn test_identity_transform() {
        let t = AffineTransform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert!((t.apply_point(&p) - p).norm() < 1e-12);
        assert!(t.is_identity(&Tolerance::DEFAULT));
    }

    #[test]
    fn test_translation() {
        let t = AffineTransform::translation(10.0, 20.0, 30.0);
        let result = t.apply_point(&Point3::new(1.0, 2.0, 3.0));
        assert!((result.x - 11.0).abs() < 1e-12);
        assert!((result.y - 22.0).abs() < 1e-12);
        assert!((result.z - 33.0).abs() < 1e-12);
        // Vectors ignore translation
        let v = t.apply_vec(&Vec3::x());
        assert!((v - Vec3::x()).norm() < 1e-12);
    }

    #[test]
    fn test_from_parts_rotates_then_translates() {
        let t = AffineTransform::from_parts(
            &Rotation::rotation_z(FRAC_PI_2),
            &Vec3::new(0.0, 0.0, 5.0),
        );
        let p = t.apply_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = sample_transform();
        let inv = t.inverse().unwrap();
        for p in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(-7.5, 0.25, 100.0),
        ] {
            assert_relative_eq!(inv.apply_point(&t.apply_point(&p)), p, epsilon = 1e-10);
            assert_relative_eq!(t.apply_point(&inv.apply_point(&p)), p, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_random_inverse_round_trip() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let t = random_transform(&mut rng);
            let inv = t.inverse().unwrap();
            let p = random_point(&mut rng);
            assert_relative_eq!(inv.apply_point(&t.apply_point(&p)), p, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_random_composition() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let a = random_transform(&mut rng);
            let b = random_transform(&mut rng);
            let p = random_point(&mut rng);
            assert_relative_eq!(
                (a * b).apply_point(&p),
                a.apply_point(&b.apply_point(&p)),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_singular_inverse_fails() {
        let t = AffineTransform::scale(1.0, 0.0, 1.0);
        assert!(matches!(
            t.inverse(),
            Err(MathError::SingularTransform { .. })
        ));
    }

    #[test]
    fn test_composition_order() {
        let a = AffineTransform::translation(1.0, 0.0, 0.0);
        let b = AffineTransform::from_rotation(&Rotation::rotation_z(FRAC_PI_2));
        let p = Point3::new(1.0, 0.0, 0.0);
        // rotate first, then translate
        assert_relative_eq!((a * b).apply_point(&p), Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        // translate first, then rotate
        assert_relative_eq!((b * a).apply_point(&p), Point3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_apply_ray_keeps_parametrization() {
        let t = sample_transform();
        let ray = Ray::new(Point3::new(1.0, 1.0, 1.0), Vec3::new(0.2, -1.0, 0.4)).unwrap();
        let moved = t.apply_ray(&ray);
        for s in [0.0, 0.5, 3.0] {
            assert_relative_eq!(moved.at(s), t.apply_point(&ray.at(s)), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_decompose() {
        let r = Rotation::rotation_x(FRAC_PI_4);
        let t = AffineTransform::from_parts(&r, &Vec3::new(1.0, 2.0, 3.0))
            * AffineTransform::scale(2.0, 3.0, 4.0);
        let d = t.decompose().unwrap();
        assert_relative_eq!(d.scale, Vec3::new(2.0, 3.0, 4.0), epsilon = 1e-12);
        assert_relative_eq!(*d.rotation.matrix(), *r.matrix(), epsilon = 1e-12);
        assert_relative_eq!(d.translation, Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-12);

        let recomposed = AffineTransform::from_parts(&d.rotation, &d.translation)
            * AffineTransform::scale(d.scale.x, d.scale.y, d.scale.z);
        assert_relative_eq!(recomposed.linear, t.linear, epsilon = 1e-12);
    }

    #[test]
    fn test_decompose_reflection() {
        let d = AffineTransform::scale(-2.0, 1.0, 1.0).decompose().unwrap();
        assert!((d.scale.x + 2.0).abs() < 1e-12);
        assert_relative_eq!(*d.rotation.matrix(), Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_part() {
        let t = sample_transform();
        let r = t.rotation_part().unwrap();
        let v = r.apply_vec(&Vec3::new(0.0, 3.0, 4.0));
        assert!((v.norm() - 5.0).abs() < 1e-10);
        assert!(r.offset.norm() < 1e-12);
    }
}
