//! Ray representation.

use crate::{MathError, Point3, Result, Vec3};

/// A half-line `origin + t * direction`, `t >= 0`.
///
/// Rays built with [`Ray::new`] carry a unit direction, so `t` is a
/// distance. Rays carried into another frame by
/// [`AffineTransform::apply_ray`](crate::AffineTransform::apply_ray) keep
/// the parametrization of the original ray instead, which may leave the
/// direction non-unit when the frame is scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray with a normalized direction.
    ///
    /// Fails on a zero-length or non-finite direction.
    pub fn new(origin: Point3, direction: Vec3) -> Result<Self> {
        if !origin.iter().all(|c| c.is_finite()) {
            return Err(MathError::NonFinite("ray origin"));
        }
        if !direction.iter().all(|c| c.is_finite()) {
            return Err(MathError::NonFinite("ray direction"));
        }
        let norm = direction.norm();
        if norm == 0.0 {
            return Err(MathError::ZeroLength("ray direction"));
        }
        Ok(Self {
            origin,
            direction: direction / norm,
        })
    }

    /// Create a ray without normalizing the direction.
    pub fn new_unnormalized(origin: Point3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }

    /// The same ray with its origin moved forward to `at(dt)`.
    #[inline]
    pub fn advanced(&self, dt: f64) -> Self {
        Self {
            origin: self.at(dt),
            direction: self.direction,
        }
    }
}
