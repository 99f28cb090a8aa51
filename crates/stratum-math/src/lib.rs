#![warn(missing_docs)]

//! Math types for the stratum geometry engine.
//!
//! Thin wrappers around nalgebra providing the vocabulary the shape and
//! volume crates are written in: points, vectors, directions, rays,
//! rotations, affine transforms and tolerance constants.
//!
//! All lengths are `f64` in centimetres.

pub mod error;
pub mod ray;
pub mod rotation;
pub mod transform;

pub use error::{MathError, Result};
pub use ray::Ray;
pub use rotation::{EulerConvention, Rotation};
pub use transform::{AffineTransform, Decomposition};

use nalgebra::{Unit, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Normalize `v`, failing on a zero-length or non-finite vector.
pub fn unit(v: &Vec3) -> Result<Dir3> {
    if !v.iter().all(|c| c.is_finite()) {
        return Err(MathError::NonFinite("vector"));
    }
    Unit::try_new(*v, f64::MIN_POSITIVE).ok_or(MathError::ZeroLength("vector"))
}

/// Tolerance for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in cm.
    pub linear: f64,
}

impl Tolerance {
    /// Default tolerance (1e-10 cm).
    pub const DEFAULT: Self = Self { linear: 1e-10 };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
