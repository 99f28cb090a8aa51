//! Proper rotations of 3D space.

use std::ops::Mul;

use nalgebra::{Matrix3, Rotation3, Unit, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::{unit, Dir3, Result, Vec3};

/// Below this angle the rotation axis is treated as undefined.
const MIN_AXIS_ANGLE: f64 = 1e-12;

/// Order in which three Euler angles are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EulerConvention {
    /// `Rx(phi) * Ry(theta) * Rz(psi)`: `psi` about Z first, `phi` about X last.
    #[default]
    Zyx,
    /// `Rz(phi) * Rx(theta) * Rz(psi)`: classical proper Euler angles.
    Zxz,
}

/// A rotation stored as an orthonormal 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    matrix: Matrix3<f64>,
}

impl Rotation {
    /// The identity rotation.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            matrix: Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c),
        }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            matrix: Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c),
        }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            matrix: Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0),
        }
    }

    /// Rotation about `axis` by `angle` radians (right-handed).
    ///
    /// The axis is normalized; a zero axis is an error.
    pub fn from_axis_angle(axis: &Vec3, angle: f64) -> Result<Self> {
        Ok(Self::from_unit_axis(&unit(axis)?, angle))
    }

    /// Rotation about a unit axis by `angle` radians.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn from_unit_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        Self {
            matrix: Matrix3::new(
                t * x * x + c,
                t * x * y - s * z,
                t * x * z + s * y,
                t * x * y + s * z,
                t * y * y + c,
                t * y * z - s * x,
                t * x * z - s * y,
                t * y * z + s * x,
                t * z * z + c,
            ),
        }
    }

    /// Rotation from three Euler angles in radians.
    ///
    /// `psi` is applied first and `phi` last; see [`EulerConvention`] for
    /// the axes.
    pub fn from_euler(psi: f64, theta: f64, phi: f64, convention: EulerConvention) -> Self {
        match convention {
            EulerConvention::Zyx => {
                Self::rotation_x(phi) * Self::rotation_y(theta) * Self::rotation_z(psi)
            }
            EulerConvention::Zxz => {
                Self::rotation_z(phi) * Self::rotation_x(theta) * Self::rotation_z(psi)
            }
        }
    }

    /// Wrap a matrix the caller guarantees to be orthonormal.
    pub(crate) fn from_matrix_unchecked(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Rotate a vector.
    pub fn apply(&self, v: &Vec3) -> Vec3 {
        self.matrix * v
    }

    /// The inverse rotation (the transpose).
    pub fn inverse(&self) -> Self {
        Self {
            matrix: self.matrix.transpose(),
        }
    }

    /// Rotation angle in `[0, pi]`.
    pub fn angle(&self) -> f64 {
        let (imag, w) = self.half_angle_parts();
        2.0 * imag.norm().atan2(w)
    }

    /// Axis and angle of this rotation.
    ///
    /// Returns `None` when the angle is (numerically) zero and the axis is
    /// undefined.
    pub fn axis_angle(&self) -> Option<(Dir3, f64)> {
        let (imag, w) = self.half_angle_parts();
        let s = imag.norm();
        let angle = 2.0 * s.atan2(w);
        if angle <= MIN_AXIS_ANGLE {
            return None;
        }
        Some((Unit::new_unchecked(imag / s), angle))
    }

    /// Vector part and non-negative scalar part of the quaternion.
    fn half_angle_parts(&self) -> (Vec3, f64) {
        let q = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
            self.matrix,
        ));
        if q.scalar() >= 0.0 {
            (q.imag(), q.scalar())
        } else {
            (-q.imag(), -q.scalar())
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Rotation {
    type Output = Rotation;

    /// `(a * b).apply(v) == a.apply(&b.apply(v))`.
    fn mul(self, rhs: Rotation) -> Rotation {
        Rotation {
            matrix: self.matrix * rhs.matrix,
        }
    }
}
