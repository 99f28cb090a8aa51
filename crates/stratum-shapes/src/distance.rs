//! Signed distance functions of the primitives in their local frames.
//!
//! Negative inside, positive outside, zero on the boundary.

use stratum_math::{Point3, Vec2, Vec3};

/// Signed distance to an origin-centred box.
pub fn cuboid_distance(p: &Point3, half_extents: &Vec3) -> f64 {
    let q = p.coords.abs() - half_extents;
    q.sup(&Vec3::zeros()).norm() + q.max().min(0.0)
}

/// Signed distance to an origin-centred sphere.
pub fn sphere_distance(p: &Point3, radius: f64) -> f64 {
    p.coords.norm() - radius
}

/// Signed distance to a capped cylinder around the Z axis.
///
/// The 2D box distance applied to `(radial distance, |z|)`.
pub fn cylinder_distance(p: &Point3, radius: f64, half_height: f64) -> f64 {
    let q = Vec2::new(p.xy().coords.norm(), p.z.abs()) - Vec2::new(radius, half_height);
    q.sup(&Vec2::zeros()).norm() + q.max().min(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_distance() {
        let h = Vec3::new(0.5, 0.5, 0.5);
        assert!((cuboid_distance(&Point3::origin(), &h) + 0.5).abs() < 1e-12);
        assert!((cuboid_distance(&Point3::new(2.0, 0.0, 0.0), &h) - 1.5).abs() < 1e-12);
        // Corner region is Euclidean
        let d = cuboid_distance(&Point3::new(1.5, 1.5, 0.0), &h);
        assert!((d - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(cuboid_distance(&Point3::new(0.5, 0.0, 0.0), &h), 0.0);
    }

    #[test]
    fn test_sphere_distance() {
        assert!((sphere_distance(&Point3::origin(), 1.0) + 1.0).abs() < 1e-12);
        assert!((sphere_distance(&Point3::new(0.0, 3.0, 4.0), 1.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_cylinder_distance() {
        assert!((cylinder_distance(&Point3::origin(), 1.0, 1.0) + 1.0).abs() < 1e-12);
        assert!((cylinder_distance(&Point3::new(1.0, 0.0, 2.0), 1.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((cylinder_distance(&Point3::new(3.0, 0.0, 0.0), 1.0, 5.0) - 2.0).abs() < 1e-12);
        // Rim region
        let d = cylinder_distance(&Point3::new(2.0, 0.0, 2.0), 1.0, 1.0);
        assert!((d - 2f64.sqrt()).abs() < 1e-12);
    }
}
