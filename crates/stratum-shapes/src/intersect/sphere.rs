//! Ray-sphere intersection (quadratic equation).

use stratum_math::Ray;

use super::{nearest_positive, solve_quadratic};

/// Intersect a ray with a sphere of `radius` centred at the origin.
pub fn intersect_sphere(ray: &Ray, radius: f64) -> f64 {
    let o = ray.origin.coords;
    let d = ray.direction;

    // Quadratic: |o + t*d|^2 = r^2
    let a = d.dot(&d);
    let b = 2.0 * o.dot(&d);
    let c = o.dot(&o) - radius * radius;

    match solve_quadratic(a, b, c) {
        Some((t0, t1)) => nearest_positive([t0, t1]),
        None => f64::INFINITY,
    }
}
