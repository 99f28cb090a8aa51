//! Ray-primitive intersection in the primitive's local frame.
//!
//! Every routine returns the smallest strictly positive ray parameter at
//! which the ray crosses the primitive's boundary, or `f64::INFINITY` when
//! there is none. Rays need not have unit directions; the returned value is
//! always in the ray's own parametrization.

mod cuboid;
mod cylinder;
mod sphere;

pub use cuboid::intersect_cuboid;
pub use cylinder::intersect_cylinder;
pub use sphere::intersect_sphere;

/// Real roots of `a t^2 + b t + c = 0`, sorted ascending.
///
/// Uses the cancellation-free form `q = -(b + sign(b) sqrt(disc)) / 2`,
/// `t0 = q / a`, `t1 = c / q`.
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a == 0.0 {
        if b == 0.0 {
            return None;
        }
        let t = -c / b;
        return Some((t, t));
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    if q == 0.0 {
        // b == 0 and c == 0: double root at the origin
        return Some((0.0, 0.0));
    }
    let (t0, t1) = (q / a, c / q);
    Some(if t0 <= t1 { (t0, t1) } else { (t1, t0) })
}

/// Smallest strictly positive candidate, or infinity.
pub(crate) fn nearest_positive(candidates: impl IntoIterator<Item = f64>) -> f64 {
    candidates
        .into_iter()
        .filter(|t| *t > 0.0)
        .fold(f64::INFINITY, f64::min)
}
