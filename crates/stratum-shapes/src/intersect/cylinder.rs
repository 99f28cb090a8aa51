//! Ray-cylinder intersection (radial quadratic plus end caps).

use stratum_math::Ray;

use super::solve_quadratic;

/// Intersect a ray with a capped cylinder of `radius` around the local Z
/// axis, spanning `z` in `[-half_height, half_height]`.
pub fn intersect_cylinder(ray: &Ray, radius: f64, half_height: f64) -> f64 {
    let o = ray.origin;
    let d = ray.direction;
    let r2 = radius * radius;
    let mut best = f64::INFINITY;

    // Lateral surface: (ox + t dx)^2 + (oy + t dy)^2 = r^2
    let a = d.x * d.x + d.y * d.y;
    if a > 0.0 {
        let b = 2.0 * (o.x * d.x + o.y * d.y);
        let c = o.x * o.x + o.y * o.y - r2;
        if let Some((t0, t1)) = solve_quadratic(a, b, c) {
            for t in [t0, t1] {
                if t > 0.0 && t < best && (o.z + t * d.z).abs() <= half_height {
                    best = t;
                }
            }
        }
    }

    // End caps
    if d.z != 0.0 {
        for cap in [-half_height, half_height] {
            let t = (cap - o.z) / d.z;
            if t > 0.0 && t < best {
                let x = o.x + t * d.x;
                let y = o.y + t * d.y;
                if x * x + y * y <= r2 {
                    best = t;
                }
            }
        }
    }

    best
}
