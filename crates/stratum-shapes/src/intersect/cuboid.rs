//! Ray-box intersection (slab method).

use stratum_math::{Ray, Vec3};

/// Intersect a ray with an axis-aligned box centred at the origin.
///
/// Returns the entry parameter when the box is ahead of the ray, the exit
/// parameter when the origin is inside, and infinity otherwise. Axes along
/// which the ray does not move are handled without dividing by zero.
pub fn intersect_cuboid(ray: &Ray, half_extents: &Vec3) -> f64 {
    let mut t_min = f64::NEG_INFINITY;
    let mut t_max = f64::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        let h = half_extents[axis];

        if d == 0.0 {
            // Parallel to this slab: either always inside it or never
            if o < -h || o > h {
                return f64::INFINITY;
            }
            continue;
        }

        let inv = 1.0 / d;
        let t1 = (-h - o) * inv;
        let t2 = (h - o) * inv;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }

    if t_max < t_min {
        f64::INFINITY
    } else if t_min > 0.0 {
        t_min
    } else if t_max > 0.0 {
        t_max
    } else {
        f64::INFINITY
    }
}
