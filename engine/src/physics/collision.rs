//! Collision primitives
//!
//! Slab-method ray/AABB tests (3D and on the XZ plane) and point/line
//! distances. Callers pass a precomputed inverse direction so a projectile can
//! test many boxes without redoing the divisions.
//!
//! # Example
//!
//! ```ignore
//! use voxel_ballistics::physics::collision::{inverse_direction, ray_aabb_intersect};
//! use glam::Vec3;
//!
//! let origin = Vec3::new(0.0, 0.0, -5.0);
//! let inv_dir = inverse_direction(Vec3::Z);
//! if let Some(t) = ray_aabb_intersect(origin, inv_dir, Vec3::splat(-1.0), Vec3::splat(1.0)) {
//!     let hit_point = origin + Vec3::Z * t;
//! }
//! ```

use glam::{Vec2, Vec3};

/// Component-wise `1 / dir`, with zero components mapped to `f32::MAX`.
///
/// `f32::MAX` rather than infinity keeps `0 * inv` finite when the origin lies
/// exactly on a slab plane.
pub fn inverse_direction(dir: Vec3) -> Vec3 {
    Vec3::new(inv_or_max(dir.x), inv_or_max(dir.y), inv_or_max(dir.z))
}

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v != 0.0 { 1.0 / v } else { f32::MAX }
}

/// Ray-AABB intersection using the slab method.
///
/// # Arguments
///
/// * `ray_origin` - Starting point of the ray
/// * `inv_dir` - Inverse ray direction from [`inverse_direction`]
/// * `aabb_min` - Minimum corner of the AABB
/// * `aabb_max` - Maximum corner of the AABB
///
/// # Returns
///
/// * `Some(t)` - Entry distance along the ray, clamped to 0 when the origin is inside
/// * `None` - The ray misses or the box is entirely behind the origin
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    inv_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    let t1 = (aabb_min.x - ray_origin.x) * inv_dir.x;
    let t2 = (aabb_max.x - ray_origin.x) * inv_dir.x;

    let mut t_min = t1.min(t2);
    let mut t_max = t1.max(t2);

    let t3 = (aabb_min.y - ray_origin.y) * inv_dir.y;
    let t4 = (aabb_max.y - ray_origin.y) * inv_dir.y;

    t_min = t_min.max(t3.min(t4));
    t_max = t_max.min(t3.max(t4));

    let t5 = (aabb_min.z - ray_origin.z) * inv_dir.z;
    let t6 = (aabb_max.z - ray_origin.z) * inv_dir.z;

    t_min = t_min.max(t5.min(t6));
    t_max = t_max.min(t5.max(t6));

    if t_max < 0.0 || t_min > t_max {
        return None;
    }

    Some(t_min.max(0.0))
}

/// Slab test on the XZ plane.
///
/// `origin` and `inv_dir` hold (x, z) in their x/y lanes. Returns the entry
/// distance, clamped to 0.
pub fn ray_aabb_intersect_2d(origin: Vec2, inv_dir: Vec2, min: Vec2, max: Vec2) -> Option<f32> {
    let t1 = (min.x - origin.x) * inv_dir.x;
    let t2 = (max.x - origin.x) * inv_dir.x;
    let t3 = (min.y - origin.y) * inv_dir.y;
    let t4 = (max.y - origin.y) * inv_dir.y;

    let t_min = t1.min(t2).max(t3.min(t4));
    let t_max = t1.max(t2).min(t3.max(t4));

    if t_max < 0.0 || t_min > t_max {
        return None;
    }

    Some(t_min.max(0.0))
}

/// Perpendicular distance from `point` to the infinite line through `a` along
/// unit direction `n`, together with the signed distance along the line.
pub fn point_line_distance(point: Vec3, a: Vec3, n: Vec3) -> (f32, f32) {
    let pa = point - a;
    let along = pa.dot(n);
    let perp = pa - n * along;
    (perp.length(), along)
}
