use nalgebra as na;
use rapier3d::parry::{bounding_volume::Aabb, shape as pshape};

use super::types::{Iso, StaticShape, Transform, Vec3};

/// Broad-phase over immutable world statics.
///
/// Notes:
/// - Finite shapes (Cuboid, Sphere, Capsule) are stored as world-space AABBs and scanned linearly
///   to generate candidates. Planes are kept apart because they are infinite.
/// - `finite_indices` maps each stored AABB back to its index in the original statics slice.
/// - `plane_indices` stores indices of planes in the original statics slice.
#[derive(Clone, Debug, Default)]
pub struct WorldAccel {
    pub aabbs: Vec<Aabb>,
    pub finite_indices: Vec<usize>,
    pub plane_indices: Vec<usize>,
}

impl WorldAccel {
    /// Build over `shapes` (indices refer to this slice).
    pub fn build<'a>(shapes: impl IntoIterator<Item = &'a StaticShape>) -> Self {
        let mut accel = Self::default();
        for (i, s) in shapes.into_iter().enumerate() {
            match *s {
                StaticShape::Plane { .. } => accel.plane_indices.push(i),
                _ => {
                    if let Some(aabb) = static_aabb_world(s) {
                        accel.aabbs.push(aabb);
                        accel.finite_indices.push(i);
                    }
                }
            }
        }
        accel
    }

    /// True if this accelerator has no finite entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.finite_indices.is_empty()
    }

    /// Number of finite entries (AABBs).
    #[inline]
    pub fn len(&self) -> usize {
        self.finite_indices.len()
    }

    /// Indices of every static that may touch `swept`: all planes, then finite shapes whose
    /// AABB overlaps.
    pub fn candidates<'a>(&'a self, swept: &'a Aabb) -> impl Iterator<Item = usize> + 'a {
        self.plane_indices.iter().copied().chain(
            self.aabbs
                .iter()
                .zip(self.finite_indices.iter())
                .filter(move |(aabb, _)| aabb_intersects(aabb, swept))
                .map(|(_, &i)| i),
        )
    }
}

/// World-space AABB of a finite static shape; `None` for planes or degenerate dimensions.
fn static_aabb_world(shape: &StaticShape) -> Option<Aabb> {
    match *shape {
        StaticShape::Plane { .. } => None,
        StaticShape::Cuboid {
            half_extents,
            transform,
        } => {
            if half_extents.iter().any(|h| !h.is_finite() || *h < 0.0) {
                return None;
            }
            Some(pshape::Cuboid::new(half_extents).aabb(&transform.iso()))
        }
        StaticShape::Sphere { radius, transform } => {
            if !radius.is_finite() || radius <= 0.0 {
                return None;
            }
            let iso = Transform::from_translation(transform.translation).iso();
            Some(pshape::Ball::new(radius).aabb(&iso))
        }
        StaticShape::Capsule {
            radius,
            half_height,
            transform,
        } => {
            if !radius.is_finite() || radius <= 0.0 || !half_height.is_finite() {
                return None;
            }
            Some(pshape::Capsule::new_y(half_height.max(0.0), radius).aabb(&transform.iso()))
        }
    }
}

/// Swept AABB of `shape` moving from `start` by `motion`, inflated by `margin`.
pub fn swept_aabb(shape: &dyn pshape::Shape, start: &Iso, motion: Vec3, margin: f32) -> Aabb {
    let end = Iso::from_parts(
        na::Translation3::from(start.translation.vector + motion),
        start.rotation,
    );
    let swept = aabb_union(&shape.compute_aabb(start), &shape.compute_aabb(&end));
    aabb_inflate(&swept, margin)
}

/// Compute the union of two AABBs.
fn aabb_union(a: &Aabb, b: &Aabb) -> Aabb {
    let min = na::Point3::new(
        a.mins.x.min(b.mins.x),
        a.mins.y.min(b.mins.y),
        a.mins.z.min(b.mins.z),
    );
    let max = na::Point3::new(
        a.maxs.x.max(b.maxs.x),
        a.maxs.y.max(b.maxs.y),
        a.maxs.z.max(b.maxs.z),
    );
    Aabb::new(min, max)
}

/// Inflate an AABB by `margin` on all sides.
fn aabb_inflate(a: &Aabb, margin: f32) -> Aabb {
    if margin <= 0.0 {
        return *a;
    }
    let delta = na::Vector3::new(margin, margin, margin);
    Aabb::new(a.mins - delta, a.maxs + delta)
}

/// Test two AABBs for intersection.
fn aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    !(a.maxs.x < b.mins.x
        || a.mins.x > b.maxs.x
        || a.maxs.y < b.mins.y
        || a.mins.y > b.maxs.y
        || a.maxs.z < b.mins.z
        || a.mins.z > b.maxs.z)
}
