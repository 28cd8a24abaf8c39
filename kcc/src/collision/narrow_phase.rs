use nalgebra as na;
use rapier3d::parry::{
    query::{self, ShapeCastOptions},
    shape as pshape,
};

use super::types::{Iso, StaticShape, SweepHit, Transform, Vec3};

/// Cast a moving shape against a single static shape and return the hit (if any).
///
/// - `shape_iso`: the moving shape's starting isometry in world space (identity rotation).
/// - `dir`: unit sweep direction; with a unit velocity the time of impact is the distance.
/// - `max_distance`: furthest distance to consider.
/// - `stop_at_penetration`: report a zero-distance hit when the sweep starts inside `target`.
///
/// The reported normal is the obstacle's outward normal (the negated normal on the moving shape).
pub fn cast_against_static(
    shape_iso: &Iso,
    shape: &dyn pshape::Shape,
    dir: Vec3,
    max_distance: f32,
    stop_at_penetration: bool,
    target: &StaticShape,
) -> Option<SweepHit> {
    let mut opts = ShapeCastOptions::with_max_time_of_impact(max_distance);
    opts.stop_at_penetration = stop_at_penetration;

    let zero = na::Vector3::zeros();
    let cast = |target_iso: &Iso, target_shape: &dyn pshape::Shape| {
        query::cast_shapes(
            shape_iso,
            &dir,
            shape,
            target_iso,
            &zero,
            target_shape,
            opts,
        )
    };

    let result = match *target {
        StaticShape::Plane { normal, dist } => {
            // Plane: a parry HalfSpace with world normal, positioned at normal * dist.
            let unit_n = na::Unit::try_new(normal, 1.0e-6)?;
            let plane = pshape::HalfSpace::new(unit_n);
            let plane_iso = Transform::from_translation(unit_n.into_inner() * dist).iso();
            cast(&plane_iso, &plane)
        }
        StaticShape::Cuboid {
            half_extents,
            transform,
        } => cast(&transform.iso(), &pshape::Cuboid::new(half_extents)),
        StaticShape::Sphere { radius, transform } => {
            // Rotation is irrelevant for a ball.
            let ball_iso = Transform::from_translation(transform.translation).iso();
            cast(&ball_iso, &pshape::Ball::new(radius))
        }
        StaticShape::Capsule {
            radius,
            half_height,
            transform,
        } => cast(
            &transform.iso(),
            &pshape::Capsule::new_y(half_height.max(0.0), radius),
        ),
    };

    let hit = result.ok().flatten()?;
    let distance = hit.time_of_impact;
    // normal1/witness1 are local to the moving shape, which is never rotated.
    let normal = -hit.normal1.into_inner();
    let point = shape_iso * hit.witness1 + dir * distance;

    if !distance.is_finite() || !normal.iter().all(|c| c.is_finite()) {
        return None;
    }

    Some(SweepHit {
        point: point.coords,
        normal,
        distance,
    })
}

/// Earliest hit across `targets`.
pub fn earliest_hit<'a>(
    shape_iso: &Iso,
    shape: &dyn pshape::Shape,
    dir: Vec3,
    max_distance: f32,
    stop_at_penetration: bool,
    targets: impl IntoIterator<Item = &'a StaticShape>,
) -> Option<SweepHit> {
    let mut best: Option<SweepHit> = None;
    for target in targets {
        if let Some(hit) =
            cast_against_static(shape_iso, shape, dir, max_distance, stop_at_penetration, target)
        {
            if best.as_ref().is_none_or(|b| hit.distance < b.distance) {
                best = Some(hit);
            }
        }
    }
    best
}
