use nalgebra as na;

use super::{
    query::SpatialQuery,
    settings::{DIR_EPS_SQ, MIN_MOVE_SQ, SolverConfig, ZERO_MOVE_SQ},
    surface::{classify_surface, normalize_or_zero, redirect_leftover},
    types::{
        CapsuleSpec, SlideContact, SlidePass, SlideRequest, SlideResult, SurfaceKind, Vec3,
    },
};

/// Collide-and-slide for a capsule against whatever `query` exposes.
///
/// Algorithm (one bounce per iteration, bounded by `config.max_bounce_depth`):
/// - Sweep the capsule along the remaining displacement for `|d| + skin`.
/// - No hit: the remaining displacement is free; done.
/// - Hit: keep the snap (`d̂ * max(0, distance - skin)`, zeroed when within one skin of the
///   surface) and redirect the leftover along the surface:
///   - floor on the gravity pass: hard stop, the leftover is dropped;
///   - floor on the locomotion pass: slide along the plane at full leftover length;
///   - wall: slide along the wall, decelerated by the wall scale.
/// - Bounce limit reached with motion left: the remainder is discarded.
///
/// Query failures are logged and treated as "no hit". The returned displacement is finite and
/// never longer than the requested one.
pub fn collide_and_slide<Q: SpatialQuery + ?Sized>(
    query: &Q,
    capsule: &CapsuleSpec,
    config: &SolverConfig,
    req: SlideRequest,
) -> SlideResult {
    let mut result = SlideResult::zero();
    let mut pos = req.origin;
    let mut remaining = req.displacement;

    if !remaining.iter().all(|c| c.is_finite()) || !pos.iter().all(|c| c.is_finite()) {
        log::warn!(
            "rejecting non-finite slide request (origin {:?}, displacement {:?})",
            req.origin,
            req.displacement
        );
        return result;
    }

    let mut depth = 0;
    loop {
        // Zero request, or a leftover too short to be worth another bounce.
        let min_sq = if depth == 0 { ZERO_MOVE_SQ } else { MIN_MOVE_SQ };
        if remaining.norm_squared() <= min_sq {
            break;
        }

        if depth >= config.max_bounce_depth {
            log::trace!(
                "bounce limit {} reached, discarding {:?}",
                config.max_bounce_depth,
                remaining
            );
            result.truncated = true;
            break;
        }

        let len = remaining.norm();
        let dir = na::Unit::new_unchecked(remaining / len);

        result.sweeps += 1;
        let hit = match query.sweep_capsule(
            capsule,
            pos,
            dir,
            len + config.skin_width,
            config.collision_mask,
        ) {
            Ok(hit) => hit,
            Err(err) => {
                log::warn!("slide sweep failed, treating as unobstructed: {err}");
                None
            }
        };

        let Some(hit) = hit else {
            // No hit: move fully and finish.
            result.displacement += remaining;
            break;
        };
        result.bounces += 1;

        // Travel up to the contact point (minus skin).
        let distance = hit.distance.min(len + config.skin_width);
        let mut snap = dir.into_inner() * (distance - config.skin_width).max(0.0);
        if snap.norm() <= config.skin_width {
            snap = Vec3::zeros();
        }
        let leftover = remaining - snap;
        result.displacement += snap;
        pos += snap;

        let normal = normalize_or_zero(hit.normal);
        if normal.norm_squared() <= DIR_EPS_SQ {
            log::debug!("sweep hit without a usable normal, stopping after snap");
            break;
        }

        let surface = classify_surface(normal, config);
        if surface == SurfaceKind::Floor && req.pass == SlidePass::Gravity {
            // Gravity never slides across a floor: it rests on it.
            result.last_contact = Some(SlideContact {
                hit,
                surface,
                wall_scale: 1.0,
                redirected: Vec3::zeros(),
            });
            break;
        }

        let redirect = redirect_leftover(
            leftover,
            normal,
            surface,
            req.pass,
            req.grounded,
            req.reference_displacement,
            config,
        );
        result.last_contact = Some(SlideContact {
            hit,
            surface,
            wall_scale: redirect.wall_scale,
            redirected: redirect.leftover,
        });

        remaining = redirect.leftover;
        depth += 1;
    }

    if !result.displacement.iter().all(|c| c.is_finite()) {
        log::warn!("slide produced a non-finite displacement; discarding this pass");
        result.displacement = Vec3::zeros();
    }
    result
}

/// Only the adjusted displacement of [`collide_and_slide`].
#[inline]
pub fn solve<Q: SpatialQuery + ?Sized>(
    query: &Q,
    capsule: &CapsuleSpec,
    config: &SolverConfig,
    req: SlideRequest,
) -> Vec3 {
    collide_and_slide(query, capsule, config, req).displacement
}
