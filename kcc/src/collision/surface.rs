//! Surface classification and leftover redirection math.
//!
//! Every helper here guards degenerate input: a direction that cannot be normalized contributes
//! zero instead of NaN, since a NaN displacement would stick to the character forever.

use super::{
    settings::{DIR_EPS_SQ, SLOPE_COS_EPS, SolverConfig},
    types::{SlidePass, SurfaceKind, Vec3, up},
};

/// Normalize `v`, or return zero if it is too short (or not finite).
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq > DIR_EPS_SQ && len_sq.is_finite() {
        v / len_sq.sqrt()
    } else {
        Vec3::zeros()
    }
}

/// Component of `v` orthogonal to the up axis.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    v - up() * v.dot(&up())
}

/// Component of `v` along the up axis.
#[inline]
pub fn vertical(v: Vec3) -> Vec3 {
    up() * v.dot(&up())
}

/// Angle between the up axis and `normal`, in degrees. Degenerate normals read as 90 (a wall).
pub fn angle_from_up_deg(normal: Vec3) -> f32 {
    let n = normalize_or_zero(normal);
    if n == Vec3::zeros() {
        return 90.0;
    }
    n.dot(&up()).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Floor or wall, inclusive at the slope limit.
///
/// Compared through cosines so a normal generated at exactly `max_slope_angle_deg` lands on the
/// floor side despite rounding.
#[inline]
pub fn classify_surface(unit_normal: Vec3, config: &SolverConfig) -> SurfaceKind {
    if unit_normal.dot(&up()) >= config.min_floor_cos() - SLOPE_COS_EPS {
        SurfaceKind::Floor
    } else {
        SurfaceKind::Wall
    }
}

/// Remove the component of `v` along `unit_normal`.
#[inline]
pub fn project_on_plane(v: Vec3, unit_normal: Vec3) -> Vec3 {
    v - unit_normal * v.dot(&unit_normal)
}

/// Project `v` onto the plane and restore its original length.
///
/// Used on floors so walking up or down a slope keeps the full leftover speed.
pub fn project_and_rescale(v: Vec3, unit_normal: Vec3) -> Vec3 {
    let magnitude = v.norm();
    normalize_or_zero(project_on_plane(v, unit_normal)) * magnitude
}

/// Wall deceleration relative to the pass's reference displacement.
///
/// `1 - dot(h(n), -h(reference))` over normalized horizontal components, clamped to
/// `[min_scale, 1]`. Running straight into a wall gives `min_scale`; grazing it gives ~1.
pub fn wall_slide_scale(normal: Vec3, reference: Vec3, min_scale: f32) -> f32 {
    let n = normalize_or_zero(horizontal(normal));
    let r = normalize_or_zero(horizontal(reference));
    let scale = 1.0 - n.dot(&-r);
    if scale.is_finite() {
        scale.clamp(min_scale, 1.0)
    } else {
        1.0
    }
}

/// Redirected leftover and the wall scale that was applied (1.0 on floors).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Redirect {
    pub leftover: Vec3,
    pub wall_scale: f32,
}

/// Redirect `leftover` along a contacted surface.
///
/// Floors (locomotion pass): projected on the plane, length preserved.
/// Walls, grounded locomotion: only the horizontal leftover slides against the horizontal
/// normal; the vertical leftover passes through so slopes and stairs stay stable.
/// Walls otherwise: the full leftover is projected on the hit plane.
///
/// The gravity-pass floor case never reaches here: it is a hard stop in the solver.
pub fn redirect_leftover(
    leftover: Vec3,
    unit_normal: Vec3,
    surface: SurfaceKind,
    pass: SlidePass,
    grounded: bool,
    reference: Vec3,
    config: &SolverConfig,
) -> Redirect {
    let redirect = match surface {
        SurfaceKind::Floor => Redirect {
            leftover: project_and_rescale(leftover, unit_normal),
            wall_scale: 1.0,
        },
        SurfaceKind::Wall => {
            let scale = wall_slide_scale(unit_normal, reference, config.min_wall_slide_scale);
            let slid = if grounded && pass == SlidePass::Locomotion {
                let wall_n = normalize_or_zero(horizontal(unit_normal));
                project_on_plane(horizontal(leftover), wall_n) * scale + vertical(leftover)
            } else {
                project_on_plane(leftover, unit_normal) * scale
            };
            Redirect {
                leftover: slid,
                wall_scale: scale,
            }
        }
    };

    if redirect.leftover.iter().all(|c| c.is_finite()) {
        redirect
    } else {
        log::debug!("non-finite leftover after redirection; dropping it");
        Redirect {
            leftover: Vec3::zeros(),
            ..redirect
        }
    }
}
