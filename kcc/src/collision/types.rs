/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the spatial query seam (`query`) and its implementations (static world, rapier world)
- the ground probe
- the collide-and-slide solver
- the character motor

Conventions
- Units are meters.
- +Y is up. Capsules are Y-aligned and anchored at the feet (the pivot).
*/

use nalgebra as na;

use super::error::ConfigError;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;
pub type UnitVec3 = na::Unit<Vec3>;

/// World up axis.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// A rigid transform (isometry) in world space.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity())
    }

    /// Convert to nalgebra `Isometry3` for use with parry narrow-phase queries.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }
}

/// Static collision shapes supported by [`StaticWorld`](super::static_world::StaticWorld).
///
/// - Plane: infinite plane in world-space represented by its normal and offset (dist)
///          satisfying: normal ⋅ x = dist. Everything behind the plane is solid.
/// - Cuboid: oriented box with half-extents in local space, placed by `transform`.
#[derive(Clone, Copy, Debug)]
pub enum StaticShape {
    Plane {
        /// World-space unit normal of the plane.
        normal: Vec3,
        /// Plane offset along the normal, i.e., normal ⋅ x = dist.
        dist: f32,
    },
    Cuboid {
        /// Local-space half-extents (hx, hy, hz).
        half_extents: Vec3,
        /// World-space pose of the cuboid.
        transform: Transform,
    },
    Sphere {
        /// Radius of the sphere in meters.
        radius: f32,
        /// World-space pose (translation used; rotation ignored).
        transform: Transform,
    },
    Capsule {
        /// Radius of the spherical caps and cylinder.
        radius: f32,
        /// Half of the cylinder length along the local +Y axis.
        half_height: f32,
        /// World-space pose of the capsule.
        transform: Transform,
    },
}

/// The character's collision volume: a vertical cylinder with hemispherical caps.
///
/// `height` is the full tip-to-tip height, so the cylinder section is
/// `height - 2 * radius` long. The pivot is the lowest point of the capsule (the feet).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapsuleSpec {
    pub radius: f32,
    pub height: f32,
}

impl CapsuleSpec {
    /// Build a validated capsule (`radius > 0`, `height >= 2 * radius`).
    pub fn new(radius: f32, height: f32) -> Result<Self, ConfigError> {
        let capsule = Self { radius, height };
        capsule.validate()?;
        Ok(capsule)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::CapsuleRadius(self.radius));
        }
        if !self.height.is_finite() || self.height < 2.0 * self.radius {
            return Err(ConfigError::CapsuleHeight {
                radius: self.radius,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Half-length of the cylinder section (distance from the capsule center to either
    /// hemisphere center).
    #[inline]
    pub fn half_segment(&self) -> f32 {
        (0.5 * self.height - self.radius).max(0.0)
    }

    /// Capsule center relative to the pivot.
    #[inline]
    pub fn center_offset(&self) -> Vec3 {
        up() * (0.5 * self.height)
    }

    /// Center of the bottom hemisphere relative to the pivot.
    #[inline]
    pub fn base_sphere_offset(&self) -> Vec3 {
        up() * self.radius
    }

    /// Center of the top hemisphere relative to the pivot.
    #[inline]
    pub fn top_sphere_offset(&self) -> Vec3 {
        up() * (self.height - self.radius)
    }

    /// Point on the capsule surface furthest along `dir`, for a capsule whose pivot is at `pivot`.
    ///
    /// Used to report an approximate contact point from a time-of-impact result.
    pub fn support_point(&self, pivot: Vec3, dir: Vec3) -> Vec3 {
        let sphere_center = if dir.y >= 0.0 {
            pivot + self.top_sphere_offset()
        } else {
            pivot + self.base_sphere_offset()
        };
        let len_sq = dir.norm_squared();
        if len_sq <= 1.0e-12 {
            return sphere_center;
        }
        sphere_center + dir * (self.radius / len_sq.sqrt())
    }
}

/// Result of a single sweep that hit something.
///
/// "No hit" is represented by `None` at the query seam, so a `SweepHit` is always fully defined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit {
    /// World-space contact point.
    pub point: Vec3,
    /// World-space outward surface normal (unit length, opposing the sweep direction).
    pub normal: Vec3,
    /// Distance travelled along the sweep direction before first contact (meters).
    pub distance: f32,
}

/// Which of the two per-tick solver invocations a request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlidePass {
    /// Horizontal locomotion displacement. Floors redirect the leftover.
    Locomotion,
    /// Accumulated fall displacement. Floors are a hard stop.
    Gravity,
}

/// Classification of a contacted surface relative to the up axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Within the walkable slope limit.
    Floor,
    /// Steeper than the walkable slope limit.
    Wall,
}

/// One solver pass request.
///
/// `reference_displacement` is the displacement the pass started with. It stays fixed for the
/// whole pass so wall deceleration is always measured against the intended direction.
#[derive(Clone, Copy, Debug)]
pub struct SlideRequest {
    /// Pivot position before this pass.
    pub origin: Vec3,
    /// Desired displacement for this pass (meters, already multiplied by dt).
    pub displacement: Vec3,
    pub pass: SlidePass,
    pub reference_displacement: Vec3,
    /// Grounded flag from this tick's ground probe.
    pub grounded: bool,
}

impl SlideRequest {
    #[inline]
    pub fn locomotion(origin: Vec3, displacement: Vec3, grounded: bool) -> Self {
        Self {
            origin,
            displacement,
            pass: SlidePass::Locomotion,
            reference_displacement: displacement,
            grounded,
        }
    }

    #[inline]
    pub fn gravity(origin: Vec3, displacement: Vec3) -> Self {
        Self {
            origin,
            displacement,
            pass: SlidePass::Gravity,
            reference_displacement: displacement,
            grounded: false,
        }
    }
}

/// The contact that produced the last redirection of a pass.
#[derive(Clone, Copy, Debug)]
pub struct SlideContact {
    pub hit: SweepHit,
    pub surface: SurfaceKind,
    /// Wall deceleration applied to the leftover (1.0 for floors).
    pub wall_scale: f32,
    /// Leftover after redirection along the surface (zero on a gravity floor stop).
    pub redirected: Vec3,
}

/// Result of one collide-and-slide pass.
#[derive(Clone, Copy, Debug)]
pub struct SlideResult {
    /// Achievable displacement for this pass. Always finite.
    pub displacement: Vec3,
    /// Number of sweeps that reported a hit.
    pub bounces: u32,
    /// Number of sweeps issued.
    pub sweeps: u32,
    /// True if the bounce limit discarded unresolved motion.
    pub truncated: bool,
    pub last_contact: Option<SlideContact>,
}

impl SlideResult {
    #[inline]
    pub fn zero() -> Self {
        Self {
            displacement: Vec3::zeros(),
            bounces: 0,
            sweeps: 0,
            truncated: false,
            last_contact: None,
        }
    }
}
