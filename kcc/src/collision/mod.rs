/*!
Collision root module.

This module implements the kinematic character controller (KCC) core: a capsule
collide-and-slide solver plus the ground probe it depends on. Scene geometry is reached only
through the [`SpatialQuery`] trait. The code is split for clarity:

- types:        shared data types (CapsuleSpec, SweepHit, SlideRequest, SlideResult, etc.)
- settings:     tuning constants and the immutable `SolverConfig`
- layers:       collision layers and masks
- error:        configuration and query errors
- query:        the `SpatialQuery` seam
- surface:      slope classification and leftover redirection math
- ground:       downward ground probe
- slide:        collide-and-slide solver
- broad:        broad-phase helpers (swept AABBs, candidate queries)
- narrow_phase: thin wrappers over parry shape casts
- static_world: `SpatialQuery` over a list of static shapes
*/

pub mod broad;
pub mod error;
pub mod ground;
pub mod layers;
pub mod narrow_phase;
pub mod query;
pub mod settings;
pub mod slide;
pub mod static_world;
pub mod surface;
pub mod types;

// Re-export commonly used types and functions.
pub use error::{ConfigError, QueryError};
pub use ground::{GroundProbe, is_grounded, probe_ground};
pub use layers::{CollisionLayer, CollisionMask, solid_mask, world_mask};
pub use query::SpatialQuery;
pub use settings::SolverConfig;
pub use slide::{collide_and_slide, solve};
pub use static_world::{StaticCollider, StaticWorld};
pub use types::{
    CapsuleSpec, Iso, Quat, SlideContact, SlidePass, SlideRequest, SlideResult, StaticShape,
    SurfaceKind, SweepHit, Transform, UnitVec3, Vec3,
};

/// Convenience: build a `StaticShape::Plane` from a world-space plane pose:
/// - normal = rotation * +Y
/// - dist = dot(normal, translation) + optional offset
#[inline]
pub fn plane_from_pose(rotation: Quat, translation: Vec3, offset_along_normal: f32) -> StaticShape {
    let normal = rotation * Vec3::new(0.0, 1.0, 0.0);
    let dist = normal.dot(&translation) + offset_along_normal;
    StaticShape::Plane { normal, dist }
}

/// Convenience: build a `StaticShape::Cuboid` with given half extents and pose.
#[inline]
pub fn cuboid_from_pose(half_extents: Vec3, translation: Vec3, rotation: Quat) -> StaticShape {
    StaticShape::Cuboid {
        half_extents,
        transform: Transform {
            translation,
            rotation,
        },
    }
}
