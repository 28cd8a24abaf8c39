//! Kinematic capsule collide-and-slide.
//!
//! - [`collision`]: ground probe, collide-and-slide solver, and the `SpatialQuery` seam with a
//!   parry-backed static world.
//! - [`rapier_world`]: a `SpatialQuery` over a Rapier scene.
//! - [`motor`]: per-character tick driver running the locomotion and gravity passes.

pub mod bitmask_flags;
pub mod collision;
pub mod motor;
pub mod rapier_world;

pub use collision::{
    CapsuleSpec, CollisionLayer, CollisionMask, ConfigError, GroundProbe, QueryError,
    SlidePass, SlideRequest, SlideResult, SolverConfig, SpatialQuery, StaticCollider,
    StaticShape, StaticWorld, SurfaceKind, SweepHit, Vec3, collide_and_slide, is_grounded,
    probe_ground, solve,
};
pub use motor::{CharacterMotor, MotorTick};
pub use rapier_world::{ColliderShapeDef, RapierQueryWorld, WorldStaticDef};
