use super::{
    error::QueryError,
    layers::CollisionMask,
    types::{CapsuleSpec, SweepHit, UnitVec3, Vec3},
};

/// Shape sweeps against scene geometry.
///
/// The solver and ground probe only ever talk to the scene through this trait, so they can be
/// driven by the built-in [`StaticWorld`](super::static_world::StaticWorld), the rapier-backed
/// [`RapierQueryWorld`](crate::rapier_world::RapierQueryWorld), or a scripted fake in tests.
///
/// Implementations must be side-effect free from the caller's perspective. Returned normals are
/// unit length and oppose the sweep direction.
pub trait SpatialQuery {
    /// Sweep a Y-aligned capsule whose pivot (feet) is at `origin` along `direction`.
    ///
    /// Returns the first hit within `max_distance` against colliders whose membership
    /// intersects `mask`.
    fn sweep_capsule(
        &self,
        capsule: &CapsuleSpec,
        origin: Vec3,
        direction: UnitVec3,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Result<Option<SweepHit>, QueryError>;

    /// Sweep a sphere centered at `origin` straight down.
    fn sweep_sphere_down(
        &self,
        origin: Vec3,
        radius: f32,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Result<Option<SweepHit>, QueryError>;
}

impl<Q: SpatialQuery + ?Sized> SpatialQuery for &Q {
    fn sweep_capsule(
        &self,
        capsule: &CapsuleSpec,
        origin: Vec3,
        direction: UnitVec3,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Result<Option<SweepHit>, QueryError> {
        (**self).sweep_capsule(capsule, origin, direction, max_distance, mask)
    }

    fn sweep_sphere_down(
        &self,
        origin: Vec3,
        radius: f32,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Result<Option<SweepHit>, QueryError> {
        (**self).sweep_sphere_down(origin, radius, max_distance, mask)
    }
}

/// Reject sweeps whose inputs would poison a narrow-phase query.
pub(crate) fn check_sweep_input(origin: Vec3, max_distance: f32) -> Result<(), QueryError> {
    if !origin.iter().all(|c| c.is_finite()) {
        return Err(QueryError::InvalidInput("non-finite origin"));
    }
    if !max_distance.is_finite() || max_distance < 0.0 {
        return Err(QueryError::InvalidInput("max distance must be finite and >= 0"));
    }
    Ok(())
}
