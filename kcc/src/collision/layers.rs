//! Collision layers used to filter sweeps.
//!
//! Every static collider carries a membership mask; a sweep only considers colliders whose
//! membership intersects the character's `SolverConfig::collision_mask`.

use crate::bitmask_flags::BitmaskFlags;
use crate::define_bitmask_flags;

define_bitmask_flags!(CollisionLayer, u32, {
    World,
    Terrain,
    Props,
    Characters,
    Triggers,
});

/// Layer mask over [`CollisionLayer`] bits.
pub type CollisionMask = BitmaskFlags<u32>;

/// Default membership for static level geometry.
#[inline]
pub fn world_mask() -> CollisionMask {
    CollisionMask::from_flags(&[CollisionLayer::World])
}

/// What a walking character collides with by default: everything solid, no triggers.
#[inline]
pub fn solid_mask() -> CollisionMask {
    CollisionMask::from_flags(&[
        CollisionLayer::World,
        CollisionLayer::Terrain,
        CollisionLayer::Props,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_mask_skips_triggers() {
        let solid = solid_mask();
        assert!(solid.intersects(&world_mask()));
        assert!(!solid.intersects(&CollisionMask::from_flags(&[CollisionLayer::Triggers])));
    }
}
