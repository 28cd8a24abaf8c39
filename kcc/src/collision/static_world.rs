use rapier3d::parry::shape as pshape;

use super::{
    broad::{WorldAccel, swept_aabb},
    error::QueryError,
    layers::{CollisionMask, world_mask},
    narrow_phase,
    query::{SpatialQuery, check_sweep_input},
    types::{CapsuleSpec, StaticShape, SweepHit, Transform, UnitVec3, Vec3},
};

/// A static collider with its layer membership.
#[derive(Clone, Copy, Debug)]
pub struct StaticCollider {
    pub shape: StaticShape,
    pub layers: CollisionMask,
}

impl StaticCollider {
    /// Collider on the default world layer.
    #[inline]
    pub fn world(shape: StaticShape) -> Self {
        Self {
            shape,
            layers: world_mask(),
        }
    }

    #[inline]
    pub fn with_layers(mut self, layers: CollisionMask) -> Self {
        self.layers = layers;
        self
    }
}

/// Immutable world of static shapes answering [`SpatialQuery`] sweeps with parry shape casts.
///
/// Built once; queries take `&self` and touch no shared mutable state, so one world can serve
/// many characters in parallel.
#[derive(Clone, Debug, Default)]
pub struct StaticWorld {
    colliders: Vec<StaticCollider>,
    accel: WorldAccel,
}

impl StaticWorld {
    pub fn new(colliders: Vec<StaticCollider>) -> Self {
        let accel = WorldAccel::build(colliders.iter().map(|c| &c.shape));
        log::debug!(
            "static world built: {} finite shapes, {} planes",
            accel.len(),
            accel.plane_indices.len()
        );
        Self { colliders, accel }
    }

    #[inline]
    pub fn colliders(&self) -> &[StaticCollider] {
        &self.colliders
    }

    fn sweep(
        &self,
        shape: &dyn pshape::Shape,
        center: Vec3,
        dir: Vec3,
        max_distance: f32,
        mask: CollisionMask,
        stop_at_penetration: bool,
    ) -> Option<SweepHit> {
        let iso = Transform::from_translation(center).iso();
        let swept = swept_aabb(shape, &iso, dir * max_distance, 0.0);
        let targets = self
            .accel
            .candidates(&swept)
            .map(|i| &self.colliders[i])
            .filter(|c| c.layers.intersects(&mask))
            .map(|c| &c.shape);
        narrow_phase::earliest_hit(&iso, shape, dir, max_distance, stop_at_penetration, targets)
    }
}

impl SpatialQuery for StaticWorld {
    fn sweep_capsule(
        &self,
        capsule: &CapsuleSpec,
        origin: Vec3,
        direction: UnitVec3,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Result<Option<SweepHit>, QueryError> {
        check_sweep_input(origin, max_distance)?;
        capsule
            .validate()
            .map_err(|_| QueryError::InvalidInput("invalid capsule"))?;

        let shape = pshape::Capsule::new_y(capsule.half_segment(), capsule.radius);
        // Contacts we are already inside of and moving away from are ignored.
        Ok(self.sweep(
            &shape,
            origin + capsule.center_offset(),
            direction.into_inner(),
            max_distance,
            mask,
            false,
        ))
    }

    fn sweep_sphere_down(
        &self,
        origin: Vec3,
        radius: f32,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Result<Option<SweepHit>, QueryError> {
        check_sweep_input(origin, max_distance)?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(QueryError::InvalidInput("sphere radius must be > 0"));
        }

        // A probe that starts inside the ground still counts as support.
        Ok(self.sweep(
            &pshape::Ball::new(radius),
            origin,
            -Vec3::y(),
            max_distance,
            mask,
            true,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{
        ground::is_grounded,
        layers::{CollisionLayer, solid_mask},
        settings::SolverConfig,
        slide::collide_and_slide,
        types::{SlideRequest, SurfaceKind},
    };

    fn capsule() -> CapsuleSpec {
        CapsuleSpec::new(0.3, 1.8).unwrap()
    }

    fn ground() -> StaticCollider {
        StaticCollider::world(StaticShape::Plane {
            normal: Vec3::y(),
            dist: 0.0,
        })
    }

    /// A wall whose -X face sits at `x`.
    fn wall_at(x: f32) -> StaticCollider {
        StaticCollider::world(StaticShape::Cuboid {
            half_extents: Vec3::new(0.5, 5.0, 20.0),
            transform: Transform::from_translation(Vec3::new(x + 0.5, 5.0, 0.0)),
        })
    }

    #[test]
    fn capsule_sweep_reports_distance_and_outward_normal() {
        let world = StaticWorld::new(vec![ground(), wall_at(2.0)]);
        let hit = world
            .sweep_capsule(
                &capsule(),
                Vec3::new(0.0, 0.05, 0.0),
                UnitVec3::new_normalize(Vec3::x()),
                5.0,
                CollisionMask::all(),
            )
            .unwrap()
            .unwrap();
        // Capsule surface starts 0.3 from the pivot axis.
        assert!((hit.distance - 1.7).abs() < 1.0e-3);
        assert!((hit.normal + Vec3::x()).norm() < 1.0e-3);
        assert!((hit.point.x - 2.0).abs() < 1.0e-3);
    }

    #[test]
    fn colliders_keep_their_insertion_order() {
        let world = StaticWorld::new(vec![ground(), wall_at(1.0)]);
        let colliders = world.colliders();
        assert_eq!(colliders.len(), 2);
        assert!(matches!(colliders[0].shape, StaticShape::Plane { .. }));
        assert!(matches!(colliders[1].shape, StaticShape::Cuboid { .. }));
        assert_eq!(colliders[1].layers, world_mask());
    }

    #[test]
    fn masked_out_layers_are_invisible() {
        let trigger = wall_at(1.0).with_layers(CollisionMask::from_flags(&[CollisionLayer::Triggers]));
        let world = StaticWorld::new(vec![trigger]);
        let hit = world
            .sweep_capsule(
                &capsule(),
                Vec3::new(0.0, 0.05, 0.0),
                UnitVec3::new_normalize(Vec3::x()),
                5.0,
                solid_mask(),
            )
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn invalid_inputs_are_errors() {
        let world = StaticWorld::new(vec![ground()]);
        assert!(world
            .sweep_sphere_down(Vec3::new(f32::NAN, 0.0, 0.0), 0.3, 1.0, CollisionMask::all())
            .is_err());
        assert!(world
            .sweep_sphere_down(Vec3::zeros(), 0.3, f32::INFINITY, CollisionMask::all())
            .is_err());
        assert!(world
            .sweep_sphere_down(Vec3::zeros(), 0.0, 1.0, CollisionMask::all())
            .is_err());
    }

    #[test]
    fn grounded_near_the_floor_and_airborne_above_it() {
        let world = StaticWorld::new(vec![ground()]);
        let config = SolverConfig::default();
        assert!(is_grounded(&world, &capsule(), &config, Vec3::new(0.0, 0.015, 0.0)));
        assert!(!is_grounded(&world, &capsule(), &config, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn falling_capsule_comes_to_rest_above_the_floor() {
        let world = StaticWorld::new(vec![ground()]);
        let config = SolverConfig::default().with_skin_width(0.02);
        let res = collide_and_slide(
            &world,
            &capsule(),
            &config,
            SlideRequest::gravity(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -3.0, 0.0)),
        );
        assert_eq!(res.sweeps, 1);
        assert!((res.displacement.y + 0.98).abs() < 1.0e-3);
        assert_eq!(res.last_contact.unwrap().surface, SurfaceKind::Floor);
    }

    #[test]
    fn walking_into_a_wall_stops_short_of_it() {
        let world = StaticWorld::new(vec![ground(), wall_at(1.0)]);
        let config = SolverConfig::default().with_skin_width(0.02);
        let start = Vec3::new(0.0, 0.02, 0.0);
        let res = collide_and_slide(
            &world,
            &capsule(),
            &config,
            SlideRequest::locomotion(start, Vec3::new(2.0, 0.0, 0.0), true),
        );
        // Surface at 1.0, capsule radius 0.3, skin 0.02.
        assert!((res.displacement.x - 0.68).abs() < 1.0e-3);
        assert!(res.displacement.norm() <= 2.0);
        assert!((start + res.displacement).x + 0.3 < 1.0);
    }

    #[test]
    fn diagonal_approach_slides_along_the_wall() {
        let world = StaticWorld::new(vec![ground(), wall_at(1.0)]);
        let config = SolverConfig::default()
            .with_skin_width(0.02)
            .with_min_wall_slide_scale(0.0);
        let d = Vec3::new(2.0, 0.0, 2.0);
        let res = collide_and_slide(
            &world,
            &capsule(),
            &config,
            SlideRequest::locomotion(Vec3::new(0.0, 0.02, 0.0), d, true),
        );
        assert!(res.displacement.x < 0.7);
        // Some of the motion survives along the wall.
        assert!(res.displacement.z > 0.7);
        assert!(res.displacement.norm() <= d.norm() + 1.0e-4);
        assert_eq!(res.last_contact.unwrap().surface, SurfaceKind::Wall);
    }
}
