//! Rapier-based query world for immutable/static world geometry.
//!
//! Builds an in-memory Rapier scene from a set of static collider definitions and answers the
//! [`SpatialQuery`] sweeps used by the ground probe and the collide-and-slide solver.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-focused: no dynamics are ever stepped.
//! - Immutable world: statics do not move after construction.

// Re-export Rapier so downstream crates can use Rapier types without depending on `rapier3d`
// directly.
pub use rapier3d;

use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::prelude::*;

use crate::collision::{
    CapsuleSpec, CollisionMask, QueryError, SpatialQuery, SweepHit, UnitVec3, Vec3,
    query::check_sweep_input, world_mask,
};

/// Canonical, schema-agnostic definition of an immutable world collider.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
/// - For planes, we use a pose-derived normal: `normal = rotation * +Y`,
///   and compute `dist = dot(normal, translation) + offset_along_normal`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
    /// Layer membership tested against the sweep mask.
    pub layers: CollisionMask,
}

impl WorldStaticDef {
    /// Unrotated collider on the default world layer.
    pub fn new(id: u32, translation: Vector<f32>, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
            layers: world_mask(),
        }
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_layers(mut self, layers: CollisionMask) -> Self {
        self.layers = layers;
        self
    }
}

/// Supported static collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space).
    ///
    /// This is represented by an offset along the plane normal.
    /// The plane normal is derived from the pose as `rotation * +Y`.
    Plane {
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vector<f32> },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder (meters).
    CylinderY { radius: f32, half_height: f32 },

    /// Rounded cuboid (meters).
    ///
    /// `border_radius` rounds all edges/corners.
    RoundCuboid {
        half_extents: Vector<f32>,
        border_radius: f32,
    },
}

/// In-memory Rapier structures needed for scene queries against a static world.
///
/// For immutable statics, these can be built once at startup and shared by every character.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl RapierQueryWorld {
    /// Build a query world from a list of static collider definitions.
    ///
    /// Determinism
    /// - The input is sorted by `id` before insertion.
    /// - Any NaN/invalid values should be filtered/validated by the caller.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        // Ensure deterministic insertion order.
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Insert each static as a fixed rigid-body + attached collider.
        for def in defs.into_iter() {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = RigidBodyBuilder::fixed().pose(iso).build();
            let rb_handle = bodies.insert(rb);

            let collider = collider_from_def(&def);
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
        }

        // Run collision detection only (no dynamics) so the broad-phase BVH is populated.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();

        let hooks = ();
        let events = ();

        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &hooks,
            &events,
        );

        log::debug!("rapier query world built with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Create a borrowed `QueryPipeline` view suitable for scene queries.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Earliest hit of `shape` swept from `center` along `dir`, over colliders in `mask`.
    ///
    /// Returns the hit distance and the obstacle normal, oriented against the motion.
    fn cast(
        &self,
        shape: &dyn Shape,
        center: Vec3,
        dir: Vec3,
        max_distance: f32,
        mask: CollisionMask,
        stop_at_penetration: bool,
    ) -> Option<(f32, Vec3)> {
        let in_mask = |_: ColliderHandle, collider: &Collider| {
            CollisionMask::new(collider.user_data as u32).intersects(&mask)
        };
        let filter = QueryFilter::default().predicate(&in_mask);
        let pipeline = self.query_pipeline(filter);

        let pos = Isometry::from_parts(Translation3::from(center), UnitQuaternion::identity());
        let mut opts = ShapeCastOptions::with_max_time_of_impact(max_distance);
        opts.stop_at_penetration = stop_at_penetration;

        let (_, hit) = pipeline.cast_shape(&pos, &dir, shape, opts)?;
        let mut normal = hit.normal1.into_inner();
        if normal.dot(&dir) > 0.0 {
            normal = -normal;
        }
        let distance = hit.time_of_impact;
        if !distance.is_finite() || !normal.iter().all(|c| c.is_finite()) {
            return None;
        }
        Some((distance, normal))
    }
}

impl SpatialQuery for RapierQueryWorld {
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

        let dir = direction.into_inner();
        let shape = Capsule::new_y(capsule.half_segment(), capsule.radius);
        let hit = self
            .cast(
                &shape,
                origin + capsule.center_offset(),
                dir,
                max_distance,
                mask,
                false,
            )
            .map(|(distance, normal)| SweepHit {
                point: capsule.support_point(origin + dir * distance, -normal),
                normal,
                distance,
            });
        Ok(hit)
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

        let down = -Vec3::y();
        let hit = self
            .cast(&Ball::new(radius), origin, down, max_distance, mask, true)
            .map(|(distance, normal)| SweepHit {
                point: origin + down * distance - normal * radius,
                normal,
                distance,
            });
        Ok(hit)
    }
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// This uses the pose stored on the rigid-body as the collider parent transform.
/// So the collider is created with identity local transform. The layer membership is stored in
/// the collider's `user_data`.
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // The parent body already carries the pose, so the half-space is expressed in body
            // space: local +Y, shifted along it by the offset.
            let halfspace = HalfSpace::new(Vector::y_axis());
            ColliderBuilder::new(SharedShape::new(halfspace))
                .translation(Vector::y() * *offset_along_normal)
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        ColliderShapeDef::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),

        ColliderShapeDef::RoundCuboid {
            half_extents,
            border_radius,
        } => ColliderBuilder::round_cuboid(
            half_extents.x,
            half_extents.y,
            half_extents.z,
            *border_radius,
        ),
    };

    builder.user_data(def.layers.bits as u128).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionLayer, SolverConfig, is_grounded};

    fn capsule() -> CapsuleSpec {
        CapsuleSpec::new(0.3, 1.8).unwrap()
    }

    fn flat_ground() -> WorldStaticDef {
        WorldStaticDef::new(
            1,
            Vector::zeros(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        )
    }

    #[test]
    fn probe_finds_the_ground_plane() {
        let world = RapierQueryWorld::build(vec![flat_ground()]);
        let config = SolverConfig::default();
        assert!(is_grounded(&world, &capsule(), &config, Vector::new(0.0, 0.01, 0.0)));
        assert!(!is_grounded(&world, &capsule(), &config, Vector::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn capsule_sweep_hits_a_box_ahead() {
        let wall = WorldStaticDef::new(
            2,
            Vector::new(3.0, 1.0, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vector::new(0.5, 1.0, 5.0),
            },
        );
        let world = RapierQueryWorld::build(vec![wall]);
        let hit = world
            .sweep_capsule(
                &capsule(),
                Vector::new(0.0, 0.1, 0.0),
                UnitVec3::new_normalize(Vector::x()),
                10.0,
                CollisionMask::all(),
            )
            .unwrap()
            .unwrap();
        assert!((hit.distance - 2.2).abs() < 1.0e-3);
        assert!((hit.normal + Vector::x()).norm() < 1.0e-3);
    }

    #[test]
    fn capsule_sweep_hits_cylinders_and_rounded_boxes() {
        // Both obstacles present their near face at x = 2.5.
        let shapes = [
            ColliderShapeDef::CylinderY {
                radius: 0.5,
                half_height: 1.0,
            },
            ColliderShapeDef::RoundCuboid {
                half_extents: Vector::new(0.4, 0.9, 5.0),
                border_radius: 0.1,
            },
        ];
        for shape in shapes {
            let world = RapierQueryWorld::build(vec![WorldStaticDef::new(
                4,
                Vector::new(3.0, 1.0, 0.0),
                shape.clone(),
            )]);
            let hit = world
                .sweep_capsule(
                    &capsule(),
                    Vector::new(0.0, 0.1, 0.0),
                    UnitVec3::new_normalize(Vector::x()),
                    10.0,
                    CollisionMask::all(),
                )
                .unwrap()
                .unwrap_or_else(|| panic!("no hit against {shape:?}"));
            assert!((hit.distance - 2.2).abs() < 1.0e-2, "{shape:?}: {}", hit.distance);
            assert!((hit.normal + Vector::x()).norm() < 1.0e-2);
        }
    }

    #[test]
    fn layer_filter_hides_other_layers() {
        let ghost = WorldStaticDef::new(
            3,
            Vector::new(3.0, 1.0, 0.0),
            ColliderShapeDef::Cuboid {
                half_extents: Vector::new(0.5, 1.0, 5.0),
            },
        )
        .with_layers(CollisionMask::from_flags(&[CollisionLayer::Triggers]));
        let world = RapierQueryWorld::build(vec![ghost]);
        let hit = world
            .sweep_capsule(
                &capsule(),
                Vector::new(0.0, 0.1, 0.0),
                UnitVec3::new_normalize(Vector::x()),
                10.0,
                CollisionMask::from_flags(&[CollisionLayer::World]),
            )
            .unwrap();
        assert!(hit.is_none());
    }
}
