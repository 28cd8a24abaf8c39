use crate::collision::{
    CapsuleSpec, ConfigError, SlideRequest, SolverConfig, SpatialQuery, Vec3,
    collide_and_slide, probe_ground,
    settings::{GRAVITY_MPS2, TERMINAL_FALL_SPEED_MPS},
};

/// Output of a single [`CharacterMotor::tick`].
#[derive(Clone, Copy, Debug)]
pub struct MotorTick {
    /// Total position change for this tick (locomotion + gravity). The caller applies it.
    pub delta: Vec3,
    /// Result of the locomotion pass.
    pub locomotion: Vec3,
    /// Result of the gravity pass, evaluated from the position advanced by `locomotion`.
    pub gravity: Vec3,
    /// Ground probe result at the start of the tick.
    pub grounded: bool,
    /// True if either pass ran out of bounces.
    pub truncated: bool,
}

/// Per-character driver for the two-pass tick.
///
/// Per tick:
/// 1. Probe for ground at the current position.
/// 2. Reset the fall velocity when grounded, then integrate gravity into it.
/// 3. Locomotion pass with the desired displacement.
/// 4. Gravity pass from the position advanced by the locomotion result.
/// 5. Sum both results.
///
/// The motor owns its grounded flag and fall velocity; it never stores the position.
#[derive(Clone, Debug)]
pub struct CharacterMotor {
    capsule: CapsuleSpec,
    config: SolverConfig,
    gravity: Vec3,
    gravity_scale: f32,
    terminal_fall_speed: f32,
    fall_velocity: Vec3,
    grounded: bool,
}

impl CharacterMotor {
    /// Validated motor with standard gravity.
    pub fn new(capsule: CapsuleSpec, config: SolverConfig) -> Result<Self, ConfigError> {
        capsule.validate()?;
        config.validate()?;
        Ok(Self {
            capsule,
            config,
            gravity: Vec3::new(0.0, -GRAVITY_MPS2, 0.0),
            gravity_scale: 1.0,
            terminal_fall_speed: TERMINAL_FALL_SPEED_MPS,
            fall_velocity: Vec3::zeros(),
            grounded: false,
        })
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale.max(0.0);
        self
    }

    pub fn with_terminal_fall_speed(mut self, speed: f32) -> Self {
        self.terminal_fall_speed = speed.max(0.0);
        self
    }

    #[inline]
    pub fn capsule(&self) -> &CapsuleSpec {
        &self.capsule
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    #[inline]
    pub fn fall_velocity(&self) -> Vec3 {
        self.fall_velocity
    }

    /// Drop any accumulated fall speed (e.g. after a teleport).
    pub fn reset_fall(&mut self) {
        self.fall_velocity = Vec3::zeros();
    }

    /// Advance one fixed tick from `position` with the given locomotion displacement.
    pub fn tick<Q: SpatialQuery + ?Sized>(
        &mut self,
        query: &Q,
        position: Vec3,
        desired_displacement: Vec3,
        dt: f32,
    ) -> MotorTick {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        // 1) Grounded is derived every tick, never trusted from the previous one.
        self.grounded = probe_ground(query, &self.capsule, &self.config, position).grounded;

        // 2) Fall velocity resets when grounded, then integrates one tick of gravity.
        if self.grounded {
            self.fall_velocity = Vec3::zeros();
        }
        self.fall_velocity += self.gravity * (self.gravity_scale * dt);
        let speed = self.fall_velocity.norm();
        if speed > self.terminal_fall_speed && speed > 0.0 {
            self.fall_velocity *= self.terminal_fall_speed / speed;
        }

        // 3) Locomotion.
        let loco = collide_and_slide(
            query,
            &self.capsule,
            &self.config,
            SlideRequest::locomotion(position, desired_displacement, self.grounded),
        );

        // 4) Gravity from the advanced position.
        let fall = collide_and_slide(
            query,
            &self.capsule,
            &self.config,
            SlideRequest::gravity(position + loco.displacement, self.fall_velocity * dt),
        );

        log::trace!(
            "motor tick: grounded={} loco={:?} gravity={:?}",
            self.grounded,
            loco.displacement,
            fall.displacement
        );

        MotorTick {
            delta: loco.displacement + fall.displacement,
            locomotion: loco.displacement,
            gravity: fall.displacement,
            grounded: self.grounded,
            truncated: loco.truncated || fall.truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{
        StaticCollider, StaticShape, StaticWorld,
        query::fake::{ScriptedQuery, hit},
    };

    const DT: f32 = 1.0 / 60.0;

    fn capsule() -> CapsuleSpec {
        CapsuleSpec::new(0.3, 1.8).unwrap()
    }

    fn flat_world() -> StaticWorld {
        StaticWorld::new(vec![StaticCollider::world(StaticShape::Plane {
            normal: Vec3::y(),
            dist: 0.0,
        })])
    }

    #[test]
    fn new_rejects_invalid_settings() {
        let bad = SolverConfig::default().with_skin_width(-1.0);
        assert!(CharacterMotor::new(capsule(), bad).is_err());
        let bad_capsule = CapsuleSpec {
            radius: 0.5,
            height: 0.5,
        };
        assert!(CharacterMotor::new(bad_capsule, SolverConfig::default()).is_err());
    }

    #[test]
    fn gravity_pass_starts_from_the_advanced_position() {
        // Airborne probe, clear locomotion sweep, clear gravity sweep.
        let query = ScriptedQuery::new();
        let mut motor = CharacterMotor::new(capsule(), SolverConfig::default()).unwrap();
        let step = Vec3::new(0.1, 0.0, 0.0);
        let tick = motor.tick(&query, Vec3::new(0.0, 5.0, 0.0), step, DT);

        assert!(!tick.grounded);
        assert_eq!(tick.locomotion, step);
        assert!(tick.gravity.y < 0.0);
        assert!((tick.delta - (tick.locomotion + tick.gravity)).norm() < 1.0e-6);

        let calls = query.capsule_calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!((calls[1].origin - Vec3::new(0.1, 5.0, 0.0)).norm() < 1.0e-6);
    }

    #[test]
    fn fall_velocity_accumulates_while_airborne_and_resets_on_ground() {
        let mut motor = CharacterMotor::new(capsule(), SolverConfig::default()).unwrap();
        let air = ScriptedQuery::new();
        motor.tick(&air, Vec3::new(0.0, 10.0, 0.0), Vec3::zeros(), DT);
        motor.tick(&air, Vec3::new(0.0, 10.0, 0.0), Vec3::zeros(), DT);
        let expected = GRAVITY_MPS2 * 2.0 * DT;
        assert!((motor.fall_velocity().y + expected).abs() < 1.0e-5);

        let ground = ScriptedQuery::new()
            .then_sphere(Ok(Some(hit(0.01, Vec3::y()))))
            .then_capsule_hit(0.0, Vec3::y());
        motor.tick(&ground, Vec3::zeros(), Vec3::zeros(), DT);
        assert!(motor.is_grounded());
        // Reset, then one tick of gravity.
        assert!((motor.fall_velocity().y + GRAVITY_MPS2 * DT).abs() < 1.0e-5);
    }

    #[test]
    fn custom_gravity_and_reset_fall() {
        let mut motor = CharacterMotor::new(capsule(), SolverConfig::default())
            .unwrap()
            .with_gravity(Vec3::new(0.0, -1.62, 0.0));
        let air = ScriptedQuery::new();
        motor.tick(&air, Vec3::new(0.0, 10.0, 0.0), Vec3::zeros(), DT);
        assert!((motor.fall_velocity().y + 1.62 * DT).abs() < 1.0e-6);

        motor.reset_fall();
        assert_eq!(motor.fall_velocity(), Vec3::zeros());
    }

    #[test]
    fn terminal_speed_caps_the_fall() {
        let mut motor = CharacterMotor::new(capsule(), SolverConfig::default())
            .unwrap()
            .with_terminal_fall_speed(1.0);
        let air = ScriptedQuery::new();
        for _ in 0..30 {
            motor.tick(&air, Vec3::new(0.0, 100.0, 0.0), Vec3::zeros(), DT);
        }
        assert!(motor.fall_velocity().norm() <= 1.0 + 1.0e-5);
    }

    #[test]
    fn character_dropped_above_the_floor_lands_and_stays_there() {
        let world = flat_world();
        let mut motor = CharacterMotor::new(capsule(), SolverConfig::default()).unwrap();
        let mut pos = Vec3::new(0.0, 1.0, 0.0);
        for _ in 0..240 {
            let tick = motor.tick(&world, pos, Vec3::zeros(), DT);
            pos += tick.delta;
            assert!(pos.y >= 0.0, "sank into the floor at {pos:?}");
        }
        assert!(motor.is_grounded());
        assert!(pos.y < motor.config().ground_probe_distance);
        assert!(pos.x.abs() < 1.0e-6 && pos.z.abs() < 1.0e-6);
    }

    #[test]
    fn walking_on_flat_ground_keeps_height() {
        let world = flat_world();
        let mut motor = CharacterMotor::new(capsule(), SolverConfig::default()).unwrap();
        let mut pos = Vec3::new(0.0, 0.01, 0.0);
        let step = Vec3::new(5.0 * DT, 0.0, 0.0);
        for _ in 0..60 {
            let tick = motor.tick(&world, pos, step, DT);
            pos += tick.delta;
        }
        assert!((pos.x - 5.0).abs() < 1.0e-3);
        assert!(pos.y >= 0.0 && pos.y < 0.05);
    }

    #[test]
    fn characters_share_one_world_across_threads() {
        let world = flat_world();

        let ends: Vec<Vec3> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let world = &world;
                    s.spawn(move || {
                        let mut motor =
                            CharacterMotor::new(capsule(), SolverConfig::default()).unwrap();
                        let mut pos = Vec3::new(0.0, 0.5 + i as f32, 0.0);
                        for _ in 0..120 {
                            pos += motor.tick(world, pos, Vec3::zeros(), DT).delta;
                        }
                        pos
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for end in ends {
            assert!(end.y >= 0.0 && end.y < 0.2);
        }
    }
}
