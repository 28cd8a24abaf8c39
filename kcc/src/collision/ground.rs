use super::{
    query::SpatialQuery,
    settings::SolverConfig,
    surface::{classify_surface, normalize_or_zero},
    types::{CapsuleSpec, SurfaceKind, SweepHit, Vec3},
};

/// Outcome of one ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundProbe {
    /// True iff the downward sweep hit anything.
    pub grounded: bool,
    /// The support contact, if any.
    pub hit: Option<SweepHit>,
    /// Whether the support surface is within the walkable slope limit.
    pub walkable: bool,
}

impl GroundProbe {
    #[inline]
    fn airborne() -> Self {
        Self {
            grounded: false,
            hit: None,
            walkable: false,
        }
    }
}

/// Sweep a sphere of the capsule's radius down from the bottom hemisphere's center.
///
/// - `position` is the capsule pivot (feet) in world space.
/// - The sweep starts at `position + up * radius` (the capsule center minus
///   half-height-plus-radius) and travels `config.ground_probe_distance`.
/// - Grounded iff the sweep reports a hit. A failed query reads as airborne.
pub fn probe_ground<Q: SpatialQuery + ?Sized>(
    query: &Q,
    capsule: &CapsuleSpec,
    config: &SolverConfig,
    position: Vec3,
) -> GroundProbe {
    if config.ground_probe_distance <= 0.0 {
        return GroundProbe::airborne();
    }

    let origin = position + capsule.base_sphere_offset();
    match query.sweep_sphere_down(
        origin,
        capsule.radius,
        config.ground_probe_distance,
        config.collision_mask,
    ) {
        Ok(Some(hit)) => {
            let walkable = classify_surface(normalize_or_zero(hit.normal), config)
                == SurfaceKind::Floor;
            GroundProbe {
                grounded: true,
                hit: Some(hit),
                walkable,
            }
        }
        Ok(None) => GroundProbe::airborne(),
        Err(err) => {
            log::warn!("ground probe query failed, treating as airborne: {err}");
            GroundProbe::airborne()
        }
    }
}

/// Convenience: only the grounded flag.
#[inline]
pub fn is_grounded<Q: SpatialQuery + ?Sized>(
    query: &Q,
    capsule: &CapsuleSpec,
    config: &SolverConfig,
    position: Vec3,
) -> bool {
    probe_ground(query, capsule, config, position).grounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{
        error::QueryError,
        query::fake::{ScriptedQuery, hit},
    };

    fn capsule() -> CapsuleSpec {
        CapsuleSpec::new(0.3, 1.8).unwrap()
    }

    #[test]
    fn probe_starts_at_the_bottom_sphere_and_uses_the_probe_distance() {
        let query = ScriptedQuery::new().then_sphere(Ok(Some(hit(0.05, Vec3::y()))));
        let config = SolverConfig::default().with_ground_probe_distance(0.25);
        let probe = probe_ground(&query, &capsule(), &config, Vec3::new(1.0, 2.0, 3.0));

        assert!(probe.grounded);
        assert!(probe.walkable);

        let calls = query.sphere_calls.borrow();
        assert_eq!(calls.len(), 1);
        assert!((calls[0].origin - Vec3::new(1.0, 2.3, 3.0)).norm() < 1.0e-6);
        assert_eq!(calls[0].max_distance, 0.25);
    }

    #[test]
    fn no_hit_means_airborne() {
        let query = ScriptedQuery::new().then_sphere(Ok(None));
        assert!(!is_grounded(
            &query,
            &capsule(),
            &SolverConfig::default(),
            Vec3::zeros()
        ));
    }

    #[test]
    fn steep_support_is_grounded_but_not_walkable() {
        let steep = Vec3::new(1.0, 0.2, 0.0);
        let query = ScriptedQuery::new().then_sphere(Ok(Some(hit(0.1, steep))));
        let probe = probe_ground(&query, &capsule(), &SolverConfig::default(), Vec3::zeros());
        assert!(probe.grounded);
        assert!(!probe.walkable);
    }

    #[test]
    fn query_failure_reads_as_airborne() {
        let query = ScriptedQuery::new()
            .then_sphere(Err(QueryError::Unavailable("geometry not loaded".into())));
        let probe = probe_ground(&query, &capsule(), &SolverConfig::default(), Vec3::zeros());
        assert_eq!(probe, GroundProbe::airborne());
    }

    #[test]
    fn zero_probe_distance_skips_the_query() {
        let query = ScriptedQuery::new();
        let config = SolverConfig::default().with_ground_probe_distance(0.0);
        assert!(!is_grounded(&query, &capsule(), &config, Vec3::zeros()));
        assert!(query.sphere_calls.borrow().is_empty());
    }
}
