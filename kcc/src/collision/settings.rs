/*!
Kinematic character controller (KCC) settings and tolerances.

These constants centralize the defaults used by the collide-and-slide solver, the
ground probe and the character motor. `SolverConfig` carries the per-character values;
it is built once at character creation and never mutated afterwards.

Notes
- Distances are in meters, time in seconds, angles in degrees.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

use super::{error::ConfigError, layers::CollisionMask};

/// Surfaces steeper than this (measured from the up axis) are walls.
pub const DEFAULT_MAX_SLOPE_ANGLE_DEG: f32 = 55.0;

/// Maximum number of slide bounces per pass.
/// Higher values help with tight corners at the cost of more queries.
pub const DEFAULT_MAX_BOUNCE_DEPTH: u32 = 5;

/// Separation kept from surfaces when landing or sliding (meters).
/// Too large creates visible gaps; too small risks jitter on contact.
pub const DEFAULT_SKIN_WIDTH: f32 = 0.015;

/// Lowest speed multiplier a wall can apply to the leftover motion.
pub const DEFAULT_MIN_WALL_SLIDE_SCALE: f32 = 0.15;

/// Downward sweep distance used by the ground probe (meters).
pub const DEFAULT_GROUND_PROBE_DISTANCE: f32 = 0.2;

/// Minimum squared movement threshold to consider a step meaningful (m^2).
/// Movements below this are treated as zero to avoid tiny oscillations.
/// Applies to redirected leftovers only; a fresh request is swept unless it is [`ZERO_MOVE_SQ`].
pub const MIN_MOVE_SQ: f32 = 1.0e-8;

/// Squared length under which a requested displacement is treated as zero.
pub const ZERO_MOVE_SQ: f32 = f32::EPSILON * f32::EPSILON;

/// Squared length under which a direction (normal, horizontal component) is degenerate.
pub const DIR_EPS_SQ: f32 = 1.0e-12;

/// Tolerance on the slope cosine so a surface exactly at the limit stays a floor.
pub const SLOPE_COS_EPS: f32 = 1.0e-6;

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Maximum fall speed (meters per second, positive magnitude).
pub const TERMINAL_FALL_SPEED_MPS: f32 = 50.0;

/// Immutable per-character solver tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverConfig {
    /// Steepest walkable surface, in degrees from the up axis.
    pub max_slope_angle_deg: f32,
    /// Bounce ceiling; motion left after this many bounces is discarded.
    pub max_bounce_depth: u32,
    /// Margin subtracted from every sweep distance.
    pub skin_width: f32,
    /// Floor on the wall deceleration factor, in [0, 1].
    pub min_wall_slide_scale: f32,
    /// Ground probe sweep distance.
    pub ground_probe_distance: f32,
    /// Layers the character collides with.
    pub collision_mask: CollisionMask,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_slope_angle_deg: DEFAULT_MAX_SLOPE_ANGLE_DEG,
            max_bounce_depth: DEFAULT_MAX_BOUNCE_DEPTH,
            skin_width: DEFAULT_SKIN_WIDTH,
            min_wall_slide_scale: DEFAULT_MIN_WALL_SLIDE_SCALE,
            ground_probe_distance: DEFAULT_GROUND_PROBE_DISTANCE,
            collision_mask: CollisionMask::all(),
        }
    }
}

impl SolverConfig {
    #[inline]
    pub fn with_max_slope_angle_deg(mut self, degrees: f32) -> Self {
        self.max_slope_angle_deg = degrees;
        self
    }

    #[inline]
    pub fn with_max_bounce_depth(mut self, depth: u32) -> Self {
        self.max_bounce_depth = depth;
        self
    }

    #[inline]
    pub fn with_skin_width(mut self, skin: f32) -> Self {
        self.skin_width = skin;
        self
    }

    #[inline]
    pub fn with_min_wall_slide_scale(mut self, scale: f32) -> Self {
        self.min_wall_slide_scale = scale;
        self
    }

    #[inline]
    pub fn with_ground_probe_distance(mut self, distance: f32) -> Self {
        self.ground_probe_distance = distance;
        self
    }

    #[inline]
    pub fn with_collision_mask(mut self, mask: CollisionMask) -> Self {
        self.collision_mask = mask;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=90.0).contains(&self.max_slope_angle_deg) {
            return Err(ConfigError::MaxSlopeAngle(self.max_slope_angle_deg));
        }
        if self.max_bounce_depth == 0 {
            return Err(ConfigError::MaxBounceDepth);
        }
        if !self.skin_width.is_finite() || self.skin_width <= 0.0 {
            return Err(ConfigError::SkinWidth(self.skin_width));
        }
        if !(0.0..=1.0).contains(&self.min_wall_slide_scale) {
            return Err(ConfigError::MinWallSlideScale(self.min_wall_slide_scale));
        }
        if !self.ground_probe_distance.is_finite() || self.ground_probe_distance < 0.0 {
            return Err(ConfigError::GroundProbeDistance(self.ground_probe_distance));
        }
        Ok(())
    }

    /// Cosine of the walkable slope limit: a unit normal `n` is a floor when `n.y >= this`.
    #[inline]
    pub fn min_floor_cos(&self) -> f32 {
        self.max_slope_angle_deg.to_radians().cos()
    }

    /// Parse and validate a config from TOML. Missing keys fall back to the defaults.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(source).map_err(|e| e.to_string())?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}
