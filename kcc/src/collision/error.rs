use std::fmt;

/// Rejected capsule or solver configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    CapsuleRadius(f32),
    CapsuleHeight { radius: f32, height: f32 },
    MaxSlopeAngle(f32),
    MaxBounceDepth,
    SkinWidth(f32),
    MinWallSlideScale(f32),
    GroundProbeDistance(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::CapsuleRadius(r) => write!(f, "capsule radius must be > 0 (got {r})"),
            ConfigError::CapsuleHeight { radius, height } => write!(
                f,
                "capsule height must be >= 2 * radius (radius {radius}, height {height})"
            ),
            ConfigError::MaxSlopeAngle(deg) => {
                write!(f, "max slope angle must be within [0, 90] degrees (got {deg})")
            }
            ConfigError::MaxBounceDepth => write!(f, "max bounce depth must be at least 1"),
            ConfigError::SkinWidth(w) => write!(f, "skin width must be > 0 (got {w})"),
            ConfigError::MinWallSlideScale(s) => {
                write!(f, "min wall slide scale must be within [0, 1] (got {s})")
            }
            ConfigError::GroundProbeDistance(d) => {
                write!(f, "ground probe distance must be >= 0 (got {d})")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure reported by a spatial query implementation.
///
/// The probe and the solver never propagate these: a failed query is treated as "no hit" so the
/// tick stays live.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryError {
    /// Non-finite origin, direction or distance.
    InvalidInput(&'static str),
    /// The backing geometry could not answer the query.
    Unavailable(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidInput(what) => write!(f, "invalid sweep input: {what}"),
            QueryError::Unavailable(reason) => write!(f, "spatial query unavailable: {reason}"),
        }
    }
}

impl std::error::Error for QueryError {}
