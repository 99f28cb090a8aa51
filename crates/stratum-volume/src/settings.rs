//! Query tuning parameters.

use serde::{Deserialize, Serialize};

use crate::{Result, VolumeError};

/// Parameters of the ray queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Maximum number of sphere-tracing steps before giving up.
    pub max_steps: usize,
    /// Sphere tracing stops once the distance to the nearest daughter is
    /// below this value (cm).
    pub epsilon: f64,
    /// Distance the ray is pushed past a boundary it has just crossed
    /// during segment traversal (cm). Counted in the reported lengths.
    pub surface_epsilon: f64,
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            max_steps: 512,
            epsilon: 1e-4,
            surface_epsilon: 1e-8,
        }
    }
}

impl TraceSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(VolumeError::InvalidSettings(
                "max_steps must be at least 1".into(),
            ));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(VolumeError::InvalidSettings(
                "epsilon must be positive".into(),
            ));
        }
        if !(self.surface_epsilon.is_finite() && self.surface_epsilon > 0.0) {
            return Err(VolumeError::InvalidSettings(
                "surface_epsilon must be positive".into(),
            ));
        }
        Ok(())
    }
}
