//! Materials filling logical volumes.

use serde::Serialize;

use crate::{Result, VolumeError};

/// A named bulk material. Shared between volumes through `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Material {
    name: String,
    density: f64,
}

impl Material {
    /// Create a material with density in g/cm^3.
    ///
    /// Fails on a negative or non-finite density.
    pub fn new(name: impl Into<String>, density: f64) -> Result<Self> {
        let name = name.into();
        if !density.is_finite() || density < 0.0 {
            return Err(VolumeError::InvalidMaterial {
                name,
                reason: format!("density must be finite and non-negative, got {density}"),
            });
        }
        Ok(Self { name, density })
    }

    /// Material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Density in g/cm^3.
    pub fn density(&self) -> f64 {
        self.density
    }
}
