//! Named, unit-tagged parameters for registry constructors.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, ShapeError};

/// Unit in which raw lengths are given. Geometry is built in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LengthUnit {
    /// Millimetres.
    #[serde(rename = "mm")]
    Millimeter,
    /// Centimetres.
    #[default]
    #[serde(rename = "cm")]
    Centimeter,
    /// Metres.
    #[serde(rename = "m")]
    Meter,
}

impl LengthUnit {
    /// Multiplier converting a length in this unit to centimetres.
    pub fn to_centimeters(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 0.1,
            LengthUnit::Centimeter => 1.0,
            LengthUnit::Meter => 100.0,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mm" => Ok(LengthUnit::Millimeter),
            "cm" => Ok(LengthUnit::Centimeter),
            "m" => Ok(LengthUnit::Meter),
            other => Err(ShapeError::UnknownUnit(other.to_string())),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Meter => "m",
        })
    }
}

/// Parameters handed to a [`ShapeRegistry`](crate::ShapeRegistry) constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeParams {
    /// Raw values by name.
    pub values: BTreeMap<String, f64>,
    /// Unit of the length-valued entries.
    #[serde(default)]
    pub unit: LengthUnit,
}

impl ShapeParams {
    /// Empty parameter set in `unit`.
    pub fn new(unit: LengthUnit) -> Self {
        Self {
            values: BTreeMap::new(),
            unit,
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Raw value of `name`.
    pub fn get(&self, name: &str) -> Result<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ShapeError::MissingParameter(name.to_string()))
    }

    /// Length `name` converted to centimetres.
    pub fn length(&self, name: &str) -> Result<f64> {
        Ok(self.get(name)? * self.unit.to_centimeters())
    }
}
