//! Error types for shape construction.

use stratum_math::MathError;
use thiserror::Error;

/// Errors that can occur while building shapes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// A dimension was zero, negative or not finite.
    #[error("invalid {shape} parameter `{name}`: {value} (must be positive and finite)")]
    InvalidParameter {
        /// Shape kind being constructed.
        shape: &'static str,
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A registry constructor was called without a required parameter.
    #[error("missing shape parameter `{0}`")]
    MissingParameter(String),
    /// No constructor is registered under this name.
    #[error("unknown shape `{0}`")]
    UnknownShape(String),
    /// Unrecognized length unit.
    #[error("unknown length unit `{0}`")]
    UnknownUnit(String),
    /// The shape placement could not be inverted.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Result type for shape operations.
pub type Result<T> = std::result::Result<T, ShapeError>;
