//! Error types for the math primitives.

use thiserror::Error;

/// Errors raised by vector, ray and transform construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// A direction or axis had zero (or non-finite) length.
    #[error("cannot normalize a zero-length {0}")]
    ZeroLength(&'static str),
    /// The linear part of a transform cannot be inverted.
    #[error("transform is singular (determinant {determinant:e})")]
    SingularTransform {
        /// Determinant of the 3x3 linear part.
        determinant: f64,
    },
    /// A component was NaN or infinite.
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

/// Result type for math operations.
pub type Result<T> = std::result::Result<T, MathError>;
