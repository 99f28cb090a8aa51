//! Error types for building and querying the volume hierarchy.

use stratum_math::MathError;
use thiserror::Error;

/// Errors that can occur while building or querying volumes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VolumeError {
    /// A logical volume id does not belong to this hierarchy.
    #[error("unknown logical volume")]
    UnknownLogicalVolume,
    /// A physical volume id does not belong to this hierarchy.
    #[error("unknown physical volume")]
    UnknownPhysicalVolume,
    /// Placing the daughter would make a volume contain itself.
    #[error("placing `{daughter}` into `{mother}` would create a cycle")]
    Cycle {
        /// Name of the volume being placed.
        daughter: String,
        /// Name of the volume it was placed into.
        mother: String,
    },
    /// The chosen root volume is itself placed inside another volume.
    #[error("root volume `{0}` is placed inside another volume")]
    RootPlaced(String),
    /// A volume's shape has no closed-form volume (combined shapes).
    #[error("volume of `{0}` is undefined for its shape")]
    UndefinedVolume(String),
    /// Material parameters out of range.
    #[error("invalid material `{name}`: {reason}")]
    InvalidMaterial {
        /// Material name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Invalid trace settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    /// A placement could not be inverted.
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Result type for volume operations.
pub type Result<T> = std::result::Result<T, VolumeError>;
