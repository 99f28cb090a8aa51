#![warn(missing_docs)]

//! stratum: hierarchical CSG geometry with signed-distance and ray
//! path-length queries.
//!
//! Re-exports the core crates and adds a declarative TOML scene format.
//!
//! # Example
//!
//! ```ignore
//! use stratum::{Point3, Ray, SceneDescription, ShapeRegistry, Vec3};
//!
//! let registry = ShapeRegistry::with_builtin_shapes();
//! let world = SceneDescription::from_path("detector.toml")?.build(&registry)?;
//!
//! let ray = Ray::new(Point3::new(0.0, 0.0, -100.0), Vec3::z())?;
//! for segment in world.line_segments(&ray) {
//!     println!("{:>12} {:.4} cm", segment.material.name(), segment.length());
//! }
//! ```

pub mod scene;

pub use scene::{
    AngleUnit, MaterialDescription, PlacementDescription, PositionDescription,
    RotationDescription, SceneDescription, SceneError, SolidDescription, VolumeDescription,
};

pub use stratum_math as math;
pub use stratum_shapes as shapes;
pub use stratum_volume as volume;

pub use stratum_math::{AffineTransform, EulerConvention, Point3, Ray, Rotation, Vec3};
pub use stratum_shapes::{BinaryOp, LengthUnit, Location, Shape, ShapeParams, ShapeRegistry};
pub use stratum_volume::{
    GeometryBuilder, LineSegment, LogicalVolumeId, Material, SphereTraceResult, TraceSettings,
    World,
};
