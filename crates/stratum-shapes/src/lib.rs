#![warn(missing_docs)]

//! Solid shapes for the stratum geometry engine.
//!
//! A [`Shape`] is a closed sum of primitives (box, sphere, cylinder) and
//! boolean combinations of other shapes. Every shape answers four
//! questions: signed distance to its surface, the first ray crossing,
//! point classification, and enclosed volume.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stratum_math::{Point3, Rotation, Vec3};
//! use stratum_shapes::{Location, Shape};
//!
//! let body = Arc::new(Shape::cuboid(Vec3::new(1.0, 1.0, 1.0))?);
//! let hole = Arc::new(Shape::cylinder(0.25, 2.0)?);
//! let part = Shape::difference(body, hole);
//!
//! assert_eq!(part.contains(&Point3::origin()), Location::Exterior);
//! ```

pub mod distance;
pub mod error;
pub mod intersect;
pub mod params;
pub mod registry;
pub mod shape;

pub use error::{Result, ShapeError};
pub use params::{LengthUnit, ShapeParams};
pub use registry::{ShapeConstructor, ShapeRegistry};
pub use shape::{BinaryOp, Location, Shape, ShapeKind};
