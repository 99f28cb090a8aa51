#![warn(missing_docs)]

//! Volume hierarchy for the stratum geometry engine.
//!
//! A [`LogicalVolume`] is a shape filled with a [`Material`]; a
//! [`PhysicalVolume`] places a logical volume inside another one. Volumes
//! live in a flat arena and refer to each other by id. A
//! [`GeometryBuilder`] assembles the hierarchy and freezes it into a
//! [`World`], which answers the ray queries.
//!
//! # Architecture
//!
//! ```text
//! GeometryBuilder ──build──▶ World
//!                              ├── line_segments   (frame-stack traversal)
//!                              ├── sphere_trace    (ray marching)
//!                              ├── ray_trace       (nearest daughter)
//!                              └── volume / mass
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stratum_math::{Point3, Ray, Rotation, Vec3};
//! use stratum_shapes::Shape;
//! use stratum_volume::{GeometryBuilder, Material, TraceSettings};
//!
//! let mut builder = GeometryBuilder::new();
//! let air = Arc::new(Material::new("Air", 0.0012)?);
//! let water = Arc::new(Material::new("Water", 1.0)?);
//! let world = builder.add_volume("world", air, Arc::new(Shape::cuboid(Vec3::new(2.0, 2.0, 2.0))?));
//! let tank = builder.add_volume("tank", water, Arc::new(Shape::sphere(1.0)?));
//! builder.place_at("tank", tank, world, &Rotation::identity(), &Vec3::zeros())?;
//! let world = builder.build(world, TraceSettings::default())?;
//!
//! let ray = Ray::new(Point3::new(0.0, 0.0, -2.0), Vec3::z())?;
//! for segment in world.line_segments(&ray) {
//!     println!("{}: {:.3} cm", segment.material.name(), segment.length());
//! }
//! ```

pub mod builder;
pub mod error;
pub mod material;
pub mod settings;
pub mod traverse;
pub mod volume;
pub mod world;

pub use builder::GeometryBuilder;
pub use error::{Result, VolumeError};
pub use material::Material;
pub use settings::TraceSettings;
pub use traverse::LineSegment;
pub use volume::{LogicalVolume, LogicalVolumeId, PhysicalVolume, PhysicalVolumeId, VolumeStore};
pub use world::{DaughterHit, SphereTraceResult, World};
