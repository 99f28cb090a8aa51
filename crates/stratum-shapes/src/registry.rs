//! Name-to-constructor table for shapes.
//!
//! The registry is an ordinary value: build it once (usually with
//! [`ShapeRegistry::with_builtin_shapes`]), add any custom constructors,
//! and pass it by reference to whatever builds geometry from names.

use std::collections::HashMap;
use std::fmt;

use stratum_math::Vec3;
use tracing::warn;

use crate::{Result, Shape, ShapeError, ShapeParams};

/// Builds a shape from named parameters.
pub type ShapeConstructor = fn(&ShapeParams) -> Result<Shape>;

/// Maps shape names to constructors.
#[derive(Clone, Default)]
pub struct ShapeRegistry {
    constructors: HashMap<String, ShapeConstructor>,
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ShapeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in primitives:
    ///
    /// | name                 | parameters                         |
    /// |----------------------|------------------------------------|
    /// | `box`                | `x`, `y`, `z`: full edge lengths   |
    /// | `orb`, `sphere`      | `r`: radius                        |
    /// | `tube`, `cylinder`   | `rmax`: radius, `z`: full length   |
    pub fn with_builtin_shapes() -> Self {
        let mut registry = Self::new();
        registry.register("box", construct_box);
        registry.register("orb", construct_sphere);
        registry.register("sphere", construct_sphere);
        registry.register("tube", construct_tube);
        registry.register("cylinder", construct_tube);
        registry
    }

    /// Register `constructor` under `name`.
    ///
    /// An existing entry is replaced; returns `true` in that case.
    pub fn register(&mut self, name: impl Into<String>, constructor: ShapeConstructor) -> bool {
        let name = name.into();
        let replaced = self.constructors.insert(name.clone(), constructor).is_some();
        if replaced {
            warn!(shape = %name, "shape constructor registered twice, replacing");
        }
        replaced
    }

    /// Whether `name` has a constructor.
    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the shape registered as `name`.
    pub fn construct(&self, name: &str, params: &ShapeParams) -> Result<Shape> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ShapeError::UnknownShape(name.to_string()))?;
        constructor(params)
    }
}

fn construct_box(params: &ShapeParams) -> Result<Shape> {
    Shape::cuboid(Vec3::new(
        params.length("x")? / 2.0,
        params.length("y")? / 2.0,
        params.length("z")? / 2.0,
    ))
}

fn construct_sphere(params: &ShapeParams) -> Result<Shape> {
    Shape::sphere(params.length("r")?)
}

fn construct_tube(params: &ShapeParams) -> Result<Shape> {
    Shape::cylinder(params.length("rmax")?, params.length("z")? / 2.0)
}
