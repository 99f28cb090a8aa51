//! Declarative scene description.
//!
//! A scene is a TOML document listing materials, solids and volumes by
//! name. Volumes list the daughters placed inside them; `world` names the
//! root volume. References must point at names defined in the document,
//! and boolean solids may only refer to solids listed before them.
//!
//! ```toml
//! world = "world"
//!
//! [[materials]]
//! name = "Air"
//! density = 0.0012
//!
//! [[solids]]
//! name = "hall"
//! type = "box"
//! unit = "m"
//! params = { x = 4.0, y = 4.0, z = 4.0 }
//!
//! [[volumes]]
//! name = "world"
//! material = "Air"
//! solid = "hall"
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stratum_math::{EulerConvention, Rotation, Vec3};
use stratum_shapes::{LengthUnit, Shape, ShapeError, ShapeParams, ShapeRegistry};
use stratum_volume::{
    GeometryBuilder, LogicalVolumeId, Material, TraceSettings, VolumeError, World,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while loading or building a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The scene file could not be read.
    #[error("failed to read scene: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not a valid scene.
    #[error("failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),
    /// A name refers to nothing defined (before it) in the document.
    #[error("undefined {kind} `{name}`")]
    UndefinedReference {
        /// What kind of entry was looked up.
        kind: &'static str,
        /// The missing name.
        name: String,
    },
    /// Two entries of the same kind share a name.
    #[error("duplicate {kind} `{name}`")]
    DuplicateName {
        /// Entry kind.
        kind: &'static str,
        /// The repeated name.
        name: String,
    },
    /// A boolean solid lacks one of its operands.
    #[error("boolean solid `{0}` needs both `first` and `second`")]
    MissingOperand(String),
    /// A solid could not be constructed.
    #[error("solid `{name}`: {source}")]
    Shape {
        /// Solid name.
        name: String,
        /// Underlying error.
        #[source]
        source: ShapeError,
    },
    /// The volume hierarchy is invalid.
    #[error(transparent)]
    Volume(#[from] VolumeError),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;

/// Unit of Euler angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AngleUnit {
    /// Degrees.
    #[default]
    #[serde(rename = "deg")]
    Degree,
    /// Radians.
    #[serde(rename = "rad")]
    Radian,
}

impl AngleUnit {
    fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleUnit::Degree => angle.to_radians(),
            AngleUnit::Radian => angle,
        }
    }
}

/// A named material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescription {
    /// Material name.
    pub name: String,
    /// Density in g/cm³.
    pub density: f64,
}

/// A translation with its length unit. Missing components are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionDescription {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
    /// Unit of the components.
    pub unit: LengthUnit,
}

impl PositionDescription {
    /// Translation in centimetres.
    pub fn to_vector(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z) * self.unit.to_centimeters()
    }
}

/// Euler angles with their unit and convention. Missing angles are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationDescription {
    /// First rotation, about Z.
    pub psi: f64,
    /// Second rotation.
    pub theta: f64,
    /// Third rotation.
    pub phi: f64,
    /// Unit of the angles.
    pub unit: AngleUnit,
    /// Axis sequence.
    pub convention: EulerConvention,
}

impl RotationDescription {
    /// The described rotation.
    pub fn to_rotation(&self) -> Rotation {
        Rotation::from_euler(
            self.unit.to_radians(self.psi),
            self.unit.to_radians(self.theta),
            self.unit.to_radians(self.phi),
            self.convention,
        )
    }
}

/// A named solid.
///
/// `type` is either a registry shape name (`box`, `sphere`, ...) built from
/// `params` in `unit`, or one of `union`, `intersection` and `subtraction`
/// combining the solids named by `first` and `second`.
///
/// For a primitive, `position` and `rotation` place the shape itself. For a
/// boolean they place `second` relative to `first`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidDescription {
    /// Solid name.
    pub name: String,
    /// Shape kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Unit of length-valued params.
    #[serde(default)]
    pub unit: LengthUnit,
    /// Constructor parameters.
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    /// First operand of a boolean.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Second operand of a boolean.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    /// Placement translation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionDescription>,
    /// Placement rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationDescription>,
}

/// A daughter placed inside the enclosing volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementDescription {
    /// Placement name; defaults to `<volume>_<index>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Name of the placed volume.
    pub volume: String,
    /// Translation inside the mother.
    #[serde(default)]
    pub position: PositionDescription,
    /// Rotation inside the mother, applied before the translation.
    #[serde(default)]
    pub rotation: RotationDescription,
}

/// A named volume: a solid filled with a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDescription {
    /// Volume name.
    pub name: String,
    /// Name of the filling material.
    pub material: String,
    /// Name of the bounding solid.
    pub solid: String,
    /// Daughters placed in this volume.
    #[serde(default)]
    pub placements: Vec<PlacementDescription>,
}

/// A complete scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Name of the root volume.
    pub world: String,
    /// Query parameters.
    #[serde(default)]
    pub settings: TraceSettings,
    /// Materials.
    #[serde(default)]
    pub materials: Vec<MaterialDescription>,
    /// Solids, in dependency order.
    #[serde(default)]
    pub solids: Vec<SolidDescription>,
    /// Volumes.
    #[serde(default)]
    pub volumes: Vec<VolumeDescription>,
}

fn insert_unique<'a, V>(
    map: &mut HashMap<&'a str, V>,
    kind: &'static str,
    name: &'a str,
    value: V,
) -> Result<()> {
    if map.insert(name, value).is_some() {
        return Err(SceneError::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn lookup<'m, V>(map: &'m HashMap<&str, V>, kind: &'static str, name: &str) -> Result<&'m V> {
    map.get(name).ok_or_else(|| SceneError::UndefinedReference {
        kind,
        name: name.to_string(),
    })
}

impl SceneDescription {
    /// Parse a scene from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a scene file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading scene");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Build the world, constructing primitives through `registry`.
    pub fn build(&self, registry: &ShapeRegistry) -> Result<World> {
        let mut materials = HashMap::new();
        for m in &self.materials {
            let material = Arc::new(Material::new(m.name.clone(), m.density)?);
            insert_unique(&mut materials, "material", &m.name, material)?;
        }

        let mut solids = HashMap::new();
        for solid in &self.solids {
            let shape = Arc::new(Self::build_solid(solid, &solids, registry)?);
            insert_unique(&mut solids, "solid", &solid.name, shape)?;
        }

        let mut builder = GeometryBuilder::new();
        let mut volumes: HashMap<&str, LogicalVolumeId> = HashMap::new();
        for v in &self.volumes {
            let material = lookup(&materials, "material", &v.material)?;
            let shape = lookup(&solids, "solid", &v.solid)?;
            let id = builder.add_volume(v.name.clone(), Arc::clone(material), Arc::clone(shape));
            insert_unique(&mut volumes, "volume", &v.name, id)?;
        }

        let mut placements = 0;
        for v in &self.volumes {
            let mother = *lookup(&volumes, "volume", &v.name)?;
            for (index, p) in v.placements.iter().enumerate() {
                let daughter = *lookup(&volumes, "volume", &p.volume)?;
                let name = p
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}_{}", p.volume, index));
                builder.place_at(
                    name,
                    daughter,
                    mother,
                    &p.rotation.to_rotation(),
                    &p.position.to_vector(),
                )?;
                placements += 1;
            }
        }

        let root = *lookup(&volumes, "volume", &self.world)?;
        let world = builder.build(root, self.settings)?;
        info!(
            world = %self.world,
            materials = materials.len(),
            solids = solids.len(),
            volumes = volumes.len(),
            placements,
            "scene built"
        );
        Ok(world)
    }

    fn build_solid(
        solid: &SolidDescription,
        defined: &HashMap<&str, Arc<Shape>>,
        registry: &ShapeRegistry,
    ) -> Result<Shape> {
        let shape_error = |source: ShapeError| SceneError::Shape {
            name: solid.name.clone(),
            source,
        };
        let rotation = solid
            .rotation
            .map(|r| r.to_rotation())
            .unwrap_or_else(Rotation::identity);
        let translation = solid
            .position
            .map(|p| p.to_vector())
            .unwrap_or_else(Vec3::zeros);

        let combine: fn(Arc<Shape>, Arc<Shape>) -> Shape = match solid.kind.as_str() {
            "union" => Shape::union,
            "intersection" => Shape::intersection,
            "subtraction" => Shape::difference,
            kind => {
                let params = ShapeParams {
                    values: solid.params.clone(),
                    unit: solid.unit,
                };
                return registry
                    .construct(kind, &params)
                    .and_then(|shape| shape.placed(&rotation, &translation))
                    .map_err(shape_error);
            }
        };

        let (Some(first), Some(second)) = (&solid.first, &solid.second) else {
            return Err(SceneError::MissingOperand(solid.name.clone()));
        };
        let first = Arc::clone(lookup(defined, "solid", first)?);
        let second = lookup(defined, "solid", second)?;
        let second = if solid.position.is_some() || solid.rotation.is_some() {
            let placed = Shape::clone(second)
                .placed(&rotation, &translation)
                .map_err(shape_error)?;
            Arc::new(placed)
        } else {
            Arc::clone(second)
        };
        Ok(combine(first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};
    use stratum_math::{Point3, Ray};

    const NESTED: &str = r#"
world = "world"

[settings]
max_steps = 256

[[materials]]
name = "Air"
density = 0.0012

[[materials]]
name = "Water"
density = 1.0

[[materials]]
name = "Lead"
density = 11.35

[[solids]]
name = "world_box"
type = "box"
params = { x = 4.0, y = 4.0, z = 4.0 }

[[solids]]
name = "outer_box"
type = "box"
unit = "mm"
params = { x = 20.0, y = 20.0, z = 20.0 }

[[solids]]
name = "inner_box"
type = "box"
params = { x = 1.0, y = 1.0, z = 1.0 }

[[volumes]]
name = "world"
material = "Air"
solid = "world_box"

[[volumes.placements]]
volume = "outer"

[[volumes]]
name = "outer"
material = "Water"
solid = "outer_box"

[[volumes.placements]]
name = "tilted"
volume = "inner"
rotation = { phi = 45.0 }

[[volumes]]
name = "inner"
material = "Lead"
solid = "inner_box"
"#;

    fn build(text: &str) -> Result<World> {
        SceneDescription::from_toml_str(text)?.build(&ShapeRegistry::with_builtin_shapes())
    }

    #[test]
    fn test_parse_defaults() {
        let scene = SceneDescription::from_toml_str(NESTED).unwrap();
        assert_eq!(scene.world, "world");
        assert_eq!(scene.settings.max_steps, 256);
        assert_eq!(scene.settings.epsilon, TraceSettings::default().epsilon);
        assert_eq!(scene.solids[0].unit, LengthUnit::Centimeter);
        assert_eq!(scene.solids[1].unit, LengthUnit::Millimeter);

        let placement = &scene.volumes[1].placements[0];
        assert_eq!(placement.name.as_deref(), Some("tilted"));
        assert_eq!(placement.rotation.unit, AngleUnit::Degree);
        assert_eq!(placement.rotation.convention, EulerConvention::Zyx);
        assert_eq!(placement.position, PositionDescription::default());
    }

    #[test]
    fn test_nested_scene_segments() {
        let world = build(NESTED).unwrap();
        let ray = Ray::new(Point3::new(0.0, 0.0, -2.0), Vec3::z()).unwrap();
        let segments = world.line_segments(&ray);

        let expected = [
            ("Air", 1.0),
            ("Water", 1.0 - FRAC_1_SQRT_2),
            ("Lead", SQRT_2),
            ("Water", 1.0 - FRAC_1_SQRT_2),
            ("Air", 1.0),
        ];
        assert_eq!(segments.len(), expected.len());
        for (segment, (material, length)) in segments.iter().zip(expected) {
            assert_eq!(segment.material.name(), material);
            assert_relative_eq!(segment.length(), length, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_demo_scene_builds() {
        let world = build(include_str!("../../../demos/nested_boxes.toml")).unwrap();
        assert_eq!(world.root_volume().name(), "world");
        assert_eq!(world.store().logical_volumes().count(), 3);
        assert_relative_eq!(
            world.volume(world.root()).unwrap(),
            64.0 - (8.0 - 1.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_default_placement_names() {
        let world = build(NESTED).unwrap();
        let mut names: Vec<&str> = world
            .store()
            .physical_volumes()
            .map(|(_, pv)| pv.name())
            .collect();
        names.sort_unstable();
        assert_eq!(names, ["outer_0", "tilted"]);
    }

    #[test]
    fn test_boolean_solid_with_placed_operand() {
        let text = r#"
world = "world"

[[materials]]
name = "Air"
density = 0.0012

[[solids]]
name = "block"
type = "box"
params = { x = 4.0, y = 4.0, z = 4.0 }

[[solids]]
name = "hole"
type = "sphere"
params = { r = 1.0 }

[[solids]]
name = "drilled"
type = "subtraction"
first = "block"
second = "hole"
position = { x = 1.0 }

[[volumes]]
name = "world"
material = "Air"
solid = "drilled"
"#;
        let world = build(text).unwrap();
        assert!(!world.in_world(&Point3::new(1.0, 0.0, 0.0)));
        assert!(!world.in_world(&Point3::new(1.5, 0.0, 0.0)));
        assert!(world.in_world(&Point3::new(-1.5, 0.0, 0.0)));
        assert!(!world.in_world(&Point3::new(0.0, 0.0, 3.0)));
    }

    #[test]
    fn test_placement_units() {
        let text = r#"
world = "world"

[[materials]]
name = "Air"
density = 0.0

[[materials]]
name = "Iron"
density = 7.87

[[solids]]
name = "hall"
type = "box"
unit = "m"
params = { x = 2.0, y = 2.0, z = 2.0 }

[[solids]]
name = "ball"
type = "orb"
unit = "mm"
params = { r = 10.0 }

[[volumes]]
name = "world"
material = "Air"
solid = "hall"

[[volumes.placements]]
volume = "ball"
position = { x = 0.5, unit = "m" }

[[volumes]]
name = "ball"
material = "Iron"
solid = "ball"
"#;
        let world = build(text).unwrap();
        let hit = world
            .ray_trace(&Ray::new(Point3::origin(), Vec3::x()).unwrap())
            .unwrap();
        assert_relative_eq!(hit.distance, 49.0, epsilon = 1e-9);
        assert_relative_eq!(
            world.mass(world.root()).unwrap(),
            7.87 * 4.0 / 3.0 * std::f64::consts::PI,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_custom_registry() {
        fn cube(params: &ShapeParams) -> stratum_shapes::Result<Shape> {
            let h = params.length("edge")? / 2.0;
            Shape::cuboid(Vec3::new(h, h, h))
        }

        let text = r#"
world = "world"

[[materials]]
name = "Air"
density = 0.0012

[[solids]]
name = "room"
type = "cube"
params = { edge = 6.0 }

[[volumes]]
name = "world"
material = "Air"
solid = "room"
"#;
        let scene = SceneDescription::from_toml_str(text).unwrap();
        assert!(matches!(
            scene.build(&ShapeRegistry::with_builtin_shapes()),
            Err(SceneError::Shape {
                source: ShapeError::UnknownShape(_),
                ..
            })
        ));

        let mut registry = ShapeRegistry::new();
        registry.register("cube", cube);
        let world = scene.build(&registry).unwrap();
        assert!(world.in_world(&Point3::new(2.9, 0.0, 0.0)));
        assert!(!world.in_world(&Point3::new(3.1, 0.0, 0.0)));
    }

    #[test]
    fn test_undefined_references() {
        let missing_material = NESTED.replace("material = \"Lead\"", "material = \"Gold\"");
        assert!(matches!(
            build(&missing_material),
            Err(SceneError::UndefinedReference { kind: "material", name }) if name == "Gold"
        ));

        let missing_volume = NESTED.replace("world = \"world\"", "world = \"hall\"");
        assert!(matches!(
            build(&missing_volume),
            Err(SceneError::UndefinedReference { kind: "volume", name }) if name == "hall"
        ));

        let forward = r#"
world = "world"

[[solids]]
name = "both"
type = "union"
first = "a"
second = "b"

[[solids]]
name = "a"
type = "sphere"
params = { r = 1.0 }
"#;
        assert!(matches!(
            build(forward),
            Err(SceneError::UndefinedReference { kind: "solid", .. })
        ));
    }

    #[test]
    fn test_invalid_scenes() {
        let duplicate = NESTED.replace("name = \"Lead\"", "name = \"Water\"");
        assert!(matches!(
            build(&duplicate),
            Err(SceneError::DuplicateName { kind: "material", .. })
        ));

        let bad_unit = NESTED.replace("unit = \"mm\"", "unit = \"inch\"");
        assert!(matches!(build(&bad_unit), Err(SceneError::Parse(_))));

        let cycle = NESTED.replace(
            "[[volumes]]\nname = \"inner\"",
            "[[volumes]]\nname = \"inner\"\nplacements = [{ volume = \"outer\" }]",
        );
        assert!(matches!(
            build(&cycle),
            Err(SceneError::Volume(VolumeError::Cycle { .. }))
        ));

        let one_operand = r#"
world = "world"

[[solids]]
name = "a"
type = "sphere"
params = { r = 1.0 }

[[solids]]
name = "lonely"
type = "union"
first = "a"
"#;
        assert!(matches!(
            build(one_operand),
            Err(SceneError::MissingOperand(name)) if name == "lonely"
        ));

        let negative = NESTED.replace("x = 1.0, y = 1.0", "x = -1.0, y = 1.0");
        assert!(matches!(
            build(&negative),
            Err(SceneError::Shape {
                source: ShapeError::InvalidParameter { .. },
                ..
            })
        ));
    }
}
