//! Construction of a volume hierarchy.

use std::sync::Arc;

use stratum_math::{AffineTransform, Rotation, Vec3};
use stratum_shapes::Shape;
use tracing::debug;

use crate::{
    LogicalVolume, LogicalVolumeId, Material, PhysicalVolume, PhysicalVolumeId, Result,
    TraceSettings, VolumeError, VolumeStore, World,
};

/// Mutable construction phase of a [`World`].
///
/// Volumes are added and placed here; [`GeometryBuilder::build`] freezes
/// the hierarchy into an immutable world that can be queried from many
/// threads.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    store: VolumeStore,
}

impl GeometryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logical volume.
    pub fn add_volume(
        &mut self,
        name: impl Into<String>,
        material: Arc<Material>,
        shape: Arc<Shape>,
    ) -> LogicalVolumeId {
        self.store.logical.insert(LogicalVolume {
            name: name.into(),
            material,
            shape,
            daughters: Vec::new(),
            mother: None,
        })
    }

    /// Place `daughter` inside `mother`.
    ///
    /// `placement` maps the daughter's local coordinates into the mother's.
    /// Fails on unknown ids, a singular placement, or a placement that
    /// would make a volume contain itself.
    pub fn place(
        &mut self,
        name: impl Into<String>,
        daughter: LogicalVolumeId,
        mother: LogicalVolumeId,
        placement: &AffineTransform,
    ) -> Result<PhysicalVolumeId> {
        let daughter_name = self.store.logical(daughter)?.name.clone();
        let mother_name = self.store.logical(mother)?.name.clone();
        if self.store.reaches(daughter, mother) {
            return Err(VolumeError::Cycle {
                daughter: daughter_name,
                mother: mother_name,
            });
        }

        let to_local = placement.inverse()?;
        let name = name.into();
        debug!(placement = %name, daughter = %daughter_name, mother = %mother_name, "placing volume");

        let id = self.store.physical.insert(PhysicalVolume {
            name,
            logical: daughter,
            to_local,
            mother,
        });
        if let Some(lv) = self.store.logical.get_mut(mother) {
            lv.daughters.push(id);
        }
        if let Some(lv) = self.store.logical.get_mut(daughter) {
            lv.mother = Some(mother);
        }
        Ok(id)
    }

    /// Place `daughter` inside `mother`, rotated then translated.
    pub fn place_at(
        &mut self,
        name: impl Into<String>,
        daughter: LogicalVolumeId,
        mother: LogicalVolumeId,
        rotation: &Rotation,
        translation: &Vec3,
    ) -> Result<PhysicalVolumeId> {
        self.place(
            name,
            daughter,
            mother,
            &AffineTransform::from_parts(rotation, translation),
        )
    }

    /// Look up a logical volume added so far.
    pub fn logical(&self, id: LogicalVolumeId) -> Result<&LogicalVolume> {
        self.store.logical(id)
    }

    /// Freeze the hierarchy with `root` as the world volume.
    pub fn build(self, root: LogicalVolumeId, settings: TraceSettings) -> Result<World> {
        settings.validate()?;
        let root_volume = self.store.logical(root)?;
        if root_volume.mother.is_some() {
            return Err(VolumeError::RootPlaced(root_volume.name.clone()));
        }
        debug!(
            root = %root_volume.name,
            logical = self.store.logical.len(),
            physical = self.store.physical.len(),
            "geometry built"
        );
        Ok(World::new(self.store, root, settings))
    }
}
