//! Logical and physical volumes and the arena that owns them.

use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};
use stratum_math::{AffineTransform, Point3};
use stratum_shapes::Shape;

use crate::{Material, Result, VolumeError};

new_key_type! {
    /// Handle to a [`LogicalVolume`] in a [`VolumeStore`].
    pub struct LogicalVolumeId;
    /// Handle to a [`PhysicalVolume`] in a [`VolumeStore`].
    pub struct PhysicalVolumeId;
}

/// A kind of volume: a shape filled with a material, with placed daughters.
///
/// The same logical volume may be placed any number of times.
#[derive(Debug, Clone)]
pub struct LogicalVolume {
    pub(crate) name: String,
    pub(crate) material: Arc<Material>,
    pub(crate) shape: Arc<Shape>,
    pub(crate) daughters: Vec<PhysicalVolumeId>,
    pub(crate) mother: Option<LogicalVolumeId>,
}

impl LogicalVolume {
    /// Volume name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filling material.
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Bounding shape in the volume's local frame.
    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// Placed daughters, in placement order.
    pub fn daughters(&self) -> &[PhysicalVolumeId] {
        &self.daughters
    }

    /// The volume this one was most recently placed into.
    pub fn mother(&self) -> Option<LogicalVolumeId> {
        self.mother
    }

    /// Signed distance to the bounding shape, in local coordinates.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.shape.signed_distance(p)
    }
}

/// A placement of a logical volume inside a mother volume.
#[derive(Debug, Clone)]
pub struct PhysicalVolume {
    pub(crate) name: String,
    pub(crate) logical: LogicalVolumeId,
    pub(crate) to_local: AffineTransform,
    pub(crate) mother: LogicalVolumeId,
}

impl PhysicalVolume {
    /// Placement name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The placed logical volume.
    pub fn logical(&self) -> LogicalVolumeId {
        self.logical
    }

    /// Maps the mother's local coordinates into the placed volume's.
    pub fn to_local(&self) -> &AffineTransform {
        &self.to_local
    }

    /// The logical volume this placement lives in.
    pub fn mother(&self) -> LogicalVolumeId {
        self.mother
    }
}

/// Arena owning every volume of a hierarchy.
///
/// Volumes refer to each other only through ids.
#[derive(Debug, Clone, Default)]
pub struct VolumeStore {
    pub(crate) logical: SlotMap<LogicalVolumeId, LogicalVolume>,
    pub(crate) physical: SlotMap<PhysicalVolumeId, PhysicalVolume>,
}

impl VolumeStore {
    /// Look up a logical volume.
    pub fn logical(&self, id: LogicalVolumeId) -> Result<&LogicalVolume> {
        self.logical
            .get(id)
            .ok_or(VolumeError::UnknownLogicalVolume)
    }

    /// Look up a physical volume.
    pub fn physical(&self, id: PhysicalVolumeId) -> Result<&PhysicalVolume> {
        self.physical
            .get(id)
            .ok_or(VolumeError::UnknownPhysicalVolume)
    }

    /// All logical volumes.
    pub fn logical_volumes(&self) -> impl Iterator<Item = (LogicalVolumeId, &LogicalVolume)> {
        self.logical.iter()
    }

    /// All physical volumes.
    pub fn physical_volumes(&self) -> impl Iterator<Item = (PhysicalVolumeId, &PhysicalVolume)> {
        self.physical.iter()
    }

    /// Whether `target` is `from` or lies anywhere below it.
    pub(crate) fn reaches(&self, from: LogicalVolumeId, target: LogicalVolumeId) -> bool {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if let Some(lv) = self.logical.get(id) {
                stack.extend(
                    lv.daughters
                        .iter()
                        .filter_map(|pv| self.physical.get(*pv))
                        .map(|pv| pv.logical),
                );
            }
        }
        false
    }
}
