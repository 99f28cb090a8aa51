//! The frozen hierarchy and its point and ray queries.

use rayon::prelude::*;
use serde::Serialize;
use stratum_math::{Point3, Ray};
use tracing::debug;

use crate::{
    LineSegment, LogicalVolume, LogicalVolumeId, PhysicalVolume, PhysicalVolumeId, Result,
    TraceSettings, VolumeError, VolumeStore,
};

/// The nearest daughter crossed by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaughterHit {
    /// Ray parameter of the entry point.
    pub distance: f64,
    /// Position of the daughter in its mother's daughter list.
    pub index: usize,
    /// The daughter placement.
    pub physical: PhysicalVolumeId,
}

/// Outcome of a sphere-tracing query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SphereTraceResult {
    /// Whether the march converged onto a daughter surface.
    pub hit: bool,
    /// Distance marched along the ray.
    pub distance: f64,
    /// Number of steps taken.
    pub steps: usize,
    /// Nearest daughter when the march stopped, if the volume has any.
    pub daughter_index: Option<usize>,
}

/// Root of an immutable volume hierarchy.
///
/// All queries take `&self`, so a world can be shared between threads and
/// queried concurrently.
#[derive(Debug, Clone)]
pub struct World {
    store: VolumeStore,
    pub(crate) root: LogicalVolumeId,
    pub(crate) settings: TraceSettings,
}

impl World {
    pub(crate) fn new(store: VolumeStore, root: LogicalVolumeId, settings: TraceSettings) -> Self {
        Self {
            store,
            root,
            settings,
        }
    }

    /// The root logical volume id.
    pub fn root(&self) -> LogicalVolumeId {
        self.root
    }

    /// The root logical volume.
    pub fn root_volume(&self) -> &LogicalVolume {
        self.lv(self.root)
    }

    /// Query settings.
    pub fn settings(&self) -> &TraceSettings {
        &self.settings
    }

    /// The volume arena.
    pub fn store(&self) -> &VolumeStore {
        &self.store
    }

    /// Look up a logical volume.
    pub fn logical_volume(&self, id: LogicalVolumeId) -> Result<&LogicalVolume> {
        self.store.logical(id)
    }

    /// Look up a physical volume.
    pub fn physical_volume(&self, id: PhysicalVolumeId) -> Result<&PhysicalVolume> {
        self.store.physical(id)
    }

    // Ids stored inside the arena always refer to the same arena.
    pub(crate) fn lv(&self, id: LogicalVolumeId) -> &LogicalVolume {
        &self.store.logical[id]
    }

    pub(crate) fn pv(&self, id: PhysicalVolumeId) -> &PhysicalVolume {
        &self.store.physical[id]
    }

    /// Signed distance to the world boundary.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        self.root_volume().signed_distance(p)
    }

    /// Whether `p` lies inside the world or on its boundary.
    pub fn in_world(&self, p: &Point3) -> bool {
        self.signed_distance(p) <= 0.0
    }

    /// Nearest daughter of the root crossed by `ray`.
    pub fn ray_trace(&self, ray: &Ray) -> Option<DaughterHit> {
        self.nearest_daughter(self.root_volume(), ray)
    }

    /// Nearest daughter of `volume` crossed by `ray`, given in the
    /// volume's local frame.
    pub fn ray_trace_in(&self, volume: LogicalVolumeId, ray: &Ray) -> Result<Option<DaughterHit>> {
        Ok(self.nearest_daughter(self.logical_volume(volume)?, ray))
    }

    /// Linear scan over the daughters; the first of equally near ones wins.
    pub(crate) fn nearest_daughter(&self, volume: &LogicalVolume, ray: &Ray) -> Option<DaughterHit> {
        let mut best: Option<DaughterHit> = None;
        for (index, id) in volume.daughters.iter().enumerate() {
            let pv = self.pv(*id);
            let distance = self
                .lv(pv.logical)
                .shape
                .intersect(&pv.to_local.apply_ray(ray));
            if distance.is_finite() && best.map_or(true, |b| distance < b.distance) {
                best = Some(DaughterHit {
                    distance,
                    index,
                    physical: *id,
                });
            }
        }
        best
    }

    /// Signed distance from `p` (local to `volume`) to the nearest daughter,
    /// and that daughter's index.
    fn nearest_daughter_distance(&self, volume: &LogicalVolume, p: &Point3) -> Option<(f64, usize)> {
        let mut best: Option<(f64, usize)> = None;
        for (index, id) in volume.daughters.iter().enumerate() {
            let pv = self.pv(*id);
            let d = self.lv(pv.logical).signed_distance(&pv.to_local.apply_point(p));
            if best.map_or(true, |(b, _)| d < b) {
                best = Some((d, index));
            }
        }
        best
    }

    /// March `ray` towards the root's daughters.
    pub fn sphere_trace(&self, ray: &Ray) -> SphereTraceResult {
        self.march(self.root_volume(), ray)
    }

    /// March `ray`, given in `volume`'s local frame, towards its daughters.
    pub fn sphere_trace_in(&self, volume: LogicalVolumeId, ray: &Ray) -> Result<SphereTraceResult> {
        Ok(self.march(self.logical_volume(volume)?, ray))
    }

    /// Step along the ray by the absolute distance to the nearest daughter
    /// until that distance drops below `epsilon` (hit), the step budget is
    /// spent, or the point leaves `volume` (miss).
    fn march(&self, volume: &LogicalVolume, ray: &Ray) -> SphereTraceResult {
        let mut result = SphereTraceResult {
            hit: false,
            distance: 0.0,
            steps: 0,
            daughter_index: None,
        };
        loop {
            let p = ray.at(result.distance);
            if volume.signed_distance(&p) > 0.0 {
                break;
            }
            let Some((d, index)) = self.nearest_daughter_distance(volume, &p) else {
                break;
            };
            result.daughter_index = Some(index);
            if d.abs() < self.settings.epsilon {
                result.hit = true;
                break;
            }
            if result.steps >= self.settings.max_steps {
                break;
            }
            result.distance += d.abs();
            result.steps += 1;
        }
        debug!(
            hit = result.hit,
            steps = result.steps,
            distance = result.distance,
            "sphere trace finished"
        );
        result
    }

    /// Segments for many rays, computed in parallel.
    pub fn line_segments_batch(&self, rays: &[Ray]) -> Vec<Vec<LineSegment>> {
        rays.par_iter().map(|ray| self.line_segments(ray)).collect()
    }

    /// Volume of the material in `id`: its shape's volume minus the net
    /// volume of every placed daughter, recursively.
    ///
    /// Daughters are assumed to be contained and non-overlapping; this is
    /// not checked.
    pub fn volume(&self, id: LogicalVolumeId) -> Result<f64> {
        let lv = self.logical_volume(id)?;
        let own = lv
            .shape
            .volume()
            .ok_or_else(|| VolumeError::UndefinedVolume(lv.name.clone()))?;
        let daughters = lv
            .daughters
            .iter()
            .map(|pv| {
                let pv = self.pv(*pv);
                Ok(self.volume(pv.logical)? / pv.to_local.determinant().abs())
            })
            .sum::<Result<f64>>()?;
        Ok(own - daughters)
    }

    /// Mass of `id` including everything placed inside it.
    pub fn mass(&self, id: LogicalVolumeId) -> Result<f64> {
        let lv = self.logical_volume(id)?;
        let own = self.volume(id)? * lv.material.density();
        let daughters = lv
            .daughters
            .iter()
            .map(|pv| self.mass(self.pv(*pv).logical))
            .sum::<Result<f64>>()?;
        Ok(own + daughters)
    }

    /// Mass of the whole world.
    pub fn total_mass(&self) -> Result<f64> {
        self.mass(self.root)
    }
}
