//! Hierarchical ray traversal into material line segments.
//!
//! The traversal keeps an explicit stack of frames. Each frame is a
//! logical volume together with the transform from world coordinates into
//! that volume's local coordinates. From the current frame the ray either
//! enters the nearest daughter (push) or leaves through the volume's own
//! boundary (pop); every transition emits the segment travelled inside the
//! current volume.
//!
//! Ray parameters are the same in every frame because transforms keep the
//! ray's parametrization, so all bookkeeping is done in the world ray's
//! parameter `t` and segment end points are evaluated on the world ray.
//! Shared boundaries are therefore bit-identical between consecutive
//! segments.

use std::sync::Arc;

use stratum_math::{AffineTransform, Point3, Ray};
use tracing::{debug, trace};

use crate::{LogicalVolumeId, Material, World};

/// A straight piece of a ray inside a single volume's material.
#[derive(Debug, Clone)]
pub struct LineSegment {
    /// Entry point, world frame.
    pub start: Point3,
    /// Exit point, world frame.
    pub end: Point3,
    /// Material filling the volume.
    pub material: Arc<Material>,
    /// The logical volume (and hence the shape) the segment lies in.
    pub shape_id: LogicalVolumeId,
}

impl LineSegment {
    /// Length of the segment.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// A volume being traversed and the world-to-local transform reaching it.
#[derive(Debug, Clone, Copy)]
struct Frame {
    volume: LogicalVolumeId,
    to_local: AffineTransform,
}

impl World {
    /// Ordered material segments along `ray`, in world coordinates.
    ///
    /// Traversal starts in the deepest volume containing the ray origin. A
    /// ray starting outside the world is first advanced to where it enters;
    /// a ray missing the world yields no segments.
    pub fn line_segments(&self, ray: &Ray) -> Vec<LineSegment> {
        let root = self.root_volume();
        let mut t = 0.0;
        if root.signed_distance(&ray.origin) > 0.0 {
            let entry = root.shape.intersect(ray);
            if !entry.is_finite() {
                return Vec::new();
            }
            t = entry;
        }
        let start = Frame {
            volume: self.root,
            to_local: AffineTransform::identity(),
        };
        self.traverse(ray, start, t)
    }

    /// Ordered material segments along `ray`, starting inside `volume`.
    ///
    /// `to_local` maps world coordinates into `volume`'s local frame; the
    /// ray and the returned segments are in world coordinates. Traversal
    /// ends when the ray leaves `volume`.
    pub fn line_segments_in(
        &self,
        volume: LogicalVolumeId,
        to_local: &AffineTransform,
        ray: &Ray,
    ) -> crate::Result<Vec<LineSegment>> {
        self.logical_volume(volume)?;
        let start = Frame {
            volume,
            to_local: *to_local,
        };
        Ok(self.traverse(ray, start, 0.0))
    }

    /// Deepest volume below the root containing `p`, with the transform
    /// from world coordinates into its frame.
    pub fn locate(&self, p: &Point3) -> (LogicalVolumeId, AffineTransform) {
        let start = Frame {
            volume: self.root,
            to_local: AffineTransform::identity(),
        };
        let frame = self
            .frames_containing(start, p)
            .pop()
            .unwrap_or(start);
        (frame.volume, frame.to_local)
    }

    /// `start` followed by the chain of daughters containing `p`.
    ///
    /// Points on a daughter's boundary count as inside it.
    fn frames_containing(&self, start: Frame, p: &Point3) -> Vec<Frame> {
        let mut stack = vec![start];
        self.descend(&mut stack, p, |d| d <= 0.0);
        stack
    }

    /// Push the chain of daughters below the top of `stack` whose signed
    /// distance to `p` satisfies `inside`.
    fn descend(&self, stack: &mut Vec<Frame>, p: &Point3, inside: impl Fn(f64) -> bool) {
        while let Some(frame) = stack.last().copied() {
            let local = frame.to_local.apply_point(p);
            let found = self.lv(frame.volume).daughters.iter().find_map(|id| {
                let pv = self.pv(*id);
                let daughter_local = pv.to_local.apply_point(&local);
                inside(self.lv(pv.logical).signed_distance(&daughter_local)).then_some(pv)
            });
            let Some(pv) = found else {
                return;
            };
            stack.push(Frame {
                volume: pv.logical,
                to_local: pv.to_local * frame.to_local,
            });
        }
    }

    fn traverse(&self, ray: &Ray, start: Frame, mut t: f64) -> Vec<LineSegment> {
        let eps = self.settings.surface_epsilon;
        let mut stack = self.frames_containing(start, &ray.at(t));
        let mut segments = Vec::new();

        while let Some(frame) = stack.last().copied() {
            let volume = self.lv(frame.volume);
            // Step off the boundary just crossed; the step is still counted
            // in the segment because it starts at `t`.
            let from = t + eps;
            let local_ray = frame.to_local.apply_ray(&ray.advanced(from));

            let exit = volume.shape.intersect(&local_ray);
            let entry = self.nearest_daughter(volume, &local_ray);

            match entry {
                Some(hit) if hit.distance <= exit => {
                    let end = from + hit.distance;
                    segments.push(self.segment(ray, t, end, frame.volume));
                    let pv = self.pv(hit.physical);
                    trace!(from = %volume.name, into = %self.lv(pv.logical).name, t = end, "descend");
                    stack.push(Frame {
                        volume: pv.logical,
                        to_local: pv.to_local * frame.to_local,
                    });
                    t = end;
                    // A face shared with a grand-daughter leads straight into it.
                    self.descend(&mut stack, &ray.at(t + eps), |d| d < 0.0);
                }
                _ if exit.is_finite() => {
                    let end = from + exit;
                    segments.push(self.segment(ray, t, end, frame.volume));
                    trace!(from = %volume.name, t = end, "exit");
                    stack.pop();
                    t = end;
                    // A face shared with a sibling leads straight into it.
                    self.descend(&mut stack, &ray.at(t + eps), |d| d < 0.0);
                }
                _ if stack.len() > 1 => {
                    // Grazed the daughter's boundary without entering it.
                    trace!(volume = %volume.name, t, "grazing contact, returning to mother");
                    stack.pop();
                }
                _ => break,
            }
        }

        debug!(segments = segments.len(), "ray traversal finished");
        segments
    }

    fn segment(&self, ray: &Ray, t0: f64, t1: f64, volume: LogicalVolumeId) -> LineSegment {
        LineSegment {
            start: ray.at(t0),
            end: ray.at(t1),
            material: Arc::clone(&self.lv(volume).material),
            shape_id: volume,
        }
    }
}
