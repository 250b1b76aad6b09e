//! Collision-safe placement search.
//!
//! Given a destination that may overlap level geometry, [`resolve`] probes
//! along one axis in fixed increments (alternating positive and negative
//! displacement) for the nearest clear position within a bounded range.
//! When nothing within range is clear the original destination is returned
//! unmodified: an occasional visual overlap beats dropping the spawn and
//! leaving a hole in the pacing.
use glam::Vec2;

use crate::host::{HostWorld, LayerMask};

/// Search axis for displacement probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    fn direction(self) -> Vec2 {
        match self {
            Axis::Horizontal => Vec2::X,
            Axis::Vertical => Vec2::Y,
        }
    }
}

/// Footprint and search parameters for [`resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementProbe {
    /// Box extents tested against obstructions.
    pub footprint: Vec2,
    /// Obstruction layers considered blocking.
    pub mask: LayerMask,
    /// Axis probed when the destination is blocked.
    pub axis: Axis,
    /// Probe increment in world units. Must be > 0.
    pub step: f32,
    /// Maximum displacement from the destination, inclusive.
    pub max_displacement: f32,
}

impl PlacementProbe {
    pub fn new(footprint: Vec2, mask: LayerMask) -> Self {
        Self {
            footprint,
            mask,
            axis: Axis::Vertical,
            step: 0.1,
            max_displacement: 1.0,
        }
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn with_max_displacement(mut self, max_displacement: f32) -> Self {
        self.max_displacement = max_displacement;
        self
    }
}

/// Resolves `destination` to the nearest clear position along the probe
/// axis, or returns it unchanged when the search range is exhausted.
pub fn resolve(host: &dyn HostWorld, destination: Vec2, probe: &PlacementProbe) -> Vec2 {
    let clear = |point: Vec2| !host.is_obstructed(point.into(), probe.footprint.into(), probe.mask);

    if clear(destination) {
        return destination;
    }
    if probe.step <= 0.0 {
        return destination;
    }

    let direction = probe.axis.direction();
    // The quotient can land just under an integer for decimal configs
    // (0.9 / 0.3 in f32); nudge it so the max-displacement probe stays
    // inclusive.
    let steps = (probe.max_displacement / probe.step + 1e-4).floor() as u32;
    for i in 1..=steps {
        let displacement = direction * (probe.step * i as f32);
        let forward = destination + displacement;
        if clear(forward) {
            return forward;
        }
        let backward = destination - displacement;
        if clear(backward) {
            return backward;
        }
    }

    destination
}
