//! Narrow interface to the hosting engine.
//!
//! The spawning pipeline never talks to an engine directly. Everything it
//! needs from the outside world is expressed by [`HostWorld`]: cloning a
//! prototype into a fresh instance, toggling and querying an instance's
//! activity flag, reading and writing world positions, box obstruction
//! queries for collision-safe placement, and scoping instances under a
//! named container. Positions cross this boundary as [`mint::Vector2`] so
//! any math library with mint interop can implement it.
//!
//! [`MemoryWorld`] is an in-crate reference implementation backed by plain
//! tables, used by the crate's own tests and suitable for headless runs.
use mint::Vector2;

pub mod memory;

pub use memory::MemoryWorld;

/// Identifier of a prototype kind, e.g. `"barrier"` or `"coin"`.
pub type KindId = String;

/// Opaque handle to an engine-owned instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

/// Bit set of obstruction layers consulted by [`HostWorld::is_obstructed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// Mask containing the single layer `bit` (0..32).
    pub fn layer(bit: u32) -> Self {
        LayerMask(1 << bit)
    }

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

/// Host-engine services required by pools, spawn points, and chain spawners.
///
/// Implementations are expected to be cheap per call; every method is invoked
/// synchronously from within a simulation tick. An instance's activity flag
/// is owned by the host — the pipeline queries it and never caches it.
pub trait HostWorld {
    /// Clones the prototype registered under `kind` into a fresh, inactive
    /// instance. Returns `None` when no such prototype exists.
    fn clone_prototype(&mut self, kind: &str) -> Option<Handle>;

    fn is_active(&self, handle: Handle) -> bool;

    fn set_active(&mut self, handle: Handle, active: bool);

    fn position(&self, handle: Handle) -> Vector2<f32>;

    fn set_position(&mut self, handle: Handle, position: Vector2<f32>);

    /// Authored placement offset of the instance, applied on top of the
    /// destination chosen by a spawn point. Defaults to zero.
    fn spawn_offset(&self, handle: Handle) -> Vector2<f32> {
        let _ = handle;
        Vector2 { x: 0.0, y: 0.0 }
    }

    /// Tests whether a box of `footprint` extents centered on `point`
    /// overlaps any obstruction on the given layers.
    fn is_obstructed(
        &self,
        point: Vector2<f32>,
        footprint: Vector2<f32>,
        mask: LayerMask,
    ) -> bool;

    /// Moves `handle` under the named container so pooled instances never
    /// leak into unrelated scene roots.
    fn assign_scope(&mut self, handle: Handle, scope: &str);
}
