#![forbid(unsafe_code)]
//! segment_spawn: Segment-driven spawning with weighted selection and
//! object pooling.
//!
//! Modules:
//! - host: narrow engine interface (activity flags, cloning, obstruction queries) and an in-memory reference world
//! - selection: weighted random selection with runtime-adjustable weights
//! - pool: object pools, multi-kind poolers, and the per-segment registry
//! - spawn: spawn points, patterns, collision-safe placement, chain runs, events
//! - difficulty: baseline-preserving weight rebalancing
//! - segment: per-segment lifecycle, deferred rolls, and the tick loop
//!
//! For examples and docs, see README and docs.rs.
pub mod difficulty;
pub mod error;
pub mod host;
pub mod pool;
pub mod segment;
pub mod selection;
pub mod spawn;

/// Convenient re-exports for common types. Import with `use segment_spawn::prelude::*;`.
pub mod prelude {
    pub use crate::difficulty::{DifficultyWeightAdjuster, WeightBinding};
    pub use crate::error::{Error, Result};
    pub use crate::host::{Handle, HostWorld, KindId, LayerMask, MemoryWorld};
    pub use crate::pool::pooler::{ChanceEntry, MultiKindPooler, PoolerConfig, WeightedEntry};
    pub use crate::pool::registry::PoolerRegistry;
    pub use crate::pool::{ObjectPool, PoolConfig};
    pub use crate::segment::Segment;
    pub use crate::selection::{WeightedSelector, WeightedSelectorBuilder};
    pub use crate::spawn::chain::{
        ChainBounds, ChainRun, ChainSpawner, LayerExtent, LayeredBreakables,
    };
    pub use crate::spawn::events::{
        EventSink, FnSink, SpawnEvent, SpawnEventKind, VecSink,
    };
    pub use crate::spawn::pattern::{PatternOffset, SpawnPattern};
    pub use crate::spawn::placement::{resolve, Axis, PlacementProbe};
    pub use crate::spawn::point::{SingleSpawner, SpawnPoint, SpawnState};
}
