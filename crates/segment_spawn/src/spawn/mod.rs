//! Spawning pipeline: placement sites, patterns, collision-safe placement,
//! chain runs, and the events they emit.
pub mod chain;
pub mod events;
pub mod pattern;
pub mod placement;
pub mod point;
