//! Event types and sinks for observing spawn activity.
//!
//! Progress and scoring collaborators react to spawns without being wired
//! into the pipeline: anything implementing [`EventSink`] can be handed to
//! [`crate::segment::Segment::tick`] and receives a [`SpawnEvent`] per
//! lifecycle step. Sinks report which event kinds they want so emitters can
//! skip building payloads nobody listens to.
use glam::Vec2;

use crate::host::Handle;

/// Describes events emitted while a segment is in play.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum SpawnEvent {
    /// Emitted when a segment enters play.
    SegmentActivated {
        /// Simulation tick at activation.
        tick: u64,
    },

    /// Emitted when a segment leaves play.
    SegmentDeactivated {
        /// Simulation tick at deactivation.
        tick: u64,
        /// Tracked objects released without waiting for their own despawn.
        abandoned: usize,
    },

    /// Emitted when a spawn point activates a pooled object.
    Spawned {
        /// Identifier of the spawn point that placed the object.
        point: String,
        /// Handle of the activated instance.
        handle: Handle,
        /// Resolved world position.
        position: Vec2,
    },

    /// Emitted when a tracked object is observed deactivated.
    Despawned {
        /// Identifier of the spawn point that owned the object.
        point: String,
        /// Handle of the deactivated instance.
        handle: Handle,
    },

    /// Non-fatal warning generated during a spawn cycle.
    Warning {
        /// Context string (e.g. spawn point id, pooler name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant used by [`EventSink::wants`] filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEventKind {
    SegmentActivated,
    SegmentDeactivated,
    Spawned,
    Despawned,
    Warning,
}

impl SpawnEvent {
    pub fn kind(&self) -> SpawnEventKind {
        match self {
            SpawnEvent::SegmentActivated { .. } => SpawnEventKind::SegmentActivated,
            SpawnEvent::SegmentDeactivated { .. } => SpawnEventKind::SegmentDeactivated,
            SpawnEvent::Spawned { .. } => SpawnEventKind::Spawned,
            SpawnEvent::Despawned { .. } => SpawnEventKind::Despawned,
            SpawnEvent::Warning { .. } => SpawnEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`SpawnEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: SpawnEvent);

    /// Whether this sink cares about events of `kind`. Defaults to yes.
    fn wants(&self, kind: SpawnEventKind) -> bool {
        let _ = kind;
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: SpawnEvent) {}

    #[inline]
    fn wants(&self, _kind: SpawnEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(SpawnEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(SpawnEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(SpawnEvent),
{
    #[inline]
    fn send(&mut self, event: SpawnEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<SpawnEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<SpawnEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[SpawnEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: SpawnEvent) {
        self.events.push(event);
    }
}
