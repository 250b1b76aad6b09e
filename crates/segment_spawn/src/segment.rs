//! Level segment context: owns the poolers and placement sites of one
//! reusable level chunk and drives them through a frame-style tick loop.
//!
//! Everything here is single-threaded and cooperative. Activation never
//! spawns directly: it queues one deferred roll per placement site, due on
//! the following tick, so sibling systems finish their own activation
//! first. Deactivation cancels whatever is still queued, abandons tracked
//! objects without waiting for them to despawn on their own, and reclaims
//! every pool — an in-flight cycle can always be torn down cleanly.
use rand::RngCore;
use tracing::info;

use crate::difficulty::DifficultyWeightAdjuster;
use crate::host::HostWorld;
use crate::pool::pooler::MultiKindPooler;
use crate::pool::registry::PoolerRegistry;
use crate::spawn::chain::{ChainBounds, LayeredBreakables};
use crate::spawn::events::{EventSink, SpawnEvent, SpawnEventKind};
use crate::spawn::point::SpawnPoint;

#[derive(Debug, Clone, Copy)]
enum DeferredAction {
    RollPoint(usize),
    SpawnLayered(usize),
}

#[derive(Debug, Clone, Copy)]
struct Deferred {
    due_tick: u64,
    action: DeferredAction,
}

/// One segment's worth of spawning machinery.
pub struct Segment {
    id: String,
    registry: PoolerRegistry,
    points: Vec<SpawnPoint>,
    layered: Vec<LayeredBreakables>,
    adjusters: Vec<(String, DifficultyWeightAdjuster)>,
    none_chance: f32,
    deferred: Vec<Deferred>,
    tick: u64,
    active: bool,
    bounds: Option<ChainBounds>,
}

impl Segment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            registry: PoolerRegistry::new(),
            points: Vec::new(),
            layered: Vec::new(),
            adjusters: Vec::new(),
            none_chance: 0.0,
            deferred: Vec::new(),
            tick: 0,
            active: false,
            bounds: None,
        }
    }

    /// Segment-wide "spawn nothing" chance in [0, 1], used by points with
    /// no local override.
    pub fn with_none_chance(mut self, none_chance: f32) -> Self {
        self.none_chance = none_chance.clamp(0.0, 1.0);
        self
    }

    pub fn with_pooler(mut self, name: impl Into<String>, pooler: MultiKindPooler) -> Self {
        self.registry.insert(name, pooler);
        self
    }

    pub fn with_point(mut self, point: SpawnPoint) -> Self {
        self.points.push(point);
        self
    }

    pub fn with_layered(mut self, layered: LayeredBreakables) -> Self {
        self.layered.push(layered);
        self
    }

    /// Wires a difficulty adjuster to the weighted pooler registered under
    /// `pooler`.
    pub fn with_adjuster(
        mut self,
        pooler: impl Into<String>,
        adjuster: DifficultyWeightAdjuster,
    ) -> Self {
        self.adjusters.push((pooler.into(), adjuster));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Union bounds reported by the layered chain spawners, once they have
    /// run.
    pub fn bounds(&self) -> Option<ChainBounds> {
        self.bounds
    }

    pub fn registry(&self) -> &PoolerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PoolerRegistry {
        &mut self.registry
    }

    pub fn points(&self) -> &[SpawnPoint] {
        &self.points
    }

    /// Marks the segment in play and queues one deferred roll per placement
    /// site for the next tick. Idempotent while already active.
    pub fn activate(&mut self, sink: &mut dyn EventSink) {
        if self.active {
            return;
        }
        self.active = true;
        let due_tick = self.tick + 1;
        for i in 0..self.points.len() {
            self.deferred.push(Deferred {
                due_tick,
                action: DeferredAction::RollPoint(i),
            });
        }
        for i in 0..self.layered.len() {
            self.deferred.push(Deferred {
                due_tick,
                action: DeferredAction::SpawnLayered(i),
            });
        }
        info!(segment = %self.id, tick = self.tick, "segment activated");
        if sink.wants(SpawnEventKind::SegmentActivated) {
            sink.send(SpawnEvent::SegmentActivated { tick: self.tick });
        }
    }

    /// Takes the segment out of play: cancels pending deferred rolls,
    /// abandons tracked objects, and reclaims every pool.
    pub fn deactivate(&mut self, host: &mut dyn HostWorld, sink: &mut dyn EventSink) {
        if !self.active {
            return;
        }
        self.active = false;
        self.deferred.clear();
        self.bounds = None;
        let abandoned: usize = self.points.iter_mut().map(SpawnPoint::clear).sum();
        self.registry.reclaim_all(host);
        info!(segment = %self.id, tick = self.tick, abandoned, "segment deactivated");
        if sink.wants(SpawnEventKind::SegmentDeactivated) {
            sink.send(SpawnEvent::SegmentDeactivated {
                tick: self.tick,
                abandoned,
            });
        }
    }

    /// Advances one simulation tick: runs deferred actions that came due,
    /// then sweeps tracked objects for despawns.
    pub fn tick(&mut self, host: &mut dyn HostWorld, rng: &mut dyn RngCore, sink: &mut dyn EventSink) {
        self.tick += 1;

        let mut i = 0;
        while i < self.deferred.len() {
            if self.deferred[i].due_tick > self.tick {
                i += 1;
                continue;
            }
            let deferred = self.deferred.swap_remove(i);
            match deferred.action {
                DeferredAction::RollPoint(index) => {
                    self.points[index].roll(host, &mut self.registry, rng, sink, self.none_chance);
                }
                DeferredAction::SpawnLayered(index) => {
                    let bounds = self.layered[index].spawn(host, &mut self.registry, rng, sink);
                    self.bounds = Some(match self.bounds {
                        None => bounds,
                        Some(b) => ChainBounds {
                            min: b.min.min(bounds.min),
                            max: b.max.max(bounds.max),
                        },
                    });
                }
            }
        }

        for point in &mut self.points {
            point.sweep(host, sink);
        }
    }

    /// Inbound difficulty-change notification: reapplies every registered
    /// adjuster to its pooler's weight table.
    pub fn on_difficulty_changed(&mut self, level: i32) {
        for (name, adjuster) in &self.adjusters {
            if let Some(selector) = self
                .registry
                .get_mut(name)
                .and_then(MultiKindPooler::selector_mut)
            {
                adjuster.apply(level, selector);
            }
        }
    }
}
