//! Spawn points: placement sites driven by the segment lifecycle.
//!
//! A spawn point runs one cycle per segment activation:
//! Idle → Rolling → Placing → Tracking → Idle. The roll itself is deferred
//! by one tick through the segment's action queue so sibling systems (the
//! pooler registry in particular) finish their own activation first.
//!
//! Rolling draws "spawn nothing" before anything else, then a
//! [`SingleSpawner`] by weight, then one of that spawner's patterns by
//! weight. Placing acquires one pooled object per pattern offset, resolves
//! each destination through the collision-safe search, and activates the
//! object. Tracked objects deregister as the host reports them inactive;
//! segment teardown clears the set without waiting.
use glam::Vec2;
use rand::RngCore;
use tracing::warn;

use crate::host::{Handle, HostWorld};
use crate::pool::registry::PoolerRegistry;
use crate::selection::rand01;
use crate::spawn::events::{EventSink, SpawnEvent, SpawnEventKind};
use crate::spawn::pattern::{PatternOffset, SpawnPattern};
use crate::spawn::placement::{self, PlacementProbe};

/// One weighted spawn option of a [`SpawnPoint`]: which pooler to draw from
/// and, optionally, the patterns to arrange the result with.
#[derive(Debug, Clone)]
pub struct SingleSpawner {
    /// Registry name of the pooler this spawner draws from.
    pub pooler: String,
    /// Non-negative weight among the point's spawners.
    pub weight: f32,
    /// Patterns drawn by weight; empty means "one object at the point".
    pub patterns: Vec<SpawnPattern>,
}

impl SingleSpawner {
    pub fn new(pooler: impl Into<String>, weight: f32) -> Self {
        Self {
            pooler: pooler.into(),
            weight,
            patterns: Vec::new(),
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<SpawnPattern>) -> Self {
        self.patterns = patterns;
        self
    }
}

/// Lifecycle state of a spawn point's current activation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnState {
    Idle,
    Rolling,
    Placing,
    Tracking,
}

/// A placement site owned by a level segment.
#[derive(Debug)]
pub struct SpawnPoint {
    id: String,
    base_position: Vec2,
    /// Probability in [0, 1] of spawning nothing this cycle. `None` falls
    /// back to the segment-wide value.
    none_chance: Option<f32>,
    spawners: Vec<SingleSpawner>,
    probe: PlacementProbe,
    tracked: Vec<Handle>,
    state: SpawnState,
    inert: bool,
}

impl SpawnPoint {
    /// Builds a spawn point. Misconfigured weights or an empty spawner set
    /// are warned about here and leave the point permanently inert rather
    /// than failing a later frame.
    pub fn new(
        id: impl Into<String>,
        base_position: Vec2,
        spawners: Vec<SingleSpawner>,
        probe: PlacementProbe,
    ) -> Self {
        let id = id.into();
        let inert = !validate_spawners(&id, &spawners);
        Self {
            id,
            base_position,
            none_chance: None,
            spawners,
            probe,
            tracked: Vec::new(),
            state: SpawnState::Idle,
            inert,
        }
    }

    /// Overrides the segment-wide "spawn nothing" chance for this point.
    pub fn with_none_chance(mut self, none_chance: f32) -> Self {
        self.none_chance = Some(none_chance.clamp(0.0, 1.0));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SpawnState {
        self.state
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn tracked(&self) -> &[Handle] {
        &self.tracked
    }

    /// Runs one full activation cycle: roll, place, and begin tracking.
    ///
    /// Called by the segment one tick after activation, never directly from
    /// the activation itself.
    pub fn roll(
        &mut self,
        host: &mut dyn HostWorld,
        registry: &mut PoolerRegistry,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
        segment_none_chance: f32,
    ) {
        if self.inert {
            return;
        }

        self.state = SpawnState::Rolling;

        let none_chance = self.none_chance.unwrap_or(segment_none_chance);
        if rand01(rng) < none_chance {
            self.state = SpawnState::Idle;
            return;
        }

        let Some(spawner_index) =
            pick_by_weight(rng, self.spawners.len(), |i| self.spawners[i].weight)
        else {
            self.state = SpawnState::Idle;
            return;
        };
        let spawner = self.spawners[spawner_index].clone();

        let Some(pooler) = registry.get_mut(&spawner.pooler) else {
            warn!(
                point = %self.id,
                pooler = %spawner.pooler,
                "pooler not registered; spawn point is inert"
            );
            if sink.wants(SpawnEventKind::Warning) {
                sink.send(SpawnEvent::Warning {
                    context: format!("point:{}", self.id),
                    message: format!("pooler '{}' not registered", spawner.pooler),
                });
            }
            self.inert = true;
            self.state = SpawnState::Idle;
            return;
        };

        self.state = SpawnState::Placing;

        let single = [PatternOffset::new(Vec2::ZERO)];
        let offsets: &[PatternOffset] = if spawner.patterns.is_empty() {
            &single
        } else {
            let picked = pick_by_weight(rng, spawner.patterns.len(), |i| {
                spawner.patterns[i].weight
            })
            .unwrap_or(0);
            &spawner.patterns[picked].offsets
        };

        for (i, pattern_offset) in offsets.iter().enumerate() {
            let Some(handle) = pooler.acquire(host, rng) else {
                // Exhaustion is an expected no-spawn, not an error.
                continue;
            };

            let destination =
                self.base_position + pattern_offset.offset + Vec2::from(host.spawn_offset(handle));
            let resolved = placement::resolve(host, destination, &self.probe);
            host.set_position(handle, resolved.into());
            if pattern_offset.anchor {
                host.assign_scope(handle, &format!("point:{}/{i}", self.id));
            }
            host.set_active(handle, true);
            self.tracked.push(handle);

            if sink.wants(SpawnEventKind::Spawned) {
                sink.send(SpawnEvent::Spawned {
                    point: self.id.clone(),
                    handle,
                    position: resolved,
                });
            }
        }

        self.state = if self.tracked.is_empty() {
            SpawnState::Idle
        } else {
            SpawnState::Tracking
        };
    }

    /// Deregisters tracked objects the host has deactivated since the last
    /// sweep. The cycle returns to Idle once the set empties.
    pub fn sweep(&mut self, host: &dyn HostWorld, sink: &mut dyn EventSink) {
        let mut i = 0;
        while i < self.tracked.len() {
            let handle = self.tracked[i];
            if host.is_active(handle) {
                i += 1;
                continue;
            }
            self.tracked.swap_remove(i);
            if sink.wants(SpawnEventKind::Despawned) {
                sink.send(SpawnEvent::Despawned {
                    point: self.id.clone(),
                    handle,
                });
            }
        }
        if self.tracked.is_empty() && self.state == SpawnState::Tracking {
            self.state = SpawnState::Idle;
        }
    }

    /// Drops the tracked set without waiting for the objects to deactivate.
    /// Returns how many were abandoned. Used at segment teardown.
    pub fn clear(&mut self) -> usize {
        let abandoned = self.tracked.len();
        self.tracked.clear();
        self.state = SpawnState::Idle;
        abandoned
    }
}

fn validate_spawners(id: &str, spawners: &[SingleSpawner]) -> bool {
    if spawners.is_empty() {
        warn!(point = %id, "no spawners configured; spawn point is inert");
        return false;
    }
    let total: f32 = spawners.iter().map(|s| s.weight).sum();
    if spawners.iter().any(|s| s.weight < 0.0) || total <= 0.0 {
        warn!(point = %id, "spawner weights must be >= 0 and sum > 0; spawn point is inert");
        return false;
    }
    for spawner in spawners {
        if spawner.patterns.is_empty() {
            continue;
        }
        let total: f32 = spawner.patterns.iter().map(|p| p.weight).sum();
        if spawner.patterns.iter().any(|p| p.weight < 0.0) || total <= 0.0 {
            warn!(
                point = %id,
                pooler = %spawner.pooler,
                "pattern weights must be >= 0 and sum > 0; spawn point is inert"
            );
            return false;
        }
    }
    true
}

/// Draws an index in `0..len` with probability proportional to `weight(i)`.
fn pick_by_weight(
    rng: &mut dyn RngCore,
    len: usize,
    weight: impl Fn(usize) -> f32,
) -> Option<usize> {
    let total: f32 = (0..len).map(&weight).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rand01(rng) * total;
    for i in 0..len {
        roll -= weight(i);
        if roll <= 0.0 {
            return Some(i);
        }
    }
    (len > 0).then_some(len - 1)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::host::{LayerMask, MemoryWorld};
    use crate::pool::pooler::{MultiKindPooler, PoolerConfig};
    use crate::pool::PoolConfig;
    use crate::spawn::events::VecSink;

    fn fixture(capacity: usize) -> (MemoryWorld, PoolerRegistry) {
        let mut world = MemoryWorld::new();
        world.register_prototype("rock");
        let mut registry = PoolerRegistry::new();
        registry.insert(
            "obstacles",
            MultiKindPooler::new(
                PoolerConfig::Ordered {
                    pools: vec![PoolConfig::new("rock", capacity)],
                    drain: false,
                },
                &mut world,
            )
            .expect("valid config"),
        );
        (world, registry)
    }

    fn probe() -> PlacementProbe {
        PlacementProbe::new(Vec2::new(0.5, 0.5), LayerMask::layer(0))
    }

    fn point_at(base: Vec2) -> SpawnPoint {
        SpawnPoint::new(
            "p0",
            base,
            vec![SingleSpawner::new("obstacles", 1.0)],
            probe(),
        )
    }

    #[test]
    fn patternless_roll_places_one_object_at_the_point() {
        let (mut world, mut registry) = fixture(2);
        let mut point = point_at(Vec2::new(4.0, 1.0)).with_none_chance(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut sink = VecSink::new();

        point.roll(&mut world, &mut registry, &mut rng, &mut sink, 1.0);

        assert_eq!(point.state(), SpawnState::Tracking);
        assert_eq!(point.tracked().len(), 1);
        let handle = point.tracked()[0];
        assert!(world.is_active(handle));
        assert_eq!(Vec2::from(world.position(handle)), Vec2::new(4.0, 1.0));
        assert!(matches!(
            sink.as_slice(),
            [SpawnEvent::Spawned { point, .. }] if point == "p0"
        ));
    }

    #[test]
    fn none_chance_one_spawns_nothing() {
        let (mut world, mut registry) = fixture(2);
        let mut point = point_at(Vec2::ZERO).with_none_chance(1.0);
        let mut rng = StdRng::seed_from_u64(5);

        point.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);

        assert_eq!(point.state(), SpawnState::Idle);
        assert!(point.tracked().is_empty());
        assert_eq!(world.active_count(), 0);
    }

    #[test]
    fn segment_none_chance_applies_when_no_local_override() {
        let (mut world, mut registry) = fixture(2);
        let mut point = point_at(Vec2::ZERO);
        let mut rng = StdRng::seed_from_u64(5);

        point.roll(&mut world, &mut registry, &mut rng, &mut (), 1.0);
        assert!(point.tracked().is_empty());
    }

    #[test]
    fn pattern_roll_places_one_object_per_offset() {
        let (mut world, mut registry) = fixture(4);
        let pattern = SpawnPattern::from_points(
            "row",
            [Vec2::new(-1.0, 0.0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
        );
        let mut point = SpawnPoint::new(
            "p0",
            Vec2::new(10.0, 0.0),
            vec![SingleSpawner::new("obstacles", 1.0).with_patterns(vec![pattern])],
            probe(),
        )
        .with_none_chance(0.0);

        let mut rng = StdRng::seed_from_u64(5);
        point.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);

        assert_eq!(point.tracked().len(), 3);
        let mut xs: Vec<f32> = point
            .tracked()
            .iter()
            .map(|&h| world.position(h).x)
            .collect();
        xs.sort_by(f32::total_cmp);
        assert_eq!(xs, [9.0, 10.0, 11.0]);
    }

    #[test]
    fn anchored_offsets_scope_objects_to_the_point() {
        let (mut world, mut registry) = fixture(2);
        let pattern = SpawnPattern::new(
            "hang",
            vec![PatternOffset::new(Vec2::Y).anchored()],
        );
        let mut point = SpawnPoint::new(
            "p7",
            Vec2::ZERO,
            vec![SingleSpawner::new("obstacles", 1.0).with_patterns(vec![pattern])],
            probe(),
        )
        .with_none_chance(0.0);

        let mut rng = StdRng::seed_from_u64(5);
        point.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);

        let handle = point.tracked()[0];
        assert_eq!(world.scope_of(handle), Some("point:p7/0"));
    }

    #[test]
    fn reused_instance_leaves_the_old_anchor_scope() {
        let (mut world, mut registry) = fixture(1);
        let pattern = SpawnPattern::new(
            "hang",
            vec![PatternOffset::new(Vec2::Y).anchored()],
        );
        let mut anchored = SpawnPoint::new(
            "p7",
            Vec2::ZERO,
            vec![SingleSpawner::new("obstacles", 1.0).with_patterns(vec![pattern])],
            probe(),
        )
        .with_none_chance(0.0);

        let mut rng = StdRng::seed_from_u64(5);
        anchored.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);
        let handle = anchored.tracked()[0];
        assert_eq!(world.scope_of(handle), Some("point:p7/0"));

        world.set_active(handle, false);
        anchored.sweep(&world, &mut ());

        let mut plain = point_at(Vec2::new(3.0, 0.0)).with_none_chance(0.0);
        plain.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);
        assert_eq!(plain.tracked()[0], handle);
        assert_eq!(world.scope_of(handle), Some("pool:rock"));
    }

    #[test]
    fn authored_spawn_offset_shifts_the_destination() {
        let mut world = MemoryWorld::new();
        world.register_prototype_with_offset("rock", mint::Vector2 { x: 0.0, y: 0.5 });
        let mut registry = PoolerRegistry::new();
        registry.insert(
            "obstacles",
            MultiKindPooler::new(
                PoolerConfig::Ordered {
                    pools: vec![PoolConfig::new("rock", 1)],
                    drain: false,
                },
                &mut world,
            )
            .expect("valid config"),
        );

        let mut point = point_at(Vec2::new(2.0, 0.0)).with_none_chance(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        point.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);

        let handle = point.tracked()[0];
        assert_eq!(Vec2::from(world.position(handle)), Vec2::new(2.0, 0.5));
    }

    #[test]
    fn blocked_destination_is_displaced_before_activation() {
        let (mut world, mut registry) = fixture(1);
        world.add_obstruction(
            mint::Vector2 { x: 0.0, y: 0.0 },
            mint::Vector2 { x: 0.4, y: 0.05 },
            LayerMask::layer(0),
        );

        let mut point = point_at(Vec2::ZERO).with_none_chance(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        point.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);

        let handle = point.tracked()[0];
        let position = Vec2::from(world.position(handle));
        assert_ne!(position, Vec2::ZERO);
        assert_eq!(position.x, 0.0);
    }

    #[test]
    fn exhausted_pooler_skips_the_spawn_silently() {
        let (mut world, mut registry) = fixture(1);
        // Drain the only instance up front.
        let handle = registry
            .get_mut("obstacles")
            .expect("registered")
            .acquire_kind(&mut world, "rock")
            .expect("capacity");
        world.set_active(handle, true);

        let mut point = point_at(Vec2::ZERO).with_none_chance(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut sink = VecSink::new();
        point.roll(&mut world, &mut registry, &mut rng, &mut sink, 0.0);

        assert_eq!(point.state(), SpawnState::Idle);
        assert!(point.tracked().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn missing_pooler_warns_once_and_goes_inert() {
        let (mut world, mut registry) = fixture(1);
        let mut point = SpawnPoint::new(
            "p0",
            Vec2::ZERO,
            vec![SingleSpawner::new("no-such-pooler", 1.0)],
            probe(),
        )
        .with_none_chance(0.0);

        let mut rng = StdRng::seed_from_u64(5);
        let mut sink = VecSink::new();
        point.roll(&mut world, &mut registry, &mut rng, &mut sink, 0.0);

        assert!(point.is_inert());
        assert_eq!(sink.len(), 1);

        sink.clear();
        point.roll(&mut world, &mut registry, &mut rng, &mut sink, 0.0);
        assert!(sink.is_empty());
    }

    #[test]
    fn empty_spawner_set_is_inert_from_construction() {
        let point = SpawnPoint::new("p0", Vec2::ZERO, Vec::new(), probe());
        assert!(point.is_inert());
    }

    #[test]
    fn zero_weight_spawners_are_inert_from_construction() {
        let point = SpawnPoint::new(
            "p0",
            Vec2::ZERO,
            vec![SingleSpawner::new("obstacles", 0.0)],
            probe(),
        );
        assert!(point.is_inert());
    }

    #[test]
    fn sweep_deregisters_deactivated_objects() {
        let (mut world, mut registry) = fixture(2);
        let mut point = point_at(Vec2::ZERO).with_none_chance(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        point.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);

        let handle = point.tracked()[0];
        let mut sink = VecSink::new();
        point.sweep(&world, &mut sink);
        assert_eq!(point.tracked().len(), 1);
        assert!(sink.is_empty());

        world.set_active(handle, false);
        point.sweep(&world, &mut sink);
        assert!(point.tracked().is_empty());
        assert_eq!(point.state(), SpawnState::Idle);
        assert!(matches!(
            sink.as_slice(),
            [SpawnEvent::Despawned { handle: h, .. }] if *h == handle
        ));
    }

    #[test]
    fn clear_abandons_tracked_objects_immediately() {
        let (mut world, mut registry) = fixture(2);
        let mut point = point_at(Vec2::ZERO).with_none_chance(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        point.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);

        assert_eq!(point.clear(), 1);
        assert!(point.tracked().is_empty());
        assert_eq!(point.state(), SpawnState::Idle);
    }

    #[test]
    fn spawner_weights_bias_pooler_choice() {
        let mut world = MemoryWorld::new();
        world.register_prototype("rock");
        world.register_prototype("coin");
        let mut registry = PoolerRegistry::new();
        for (name, kind) in [("obstacles", "rock"), ("pickups", "coin")] {
            registry.insert(
                name,
                MultiKindPooler::new(
                    PoolerConfig::Ordered {
                        pools: vec![PoolConfig::new(kind, 1).expandable()],
                        drain: false,
                    },
                    &mut world,
                )
                .expect("valid config"),
            );
        }

        let mut rng = StdRng::seed_from_u64(0xABCD);
        let mut rocks = 0;
        let rolls = 2_000;
        for _ in 0..rolls {
            let mut point = SpawnPoint::new(
                "p0",
                Vec2::ZERO,
                vec![
                    SingleSpawner::new("obstacles", 3.0),
                    SingleSpawner::new("pickups", 1.0),
                ],
                probe(),
            )
            .with_none_chance(0.0);
            point.roll(&mut world, &mut registry, &mut rng, &mut (), 0.0);
            let handle = point.tracked()[0];
            if world.kind_of(handle) == Some("rock") {
                rocks += 1;
            }
            world.set_active(handle, false);
        }
        let freq = rocks as f32 / rolls as f32;
        assert!((freq - 0.75).abs() < 0.03, "frequency was {freq}");
    }
}
