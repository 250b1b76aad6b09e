//! Chain spawners: contiguous runs of same-kind pooled tiles.
//!
//! A [`ChainSpawner`] places a randomized-length run of unit-spaced tiles
//! along local X. Tile centers sit at `offset + i` for `i in 0..length`
//! (default offset 0.5, so the run's first tile edge starts on the spawner
//! origin) and the returned endpoint is `offset + length` — the center the
//! next run's first tile would take, half a unit past the last tile's far
//! edge.
//!
//! [`LayeredBreakables`] stacks runs vertically at a fixed interval, either
//! a configured layer count or one derived from a parent segment's height
//! delta, and reports the union bounds of the placed tiles to its parent
//! layout controller.
use glam::Vec2;
use rand::RngCore;
use tracing::warn;

use crate::host::{HostWorld, KindId};
use crate::pool::registry::PoolerRegistry;
use crate::selection::rand_range_inclusive;
use crate::spawn::events::{EventSink, SpawnEvent, SpawnEventKind};

/// Result of spawning one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainRun {
    /// Tiles actually placed; short of the drawn length only when the pool
    /// ran dry mid-run.
    pub placed: u32,
    /// Local X immediately following the run, relative to the spawner
    /// origin.
    pub endpoint: f32,
}

/// Spawns a run of same-kind tiles end-to-end at unit spacing.
#[derive(Debug, Clone)]
pub struct ChainSpawner {
    id: String,
    pooler: String,
    kind: KindId,
    origin: Vec2,
    offset: f32,
    default_min: u32,
    default_max: u32,
}

impl ChainSpawner {
    pub fn new(
        id: impl Into<String>,
        pooler: impl Into<String>,
        kind: impl Into<KindId>,
        origin: Vec2,
    ) -> Self {
        Self {
            id: id.into(),
            pooler: pooler.into(),
            kind: kind.into(),
            origin,
            offset: 0.5,
            default_min: 1,
            default_max: 5,
        }
    }

    /// Default run-length range used when `spawn` is called without bounds.
    pub fn with_length_range(mut self, min: u32, max: u32) -> Self {
        if min > max {
            warn!(chain = %self.id, min, max, "length range reversed; swapping");
            self.default_min = max;
            self.default_max = min;
        } else {
            self.default_min = min;
            self.default_max = max;
        }
        self
    }

    /// Local X of the first tile center. Defaults to 0.5.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Draws a run length uniformly from `[min, max]` (falling back to the
    /// configured defaults) and places the run starting at `origin`.
    pub fn spawn(
        &self,
        host: &mut dyn HostWorld,
        registry: &mut PoolerRegistry,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
        min: Option<u32>,
        max: Option<u32>,
    ) -> ChainRun {
        self.spawn_row(host, registry, rng, sink, min, max, self.origin.y)
    }

    fn spawn_row(
        &self,
        host: &mut dyn HostWorld,
        registry: &mut PoolerRegistry,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
        min: Option<u32>,
        max: Option<u32>,
        row_y: f32,
    ) -> ChainRun {
        let min = min.unwrap_or(self.default_min);
        let max = max.unwrap_or(self.default_max);
        let length = rand_range_inclusive(rng, min.min(max), min.max(max));

        let Some(pooler) = registry.get_mut(&self.pooler) else {
            warn!(chain = %self.id, pooler = %self.pooler, "pooler not registered");
            return ChainRun {
                placed: 0,
                endpoint: self.offset,
            };
        };

        let mut placed = 0;
        for i in 0..length {
            let Some(handle) = pooler.acquire_kind(host, &self.kind) else {
                // Pool ran dry; the run ends here.
                break;
            };
            let position = Vec2::new(self.origin.x + self.offset + i as f32, row_y);
            host.set_position(handle, position.into());
            host.set_active(handle, true);
            placed += 1;

            if sink.wants(SpawnEventKind::Spawned) {
                sink.send(SpawnEvent::Spawned {
                    point: self.id.clone(),
                    handle,
                    position,
                });
            }
        }

        ChainRun {
            placed,
            endpoint: self.offset + placed as f32,
        }
    }
}

/// How many rows a [`LayeredBreakables`] stacks, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerExtent {
    /// A fixed number of rows, stacked upward or downward.
    Fixed { count: u32, upward: bool },
    /// Rows derived from a parent segment's height delta: count is
    /// `|delta| / interval` (floored), direction follows the delta's sign.
    HeightDelta(f32),
}

/// Axis-aligned union bounds of the tiles a layered spawn placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainBounds {
    pub min: Vec2,
    pub max: Vec2,
}

/// Stacks chain runs vertically and reports their union bounds.
#[derive(Debug, Clone)]
pub struct LayeredBreakables {
    chain: ChainSpawner,
    interval: f32,
    extent: LayerExtent,
}

impl LayeredBreakables {
    pub fn new(chain: ChainSpawner, interval: f32, extent: LayerExtent) -> Self {
        Self {
            chain,
            interval,
            extent,
        }
    }

    pub fn chain(&self) -> &ChainSpawner {
        &self.chain
    }

    fn row_count(&self) -> (u32, bool) {
        match self.extent {
            LayerExtent::Fixed { count, upward } => (count, upward),
            LayerExtent::HeightDelta(delta) => {
                if self.interval <= 0.0 {
                    return (0, true);
                }
                ((delta.abs() / self.interval) as u32, delta >= 0.0)
            }
        }
    }

    /// Spawns every row and returns the union bounds of the placed tiles
    /// (unit tile extents). With nothing placed the bounds collapse onto
    /// the chain origin.
    pub fn spawn(
        &self,
        host: &mut dyn HostWorld,
        registry: &mut PoolerRegistry,
        rng: &mut dyn RngCore,
        sink: &mut dyn EventSink,
    ) -> ChainBounds {
        let (rows, upward) = self.row_count();
        let origin = self.chain.origin();
        let direction = if upward { 1.0 } else { -1.0 };

        let mut bounds: Option<ChainBounds> = None;
        for row in 0..rows {
            let row_y = origin.y + direction * self.interval * row as f32;
            let run = self
                .chain
                .spawn_row(host, registry, rng, sink, None, None, row_y);
            if run.placed == 0 {
                continue;
            }

            let row_min = Vec2::new(origin.x + self.chain.offset - 0.5, row_y - 0.5);
            let row_max = Vec2::new(origin.x + run.endpoint - 0.5, row_y + 0.5);
            bounds = Some(match bounds {
                None => ChainBounds {
                    min: row_min,
                    max: row_max,
                },
                Some(b) => ChainBounds {
                    min: b.min.min(row_min),
                    max: b.max.max(row_max),
                },
            });
        }

        bounds.unwrap_or(ChainBounds {
            min: origin,
            max: origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::host::MemoryWorld;
    use crate::pool::pooler::{MultiKindPooler, PoolerConfig};
    use crate::pool::PoolConfig;
    use crate::spawn::events::VecSink;

    fn fixture(capacity: usize) -> (MemoryWorld, PoolerRegistry) {
        let mut world = MemoryWorld::new();
        world.register_prototype("crate");
        let mut registry = PoolerRegistry::new();
        registry.insert(
            "breakables",
            MultiKindPooler::new(
                PoolerConfig::Ordered {
                    pools: vec![PoolConfig::new("crate", capacity)],
                    drain: false,
                },
                &mut world,
            )
            .expect("valid config"),
        );
        (world, registry)
    }

    fn chain_at(origin: Vec2) -> ChainSpawner {
        ChainSpawner::new("chain0", "breakables", "crate", origin)
    }

    #[test]
    fn fixed_length_run_places_unit_spaced_tiles() {
        let (mut world, mut registry) = fixture(8);
        let chain = chain_at(Vec2::ZERO);
        let mut rng = StdRng::seed_from_u64(9);
        let mut sink = VecSink::new();

        let run = chain.spawn(
            &mut world,
            &mut registry,
            &mut rng,
            &mut sink,
            Some(3),
            Some(3),
        );

        assert_eq!(run.placed, 3);
        assert_eq!(run.endpoint, 3.5);
        assert_eq!(sink.len(), 3);

        let mut xs: Vec<f32> = sink
            .as_slice()
            .iter()
            .filter_map(|e| match e {
                SpawnEvent::Spawned { position, .. } => Some(position.x),
                _ => None,
            })
            .collect();
        xs.sort_by(f32::total_cmp);
        assert_eq!(xs, [0.5, 1.5, 2.5]);
    }

    #[test]
    fn random_length_stays_in_bounds() {
        let (mut world, mut registry) = fixture(64);
        let chain = chain_at(Vec2::ZERO);
        let mut rng = StdRng::seed_from_u64(0x5EED);

        for _ in 0..100 {
            let run = chain.spawn(
                &mut world,
                &mut registry,
                &mut rng,
                &mut (),
                Some(1),
                Some(5),
            );
            assert!((1..=5).contains(&run.placed));
            assert_eq!(run.endpoint, 0.5 + run.placed as f32);
            registry.reclaim_all(&mut world);
        }
    }

    #[test]
    fn omitted_bounds_use_configured_defaults() {
        let (mut world, mut registry) = fixture(16);
        let chain = chain_at(Vec2::ZERO).with_length_range(2, 2);
        let mut rng = StdRng::seed_from_u64(1);

        let run = chain.spawn(&mut world, &mut registry, &mut rng, &mut (), None, None);
        assert_eq!(run.placed, 2);
    }

    #[test]
    fn exhausted_pool_truncates_the_run() {
        let (mut world, mut registry) = fixture(2);
        let chain = chain_at(Vec2::ZERO);
        let mut rng = StdRng::seed_from_u64(1);

        let run = chain.spawn(
            &mut world,
            &mut registry,
            &mut rng,
            &mut (),
            Some(5),
            Some(5),
        );
        assert_eq!(run.placed, 2);
        assert_eq!(run.endpoint, 2.5);
    }

    #[test]
    fn origin_offsets_every_tile() {
        let (mut world, mut registry) = fixture(4);
        let chain = chain_at(Vec2::new(10.0, 3.0));
        let mut rng = StdRng::seed_from_u64(2);
        let mut sink = VecSink::new();

        chain.spawn(
            &mut world,
            &mut registry,
            &mut rng,
            &mut sink,
            Some(1),
            Some(1),
        );

        match sink.as_slice() {
            [SpawnEvent::Spawned { position, .. }] => {
                assert_eq!(*position, Vec2::new(10.5, 3.0));
            }
            other => panic!("expected one spawn event, got {other:?}"),
        }
    }

    #[test]
    fn layered_fixed_count_stacks_rows_upward() {
        let (mut world, mut registry) = fixture(32);
        let layered = LayeredBreakables::new(
            chain_at(Vec2::ZERO).with_length_range(2, 2),
            1.5,
            LayerExtent::Fixed {
                count: 3,
                upward: true,
            },
        );
        let mut rng = StdRng::seed_from_u64(4);

        let bounds = layered.spawn(&mut world, &mut registry, &mut rng, &mut ());
        assert_eq!(bounds.min, Vec2::new(0.0, -0.5));
        assert_eq!(bounds.max, Vec2::new(2.0, 3.5));
        assert_eq!(world.active_count(), 6);
    }

    #[test]
    fn layered_height_delta_derives_count_and_direction() {
        let (mut world, mut registry) = fixture(32);
        let layered = LayeredBreakables::new(
            chain_at(Vec2::ZERO).with_length_range(1, 1),
            2.0,
            LayerExtent::HeightDelta(-4.5),
        );
        let mut rng = StdRng::seed_from_u64(4);

        let bounds = layered.spawn(&mut world, &mut registry, &mut rng, &mut ());
        // |−4.5| / 2.0 floors to 2 rows, stacked downward.
        assert_eq!(world.active_count(), 2);
        assert_eq!(bounds.min, Vec2::new(0.0, -2.5));
        assert_eq!(bounds.max, Vec2::new(1.0, 0.5));
    }

    #[test]
    fn layered_zero_rows_collapses_bounds_to_origin() {
        let (mut world, mut registry) = fixture(4);
        let layered = LayeredBreakables::new(
            chain_at(Vec2::new(3.0, 1.0)),
            2.0,
            LayerExtent::HeightDelta(1.0),
        );
        let mut rng = StdRng::seed_from_u64(4);

        let bounds = layered.spawn(&mut world, &mut registry, &mut rng, &mut ());
        assert_eq!(bounds.min, Vec2::new(3.0, 1.0));
        assert_eq!(bounds.max, bounds.min);
        assert_eq!(world.active_count(), 0);
    }
}
