//! Multi-kind pooling: several [`ObjectPool`]s behind one selection surface.
//!
//! A [`MultiKindPooler`] owns one pool per prototype kind and picks which
//! pool serves the next acquire according to its configured policy:
//!
//! - `Ordered` cycles kinds in registration order, optionally draining one
//!   pool fully before moving to the next.
//! - `ChanceTable` rolls once per acquire and compares the roll against
//!   per-entry chances sorted ascending: the first entry whose chance
//!   strictly exceeds the roll wins. Chances that do not cover [0, 1] leave
//!   a residual "spawn nothing" probability, which is intended — a table of
//!   [0.3, 0.6] spawns nothing 40% of the time.
//! - `Weighted` delegates to [`WeightedSelector`], drawing proportionally to
//!   runtime-adjustable weights.
//!
//! Under every policy an exhausted, non-expandable pool yields `None` with
//! no kind substitution; substituting would skew the spawn rates that
//! difficulty balancing relies on.
use rand::RngCore;
use tracing::warn;

use crate::error::{Error, Result};
use crate::host::{Handle, HostWorld, KindId};
use crate::pool::{ObjectPool, PoolConfig};
use crate::selection::{rand01, WeightedSelector};

/// Chance-table entry: a pool served when the per-acquire roll falls under
/// `chance`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChanceEntry {
    pub pool: PoolConfig,
    /// Selection chance in [0, 1].
    pub chance: f32,
}

/// Weighted entry: a pool drawn proportionally to `weight`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightedEntry {
    pub pool: PoolConfig,
    /// Non-negative selection weight.
    pub weight: f32,
}

/// Authored pooler definition: the pools plus the policy choosing among them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolerConfig {
    Ordered {
        pools: Vec<PoolConfig>,
        /// Exhaust the current pool before advancing to the next kind.
        drain: bool,
    },
    ChanceTable {
        entries: Vec<ChanceEntry>,
    },
    Weighted {
        entries: Vec<WeightedEntry>,
    },
}

#[derive(Debug)]
enum Policy {
    Ordered { drain: bool, cursor: usize },
    // Per-entry chances sorted ascending, parallel to `pools`.
    Chance { chances: Vec<f32> },
    Weighted { selector: WeightedSelector },
}

/// Aggregates multiple named pools behind one acquire call.
#[derive(Debug)]
pub struct MultiKindPooler {
    pools: Vec<ObjectPool>,
    policy: Policy,
    inert: bool,
}

impl MultiKindPooler {
    /// Builds the pooler and pre-clones every pool through the host.
    ///
    /// An empty definition is tolerated (warned, pooler stays inert), but a
    /// weighted table whose weights sum to zero and chances outside [0, 1]
    /// are programmer errors and fail here.
    pub fn new(config: PoolerConfig, host: &mut dyn HostWorld) -> Result<Self> {
        match config {
            PoolerConfig::Ordered { pools, drain } => {
                let pools = build_pools(pools, host);
                let inert = pools.is_empty();
                Ok(Self {
                    pools,
                    policy: Policy::Ordered { drain, cursor: 0 },
                    inert,
                })
            }
            PoolerConfig::ChanceTable { mut entries } => {
                for entry in &entries {
                    if !(0.0..=1.0).contains(&entry.chance) {
                        return Err(Error::InvalidConfig(format!(
                            "chance for '{}' must be in [0, 1], got {}",
                            entry.pool.kind, entry.chance
                        )));
                    }
                }
                entries.sort_by(|a, b| a.chance.total_cmp(&b.chance));
                let chances = entries.iter().map(|e| e.chance).collect();
                let pools = build_pools(entries.into_iter().map(|e| e.pool).collect(), host);
                let inert = pools.is_empty();
                Ok(Self {
                    pools,
                    policy: Policy::Chance { chances },
                    inert,
                })
            }
            PoolerConfig::Weighted { entries } => {
                if entries.is_empty() {
                    warn!("weighted pooler built with no entries; pooler is inert");
                    return Ok(Self {
                        pools: Vec::new(),
                        policy: Policy::Ordered {
                            drain: false,
                            cursor: 0,
                        },
                        inert: true,
                    });
                }
                let mut builder = WeightedSelector::builder();
                for entry in &entries {
                    builder = builder.entry(entry.pool.kind.clone(), entry.weight);
                }
                let selector = builder.build()?;
                let pools = build_pools(entries.into_iter().map(|e| e.pool).collect(), host);
                Ok(Self {
                    pools,
                    policy: Policy::Weighted { selector },
                    inert: false,
                })
            }
        }
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    pub fn kinds(&self) -> impl Iterator<Item = &KindId> {
        self.pools.iter().map(|p| p.kind())
    }

    /// Pool serving the given kind, if registered.
    pub fn pool(&self, kind: &str) -> Option<&ObjectPool> {
        self.pools.iter().find(|p| p.kind() == kind)
    }

    /// The weight table backing a `Weighted` pooler, for runtime adjustment.
    pub fn selector_mut(&mut self) -> Option<&mut WeightedSelector> {
        match &mut self.policy {
            Policy::Weighted { selector } => Some(selector),
            _ => None,
        }
    }

    /// Picks a kind by policy and acquires from its pool.
    ///
    /// `None` means "no spawn this cycle": the pooler is inert, the chance
    /// roll landed in the residual gap, the weighted table is currently all
    /// zero, or the chosen pool is exhausted.
    pub fn acquire(&mut self, host: &mut dyn HostWorld, rng: &mut dyn RngCore) -> Option<Handle> {
        if self.inert {
            return None;
        }
        match &mut self.policy {
            Policy::Ordered { drain, cursor } => {
                if *drain {
                    for _ in 0..self.pools.len() {
                        if let Some(handle) = self.pools[*cursor].acquire(host) {
                            return Some(handle);
                        }
                        *cursor = (*cursor + 1) % self.pools.len();
                    }
                    None
                } else {
                    let picked = *cursor;
                    *cursor = (*cursor + 1) % self.pools.len();
                    self.pools[picked].acquire(host)
                }
            }
            Policy::Chance { chances } => {
                let roll = rand01(rng);
                let picked = chances.iter().position(|&chance| roll < chance)?;
                self.pools[picked].acquire(host)
            }
            Policy::Weighted { selector } => {
                let kind = selector.next(rng).ok()?.clone();
                self.pools.iter_mut().find(|p| *p.kind() == kind)?.acquire(host)
            }
        }
    }

    /// Bypasses the policy and acquires from the pool of an explicit kind.
    pub fn acquire_kind(&mut self, host: &mut dyn HostWorld, kind: &str) -> Option<Handle> {
        self.pools
            .iter_mut()
            .find(|p| p.kind() == kind)?
            .acquire(host)
    }

    /// Deactivates every instance of every pool.
    pub fn reclaim_all(&mut self, host: &mut dyn HostWorld) {
        for pool in &mut self.pools {
            pool.reclaim_all(host);
        }
    }
}

fn build_pools(configs: Vec<PoolConfig>, host: &mut dyn HostWorld) -> Vec<ObjectPool> {
    if configs.is_empty() {
        warn!("pooler built with no pool definitions; pooler is inert");
    }
    configs
        .into_iter()
        .map(|config| ObjectPool::new(config, host))
        .collect()
}
