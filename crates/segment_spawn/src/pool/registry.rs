//! Named pooler registry owned by a level segment.
//!
//! Spawn points and chain spawners look poolers up by name through an
//! explicit registry reference instead of any ambient singleton, so pooler
//! lifetime is tied to the segment that owns them.
use std::collections::HashMap;

use tracing::warn;

use crate::host::HostWorld;
use crate::pool::pooler::MultiKindPooler;

/// Name-to-pooler map handed to every placement site of a segment.
#[derive(Debug, Default)]
pub struct PoolerRegistry {
    poolers: HashMap<String, MultiKindPooler>,
}

impl PoolerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pooler under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, pooler: MultiKindPooler) {
        let name = name.into();
        if self.poolers.insert(name.clone(), pooler).is_some() {
            warn!(name = %name, "pooler replaced an existing registration");
        }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MultiKindPooler> {
        self.poolers.get_mut(name)
    }

    pub fn get(&self, name: &str) -> Option<&MultiKindPooler> {
        self.poolers.get(name)
    }

    pub fn len(&self) -> usize {
        self.poolers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poolers.is_empty()
    }

    /// Deactivates every instance of every registered pooler.
    pub fn reclaim_all(&mut self, host: &mut dyn HostWorld) {
        for pooler in self.poolers.values_mut() {
            pooler.reclaim_all(host);
        }
    }
}
