//! Object pooling: reserves of pre-cloned instances recycled by activity flag.
//!
//! A pool never destroys instances and never tracks "in use" itself: an
//! instance is a member available for reuse exactly while the host reports
//! it inactive. Acquiring hands out the first inactive instance, growing the
//! pool by one clone when expansion is allowed. Deactivation by the host is
//! the release — there is no explicit free call.
use tracing::warn;

use crate::host::{Handle, HostWorld, KindId};

pub mod pooler;
pub mod registry;

/// Authored definition of a single pool.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Prototype kind cloned into the pool.
    pub kind: KindId,
    /// Number of instances cloned up front.
    pub capacity: usize,
    /// Whether the pool may grow past `capacity` on exhaustion.
    pub can_expand: bool,
}

impl PoolConfig {
    pub fn new(kind: impl Into<KindId>, capacity: usize) -> Self {
        Self {
            kind: kind.into(),
            capacity,
            can_expand: false,
        }
    }

    pub fn expandable(mut self) -> Self {
        self.can_expand = true;
        self
    }
}

/// A reserve of instances cloned from one prototype kind.
#[derive(Debug)]
pub struct ObjectPool {
    config: PoolConfig,
    scope: String,
    instances: Vec<Handle>,
    inert: bool,
}

impl ObjectPool {
    /// Clones `capacity` instances of the configured kind through the host.
    ///
    /// A missing prototype makes the pool permanently inert: the problem is
    /// logged once here and every later [`ObjectPool::acquire`] returns
    /// `None` instead of erroring mid-frame.
    pub fn new(config: PoolConfig, host: &mut dyn HostWorld) -> Self {
        let scope = format!("pool:{}", config.kind);
        let mut pool = Self {
            config,
            scope,
            instances: Vec::new(),
            inert: false,
        };

        for _ in 0..pool.config.capacity {
            if pool.clone_into_pool(host).is_none() {
                warn!(
                    kind = %pool.config.kind,
                    "prototype missing; pool is inert"
                );
                pool.inert = true;
                pool.instances.clear();
                break;
            }
        }
        pool
    }

    pub fn kind(&self) -> &KindId {
        &self.config.kind
    }

    pub fn can_expand(&self) -> bool {
        self.config.can_expand
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Number of instances currently in the pool, expansion included.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Hands out an inactive instance, cloning a new one when the pool is
    /// exhausted and expandable. Returns `None` on exhaustion of a
    /// fixed-size pool — callers treat that as "skip this spawn", so it is
    /// deliberately not logged.
    ///
    /// The instance is returned to the pool's own scope first, undoing any
    /// re-parenting from a previous anchored placement. Activating it is
    /// the caller's responsibility.
    pub fn acquire(&mut self, host: &mut dyn HostWorld) -> Option<Handle> {
        if self.inert {
            return None;
        }

        if let Some(handle) = self
            .instances
            .iter()
            .copied()
            .find(|&h| !host.is_active(h))
        {
            host.assign_scope(handle, &self.scope);
            return Some(handle);
        }

        if self.config.can_expand {
            return self.clone_into_pool(host);
        }
        None
    }

    /// Deactivates every instance, returning them all to the pool. Used at
    /// level teardown.
    pub fn reclaim_all(&mut self, host: &mut dyn HostWorld) {
        for &handle in &self.instances {
            host.set_active(handle, false);
        }
    }

    /// Count of instances the host currently reports active.
    pub fn active_count(&self, host: &dyn HostWorld) -> usize {
        self.instances
            .iter()
            .filter(|&&h| host.is_active(h))
            .count()
    }

    fn clone_into_pool(&mut self, host: &mut dyn HostWorld) -> Option<Handle> {
        let handle = host.clone_prototype(&self.config.kind)?;
        host.assign_scope(handle, &self.scope);
        self.instances.push(handle);
        Some(handle)
    }
}
