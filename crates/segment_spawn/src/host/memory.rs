//! In-memory reference implementation of [`HostWorld`].
use std::collections::HashMap;

use glam::Vec2;
use mint::Vector2;

use crate::host::{Handle, HostWorld, KindId, LayerMask};

#[derive(Debug, Clone)]
struct Prototype {
    spawn_offset: Vec2,
}

#[derive(Debug, Clone)]
struct Instance {
    kind: KindId,
    active: bool,
    position: Vec2,
    spawn_offset: Vec2,
    scope: Option<String>,
}

#[derive(Debug, Clone)]
struct Obstruction {
    center: Vec2,
    half_extent: Vec2,
    mask: LayerMask,
}

/// Table-backed host world for tests and headless simulation.
///
/// Prototypes are registered by kind; cloning allocates a new inactive
/// instance carrying the prototype's authored spawn offset. Obstructions are
/// axis-aligned boxes tagged with a [`LayerMask`].
#[derive(Debug, Default)]
pub struct MemoryWorld {
    prototypes: HashMap<KindId, Prototype>,
    instances: Vec<Instance>,
    obstructions: Vec<Obstruction>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a prototype with a zero spawn offset.
    pub fn register_prototype(&mut self, kind: impl Into<KindId>) {
        self.register_prototype_with_offset(kind, Vector2 { x: 0.0, y: 0.0 });
    }

    /// Registers a prototype whose clones carry an authored spawn offset.
    pub fn register_prototype_with_offset(
        &mut self,
        kind: impl Into<KindId>,
        spawn_offset: Vector2<f32>,
    ) {
        self.prototypes.insert(
            kind.into(),
            Prototype {
                spawn_offset: Vec2::from(spawn_offset),
            },
        );
    }

    /// Adds an axis-aligned box obstruction centered on `center` with the
    /// given half extents, on the layers of `mask`.
    pub fn add_obstruction(
        &mut self,
        center: Vector2<f32>,
        half_extent: Vector2<f32>,
        mask: LayerMask,
    ) {
        self.obstructions.push(Obstruction {
            center: Vec2::from(center),
            half_extent: Vec2::from(half_extent),
            mask,
        });
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn active_count(&self) -> usize {
        self.instances.iter().filter(|i| i.active).count()
    }

    pub fn kind_of(&self, handle: Handle) -> Option<&str> {
        self.instance(handle).map(|i| i.kind.as_str())
    }

    pub fn scope_of(&self, handle: Handle) -> Option<&str> {
        self.instance(handle).and_then(|i| i.scope.as_deref())
    }

    fn instance(&self, handle: Handle) -> Option<&Instance> {
        self.instances.get(handle.to_raw() as usize)
    }

    fn instance_mut(&mut self, handle: Handle) -> Option<&mut Instance> {
        self.instances.get_mut(handle.to_raw() as usize)
    }
}

impl HostWorld for MemoryWorld {
    fn clone_prototype(&mut self, kind: &str) -> Option<Handle> {
        let prototype = self.prototypes.get(kind)?;
        let spawn_offset = prototype.spawn_offset;
        let handle = Handle::from_raw(self.instances.len() as u64);
        self.instances.push(Instance {
            kind: kind.to_owned(),
            active: false,
            position: Vec2::ZERO,
            spawn_offset,
            scope: None,
        });
        Some(handle)
    }

    fn is_active(&self, handle: Handle) -> bool {
        self.instance(handle).is_some_and(|i| i.active)
    }

    fn set_active(&mut self, handle: Handle, active: bool) {
        if let Some(instance) = self.instance_mut(handle) {
            instance.active = active;
        }
    }

    fn position(&self, handle: Handle) -> Vector2<f32> {
        self.instance(handle)
            .map(|i| i.position)
            .unwrap_or(Vec2::ZERO)
            .into()
    }

    fn set_position(&mut self, handle: Handle, position: Vector2<f32>) {
        if let Some(instance) = self.instance_mut(handle) {
            instance.position = Vec2::from(position);
        }
    }

    fn spawn_offset(&self, handle: Handle) -> Vector2<f32> {
        self.instance(handle)
            .map(|i| i.spawn_offset)
            .unwrap_or(Vec2::ZERO)
            .into()
    }

    fn is_obstructed(
        &self,
        point: Vector2<f32>,
        footprint: Vector2<f32>,
        mask: LayerMask,
    ) -> bool {
        let point = Vec2::from(point);
        let half = Vec2::from(footprint) * 0.5;
        self.obstructions.iter().any(|o| {
            o.mask.intersects(mask)
                && (point.x - o.center.x).abs() < half.x + o.half_extent.x
                && (point.y - o.center.y).abs() < half.y + o.half_extent.y
        })
    }

    fn assign_scope(&mut self, handle: Handle, scope: &str) {
        if let Some(instance) = self.instance_mut(handle) {
            instance.scope = Some(scope.to_owned());
        }
    }
}
