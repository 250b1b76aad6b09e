//! Spawn patterns: fixed local arrangements of placement offsets.
use glam::Vec2;

/// One offset of a pattern, relative to the spawn point's origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternOffset {
    pub offset: Vec2,
    /// Anchored objects are scoped under the offset site instead of the
    /// world, so they follow the spawn point's host transform.
    pub anchor: bool,
}

impl PatternOffset {
    pub fn new(offset: Vec2) -> Self {
        Self {
            offset,
            anchor: false,
        }
    }

    pub fn anchored(mut self) -> Self {
        self.anchor = true;
        self
    }
}

/// An ordered set of local offsets placed as a group. Immutable once
/// authored; a spawn point draws one pattern per activation cycle by
/// weight.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPattern {
    pub id: String,
    pub offsets: Vec<PatternOffset>,
    /// Non-negative weight used when the owning spawner draws a pattern.
    pub weight: f32,
}

impl SpawnPattern {
    pub fn new(id: impl Into<String>, offsets: Vec<PatternOffset>) -> Self {
        Self {
            id: id.into(),
            offsets,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Convenience constructor from bare offsets, none anchored.
    pub fn from_points(id: impl Into<String>, points: impl IntoIterator<Item = Vec2>) -> Self {
        Self::new(id, points.into_iter().map(PatternOffset::new).collect())
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
