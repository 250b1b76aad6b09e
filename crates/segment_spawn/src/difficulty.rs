//! Difficulty-driven weight rebalancing.
//!
//! The difficulty level itself lives with a game-progress collaborator; this
//! module only reacts to change notifications. Baseline weights are captured
//! once when a binding is registered and every notification recomputes
//! `base + level * per_level` from that baseline, so repeated or
//! out-of-order notifications (including decreases) land on identical
//! weights instead of drifting.
use tracing::warn;

use crate::host::KindId;
use crate::selection::WeightedSelector;

/// One adjustable entry: which key, its captured baseline, and how much
/// weight each difficulty level adds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightBinding {
    pub key: KindId,
    pub base_weight: f32,
    pub per_level: f32,
}

impl WeightBinding {
    pub fn new(key: impl Into<KindId>, base_weight: f32, per_level: f32) -> Self {
        Self {
            key: key.into(),
            base_weight,
            per_level,
        }
    }
}

/// Rewrites selector weights as a pure function of the difficulty level.
#[derive(Debug, Default, Clone)]
pub struct DifficultyWeightAdjuster {
    bindings: Vec<WeightBinding>,
}

impl DifficultyWeightAdjuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an explicit binding.
    pub fn bind(mut self, binding: WeightBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Captures every current weight of `selector` as a baseline, all with
    /// the same per-level increment.
    pub fn capture(selector: &WeightedSelector, per_level: f32) -> Self {
        let bindings = selector
            .keys()
            .map(|key| {
                let base = selector.weight(key).unwrap_or(0.0);
                WeightBinding::new(key.clone(), base, per_level)
            })
            .collect();
        Self { bindings }
    }

    pub fn bindings(&self) -> &[WeightBinding] {
        &self.bindings
    }

    /// Applies the difficulty level to `selector`.
    ///
    /// Weights that would go negative clamp to zero. A binding whose key is
    /// missing from the selector is a wiring mistake; it is warned about and
    /// skipped so the remaining bindings still land.
    pub fn apply(&self, level: i32, selector: &mut WeightedSelector) {
        for binding in &self.bindings {
            let weight = (binding.base_weight + level as f32 * binding.per_level).max(0.0);
            if selector.set_weight(&binding.key, weight).is_err() {
                warn!(key = %binding.key, "binding key missing from selector; skipped");
            }
        }
    }
}
