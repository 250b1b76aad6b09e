//! Weighted random selection with runtime-adjustable weights.
//!
//! [`WeightedSelector`] draws keys with replacement, each key's probability
//! proportional to its current weight. The key set is fixed when the
//! selector is built; weights may be rewritten at any time (difficulty
//! scaling rewrites them wholesale). Cumulative weights are kept in a
//! Fenwick tree, giving O(log n) updates and O(log n) draws — the naive
//! cumulative-array scan would do for the handful of entries a segment
//! carries, but the tree costs nothing extra to maintain.
use std::collections::HashMap;

use rand::RngCore;
use tracing::warn;

use crate::error::{Error, Result};
use crate::host::KindId;

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Draw a uniform integer in `[min, max]` inclusive.
#[inline]
pub(crate) fn rand_range_inclusive(rng: &mut dyn RngCore, min: u32, max: u32) -> u32 {
    if min >= max {
        return min;
    }
    let span = (max - min + 1) as f32;
    let picked = min + (rand01(rng) * span) as u32;
    picked.min(max)
}

/// Builder collecting `(key, weight)` entries for a [`WeightedSelector`].
#[derive(Debug, Default, Clone)]
pub struct WeightedSelectorBuilder {
    entries: Vec<(KindId, f32)>,
}

impl WeightedSelectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Keys must be unique; weights must be finite and >= 0.
    pub fn entry(mut self, key: impl Into<KindId>, weight: f32) -> Self {
        self.entries.push((key.into(), weight));
        self
    }

    /// Validates the entry set and builds the selector.
    ///
    /// An empty entry set or an all-zero total weight is a misconfiguration
    /// and fails here, at initialization, rather than surfacing later in the
    /// middle of a spawn roll.
    pub fn build(self) -> Result<WeightedSelector> {
        if self.entries.is_empty() {
            warn!("weighted selector built with no entries");
            return Err(Error::EmptySelection);
        }

        let mut index = HashMap::with_capacity(self.entries.len());
        for (i, (key, weight)) in self.entries.iter().enumerate() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "weight for '{key}' must be finite and >= 0, got {weight}"
                )));
            }
            if index.insert(key.clone(), i).is_some() {
                return Err(Error::DuplicateKey { key: key.clone() });
            }
        }

        let n = self.entries.len();
        let mut selector = WeightedSelector {
            keys: self.entries.iter().map(|(k, _)| k.clone()).collect(),
            index,
            weights: vec![0.0; n],
            tree: vec![0.0; n + 1],
        };
        for (i, (_, weight)) in self.entries.iter().enumerate() {
            selector.write_weight(i, *weight);
        }

        if selector.total_weight() <= 0.0 {
            warn!("weighted selector built with zero total weight");
            return Err(Error::EmptySelection);
        }

        Ok(selector)
    }
}

/// Weighted random selector over a fixed key set.
#[derive(Debug, Clone)]
pub struct WeightedSelector {
    keys: Vec<KindId>,
    index: HashMap<KindId, usize>,
    weights: Vec<f32>,
    // Fenwick tree over weights, 1-based.
    tree: Vec<f32>,
}

impl WeightedSelector {
    pub fn builder() -> WeightedSelectorBuilder {
        WeightedSelectorBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &KindId> {
        self.keys.iter()
    }

    pub fn weight(&self, key: &str) -> Result<f32> {
        let i = self.index_of(key)?;
        Ok(self.weights[i])
    }

    pub fn total_weight(&self) -> f32 {
        self.prefix_sum(self.keys.len())
    }

    /// Rewrites the weight of `key`. The new weight must be finite and >= 0.
    pub fn set_weight(&mut self, key: &str, weight: f32) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "weight for '{key}' must be finite and >= 0, got {weight}"
            )));
        }
        let i = self.index_of(key)?;
        self.write_weight(i, weight);
        Ok(())
    }

    /// Draws a key with probability proportional to its current weight.
    ///
    /// Fails with [`Error::EmptySelection`] when runtime weight mutation has
    /// driven the total weight to zero.
    pub fn next(&self, rng: &mut dyn RngCore) -> Result<&KindId> {
        let total = self.total_weight();
        if total <= 0.0 {
            return Err(Error::EmptySelection);
        }

        let roll = rand01(rng) * total;
        let i = self.lower_bound(roll);
        Ok(&self.keys[i])
    }

    fn index_of(&self, key: &str) -> Result<usize> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| Error::UnknownKey { key: key.to_owned() })
    }

    fn write_weight(&mut self, i: usize, weight: f32) {
        let delta = weight - self.weights[i];
        self.weights[i] = weight;
        let mut node = i + 1;
        while node < self.tree.len() {
            self.tree[node] += delta;
            node += node & node.wrapping_neg();
        }
    }

    fn prefix_sum(&self, count: usize) -> f32 {
        let mut sum = 0.0;
        let mut node = count;
        while node > 0 {
            sum += self.tree[node];
            node -= node & node.wrapping_neg();
        }
        sum
    }

    /// Index of the first entry whose cumulative weight exceeds `roll`.
    fn lower_bound(&self, roll: f32) -> usize {
        let n = self.keys.len();
        let mut i = 0;
        let mut remaining = roll;
        let mut step = n.next_power_of_two();
        while step > 0 {
            let next = i + step;
            if next <= n && self.tree[next] <= remaining {
                remaining -= self.tree[next];
                i = next;
            }
            step >>= 1;
        }
        // Float accumulation can push the descent one past the end when the
        // roll lands exactly on the total.
        i.min(n - 1)
    }
}
