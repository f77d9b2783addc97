use std::collections::{HashMap, HashSet};

use crate::animation::module::AnimationModule;
use crate::animation::registry::AnimationRegistry;

/// Weight used for ids the table does not know.
pub const DEFAULT_WEIGHT: f64 = 0.5;
/// Primitive count at which the count term saturates.
pub const SATURATION_COUNT: f64 = 1000.0;
/// Share of the score contributed by the primitive count.
pub const COUNT_SHARE: f64 = 0.3;

/// Static per-module cost table plus a primitive-count term, scored into `[0, 1]`.
#[derive(Clone, Debug)]
pub struct ComplexityEstimator {
    weights: HashMap<String, f64>,
    /// Ids whose weight came from a module hint rather than [`Self::set_weight`].
    hinted: HashSet<String>,
}

impl Default for ComplexityEstimator {
    fn default() -> Self {
        Self::from_registry(&AnimationRegistry::with_builtins())
    }
}

impl ComplexityEstimator {
    /// Empty table: every id scores with [`DEFAULT_WEIGHT`].
    pub fn empty() -> Self {
        Self {
            weights: HashMap::new(),
            hinted: HashSet::new(),
        }
    }

    /// Table seeded from the `complexity_weight()` hints of every registered module.
    pub fn from_registry(registry: &AnimationRegistry) -> Self {
        let mut out = Self::empty();
        out.absorb(registry);
        out
    }

    /// Add hints of modules not yet in the table. Weights already present are kept.
    pub fn absorb(&mut self, registry: &AnimationRegistry) {
        for m in registry.get_all() {
            if let Some(w) = m.complexity_weight()
                && !self.weights.contains_key(m.id())
            {
                self.weights.insert(m.id().to_owned(), clamp_weight(w));
                self.hinted.insert(m.id().to_owned());
            }
        }
    }

    /// Take the hint of a module that replaces whatever was registered under its id.
    ///
    /// The new hint overwrites any weight. A module without a hint drops a weight that came
    /// from the previous module's hint, and keeps one set through [`Self::set_weight`].
    pub fn replace_hint(&mut self, module: &dyn AnimationModule) {
        let id = module.id();
        match module.complexity_weight() {
            Some(w) => {
                self.weights.insert(id.to_owned(), clamp_weight(w));
                self.hinted.insert(id.to_owned());
            }
            None => {
                if self.hinted.remove(id) {
                    self.weights.remove(id);
                }
            }
        }
    }

    pub fn with_weight(mut self, id: impl Into<String>, weight: f64) -> Self {
        self.set_weight(id, weight);
        self
    }

    pub fn set_weight(&mut self, id: impl Into<String>, weight: f64) {
        let id = id.into();
        self.hinted.remove(&id);
        self.weights.insert(id, clamp_weight(weight));
    }

    pub fn weight(&self, id: &str) -> f64 {
        self.weights.get(id).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn estimate(&self, animation_id: &str, primitive_count: usize) -> f64 {
        let vector_factor = (primitive_count as f64 / SATURATION_COUNT).min(1.0);
        (self.weight(animation_id) + vector_factor * COUNT_SHARE).min(1.0)
    }
}

fn clamp_weight(w: f64) -> f64 {
    if w.is_finite() {
        w.clamp(0.0, 1.0)
    } else {
        DEFAULT_WEIGHT
    }
}

#[cfg(test)]
#[path = "../../tests/unit/telemetry/complexity.rs"]
mod tests;
