use std::collections::HashMap;
use std::sync::Arc;

use crate::animation::module::AnimationModule;

/// Explicit, owner-constructed table of animation modules keyed by id.
///
/// Cloning is cheap (modules are shared), so independent pipelines can each own a registry
/// built from the same set of modules.
#[derive(Clone, Default)]
pub struct AnimationRegistry {
    modules: HashMap<String, Arc<dyn AnimationModule>>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in modules.
    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        for m in crate::animation::builtin::all() {
            r.register(m);
        }
        r
    }

    /// Insert `module` under its id. An existing module with the same id is replaced
    /// (last write wins) and returned.
    pub fn register(&mut self, module: Arc<dyn AnimationModule>) -> Option<Arc<dyn AnimationModule>> {
        let id = module.id().to_owned();
        let prev = self.modules.insert(id.clone(), module);
        if prev.is_some() {
            tracing::warn!(module = %id, "animation module re-registered; replacing previous module");
        }
        prev
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn AnimationModule>> {
        self.modules.get(id)
    }

    /// All modules, sorted by id.
    pub fn get_all(&self) -> Vec<Arc<dyn AnimationModule>> {
        let mut out: Vec<_> = self.modules.values().cloned().collect();
        out.sort_by(|a, b| a.id().cmp(b.id()));
        out
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.modules.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn has(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    pub fn unregister(&mut self, id: &str) -> Option<Arc<dyn AnimationModule>> {
        self.modules.remove(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl std::fmt::Debug for AnimationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationRegistry")
            .field("modules", &self.ids())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/registry.rs"]
mod tests;
