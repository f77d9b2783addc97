use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::animation::module::{AnimationModule, ModuleScratch};
use crate::animation::props::{AnimationProps, merge_props};
use crate::animation::registry::AnimationRegistry;
use crate::foundation::core::InstanceId;
use crate::foundation::error::{VecfieldError, VecfieldResult};
use crate::model::context::AnimationContext;
use crate::model::vector::{VectorState, anchors_preserved, same_shape};

/// How the props handed to `animate` were obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropsResolution {
    /// Caller props passed validation.
    AsGiven,
    /// Caller props were merged over the module defaults.
    MergedWithDefaults,
    /// Module defaults alone.
    DefaultsOnly,
}

/// Running counters of the executor boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutorStats {
    pub executions: u64,
    pub registry_misses: u64,
    pub validation_fallbacks: u64,
    pub faults: u64,
}

/// Runs animation modules behind a failure boundary and owns their per-instance scratch state.
pub struct Executor {
    registry: AnimationRegistry,
    scratch: HashMap<(InstanceId, String), ModuleScratch>,
    stats: ExecutorStats,
}

impl Executor {
    pub fn new(registry: AnimationRegistry) -> Self {
        Self {
            registry,
            scratch: HashMap::new(),
            stats: ExecutorStats::default(),
        }
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn stats(&self) -> ExecutorStats {
        self.stats
    }

    /// Register through the executor so scratch owned by a replaced module is destroyed with it.
    pub fn register(&mut self, module: Arc<dyn AnimationModule>) -> Option<Arc<dyn AnimationModule>> {
        let id = module.id().to_owned();
        let prev = self.registry.register(module);
        if let Some(prev) = &prev {
            self.destroy_scratch_where(|(_, m)| m == &id, prev.as_ref());
        }
        prev
    }

    pub fn unregister(&mut self, id: &str) -> Option<Arc<dyn AnimationModule>> {
        let prev = self.registry.unregister(id)?;
        self.destroy_scratch_where(|(_, m)| m == id, prev.as_ref());
        Some(prev)
    }

    /// Fail-open execution for the default instance.
    pub fn execute(
        &mut self,
        id: &str,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
    ) -> Vec<VectorState> {
        self.execute_for(InstanceId::default(), id, vectors, props, ctx)
    }

    /// Fail-open execution: any miss or fault yields a copy of `vectors`.
    pub fn execute_for(
        &mut self,
        instance: InstanceId,
        id: &str,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
    ) -> Vec<VectorState> {
        match self.try_execute(instance, id, vectors, props, ctx) {
            Ok(out) => out,
            Err(_) => vectors.to_vec(),
        }
    }

    /// Result-typed execution boundary.
    ///
    /// Returns `Err(RegistryMiss)` for unknown ids and `Err(Execution)` when the module errors,
    /// panics, or breaks the one-output-per-input contract. Both are logged here.
    pub fn try_execute(
        &mut self,
        instance: InstanceId,
        id: &str,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
    ) -> VecfieldResult<Vec<VectorState>> {
        let Some(module) = self.registry.get(id).cloned() else {
            self.stats.registry_misses += 1;
            tracing::warn!(animation = %id, "unknown animation module; passing vectors through");
            return Err(VecfieldError::registry_miss(id));
        };
        self.stats.executions += 1;

        let (props, resolution) = resolve_props(module.as_ref(), props);
        if resolution != PropsResolution::AsGiven {
            self.stats.validation_fallbacks += 1;
        }

        let scratch = self
            .scratch
            .entry((instance, id.to_owned()))
            .or_insert_with(|| {
                let mut s = ModuleScratch::new();
                module.on_init(&mut s);
                s
            });

        let result = catch_unwind(AssertUnwindSafe(|| {
            module.animate(vectors, &props, ctx, scratch)
        }));

        let fault = match result {
            Ok(Ok(out)) if same_shape(vectors, &out) && anchors_preserved(vectors, &out) => {
                return Ok(out);
            }
            Ok(Ok(out)) => format!(
                "output breaks shape contract ({} in, {} out, or ids/anchors changed)",
                vectors.len(),
                out.len()
            ),
            Ok(Err(e)) => e.to_string(),
            Err(payload) => {
                // The module may have left its scratch half-updated; start it over next frame.
                if let Some(mut s) = self.scratch.remove(&(instance, id.to_owned())) {
                    module.on_destroy(&mut s);
                }
                format!("panicked: {}", panic_message(payload.as_ref()))
            }
        };

        self.stats.faults += 1;
        tracing::warn!(animation = %id, instance = instance.0, fault = %fault, "animation module fault; keeping previous vectors");
        Err(VecfieldError::execution(id, fault))
    }

    /// Drop every scratch owned by `instance`, running `on_destroy` hooks.
    pub fn release_instance(&mut self, instance: InstanceId) {
        let keys: Vec<_> = self
            .scratch
            .keys()
            .filter(|(i, _)| *i == instance)
            .cloned()
            .collect();
        for key in keys {
            if let Some(mut s) = self.scratch.remove(&key)
                && let Some(m) = self.registry.get(&key.1)
            {
                m.on_destroy(&mut s);
            }
        }
    }

    /// Release all scratch state and zero the counters. Registered modules stay.
    pub fn reset(&mut self) {
        for ((_, id), mut s) in self.scratch.drain() {
            if let Some(m) = self.registry.get(&id) {
                m.on_destroy(&mut s);
            }
        }
        self.stats = ExecutorStats::default();
    }

    pub fn scratch_count(&self) -> usize {
        self.scratch.len()
    }

    fn destroy_scratch_where(
        &mut self,
        pred: impl Fn(&(InstanceId, String)) -> bool,
        owner: &dyn AnimationModule,
    ) {
        let keys: Vec<_> = self.scratch.keys().filter(|k| pred(k)).cloned().collect();
        for key in keys {
            if let Some(mut s) = self.scratch.remove(&key) {
                owner.on_destroy(&mut s);
            }
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("registry", &self.registry)
            .field("scratch", &self.scratch.len())
            .field("stats", &self.stats)
            .finish()
    }
}

/// Validate `props`, falling back to defaults-merged and then defaults-only props.
pub fn resolve_props(
    module: &dyn AnimationModule,
    props: &AnimationProps,
) -> (AnimationProps, PropsResolution) {
    let Err(first) = module.validate_props(props) else {
        return (props.clone(), PropsResolution::AsGiven);
    };

    let defaults = module.default_props();
    let merged = merge_props(&defaults, props);
    match module.validate_props(&merged) {
        Ok(()) => {
            tracing::debug!(animation = %module.id(), error = %first, "props invalid; merged over defaults");
            (merged, PropsResolution::MergedWithDefaults)
        }
        Err(second) => {
            tracing::warn!(animation = %module.id(), error = %second, "props invalid after merge; using defaults");
            (defaults, PropsResolution::DefaultsOnly)
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/executor.rs"]
mod tests;
