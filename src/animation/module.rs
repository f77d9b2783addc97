use std::any::Any;

use crate::animation::props::AnimationProps;
use crate::foundation::error::VecfieldResult;
use crate::model::context::AnimationContext;
use crate::model::vector::VectorState;

/// A pluggable per-frame transform over the primitive array.
///
/// Implementations must return exactly one output per input, in input order, with the same ids.
/// The executor enforces this and treats any violation as a fault.
pub trait AnimationModule: Send + Sync {
    /// Registry key.
    fn id(&self) -> &str;

    fn default_props(&self) -> AnimationProps;

    /// Reject props the module cannot run with. Modules without constraints accept everything.
    fn validate_props(&self, _props: &AnimationProps) -> VecfieldResult<()> {
        Ok(())
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
        scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>>;

    /// Called once when the executor creates scratch state for a pipeline instance.
    fn on_init(&self, _scratch: &mut ModuleScratch) {}

    /// Called when the executor releases the scratch state of a pipeline instance.
    fn on_destroy(&self, _scratch: &mut ModuleScratch) {}

    /// Static per-primitive cost hint in `0..=1` for the complexity estimator.
    fn complexity_weight(&self) -> Option<f64> {
        None
    }
}

/// Instance-scoped state a module carries from frame to frame.
///
/// One scratch exists per `(pipeline instance, module id)`; modules downcast it to their own
/// state type.
#[derive(Default)]
pub struct ModuleScratch {
    slot: Option<Box<dyn Any + Send>>,
}

impl ModuleScratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Borrow the stored state as `T`, creating it with `init` when empty or of another type.
    pub fn get_or_insert_with<T: Any + Send>(&mut self, init: impl FnOnce() -> T) -> &mut T {
        let reuse = self.slot.as_ref().is_some_and(|b| b.is::<T>());
        if !reuse {
            self.slot = Some(Box::new(init()));
        }
        match self.slot.as_mut().and_then(|b| b.downcast_mut::<T>()) {
            Some(v) => v,
            None => unreachable!("scratch slot was just filled with T"),
        }
    }

    pub fn get_mut<T: Any + Send>(&mut self) -> Option<&mut T> {
        self.slot.as_mut().and_then(|b| b.downcast_mut::<T>())
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}

impl std::fmt::Debug for ModuleScratch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleScratch")
            .field("occupied", &self.slot.is_some())
            .finish()
    }
}
