use crate::animation::module::{AnimationModule, ModuleScratch};
use crate::animation::props::AnimationProps;
use crate::foundation::error::VecfieldResult;
use crate::model::context::AnimationContext;
use crate::model::vector::VectorState;

/// Identity pass; the field stays at its layout orientation.
pub struct Still;

impl AnimationModule for Still {
    fn id(&self) -> &str {
        "still"
    }

    fn default_props(&self) -> AnimationProps {
        AnimationProps::new()
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        _props: &AnimationProps,
        _ctx: &AnimationContext,
        _scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        Ok(vectors.to_vec())
    }

    fn complexity_weight(&self) -> Option<f64> {
        Some(0.1)
    }
}
