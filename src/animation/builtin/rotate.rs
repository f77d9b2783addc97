use crate::animation::builtin::map_vectors;
use crate::animation::module::{AnimationModule, ModuleScratch};
use crate::animation::props::{AnimationProps, prop_f64_or, props_from_value, require_number};
use crate::foundation::error::VecfieldResult;
use crate::model::context::AnimationContext;
use crate::model::vector::VectorState;

/// Every vector turns at `speed` degrees per second.
pub struct Rotate;

impl AnimationModule for Rotate {
    fn id(&self) -> &str {
        "rotate"
    }

    fn default_props(&self) -> AnimationProps {
        props_from_value(serde_json::json!({ "speed": 90.0 }))
    }

    fn validate_props(&self, props: &AnimationProps) -> VecfieldResult<()> {
        require_number(props, "speed", -3600.0, 3600.0)?;
        Ok(())
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
        _scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        let turn = prop_f64_or(props, "speed", 90.0).to_radians() * ctx.elapsed_secs();
        Ok(map_vectors(vectors, |v| v.angle += turn))
    }

    fn complexity_weight(&self) -> Option<f64> {
        Some(0.2)
    }
}
