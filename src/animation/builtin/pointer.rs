use crate::animation::builtin::map_vectors;
use crate::animation::module::{AnimationModule, ModuleScratch};
use crate::animation::props::{AnimationProps, prop_f64_or, props_from_value, require_number};
use crate::foundation::error::VecfieldResult;
use crate::model::context::AnimationContext;
use crate::model::vector::VectorState;

/// Vectors turn to face the pointer and shrink with distance. Without a pointer the layout
/// orientation is kept.
pub struct Pointer;

impl AnimationModule for Pointer {
    fn id(&self) -> &str {
        "pointer"
    }

    fn default_props(&self) -> AnimationProps {
        props_from_value(serde_json::json!({
            "falloff": 300.0,
            "min_scale": 0.4,
        }))
    }

    fn validate_props(&self, props: &AnimationProps) -> VecfieldResult<()> {
        require_number(props, "falloff", 1.0, 1.0e6)?;
        require_number(props, "min_scale", 0.0, 1.0)?;
        Ok(())
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
        _scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        let Some(target) = ctx.pointer else {
            return Ok(vectors.to_vec());
        };
        let falloff = prop_f64_or(props, "falloff", 300.0);
        let min_scale = prop_f64_or(props, "min_scale", 0.4);
        Ok(map_vectors(vectors, |v| {
            let d = target - v.origin();
            if d.length_squared() > 0.0 {
                v.angle = d.atan2();
            }
            let near = (-d.length() / falloff).exp();
            v.length *= min_scale + (1.0 - min_scale) * near;
        }))
    }

    fn complexity_weight(&self) -> Option<f64> {
        Some(0.5)
    }
}
