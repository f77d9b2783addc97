use std::f64::consts::TAU;

use crate::animation::builtin::map_vectors;
use crate::animation::module::{AnimationModule, ModuleScratch};
use crate::animation::props::{AnimationProps, prop_f64_or, props_from_value, require_number};
use crate::foundation::error::VecfieldResult;
use crate::model::context::AnimationContext;
use crate::model::vector::VectorState;

/// Length and opacity breathe with a phase offset that ripples outward from the top-left corner.
pub struct Pulse;

impl AnimationModule for Pulse {
    fn id(&self) -> &str {
        "pulse"
    }

    fn default_props(&self) -> AnimationProps {
        props_from_value(serde_json::json!({
            "amplitude": 0.35,
            "frequency": 0.8,
            "min_opacity": 0.35,
        }))
    }

    fn validate_props(&self, props: &AnimationProps) -> VecfieldResult<()> {
        require_number(props, "amplitude", 0.0, 1.0)?;
        require_number(props, "frequency", 0.0, 30.0)?;
        require_number(props, "min_opacity", 0.0, 1.0)?;
        Ok(())
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
        _scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        let amplitude = prop_f64_or(props, "amplitude", 0.35);
        let frequency = prop_f64_or(props, "frequency", 0.8);
        let min_opacity = prop_f64_or(props, "min_opacity", 0.35);
        let t = ctx.elapsed_secs();
        Ok(map_vectors(vectors, |v| {
            let o = v.origin();
            let s = (TAU * frequency * t - (o.x + o.y) * 0.01).sin();
            v.length *= 1.0 + amplitude * s;
            let k = (s + 1.0) * 0.5;
            v.opacity = (min_opacity + (1.0 - min_opacity) * k) as f32 * v.opacity;
        }))
    }

    fn complexity_weight(&self) -> Option<f64> {
        Some(0.3)
    }
}
