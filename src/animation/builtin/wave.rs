use std::f64::consts::{PI, TAU};

use crate::animation::builtin::map_vectors;
use crate::animation::module::{AnimationModule, ModuleScratch};
use crate::animation::props::{AnimationProps, prop_f64_or, props_from_value, require_number};
use crate::foundation::error::VecfieldResult;
use crate::model::context::AnimationContext;
use crate::model::vector::VectorState;

/// A sine wave travelling diagonally across the field bends each vector around its layout angle.
pub struct Wave;

impl AnimationModule for Wave {
    fn id(&self) -> &str {
        "wave"
    }

    fn default_props(&self) -> AnimationProps {
        props_from_value(serde_json::json!({
            "amplitude": 0.8,
            "wavelength": 240.0,
            "speed": 120.0,
        }))
    }

    fn validate_props(&self, props: &AnimationProps) -> VecfieldResult<()> {
        require_number(props, "amplitude", 0.0, PI)?;
        require_number(props, "wavelength", 1.0, 100_000.0)?;
        require_number(props, "speed", -10_000.0, 10_000.0)?;
        Ok(())
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        props: &AnimationProps,
        ctx: &AnimationContext,
        _scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        let amplitude = prop_f64_or(props, "amplitude", 0.8);
        let wavelength = prop_f64_or(props, "wavelength", 240.0);
        let travel = prop_f64_or(props, "speed", 120.0) * ctx.elapsed_secs();
        Ok(map_vectors(vectors, |v| {
            let o = v.origin();
            let phase = TAU * (o.x + 0.5 * o.y - travel) / wavelength;
            v.angle += amplitude * phase.sin();
        }))
    }

    fn complexity_weight(&self) -> Option<f64> {
        Some(0.4)
    }
}
