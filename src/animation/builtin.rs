//! Modules shipped with the crate.
//!
//! All of them are stateless formulas over the base vectors except [`flocking`], which keeps its
//! agents in the executor-owned scratch.

pub mod flocking;
pub mod pointer;
pub mod pulse;
pub mod rotate;
pub mod still;
pub mod wave;

use std::sync::Arc;

use crate::animation::module::AnimationModule;
use crate::model::vector::VectorState;

/// One instance of every built-in module.
pub fn all() -> Vec<Arc<dyn AnimationModule>> {
    vec![
        Arc::new(still::Still),
        Arc::new(rotate::Rotate),
        Arc::new(wave::Wave),
        Arc::new(pulse::Pulse),
        Arc::new(pointer::Pointer),
        Arc::new(flocking::Flocking),
    ]
}

/// Clone every vector and let `f` rewrite the mutable fields.
pub(crate) fn map_vectors(
    vectors: &[VectorState],
    mut f: impl FnMut(&mut VectorState),
) -> Vec<VectorState> {
    vectors
        .iter()
        .map(|v| {
            let mut out = v.clone();
            f(&mut out);
            out
        })
        .collect()
}
