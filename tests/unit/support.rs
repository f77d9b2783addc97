//! Shared helpers for in-crate unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use crate::animation::module::{AnimationModule, ModuleScratch};
use crate::animation::props::{AnimationProps, props_from_value};
use crate::foundation::core::{Point, VectorId};
use crate::foundation::error::{VecfieldError, VecfieldResult};
use crate::model::context::AnimationContext;
use crate::model::vector::VectorState;

#[derive(Clone, Default)]
pub(crate) struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a scoped subscriber and return its result plus everything it logged.
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buf = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buf.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buf.contents())
}

pub(crate) fn row(n: usize) -> Vec<VectorState> {
    (0..n)
        .map(|i| VectorState::new(VectorId(i as u32), Point::new(i as f64 * 10.0, 5.0)))
        .collect()
}

pub(crate) fn ctx() -> AnimationContext {
    AnimationContext::new(640.0, 480.0)
}

/// Adds `step` to every angle; `step` must be in `[0, 1]`.
pub(crate) struct Spin;

impl AnimationModule for Spin {
    fn id(&self) -> &str {
        "spin"
    }

    fn default_props(&self) -> AnimationProps {
        props_from_value(serde_json::json!({"step": 0.1}))
    }

    fn validate_props(&self, props: &AnimationProps) -> VecfieldResult<()> {
        crate::animation::props::require_number(props, "step", 0.0, 1.0).map(|_| ())
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        props: &AnimationProps,
        _ctx: &AnimationContext,
        _scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        let step = crate::animation::props::prop_f64_or(props, "step", 0.0);
        Ok(vectors
            .iter()
            .map(|v| {
                let mut out = v.clone();
                out.angle += step;
                out
            })
            .collect())
    }
}

/// Fails every frame with an error.
pub(crate) struct AlwaysErr;

impl AnimationModule for AlwaysErr {
    fn id(&self) -> &str {
        "always-err"
    }

    fn default_props(&self) -> AnimationProps {
        AnimationProps::new()
    }

    fn animate(
        &self,
        _vectors: &[VectorState],
        _props: &AnimationProps,
        _ctx: &AnimationContext,
        _scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        Err(VecfieldError::validation("synthetic module failure"))
    }
}

/// Panics every frame.
pub(crate) struct Panics;

impl AnimationModule for Panics {
    fn id(&self) -> &str {
        "panics"
    }

    fn default_props(&self) -> AnimationProps {
        AnimationProps::new()
    }

    fn animate(
        &self,
        _vectors: &[VectorState],
        _props: &AnimationProps,
        _ctx: &AnimationContext,
        _scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        panic!("synthetic module panic");
    }
}

/// Drops the last primitive and reverses the rest.
pub(crate) struct Reorders;

impl AnimationModule for Reorders {
    fn id(&self) -> &str {
        "reorders"
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
        let mut out: Vec<_> = vectors.iter().rev().cloned().collect();
        out.pop();
        Ok(out)
    }
}

/// Counts frames in its scratch and writes the count into every angle.
#[derive(Default)]
pub(crate) struct Counter {
    pub(crate) inits: Arc<Mutex<u32>>,
    pub(crate) destroys: Arc<Mutex<u32>>,
}

impl AnimationModule for Counter {
    fn id(&self) -> &str {
        "counter"
    }

    fn default_props(&self) -> AnimationProps {
        AnimationProps::new()
    }

    fn animate(
        &self,
        vectors: &[VectorState],
        _props: &AnimationProps,
        _ctx: &AnimationContext,
        scratch: &mut ModuleScratch,
    ) -> VecfieldResult<Vec<VectorState>> {
        let n = scratch.get_or_insert_with(|| 0u64);
        *n += 1;
        let n = *n as f64;
        Ok(vectors
            .iter()
            .map(|v| {
                let mut out = v.clone();
                out.angle = n;
                out
            })
            .collect())
    }

    fn on_init(&self, _scratch: &mut ModuleScratch) {
        *self.inits.lock().unwrap() += 1;
    }

    fn on_destroy(&self, _scratch: &mut ModuleScratch) {
        *self.destroys.lock().unwrap() += 1;
    }
}
