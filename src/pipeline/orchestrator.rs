use std::sync::Arc;

use crate::animation::executor::Executor;
use crate::animation::module::AnimationModule;
use crate::animation::props::AnimationProps;
use crate::animation::registry::AnimationRegistry;
use crate::control::controller::{BackendKind, DecisionReason, FrameMetrics, ModeController};
use crate::control::quality::Quality;
use crate::foundation::error::{VecfieldError, VecfieldResult};
use crate::model::context::AnimationContext;
use crate::model::surface::SurfaceConfig;
use crate::model::vector::{VectorState, same_shape};
use crate::pipeline::clock::{FrameClock, MonotonicClock};
use crate::pipeline::opts::PipelineOpts;
use crate::render::backend::{BackendFrameStats, DrawRequest, FrameRGBA, RenderBackend};
use crate::render::overlay::DebugOverlay;
use crate::render::raster::RasterBackend;
use crate::render::scene::SceneGraphBackend;
use crate::telemetry::collector::{SampleInput, TelemetryCollector};
use crate::telemetry::complexity::ComplexityEstimator;

/// Observer invoked with the new backend and the reason whenever the backend changes.
pub type ModeSwitchObserver = Box<dyn FnMut(BackendKind, &str) + Send>;

/// Summary of one [`Pipeline::render`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub backend: BackendKind,
    pub quality: Quality,
    pub reason: DecisionReason,
    pub switched: bool,
    /// Windowed fps; `None` until the window holds a positive frame time.
    pub fps: Option<f64>,
    pub primitive_count: usize,
    pub complexity: f64,
    pub memory_estimate_mb: f64,
    pub frame_time_ms: f64,
    /// Set when the animation step failed and the frame reused earlier vectors.
    pub animation_fault: Option<String>,
    pub draw: BackendFrameStats,
}

/// Where the primitives of the latest frame are stored.
#[derive(Debug)]
enum FrameVectors {
    /// The last successful module output.
    LastGood,
    /// A copy of the caller's input, for frames with nothing reusable.
    PassThrough(Vec<VectorState>),
}

/// Per-frame orchestration: animate, measure, decide, draw.
pub struct Pipeline {
    opts: PipelineOpts,
    executor: Executor,
    estimator: ComplexityEstimator,
    telemetry: TelemetryCollector,
    controller: ModeController,
    scene: SceneGraphBackend,
    raster: RasterBackend,
    active: BackendKind,
    clock: Box<dyn FrameClock>,
    observer: Option<ModeSwitchObserver>,
    last_good: Option<Vec<VectorState>>,
    current: FrameVectors,
    frame: u64,
}

impl Pipeline {
    pub fn new(registry: AnimationRegistry, opts: PipelineOpts) -> VecfieldResult<Self> {
        opts.validate()?;
        Ok(Self {
            estimator: ComplexityEstimator::from_registry(&registry),
            executor: Executor::new(registry),
            telemetry: TelemetryCollector::new(opts.telemetry.clone()),
            controller: ModeController::new(opts.controller.clone(), opts.quality.clone()),
            scene: SceneGraphBackend::new(),
            raster: RasterBackend::new(opts.raster.clone()),
            active: BackendKind::SceneGraph,
            clock: Box::new(MonotonicClock::new()),
            observer: None,
            last_good: None,
            current: FrameVectors::PassThrough(Vec::new()),
            frame: 0,
            opts,
        })
    }

    pub fn with_clock(mut self, clock: impl FrameClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn estimator_mut(&mut self) -> &mut ComplexityEstimator {
        &mut self.estimator
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn active_backend(&self) -> BackendKind {
        self.active
    }

    /// Register a module after construction. Its complexity hint replaces the weight of any
    /// module previously registered under the same id.
    pub fn register(&mut self, module: Arc<dyn AnimationModule>) -> Option<Arc<dyn AnimationModule>> {
        self.estimator.replace_hint(module.as_ref());
        self.executor.register(module)
    }

    pub fn on_mode_switch(&mut self, f: impl FnMut(BackendKind, &str) + Send + 'static) {
        self.observer = Some(Box::new(f));
    }

    /// Pin the backend, or `None` to let the controller choose again.
    pub fn force_backend(&mut self, backend: Option<BackendKind>) {
        self.controller.force_backend(backend);
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(frame = self.frame, animation = %animation_id, primitives = vectors.len())
    )]
    pub fn render(
        &mut self,
        vectors: &[VectorState],
        animation_id: &str,
        props: &AnimationProps,
        ctx: &AnimationContext,
        surface: &SurfaceConfig,
        debug: bool,
    ) -> VecfieldResult<FrameReport> {
        let frame_start = self.clock.now_ms();

        let animation_fault = match self
            .executor
            .try_execute(self.opts.instance, animation_id, vectors, props, ctx)
        {
            Ok(out) => {
                self.last_good = Some(out);
                self.current = FrameVectors::LastGood;
                None
            }
            Err(e @ VecfieldError::Execution { .. }) => {
                let reusable = self
                    .last_good
                    .as_ref()
                    .is_some_and(|prev| same_shape(vectors, prev));
                self.current = if reusable {
                    FrameVectors::LastGood
                } else {
                    FrameVectors::PassThrough(vectors.to_vec())
                };
                Some(e.to_string())
            }
            Err(e @ VecfieldError::RegistryMiss(_)) => {
                self.current = FrameVectors::PassThrough(vectors.to_vec());
                Some(e.to_string())
            }
            Err(e) => return Err(e),
        };

        let count = self.vectors().len();
        let complexity = self.estimator.estimate(animation_id, count);
        let sample = self.telemetry.sample(SampleInput {
            primitive_count: count,
            animation_id,
            frame_start_ms: frame_start,
            now_ms: self.clock.now_ms(),
            backend: self.active,
            complexity,
        });
        let fps = self.telemetry.fps();

        let decision = self.controller.evaluate(&FrameMetrics {
            fps: fps.unwrap_or(self.opts.controller.target_fps),
            primitive_count: count,
            complexity,
            memory_mb: sample.memory_estimate_mb,
        });

        if decision.backend != self.active {
            let previous = self.active;
            self.active = decision.backend;
            match previous {
                BackendKind::SceneGraph => self.scene.release(),
                BackendKind::Raster => self.raster.release(),
            }
            tracing::debug!(released = %previous, "inactive backend released");
            if let Some(observer) = self.observer.as_mut() {
                observer(decision.backend, &decision.reason.to_string());
            }
        }

        let overlay = debug.then(|| DebugOverlay {
            backend: decision.backend,
            quality: decision.quality,
            fps,
            primitive_count: count,
            complexity,
            memory_mb: sample.memory_estimate_mb,
        });
        let req = DrawRequest {
            vectors: frame_vectors(&self.current, &self.last_good),
            surface,
            quality: decision.quality.settings(),
            overlay: overlay.as_ref(),
        };
        let draw = match self.active {
            BackendKind::SceneGraph => self.scene.draw(&req)?,
            BackendKind::Raster => self.raster.draw(&req)?,
        };

        let report = FrameReport {
            frame: self.frame,
            backend: decision.backend,
            quality: decision.quality,
            reason: decision.reason,
            switched: decision.switched,
            fps,
            primitive_count: count,
            complexity,
            memory_estimate_mb: sample.memory_estimate_mb,
            frame_time_ms: sample.frame_time_ms,
            animation_fault,
            draw,
        };
        self.frame += 1;
        Ok(report)
    }

    /// Pixels of the latest frame from the active backend.
    pub fn read_frame(&mut self) -> VecfieldResult<FrameRGBA> {
        self.active_backend_mut().read_frame()
    }

    /// SVG document of the latest frame, when the scene graph drew it.
    pub fn scene_svg(&self) -> Option<String> {
        (self.active == BackendKind::SceneGraph && !self.scene.is_empty())
            .then(|| self.scene.to_svg())
    }

    /// Vectors drawn in the latest frame.
    pub fn vectors(&self) -> &[VectorState] {
        frame_vectors(&self.current, &self.last_good)
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Back to the state right after construction. Registered modules and the observer stay.
    pub fn reset(&mut self) {
        self.executor.reset();
        self.telemetry.reset();
        self.controller.reset();
        self.scene.release();
        self.raster.release();
        self.active = BackendKind::SceneGraph;
        self.last_good = None;
        self.current = FrameVectors::PassThrough(Vec::new());
        self.frame = 0;
    }

    fn active_backend_mut(&mut self) -> &mut dyn RenderBackend {
        match self.active {
            BackendKind::SceneGraph => &mut self.scene,
            BackendKind::Raster => &mut self.raster,
        }
    }
}

fn frame_vectors<'a>(current: &'a FrameVectors, last_good: &'a Option<Vec<VectorState>>) -> &'a [VectorState] {
    match current {
        FrameVectors::LastGood => last_good.as_deref().unwrap_or_default(),
        FrameVectors::PassThrough(v) => v,
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("active", &self.active)
            .field("frame", &self.frame)
            .field("executor", &self.executor)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
