//! vecfield renders fields of thousands of oriented line primitives and keeps frame time bounded
//! by switching between two drawing strategies at runtime.
//!
//! Every frame a [`Pipeline`]:
//!
//! - runs the active [`AnimationModule`] behind a fail-open [`Executor`]
//! - records frame timings in a [`TelemetryCollector`] and scores load with a
//!   [`ComplexityEstimator`]
//! - lets a [`ModeController`] pick a backend and a [`Quality`] tier with hysteresis
//! - draws through the retained [`SceneGraphBackend`] or the immediate [`RasterBackend`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod control;
pub(crate) mod model;
pub(crate) mod pipeline;
pub(crate) mod render;
pub(crate) mod telemetry;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, InstanceId, Point, Rect, Rgba8, Vec2, VectorId, anchor_transform,
};
pub use crate::foundation::error::{VecfieldError, VecfieldResult};
pub use crate::foundation::hash::ContentHash;

pub use crate::model::context::AnimationContext;
pub use crate::model::layout::{Layout, UniformGrid};
pub use crate::model::paint::{GradientKind, GradientSpec, GradientStop, Hsla, Paint};
pub use crate::model::surface::{BaseShape, LineCap, StrokeStyle, SurfaceConfig};
pub use crate::model::vector::{VectorState, anchors_preserved, same_shape};

pub use crate::animation::builtin::all as builtin_modules;
pub use crate::animation::builtin::flocking::Flocking;
pub use crate::animation::builtin::pointer::Pointer;
pub use crate::animation::builtin::pulse::Pulse;
pub use crate::animation::builtin::rotate::Rotate;
pub use crate::animation::builtin::still::Still;
pub use crate::animation::builtin::wave::Wave;
pub use crate::animation::executor::{Executor, ExecutorStats, PropsResolution, resolve_props};
pub use crate::animation::module::{AnimationModule, ModuleScratch};
pub use crate::animation::props::{
    AnimationProps, merge_props, prop_f64, prop_f64_or, prop_u64_or, props_from_value,
    require_integer, require_number,
};
pub use crate::animation::registry::AnimationRegistry;

pub use crate::telemetry::collector::{
    SampleInput, TelemetryCollector, TelemetryConfig, TelemetrySample,
};
pub use crate::telemetry::complexity::ComplexityEstimator;

pub use crate::control::config::{ControllerConfig, QualityPolicy, TierFloor};
pub use crate::control::controller::{
    BackendKind, DecisionReason, FrameMetrics, ModeController, ModeDecision,
};
pub use crate::control::quality::{CurveDetail, Quality, QualitySettings};

pub use crate::render::backend::{BackendFrameStats, DrawRequest, FrameRGBA, RenderBackend};
pub use crate::render::geometry::{
    DrawOp, GeometryKey, ShapeGeometry, ShapePart, snap_to_pixels, subpaths,
};
pub use crate::render::overlay::{DebugOverlay, OverlayBar};
pub use crate::render::text::SYSTEM_FONT_CANDIDATES;
pub use crate::render::raster::{
    PaintStats, RasterBackend, RasterOpts, RasterStrategy, choose_strategy, draw_batched,
    draw_direct, draw_overlay, paint, visible_count,
};
pub use crate::render::scene::{
    GradientDef, GradientDefs, PaintRef, SceneDiffStats, SceneElement, SceneGraphBackend,
};
pub use crate::render::sink::{DrawCall, DrawPaint, DrawSink, RecordingSink, TextCall};

pub use crate::pipeline::clock::{FrameClock, ManualClock, MonotonicClock};
pub use crate::pipeline::opts::{
    ENV_COOLDOWN_FRAMES, ENV_MAX_SCENE_PRIMITIVES, ENV_MIN_FPS, ENV_TARGET_FPS,
    ENV_TELEMETRY_WINDOW, PipelineOpts,
};
pub use crate::pipeline::orchestrator::{FrameReport, ModeSwitchObserver, Pipeline};
