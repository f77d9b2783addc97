use crate::control::config::{ControllerConfig, QualityPolicy};
use crate::control::quality::Quality;

/// The two drawing strategies the pipeline can run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    SceneGraph,
    Raster,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::SceneGraph => "scene_graph",
            BackendKind::Raster => "raster",
        }
    }

    pub fn other(self) -> Self {
        match self {
            BackendKind::SceneGraph => BackendKind::Raster,
            BackendKind::Raster => BackendKind::SceneGraph,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = crate::foundation::error::VecfieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scene_graph" | "scene-graph" | "svg" => Ok(BackendKind::SceneGraph),
            "raster" | "canvas" => Ok(BackendKind::Raster),
            other => Err(crate::foundation::error::VecfieldError::validation(format!(
                "unknown backend \"{other}\""
            ))),
        }
    }
}

/// Per-frame input of the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetrics {
    pub fps: f64,
    pub primitive_count: usize,
    pub complexity: f64,
    pub memory_mb: f64,
}

/// Why the controller settled on its backend this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecisionReason {
    /// Nothing triggered a transition.
    Steady,
    /// A transition was not evaluated because of a recent switch.
    Cooldown { remaining: u32 },
    LowFps { fps: f64, min_fps: f64 },
    TooManyPrimitives { count: usize, max: usize },
    HighComplexity { complexity: f64, threshold: f64 },
    HighMemory { memory_mb: f64, threshold_mb: f64 },
    /// Every reverse criterion held.
    Recovered,
    /// The caller pinned the backend.
    Forced,
}

impl std::fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionReason::Steady => f.write_str("steady"),
            DecisionReason::Cooldown { remaining } => {
                write!(f, "cooldown ({remaining} frames left)")
            }
            DecisionReason::LowFps { fps, min_fps } => {
                write!(f, "fps {fps:.1} below {min_fps:.1}")
            }
            DecisionReason::TooManyPrimitives { count, max } => {
                write!(f, "{count} primitives above {max}")
            }
            DecisionReason::HighComplexity {
                complexity,
                threshold,
            } => write!(f, "complexity {complexity:.2} above {threshold:.2}"),
            DecisionReason::HighMemory {
                memory_mb,
                threshold_mb,
            } => write!(f, "memory {memory_mb:.1}MB above {threshold_mb:.1}MB"),
            DecisionReason::Recovered => f.write_str("recovered below reverse thresholds"),
            DecisionReason::Forced => f.write_str("forced by caller"),
        }
    }
}

/// Result of one controller evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeDecision {
    pub backend: BackendKind,
    pub quality: Quality,
    pub reason: DecisionReason,
    /// `true` on the frame the backend changed.
    pub switched: bool,
    pub cooldown_remaining: u32,
}

/// Hysteresis state machine choosing a backend and a quality tier every frame.
#[derive(Clone, Debug)]
pub struct ModeController {
    config: ControllerConfig,
    policy: QualityPolicy,
    backend: BackendKind,
    quality: Quality,
    cooldown_remaining: u32,
    forced: Option<BackendKind>,
}

impl ModeController {
    pub fn new(config: ControllerConfig, policy: QualityPolicy) -> Self {
        Self {
            config,
            policy,
            backend: BackendKind::SceneGraph,
            quality: Quality::High,
            cooldown_remaining: 0,
            forced: None,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    pub fn forced(&self) -> Option<BackendKind> {
        self.forced
    }

    /// Pin the backend (`Some`) or hand control back to the thresholds (`None`).
    ///
    /// A pinned backend different from the active one is adopted on the next evaluation,
    /// ignoring any cooldown, and restarts the cooldown.
    pub fn force_backend(&mut self, backend: Option<BackendKind>) {
        self.forced = backend;
    }

    /// Back to the initial state: scene graph, high quality, no cooldown, nothing forced.
    pub fn reset(&mut self) {
        self.backend = BackendKind::SceneGraph;
        self.quality = Quality::High;
        self.cooldown_remaining = 0;
        self.forced = None;
    }

    pub fn evaluate(&mut self, m: &FrameMetrics) -> ModeDecision {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
        self.quality = self
            .policy
            .quality_for(m.fps, m.complexity, m.primitive_count);

        let (target, reason) = self.choose(m);
        let switched = target != self.backend;
        if switched {
            let from = self.backend;
            self.backend = target;
            self.cooldown_remaining = self.config.cooldown_frames;
            tracing::info!(
                from = %from,
                to = %target,
                reason = %reason,
                fps = m.fps,
                primitives = m.primitive_count,
                complexity = m.complexity,
                memory_mb = m.memory_mb,
                "render backend switched"
            );
        }

        ModeDecision {
            backend: self.backend,
            quality: self.quality,
            reason,
            switched,
            cooldown_remaining: self.cooldown_remaining,
        }
    }

    fn choose(&self, m: &FrameMetrics) -> (BackendKind, DecisionReason) {
        if let Some(forced) = self.forced {
            return (forced, DecisionReason::Forced);
        }
        if self.cooldown_remaining > 0 {
            return (
                self.backend,
                DecisionReason::Cooldown {
                    remaining: self.cooldown_remaining,
                },
            );
        }
        match self.backend {
            BackendKind::SceneGraph => match self.forward_trigger(m) {
                Some(reason) => (BackendKind::Raster, reason),
                None => (BackendKind::SceneGraph, DecisionReason::Steady),
            },
            BackendKind::Raster if self.reverse_holds(m) => {
                (BackendKind::SceneGraph, DecisionReason::Recovered)
            }
            BackendKind::Raster => (BackendKind::Raster, DecisionReason::Steady),
        }
    }

    /// First forward criterion that fires, in fps, count, complexity, memory order.
    ///
    /// Forward criteria include their threshold; reverse criteria exclude their margin-scaled
    /// threshold, so a metric sitting exactly on a forward threshold never flips back.
    fn forward_trigger(&self, m: &FrameMetrics) -> Option<DecisionReason> {
        let c = &self.config;
        if m.fps <= c.min_fps {
            return Some(DecisionReason::LowFps {
                fps: m.fps,
                min_fps: c.min_fps,
            });
        }
        if m.primitive_count >= c.max_primitives_for_scene_graph {
            return Some(DecisionReason::TooManyPrimitives {
                count: m.primitive_count,
                max: c.max_primitives_for_scene_graph,
            });
        }
        if m.complexity >= c.complexity_threshold {
            return Some(DecisionReason::HighComplexity {
                complexity: m.complexity,
                threshold: c.complexity_threshold,
            });
        }
        if m.memory_mb >= c.memory_threshold_mb {
            return Some(DecisionReason::HighMemory {
                memory_mb: m.memory_mb,
                threshold_mb: c.memory_threshold_mb,
            });
        }
        None
    }

    fn reverse_holds(&self, m: &FrameMetrics) -> bool {
        let c = &self.config;
        m.fps > c.reverse_fps_margin * c.target_fps
            && (m.primitive_count as f64)
                < c.reverse_margin * c.max_primitives_for_scene_graph as f64
            && m.complexity < c.reverse_margin * c.complexity_threshold
            && m.memory_mb < c.reverse_margin * c.memory_threshold_mb
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(ControllerConfig::default(), QualityPolicy::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/control/controller.rs"]
mod tests;
