use crate::control::quality::Quality;
use crate::foundation::error::{VecfieldError, VecfieldResult};

/// Thresholds of the backend state machine.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Below this fps the scene graph is abandoned.
    pub min_fps: f64,
    /// The raster backend is left only above `reverse_fps_margin * target_fps`.
    pub target_fps: f64,
    pub max_primitives_for_scene_graph: usize,
    pub complexity_threshold: f64,
    pub memory_threshold_mb: f64,
    /// Frames after a switch during which no further switch happens.
    pub cooldown_frames: u32,
    /// Fraction of the count, complexity and memory thresholds a reverse switch must stay under.
    pub reverse_margin: f64,
    /// Fraction of `target_fps` a reverse switch must exceed.
    pub reverse_fps_margin: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_fps: 30.0,
            target_fps: 60.0,
            max_primitives_for_scene_graph: 1000,
            complexity_threshold: 0.8,
            memory_threshold_mb: 50.0,
            cooldown_frames: 180,
            reverse_margin: 0.8,
            reverse_fps_margin: 0.9,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> VecfieldResult<()> {
        for (name, v) in [
            ("min_fps", self.min_fps),
            ("target_fps", self.target_fps),
            ("complexity_threshold", self.complexity_threshold),
            ("memory_threshold_mb", self.memory_threshold_mb),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(VecfieldError::config(format!(
                    "{name} must be finite and >= 0, got {v}"
                )));
            }
        }
        for (name, v) in [
            ("reverse_margin", self.reverse_margin),
            ("reverse_fps_margin", self.reverse_fps_margin),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(VecfieldError::config(format!(
                    "{name} must be in (0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Floors a frame must beat, strictly, to be rendered at a tier.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TierFloor {
    pub min_fps: f64,
    pub max_complexity: f64,
    pub max_primitives: usize,
}

impl TierFloor {
    pub fn admits(&self, fps: f64, complexity: f64, primitive_count: usize) -> bool {
        fps > self.min_fps && complexity < self.max_complexity && primitive_count < self.max_primitives
    }
}

/// Maps frame metrics to a [`Quality`]; tiers are tried richest first.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct QualityPolicy {
    pub ultra: TierFloor,
    pub high: TierFloor,
    pub medium: TierFloor,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            ultra: TierFloor {
                min_fps: 55.0,
                max_complexity: 0.5,
                max_primitives: 500,
            },
            high: TierFloor {
                min_fps: 45.0,
                max_complexity: 0.7,
                max_primitives: 1000,
            },
            medium: TierFloor {
                min_fps: 30.0,
                max_complexity: 0.9,
                max_primitives: 2500,
            },
        }
    }
}

impl QualityPolicy {
    pub fn quality_for(&self, fps: f64, complexity: f64, primitive_count: usize) -> Quality {
        if self.ultra.admits(fps, complexity, primitive_count) {
            Quality::Ultra
        } else if self.high.admits(fps, complexity, primitive_count) {
            Quality::High
        } else if self.medium.admits(fps, complexity, primitive_count) {
            Quality::Medium
        } else {
            Quality::Performance
        }
    }

    /// Richer tiers must demand at least as much as poorer ones, or the mapping stops being
    /// monotone.
    pub fn validate(&self) -> VecfieldResult<()> {
        let tiers = [("medium", self.medium), ("high", self.high), ("ultra", self.ultra)];
        for (name, t) in tiers {
            if !t.min_fps.is_finite() || !t.max_complexity.is_finite() {
                return Err(VecfieldError::config(format!(
                    "quality tier {name} has non-finite floors"
                )));
            }
        }
        for pair in tiers.windows(2) {
            let ((lo_name, lo), (hi_name, hi)) = (pair[0], pair[1]);
            if hi.min_fps < lo.min_fps
                || hi.max_complexity > lo.max_complexity
                || hi.max_primitives > lo.max_primitives
            {
                return Err(VecfieldError::config(format!(
                    "quality tier {hi_name} must be at least as strict as {lo_name}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/control/config.rs"]
mod tests;
