use std::collections::VecDeque;

use crate::control::controller::BackendKind;
use crate::foundation::error::{VecfieldError, VecfieldResult};

/// Ring-buffer size and per-primitive memory model.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Number of samples kept; older samples are evicted.
    pub window: usize,
    /// Estimated MB per retained scene-graph element.
    pub scene_graph_mb_per_primitive: f64,
    /// Raster cost as a fraction of the scene-graph cost.
    pub raster_cost_ratio: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            window: 60,
            scene_graph_mb_per_primitive: 0.02,
            raster_cost_ratio: 0.1,
        }
    }
}

impl TelemetryConfig {
    pub fn unit_cost_mb(&self, backend: BackendKind) -> f64 {
        match backend {
            BackendKind::SceneGraph => self.scene_graph_mb_per_primitive,
            BackendKind::Raster => self.scene_graph_mb_per_primitive * self.raster_cost_ratio,
        }
    }

    pub fn validate(&self) -> VecfieldResult<()> {
        if self.window == 0 {
            return Err(VecfieldError::config("telemetry window must be > 0"));
        }
        if !self.scene_graph_mb_per_primitive.is_finite() || self.scene_graph_mb_per_primitive < 0.0
        {
            return Err(VecfieldError::config(
                "scene_graph_mb_per_primitive must be finite and >= 0",
            ));
        }
        if !self.raster_cost_ratio.is_finite() || self.raster_cost_ratio < 0.0 {
            return Err(VecfieldError::config(
                "raster_cost_ratio must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// What the orchestrator knows about a frame when it records it.
#[derive(Clone, Copy, Debug)]
pub struct SampleInput<'a> {
    pub primitive_count: usize,
    pub animation_id: &'a str,
    /// Clock reading when the frame began.
    pub frame_start_ms: f64,
    /// Clock reading now.
    pub now_ms: f64,
    pub backend: BackendKind,
    pub complexity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TelemetrySample {
    /// Time since the previous sample (frame-to-frame interval).
    pub frame_time_ms: f64,
    /// Time spent inside this frame.
    pub render_time_ms: f64,
    pub primitive_count: usize,
    pub complexity_score: f64,
    pub memory_estimate_mb: f64,
}

/// Rolling window of frame timings.
#[derive(Debug)]
pub struct TelemetryCollector {
    config: TelemetryConfig,
    samples: VecDeque<TelemetrySample>,
    last_frame_ts: Option<f64>,
}

impl TelemetryCollector {
    pub fn new(config: TelemetryConfig) -> Self {
        let cap = config.window.max(1);
        Self {
            config,
            samples: VecDeque::with_capacity(cap),
            last_frame_ts: None,
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Record one frame and return the stored sample.
    pub fn sample(&mut self, input: SampleInput<'_>) -> TelemetrySample {
        let since = self.last_frame_ts.unwrap_or(input.frame_start_ms);
        // Clocks are monotonic in production; a manual clock may still be rewound.
        let frame_time_ms = (input.now_ms - since).max(0.0);
        let render_time_ms = (input.now_ms - input.frame_start_ms).max(0.0);
        self.last_frame_ts = Some(input.now_ms);

        let sample = TelemetrySample {
            frame_time_ms,
            render_time_ms,
            primitive_count: input.primitive_count,
            complexity_score: input.complexity,
            memory_estimate_mb: input.primitive_count as f64
                * self.config.unit_cost_mb(input.backend),
        };

        while self.samples.len() >= self.config.window.max(1) {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);

        tracing::trace!(
            animation = %input.animation_id,
            frame_time_ms,
            render_time_ms,
            primitives = input.primitive_count,
            "telemetry sample"
        );
        sample
    }

    /// Frames per second over the window, from the mean frame interval.
    pub fn fps(&self) -> Option<f64> {
        let avg = self.average_frame_time_ms()?;
        (avg > 0.0).then(|| 1000.0 / avg)
    }

    pub fn average_frame_time_ms(&self) -> Option<f64> {
        self.mean(|s| s.frame_time_ms)
    }

    pub fn average_render_time_ms(&self) -> Option<f64> {
        self.mean(|s| s.render_time_ms)
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    /// Oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &TelemetrySample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.last_frame_ts = None;
    }

    fn mean(&self, f: impl Fn(&TelemetrySample) -> f64) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(f).sum();
        Some(sum / self.samples.len() as f64)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/telemetry/collector.rs"]
mod tests;
