use crate::control::config::{ControllerConfig, QualityPolicy};
use crate::foundation::core::InstanceId;
use crate::foundation::error::{VecfieldError, VecfieldResult};
use crate::render::raster::RasterOpts;
use crate::telemetry::collector::TelemetryConfig;

/// Every tunable of a [`Pipeline`](crate::Pipeline).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineOpts {
    pub controller: ControllerConfig,
    pub quality: QualityPolicy,
    pub telemetry: TelemetryConfig,
    pub raster: RasterOpts,
    /// Scope of module scratch state; pipelines sharing an executor need distinct ids.
    pub instance: InstanceId,
}

pub const ENV_COOLDOWN_FRAMES: &str = "VECFIELD_COOLDOWN_FRAMES";
pub const ENV_MIN_FPS: &str = "VECFIELD_MIN_FPS";
pub const ENV_TARGET_FPS: &str = "VECFIELD_TARGET_FPS";
pub const ENV_MAX_SCENE_PRIMITIVES: &str = "VECFIELD_MAX_SCENE_PRIMITIVES";
pub const ENV_TELEMETRY_WINDOW: &str = "VECFIELD_TELEMETRY_WINDOW";

impl PipelineOpts {
    /// Parse a (possibly partial) JSON document; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> VecfieldResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| VecfieldError::config(format!("pipeline options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Apply `VECFIELD_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> VecfieldResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> VecfieldResult<Self> {
        if let Some(v) = parse_var::<u32>(&lookup, ENV_COOLDOWN_FRAMES)? {
            self.controller.cooldown_frames = v;
        }
        if let Some(v) = parse_var::<f64>(&lookup, ENV_MIN_FPS)? {
            self.controller.min_fps = v;
        }
        if let Some(v) = parse_var::<f64>(&lookup, ENV_TARGET_FPS)? {
            self.controller.target_fps = v;
        }
        if let Some(v) = parse_var::<usize>(&lookup, ENV_MAX_SCENE_PRIMITIVES)? {
            self.controller.max_primitives_for_scene_graph = v;
        }
        if let Some(v) = parse_var::<usize>(&lookup, ENV_TELEMETRY_WINDOW)? {
            self.telemetry.window = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> VecfieldResult<()> {
        self.controller.validate()?;
        self.quality.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> VecfieldResult<Option<T>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| VecfieldError::config(format!("{key}={raw:?} is not a valid value")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/opts.rs"]
mod tests;
