use crate::control::controller::BackendKind;
use crate::control::quality::Quality;
use crate::foundation::core::{Rect, Rgba8};

/// Read-only diagnostics drawn on top of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugOverlay {
    pub backend: BackendKind,
    pub quality: Quality,
    pub fps: Option<f64>,
    pub primitive_count: usize,
    pub complexity: f64,
    pub memory_mb: f64,
}

pub const PANEL_ORIGIN: (f64, f64) = (8.0, 8.0);
pub const PANEL_SIZE: (f64, f64) = (400.0, 64.0);
pub const PANEL_BG: Rgba8 = Rgba8::new(0, 0, 0, 170);
pub const LABEL_COLOR: Rgba8 = Rgba8::new(230, 230, 230, 255);
/// Label size in pixels; one monospace line of [`DebugOverlay::label`] fits the panel.
pub const LABEL_SIZE: f32 = 11.0;

/// One meter of the raster overlay: a track plus a filled fraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayBar {
    pub track: Rect,
    pub fill: Rect,
    pub color: Rgba8,
}

impl DebugOverlay {
    pub fn label(&self) -> String {
        let fps = match self.fps {
            Some(f) => format!("{f:.1}"),
            None => "--".to_owned(),
        };
        format!(
            "{} | {} | fps {} | n {} | cx {:.2} | mem {:.1}MB",
            self.backend, self.quality, fps, self.primitive_count, self.complexity, self.memory_mb
        )
    }

    pub fn panel(&self) -> Rect {
        Rect::new(
            PANEL_ORIGIN.0,
            PANEL_ORIGIN.1,
            PANEL_ORIGIN.0 + PANEL_SIZE.0,
            PANEL_ORIGIN.1 + PANEL_SIZE.1,
        )
    }

    /// fps (against 60), complexity and memory (against 50MB) meters, top to bottom.
    pub fn bars(&self) -> [OverlayBar; 3] {
        let fractions = [
            (self.fps.unwrap_or(0.0) / 60.0, Rgba8::rgb(90, 200, 120)),
            (self.complexity, Rgba8::rgb(230, 180, 60)),
            (self.memory_mb / 50.0, Rgba8::rgb(220, 90, 90)),
        ];
        let x0 = PANEL_ORIGIN.0 + 8.0;
        let w = PANEL_SIZE.0 - 16.0;
        std::array::from_fn(|i| {
            let (f, color) = fractions[i];
            let f = if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.0 };
            let y0 = PANEL_ORIGIN.1 + 24.0 + (i as f64) * 12.0;
            OverlayBar {
                track: Rect::new(x0, y0, x0 + w, y0 + 6.0),
                fill: Rect::new(x0, y0, x0 + w * f, y0 + 6.0),
                color,
            }
        })
    }
}
