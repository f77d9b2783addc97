use crate::foundation::core::Point;

/// Read-only per-frame input handed to animation modules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationContext {
    /// Milliseconds since the animation started.
    pub elapsed_ms: f64,
    /// Pointer position in surface space, if the pointer is over the surface.
    pub pointer: Option<Point>,
    pub width: f64,
    pub height: f64,
    pub frame: u64,
}

impl AnimationContext {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            elapsed_ms: 0.0,
            pointer: None,
            width,
            height,
            frame: 0,
        }
    }

    /// Context for frame `frame` of a fixed-rate timeline.
    pub fn at_frame(mut self, frame: u64, fps: f64) -> Self {
        self.frame = frame;
        self.elapsed_ms = if fps > 0.0 {
            (frame as f64) * 1000.0 / fps
        } else {
            0.0
        };
        self
    }

    pub fn with_pointer(mut self, pointer: Option<Point>) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }
}
