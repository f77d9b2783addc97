use crate::control::controller::BackendKind;
use crate::control::quality::QualitySettings;
use crate::foundation::error::VecfieldResult;
use crate::model::surface::SurfaceConfig;
use crate::model::vector::VectorState;
use crate::render::overlay::DebugOverlay;
use crate::render::raster::RasterStrategy;
use crate::render::scene::SceneDiffStats;

/// A rendered frame in row-major RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Copy with straight (non-premultiplied) alpha, for encoders that expect it.
    pub fn to_straight_alpha(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct DrawRequest<'a> {
    pub vectors: &'a [VectorState],
    pub surface: &'a SurfaceConfig,
    pub quality: QualitySettings,
    pub overlay: Option<&'a DebugOverlay>,
}

/// What a backend did with one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BackendFrameStats {
    /// Primitives that produced geometry.
    pub drawn: usize,
    /// Primitives skipped by the quality stride.
    pub hidden: usize,
    /// Primitives skipped because their geometry was not finite.
    pub faulted: usize,
    /// Stroke/fill calls issued (raster) or elements emitted (scene graph).
    pub draw_calls: usize,
    /// Raster strategy used, if the raster backend drew the frame.
    pub strategy: Option<RasterStrategy>,
    /// Retained-graph diff, if the scene-graph backend drew the frame.
    pub scene: Option<SceneDiffStats>,
    pub paint_time_ms: f64,
}

/// A drawing strategy the pipeline can switch between.
pub trait RenderBackend {
    fn kind(&self) -> BackendKind;

    fn draw(&mut self, req: &DrawRequest<'_>) -> VecfieldResult<BackendFrameStats>;

    /// Pixels of the last drawn frame.
    fn read_frame(&mut self) -> VecfieldResult<FrameRGBA>;

    /// Drop retained resources; the next `draw` starts from scratch.
    fn release(&mut self);
}
