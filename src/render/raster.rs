use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::control::controller::BackendKind;
use crate::control::quality::QualitySettings;
use crate::foundation::core::{BezPath, Point, Rgba8, anchor_transform};
use crate::foundation::error::{VecfieldError, VecfieldResult};
use crate::model::surface::SurfaceConfig;
use crate::model::vector::VectorState;
use crate::render::backend::{BackendFrameStats, DrawRequest, FrameRGBA, RenderBackend};
use crate::render::geometry::{DrawOp, GeometryKey, ShapeGeometry, snap_to_pixels};
use crate::render::overlay::{DebugOverlay, LABEL_COLOR, LABEL_SIZE, PANEL_BG};
use crate::render::sink::{DrawPaint, DrawSink, PaintKey, VelloSink};
use crate::render::text::LabelFont;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterOpts {
    /// Visible-primitive count above which style batching kicks in.
    pub batch_threshold: usize,
    /// Font for the debug overlay label; a system monospace face when unset.
    pub overlay_font: Option<PathBuf>,
}

impl Default for RasterOpts {
    fn default() -> Self {
        Self {
            batch_threshold: 100,
            overlay_font: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RasterStrategy {
    /// One call per primitive part.
    Direct,
    /// One call per distinct style.
    Batched,
}

pub fn choose_strategy(q: &QualitySettings, visible: usize, batch_threshold: usize) -> RasterStrategy {
    if !q.use_batched_path || visible <= batch_threshold {
        RasterStrategy::Direct
    } else {
        RasterStrategy::Batched
    }
}

/// Number of primitives a stride keeps out of `n`.
pub fn visible_count(n: usize, q: &QualitySettings) -> usize {
    let stride = q.primitive_stride.max(1);
    n.div_ceil(stride)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub drawn: usize,
    pub hidden: usize,
    pub faulted: usize,
    pub draw_calls: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct BatchKey {
    op: DrawOp,
    paint: PaintKey,
    width_bits: u64,
}

/// Paint `vectors` into `sink` with the given strategy.
pub fn paint<S: DrawSink>(
    sink: &mut S,
    vectors: &[VectorState],
    surface: &SurfaceConfig,
    q: &QualitySettings,
    strategy: RasterStrategy,
) -> PaintStats {
    match strategy {
        RasterStrategy::Direct => draw_direct(sink, vectors, surface, q),
        RasterStrategy::Batched => draw_batched(sink, vectors, surface, q),
    }
}

pub fn draw_direct<S: DrawSink>(
    sink: &mut S,
    vectors: &[VectorState],
    surface: &SurfaceConfig,
    q: &QualitySettings,
) -> PaintStats {
    let cap = surface.base_stroke.cap;
    for_each_part(vectors, surface, q, |op, path, width, paint| match op {
        DrawOp::Stroke => sink.stroke(&path, width, cap, paint),
        DrawOp::Fill => sink.fill(&path, paint),
    })
}

/// Groups parts by `(op, paint, stroke width)` in first-seen order and issues one call per group.
///
/// Gradient paints key on their content hash together with their surface-space axis, so only
/// coincident gradients share a call.
pub fn draw_batched<S: DrawSink>(
    sink: &mut S,
    vectors: &[VectorState],
    surface: &SurfaceConfig,
    q: &QualitySettings,
) -> PaintStats {
    let mut index: HashMap<BatchKey, usize> = HashMap::new();
    let mut groups: Vec<(BatchKey, DrawPaint, BezPath)> = Vec::new();
    let mut stats = for_each_part(vectors, surface, q, |op, path, width, paint| {
        let key = BatchKey {
            op,
            paint: paint.key(),
            width_bits: if op == DrawOp::Stroke { width.to_bits() } else { 0 },
        };
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key, paint.clone(), BezPath::new()));
            groups.len() - 1
        });
        groups[slot].2.extend(path.elements().iter().copied());
    });

    let cap = surface.base_stroke.cap;
    for (key, paint, path) in &groups {
        match key.op {
            DrawOp::Stroke => sink.stroke(path, f64::from_bits(key.width_bits), cap, paint),
            DrawOp::Fill => sink.fill(path, paint),
        }
    }
    stats.draw_calls = groups.len();
    stats
}

/// Visit the surface-space parts of every visible, finite primitive.
///
/// `draw_calls` of the returned stats counts parts visited.
fn for_each_part(
    vectors: &[VectorState],
    surface: &SurfaceConfig,
    q: &QualitySettings,
    mut f: impl FnMut(DrawOp, BezPath, f64, &DrawPaint),
) -> PaintStats {
    let mut stats = PaintStats::default();
    for (i, v) in vectors.iter().enumerate() {
        if !q.keeps(i) {
            stats.hidden += 1;
            continue;
        }
        if !v.is_drawable() {
            stats.faulted += 1;
            continue;
        }
        let paint = DrawPaint::for_vector(v);
        let geom = ShapeGeometry::build(&GeometryKey::new(surface.base_shape, v.length, v.width, q));
        let xf = anchor_transform(v.origin(), v.angle);
        for part in geom.transformed(xf) {
            let path = if q.antialias {
                part.path
            } else {
                snap_to_pixels(&part.path)
            };
            let width = if q.antialias { v.width } else { v.width.round().max(1.0) };
            f(part.op, path, width, &paint);
            stats.draw_calls += 1;
        }
        stats.drawn += 1;
    }
    stats
}

/// Panel, label line and meters.
pub fn draw_overlay<S: DrawSink>(sink: &mut S, overlay: &DebugOverlay) {
    use kurbo::Shape;

    let panel = overlay.panel();
    sink.fill(&panel.to_path(0.1), &PANEL_BG.into());
    sink.text(
        Point::new(panel.x0 + 8.0, panel.y0 + 5.0),
        &overlay.label(),
        LABEL_SIZE,
        LABEL_COLOR,
    );
    for bar in overlay.bars() {
        sink.fill(&bar.track.to_path(0.1), &Rgba8::new(255, 255, 255, 40).into());
        if bar.fill.width() > 0.0 {
            sink.fill(&bar.fill.to_path(0.1), &bar.color.into());
        }
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

struct RasterSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

/// Immediate-mode backend: clears and repaints everything each frame.
pub struct RasterBackend {
    opts: RasterOpts,
    surface: Option<RasterSurface>,
    last_strategy: Option<RasterStrategy>,
    label_font: Option<LabelFont>,
    font_resolved: bool,
}

impl RasterBackend {
    pub fn new(opts: RasterOpts) -> Self {
        Self {
            opts,
            surface: None,
            last_strategy: None,
            label_font: None,
            font_resolved: false,
        }
    }

    pub fn opts(&self) -> &RasterOpts {
        &self.opts
    }

    pub fn last_strategy(&self) -> Option<RasterStrategy> {
        self.last_strategy
    }

    /// Whether overlay labels are drawn; resolves the font on first call.
    pub fn has_label_font(&mut self) -> bool {
        self.ensure_label_font();
        self.label_font.is_some()
    }

    fn ensure_label_font(&mut self) {
        if self.font_resolved {
            return;
        }
        self.font_resolved = true;
        match LabelFont::resolve(self.opts.overlay_font.as_deref()) {
            Ok(font) => {
                tracing::debug!(family = font.family(), "overlay font loaded");
                self.label_font = Some(font);
            }
            Err(err) => {
                tracing::warn!(error = %err, "overlay label disabled");
            }
        }
    }

    fn ensure_surface(&mut self, cfg: &SurfaceConfig) -> VecfieldResult<()> {
        let (w, h) = cfg.canvas().to_u16()?;
        let reuse = self
            .surface
            .as_ref()
            .is_some_and(|s| s.width == w && s.height == h);
        if !reuse {
            self.surface = Some(RasterSurface {
                width: w,
                height: h,
                pixmap: vello_cpu::Pixmap::new(w, h),
            });
        }
        Ok(())
    }
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::new(RasterOpts::default())
    }
}

impl RenderBackend for RasterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Raster
    }

    fn draw(&mut self, req: &DrawRequest<'_>) -> VecfieldResult<BackendFrameStats> {
        let t0 = Instant::now();
        let strategy = choose_strategy(
            &req.quality,
            visible_count(req.vectors.len(), &req.quality),
            self.opts.batch_threshold,
        );
        if self.last_strategy != Some(strategy) {
            tracing::debug!(?strategy, primitives = req.vectors.len(), "raster strategy selected");
        }
        self.last_strategy = Some(strategy);

        self.ensure_surface(req.surface)?;
        if req.overlay.is_some() {
            self.ensure_label_font();
        }
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| VecfieldError::backend("raster surface missing"))?;
        clear_pixmap(&mut surface.pixmap, [0, 0, 0, 0]);

        let mut ctx = vello_cpu::RenderContext::new(surface.width, surface.height);
        let bg = req.surface.background;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(surface.width),
            f64::from(surface.height),
        ));

        let mut sink = VelloSink::new(&mut ctx).with_font(self.label_font.as_mut());
        let stats = paint(&mut sink, req.vectors, req.surface, &req.quality, strategy);
        if let Some(overlay) = req.overlay {
            draw_overlay(&mut sink, overlay);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut surface.pixmap);

        Ok(BackendFrameStats {
            drawn: stats.drawn,
            hidden: stats.hidden,
            faulted: stats.faulted,
            draw_calls: stats.draw_calls,
            strategy: Some(strategy),
            scene: None,
            paint_time_ms: t0.elapsed().as_secs_f64() * 1000.0,
        })
    }

    fn read_frame(&mut self) -> VecfieldResult<FrameRGBA> {
        let s = self
            .surface
            .as_ref()
            .ok_or_else(|| VecfieldError::backend("raster backend has not drawn a frame"))?;
        Ok(FrameRGBA {
            width: u32::from(s.width),
            height: u32::from(s.height),
            data: s.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn release(&mut self) {
        self.surface = None;
        self.last_strategy = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
