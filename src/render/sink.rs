use std::sync::Arc;

use crate::foundation::core::{BezPath, Point, Rgba8};
use crate::foundation::hash::ContentHash;
use crate::model::paint::{GradientKind, GradientSpec, Paint};
use crate::model::surface::LineCap;
use crate::model::vector::VectorState;
use crate::render::geometry::{DrawOp, subpaths};
use crate::render::text::LabelFont;

/// Paint of one raster call, resolved against the primitive it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawPaint {
    Solid(Rgba8),
    /// Surface-space axis: anchor to tip for linear gradients; center `from` and radius
    /// `|to - from|` for radial ones.
    Gradient {
        spec: Arc<GradientSpec>,
        opacity: f32,
        from: Point,
        to: Point,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum PaintKey {
    Solid(Rgba8),
    Gradient(ContentHash),
}

impl DrawPaint {
    /// Gradients with fewer than two stops or a zero-length axis collapse to their mean color.
    pub fn for_vector(v: &VectorState) -> Self {
        match &v.color {
            Paint::Gradient(spec) => {
                let (from, to) = (v.origin(), v.tip());
                if spec.stops.len() < 2 || from.distance(to) <= f64::EPSILON {
                    return DrawPaint::Solid(spec.mean_color().with_opacity(v.opacity));
                }
                DrawPaint::Gradient {
                    spec: Arc::clone(spec),
                    opacity: v.opacity,
                    from,
                    to,
                }
            }
            other => DrawPaint::Solid(other.to_rgba8().with_opacity(v.opacity)),
        }
    }

    /// One color standing in for the whole paint.
    pub fn flat_color(&self) -> Rgba8 {
        match self {
            DrawPaint::Solid(c) => *c,
            DrawPaint::Gradient { spec, opacity, .. } => spec.mean_color().with_opacity(*opacity),
        }
    }

    /// Equal keys paint identically, so their paths can share one call.
    pub(crate) fn key(&self) -> PaintKey {
        match self {
            DrawPaint::Solid(c) => PaintKey::Solid(*c),
            DrawPaint::Gradient {
                spec,
                opacity,
                from,
                to,
            } => PaintKey::Gradient(spec.content_hash(&[
                from.x,
                from.y,
                to.x,
                to.y,
                f64::from(*opacity),
            ])),
        }
    }
}

impl From<Rgba8> for DrawPaint {
    fn from(c: Rgba8) -> Self {
        DrawPaint::Solid(c)
    }
}

/// Target of the raster strategies. Paths and text origins arrive in surface space.
pub trait DrawSink {
    fn stroke(&mut self, path: &BezPath, width: f64, cap: LineCap, paint: &DrawPaint);
    fn fill(&mut self, path: &BezPath, paint: &DrawPaint);
    /// One line of text whose layout box starts at `origin`.
    fn text(&mut self, origin: Point, text: &str, size: f32, color: Rgba8);
}

/// Paints into a `vello_cpu` render context.
pub(crate) struct VelloSink<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    font: Option<&'a mut LabelFont>,
}

impl<'a> VelloSink<'a> {
    pub(crate) fn new(ctx: &'a mut vello_cpu::RenderContext) -> Self {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Self { ctx, font: None }
    }

    /// Without a font, [`DrawSink::text`] draws nothing.
    pub(crate) fn with_font(mut self, font: Option<&'a mut LabelFont>) -> Self {
        self.font = font;
        self
    }

    fn set_color(&mut self, c: Rgba8) {
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    }

    fn set_paint(&mut self, paint: &DrawPaint) {
        let DrawPaint::Gradient {
            spec,
            opacity,
            from,
            to,
        } = paint
        else {
            self.set_color(paint.flat_color());
            return;
        };

        let mut stops: Vec<(f32, vello_cpu::peniko::Color)> = spec
            .stops
            .iter()
            .filter(|s| s.offset.is_finite())
            .map(|s| {
                let c = s.color.with_opacity(*opacity);
                (
                    s.offset.clamp(0.0, 1.0),
                    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a),
                )
            })
            .collect();
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));

        let gradient = match spec.kind {
            GradientKind::Linear => {
                vello_cpu::peniko::Gradient::new_linear(point_to_cpu(*from), point_to_cpu(*to))
            }
            GradientKind::Radial => vello_cpu::peniko::Gradient::new_radial(
                point_to_cpu(*from),
                from.distance(*to) as f32,
            ),
        };
        self.ctx.set_paint(gradient.with_stops(stops.as_slice()));
    }
}

impl DrawSink for VelloSink<'_> {
    fn stroke(&mut self, path: &BezPath, width: f64, cap: LineCap, paint: &DrawPaint) {
        self.set_paint(paint);
        let cap = match cap {
            LineCap::Butt => vello_cpu::kurbo::Cap::Butt,
            LineCap::Round => vello_cpu::kurbo::Cap::Round,
            LineCap::Square => vello_cpu::kurbo::Cap::Square,
        };
        self.ctx
            .set_stroke(vello_cpu::kurbo::Stroke::new(width).with_caps(cap));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    fn fill(&mut self, path: &BezPath, paint: &DrawPaint) {
        self.set_paint(paint);
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn text(&mut self, origin: Point, text: &str, size: f32, color: Rgba8) {
        let Some(font) = self.font.as_deref_mut() else {
            return;
        };
        let layout = match font.layout(text, size, color) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::debug!(error = %err, "overlay text skipped");
                return;
            }
        };

        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(font.data())
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

/// One captured path call of a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub op: DrawOp,
    pub path: BezPath,
    pub width: f64,
    pub cap: LineCap,
    pub paint: DrawPaint,
}

/// One captured text call of a [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextCall {
    pub origin: Point,
    pub text: String,
    pub size: f32,
    pub color: Rgba8,
}

/// Captures calls instead of painting.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<DrawCall>,
    pub texts: Vec<TextCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subpath with its style, in a canonical order; ignores call grouping and z-order.
    pub fn canonical_subpaths(&self) -> Vec<(DrawOp, [u8; 4], u64, String)> {
        let mut out: Vec<_> = self
            .calls
            .iter()
            .flat_map(|c| {
                let (op, width) = (c.op, c.width.to_bits());
                let flat = c.paint.flat_color();
                let color = [flat.r, flat.g, flat.b, flat.a];
                subpaths(&c.path)
                    .into_iter()
                    .map(move |p| (op, color, width, p.to_svg()))
            })
            .collect();
        out.sort();
        out
    }
}

impl DrawSink for RecordingSink {
    fn stroke(&mut self, path: &BezPath, width: f64, cap: LineCap, paint: &DrawPaint) {
        self.calls.push(DrawCall {
            op: DrawOp::Stroke,
            path: path.clone(),
            width,
            cap,
            paint: paint.clone(),
        });
    }

    fn fill(&mut self, path: &BezPath, paint: &DrawPaint) {
        self.calls.push(DrawCall {
            op: DrawOp::Fill,
            path: path.clone(),
            width: 0.0,
            cap: LineCap::Butt,
            paint: paint.clone(),
        });
    }

    fn text(&mut self, origin: Point, text: &str, size: f32, color: Rgba8) {
        self.texts.push(TextCall {
            origin,
            text: text.to_owned(),
            size,
            color,
        });
    }
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
