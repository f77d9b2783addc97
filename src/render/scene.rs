use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Instant;

use crate::control::controller::BackendKind;
use crate::control::quality::QualitySettings;
use crate::foundation::core::{Affine, Point, Rgba8, VectorId, anchor_transform};
use crate::foundation::error::{VecfieldError, VecfieldResult};
use crate::foundation::hash::ContentHash;
use crate::model::paint::{GradientKind, GradientSpec};
use crate::model::surface::SurfaceConfig;
use crate::model::vector::VectorState;
use crate::render::backend::{BackendFrameStats, DrawRequest, FrameRGBA, RenderBackend};
use crate::render::geometry::{DrawOp, GeometryKey, ShapeGeometry};
use crate::render::overlay::{DebugOverlay, LABEL_COLOR, LABEL_SIZE, PANEL_BG};

/// What an element is painted with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaintRef {
    Solid(Rgba8),
    Gradient(ContentHash),
}

/// Retained node for one primitive.
#[derive(Clone, Debug)]
pub struct SceneElement {
    pub id: VectorId,
    pub origin: Point,
    pub angle: f64,
    pub key: GeometryKey,
    pub geometry: ShapeGeometry,
    pub paint: PaintRef,
    pub stroke_width: f64,
    pub opacity: f32,
    pub visible: bool,
}

impl SceneElement {
    pub fn transform(&self) -> Affine {
        anchor_transform(self.origin, self.angle)
    }

    fn write_svg(&self, out: &mut String) {
        let [a, b, c, d, e, f] = self.transform().as_coeffs();
        let _ = write!(
            out,
            r#"<g id="v{}" transform="matrix({a} {b} {c} {d} {e} {f})""#,
            self.id.0
        );
        if self.opacity < 1.0 {
            let _ = write!(out, r#" opacity="{}""#, self.opacity.clamp(0.0, 1.0));
        }
        if !self.visible {
            out.push_str(r#" display="none""#);
        }
        out.push('>');
        for part in &self.geometry.parts {
            let _ = write!(out, r#"<path d="{}""#, part.path.to_svg());
            match part.op {
                DrawOp::Stroke => {
                    out.push_str(r#" fill="none""#);
                    write_paint(out, "stroke", &self.paint);
                    let _ = write!(out, r#" stroke-width="{}""#, self.stroke_width);
                }
                DrawOp::Fill => write_paint(out, "fill", &self.paint),
            }
            out.push_str("/>");
        }
        out.push_str("</g>");
    }
}

fn write_paint(out: &mut String, attr: &str, paint: &PaintRef) {
    match paint {
        PaintRef::Solid(c) => {
            let _ = write!(out, r#" {attr}="{}""#, c.to_hex_rgb());
            if c.a < 255 {
                let _ = write!(out, r#" {attr}-opacity="{}""#, c.alpha_f32());
            }
        }
        PaintRef::Gradient(h) => {
            let _ = write!(out, r#" {attr}="url(#{})""#, GradientDefs::element_id(*h));
        }
    }
}

/// Per-frame retained-graph diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneDiffStats {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub position_updates: usize,
    pub rotation_updates: usize,
    pub geometry_updates: usize,
    pub paint_updates: usize,
    pub style_updates: usize,
    pub visibility_updates: usize,
    /// Gradient definitions alive after the frame.
    pub gradient_defs: usize,
    pub gradients_created: usize,
    pub gradients_pruned: usize,
}

#[derive(Clone, Debug)]
pub struct GradientDef {
    pub spec: Arc<GradientSpec>,
    /// Extent along the element's local +x axis.
    pub length: f64,
}

/// Content-addressed gradient definitions shared by every element that uses them.
#[derive(Clone, Debug, Default)]
pub struct GradientDefs {
    defs: BTreeMap<ContentHash, GradientDef>,
}

impl GradientDefs {
    /// Key of `spec` at `length`, inserting a definition when none exists yet.
    pub fn intern(&mut self, spec: &Arc<GradientSpec>, length: f64) -> (ContentHash, bool) {
        let hash = spec.content_hash(&[length]);
        let mut created = false;
        self.defs.entry(hash).or_insert_with(|| {
            created = true;
            GradientDef {
                spec: Arc::clone(spec),
                length,
            }
        });
        (hash, created)
    }

    /// Drop every definition not in `live`; returns how many went.
    pub fn prune(&mut self, live: &HashSet<ContentHash>) -> usize {
        let before = self.defs.len();
        self.defs.retain(|h, _| live.contains(h));
        before - self.defs.len()
    }

    pub fn get(&self, hash: ContentHash) -> Option<&GradientDef> {
        self.defs.get(&hash)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn clear(&mut self) {
        self.defs.clear();
    }

    pub fn element_id(hash: ContentHash) -> String {
        format!("g{}", hash.short_hex())
    }

    fn write_svg(&self, out: &mut String) {
        for (hash, def) in &self.defs {
            let id = Self::element_id(*hash);
            match def.spec.kind {
                GradientKind::Linear => {
                    let _ = write!(
                        out,
                        r#"<linearGradient id="{id}" gradientUnits="userSpaceOnUse" x1="0" y1="0" x2="{}" y2="0">"#,
                        def.length
                    );
                }
                GradientKind::Radial => {
                    let _ = write!(
                        out,
                        r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="0" cy="0" r="{}">"#,
                        def.length.abs().max(f64::EPSILON)
                    );
                }
            }
            for s in &def.spec.stops {
                let _ = write!(
                    out,
                    r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
                    s.offset.clamp(0.0, 1.0),
                    s.color.to_hex_rgb(),
                    s.color.alpha_f32()
                );
            }
            out.push_str(match def.spec.kind {
                GradientKind::Linear => "</linearGradient>",
                GradientKind::Radial => "</radialGradient>",
            });
        }
    }
}

/// Retained backend: one element per primitive, diffed frame to frame.
#[derive(Debug, Default)]
pub struct SceneGraphBackend {
    elements: HashMap<VectorId, SceneElement>,
    order: Vec<VectorId>,
    defs: GradientDefs,
    surface: Option<SurfaceConfig>,
    antialias: bool,
    overlay: Option<DebugOverlay>,
}

impl SceneGraphBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, id: VectorId) -> Option<&SceneElement> {
        self.elements.get(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn gradient_defs(&self) -> &GradientDefs {
        &self.defs
    }

    /// Bring the retained graph in line with `vectors`.
    pub fn sync(
        &mut self,
        vectors: &[VectorState],
        surface: &SurfaceConfig,
        q: &QualitySettings,
    ) -> (SceneDiffStats, BackendFrameStats) {
        let mut diff = SceneDiffStats::default();
        let mut frame = BackendFrameStats::default();
        let mut seen: HashSet<VectorId> = HashSet::with_capacity(vectors.len());
        let mut live_gradients: HashSet<ContentHash> = HashSet::new();
        self.order.clear();

        for (i, v) in vectors.iter().enumerate() {
            seen.insert(v.id);
            let visible = q.keeps(i) && v.is_drawable();
            if !q.keeps(i) {
                frame.hidden += 1;
            } else if !v.is_drawable() {
                frame.faulted += 1;
            }

            if !v.is_drawable() {
                // Keep the last good element around, hidden; never build from bad numbers.
                if let Some(el) = self.elements.get_mut(&v.id) {
                    if el.visible {
                        el.visible = false;
                        diff.visibility_updates += 1;
                        diff.updated += 1;
                    } else {
                        diff.unchanged += 1;
                    }
                    self.order.push(v.id);
                }
                continue;
            }

            let paint = match v.color.gradient() {
                Some(spec) => {
                    let (hash, created) = self.defs.intern(spec, v.length);
                    if created {
                        diff.gradients_created += 1;
                    }
                    live_gradients.insert(hash);
                    PaintRef::Gradient(hash)
                }
                None => PaintRef::Solid(v.color.to_rgba8()),
            };
            let key = GeometryKey::new(surface.base_shape, v.length, v.width, q);

            match self.elements.get_mut(&v.id) {
                None => {
                    self.elements.insert(
                        v.id,
                        SceneElement {
                            id: v.id,
                            origin: v.origin(),
                            angle: v.angle,
                            key,
                            geometry: ShapeGeometry::build(&key),
                            paint,
                            stroke_width: v.width,
                            opacity: v.opacity,
                            visible,
                        },
                    );
                    diff.created += 1;
                }
                Some(el) => {
                    let mut changed = false;
                    if el.origin != v.origin() {
                        el.origin = v.origin();
                        diff.position_updates += 1;
                        changed = true;
                    }
                    if el.angle != v.angle {
                        el.angle = v.angle;
                        diff.rotation_updates += 1;
                        changed = true;
                    }
                    if el.key != key {
                        el.key = key;
                        el.geometry = ShapeGeometry::build(&key);
                        diff.geometry_updates += 1;
                        changed = true;
                    }
                    if el.paint != paint {
                        el.paint = paint;
                        diff.paint_updates += 1;
                        changed = true;
                    }
                    if el.stroke_width != v.width || el.opacity != v.opacity {
                        el.stroke_width = v.width;
                        el.opacity = v.opacity;
                        diff.style_updates += 1;
                        changed = true;
                    }
                    if el.visible != visible {
                        el.visible = visible;
                        diff.visibility_updates += 1;
                        changed = true;
                    }
                    if changed {
                        diff.updated += 1;
                    } else {
                        diff.unchanged += 1;
                    }
                }
            }
            self.order.push(v.id);
            if visible {
                frame.drawn += 1;
            }
        }

        let before = self.elements.len();
        self.elements.retain(|id, _| seen.contains(id));
        diff.removed = before - self.elements.len();

        // Hidden elements still reference their gradient.
        for el in self.elements.values() {
            if let PaintRef::Gradient(h) = el.paint {
                live_gradients.insert(h);
            }
        }
        diff.gradients_pruned = self.defs.prune(&live_gradients);
        diff.gradient_defs = self.defs.len();

        self.surface = Some(*surface);
        self.antialias = q.antialias;
        frame.draw_calls = frame.drawn;
        (diff, frame)
    }

    /// The retained graph as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let Some(surface) = self.surface else {
            return r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#.to_owned();
        };
        let (w, h) = (surface.width, surface.height);
        let mut out = String::with_capacity(128 + self.order.len() * 160);
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        let bg = surface.background;
        let _ = write!(out, r#"<rect width="{w}" height="{h}""#);
        write_paint(&mut out, "fill", &PaintRef::Solid(bg));
        out.push_str("/>");

        if !self.defs.is_empty() {
            out.push_str("<defs>");
            self.defs.write_svg(&mut out);
            out.push_str("</defs>");
        }

        let rendering = if self.antialias {
            "geometricPrecision"
        } else {
            "crispEdges"
        };
        let _ = write!(
            out,
            r#"<g id="field" shape-rendering="{rendering}" stroke-linecap="{}">"#,
            surface.base_stroke.cap.svg_name()
        );
        for id in &self.order {
            if let Some(el) = self.elements.get(id) {
                el.write_svg(&mut out);
            }
        }
        out.push_str("</g>");

        if let Some(o) = &self.overlay {
            write_overlay(&mut out, o);
        }
        out.push_str("</svg>");
        out
    }
}

fn write_overlay(out: &mut String, o: &DebugOverlay) {
    let p = o.panel();
    let _ = write!(
        out,
        r#"<g id="debug-overlay"><rect x="{}" y="{}" width="{}" height="{}""#,
        p.x0,
        p.y0,
        p.width(),
        p.height()
    );
    write_paint(out, "fill", &PaintRef::Solid(PANEL_BG));
    let _ = write!(
        out,
        r#"/><text x="{}" y="{}" font-family="monospace" font-size="{}""#,
        p.x0 + 8.0,
        p.y0 + 16.0,
        LABEL_SIZE
    );
    write_paint(out, "fill", &PaintRef::Solid(LABEL_COLOR));
    let _ = write!(out, ">{}</text></g>", escape_xml(&o.label()));
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

impl RenderBackend for SceneGraphBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::SceneGraph
    }

    fn draw(&mut self, req: &DrawRequest<'_>) -> VecfieldResult<BackendFrameStats> {
        let t0 = Instant::now();
        req.surface.canvas().to_u16()?;
        let (diff, mut frame) = self.sync(req.vectors, req.surface, &req.quality);
        self.overlay = req.overlay.cloned();
        tracing::trace!(
            created = diff.created,
            updated = diff.updated,
            removed = diff.removed,
            gradients = diff.gradient_defs,
            "scene graph synced"
        );
        frame.scene = Some(diff);
        frame.paint_time_ms = t0.elapsed().as_secs_f64() * 1000.0;
        Ok(frame)
    }

    fn read_frame(&mut self) -> VecfieldResult<FrameRGBA> {
        let surface = self
            .surface
            .ok_or_else(|| VecfieldError::backend("scene graph has not drawn a frame"))?;
        let svg = self.to_svg();
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
            .map_err(|e| VecfieldError::backend(format!("scene graph document rejected: {e}")))?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(surface.width, surface.height)
            .ok_or_else(|| VecfieldError::backend("failed to allocate scene graph pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        Ok(FrameRGBA {
            width: surface.width,
            height: surface.height,
            data: pixmap.data().to_vec(),
            premultiplied: true,
        })
    }

    fn release(&mut self) {
        self.elements.clear();
        self.order.clear();
        self.defs.clear();
        self.surface = None;
        self.overlay = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
