//! Local-space geometry of one primitive.
//!
//! Shapes are built in a frame where the anchor sits at the origin and the vector points along
//! +x; backends place them with [`anchor_transform`](crate::foundation::core::anchor_transform).

use std::f64::consts::{PI, TAU};

use crate::control::quality::QualitySettings;
use crate::foundation::core::{Affine, BezPath, Point};
use crate::model::surface::BaseShape;

/// How a part is painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DrawOp {
    Stroke,
    Fill,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapePart {
    pub op: DrawOp,
    pub path: BezPath,
}

/// Inputs that determine the geometry; equal keys produce equal geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryKey {
    pub shape: BaseShape,
    pub length: f64,
    pub width: f64,
    pub decorations: bool,
    pub curve_segments: usize,
}

impl GeometryKey {
    pub fn new(shape: BaseShape, length: f64, width: f64, q: &QualitySettings) -> Self {
        Self {
            shape,
            length,
            width,
            decorations: q.draw_decorations,
            curve_segments: q.curve_segments(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeGeometry {
    pub parts: Vec<ShapePart>,
}

impl ShapeGeometry {
    pub fn build(key: &GeometryKey) -> Self {
        let len = key.length;
        let mut parts = Vec::with_capacity(2);
        match key.shape {
            BaseShape::Line => parts.push(stroke(line(Point::ORIGIN, Point::new(len, 0.0)))),
            BaseShape::Arrow => {
                let mut p = line(Point::ORIGIN, Point::new(len, 0.0));
                if key.decorations {
                    let head = (len * 0.3).clamp(2.0, 12.0).min(len.abs());
                    let (s, c) = (PI / 7.0).sin_cos();
                    p.move_to((len - head * c, -head * s));
                    p.line_to((len, 0.0));
                    p.line_to((len - head * c, head * s));
                }
                parts.push(stroke(p));
            }
            BaseShape::Triangle => {
                let half = (len * 0.25).max(key.width);
                let mut p = BezPath::new();
                p.move_to((len, 0.0));
                p.line_to((0.0, -half));
                p.line_to((0.0, half));
                p.close_path();
                parts.push(ShapePart {
                    op: DrawOp::Fill,
                    path: p,
                });
            }
            BaseShape::Curve => {
                let n = key.curve_segments.max(1);
                let bow = len * 0.15;
                let mut p = BezPath::new();
                p.move_to(Point::ORIGIN);
                for i in 1..=n {
                    let t = i as f64 / n as f64;
                    p.line_to((len * t, (t * PI).sin() * bow));
                }
                parts.push(stroke(p));
            }
            BaseShape::Dot => {
                let r = (len * 0.2).max(key.width * 0.5).max(0.5);
                parts.push(ShapePart {
                    op: DrawOp::Fill,
                    path: polygon_circle(Point::new(len * 0.5, 0.0), r, key.curve_segments * 2),
                });
                if key.decorations {
                    parts.push(stroke(line(Point::ORIGIN, Point::new(len, 0.0))));
                }
            }
        }
        Self { parts }
    }

    /// Parts mapped into surface space by `xf`.
    pub fn transformed(&self, xf: Affine) -> impl Iterator<Item = ShapePart> + '_ {
        self.parts.iter().map(move |p| ShapePart {
            op: p.op,
            path: xf * p.path.clone(),
        })
    }
}

/// Round every point of `path` to whole pixels.
pub fn snap_to_pixels(path: &BezPath) -> BezPath {
    use kurbo::PathEl;

    let r = |p: Point| Point::new(p.x.round(), p.y.round());
    let mut out = BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(r(p)),
            PathEl::LineTo(p) => out.line_to(r(p)),
            PathEl::QuadTo(a, b) => out.quad_to(r(a), r(b)),
            PathEl::CurveTo(a, b, c) => out.curve_to(r(a), r(b), r(c)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Split a compound path at every `MoveTo`.
pub fn subpaths(path: &BezPath) -> Vec<BezPath> {
    use kurbo::PathEl;

    let mut out: Vec<BezPath> = Vec::new();
    for el in path.elements() {
        match (el, out.last_mut()) {
            (PathEl::MoveTo(_), _) | (_, None) => {
                let mut p = BezPath::new();
                p.push(*el);
                out.push(p);
            }
            (_, Some(cur)) => cur.push(*el),
        }
    }
    out
}

fn line(a: Point, b: Point) -> BezPath {
    let mut p = BezPath::new();
    p.move_to(a);
    p.line_to(b);
    p
}

fn stroke(path: BezPath) -> ShapePart {
    ShapePart {
        op: DrawOp::Stroke,
        path,
    }
}

fn polygon_circle(center: Point, r: f64, segments: usize) -> BezPath {
    let n = segments.max(3);
    let mut p = BezPath::new();
    for i in 0..n {
        let a = TAU * (i as f64) / (n as f64);
        let pt = Point::new(center.x + r * a.cos(), center.y + r * a.sin());
        if i == 0 {
            p.move_to(pt);
        } else {
            p.line_to(pt);
        }
    }
    p.close_path();
    p
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
