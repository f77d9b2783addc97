//! Initial primitive placement.
//!
//! Layout generation proper belongs to the caller; this module only defines the seam and a
//! uniform grid that tests, benches and the CLI use.

use crate::foundation::core::{Point, VectorId};
use crate::model::paint::Paint;
use crate::model::vector::VectorState;

/// Produces the immutable anchors of a session.
pub trait Layout {
    fn build(&self) -> Vec<VectorState>;
}

/// `cols x rows` anchors at the centers of equal cells covering `width x height`.
#[derive(Clone, Debug)]
pub struct UniformGrid {
    pub cols: u32,
    pub rows: u32,
    pub width: f64,
    pub height: f64,
    pub length: f64,
    pub stroke_width: f64,
    pub paint: Paint,
}

impl UniformGrid {
    pub fn new(cols: u32, rows: u32, width: f64, height: f64) -> Self {
        let cell = (width / f64::from(cols.max(1))).min(height / f64::from(rows.max(1)));
        Self {
            cols,
            rows,
            width,
            height,
            length: (cell * 0.8).max(1.0),
            stroke_width: 1.5,
            paint: Paint::default(),
        }
    }

    /// Smallest near-square grid holding at least `count` anchors, trimmed to exactly `count`.
    pub fn with_count(count: usize, width: f64, height: f64) -> Self {
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        let cols = ((count as f64 * aspect).sqrt().ceil() as u32).max(1);
        let rows = (count as u32).div_ceil(cols).max(1);
        Self::new(cols, rows, width, height)
    }

    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.paint = paint;
        self
    }

    /// Build exactly `count` anchors in row-major order.
    pub fn build_n(&self, count: usize) -> Vec<VectorState> {
        let cw = self.width / f64::from(self.cols.max(1));
        let ch = self.height / f64::from(self.rows.max(1));
        let mut out = Vec::with_capacity(count);
        'rows: for r in 0..self.rows {
            for c in 0..self.cols {
                if out.len() == count {
                    break 'rows;
                }
                let origin = Point::new((f64::from(c) + 0.5) * cw, (f64::from(r) + 0.5) * ch);
                out.push(
                    VectorState::new(VectorId(out.len() as u32), origin)
                        .with_length(self.length)
                        .with_width(self.stroke_width)
                        .with_paint(self.paint.clone()),
                );
            }
        }
        out
    }
}

impl Layout for UniformGrid {
    fn build(&self) -> Vec<VectorState> {
        self.build_n((self.cols as usize) * (self.rows as usize))
    }
}
