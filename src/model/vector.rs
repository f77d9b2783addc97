use std::collections::BTreeMap;

use crate::foundation::core::{Point, VectorId};
use crate::model::paint::Paint;

/// One oriented, styled primitive.
///
/// The anchor is fixed at construction; animation modules rewrite the mutable fields through
/// [`VectorState::clone`] + field assignment, which keeps the anchor out of their reach.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorState {
    pub id: VectorId,
    origin: Point,
    /// Orientation in radians, measured from +x towards +y (screen space).
    pub angle: f64,
    pub length: f64,
    /// Stroke width in pixels.
    pub width: f64,
    pub opacity: f32,
    pub color: Paint,
    pub metadata: Option<BTreeMap<String, f64>>,
}

impl VectorState {
    /// New primitive pointing along +x with unit style.
    pub fn new(id: VectorId, origin: Point) -> Self {
        Self {
            id,
            origin,
            angle: 0.0,
            length: 20.0,
            width: 1.0,
            opacity: 1.0,
            color: Paint::default(),
            metadata: None,
        }
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_paint(mut self, paint: impl Into<Paint>) -> Self {
        self.color = paint.into();
        self
    }

    /// Immutable anchor.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// End point of the primitive in surface space.
    pub fn tip(&self) -> Point {
        let (s, c) = self.angle.sin_cos();
        Point::new(
            self.origin.x + c * self.length,
            self.origin.y + s * self.length,
        )
    }

    /// Attach one metadata entry, creating the map on first use.
    pub fn set_meta(&mut self, key: impl Into<String>, value: f64) {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
    }

    pub fn meta(&self, key: &str) -> Option<f64> {
        self.metadata.as_ref().and_then(|m| m.get(key).copied())
    }

    /// `true` when every geometric field can be drawn.
    pub fn is_drawable(&self) -> bool {
        self.origin.x.is_finite()
            && self.origin.y.is_finite()
            && self.angle.is_finite()
            && self.length.is_finite()
            && self.width.is_finite()
            && self.width >= 0.0
            && self.opacity.is_finite()
    }
}

/// Return `true` when `b` has the same length and the same ids in the same order as `a`.
pub fn same_shape(a: &[VectorState], b: &[VectorState]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
}

/// Return `true` when every anchor in `b` equals the anchor of the same index in `a`.
pub fn anchors_preserved(a: &[VectorState], b: &[VectorState]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.origin == y.origin)
}

#[cfg(test)]
#[path = "../../tests/unit/model/vector.rs"]
mod tests;
