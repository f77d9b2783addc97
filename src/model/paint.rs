use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::hash::{ContentHash, StableHasher};

/// HSL color with alpha. Hue in degrees, the rest normalized to `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    /// Standard HSL -> RGB conversion in sRGB space.
    pub fn to_rgba8(self) -> Rgba8 {
        fn to_u8(x: f32) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }

        let h = if self.h.is_finite() {
            (self.h % 360.0 + 360.0) % 360.0 / 360.0
        } else {
            0.0
        };
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);
        let a = to_u8(self.a);

        if s == 0.0 {
            let v = to_u8(l);
            return Rgba8::new(v, v, v, a);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Rgba8::new(
            to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            to_u8(hue_to_rgb(p, q, h)),
            to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
            a,
        )
    }
}

/// Gradient geometry family. Geometry parameters themselves come from the primitive it paints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GradientKind {
    /// Runs from the anchor to the tip of the primitive.
    Linear,
    /// Centered on the anchor, radius equal to the primitive length.
    Radial,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient in `0..=1`.
    pub offset: f32,
    pub color: Rgba8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradientSpec {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
}

impl GradientSpec {
    /// Two-stop linear gradient.
    pub fn linear(from: Rgba8, to: Rgba8) -> Self {
        Self {
            kind: GradientKind::Linear,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: from,
                },
                GradientStop {
                    offset: 1.0,
                    color: to,
                },
            ],
        }
    }

    /// Mean of the stop colors; the flat stand-in used where gradients are not drawn.
    pub fn mean_color(&self) -> Rgba8 {
        if self.stops.is_empty() {
            return Rgba8::TRANSPARENT;
        }
        let n = self.stops.len() as u32;
        let (mut r, mut g, mut b, mut a) = (0u32, 0u32, 0u32, 0u32);
        for s in &self.stops {
            r += u32::from(s.color.r);
            g += u32::from(s.color.g);
            b += u32::from(s.color.b);
            a += u32::from(s.color.a);
        }
        let avg = |v: u32| ((v + n / 2) / n) as u8;
        Rgba8::new(avg(r), avg(g), avg(b), avg(a))
    }

    /// Content hash of the gradient together with the geometry it is resolved against.
    pub fn content_hash(&self, geometry: &[f64]) -> ContentHash {
        let mut h = StableHasher::new();
        h.write_u8(match self.kind {
            GradientKind::Linear => 0,
            GradientKind::Radial => 1,
        });
        h.write_u32(self.stops.len() as u32);
        for s in &self.stops {
            h.write_f32(s.offset);
            h.write_bytes(&[s.color.r, s.color.g, s.color.b, s.color.a]);
        }
        h.write_u32(geometry.len() as u32);
        for &g in geometry {
            // Collapse -0.0 so mirrored geometry still shares a definition.
            h.write_f64(if g == 0.0 { 0.0 } else { g });
        }
        h.finish()
    }
}

/// Final paint value of one primitive, as produced by the color collaborator.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba8),
    Hsl(Hsla),
    Gradient(Arc<GradientSpec>),
}

impl Paint {
    /// Resolve to one flat color. Gradients collapse to the mean of their stops.
    pub fn to_rgba8(&self) -> Rgba8 {
        match self {
            Paint::Solid(c) => *c,
            Paint::Hsl(hsl) => hsl.to_rgba8(),
            Paint::Gradient(g) => g.mean_color(),
        }
    }

    pub fn gradient(&self) -> Option<&Arc<GradientSpec>> {
        match self {
            Paint::Gradient(g) => Some(g),
            Paint::Solid(_) | Paint::Hsl(_) => None,
        }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Rgba8::WHITE)
    }
}

impl From<Rgba8> for Paint {
    fn from(c: Rgba8) -> Self {
        Paint::Solid(c)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/paint.rs"]
mod tests;
