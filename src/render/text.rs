use std::path::{Path, PathBuf};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{VecfieldError, VecfieldResult};

/// Monospace faces tried in order when no overlay font is configured.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush carried through Parley layouts.
pub(crate) struct LabelBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgba8> for LabelBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// One registered face plus the Parley contexts that shape text with it.
pub(crate) struct LabelFont {
    family: String,
    data: vello_cpu::peniko::FontData,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<LabelBrush>,
}

impl LabelFont {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> VecfieldResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| VecfieldError::validation("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| VecfieldError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            family,
            data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        })
    }

    pub(crate) fn load(path: &Path) -> VecfieldResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            VecfieldError::config(format!("failed to read overlay font '{}': {e}", path.display()))
        })?;
        Self::from_bytes(bytes)
    }

    /// `explicit` when given, otherwise the first readable [`SYSTEM_FONT_CANDIDATES`] entry.
    pub(crate) fn resolve(explicit: Option<&Path>) -> VecfieldResult<Self> {
        if let Some(p) = explicit {
            return Self::load(p);
        }
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .filter(|p| p.is_file())
            .find_map(|p| Self::load(&p).ok())
            .ok_or_else(|| VecfieldError::config("no overlay font found on this system"))
    }

    pub(crate) fn family(&self) -> &str {
        &self.family
    }

    pub(crate) fn data(&self) -> &vello_cpu::peniko::FontData {
        &self.data
    }

    /// Shape one unwrapped line.
    pub(crate) fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> VecfieldResult<parley::Layout<LabelBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(VecfieldError::validation("text size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(LabelBrush::from(color)));

        let mut layout: parley::Layout<LabelBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
