/// Discrete fidelity tiers, ordered from cheapest to richest.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Performance,
    Medium,
    High,
    Ultra,
}

impl Quality {
    pub const ALL: [Quality; 4] = [
        Quality::Performance,
        Quality::Medium,
        Quality::High,
        Quality::Ultra,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Quality::Performance => "performance",
            Quality::Medium => "medium",
            Quality::High => "high",
            Quality::Ultra => "ultra",
        }
    }

    pub fn settings(self) -> QualitySettings {
        QualitySettings::for_quality(self)
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Quality {
    type Err = crate::foundation::error::VecfieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quality::ALL
            .into_iter()
            .find(|q| q.name() == s)
            .ok_or_else(|| {
                crate::foundation::error::VecfieldError::validation(format!(
                    "unknown quality \"{s}\""
                ))
            })
    }
}

/// How much curve geometry a backend builds per primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveDetail {
    Low,
    High,
}

/// Rendering knobs derived from a [`Quality`] tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualitySettings {
    /// Draw every n-th primitive.
    pub primitive_stride: usize,
    /// Arrow heads, dot halos and similar extras.
    pub draw_decorations: bool,
    pub curve_detail: CurveDetail,
    /// Allow the raster backend to group primitives by style.
    pub use_batched_path: bool,
    pub antialias: bool,
}

impl QualitySettings {
    pub fn for_quality(q: Quality) -> Self {
        match q {
            Quality::Ultra => Self {
                primitive_stride: 1,
                draw_decorations: true,
                curve_detail: CurveDetail::High,
                use_batched_path: true,
                antialias: true,
            },
            Quality::High => Self {
                primitive_stride: 1,
                draw_decorations: true,
                curve_detail: CurveDetail::Low,
                use_batched_path: true,
                antialias: true,
            },
            Quality::Medium => Self {
                primitive_stride: 1,
                draw_decorations: false,
                curve_detail: CurveDetail::Low,
                use_batched_path: true,
                antialias: true,
            },
            Quality::Performance => Self {
                primitive_stride: 2,
                draw_decorations: false,
                curve_detail: CurveDetail::Low,
                use_batched_path: false,
                antialias: false,
            },
        }
    }

    /// Flattening segments for curved shapes.
    pub fn curve_segments(&self) -> usize {
        match self.curve_detail {
            CurveDetail::High => 16,
            CurveDetail::Low => 4,
        }
    }

    /// `true` when the primitive at `index` is drawn under this stride.
    pub fn keeps(&self, index: usize) -> bool {
        index % self.primitive_stride.max(1) == 0
    }
}

impl Default for QualitySettings {
    fn default() -> Self {
        Self::for_quality(Quality::High)
    }
}
