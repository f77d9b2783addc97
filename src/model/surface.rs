use crate::foundation::core::{Canvas, Rgba8};

/// Closed set of primitive shapes both backends know how to draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BaseShape {
    /// Straight stroke from anchor to tip.
    #[default]
    Line,
    /// Line plus a filled head at the tip. The head is a decoration.
    Arrow,
    /// Filled isosceles triangle pointing along the vector.
    Triangle,
    /// Stroke bent sideways, subdivided according to curve detail.
    Curve,
    /// Filled disc at the tip.
    Dot,
}

impl BaseShape {
    pub fn name(self) -> &'static str {
        match self {
            BaseShape::Line => "line",
            BaseShape::Arrow => "arrow",
            BaseShape::Triangle => "triangle",
            BaseShape::Curve => "curve",
            BaseShape::Dot => "dot",
        }
    }
}

impl std::str::FromStr for BaseShape {
    type Err = crate::foundation::error::VecfieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(BaseShape::Line),
            "arrow" => Ok(BaseShape::Arrow),
            "triangle" => Ok(BaseShape::Triangle),
            "curve" => Ok(BaseShape::Curve),
            "dot" => Ok(BaseShape::Dot),
            other => Err(crate::foundation::error::VecfieldError::validation(format!(
                "unknown base shape \"{other}\""
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn svg_name(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }

    pub fn to_kurbo(self) -> kurbo::Cap {
        match self {
            LineCap::Butt => kurbo::Cap::Butt,
            LineCap::Round => kurbo::Cap::Round,
            LineCap::Square => kurbo::Cap::Square,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StrokeStyle {
    pub cap: LineCap,
}

/// Per-frame surface description handed to the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgba8,
    pub base_shape: BaseShape,
    pub base_stroke: StrokeStyle,
}

impl SurfaceConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Rgba8::rgb(18, 20, 28),
            base_shape: BaseShape::Line,
            base_stroke: StrokeStyle::default(),
        }
    }

    pub fn with_shape(mut self, shape: BaseShape) -> Self {
        self.base_shape = shape;
        self
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.base_stroke.cap = cap;
        self
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }
}
