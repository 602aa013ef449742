//! Paint descriptors used for strokes and fills.

use crate::{color::Color, geometry::Point};

/// How a stroke or a fill is painted.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// A single flat color.
    Solid(Color),
    /// A linear gradient across the painted object's bounding box.
    LinearGradient(LinearGradient),
}

impl Paint {
    /// Returns the flat color of this paint, or the color of the first stop
    /// for gradients.
    pub fn primary_color(&self) -> Option<Color> {
        match self {
            Self::Solid(color) => Some(*color),
            Self::LinearGradient(gradient) => gradient.stops().first().map(GradientStop::color),
        }
    }
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// A color stop within a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    offset: f32,
    color: Color,
}

impl GradientStop {
    /// Creates a stop at `offset`, clamped into `0.0..=1.0`.
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

/// A linear gradient. `start` and `end` are expressed as fractions of the
/// painted object's bounding box, so `(0, 0) -> (0, 1)` goes from top to
/// bottom whatever the object size.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    start: Point,
    end: Point,
    stops: Vec<GradientStop>,
}

impl LinearGradient {
    /// Creates a gradient. Stops are kept sorted by offset.
    pub fn new(start: Point, end: Point, mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self { start, end, stops }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }
}
