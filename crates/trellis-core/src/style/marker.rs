//! Decorations drawn at the ends of lines: arrow heads and symbols.

use crate::color::Color;

ordinal_enum! {
    /// Shape of an arrow head.
    pub enum ArrowKind {
        #[default]
        None = 0,
        Open = 1,
        Solid = 2,
        Diamond = 3,
    }
}

ordinal_enum! {
    /// Symbol drawn across a line near one of its ends.
    pub enum SymbolKind {
        #[default]
        None = 0,
        Cross = 1,
        Strike = 2,
        DoubleStrike = 3,
    }
}

/// Arrow head settings for one end of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowStyle {
    kind: ArrowKind,
    length: f32,
    angle: f32,
    stroke: Option<Color>,
    fill: Option<Color>,
    width: f32,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            kind: ArrowKind::None,
            length: 8.0,
            angle: 0.4,
            stroke: Some(Color::black()),
            fill: None,
            width: 1.0,
        }
    }
}

impl ArrowStyle {
    pub fn kind(&self) -> ArrowKind {
        self.kind
    }

    /// Length of the arrow head along the line.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Half opening angle, in radians.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn stroke(&self) -> Option<Color> {
        self.stroke
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn with_kind(mut self, kind: ArrowKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_length(mut self, length: f32) -> Self {
        self.length = length;
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_stroke(mut self, stroke: Option<Color>) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_fill(mut self, fill: Option<Color>) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }
}

/// Symbol settings for one end of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolStyle {
    kind: SymbolKind,
    stroke: Option<Color>,
    dist: f32,
    width: f32,
}

impl Default for SymbolStyle {
    fn default() -> Self {
        Self {
            kind: SymbolKind::None,
            stroke: Some(Color::black()),
            dist: 16.0,
            width: 1.0,
        }
    }
}

impl SymbolStyle {
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn stroke(&self) -> Option<Color> {
        self.stroke
    }

    /// Distance between the end of the line and the symbol.
    pub fn dist(&self) -> f32 {
        self.dist
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn with_kind(mut self, kind: SymbolKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_stroke(mut self, stroke: Option<Color>) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_dist(mut self, dist: f32) -> Self {
        self.dist = dist;
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }
}
