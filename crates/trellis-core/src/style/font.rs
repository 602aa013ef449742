//! Font descriptors and text decoration settings.

use std::fmt;

/// Family, size and weight of the font used for a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    family: String,
    size: f32,
    bold: bool,
    italic: bool,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Font size in points, as written in documents.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Font size in diagram units (pixels at 96 dpi).
    pub fn pixel_size(&self) -> f32 {
        self.size * 4.0 / 3.0
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::new("sans", 9.0)
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if self.bold {
            write!(f, " bold")?;
        }
        if self.italic {
            write!(f, " italic")?;
        }
        write!(f, " {}", self.size)
    }
}

ordinal_enum! {
    /// Underline decoration for text.
    pub enum Underline {
        #[default]
        None = 0,
        Single = 1,
        Double = 2,
        Low = 3,
    }
}

ordinal_enum! {
    /// Horizontal alignment of text within its box.
    pub enum HAlign {
        #[default]
        Left = 0,
        Middle = 1,
        Right = 2,
    }
}

impl HAlign {
    /// Fraction of the free horizontal space placed before the text.
    pub fn factor(self) -> f32 {
        match self {
            Self::Left => 0.0,
            Self::Middle => 0.5,
            Self::Right => 1.0,
        }
    }
}
