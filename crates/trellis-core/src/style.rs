//! Visual styles shared by items and links.
//!
//! A [`Style`] is an immutable bundle of every visual attribute an item or
//! link may need: stroke and fill paints, line width and dashes, font and
//! text decoration, and the arrow heads and symbols drawn at the ends of
//! lines. Styles are built once with a [`StyleBuilder`] and then shared by
//! reference (`Arc<Style>`) between all the items and links using them.
//!
//! # Default Values
//!
//! | Property | Default |
//! |----------|---------|
//! | stroke | black |
//! | fill | none |
//! | line width | 1.0 |
//! | dashes | none (solid line) |
//! | font | `sans 9` |
//! | font color | black |
//! | text alignment | left, top |
//! | arrows / symbols | none |
//!
//! # Examples
//!
//! ```
//! use trellis_core::color::Color;
//! use trellis_core::style::{ArrowKind, Style};
//!
//! let style = Style::builder()
//!     .with_stroke(Some(Color::new("blue").unwrap().into()))
//!     .with_line_width(2.0)
//!     .with_arrow_to(|arrow| arrow.with_kind(ArrowKind::Solid))
//!     .build();
//!
//! assert_eq!(style.line_width(), 2.0);
//! assert_eq!(style.arrow_to().kind(), ArrowKind::Solid);
//! ```

mod font;
mod marker;
mod paint;

use std::sync::{Arc, OnceLock};

pub use font::{FontDescriptor, HAlign, Underline};
pub use marker::{ArrowKind, ArrowStyle, SymbolKind, SymbolStyle};
pub use paint::{GradientStop, LinearGradient, Paint};

use crate::color::Color;

static DEFAULT_STYLE: OnceLock<Arc<Style>> = OnceLock::new();

/// Immutable visual attributes of an item or a link.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    stroke: Option<Paint>,
    fill: Option<Paint>,
    line_width: f32,
    dashes: Vec<f32>,
    sloppy: bool,
    font: FontDescriptor,
    font_underline: Underline,
    font_strike: bool,
    font_color: Color,
    font_line_spacing: f32,
    font_halign: HAlign,
    font_valign: f32,
    arrow_from: ArrowStyle,
    arrow_to: ArrowStyle,
    symbol_from: SymbolStyle,
    symbol_to: SymbolStyle,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Some(Paint::Solid(Color::black())),
            fill: None,
            line_width: 1.0,
            dashes: Vec::new(),
            sloppy: false,
            font: FontDescriptor::default(),
            font_underline: Underline::None,
            font_strike: false,
            font_color: Color::black(),
            font_line_spacing: 0.0,
            font_halign: HAlign::Left,
            font_valign: 0.0,
            arrow_from: ArrowStyle::default(),
            arrow_to: ArrowStyle::default(),
            symbol_from: SymbolStyle::default(),
            symbol_to: SymbolStyle::default(),
        }
    }
}

impl Style {
    /// Starts building a style from the built-in defaults.
    pub fn builder() -> StyleBuilder {
        StyleBuilder::default()
    }

    /// Returns the shared instance of the built-in default style.
    pub fn shared_default() -> Arc<Style> {
        Arc::clone(DEFAULT_STYLE.get_or_init(|| Arc::new(Style::default())))
    }

    /// Starts building a new style that extends this one.
    pub fn to_builder(&self) -> StyleBuilder {
        StyleBuilder {
            style: self.clone(),
        }
    }

    pub fn stroke(&self) -> Option<&Paint> {
        self.stroke.as_ref()
    }

    pub fn fill(&self) -> Option<&Paint> {
        self.fill.as_ref()
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Alternating dash and gap lengths. Empty means a solid line.
    pub fn dashes(&self) -> &[f32] {
        &self.dashes
    }

    /// Whether lines should be drawn as slightly bowed hand-drawn strokes.
    pub fn is_sloppy(&self) -> bool {
        self.sloppy
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    pub fn font_underline(&self) -> Underline {
        self.font_underline
    }

    pub fn font_strike(&self) -> bool {
        self.font_strike
    }

    pub fn font_color(&self) -> Color {
        self.font_color
    }

    /// Extra space between two lines of text.
    pub fn font_line_spacing(&self) -> f32 {
        self.font_line_spacing
    }

    pub fn font_halign(&self) -> HAlign {
        self.font_halign
    }

    /// Vertical placement of text in its box, 0.0 for top and 1.0 for bottom.
    pub fn font_valign(&self) -> f32 {
        self.font_valign
    }

    pub fn arrow_from(&self) -> &ArrowStyle {
        &self.arrow_from
    }

    pub fn arrow_to(&self) -> &ArrowStyle {
        &self.arrow_to
    }

    pub fn symbol_from(&self) -> &SymbolStyle {
        &self.symbol_from
    }

    pub fn symbol_to(&self) -> &SymbolStyle {
        &self.symbol_to
    }

    /// Returns true when drawing an outline with this style is visible.
    pub fn has_stroke(&self) -> bool {
        self.line_width > 0.0 && self.stroke.is_some()
    }
}

/// Builder for [`Style`].
#[derive(Debug, Clone, Default)]
pub struct StyleBuilder {
    style: Style,
}

impl StyleBuilder {
    pub fn with_stroke(mut self, stroke: Option<Paint>) -> Self {
        self.style.stroke = stroke;
        self
    }

    pub fn with_fill(mut self, fill: Option<Paint>) -> Self {
        self.style.fill = fill;
        self
    }

    /// Sets the line width. Negative widths are treated as zero.
    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.style.line_width = line_width.max(0.0);
        self
    }

    pub fn with_dashes(mut self, dashes: Vec<f32>) -> Self {
        self.style.dashes = dashes;
        self
    }

    pub fn with_sloppy(mut self, sloppy: bool) -> Self {
        self.style.sloppy = sloppy;
        self
    }

    pub fn with_font(mut self, font: FontDescriptor) -> Self {
        self.style.font = font;
        self
    }

    pub fn with_font_underline(mut self, underline: Underline) -> Self {
        self.style.font_underline = underline;
        self
    }

    pub fn with_font_strike(mut self, strike: bool) -> Self {
        self.style.font_strike = strike;
        self
    }

    pub fn with_font_color(mut self, color: Color) -> Self {
        self.style.font_color = color;
        self
    }

    pub fn with_font_line_spacing(mut self, spacing: f32) -> Self {
        self.style.font_line_spacing = spacing;
        self
    }

    pub fn with_font_halign(mut self, halign: HAlign) -> Self {
        self.style.font_halign = halign;
        self
    }

    /// Sets the vertical text alignment, clamped into `0.0..=1.0`.
    pub fn with_font_valign(mut self, valign: f32) -> Self {
        self.style.font_valign = valign.clamp(0.0, 1.0);
        self
    }

    /// Updates the arrow drawn at the start of a line.
    pub fn with_arrow_from(mut self, update: impl FnOnce(ArrowStyle) -> ArrowStyle) -> Self {
        self.style.arrow_from = update(self.style.arrow_from);
        self
    }

    /// Updates the arrow drawn at the end of a line.
    pub fn with_arrow_to(mut self, update: impl FnOnce(ArrowStyle) -> ArrowStyle) -> Self {
        self.style.arrow_to = update(self.style.arrow_to);
        self
    }

    pub fn with_symbol_from(mut self, update: impl FnOnce(SymbolStyle) -> SymbolStyle) -> Self {
        self.style.symbol_from = update(self.style.symbol_from);
        self
    }

    pub fn with_symbol_to(mut self, update: impl FnOnce(SymbolStyle) -> SymbolStyle) -> Self {
        self.style.symbol_to = update(self.style.symbol_to);
        self
    }

    pub fn build(self) -> Style {
        self.style
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_default_style() {
        let style = Style::default();
        assert_eq!(style.stroke(), Some(&Paint::Solid(Color::black())));
        assert!(style.fill().is_none());
        assert_approx_eq!(f32, style.line_width(), 1.0);
        assert!(style.dashes().is_empty());
        assert_eq!(style.font().family(), "sans");
        assert_approx_eq!(f32, style.font().size(), 9.0);
        assert_eq!(style.font_halign(), HAlign::Left);
        assert_eq!(style.arrow_to().kind(), ArrowKind::None);
        assert!(style.has_stroke());
    }

    #[test]
    fn test_shared_default_is_shared() {
        let a = Style::shared_default();
        let b = Style::shared_default();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_builder_clamps() {
        let style = Style::builder()
            .with_line_width(-3.0)
            .with_font_valign(4.0)
            .build();
        assert_approx_eq!(f32, style.line_width(), 0.0);
        assert_approx_eq!(f32, style.font_valign(), 1.0);
        assert!(!style.has_stroke());
    }

    #[test]
    fn test_to_builder_extends() {
        let base = Style::builder().with_line_width(3.0).build();
        let derived = base.to_builder().with_sloppy(true).build();
        assert_approx_eq!(f32, derived.line_width(), 3.0);
        assert!(derived.is_sloppy());
        assert!(!base.is_sloppy());
    }

    #[test]
    fn test_marker_updates() {
        let style = Style::builder()
            .with_arrow_from(|arrow| arrow.with_kind(ArrowKind::Open).with_length(12.0))
            .with_symbol_to(|symbol| symbol.with_kind(SymbolKind::Cross))
            .build();
        assert_eq!(style.arrow_from().kind(), ArrowKind::Open);
        assert_approx_eq!(f32, style.arrow_from().length(), 12.0);
        assert_eq!(style.symbol_to().kind(), SymbolKind::Cross);
        assert_eq!(style.arrow_to().kind(), ArrowKind::None);
    }
}
