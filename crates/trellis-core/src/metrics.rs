//! Text measurement.
//!
//! Layout needs the natural size of every text run but does not care how it
//! is measured. [`TextMetrics`] is that seam:
//!
//! - [`FontSystemMetrics`] shapes text with cosmic-text against the fonts
//!   installed on the machine.
//! - [`FixedMetrics`] uses a fixed advance per character. It is fast,
//!   deterministic and independent of installed fonts, which makes it the
//!   choice for tests and for headless environments without fonts.

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style, Weight};
use log::info;

use crate::{geometry::Size, style::FontDescriptor};

/// Line height as a multiple of the font pixel size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Measures text runs.
pub trait TextMetrics: Send + Sync {
    /// Returns the size of `text` rendered with `font`. Lines are separated
    /// by `\n` and `line_spacing` extra units are added between lines.
    fn measure(&self, text: &str, font: &FontDescriptor, line_spacing: f32) -> Size;
}

/// Deterministic metrics: each character advances by a fixed fraction of
/// the font size.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    advance: f32,
}

impl FixedMetrics {
    /// Creates metrics where each character is `advance` times the font
    /// pixel size wide.
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl TextMetrics for FixedMetrics {
    fn measure(&self, text: &str, font: &FontDescriptor, line_spacing: f32) -> Size {
        if text.is_empty() {
            return Size::default();
        }
        let px = font.pixel_size();
        let lines: Vec<&str> = text.split('\n').collect();
        let widest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);

        let width = widest as f32 * px * self.advance;
        let height = stacked_height(lines.len(), px * LINE_HEIGHT_FACTOR, line_spacing);
        Size::new(width, height)
    }
}

/// Metrics backed by a cosmic-text [`FontSystem`].
///
/// The font system is created lazily on first use since loading the system
/// font database is expensive.
#[derive(Default)]
pub struct FontSystemMetrics {
    font_system: OnceLock<Mutex<FontSystem>>,
}

impl FontSystemMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn font_system(&self) -> &Mutex<FontSystem> {
        self.font_system.get_or_init(|| {
            info!("Initializing FontSystem");
            Mutex::new(FontSystem::new())
        })
    }
}

impl TextMetrics for FontSystemMetrics {
    fn measure(&self, text: &str, font: &FontDescriptor, line_spacing: f32) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let mut font_system = self
            .font_system()
            .lock()
            .expect("failed to lock FontSystem");

        let font_size_px = font.pixel_size();
        let metrics = Metrics::new(font_size_px, font_size_px * LINE_HEIGHT_FACTOR);

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let mut attrs = Attrs::new().family(Family::Name(font.family()));
        if font.is_bold() {
            attrs = attrs.weight(Weight::BOLD);
        }
        if font.is_italic() {
            attrs = attrs.style(Style::Italic);
        }

        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut lines = 0;
        for run in buffer.layout_runs() {
            if let Some(last) = run.glyphs.last() {
                max_width = max_width.max(last.x + last.w);
            }
            lines += 1;
        }

        if lines == 0 {
            // No usable font: fall back to an estimate so layout still works.
            return FixedMetrics::new(0.55).measure(text, font, line_spacing);
        }

        Size::new(
            max_width,
            stacked_height(lines, metrics.line_height, line_spacing),
        )
    }
}

fn stacked_height(lines: usize, line_height: f32, line_spacing: f32) -> f32 {
    let gaps = lines.saturating_sub(1) as f32;
    lines as f32 * line_height + gaps * line_spacing
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_fixed_metrics_empty() {
        let size = FixedMetrics::default().measure("", &FontDescriptor::default(), 0.0);
        assert!(size.is_zero());
    }

    #[test]
    fn test_fixed_metrics_single_line() {
        let font = FontDescriptor::new("sans", 9.0);
        let size = FixedMetrics::default().measure("Name", &font, 0.0);
        // 9pt = 12px; 4 chars * 12 * 0.6, one line of 12 * 1.2
        assert_approx_eq!(f32, size.width(), 28.8, epsilon = 0.001);
        assert_approx_eq!(f32, size.height(), 14.4, epsilon = 0.001);
    }

    #[test]
    fn test_fixed_metrics_multiline_spacing() {
        let font = FontDescriptor::new("sans", 9.0);
        let size = FixedMetrics::default().measure("ab\nabcd\nx", &font, 2.0);
        assert_approx_eq!(f32, size.width(), 4.0 * 12.0 * 0.6, epsilon = 0.001);
        assert_approx_eq!(f32, size.height(), 3.0 * 14.4 + 4.0, epsilon = 0.001);
    }

    #[test]
    fn test_font_system_metrics_empty() {
        let size = FontSystemMetrics::new().measure("", &FontDescriptor::default(), 0.0);
        assert!(size.is_zero());
    }
}
