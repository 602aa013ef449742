//! Application configuration.

use serde::Deserialize;

use trellis_core::color::Color;

use crate::routing::RoutingOptions;

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Link routing configuration section
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Style configuration section
    #[serde(default)]
    pub style: StyleConfig,
}

impl AppConfig {
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// How text is measured during layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextMetricsKind {
    /// Shape text with the system fonts.
    #[default]
    FontSystem,
    /// Fixed advance per character, independent of installed fonts.
    Fixed,
}

/// Layout configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub text_metrics: TextMetricsKind,
}

/// Link routing configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Extra bow of each additional curved link between the same endpoints
    #[serde(default = "default_curve_step")]
    pub curve_step: f32,

    /// Maximal radius of rounded orthogonal corners
    #[serde(default = "default_corner_radius")]
    pub corner_radius: f32,

    /// Length of the segment leaving a forced side
    #[serde(default = "default_side_stub")]
    pub side_stub: f32,

    /// Distance between link labels and their link
    #[serde(default = "default_label_gap")]
    pub label_gap: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            curve_step: default_curve_step(),
            corner_radius: default_corner_radius(),
            side_stub: default_side_stub(),
            label_gap: default_label_gap(),
        }
    }
}

impl From<&RoutingConfig> for RoutingOptions {
    fn from(config: &RoutingConfig) -> Self {
        RoutingOptions::default()
            .with_curve_step(config.curve_step)
            .with_corner_radius(config.corner_radius)
            .with_side_stub(config.side_stub)
            .with_label_gap(config.label_gap)
    }
}

fn default_curve_step() -> f32 {
    16.0
}

fn default_corner_radius() -> f32 {
    8.0
}

fn default_side_stub() -> f32 {
    10.0
}

fn default_label_gap() -> f32 {
    4.0
}

/// What is painted behind the drawing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    None,
    /// A flat background color.
    Color,
    /// The background color with a dot at each grid intersection.
    Grid,
    /// The background color with grid lines.
    Lines,
}

/// Style configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub background: Background,

    /// Background color of exported drawings
    #[serde(default)]
    background_color: Option<String>,

    /// Color of grid dots and lines
    #[serde(default)]
    grid_color: Option<String>,

    /// Distance between grid lines
    #[serde(default = "default_grid_size")]
    pub grid_size: f32,

    /// Space around the drawing
    #[serde(default = "default_padding")]
    pub padding: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background: Background::default(),
            background_color: None,
            grid_color: None,
            grid_size: default_grid_size(),
            padding: default_padding(),
        }
    }
}

fn default_grid_size() -> f32 {
    20.0
}

fn default_padding() -> f32 {
    20.0
}

impl StyleConfig {
    /// Get the background color from configuration
    /// Returns None if no background color is configured
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Get the grid color from configuration, light gray when unset
    pub fn grid_color(&self) -> Result<Color, String> {
        match &self.grid_color {
            Some(color) => {
                Color::new(color).map_err(|err| format!("Invalid grid color in config: {err}"))
            }
            None => Color::new("#d8d8d8"),
        }
    }

    /// Sets the background kind.
    pub fn with_background(mut self, background: Background) -> Self {
        self.background = background;
        self
    }

    /// Sets the background color, mostly for programmatic configuration.
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Sets the grid color.
    pub fn with_grid_color(mut self, color: impl Into<String>) -> Self {
        self.grid_color = Some(color.into());
        self
    }
}
