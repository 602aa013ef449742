//! Trellis - box layout and link routing for declarative diagrams
//!
//! This library lays out trees of boxes (vertical and horizontal stacks of
//! rectangles, ellipses, text, rules and polylines), routes links between
//! them, and renders the result as SVG. Documents are loaded from the JSON
//! scene format understood by [`trellis_scene`].
//!
//! # Pipeline
//!
//! 1. [`DiagramBuilder::load`] parses a document into diagrams.
//! 2. [`DiagramBuilder::layout`] sizes and positions every item.
//! 3. [`DiagramBuilder::route`] computes link paths and places link labels.
//! 4. [`DiagramBuilder::draw_ops`] flattens everything into draw operations,
//!    which any [`RenderSink`](draw::RenderSink) can consume;
//!    [`DiagramBuilder::render_svg`] runs the whole chain into SVG text.

pub mod config;
pub mod export;
pub mod host;
pub mod layout;
pub mod render;
pub mod routing;

mod error;

pub use trellis_core::{
    color, diagram, draw, geometry, identifier, item, link, metrics, style, tree,
};
pub use trellis_scene::{self as scene, Scene};

pub use error::TrellisError;

use log::{debug, info};

use trellis_core::{
    diagram::Diagram,
    draw::{DrawOp, render},
    geometry::Bounds,
    metrics::{FixedMetrics, FontSystemMetrics, TextMetrics},
};

use config::{AppConfig, TextMetricsKind};
use export::svg::SvgSink;
use layout::{LayoutEngine, LayoutReport};
use render::Renderer;
use routing::{LinkRoute, LinkRouter};

/// Builder for loading, laying out and rendering Trellis diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use trellis::{DiagramBuilder, config::AppConfig};
///
/// let source = r#"{"diagrams": [{"items": [{"x": 0, "y": 0, "text": "Hello"}]}]}"#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let scene = builder.load(source).expect("Failed to load");
///
/// let (_, mut diagrams) = scene.into_parts();
/// let svg = builder
///     .render_svg(&mut diagrams[0])
///     .expect("Failed to render");
/// ```
pub struct DiagramBuilder {
    config: AppConfig,
    metrics: Box<dyn TextMetrics>,
}

impl Default for DiagramBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// Text is measured as selected by the `layout.text_metrics` setting.
    pub fn new(config: AppConfig) -> Self {
        let metrics: Box<dyn TextMetrics> = match config.layout.text_metrics {
            TextMetricsKind::FontSystem => Box::new(FontSystemMetrics::new()),
            TextMetricsKind::Fixed => Box::new(FixedMetrics::default()),
        };
        Self { config, metrics }
    }

    /// Replaces the text metrics used for layout and rendering.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis::{DiagramBuilder, metrics::FixedMetrics};
    ///
    /// let builder = DiagramBuilder::default().with_metrics(FixedMetrics::new(0.5));
    /// ```
    pub fn with_metrics(mut self, metrics: impl TextMetrics + 'static) -> Self {
        self.metrics = Box::new(metrics);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Load a JSON document into its styles and diagrams.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Load`] carrying the source text when the
    /// document is malformed or references unknown styles or items.
    pub fn load(&self, source: &str) -> Result<Scene, TrellisError> {
        info!(bytes = source.len(); "Loading document");
        let scene =
            trellis_scene::load(source).map_err(|err| TrellisError::new_load_error(err, source))?;
        debug!(diagrams = scene.diagrams().len(); "Document loaded");
        Ok(scene)
    }

    /// Compute the geometry of every item of `diagram`.
    ///
    /// Layout never fails; geometry conflicts are returned in the report.
    pub fn layout(&self, diagram: &mut Diagram) -> LayoutReport {
        LayoutEngine::new(self.metrics.as_ref()).layout(diagram)
    }

    /// Route the links of a laid-out diagram and place their labels.
    ///
    /// # Errors
    ///
    /// Returns [`TrellisError::Route`] when a link endpoint is not part of
    /// the diagram.
    pub fn route(&self, diagram: &mut Diagram) -> Result<Vec<LinkRoute>, TrellisError> {
        let router = LinkRouter::new((&self.config.routing).into());
        Ok(router.route(diagram)?)
    }

    /// Lay out, route and flatten `diagram` into draw operations.
    ///
    /// Returns the operations together with the area they cover.
    ///
    /// # Errors
    ///
    /// Returns the routing errors of [`DiagramBuilder::route`].
    pub fn draw_ops(&self, diagram: &mut Diagram) -> Result<(Vec<DrawOp>, Bounds), TrellisError> {
        self.layout(diagram);
        let routes = self.route(diagram)?;
        let ops = Renderer::new(self.metrics.as_ref()).draw_ops(diagram, &routes);
        Ok((ops, drawing_bounds(diagram, &routes)))
    }

    /// Render `diagram` to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns routing errors, or [`TrellisError::Export`] when the
    /// configured background colors are invalid.
    pub fn render_svg(&self, diagram: &mut Diagram) -> Result<String, TrellisError> {
        let (ops, bounds) = self.draw_ops(diagram)?;

        info!(operations = ops.len(); "Exporting SVG");
        let mut sink = SvgSink::new(self.config.style())?;
        render(&mut sink, bounds, &ops)?;
        let svg = sink.into_string()?;

        info!("SVG rendered successfully");
        Ok(svg)
    }
}

/// Area covered by items, labels and link paths.
fn drawing_bounds(diagram: &Diagram, routes: &[LinkRoute]) -> Bounds {
    routes
        .iter()
        .filter_map(|route| route.path().bounds())
        .chain(diagram.bounds())
        .reduce(|acc, bounds| acc.merge(&bounds))
        .unwrap_or_default()
}
