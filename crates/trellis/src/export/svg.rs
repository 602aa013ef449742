//! SVG render sink.

use std::{fs::File, io::Write, path::Path as FsPath};

use log::{debug, error, info};
use svg::{
    Document, Node,
    node::element::{self as svg_element, path::Data},
};

use trellis_core::{
    color::Color,
    draw::{DrawOp, Path, PathCommand, PathOp, RenderLayer, RenderSink, Stroke, TextOp},
    geometry::{Bounds, Point, Size},
    style::{Paint, Underline},
};

use super::Error;
use crate::config::{Background, StyleConfig};

/// Line height as a multiple of the font pixel size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Builds an SVG document from draw operations.
///
/// Operations are grouped per [`RenderLayer`], so links are always drawn
/// above items and labels above links, whatever the order they arrive in.
pub struct SvgSink {
    background: Background,
    background_color: Option<Color>,
    grid_color: Color,
    grid_size: f32,
    padding: f32,
    bounds: Bounds,
    definitions: svg_element::Definitions,
    layers: [svg_element::Group; 3],
    next_id: usize,
    document: Option<Document>,
}

impl SvgSink {
    /// Creates a sink using the background and padding settings of `style`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when a configured color is invalid.
    pub fn new(style: &StyleConfig) -> Result<Self, Error> {
        Ok(Self {
            background: style.background,
            background_color: style.background_color().map_err(Error::Render)?,
            grid_color: style.grid_color().map_err(Error::Render)?,
            grid_size: style.grid_size.max(1.0),
            padding: style.padding.max(0.0),
            bounds: Bounds::default(),
            definitions: svg_element::Definitions::new(),
            layers: layer_groups(),
            next_id: 0,
            document: None,
        })
    }

    /// The finished document, once [`RenderSink::finish`] has been called.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Consumes the sink and returns the SVG text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when called before the drawing is finished.
    pub fn into_string(self) -> Result<String, Error> {
        self.document
            .map(|document| document.to_string())
            .ok_or_else(|| Error::Render("SVG document is not finished".to_string()))
    }

    /// Writes the finished document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when the drawing is not finished, or
    /// [`Error::Io`] when the file cannot be written.
    pub fn write_to(&self, path: impl AsRef<FsPath>) -> Result<(), Error> {
        let path = path.as_ref();
        let Some(document) = &self.document else {
            return Err(Error::Render("SVG document is not finished".to_string()));
        };
        info!(file_name:? = path; "Creating SVG file");
        let mut file = File::create(path).map_err(|err| {
            error!(file_name:? = path, err:err; "Failed to create SVG file");
            Error::Io(err)
        })?;
        write!(file, "{document}").map_err(|err| {
            error!(file_name:? = path, err:err; "Failed to write SVG content");
            Error::Io(err)
        })
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Returns the attribute value painting with `paint`, registering a
    /// gradient definition when needed.
    fn paint_value(&mut self, paint: &Paint) -> (String, f32) {
        match paint {
            Paint::Solid(color) => (color.to_string(), color.alpha()),
            Paint::LinearGradient(gradient) => {
                let id = self.next_id("gradient");
                let start = gradient.start();
                let end = gradient.end();
                let mut element = svg_element::LinearGradient::new()
                    .set("id", id.as_str())
                    .set("x1", start.x())
                    .set("y1", start.y())
                    .set("x2", end.x())
                    .set("y2", end.y());
                for stop in gradient.stops() {
                    element = element.add(
                        svg_element::Stop::new()
                            .set("offset", stop.offset())
                            .set("stop-color", stop.color().to_string())
                            .set("stop-opacity", stop.color().alpha()),
                    );
                }
                self.definitions.append(element);
                (format!("url(#{id})"), 1.0)
            }
        }
    }

    /// Registers a clip path for `bounds` and returns its reference.
    fn clip_value(&mut self, bounds: Bounds) -> String {
        let id = self.next_id("clip");
        let clip = svg_element::ClipPath::new().set("id", id.as_str()).add(
            svg_element::Rectangle::new()
                .set("x", bounds.min_x())
                .set("y", bounds.min_y())
                .set("width", bounds.width())
                .set("height", bounds.height()),
        );
        self.definitions.append(clip);
        format!("url(#{id})")
    }

    fn path_element(&mut self, op: &PathOp) -> svg_element::Path {
        let mut element = svg_element::Path::new().set("d", path_data(&op.path));
        element = match &op.fill {
            Some(paint) => {
                let (value, opacity) = self.paint_value(paint);
                element.set("fill", value).set("fill-opacity", opacity)
            }
            None => element.set("fill", "none"),
        };
        element = match &op.stroke {
            Some(stroke) => self.stroke_attributes(element, stroke),
            None => element.set("stroke", "none"),
        };
        if let Some(clip) = op.clip {
            element = element.set("clip-path", self.clip_value(clip));
        }
        element
    }

    fn stroke_attributes(&mut self, element: svg_element::Path, stroke: &Stroke) -> svg_element::Path {
        let (value, opacity) = self.paint_value(&stroke.paint);
        let mut element = element
            .set("stroke", value)
            .set("stroke-opacity", opacity)
            .set("stroke-width", stroke.width);
        if !stroke.dashes.is_empty() {
            let dashes: Vec<String> = stroke.dashes.iter().map(f32::to_string).collect();
            element = element.set("stroke-dasharray", dashes.join(" "));
        }
        element
    }

    fn text_group(&mut self, op: &TextOp) -> svg_element::Group {
        let style = &op.style;
        let font = style.font();
        let line_height = font.pixel_size() * LINE_HEIGHT_FACTOR;
        let step = line_height + style.font_line_spacing();
        let lines: Vec<&str> = op.text.split('\n').collect();
        let block_height = step * lines.len() as f32 - style.font_line_spacing();
        let top = op.bounds.min_y()
            + (op.bounds.height() - block_height).max(0.0) * style.font_valign();
        let x = op.bounds.min_x() + op.bounds.width() * style.font_halign().factor();
        let anchor = match style.font_halign().factor() {
            f if f <= 0.0 => "start",
            f if f >= 1.0 => "end",
            _ => "middle",
        };
        let decoration = match (style.font_underline(), style.font_strike()) {
            (Underline::None, false) => None,
            (Underline::None, true) => Some("line-through"),
            (_, false) => Some("underline"),
            (_, true) => Some("underline line-through"),
        };

        let mut group = svg_element::Group::new();
        if let Some(clip) = op.clip {
            group = group.set("clip-path", self.clip_value(clip));
        }
        for (i, line) in lines.iter().enumerate() {
            let mut text = svg_element::Text::new(*line)
                .set("x", x)
                .set("y", top + step * i as f32 + line_height / 2.0)
                .set("text-anchor", anchor)
                .set("dominant-baseline", "middle")
                .set("font-family", font.family())
                .set("font-size", font.pixel_size())
                .set("fill", style.font_color().to_string())
                .set("fill-opacity", style.font_color().alpha());
            if font.is_bold() {
                text = text.set("font-weight", "bold");
            }
            if font.is_italic() {
                text = text.set("font-style", "italic");
            }
            if let Some(decoration) = decoration {
                text = text.set("text-decoration", decoration);
            }
            group = group.add(text);
        }
        group
    }

    fn background_nodes(&mut self, area: Bounds) -> Vec<Box<dyn Node>> {
        let fill = |color: Option<Color>| {
            svg_element::Rectangle::new()
                .set("x", area.min_x())
                .set("y", area.min_y())
                .set("width", area.width())
                .set("height", area.height())
                .set("fill", color.map_or("white".to_string(), |c| c.to_string()))
                .set("fill-opacity", color.map_or(1.0, |c| c.alpha()))
        };

        match self.background {
            Background::None => Vec::new(),
            Background::Color => vec![Box::new(fill(self.background_color)) as Box<dyn Node>],
            Background::Grid | Background::Lines => {
                let id = self.next_id("grid");
                let size = self.grid_size;
                let color = self.grid_color;
                let pattern = svg_element::Pattern::new()
                    .set("id", id.as_str())
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", size)
                    .set("height", size)
                    .set("patternUnits", "userSpaceOnUse");
                let pattern = if self.background == Background::Grid {
                    pattern.add(
                        svg_element::Circle::new()
                            .set("cx", 0)
                            .set("cy", 0)
                            .set("r", 1)
                            .set("fill", color.to_string()),
                    )
                } else {
                    pattern.add(
                        svg_element::Path::new()
                            .set("d", format!("M {size} 0 L 0 0 L 0 {size}"))
                            .set("fill", "none")
                            .set("stroke", color.to_string())
                            .set("stroke-width", 0.5),
                    )
                };
                self.definitions.append(pattern);
                let grid = svg_element::Rectangle::new()
                    .set("x", area.min_x())
                    .set("y", area.min_y())
                    .set("width", area.width())
                    .set("height", area.height())
                    .set("fill", format!("url(#{id})"));
                vec![
                    Box::new(fill(self.background_color)) as Box<dyn Node>,
                    Box::new(grid),
                ]
            }
        }
    }
}

impl RenderSink for SvgSink {
    type Error = Error;

    fn begin(&mut self, bounds: Bounds) -> Result<(), Self::Error> {
        self.bounds = bounds;
        Ok(())
    }

    fn draw(&mut self, op: &DrawOp) -> Result<(), Self::Error> {
        let index = layer_index(op.layer());
        match op {
            DrawOp::Path(path) => {
                let element = self.path_element(path);
                self.layers[index].append(element);
            }
            DrawOp::Text(text) => {
                let group = self.text_group(text);
                self.layers[index].append(group);
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        let padding = self.padding;
        let area = Bounds::new_from_top_left(
            Point::new(self.bounds.min_x() - padding, self.bounds.min_y() - padding),
            Size::new(
                self.bounds.width() + 2.0 * padding,
                self.bounds.height() + 2.0 * padding,
            ),
        );
        debug!(width = area.width(), height = area.height(); "Final SVG dimensions");

        let background = self.background_nodes(area);
        let mut document = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    area.min_x(),
                    area.min_y(),
                    area.width(),
                    area.height()
                ),
            )
            .set("width", area.width())
            .set("height", area.height())
            .add(std::mem::replace(
                &mut self.definitions,
                svg_element::Definitions::new(),
            ));
        for node in background {
            document.append(node);
        }
        for layer in std::mem::replace(&mut self.layers, layer_groups()) {
            document = document.add(layer);
        }
        self.document = Some(document);
        Ok(())
    }
}

fn layer_groups() -> [svg_element::Group; 3] {
    [RenderLayer::Items, RenderLayer::Links, RenderLayer::Labels]
        .map(|layer| svg_element::Group::new().set("class", layer.name()))
}

fn layer_index(layer: RenderLayer) -> usize {
    match layer {
        RenderLayer::Items => 0,
        RenderLayer::Links => 1,
        RenderLayer::Labels => 2,
    }
}

fn path_data(path: &Path) -> Data {
    path.commands()
        .iter()
        .fold(Data::new(), |data, command| match *command {
            PathCommand::MoveTo(p) => data.move_to(vec![p.x(), p.y()]),
            PathCommand::LineTo(p) => data.line_to(vec![p.x(), p.y()]),
            PathCommand::CubicTo { ctrl1, ctrl2, to } => data.cubic_curve_to(vec![
                ctrl1.x(),
                ctrl1.y(),
                ctrl2.x(),
                ctrl2.y(),
                to.x(),
                to.y(),
            ]),
            PathCommand::Close => data.close(),
        })
}
