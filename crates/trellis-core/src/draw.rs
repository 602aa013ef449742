//! Draw operations and render sinks.
//!
//! Once layout and routing are done, a diagram is flattened into a list of
//! [`DrawOp`]s in absolute coordinates. A [`RenderSink`] consumes that list;
//! SVG export and on-screen drawing are sinks.
//!
//! Operations carry the resolved [`Style`] they were produced from, plus the
//! stroke and fill actually used by the operation (an arrow head is stroked
//! with the arrow stroke, not the line stroke).

mod path;

use std::{convert::Infallible, sync::Arc};

pub use path::{Path, PathCommand};

use crate::{
    geometry::Bounds,
    style::{Paint, Style},
};

/// Z-order layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Item shapes and their text.
    Items,
    /// Link paths, arrow heads and symbols.
    Links,
    /// Link labels.
    Labels,
}

impl RenderLayer {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Links => "links",
            Self::Labels => "labels",
        }
    }
}

/// Stroke used to outline a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f32,
    pub dashes: Vec<f32>,
}

/// A filled and/or stroked path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOp {
    pub path: Path,
    pub stroke: Option<Stroke>,
    pub fill: Option<Paint>,
    pub style: Arc<Style>,
    pub layer: RenderLayer,
    /// Drawing is restricted to this rectangle when set.
    pub clip: Option<Bounds>,
}

/// A block of text laid out inside `bounds` according to the style's
/// alignment settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOp {
    pub bounds: Bounds,
    pub text: String,
    pub style: Arc<Style>,
    pub layer: RenderLayer,
    pub clip: Option<Bounds>,
}

/// A single drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Path(PathOp),
    Text(TextOp),
}

impl DrawOp {
    pub fn layer(&self) -> RenderLayer {
        match self {
            Self::Path(op) => op.layer,
            Self::Text(op) => op.layer,
        }
    }

    pub fn style(&self) -> &Arc<Style> {
        match self {
            Self::Path(op) => &op.style,
            Self::Text(op) => &op.style,
        }
    }
}

/// Consumer of draw operations.
pub trait RenderSink {
    type Error;

    /// Called once before any operation, with the area covered by the drawing.
    fn begin(&mut self, _bounds: Bounds) -> Result<(), Self::Error> {
        Ok(())
    }

    fn draw(&mut self, op: &DrawOp) -> Result<(), Self::Error>;

    /// Called once after the last operation.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Collects operations, mostly useful in tests.
impl RenderSink for Vec<DrawOp> {
    type Error = Infallible;

    fn draw(&mut self, op: &DrawOp) -> Result<(), Self::Error> {
        self.push(op.clone());
        Ok(())
    }
}

/// Streams `ops` into `sink`, stopping at the first error.
pub fn render<S: RenderSink>(
    sink: &mut S,
    bounds: Bounds,
    ops: &[DrawOp],
) -> Result<(), S::Error> {
    sink.begin(bounds)?;
    for op in ops {
        sink.draw(op)?;
    }
    sink.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};

    #[test]
    fn test_layer_order() {
        assert!(RenderLayer::Items < RenderLayer::Links);
        assert!(RenderLayer::Links < RenderLayer::Labels);
    }

    #[test]
    fn test_vec_sink_collects() {
        let op = DrawOp::Text(TextOp {
            bounds: Bounds::new_from_top_left(Point::default(), Size::new(10.0, 10.0)),
            text: "hello".to_string(),
            style: Style::shared_default(),
            layer: RenderLayer::Labels,
            clip: None,
        });

        let mut sink: Vec<DrawOp> = Vec::new();
        render(&mut sink, Bounds::default(), std::slice::from_ref(&op)).unwrap();
        assert_eq!(sink, vec![op]);
        assert_eq!(sink[0].layer(), RenderLayer::Labels);
    }
}
