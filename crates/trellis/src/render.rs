//! Flattening of a laid-out, routed diagram into draw operations.
//!
//! Items are emitted in pre-order so that children are drawn above their
//! parents, followed by links with their arrow heads and symbols, followed
//! by link labels. Every operation uses absolute coordinates.

mod markers;
mod shapes;

use std::{collections::HashMap, sync::Arc};

use log::debug;

use trellis_core::{
    diagram::Diagram,
    draw::{DrawOp, Path, PathCommand, PathOp, RenderLayer, Stroke, TextOp},
    geometry::{Bounds, Point, Size},
    item::{ItemKind, TextArrow},
    metrics::TextMetrics,
    style::{Paint, Style},
    tree::ItemId,
};

use crate::{
    layout::{TEXT_ARROW_GAP, text_arrow_size},
    routing::{LinkRoute, path::Track},
};

/// Gap between the text of an hr item and its rules. Smaller than the
/// stub reserved by the layout so that some rule is always visible.
const HR_TEXT_GAP: f32 = 4.0;
/// Largest displacement of a sloppy segment's middle.
const SLOPPY_MAX_BOW: f32 = 2.0;

/// Produces draw operations.
pub struct Renderer<'m> {
    metrics: &'m dyn TextMetrics,
}

impl<'m> Renderer<'m> {
    pub fn new(metrics: &'m dyn TextMetrics) -> Self {
        Self { metrics }
    }

    /// Flattens `diagram` into draw operations. `routes` are the link routes
    /// computed for the diagram's current geometry.
    pub fn draw_ops(&self, diagram: &Diagram, routes: &[LinkRoute]) -> Vec<DrawOp> {
        let mut ops = Vec::new();
        let label_arrows: HashMap<ItemId, TextArrow> = routes
            .iter()
            .flat_map(LinkRoute::labels)
            .map(|placement| (placement.item(), placement.arrow()))
            .collect();

        for root in diagram.roots() {
            self.draw_item(diagram, *root, RenderLayer::Items, None, None, &mut ops);
        }
        for (link, route) in diagram.links().iter().zip(routes) {
            self.draw_link(link.style(), route, &mut ops);
        }
        for label in diagram.label_items() {
            if diagram.tree().contains(label) {
                let arrow = label_arrows.get(&label).copied();
                self.draw_item(diagram, label, RenderLayer::Labels, None, arrow, &mut ops);
            }
        }

        debug!(ops = ops.len(); "Draw operations generated");
        ops
    }

    fn draw_item(
        &self,
        diagram: &Diagram,
        id: ItemId,
        layer: RenderLayer,
        parent_clip: Option<Bounds>,
        arrow_override: Option<TextArrow>,
        ops: &mut Vec<DrawOp>,
    ) {
        let tree = diagram.tree();
        let item = &tree[id];
        let style = item.style();
        let bounds = tree.absolute_bounds(id);
        let clip = match tree.geometry(id).clip() {
            Some(_) => {
                let visible = tree.visible_bounds(id);
                let clipped = parent_clip.map(|parent| {
                    visible.intersection(&parent).unwrap_or_else(|| {
                        Bounds::new_from_top_left(visible.min_point(), Size::default())
                    })
                });
                Some(clipped.unwrap_or(visible))
            }
            None => parent_clip,
        };

        let shape = |path: Path, closed: bool| PathOp {
            path: if style.is_sloppy() { sloppy(&path) } else { path },
            stroke: stroke(style),
            fill: if closed { style.fill().cloned() } else { None },
            style: Arc::clone(style),
            layer,
            clip,
        };

        match item.kind() {
            ItemKind::Rect { radius } => {
                ops.push(DrawOp::Path(shape(shapes::rect(bounds, *radius), true)));
            }
            ItemKind::Ellipse => {
                ops.push(DrawOp::Path(shape(shapes::ellipse(bounds), true)));
            }
            ItemKind::Polyline { close, .. } => {
                let origin = bounds.min_point();
                let points: Vec<Point> = item
                    .kind()
                    .resolved_points()
                    .into_iter()
                    .map(|point| origin.add_point(point))
                    .collect();
                let path = if *close {
                    Path::polygon(&points)
                } else {
                    Path::polyline(&points)
                };
                if !path.is_empty() {
                    ops.push(DrawOp::Path(shape(path, *close)));
                }
            }
            ItemKind::Text { text, directed } => {
                let directed = match (directed, arrow_override) {
                    (TextArrow::None, _) => TextArrow::None,
                    (_, Some(arrow)) => arrow,
                    (directed, None) => *directed,
                };
                let mut text_bounds = bounds;
                if directed != TextArrow::None {
                    let size = text_arrow_size(style);
                    let arrow_box = Bounds::new_from_top_left(
                        Point::new(bounds.max_x() - size, bounds.center().y() - size / 2.0),
                        Size::new(size, size),
                    );
                    text_bounds = Bounds::new_from_top_left(
                        bounds.min_point(),
                        Size::new(
                            (bounds.width() - size - TEXT_ARROW_GAP).max(0.0),
                            bounds.height(),
                        ),
                    );
                    ops.push(DrawOp::Path(PathOp {
                        path: shapes::triangle(arrow_box, arrow_direction(directed)),
                        stroke: None,
                        fill: Some(Paint::Solid(style.font_color())),
                        style: Arc::clone(style),
                        layer,
                        clip,
                    }));
                }
                if !text.is_empty() {
                    ops.push(DrawOp::Text(TextOp {
                        bounds: text_bounds,
                        text: text.clone(),
                        style: Arc::clone(style),
                        layer,
                        clip,
                    }));
                }
            }
            ItemKind::Hr { text } => {
                let y = bounds.center().y();
                let measured = self
                    .metrics
                    .measure(text, style.font(), style.font_line_spacing());
                let mut path = Path::new();
                if text.is_empty() {
                    path.move_to(Point::new(bounds.min_x(), y))
                        .line_to(Point::new(bounds.max_x(), y));
                } else {
                    let half = measured.width() / 2.0;
                    let gap = HR_TEXT_GAP;
                    let center = bounds.center().x();
                    path.move_to(Point::new(bounds.min_x(), y))
                        .line_to(Point::new((center - half - gap).max(bounds.min_x()), y))
                        .move_to(Point::new((center + half + gap).min(bounds.max_x()), y))
                        .line_to(Point::new(bounds.max_x(), y));
                }
                ops.push(DrawOp::Path(shape(path, false)));
                if !text.is_empty() {
                    ops.push(DrawOp::Text(TextOp {
                        bounds: Bounds::new_from_center(bounds.center(), measured),
                        text: text.clone(),
                        style: Arc::clone(style),
                        layer,
                        clip,
                    }));
                }
            }
        }

        for child in tree.children(id) {
            self.draw_item(diagram, child.item(), layer, clip, None, ops);
        }
    }

    fn draw_link(&self, style: &Arc<Style>, route: &LinkRoute, ops: &mut Vec<DrawOp>) {
        let track = route.track();
        if track.is_empty() {
            return;
        }
        let path = track.to_path();
        ops.push(DrawOp::Path(PathOp {
            path: if style.is_sloppy() { sloppy(&path) } else { path },
            stroke: stroke(style),
            fill: None,
            style: Arc::clone(style),
            layer: RenderLayer::Links,
            clip: None,
        }));

        let ends = [
            (
                style.arrow_from(),
                style.symbol_from(),
                route.visible_start(),
                track.start_tangent().scale(-1.0),
                false,
            ),
            (
                style.arrow_to(),
                style.symbol_to(),
                route.visible_end(),
                track.end_tangent(),
                true,
            ),
        ];
        for (arrow, symbol, tip, direction, at_end) in ends {
            if let Some(head) = markers::arrow(arrow, tip, direction) {
                ops.push(DrawOp::Path(PathOp {
                    path: head.path,
                    stroke: head.stroke.map(|color| Stroke {
                        paint: Paint::Solid(color),
                        width: head.width,
                        dashes: Vec::new(),
                    }),
                    fill: head.fill.map(Paint::Solid),
                    style: Arc::clone(style),
                    layer: RenderLayer::Links,
                    clip: None,
                }));
            }
            let symbol_path = symbol_anchor(track, symbol.dist(), at_end)
                .and_then(|(at, tangent)| markers::symbol(symbol, at, tangent));
            if let Some(path) = symbol_path {
                ops.push(DrawOp::Path(PathOp {
                    path,
                    stroke: symbol.stroke().map(|color| Stroke {
                        paint: Paint::Solid(color),
                        width: symbol.width(),
                        dashes: Vec::new(),
                    }),
                    fill: None,
                    style: Arc::clone(style),
                    layer: RenderLayer::Links,
                    clip: None,
                }));
            }
        }
    }
}

fn stroke(style: &Style) -> Option<Stroke> {
    style.stroke().map(|paint| Stroke {
        paint: paint.clone(),
        width: style.line_width(),
        dashes: style.dashes().to_vec(),
    })
}

fn arrow_direction(arrow: TextArrow) -> Point {
    match arrow {
        TextArrow::Up => Point::new(0.0, -1.0),
        TextArrow::Down => Point::new(0.0, 1.0),
        TextArrow::Left => Point::new(-1.0, 0.0),
        TextArrow::Right | TextArrow::None => Point::new(1.0, 0.0),
    }
}

/// Point and tangent `dist` units from one end of the track.
fn symbol_anchor(track: &Track, dist: f32, at_end: bool) -> Option<(Point, Point)> {
    let length = track.length();
    if length <= 0.0 {
        return None;
    }
    let dist = dist.clamp(0.0, length);
    let distance = if at_end { length - dist } else { dist };
    Some(track.point_at_length(distance))
}

/// Replaces every straight segment with a slightly bowed curve, bowing
/// alternately to each side.
fn sloppy(path: &Path) -> Path {
    let mut result = Path::new();
    let mut current = Point::default();
    let mut start = Point::default();
    let mut side = 1.0;
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo(point) => {
                result.move_to(point);
                current = point;
                start = point;
            }
            PathCommand::LineTo(point) => {
                bowed_line(&mut result, current, point, side);
                side = -side;
                current = point;
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                result.cubic_to(ctrl1, ctrl2, to);
                current = to;
            }
            PathCommand::Close => {
                if !current.approx_eq(start, 1e-4) {
                    bowed_line(&mut result, current, start, side);
                    side = -side;
                }
                result.close();
                current = start;
            }
        }
    }
    result
}

fn bowed_line(path: &mut Path, from: Point, to: Point, side: f32) {
    let length = from.distance(to);
    let bow = (length * 0.02).min(SLOPPY_MAX_BOW) * side;
    let offset = to.sub_point(from).normalize().perpendicular().scale(bow * 4.0 / 3.0);
    path.cubic_to(
        from.lerp(to, 1.0 / 3.0).add_point(offset),
        from.lerp(to, 2.0 / 3.0).add_point(offset),
        to,
    );
}
