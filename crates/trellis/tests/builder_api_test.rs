use std::sync::Arc;

use float_cmp::assert_approx_eq;

use trellis::{
    DiagramBuilder, TrellisError,
    config::{AppConfig, Background, StyleConfig},
    diagram::Diagram,
    draw::DrawOp,
    geometry::Point,
    host::{HostEvent, HostHandler, dispatch},
    item::{ExplicitSize, Item, Placement},
    link::{EndpointRef, Link, LinkEnd, LinkId},
    metrics::FixedMetrics,
    routing::RouteError,
    style::Style,
    tree::{ItemId, TreeError},
};

fn builder(config: AppConfig) -> DiagramBuilder {
    DiagramBuilder::new(config).with_metrics(FixedMetrics::default())
}

fn boxed(diagram: &mut Diagram, x: f32, y: f32) -> ItemId {
    diagram.add_root(
        Item::rect(Style::shared_default())
            .with_position(Point::new(x, y))
            .with_explicit_size(ExplicitSize::new(40.0, 20.0)),
    )
}

fn two_boxes() -> (Diagram, ItemId, ItemId) {
    let mut diagram = Diagram::new();
    let a = boxed(&mut diagram, 0.0, 0.0);
    let b = boxed(&mut diagram, 100.0, 0.0);
    (diagram, a, b)
}

#[test]
fn test_draw_ops_are_layered() {
    let (mut diagram, a, b) = two_boxes();
    let label = diagram.add_detached(Item::text(Style::shared_default(), "calls"));
    diagram.add_link(
        Link::new(LinkEnd::item(a), LinkEnd::item(b), Style::shared_default()).with_label(label),
    );

    let (ops, bounds) = builder(AppConfig::default())
        .draw_ops(&mut diagram)
        .unwrap();

    let layers: Vec<_> = ops.iter().map(DrawOp::layer).collect();
    let mut sorted = layers.clone();
    sorted.sort();
    assert_eq!(layers, sorted);
    assert!(ops.iter().any(|op| matches!(op, DrawOp::Text(text) if text.text == "calls")));
    assert!(bounds.min_x() <= 0.0);
    assert!(bounds.max_x() >= 140.0);
}

#[test]
fn test_forward_link_reference_is_a_route_error() {
    let (mut diagram, a, _) = two_boxes();
    diagram.add_link(Link::new(
        LinkEnd::item(a),
        LinkEnd::new(EndpointRef::Link(LinkId::new(1))),
        Style::shared_default(),
    ));
    diagram.add_link(Link::new(
        LinkEnd::item(a),
        LinkEnd::new(EndpointRef::Link(LinkId::new(0))),
        Style::shared_default(),
    ));

    let err = builder(AppConfig::default())
        .render_svg(&mut diagram)
        .unwrap_err();

    assert!(matches!(
        err,
        TrellisError::Route(RouteError::DanglingReference { link: 0, .. })
    ));
}

#[test]
fn test_grid_background() {
    let config = AppConfig {
        style: StyleConfig::default().with_background(Background::Grid),
        ..AppConfig::default()
    };
    let (mut diagram, _, _) = two_boxes();

    let svg = builder(config).render_svg(&mut diagram).unwrap();

    assert!(svg.contains("<pattern"), "{svg}");
}

#[test]
fn test_invalid_background_color_is_an_export_error() {
    let config = AppConfig {
        style: StyleConfig::default()
            .with_background(Background::Color)
            .with_background_color("not a color"),
        ..AppConfig::default()
    };
    let (mut diagram, _, _) = two_boxes();

    let err = builder(config).render_svg(&mut diagram).unwrap_err();

    assert!(matches!(err, TrellisError::Export(_)));
}

#[test]
fn test_tree_errors_convert() {
    fn nest(diagram: &mut Diagram, parent: ItemId, child: ItemId) -> Result<(), TrellisError> {
        diagram.tree_mut().add_child(parent, child, Placement::new())?;
        Ok(())
    }

    let (mut diagram, a, _) = two_boxes();
    let child = diagram.add_detached(Item::rect(Style::shared_default()));
    nest(&mut diagram, a, child).unwrap();

    let err = nest(&mut diagram, child, a).unwrap_err();
    assert!(matches!(err, TrellisError::Tree(TreeError::CycleDetected { .. })));
}

#[derive(Default)]
struct Clicks(Vec<(ItemId, Point)>);

impl HostHandler for Clicks {
    fn on_item_clicked(&mut self, _: &Diagram, _: ItemId, item: ItemId, local: Point) {
        self.0.push((item, local));
    }
}

#[test]
fn test_click_after_layout() {
    let mut diagram = Diagram::new();
    let root = diagram.add_root(
        Item::rect(Arc::new(Style::default())).with_position(Point::new(10.0, 10.0)),
    );
    let text = diagram.add_detached(Item::text(Style::shared_default(), "Hello"));
    diagram
        .tree_mut()
        .add_child(root, text, Placement::new())
        .unwrap();

    builder(AppConfig::default()).layout(&mut diagram);
    let size = diagram.tree().geometry(text).size();
    assert_approx_eq!(f32, size.width(), 36.0, epsilon = 0.001);
    assert_approx_eq!(f32, size.height(), 14.4, epsilon = 0.001);

    let mut clicks = Clicks::default();
    dispatch(&diagram, HostEvent::Click(Point::new(15.0, 12.0)), &mut clicks);

    assert_eq!(clicks.0, vec![(text, Point::new(5.0, 2.0))]);
}
