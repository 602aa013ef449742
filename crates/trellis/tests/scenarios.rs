use float_cmp::assert_approx_eq;

use trellis::{
    DiagramBuilder, TrellisError,
    diagram::Diagram,
    geometry::Point,
    link::Routing,
    metrics::FixedMetrics,
    scene::ErrorCode,
};

fn builder() -> DiagramBuilder {
    DiagramBuilder::default().with_metrics(FixedMetrics::default())
}

fn load_first(builder: &DiagramBuilder, source: &str) -> Diagram {
    let scene = builder.load(source).unwrap();
    let (_, mut diagrams) = scene.into_parts();
    diagrams.remove(0)
}

fn assert_point(actual: Point, expected: Point) {
    assert!(
        actual.approx_eq(expected, 0.001),
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn test_record_with_straight_link() {
    let builder = builder();
    let mut diagram = load_first(
        &builder,
        r#"{"diagrams": [{
            "items": [
                {"id": "A", "x": 0, "y": 0, "vbox": [
                    {"text": "Name"},
                    {"type": "hr", "text": "attrs"}
                ]},
                {"id": "B", "x": 200, "y": 0, "text": "Other"}
            ],
            "links": [{"from": {"ref": "A"}, "to": {"ref": "B"}, "route": 1}]
        }]}"#,
    );
    assert_eq!(diagram.roots().len(), 2);
    assert_eq!(diagram.links().len(), 1);

    let report = builder.layout(&mut diagram);
    assert!(report.is_clean());

    let tree = diagram.tree();
    let a = diagram.roots()[0];
    let b = diagram.roots()[1];
    let children_height: f32 = tree
        .children(a)
        .iter()
        .map(|child| tree.geometry(child.item()).size().height())
        .sum();
    assert_approx_eq!(f32, tree.geometry(a).size().height(), children_height, epsilon = 0.001);
    // "Name" at 12px: 14.4 high, "attrs" rule as high as its text.
    assert_approx_eq!(f32, children_height, 28.8, epsilon = 0.001);

    let routes = builder.route(&mut diagram).unwrap();
    assert_eq!(routes.len(), 1);
    let points = routes[0].points();
    assert_eq!(points.len(), 2);
    assert_point(points[0], diagram.tree().absolute_bounds(a).center());
    assert_point(points[1], diagram.tree().absolute_bounds(b).center());
    assert_point(points[1], Point::new(218.0, 7.2));
}

#[test]
fn test_floating_child_does_not_advance_cursor() {
    let builder = builder();
    let mut diagram = load_first(
        &builder,
        r#"{"diagrams": [{"items": [
            {"x": 10, "y": 10, "vbox": [
                {"text": "floating", "float": true, "margin": 3},
                {"text": "next", "margin": 3}
            ]}
        ]}]}"#,
    );
    builder.layout(&mut diagram);

    let tree = diagram.tree();
    let container = diagram.roots()[0];
    let children: Vec<_> = tree.children(container).iter().map(|c| c.item()).collect();

    assert_approx_eq!(f32, tree.geometry(children[1]).position().y(), 3.0);
    assert_approx_eq!(f32, tree.absolute_position(children[1]).y(), 13.0);
    // Only the in-flow child counts towards the container height.
    assert_approx_eq!(f32, tree.geometry(container).size().height(), 20.4, epsilon = 0.001);
}

#[test]
fn test_forced_left_side_for_every_routing() {
    for route in 0..=3 {
        let builder = builder();
        let mut diagram = load_first(
            &builder,
            &format!(
                r#"{{"diagrams": [{{
                    "items": [
                        {{"id": "A", "x": 0, "y": 100, "width": 40, "height": 20}},
                        {{"id": "B", "x": 200, "y": 0, "width": 60, "height": 40}}
                    ],
                    "links": [{{
                        "from": {{"ref": "A"}},
                        "to": {{"ref": "B", "side": 4, "anchorx": 0.9, "anchory": 0.1}},
                        "route": {route}
                    }}]
                }}]}}"#
            ),
        );
        builder.layout(&mut diagram);
        let routes = builder.route(&mut diagram).unwrap();
        let route_kind = routes[0].routing();

        let points = routes[0].points();
        let n = points.len();
        assert!(n >= 4, "{route_kind:?}: {points:?}");
        let (stub, exit) = (points[n - 3], points[n - 2]);
        assert_approx_eq!(f32, exit.x(), 200.0, epsilon = 0.001);
        assert!(stub.x() < exit.x(), "{route_kind:?}: {points:?}");
        assert_approx_eq!(f32, stub.y(), exit.y(), epsilon = 0.001);
        assert_point(routes[0].visible_end(), exit);
    }
}

#[test]
fn test_curve_routing_is_selected_by_ordinal() {
    let builder = builder();
    let mut diagram = load_first(
        &builder,
        r#"{"diagrams": [{
            "items": [{"id": "A", "x": 0, "y": 0}, {"id": "B", "x": 100, "y": 0}],
            "links": [{"from": {"ref": "A"}, "to": {"ref": "B"}, "route": 2}]
        }]}"#,
    );
    builder.layout(&mut diagram);
    let routes = builder.route(&mut diagram).unwrap();
    assert_eq!(routes[0].routing(), Routing::Curve);
}

#[test]
fn test_layout_is_idempotent() {
    let builder = builder();
    let source = r#"{"diagrams": [{"items": [
        {"x": 5, "y": 5, "hbox": [
            {"text": "left", "margin": [1, 2, 3, 4]},
            {"vbox": [{"text": "a"}, {"text": "bb", "align": 2}], "minWidth": 40},
            {"type": "ellipse", "width": 30, "height": 50}
        ]}
    ]}]}"#;
    let mut diagram = load_first(&builder, source);

    builder.layout(&mut diagram);
    let first: Vec<_> = diagram
        .tree()
        .ids()
        .map(|id| diagram.tree().geometry(id))
        .collect();
    builder.layout(&mut diagram);
    let second: Vec<_> = diagram
        .tree()
        .ids()
        .map(|id| diagram.tree().geometry(id))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_children_fit_in_oversized_container() {
    let builder = builder();
    let mut diagram = load_first(
        &builder,
        r#"{"diagrams": [{"items": [
            {"x": 0, "y": 0, "height": 100, "vbox": [
                {"text": "one", "margin": 2},
                {"text": "two", "margin": 2}
            ]}
        ]}]}"#,
    );
    builder.layout(&mut diagram);

    let tree = diagram.tree();
    let container = diagram.roots()[0];
    let used: f32 = tree
        .children(container)
        .iter()
        .map(|child| tree.geometry(child.item()).size().height() + 4.0)
        .sum();
    assert!(used <= tree.geometry(container).size().height());
}

#[test]
fn test_empty_leaf_is_clamped_to_min_size() {
    let builder = builder();
    let mut diagram = load_first(
        &builder,
        r#"{"diagrams": [{"items": [
            {"x": 0, "y": 0},
            {"x": 50, "y": 0, "minWidth": 30, "minHeight": 5}
        ]}]}"#,
    );
    builder.layout(&mut diagram);

    let tree = diagram.tree();
    let sizes: Vec<_> = diagram
        .roots()
        .iter()
        .map(|&id| tree.geometry(id).size())
        .collect();
    assert!(sizes[0].is_zero());
    assert_approx_eq!(f32, sizes[1].width(), 30.0);
    assert_approx_eq!(f32, sizes[1].height(), 5.0);
}

#[test]
fn test_dangling_link_reference_fails_to_load() {
    let err = builder()
        .load(
            r#"{"diagrams": [{
                "items": [{"id": "A", "x": 0, "y": 0}],
                "links": [{"from": {"ref": "A"}, "to": {"ref": "C"}}]
            }]}"#,
        )
        .unwrap_err();

    match err {
        TrellisError::Load { err, src } => {
            assert_eq!(err.code(), ErrorCode::E201);
            assert!(src.contains("\"C\""));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_render_svg_document() {
    let builder = builder();
    let mut diagram = load_first(
        &builder,
        r##"{"diagrams": [{
            "items": [
                {"id": "A", "x": 0, "y": 0, "style": {"fill": "#eef"}, "vbox": [{"text": "Name"}]},
                {"id": "B", "x": 120, "y": 0, "text": "Other"}
            ],
            "links": [{
                "from": {"ref": "A"},
                "to": {"ref": "B"},
                "style": {"arrowTo": 2},
                "label": {"text": "uses"}
            }]
        }]}"##,
    );

    let svg = builder.render_svg(&mut diagram).unwrap();

    assert!(svg.contains("<svg"), "{svg}");
    for needle in ["Name", "Other", "uses", r#"class="items""#, r#"class="links""#] {
        assert!(svg.contains(needle), "missing {needle} in {svg}");
    }
}
