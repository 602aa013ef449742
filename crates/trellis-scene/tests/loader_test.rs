use float_cmp::assert_approx_eq;

use trellis_core::{
    color::Color,
    geometry::{Insets, Point},
    item::{Align, ItemKind, LayoutDirection, Overflow, TextArrow},
    link::{EndpointRef, Routing, Side},
    style::Paint,
};
use trellis_scene::{ErrorCode, LoadError, load};

#[test]
fn test_scenario_document() {
    let scene = load(
        r#"{
            "diagrams": [{
                "items": [
                    {"id": "A", "x": 0, "y": 0, "vbox": [
                        {"text": "Name"},
                        {"type": "hr", "text": "attrs"}
                    ]},
                    {"id": "B", "x": 200, "y": 0, "text": "Other"}
                ],
                "links": [{"from": {"ref": "A"}, "to": {"ref": "B"}, "route": 1}]
            }]
        }"#,
    )
    .unwrap();

    let diagram = &scene.diagrams()[0];
    assert_eq!(diagram.roots().len(), 2);
    assert_eq!(diagram.links().len(), 1);
    assert_eq!(diagram.tree().len(), 4);

    let tree = diagram.tree();
    let a = diagram.roots()[0];
    assert_eq!(tree[a].kind().type_name(), "rect");
    assert_eq!(tree[a].layout(), LayoutDirection::Vertical);
    let children: Vec<_> = tree.children(a).iter().map(|c| c.item()).collect();
    assert_eq!(tree[children[0]].kind().type_name(), "text");
    assert_eq!(tree[children[1]].kind().type_name(), "hr");

    let link = &diagram.links()[0];
    assert_eq!(link.routing(), Routing::Straight);
    assert_eq!(link.from().target(), EndpointRef::Item(a));
    assert_eq!(link.to().target(), EndpointRef::Item(diagram.roots()[1]));
    assert_eq!(link.from().anchor(), Point::new(0.5, 0.5));
}

#[test]
fn test_type_inference() {
    let scene = load(
        r#"{"diagrams": [{"items": [
            {"text": "t"},
            {"points": [0, 0, 10, 10]},
            {},
            {"type": "ellipse", "width": 30, "height": 20}
        ]}]}"#,
    )
    .unwrap();
    let diagram = &scene.diagrams()[0];
    let kinds: Vec<&str> = diagram
        .roots()
        .iter()
        .map(|id| diagram.tree()[*id].kind().type_name())
        .collect();
    assert_eq!(kinds, vec!["text", "polyline", "rect", "ellipse"]);

    let ellipse = &diagram.tree()[diagram.roots()[3]];
    assert_eq!(ellipse.explicit_size().width(), Some(30.0));
}

#[test]
fn test_vbox_wins_over_hbox() {
    let scene = load(
        r#"{"diagrams": [{"items": [
            {"vbox": [{"text": "v"}], "hbox": [{"text": "h1"}, {"text": "h2"}]}
        ]}]}"#,
    )
    .unwrap();
    let diagram = &scene.diagrams()[0];
    let root = diagram.roots()[0];
    assert_eq!(diagram.tree()[root].layout(), LayoutDirection::Vertical);
    assert_eq!(diagram.tree().children(root).len(), 1);
    // The hbox children are never created.
    assert_eq!(diagram.tree().len(), 2);
}

#[test]
fn test_child_placement_fields() {
    let scene = load(
        r#"{"diagrams": [{"items": [
            {"hbox": [
                {"text": "a", "margin": [1, 2, 3, 4], "align": 2, "float": true, "overflow": 1},
                {"text": "b", "margin": 5}
            ]}
        ]}]}"#,
    )
    .unwrap();
    let diagram = &scene.diagrams()[0];
    let children = diagram.tree().children(diagram.roots()[0]);

    let first = children[0].placement();
    assert_eq!(first.margin(), Insets::new(1.0, 2.0, 3.0, 4.0));
    assert_eq!(first.align(), Align::End);
    assert!(first.is_floating());
    assert_eq!(first.overflow(), Overflow::Hide);

    let second = children[1].placement();
    assert_eq!(second.margin(), Insets::uniform(5.0));
    assert_eq!(second.align(), Align::Start);
    assert_eq!(second.overflow(), Overflow::Prevent);
}

#[test]
fn test_default_props_merged_under_items() {
    let scene = load(
        r#"{
            "styles": [
                {"id": "__default_props_text", "margin": [0, 5, 0, 5], "minWidth": 50},
                {"id": "__default_style_text", "fontName": "arial 10"}
            ],
            "diagrams": [{"items": [
                {"vbox": [{"text": "a"}, {"text": "b", "minWidth": 10}]}
            ]}]
        }"#,
    )
    .unwrap();
    let diagram = &scene.diagrams()[0];
    let tree = diagram.tree();
    let children = tree.children(diagram.roots()[0]);

    assert_eq!(children[0].placement().margin(), Insets::new(0.0, 5.0, 0.0, 5.0));
    assert_approx_eq!(f32, tree[children[0].item()].min_size().width(), 50.0);
    assert_approx_eq!(f32, tree[children[1].item()].min_size().width(), 10.0);
    assert_eq!(tree[children[0].item()].style().font().family(), "arial");
}

#[test]
fn test_styles_shared_between_items() {
    let scene = load(
        r#"{
            "styles": [{"id": "blue", "stroke": "blue"}],
            "diagrams": [{"items": [
                {"style": "blue"},
                {"style": "blue"},
                {"style": {"id": "blue", "lineWidth": 3}}
            ]}]
        }"#,
    )
    .unwrap();
    let diagram = &scene.diagrams()[0];
    let tree = diagram.tree();
    let [a, b, c] = [0, 1, 2].map(|i| tree[diagram.roots()[i]].style().clone());

    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(c.stroke(), Some(&Paint::Solid(Color::new("blue").unwrap())));
    assert_approx_eq!(f32, c.line_width(), 3.0);
}

#[test]
fn test_text_and_polyline_fields() {
    let scene = load(
        r#"{"diagrams": [{"items": [
            {"text": "up", "directed": 1},
            {"points": [0, 0, 5, 0, 0, 5], "close": true, "relative": true},
            {"type": "rect", "radius": 4}
        ]}]}"#,
    )
    .unwrap();
    let diagram = &scene.diagrams()[0];
    let tree = diagram.tree();

    assert_eq!(
        tree[diagram.roots()[0]].kind(),
        &ItemKind::Text {
            text: "up".to_string(),
            directed: TextArrow::Up
        }
    );
    let ItemKind::Polyline {
        points,
        close,
        relative,
    } = tree[diagram.roots()[1]].kind()
    else {
        panic!("expected a polyline");
    };
    assert_eq!(points.len(), 3);
    assert!(*close && *relative);
    assert_eq!(tree[diagram.roots()[2]].kind(), &ItemKind::Rect { radius: 4.0 });
}

#[test]
fn test_link_fields() {
    let scene = load(
        r#"{"diagrams": [{
            "items": [{"id": "a"}, {"id": "b"}],
            "links": [
                {
                    "id": "l1",
                    "from": {"ref": "a", "anchorx": 1, "anchory": 0, "side": 2, "label": {"text": "src"}},
                    "to": {"ref": "b", "side": 4},
                    "label": {"text": "middle"},
                    "route": 0,
                    "waypoints": {"points": [10, 0, 0, 10], "relative": true}
                },
                {"from": {"ref": "l1"}, "to": {"ref": "b"}, "route": 2, "waypoints": [5, 5]}
            ]
        }]}"#,
    )
    .unwrap();
    let diagram = &scene.diagrams()[0];
    let first = &diagram.links()[0];
    assert_eq!(first.routing(), Routing::Orthogonal);
    assert_eq!(first.from().anchor(), Point::new(1.0, 0.0));
    assert_eq!(first.from().side(), Side::Right);
    assert_eq!(first.to().side(), Side::Left);
    assert!(first.from().label().is_some());
    assert!(first.label().is_some());
    assert!(first.waypoints().is_relative());
    assert_eq!(first.waypoints().points().len(), 2);

    let second = &diagram.links()[1];
    assert!(matches!(second.from().target(), EndpointRef::Link(id) if id.index() == 0));
    assert_eq!(second.routing(), Routing::Curve);
    assert!(!second.waypoints().is_relative());

    // Labels are items of the tree but not roots.
    assert_eq!(diagram.roots().len(), 2);
    assert_eq!(diagram.label_items().count(), 2);
}

#[test]
fn test_unknown_fields_ignored() {
    let scene = load(
        r#"{"version": 3, "diagrams": [{"items": [{"text": "a", "shadow": {"x": 1}}], "extra": []}]}"#,
    );
    assert!(scene.is_ok());
}

#[test]
fn test_syntax_error() {
    let err = load("{\"diagrams\": [}").unwrap_err();
    assert_eq!(err.code(), ErrorCode::E100);
    assert!(err.location().is_some());
}

#[test]
fn test_missing_ref_is_fatal() {
    let err = load(
        r#"{"diagrams": [{"items": [{"id": "a"}], "links": [{"from": {"ref": "a"}, "to": {}}]}]}"#,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E102);
    assert_eq!(err.path(), "diagrams[0].links[0].to.ref");
}

#[test]
fn test_dangling_reference() {
    let err = load(
        r#"{"diagrams": [{"items": [{"id": "a"}], "links": [{"from": {"ref": "a"}, "to": {"ref": "zzz"}}]}]}"#,
    )
    .unwrap_err();
    assert_eq!(
        err,
        LoadError::DanglingReference {
            id: "zzz".to_string(),
            path: "diagrams[0].links[0].to.ref".to_string(),
        }
    );
}

#[test]
fn test_link_cannot_refer_to_later_link() {
    let err = load(
        r#"{"diagrams": [{"items": [{"id": "a"}], "links": [
            {"from": {"ref": "a"}, "to": {"ref": "later"}},
            {"id": "later", "from": {"ref": "a"}, "to": {"ref": "a"}}
        ]}]}"#,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::E201);
}

#[test]
fn test_unknown_style() {
    let err = load(r#"{"diagrams": [{"items": [{"vbox": [{"style": "nope"}]}]}]}"#).unwrap_err();
    assert_eq!(
        err,
        LoadError::UnknownStyleId {
            id: "nope".to_string(),
            path: "diagrams[0].items[0].vbox[0].style".to_string(),
        }
    );
}

#[test]
fn test_schema_violations() {
    let cases = [
        (r#"[]"#, ErrorCode::E101),
        (r#"{"diagrams": {}}"#, ErrorCode::E101),
        (r#"{"diagrams": [{"items": [{"x": "left"}]}]}"#, ErrorCode::E101),
        (r#"{"diagrams": [{"items": [{"type": "star"}]}]}"#, ErrorCode::E103),
        (r#"{"diagrams": [{"items": [{"points": [1, 2, 3]}]}]}"#, ErrorCode::E103),
        (r#"{"diagrams": [{"items": [{"hbox": [{"align": 7}]}]}]}"#, ErrorCode::E103),
        (r#"{"diagrams": [{"items": [{"id": "a"}, {"id": "a"}]}]}"#, ErrorCode::E104),
        (r#"{"diagrams": [{"items": [{"style": 3}]}]}"#, ErrorCode::E101),
    ];
    for (source, code) in cases {
        let err = load(source).unwrap_err();
        assert_eq!(err.code(), code, "unexpected error for {source}: {err}");
    }
}

#[test]
fn test_error_aborts_whole_load() {
    // The first diagram is fine, the second is not: nothing is returned.
    let result = load(
        r#"{"diagrams": [
            {"items": [{"text": "fine"}]},
            {"items": [{"style": "missing"}]}
        ]}"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_empty_style_name_fails_in_any_order() {
    let default_first = load(
        r#"{"diagrams": [{"items": [{"x": 0, "y": 0}, {"x": 0, "y": 0, "style": ""}]}]}"#,
    );
    let empty_first = load(
        r#"{"diagrams": [{"items": [{"x": 0, "y": 0, "style": ""}, {"x": 0, "y": 0}]}]}"#,
    );
    assert_eq!(default_first.unwrap_err().code(), ErrorCode::E200);
    assert_eq!(empty_first.unwrap_err().code(), ErrorCode::E200);
}

#[test]
fn test_equivalent_documents_resolve_equal_styles() {
    let named = load(
        r##"{
            "styles": [
                {"id": "__default_style_rect", "lineWidth": 2},
                {"id": "accent", "stroke": "red", "fill": "#ffeecc", "dashes": [4, 2]}
            ],
            "diagrams": [{"items": [
                {"id": "plain"},
                {"id": "styled", "style": "accent"},
                {"id": "label", "text": "hi", "style": {"fontName": "serif bold 11"}}
            ]}]
        }"##,
    )
    .unwrap();
    let inline = load(
        r##"{
            "styles": [{"id": "__default_style_rect", "lineWidth": 2}],
            "diagrams": [{"items": [
                {"id": "label", "text": "hi", "style": {"fontName": "serif bold 11"}},
                {"id": "styled", "style": {"stroke": "red", "fill": "#ffeecc", "dashes": [4, 2]}},
                {"id": "plain"}
            ]}]
        }"##,
    )
    .unwrap();

    let styles = |scene: &trellis_scene::Scene, order: [usize; 3]| {
        let diagram = &scene.diagrams()[0];
        order.map(|i| diagram.tree()[diagram.roots()[i]].style().as_ref().clone())
    };
    let [plain, styled, label] = styles(&named, [0, 1, 2]);
    let [plain_inline, styled_inline, label_inline] = styles(&inline, [2, 1, 0]);

    assert_eq!(plain, plain_inline);
    assert_eq!(styled, styled_inline);
    assert_eq!(label, label_inline);
    assert_approx_eq!(f32, styled.line_width(), 2.0);
    assert_ne!(plain, styled);
}

#[test]
fn test_empty_styles_object() {
    let scene = load(r#"{"styles": {}, "diagrams": [{"items": [{"x": 0, "y": 0}]}]}"#).unwrap();
    assert!(scene.styles().ids().next().is_none());
    assert_eq!(scene.diagrams()[0].roots().len(), 1);

    let err = load(r#"{"styles": {"id": "a"}, "diagrams": []}"#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E101);
}
