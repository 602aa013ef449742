//! Box layout.
//!
//! [`LayoutEngine`] assigns a position and a size to every item of a
//! diagram in two passes:
//!
//! 1. **Natural sizes** (bottom-up): each item's size is computed from its
//!    own content (text metrics, polyline points) and from the stack of its
//!    non-floating children, then overridden by any explicit size and floored
//!    by the minimum size.
//! 2. **Placement** (top-down): children are stacked along their parent's
//!    layout axis, stretched or aligned across it, and clipped when their
//!    overflow policy hides what does not fit.
//!
//! Both passes work on a scratch copy of the geometry which is committed to
//! the tree at the end, so a layout is never partially applied. Running the
//! layout twice on the same tree gives the same result.

mod natural;
mod place;

use log::{info, warn};

use trellis_core::{
    diagram::Diagram,
    geometry::{Insets, Point, Size},
    item::{ExplicitSize, ItemKind, LayoutDirection},
    metrics::TextMetrics,
    style::Style,
    tree::{ItemGeometry, ItemId, ItemTree},
};

/// Minimal length of the rule drawn on each side of an hr item's text.
pub(crate) const HR_STUB: f32 = 8.0;
/// Space between a text and its direction arrow.
pub(crate) const TEXT_ARROW_GAP: f32 = 2.0;

/// Size of the direction arrow drawn next to a directed text.
pub(crate) fn text_arrow_size(style: &Style) -> f32 {
    style.font().pixel_size() * 0.6
}

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub(crate) fn of(direction: LayoutDirection) -> Self {
        match direction {
            LayoutDirection::Horizontal => Self::Horizontal,
            LayoutDirection::Vertical => Self::Vertical,
        }
    }

    /// The extent of `size` along this axis.
    pub(crate) fn along(self, size: Size) -> f32 {
        match self {
            Self::Horizontal => size.width(),
            Self::Vertical => size.height(),
        }
    }

    /// The extent of `size` across this axis.
    pub(crate) fn across(self, size: Size) -> f32 {
        match self {
            Self::Horizontal => size.height(),
            Self::Vertical => size.width(),
        }
    }

    pub(crate) fn size(self, along: f32, across: f32) -> Size {
        match self {
            Self::Horizontal => Size::new(along, across),
            Self::Vertical => Size::new(across, along),
        }
    }

    pub(crate) fn point(self, along: f32, across: f32) -> Point {
        match self {
            Self::Horizontal => Point::new(along, across),
            Self::Vertical => Point::new(across, along),
        }
    }

    pub(crate) fn point_along(self, point: Point) -> f32 {
        match self {
            Self::Horizontal => point.x(),
            Self::Vertical => point.y(),
        }
    }

    pub(crate) fn point_across(self, point: Point) -> f32 {
        match self {
            Self::Horizontal => point.y(),
            Self::Vertical => point.x(),
        }
    }

    /// Leading inset along the axis.
    pub(crate) fn start(self, insets: Insets) -> f32 {
        match self {
            Self::Horizontal => insets.left(),
            Self::Vertical => insets.top(),
        }
    }

    /// Trailing inset along the axis.
    pub(crate) fn end(self, insets: Insets) -> f32 {
        match self {
            Self::Horizontal => insets.right(),
            Self::Vertical => insets.bottom(),
        }
    }

    /// Leading inset across the axis.
    pub(crate) fn cross_start(self, insets: Insets) -> f32 {
        match self {
            Self::Horizontal => insets.top(),
            Self::Vertical => insets.left(),
        }
    }

    pub(crate) fn sum_along(self, insets: Insets) -> f32 {
        match self {
            Self::Horizontal => insets.horizontal_sum(),
            Self::Vertical => insets.vertical_sum(),
        }
    }

    pub(crate) fn sum_across(self, insets: Insets) -> f32 {
        match self {
            Self::Horizontal => insets.vertical_sum(),
            Self::Vertical => insets.horizontal_sum(),
        }
    }

    pub(crate) fn explicit_along(self, explicit: ExplicitSize) -> Option<f32> {
        match self {
            Self::Horizontal => explicit.width(),
            Self::Vertical => explicit.height(),
        }
    }

    pub(crate) fn explicit_across(self, explicit: ExplicitSize) -> Option<f32> {
        match self {
            Self::Horizontal => explicit.height(),
            Self::Vertical => explicit.width(),
        }
    }

    pub(crate) fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// A non-fatal problem found while laying out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryIssue {
    /// The explicit size of `item` leaves no room for its padding and its
    /// children's margins along `axis`. Children were laid out with zero
    /// available extent on that axis.
    InvalidGeometry { item: ItemId, axis: Axis, deficit: f32 },
}

/// Outcome of a layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutReport {
    issues: Vec<GeometryIssue>,
}

impl LayoutReport {
    pub fn issues(&self) -> &[GeometryIssue] {
        &self.issues
    }

    /// Returns true when no issue was found.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Computes item geometry.
pub struct LayoutEngine<'m> {
    metrics: &'m dyn TextMetrics,
}

impl<'m> LayoutEngine<'m> {
    pub fn new(metrics: &'m dyn TextMetrics) -> Self {
        Self { metrics }
    }

    /// Lays out every top-level item and every link label of `diagram`.
    ///
    /// Labels are laid out at the origin; the link router moves them next to
    /// their link afterwards.
    pub fn layout(&self, diagram: &mut Diagram) -> LayoutReport {
        let mut tops: Vec<(ItemId, bool)> = diagram.roots().iter().map(|id| (*id, true)).collect();
        tops.extend(
            diagram
                .label_items()
                .filter(|id| diagram.tree().contains(*id))
                .map(|id| (id, false)),
        );

        let mut pass = Pass::new(diagram.tree(), self.metrics);
        for (top, _) in &tops {
            pass.measure(*top);
        }
        for (top, is_root) in &tops {
            let item = &diagram.tree()[*top];
            let position = match item.position() {
                Some(position) => position,
                None if *is_root => {
                    warn!(item = top.index(); "Top-level item has no position, placing it at the origin");
                    Point::default()
                }
                None => Point::default(),
            };
            let size = pass.natural_size(*top);
            pass.place(*top, position, size, None);
        }

        let (geometry, issues) = pass.finish();
        for issue in &issues {
            let GeometryIssue::InvalidGeometry {
                item,
                axis,
                deficit,
            } = issue;
            warn!(item = item.index(), axis:? = axis, deficit = deficit; "Explicit size leaves no room for children");
        }
        diagram.tree_mut().commit_geometry(geometry);

        info!(items = diagram.tree().len(), issues = issues.len(); "Layout computed");
        LayoutReport { issues }
    }
}

/// Scratch state of one layout run.
struct Pass<'t> {
    tree: &'t ItemTree,
    metrics: &'t dyn TextMetrics,
    natural: Vec<Size>,
    geometry: Vec<ItemGeometry>,
    issues: Vec<GeometryIssue>,
}

impl<'t> Pass<'t> {
    fn new(tree: &'t ItemTree, metrics: &'t dyn TextMetrics) -> Self {
        Self {
            tree,
            metrics,
            natural: vec![Size::default(); tree.len()],
            geometry: tree.ids().map(|id| tree.geometry(id)).collect(),
            issues: Vec::new(),
        }
    }

    fn natural_size(&self, id: ItemId) -> Size {
        self.natural[id.index()]
    }

    fn report(&mut self, item: ItemId, axis: Axis, deficit: f32) {
        let known = self.issues.iter().any(|issue| {
            matches!(issue, GeometryIssue::InvalidGeometry { item: i, axis: a, .. } if *i == item && *a == axis)
        });
        if !known {
            self.issues.push(GeometryIssue::InvalidGeometry {
                item,
                axis,
                deficit,
            });
        }
    }

    fn finish(self) -> (Vec<ItemGeometry>, Vec<GeometryIssue>) {
        (self.geometry, self.issues)
    }
}

/// Whether `kind` keeps its own size across its parent's axis instead of
/// stretching.
fn keeps_cross_size(kind: &ItemKind) -> bool {
    matches!(kind, ItemKind::Polyline { .. })
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use trellis_core::{
        item::{Align, Item, Overflow, Placement},
        metrics::FixedMetrics,
    };

    use super::*;

    fn rect_with_size(width: f32, height: f32) -> Item {
        Item::rect(Style::shared_default()).with_explicit_size(ExplicitSize::new(width, height))
    }

    fn add(diagram: &mut Diagram, parent: ItemId, item: Item, placement: Placement) -> ItemId {
        let id = diagram.tree_mut().insert(item);
        diagram.tree_mut().add_child(parent, id, placement).unwrap();
        id
    }

    #[test]
    fn test_vertical_children_are_stacked_and_stretched() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(
            Item::rect(Style::shared_default()).with_position(Point::new(10.0, 20.0)),
        );
        let title = add(
            &mut diagram,
            root,
            Item::text(Style::shared_default(), "Name"),
            Placement::new(),
        );
        let rule = add(
            &mut diagram,
            root,
            Item::new(
                ItemKind::Hr {
                    text: "attributes".to_string(),
                },
                Style::shared_default(),
            ),
            Placement::new(),
        );

        let report = LayoutEngine::new(&metrics).layout(&mut diagram);
        assert!(report.is_clean());

        let tree = diagram.tree();
        let root_geometry = tree.geometry(root);
        let title_geometry = tree.geometry(title);
        let rule_geometry = tree.geometry(rule);

        assert_eq!(root_geometry.position(), Point::new(10.0, 20.0));
        assert_approx_eq!(
            f32,
            root_geometry.size().height(),
            title_geometry.size().height() + rule_geometry.size().height()
        );
        assert_approx_eq!(f32, title_geometry.position().y(), 0.0);
        assert_approx_eq!(
            f32,
            rule_geometry.position().y(),
            title_geometry.size().height()
        );
        // The hr is the widest child, the title is stretched to match it.
        assert_approx_eq!(f32, title_geometry.size().width(), root_geometry.size().width());
        assert_approx_eq!(f32, rule_geometry.size().width(), root_geometry.size().width());
    }

    #[test]
    fn test_floating_child_does_not_advance() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(Item::rect(Style::shared_default()).with_position(Point::default()));
        let floating = add(
            &mut diagram,
            root,
            rect_with_size(40.0, 40.0),
            Placement::new().with_floating(true),
        );
        let next = add(
            &mut diagram,
            root,
            rect_with_size(10.0, 10.0),
            Placement::new().with_margin(Insets::new(3.0, 0.0, 0.0, 0.0)),
        );

        LayoutEngine::new(&metrics).layout(&mut diagram);

        let tree = diagram.tree();
        assert_eq!(tree.geometry(floating).position(), Point::new(0.0, 0.0));
        assert_approx_eq!(f32, tree.geometry(next).position().y(), 3.0);
        assert_eq!(tree.geometry(root).size(), Size::new(10.0, 13.0));
    }

    #[test]
    fn test_explicit_child_position_is_kept() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(Item::rect(Style::shared_default()).with_position(Point::default()));
        let pinned = add(
            &mut diagram,
            root,
            rect_with_size(5.0, 5.0).with_position(Point::new(7.0, 9.0)),
            Placement::new(),
        );
        let flowing = add(&mut diagram, root, rect_with_size(10.0, 10.0), Placement::new());

        LayoutEngine::new(&metrics).layout(&mut diagram);

        let tree = diagram.tree();
        assert_eq!(tree.geometry(pinned).position(), Point::new(7.0, 9.0));
        assert_eq!(tree.geometry(flowing).position(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_cross_axis_alignment() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(rect_with_size(100.0, -1.0).with_position(Point::default()));
        let start = add(&mut diagram, root, rect_with_size(20.0, 10.0), Placement::new());
        let middle = add(
            &mut diagram,
            root,
            rect_with_size(20.0, 10.0),
            Placement::new().with_align(Align::Middle),
        );
        let end = add(
            &mut diagram,
            root,
            rect_with_size(20.0, 10.0),
            Placement::new()
                .with_align(Align::End)
                .with_margin(Insets::new(0.0, 5.0, 0.0, 0.0)),
        );

        LayoutEngine::new(&metrics).layout(&mut diagram);

        let tree = diagram.tree();
        assert_approx_eq!(f32, tree.geometry(start).position().x(), 0.0);
        assert_approx_eq!(f32, tree.geometry(middle).position().x(), 40.0);
        assert_approx_eq!(f32, tree.geometry(end).position().x(), 75.0);
        assert_approx_eq!(f32, tree.geometry(end).position().y(), 20.0);
    }

    #[test]
    fn test_extra_space_uses_own_alignment() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(Item::rect(Style::shared_default()).with_position(Point::default()));
        let container = add(
            &mut diagram,
            root,
            rect_with_size(20.0, 100.0),
            Placement::new().with_align(Align::End),
        );
        let child = add(&mut diagram, container, rect_with_size(20.0, 30.0), Placement::new());

        LayoutEngine::new(&metrics).layout(&mut diagram);

        assert_approx_eq!(f32, diagram.tree().geometry(child).position().y(), 70.0);
    }

    #[test]
    fn test_hidden_overflow_is_clipped() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(rect_with_size(20.0, 30.0).with_position(Point::default()));
        let first = add(&mut diagram, root, rect_with_size(20.0, 20.0), Placement::new());
        let second = add(
            &mut diagram,
            root,
            rect_with_size(20.0, 20.0),
            Placement::new().with_overflow(Overflow::Hide),
        );

        LayoutEngine::new(&metrics).layout(&mut diagram);

        let tree = diagram.tree();
        assert_eq!(tree.geometry(first).clip(), None);
        assert_eq!(tree.geometry(second).clip(), Some(Size::new(20.0, 10.0)));
        assert_eq!(tree.geometry(second).visible_size(), Size::new(20.0, 10.0));
    }

    #[test]
    fn test_invalid_geometry_is_reported_once() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(rect_with_size(4.0, -1.0).with_position(Point::default()));
        for _ in 0..2 {
            add(
                &mut diagram,
                root,
                rect_with_size(-1.0, 10.0),
                Placement::new().with_margin(Insets::new(0.0, 5.0, 0.0, 5.0)),
            );
        }

        let report = LayoutEngine::new(&metrics).layout(&mut diagram);

        assert_eq!(
            report.issues(),
            &[GeometryIssue::InvalidGeometry {
                item: root,
                axis: Axis::Horizontal,
                deficit: 6.0,
            }]
        );
        for child in diagram.tree().children(root) {
            assert_approx_eq!(f32, diagram.tree().geometry(child.item()).size().width(), 0.0);
        }
    }

    #[test]
    fn test_root_without_position_at_origin() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(rect_with_size(10.0, 10.0));

        LayoutEngine::new(&metrics).layout(&mut diagram);

        assert_eq!(diagram.tree().geometry(root).position(), Point::default());
    }

    #[test]
    fn test_layout_is_idempotent() {
        let metrics = FixedMetrics::default();
        let mut diagram = Diagram::new();
        let root = diagram.add_root(
            Item::rect(Style::shared_default())
                .with_position(Point::new(5.0, 5.0))
                .with_layout(LayoutDirection::Horizontal),
        );
        add(&mut diagram, root, Item::text(Style::shared_default(), "left"), Placement::new());
        add(
            &mut diagram,
            root,
            Item::text(Style::shared_default(), "right\nside"),
            Placement::new().with_align(Align::Middle),
        );

        let engine = LayoutEngine::new(&metrics);
        engine.layout(&mut diagram);
        let first: Vec<ItemGeometry> = diagram.tree().ids().map(|id| diagram.tree().geometry(id)).collect();
        engine.layout(&mut diagram);
        let second: Vec<ItemGeometry> = diagram.tree().ids().map(|id| diagram.tree().geometry(id)).collect();

        assert_eq!(first, second);
    }
}
