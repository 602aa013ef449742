//! Endpoint resolution: where a link attaches and where it leaves.

use trellis_core::{
    diagram::Diagram,
    geometry::{Bounds, Point, Size},
    item::ItemKind,
    link::{EndpointRef, LinkEnd, Routing, Side},
};

use super::{RouteError, path::Shape};

const EPSILON: f32 = 1e-4;

/// Identity of an endpoint, used to group parallel links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) enum EndpointKey {
    Item(usize),
    Link(usize),
}

/// A link endpoint resolved against the laid-out diagram.
#[derive(Debug, Clone, Copy)]
pub(super) struct Endpoint {
    key: EndpointKey,
    attach: Point,
    bounds: Bounds,
    shape: Option<Shape>,
    container: Bounds,
    side: Side,
}

impl Endpoint {
    /// Resolves `end` of the link numbered `link`. `midpoints` holds the
    /// visible midpoints of the links routed so far.
    pub(super) fn resolve(
        diagram: &Diagram,
        end: &LinkEnd,
        link: usize,
        midpoints: &[Point],
    ) -> Result<Self, RouteError> {
        let tree = diagram.tree();
        match end.target() {
            EndpointRef::Item(item) => {
                if !tree.contains(item) {
                    return Err(RouteError::DanglingReference {
                        link,
                        target: end.target(),
                    });
                }
                let bounds = tree.visible_bounds(item);
                let anchor = end.anchor();
                let shape = match tree[item].kind() {
                    ItemKind::Ellipse => Shape::Ellipse(bounds),
                    _ => Shape::Rect(bounds),
                };
                Ok(Self {
                    key: EndpointKey::Item(item.index()),
                    attach: bounds.fraction_point(anchor.x(), anchor.y()),
                    bounds,
                    shape: Some(shape),
                    container: tree.visible_bounds(tree.top_ancestor(item)),
                    side: end.side(),
                })
            }
            EndpointRef::Link(other) => {
                let Some(midpoint) = midpoints.get(other.index()).copied() else {
                    return Err(RouteError::DanglingReference {
                        link,
                        target: end.target(),
                    });
                };
                let bounds = Bounds::new_from_top_left(midpoint, Size::default());
                Ok(Self {
                    key: EndpointKey::Link(other.index()),
                    attach: midpoint,
                    bounds,
                    shape: None,
                    container: bounds,
                    side: end.side(),
                })
            }
        }
    }

    pub(super) fn key(&self) -> EndpointKey {
        self.key
    }

    pub(super) fn attach(&self) -> Point {
        self.attach
    }

    /// Visible bounds of the endpoint.
    pub(super) fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub(super) fn side(&self) -> Side {
        self.side
    }

    /// Shape the visible path is clipped against, if any.
    pub(super) fn clip_shape(&self) -> Option<&Shape> {
        match self.side {
            Side::Auto => self.shape.as_ref(),
            _ => None,
        }
    }

    /// Bounds of the endpoint's top-level container.
    pub(super) fn container(&self) -> Bounds {
        self.container
    }

    /// Point on the forced side where the link leaves, heading toward
    /// `toward`. `None` when the side is not forced.
    pub(super) fn side_exit(&self, toward: Point, routing: Routing) -> Option<Point> {
        if !self.side.is_forced() {
            return None;
        }
        let projected = self.project();
        let exit = match routing {
            Routing::Orthogonal | Routing::OrthoCurve => projected,
            Routing::Straight | Routing::Curve => self.intersect(toward).unwrap_or(projected),
        };
        Some(exit)
    }

    /// Point `stub` units outside the forced side, level with `exit`.
    pub(super) fn stub(&self, exit: Point, stub: f32) -> Point {
        exit.add_point(self.side.normal().scale(stub))
    }

    /// Orthogonal projection of the attachment point on the forced side,
    /// clamped to the side's span.
    fn project(&self) -> Point {
        let bounds = self.container;
        let x = self.attach.x().clamp(bounds.min_x(), bounds.max_x());
        let y = self.attach.y().clamp(bounds.min_y(), bounds.max_y());
        match self.side {
            Side::Top => Point::new(x, bounds.min_y()),
            Side::Bottom => Point::new(x, bounds.max_y()),
            Side::Left => Point::new(bounds.min_x(), y),
            Side::Right => Point::new(bounds.max_x(), y),
            Side::Auto | Side::NoClip => self.attach,
        }
    }

    /// Where the line from the attachment point to `toward` crosses the
    /// forced side, if it does so within the side's span.
    fn intersect(&self, toward: Point) -> Option<Point> {
        let bounds = self.container;
        let a = self.attach;
        let delta = toward.sub_point(a);
        match self.side {
            Side::Left | Side::Right => {
                if delta.x().abs() < EPSILON {
                    return None;
                }
                let x = if self.side == Side::Left {
                    bounds.min_x()
                } else {
                    bounds.max_x()
                };
                let y = a.y() + (x - a.x()) / delta.x() * delta.y();
                (bounds.min_y()..=bounds.max_y())
                    .contains(&y)
                    .then(|| Point::new(x, y))
            }
            Side::Top | Side::Bottom => {
                if delta.y().abs() < EPSILON {
                    return None;
                }
                let y = if self.side == Side::Top {
                    bounds.min_y()
                } else {
                    bounds.max_y()
                };
                let x = a.x() + (y - a.y()) / delta.y() * delta.x();
                (bounds.min_x()..=bounds.max_x())
                    .contains(&x)
                    .then(|| Point::new(x, y))
            }
            Side::Auto | Side::NoClip => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::{
        item::{Item, Placement},
        link::LinkEnd,
        style::Style,
        tree::ItemGeometry,
    };

    use super::*;

    /// A diagram with a 100x50 root at (0, 0) holding a 20x10 child at
    /// (10, 20).
    fn nested() -> (Diagram, trellis_core::tree::ItemId) {
        let mut diagram = Diagram::new();
        let root = diagram.add_root(Item::rect(Style::shared_default()));
        let child = diagram.tree_mut().insert(Item::rect(Style::shared_default()));
        diagram
            .tree_mut()
            .add_child(root, child, Placement::new())
            .unwrap();
        diagram.tree_mut().commit_geometry(vec![
            ItemGeometry::new(Point::default(), Size::new(100.0, 50.0)),
            ItemGeometry::new(Point::new(10.0, 20.0), Size::new(20.0, 10.0)),
        ]);
        (diagram, child)
    }

    #[test]
    fn test_attachment_uses_anchor_fractions() {
        let (diagram, child) = nested();
        let end = LinkEnd::item(child).with_anchor(1.0, 0.0);
        let endpoint = Endpoint::resolve(&diagram, &end, 0, &[]).unwrap();
        assert_eq!(endpoint.attach(), Point::new(30.0, 20.0));
    }

    #[test]
    fn test_forced_side_projects_on_container() {
        let (diagram, child) = nested();
        let end = LinkEnd::item(child).with_side(Side::Left);
        let endpoint = Endpoint::resolve(&diagram, &end, 0, &[]).unwrap();

        let exit = endpoint
            .side_exit(Point::new(500.0, 500.0), Routing::Orthogonal)
            .unwrap();
        assert_eq!(exit, Point::new(0.0, 25.0));
        assert_eq!(endpoint.stub(exit, 10.0), Point::new(-10.0, 25.0));
    }

    #[test]
    fn test_forced_side_intersects_for_straight_links() {
        let (diagram, child) = nested();
        let end = LinkEnd::item(child).with_side(Side::Top);
        let endpoint = Endpoint::resolve(&diagram, &end, 0, &[]).unwrap();

        // Center (20, 25) toward (20 + 50, 25 - 50): crosses y = 0 at x = 45.
        let exit = endpoint
            .side_exit(Point::new(70.0, -25.0), Routing::Straight)
            .unwrap();
        assert!(exit.approx_eq(Point::new(45.0, 0.0), 0.001));

        // A line that never reaches the top side falls back to projection.
        let exit = endpoint
            .side_exit(Point::new(500.0, 25.0), Routing::Straight)
            .unwrap();
        assert_eq!(exit, Point::new(20.0, 0.0));
    }

    #[test]
    fn test_auto_side_has_no_exit() {
        let (diagram, child) = nested();
        let endpoint = Endpoint::resolve(&diagram, &LinkEnd::item(child), 0, &[]).unwrap();
        assert_eq!(endpoint.side_exit(Point::default(), Routing::Straight), None);
        assert!(endpoint.clip_shape().is_some());
    }

    #[test]
    fn test_unknown_link_is_dangling() {
        let (diagram, _) = nested();
        let end = LinkEnd::new(EndpointRef::Link(trellis_core::link::LinkId::new(3)));
        let result = Endpoint::resolve(&diagram, &end, 1, &[Point::default()]);
        assert!(matches!(
            result,
            Err(RouteError::DanglingReference { link: 1, .. })
        ));
    }
}
