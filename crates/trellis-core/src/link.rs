//! Links between items.
//!
//! A [`Link`] connects two endpoints. An endpoint is usually an item of the
//! tree, but may also be another link defined earlier in the diagram, in
//! which case the link attaches to the middle of that link's path.

use std::sync::Arc;

use crate::{geometry::Point, identifier::Id, style::Style, tree::ItemId};

ordinal_enum! {
    /// How the path of a link is computed.
    pub enum Routing {
        /// Only horizontal and vertical segments.
        Orthogonal = 0,
        /// Straight segments between the endpoints and waypoints.
        #[default]
        Straight = 1,
        /// A smooth arc bowed away from parallel links.
        Curve = 2,
        /// Orthogonal segments joined by rounded corners.
        OrthoCurve = 3,
    }
}

ordinal_enum! {
    /// The side of an endpoint a link is forced to leave or enter from.
    pub enum Side {
        /// Leave from whatever point of the boundary lies on the path.
        #[default]
        Auto = 0,
        Top = 1,
        Right = 2,
        Bottom = 3,
        Left = 4,
        /// Draw the path all the way to the attachment point.
        NoClip = 5,
    }
}

impl Side {
    /// Whether this side forces the link through a specific edge.
    pub fn is_forced(self) -> bool {
        matches!(self, Self::Top | Self::Right | Self::Bottom | Self::Left)
    }

    /// Outward unit normal of the side, zero when the side is not forced.
    pub fn normal(self) -> Point {
        match self {
            Self::Top => Point::new(0.0, -1.0),
            Self::Right => Point::new(1.0, 0.0),
            Self::Bottom => Point::new(0.0, 1.0),
            Self::Left => Point::new(-1.0, 0.0),
            Self::Auto | Self::NoClip => Point::default(),
        }
    }
}

/// Handle to a link within a diagram. Links are numbered in definition
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(usize);

impl LinkId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// What a link endpoint is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRef {
    Item(ItemId),
    Link(LinkId),
}

/// One end of a link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEnd {
    target: EndpointRef,
    anchor: Point,
    side: Side,
    label: Option<ItemId>,
}

impl LinkEnd {
    /// Creates an endpoint attached to the center of `target`.
    pub fn new(target: EndpointRef) -> Self {
        Self {
            target,
            anchor: Point::new(0.5, 0.5),
            side: Side::Auto,
            label: None,
        }
    }

    /// Shorthand for an endpoint attached to an item.
    pub fn item(item: ItemId) -> Self {
        Self::new(EndpointRef::Item(item))
    }

    /// Sets the attachment fractions, clamped to `0.0..=1.0`.
    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor = Point::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0));
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_label(mut self, label: ItemId) -> Self {
        self.label = Some(label);
        self
    }

    pub fn target(&self) -> EndpointRef {
        self.target
    }

    /// Attachment point as fractions of the endpoint's width and height.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn label(&self) -> Option<ItemId> {
        self.label
    }
}

/// Intermediate points a link must go through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waypoints {
    points: Vec<Point>,
    relative: bool,
}

impl Waypoints {
    /// Waypoints given in absolute diagram coordinates.
    pub fn absolute(points: Vec<Point>) -> Self {
        Self {
            points,
            relative: false,
        }
    }

    /// Waypoints given as offsets, each from the previous resolved point;
    /// the first one is offset from the origin's attachment point.
    pub fn relative(points: Vec<Point>) -> Self {
        Self {
            points,
            relative: true,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Resolves the waypoints to absolute coordinates.
    pub fn resolve(&self, origin: Point) -> Vec<Point> {
        if !self.relative {
            return self.points.clone();
        }
        let mut current = origin;
        self.points
            .iter()
            .map(|offset| {
                current = current.add_point(*offset);
                current
            })
            .collect()
    }
}

/// A connection between two endpoints.
#[derive(Debug, Clone)]
pub struct Link {
    id: Option<Id>,
    from: LinkEnd,
    to: LinkEnd,
    style: Arc<Style>,
    routing: Routing,
    label: Option<ItemId>,
    waypoints: Waypoints,
}

impl Link {
    pub fn new(from: LinkEnd, to: LinkEnd, style: Arc<Style>) -> Self {
        Self {
            id: None,
            from,
            to,
            style,
            routing: Routing::default(),
            label: None,
            waypoints: Waypoints::default(),
        }
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_routing(mut self, routing: Routing) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_label(mut self, label: ItemId) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_waypoints(mut self, waypoints: Waypoints) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn id(&self) -> Option<Id> {
        self.id
    }

    pub fn from(&self) -> &LinkEnd {
        &self.from
    }

    pub fn to(&self) -> &LinkEnd {
        &self.to
    }

    pub fn style(&self) -> &Arc<Style> {
        &self.style
    }

    pub fn routing(&self) -> Routing {
        self.routing
    }

    /// Label displayed in the middle of the link.
    pub fn label(&self) -> Option<ItemId> {
        self.label
    }

    pub fn waypoints(&self) -> &Waypoints {
        &self.waypoints
    }

    /// Every label item of this link: overall, from and to.
    pub fn labels(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.label
            .into_iter()
            .chain(self.from.label)
            .chain(self.to.label)
    }
}
