//! Link routing.
//!
//! [`LinkRouter`] turns the links of a laid-out diagram into concrete
//! paths. Each link produces a [`LinkRoute`] holding:
//!
//! - the route vertices, from the origin's attachment point to the target's
//!   attachment point, including forced-side stubs, orthogonal corners and
//!   waypoints;
//! - the visible track, clipped where the link meets its endpoints and
//!   smoothed for the curved routing modes;
//! - the placement of the link's labels.
//!
//! Links are routed in definition order so that a link may attach to the
//! middle of any link defined before it.

mod anchor;
mod labels;
pub(crate) mod path;

use std::collections::HashMap;

use log::{debug, info, trace};
use thiserror::Error;

use trellis_core::{
    diagram::Diagram,
    draw::Path,
    geometry::Point,
    link::{EndpointRef, Link, LinkId, Routing, Side},
    tree::{ItemGeometry, ItemId},
};

pub use labels::{LabelKind, LabelPlacement};

use anchor::{Endpoint, EndpointKey};
use path::{Lead, Segment, Track};

/// Errors raised while routing links.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// An endpoint refers to an item missing from the diagram, or to a link
    /// that is not defined before the referencing link.
    #[error("link {link} references {target:?}, which is not part of the diagram")]
    DanglingReference { link: usize, target: EndpointRef },

    /// A label item of the link is missing from the diagram.
    #[error("link {link} has label item {label:?}, which is not part of the diagram")]
    UnknownLabel { link: usize, label: ItemId },
}

/// Tunables of the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingOptions {
    curve_step: f32,
    corner_radius: f32,
    side_stub: f32,
    label_gap: f32,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            curve_step: 16.0,
            corner_radius: 8.0,
            side_stub: 10.0,
            label_gap: 4.0,
        }
    }
}

impl RoutingOptions {
    /// Sets how far each additional curved link between the same endpoints
    /// bows away from the straight line.
    pub fn with_curve_step(mut self, curve_step: f32) -> Self {
        self.curve_step = curve_step;
        self
    }

    /// Sets the maximal radius of rounded orthogonal corners.
    pub fn with_corner_radius(mut self, corner_radius: f32) -> Self {
        self.corner_radius = corner_radius.max(0.0);
        self
    }

    /// Sets the length of the segment leaving a forced side.
    pub fn with_side_stub(mut self, side_stub: f32) -> Self {
        self.side_stub = side_stub.max(0.0);
        self
    }

    /// Sets the distance between a label and its link.
    pub fn with_label_gap(mut self, label_gap: f32) -> Self {
        self.label_gap = label_gap;
        self
    }

    pub fn curve_step(&self) -> f32 {
        self.curve_step
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn side_stub(&self) -> f32 {
        self.side_stub
    }

    pub fn label_gap(&self) -> f32 {
        self.label_gap
    }
}

/// The computed path of one link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRoute {
    link: LinkId,
    routing: Routing,
    points: Vec<Point>,
    track: Track,
    labels: Vec<LabelPlacement>,
}

impl LinkRoute {
    pub fn link(&self) -> LinkId {
        self.link
    }

    pub fn routing(&self) -> Routing {
        self.routing
    }

    /// Route vertices. The first and last points are the attachment points
    /// of the endpoints.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The visible path in absolute coordinates.
    pub fn path(&self) -> Path {
        self.track.to_path()
    }

    /// First point of the visible path.
    pub fn visible_start(&self) -> Point {
        self.track.start().unwrap_or_default()
    }

    /// Last point of the visible path.
    pub fn visible_end(&self) -> Point {
        self.track.end().unwrap_or_default()
    }

    /// Point halfway along the visible path.
    pub fn midpoint(&self) -> Point {
        self.track.midpoint().0
    }

    pub fn labels(&self) -> &[LabelPlacement] {
        &self.labels
    }

    pub(crate) fn track(&self) -> &Track {
        &self.track
    }
}

/// Computes link paths from final item geometry.
#[derive(Debug, Clone, Default)]
pub struct LinkRouter {
    options: RoutingOptions,
}

impl LinkRouter {
    pub fn new(options: RoutingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RoutingOptions {
        &self.options
    }

    /// Routes every link and moves label items next to their link.
    ///
    /// The diagram is only modified when every link could be routed.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when an endpoint or label is not part of the
    /// diagram.
    pub fn route(&self, diagram: &mut Diagram) -> Result<Vec<LinkRoute>, RouteError> {
        let routes = self.compute(diagram)?;

        let tree = diagram.tree();
        let mut geometry: Vec<ItemGeometry> = tree.ids().map(|id| tree.geometry(id)).collect();
        for placement in routes.iter().flat_map(|route| route.labels()) {
            let slot = &mut geometry[placement.item().index()];
            *slot = ItemGeometry::new(placement.position(), slot.size()).with_clip(slot.clip());
        }
        diagram.tree_mut().commit_geometry(geometry);

        info!(links = routes.len(); "Links routed");
        Ok(routes)
    }

    /// Computes the routes without touching the diagram.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] when an endpoint or label is not part of the
    /// diagram.
    pub fn compute(&self, diagram: &Diagram) -> Result<Vec<LinkRoute>, RouteError> {
        let mut routes: Vec<LinkRoute> = Vec::with_capacity(diagram.links().len());
        let mut midpoints = Vec::with_capacity(diagram.links().len());
        let mut parallel: HashMap<(EndpointKey, EndpointKey), usize> = HashMap::new();

        for (index, link) in diagram.links().iter().enumerate() {
            if let Some(label) = link.labels().find(|label| !diagram.tree().contains(*label)) {
                return Err(RouteError::UnknownLabel { link: index, label });
            }
            let from = Endpoint::resolve(diagram, link.from(), index, &midpoints)?;
            let to = Endpoint::resolve(diagram, link.to(), index, &midpoints)?;

            let rank = if link.routing() == Routing::Curve {
                let key = if from.key() <= to.key() {
                    (from.key(), to.key())
                } else {
                    (to.key(), from.key())
                };
                let count = parallel.entry(key).or_default();
                *count += 1;
                *count - 1
            } else {
                0
            };

            let route = self.route_link(diagram, index, link, &from, &to, rank);
            trace!(
                link = index,
                routing:? = route.routing,
                points = route.points.len();
                "Link routed"
            );
            midpoints.push(route.midpoint());
            routes.push(route);
        }

        debug!(links = routes.len(), pairs = parallel.len(); "Routes computed");
        Ok(routes)
    }

    fn route_link(
        &self,
        diagram: &Diagram,
        index: usize,
        link: &Link,
        from: &Endpoint,
        to: &Endpoint,
        rank: usize,
    ) -> LinkRoute {
        let routing = link.routing();
        let mut waypoints = link.waypoints().resolve(from.attach());
        if waypoints.is_empty() && from.key() == to.key() {
            waypoints = self.self_loop(from, to);
        }

        let toward_from = waypoints.first().copied().unwrap_or(to.attach());
        let toward_to = waypoints.last().copied().unwrap_or(from.attach());
        let from_lead = self.lead(from, toward_from, routing);
        let to_lead = self.lead(to, toward_to, routing);

        let mut chain = Vec::with_capacity(waypoints.len() + 2);
        chain.extend(from_lead.last().copied());
        chain.extend(waypoints);
        chain.extend(to_lead.last().copied());
        let chain = match routing {
            Routing::Orthogonal | Routing::OrthoCurve => {
                path::orthogonalize(&chain, lead_axis(from.side()), lead_axis(to.side()))
            }
            Routing::Straight | Routing::Curve => chain,
        };

        let mut points = assemble(&from_lead, &chain, &to_lead);
        path::dedup_points(&mut points);

        let visible_from = visible_lead(&from_lead);
        let visible_to = visible_lead(&to_lead);
        let track = match routing {
            Routing::Straight | Routing::Orthogonal => {
                let mut visible = assemble(visible_from, &chain, visible_to);
                path::dedup_points(&mut visible);
                self.clipped(Track::polyline(&padded(visible)), from, to)
            }
            Routing::OrthoCurve => {
                let mut visible = assemble(visible_from, &chain, visible_to);
                path::dedup_points(&mut visible);
                let clipped = self.clipped(Track::polyline(&padded(visible)), from, to);
                path::round_corners(&track_points(&clipped), self.options.corner_radius)
            }
            Routing::Curve => {
                let bow = self.bow(from, to, rank);
                let mut segments = line_segments(visible_from);
                let curve = if chain.len() == 2 {
                    Track::new(vec![path::bowed(chain[0], chain[1], bow)])
                } else {
                    path::smooth_through(&chain)
                };
                segments.extend_from_slice(curve.segments());
                let mut tail: Vec<Point> = visible_to.to_vec();
                tail.reverse();
                segments.extend(line_segments(&tail));
                self.clipped(Track::new(segments), from, to)
            }
        };

        let labels = labels::place_all(diagram, index, &track, self.options.label_gap);
        LinkRoute {
            link: LinkId::new(index),
            routing,
            points,
            track,
            labels,
        }
    }

    /// The route from the attachment point to where the free part of the
    /// route starts: the attachment point itself, or the attachment point,
    /// the exit on the forced side and the stub outside it.
    fn lead(&self, endpoint: &Endpoint, toward: Point, routing: Routing) -> Vec<Point> {
        match endpoint.side_exit(toward, routing) {
            Some(exit) => vec![
                endpoint.attach(),
                exit,
                endpoint.stub(exit, self.options.side_stub),
            ],
            None => vec![endpoint.attach()],
        }
    }

    fn clipped(&self, mut track: Track, from: &Endpoint, to: &Endpoint) -> Track {
        if let Some(shape) = from.clip_shape() {
            track.clip_start(shape);
        }
        if let Some(shape) = to.clip_shape() {
            track.clip_end(shape);
        }
        track
    }

    /// Offset of the middle of the `rank`-th curve between two endpoints.
    fn bow(&self, from: &Endpoint, to: &Endpoint, rank: usize) -> Point {
        let canonical = if from.key() <= to.key() {
            to.attach().sub_point(from.attach())
        } else {
            from.attach().sub_point(to.attach())
        };
        canonical
            .normalize()
            .perpendicular()
            .scale(self.options.curve_step * (rank as f32 + 1.0))
    }

    /// Waypoints looping around the top-right corner of an endpoint linked
    /// to itself.
    fn self_loop(&self, from: &Endpoint, to: &Endpoint) -> Vec<Point> {
        if from.side().is_forced() || to.side().is_forced() {
            return Vec::new();
        }
        let bounds = from.bounds();
        let reach = 2.0 * self.options.side_stub;
        let right = bounds.max_x() + reach;
        let top = bounds.min_y() - reach;
        vec![
            Point::new(right, from.attach().y()),
            Point::new(right, top),
            Point::new(to.attach().x(), top),
        ]
    }
}

/// Axis constraint for a path leaving through `side`.
fn lead_axis(side: Side) -> Lead {
    match side {
        Side::Top | Side::Bottom => Lead::Vertical,
        Side::Left | Side::Right => Lead::Horizontal,
        Side::Auto | Side::NoClip => Lead::Free,
    }
}

/// The visible part of a lead: without the attachment point when the lead
/// goes through a forced side.
fn visible_lead(lead: &[Point]) -> &[Point] {
    if lead.len() > 1 { &lead[1..] } else { lead }
}

/// Joins a lead, the free chain and the reversed target lead. The chain
/// starts at the last point of `from` and ends at the last point of `to`.
fn assemble(from: &[Point], chain: &[Point], to: &[Point]) -> Vec<Point> {
    let mut points: Vec<Point> = from[..from.len().saturating_sub(1)].to_vec();
    points.extend_from_slice(chain);
    points.extend(to.iter().rev().skip(1));
    points
}

/// Ensures a polyline has a segment, even when both ends coincide.
fn padded(mut points: Vec<Point>) -> Vec<Point> {
    if points.len() == 1 {
        points.push(points[0]);
    }
    points
}

fn line_segments(points: &[Point]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|pair| Segment::Line(pair[0], pair[1]))
        .collect()
}

/// Vertices of a track made of lines.
fn track_points(track: &Track) -> Vec<Point> {
    track
        .start()
        .into_iter()
        .chain(track.segments().iter().map(Segment::end))
        .collect()
}
