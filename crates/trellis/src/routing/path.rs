//! Path geometry shared by the routing modes.
//!
//! A route is first computed as a list of vertices. The visible part of the
//! route is a [`Track`]: a chain of line and cubic segments, clipped at the
//! endpoints and measurable by arc length.

use trellis_core::{
    draw::Path,
    geometry::{Bounds, Point},
};

const EPSILON: f32 = 1e-4;
/// Number of samples used to measure or search along a cubic segment.
const CUBIC_STEPS: usize = 32;
/// Bisection iterations when searching a boundary crossing on a cubic.
const BISECT_STEPS: usize = 24;
/// Control point distance for a quarter circle drawn with one cubic.
const CORNER_KAPPA: f32 = 0.552_284_8;

/// One piece of a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line(Point, Point),
    Cubic(Point, Point, Point, Point),
}

impl Segment {
    pub fn start(&self) -> Point {
        match self {
            Self::Line(start, _) | Self::Cubic(start, ..) => *start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Self::Line(_, end) | Self::Cubic(.., end) => *end,
        }
    }

    pub fn point_at(&self, t: f32) -> Point {
        match *self {
            Self::Line(a, b) => a.lerp(b, t),
            Self::Cubic(p0, p1, p2, p3) => {
                let a = p0.lerp(p1, t);
                let b = p1.lerp(p2, t);
                let c = p2.lerp(p3, t);
                let d = a.lerp(b, t);
                let e = b.lerp(c, t);
                d.lerp(e, t)
            }
        }
    }

    /// Unit direction of travel at parameter `t`.
    pub fn tangent_at(&self, t: f32) -> Point {
        let direction = match *self {
            Self::Line(a, b) => b.sub_point(a),
            Self::Cubic(p0, p1, p2, p3) => {
                let u = 1.0 - t;
                let d0 = p1.sub_point(p0).scale(3.0 * u * u);
                let d1 = p2.sub_point(p1).scale(6.0 * u * t);
                let d2 = p3.sub_point(p2).scale(3.0 * t * t);
                let derivative = d0.add_point(d1).add_point(d2);
                if derivative.hypot() > EPSILON {
                    derivative
                } else {
                    p3.sub_point(p0)
                }
            }
        };
        direction.normalize()
    }

    pub fn reversed(&self) -> Self {
        match *self {
            Self::Line(a, b) => Self::Line(b, a),
            Self::Cubic(p0, p1, p2, p3) => Self::Cubic(p3, p2, p1, p0),
        }
    }

    pub fn length(&self) -> f32 {
        match *self {
            Self::Line(a, b) => a.distance(b),
            Self::Cubic(..) => self.samples().windows(2).map(|w| w[0].distance(w[1])).sum(),
        }
    }

    /// Parameter reached after travelling `distance` from the start.
    fn param_at_length(&self, distance: f32) -> f32 {
        match self {
            Self::Line(..) => {
                let length = self.length();
                if length > EPSILON {
                    (distance / length).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
            Self::Cubic(..) => {
                let samples = self.samples();
                let mut travelled = 0.0;
                for (i, pair) in samples.windows(2).enumerate() {
                    let step = pair[0].distance(pair[1]);
                    if travelled + step >= distance && step > EPSILON {
                        let local = (distance - travelled) / step;
                        return (i as f32 + local) / CUBIC_STEPS as f32;
                    }
                    travelled += step;
                }
                1.0
            }
        }
    }

    /// The part of this segment from parameter `t` to its end.
    fn split_after(&self, t: f32) -> Self {
        match *self {
            Self::Line(a, b) => Self::Line(a.lerp(b, t), b),
            Self::Cubic(p0, p1, p2, p3) => {
                let a = p0.lerp(p1, t);
                let b = p1.lerp(p2, t);
                let c = p2.lerp(p3, t);
                let d = a.lerp(b, t);
                let e = b.lerp(c, t);
                let f = d.lerp(e, t);
                Self::Cubic(f, e, c, p3)
            }
        }
    }

    fn samples(&self) -> Vec<Point> {
        (0..=CUBIC_STEPS)
            .map(|i| self.point_at(i as f32 / CUBIC_STEPS as f32))
            .collect()
    }

    /// Trims the part of the segment that lies inside `shape`, assuming the
    /// segment starts inside it and ends outside.
    fn clip_start(&self, shape: &Shape) -> Self {
        if let Self::Line(a, b) = *self {
            return Self::Line(shape.exit_point(a, b), b);
        }

        let mut inside = 0.0;
        let mut outside = 1.0;
        for i in 1..=CUBIC_STEPS {
            let t = i as f32 / CUBIC_STEPS as f32;
            if !shape.contains(self.point_at(t)) {
                outside = t;
                break;
            }
            inside = t;
        }
        for _ in 0..BISECT_STEPS {
            let middle = (inside + outside) / 2.0;
            if shape.contains(self.point_at(middle)) {
                inside = middle;
            } else {
                outside = middle;
            }
        }
        self.split_after(outside)
    }
}

/// Boundary used to clip a link where it meets an endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect(Bounds),
    Ellipse(Bounds),
}

impl Shape {
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Self::Rect(bounds) => bounds.contains(point),
            Self::Ellipse(bounds) => {
                let (rx, ry) = (bounds.width() / 2.0, bounds.height() / 2.0);
                if rx <= EPSILON || ry <= EPSILON {
                    return bounds.contains(point);
                }
                let offset = point.sub_point(bounds.center());
                (offset.x() / rx).powi(2) + (offset.y() / ry).powi(2) <= 1.0
            }
        }
    }

    /// Point where the line from `inside` to `outside` crosses the boundary.
    pub fn exit_point(&self, inside: Point, outside: Point) -> Point {
        match self {
            Self::Rect(bounds) => bounds.exit_point(inside, outside),
            Self::Ellipse(bounds) => {
                let (rx, ry) = (bounds.width() / 2.0, bounds.height() / 2.0);
                if rx <= EPSILON || ry <= EPSILON {
                    return bounds.exit_point(inside, outside);
                }
                // Solve |((p - c) / r)|² = 1 for p = inside + t (outside - inside).
                let center = bounds.center();
                let px = (inside.x() - center.x()) / rx;
                let py = (inside.y() - center.y()) / ry;
                let dx = (outside.x() - inside.x()) / rx;
                let dy = (outside.y() - inside.y()) / ry;
                let a = dx * dx + dy * dy;
                let b = 2.0 * (px * dx + py * dy);
                let c = px * px + py * py - 1.0;
                let discriminant = b * b - 4.0 * a * c;
                if a <= EPSILON || discriminant < 0.0 {
                    return inside;
                }
                let t = (-b + discriminant.sqrt()) / (2.0 * a);
                if (0.0..=1.0).contains(&t) {
                    inside.lerp(outside, t)
                } else {
                    inside
                }
            }
        }
    }
}

/// The visible part of a route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    segments: Vec<Segment>,
}

impl Track {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// A track of straight lines through `points`.
    pub fn polyline(points: &[Point]) -> Self {
        Self::new(
            points
                .windows(2)
                .map(|pair| Segment::Line(pair[0], pair[1]))
                .collect(),
        )
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First point of the track, if any.
    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(Segment::start)
    }

    /// Last point of the track, if any.
    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(Segment::end)
    }

    /// Unit direction of travel when leaving the start.
    pub fn start_tangent(&self) -> Point {
        self.segments
            .first()
            .map(|segment| segment.tangent_at(0.0))
            .unwrap_or_default()
    }

    /// Unit direction of travel when arriving at the end.
    pub fn end_tangent(&self) -> Point {
        self.segments
            .last()
            .map(|segment| segment.tangent_at(1.0))
            .unwrap_or_default()
    }

    pub fn length(&self) -> f32 {
        self.segments.iter().map(Segment::length).sum()
    }

    /// Point and unit tangent after travelling `distance` along the track.
    pub fn point_at_length(&self, distance: f32) -> (Point, Point) {
        let mut travelled = 0.0;
        for segment in &self.segments {
            let length = segment.length();
            if travelled + length >= distance {
                let t = segment.param_at_length(distance - travelled);
                return (segment.point_at(t), segment.tangent_at(t));
            }
            travelled += length;
        }
        match self.segments.last() {
            Some(last) => (last.end(), last.tangent_at(1.0)),
            None => (Point::default(), Point::default()),
        }
    }

    /// Point and tangent halfway along the track.
    pub fn midpoint(&self) -> (Point, Point) {
        self.point_at_length(self.length() / 2.0)
    }

    /// Removes the part of the track inside `shape` at its start. The track
    /// is left untouched when it never leaves the shape.
    pub fn clip_start(&mut self, shape: &Shape) {
        let Some(index) = self
            .segments
            .iter()
            .position(|segment| !shape.contains(segment.end()))
        else {
            return;
        };
        let clipped = self.segments[index].clip_start(shape);
        self.segments.drain(..index);
        self.segments[0] = clipped;
    }

    /// Removes the part of the track inside `shape` at its end.
    pub fn clip_end(&mut self, shape: &Shape) {
        self.reverse();
        self.clip_start(shape);
        self.reverse();
    }

    fn reverse(&mut self) {
        self.segments.reverse();
        for segment in &mut self.segments {
            *segment = segment.reversed();
        }
    }

    pub fn to_path(&self) -> Path {
        let mut path = Path::new();
        if let Some(start) = self.start() {
            path.move_to(start);
        }
        for segment in &self.segments {
            match *segment {
                Segment::Line(_, end) => {
                    path.line_to(end);
                }
                Segment::Cubic(_, ctrl1, ctrl2, end) => {
                    path.cubic_to(ctrl1, ctrl2, end);
                }
            }
        }
        path
    }

    /// Bounds of the track vertices and control points.
    pub fn bounds(&self) -> Option<Bounds> {
        self.to_path().bounds()
    }
}

/// Drops consecutive points that coincide.
pub fn dedup_points(points: &mut Vec<Point>) {
    points.dedup_by(|b, a| a.approx_eq(*b, EPSILON));
}

/// Preferred axis of the first segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    Horizontal,
    Vertical,
    /// Whichever axis covers the longer distance.
    Free,
}

/// Inserts corners so that consecutive points of `chain` are joined by
/// horizontal and vertical segments only.
///
/// `first` constrains how the chain leaves its first point and `last` how it
/// arrives at its last point. Each pair gets a single corner, except when
/// both ends of a single pair are constrained to the same axis: then two
/// corners at the middle coordinate are used.
pub fn orthogonalize(chain: &[Point], first: Lead, last: Lead) -> Vec<Point> {
    let Some((&head, _)) = chain.split_first() else {
        return Vec::new();
    };
    let mut points = vec![head];
    let pairs = chain.len().saturating_sub(1);
    for (i, pair) in chain.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let leave = if i == 0 { first } else { Lead::Free };
        let arrive = if i + 1 == pairs { last } else { Lead::Free };
        let aligned = (a.x() - b.x()).abs() <= EPSILON || (a.y() - b.y()).abs() <= EPSILON;
        if !aligned {
            match (leave, arrive) {
                (Lead::Horizontal, Lead::Horizontal) => {
                    let mid_x = (a.x() + b.x()) / 2.0;
                    points.push(Point::new(mid_x, a.y()));
                    points.push(Point::new(mid_x, b.y()));
                }
                (Lead::Vertical, Lead::Vertical) => {
                    let mid_y = (a.y() + b.y()) / 2.0;
                    points.push(Point::new(a.x(), mid_y));
                    points.push(Point::new(b.x(), mid_y));
                }
                (Lead::Horizontal, _) | (Lead::Free, Lead::Vertical) => {
                    points.push(Point::new(b.x(), a.y()));
                }
                (Lead::Vertical, _) | (Lead::Free, Lead::Horizontal) => {
                    points.push(Point::new(a.x(), b.y()));
                }
                (Lead::Free, Lead::Free) => {
                    let delta = b.sub_point(a);
                    if delta.x().abs() >= delta.y().abs() {
                        points.push(Point::new(b.x(), a.y()));
                    } else {
                        points.push(Point::new(a.x(), b.y()));
                    }
                }
            }
        }
        points.push(b);
    }
    dedup_points(&mut points);
    points
}

/// Replaces the sharp corners of a polyline with quarter-circle-like
/// cubics of at most `radius`.
pub fn round_corners(points: &[Point], radius: f32) -> Track {
    if points.len() < 3 || radius <= 0.0 {
        return Track::polyline(points);
    }

    let mut segments = Vec::new();
    let mut cursor = points[0];
    for i in 1..points.len() - 1 {
        let (previous, corner, next) = (points[i - 1], points[i], points[i + 1]);
        let incoming = corner.sub_point(previous).normalize();
        let outgoing = next.sub_point(corner).normalize();
        let turn = incoming.x() * outgoing.y() - incoming.y() * outgoing.x();
        // Straight runs and reversals keep their vertex.
        let straight = turn.abs() <= EPSILON;
        let r = radius
            .min(previous.distance(corner) / 2.0)
            .min(corner.distance(next) / 2.0);
        if straight || r <= EPSILON {
            segments.push(Segment::Line(cursor, corner));
            cursor = corner;
            continue;
        }
        let entry = corner.add_point(previous.sub_point(corner).normalize().scale(r));
        let exit = corner.add_point(next.sub_point(corner).normalize().scale(r));
        if !cursor.approx_eq(entry, EPSILON) {
            segments.push(Segment::Line(cursor, entry));
        }
        segments.push(Segment::Cubic(
            entry,
            entry.lerp(corner, CORNER_KAPPA),
            exit.lerp(corner, CORNER_KAPPA),
            exit,
        ));
        cursor = exit;
    }
    let last = points[points.len() - 1];
    if !cursor.approx_eq(last, EPSILON) {
        segments.push(Segment::Line(cursor, last));
    }
    Track::new(segments)
}

/// A smooth chain of cubics through `points` (Catmull-Rom).
pub fn smooth_through(points: &[Point]) -> Track {
    if points.len() < 3 {
        return Track::polyline(points);
    }
    let last = points.len() - 1;
    let segments = (0..last)
        .map(|i| {
            let p0 = points[i.saturating_sub(1)];
            let p1 = points[i];
            let p2 = points[i + 1];
            let p3 = points[(i + 2).min(last)];
            let ctrl1 = p1.add_point(p2.sub_point(p0).scale(1.0 / 6.0));
            let ctrl2 = p2.sub_point(p3.sub_point(p1).scale(1.0 / 6.0));
            Segment::Cubic(p1, ctrl1, ctrl2, p2)
        })
        .collect();
    Track::new(segments)
}

/// A single cubic from `start` to `end` whose middle is displaced by `bow`.
pub fn bowed(start: Point, end: Point, bow: Point) -> Segment {
    // Both control points move by 4/3 of the bow so that the curve's
    // midpoint moves by exactly `bow`.
    let offset = bow.scale(4.0 / 3.0);
    Segment::Cubic(
        start,
        start.lerp(end, 1.0 / 3.0).add_point(offset),
        start.lerp(end, 2.0 / 3.0).add_point(offset),
        end,
    )
}
