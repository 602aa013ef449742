//! Outlines of item shapes.

use trellis_core::{
    draw::Path,
    geometry::{Bounds, Point},
};

/// Control point distance for a quarter ellipse drawn with one cubic.
const KAPPA: f32 = 0.552_284_8;

/// A rectangle with corners rounded by `radius`, limited to half of the
/// shorter side.
pub(super) fn rect(bounds: Bounds, radius: f32) -> Path {
    let radius = radius
        .min(bounds.width() / 2.0)
        .min(bounds.height() / 2.0)
        .max(0.0);
    let (x0, y0, x1, y1) = (bounds.min_x(), bounds.min_y(), bounds.max_x(), bounds.max_y());
    if radius == 0.0 {
        return Path::polygon(&[
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]);
    }

    let k = radius * (1.0 - KAPPA);
    let mut path = Path::new();
    path.move_to(Point::new(x0 + radius, y0))
        .line_to(Point::new(x1 - radius, y0))
        .cubic_to(Point::new(x1 - k, y0), Point::new(x1, y0 + k), Point::new(x1, y0 + radius))
        .line_to(Point::new(x1, y1 - radius))
        .cubic_to(Point::new(x1, y1 - k), Point::new(x1 - k, y1), Point::new(x1 - radius, y1))
        .line_to(Point::new(x0 + radius, y1))
        .cubic_to(Point::new(x0 + k, y1), Point::new(x0, y1 - k), Point::new(x0, y1 - radius))
        .line_to(Point::new(x0, y0 + radius))
        .cubic_to(Point::new(x0, y0 + k), Point::new(x0 + k, y0), Point::new(x0 + radius, y0))
        .close();
    path
}

/// The ellipse inscribed in `bounds`.
pub(super) fn ellipse(bounds: Bounds) -> Path {
    let center = bounds.center();
    let (rx, ry) = (bounds.width() / 2.0, bounds.height() / 2.0);
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let (cx, cy) = (center.x(), center.y());

    let mut path = Path::new();
    path.move_to(Point::new(cx + rx, cy))
        .cubic_to(Point::new(cx + rx, cy + ky), Point::new(cx + kx, cy + ry), Point::new(cx, cy + ry))
        .cubic_to(Point::new(cx - kx, cy + ry), Point::new(cx - rx, cy + ky), Point::new(cx - rx, cy))
        .cubic_to(Point::new(cx - rx, cy - ky), Point::new(cx - kx, cy - ry), Point::new(cx, cy - ry))
        .cubic_to(Point::new(cx + kx, cy - ry), Point::new(cx + rx, cy - ky), Point::new(cx + rx, cy))
        .close();
    path
}

/// A small filled triangle pointing along `direction`, centered in `bounds`.
pub(super) fn triangle(bounds: Bounds, direction: Point) -> Path {
    let center = bounds.center();
    let half = bounds.width().min(bounds.height()) / 2.0;
    let forward = direction.normalize().scale(half);
    let side = direction.normalize().perpendicular().scale(half);
    Path::polygon(&[
        center.add_point(forward),
        center.sub_point(forward).add_point(side),
        center.sub_point(forward).sub_point(side),
    ])
}
