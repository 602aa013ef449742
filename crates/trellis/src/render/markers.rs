//! Arrow heads and symbols drawn at link ends.

use trellis_core::{
    color::Color,
    draw::Path,
    geometry::Point,
    style::{ArrowKind, ArrowStyle, SymbolKind, SymbolStyle},
};

/// Half-length of the strokes making a symbol.
const SYMBOL_HALF: f32 = 5.0;
/// Distance between the two strokes of a double strike.
const DOUBLE_STRIKE_GAP: f32 = 3.0;

/// Geometry of an arrow head and how to paint it.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ArrowHead {
    pub path: Path,
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub width: f32,
}

/// Builds the arrow head whose tip is at `tip`, pointing along `direction`.
pub(super) fn arrow(style: &ArrowStyle, tip: Point, direction: Point) -> Option<ArrowHead> {
    let direction = direction.normalize();
    if style.kind() == ArrowKind::None || direction.is_zero() {
        return None;
    }

    let back = direction.scale(-style.length());
    let (sin, cos) = style.angle().sin_cos();
    let rotate = |v: Point, sin: f32| Point::new(v.x() * cos - v.y() * sin, v.x() * sin + v.y() * cos);
    let left = tip.add_point(rotate(back, sin));
    let right = tip.add_point(rotate(back, -sin));

    let (path, fill) = match style.kind() {
        ArrowKind::Open => {
            let mut path = Path::new();
            path.move_to(left).line_to(tip).line_to(right);
            (path, None)
        }
        ArrowKind::Solid => (
            Path::polygon(&[tip, left, right]),
            style.fill().or(style.stroke()),
        ),
        ArrowKind::Diamond => {
            let tail = left.add_point(right.sub_point(tip));
            (Path::polygon(&[tip, left, tail, right]), style.fill())
        }
        ArrowKind::None => return None,
    };

    Some(ArrowHead {
        path,
        stroke: style.stroke(),
        fill,
        width: style.width(),
    })
}

/// Builds the strokes of a symbol centered at `at` on a path travelling
/// along `direction`.
pub(super) fn symbol(style: &SymbolStyle, at: Point, direction: Point) -> Option<Path> {
    let direction = direction.normalize();
    if direction.is_zero() {
        return None;
    }
    let across = direction.perpendicular().scale(SYMBOL_HALF);
    let along = direction.scale(SYMBOL_HALF);

    let strike = |center: Point, path: &mut Path| {
        path.move_to(center.sub_point(across))
            .line_to(center.add_point(across));
    };

    let mut path = Path::new();
    match style.kind() {
        SymbolKind::None => return None,
        SymbolKind::Cross => {
            path.move_to(at.sub_point(across).sub_point(along))
                .line_to(at.add_point(across).add_point(along))
                .move_to(at.sub_point(across).add_point(along))
                .line_to(at.add_point(across).sub_point(along));
        }
        SymbolKind::Strike => strike(at, &mut path),
        SymbolKind::DoubleStrike => {
            let offset = direction.scale(DOUBLE_STRIKE_GAP / 2.0);
            strike(at.sub_point(offset), &mut path);
            strike(at.add_point(offset), &mut path);
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use trellis_core::draw::PathCommand;

    use super::*;

    #[test]
    fn test_no_arrow() {
        assert!(arrow(&ArrowStyle::default(), Point::default(), Point::new(1.0, 0.0)).is_none());
    }

    #[test]
    fn test_solid_arrow_is_filled_with_stroke_color() {
        let style = ArrowStyle::default()
            .with_kind(ArrowKind::Solid)
            .with_length(10.0)
            .with_angle(0.5);
        let head = arrow(&style, Point::new(100.0, 0.0), Point::new(1.0, 0.0)).unwrap();

        assert_eq!(head.fill, Some(Color::black()));
        let bounds = head.path.bounds().unwrap();
        assert_approx_eq!(f32, bounds.max_x(), 100.0, epsilon = 0.001);
        assert_approx_eq!(f32, bounds.min_x(), 100.0 - 10.0 * 0.5_f32.cos(), epsilon = 0.001);
        assert_approx_eq!(f32, bounds.height(), 2.0 * 10.0 * 0.5_f32.sin(), epsilon = 0.001);
    }

    #[test]
    fn test_open_arrow_is_not_closed() {
        let style = ArrowStyle::default().with_kind(ArrowKind::Open);
        let head = arrow(&style, Point::default(), Point::new(0.0, 1.0)).unwrap();
        assert!(!head.path.commands().contains(&PathCommand::Close));
        assert_eq!(head.fill, None);
    }

    #[test]
    fn test_double_strike_has_two_strokes() {
        let style = SymbolStyle::default().with_kind(SymbolKind::DoubleStrike);
        let path = symbol(&style, Point::default(), Point::new(1.0, 0.0)).unwrap();
        let moves = path
            .commands()
            .iter()
            .filter(|command| matches!(command, PathCommand::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }
}
