//! Placement of link labels along the visible path.

use trellis_core::{
    diagram::Diagram,
    geometry::{Point, Size},
    item::TextArrow,
    tree::ItemId,
};

use super::path::Track;

/// Which label of a link an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Centered on the middle of the link.
    Middle,
    /// Beside the link, near its origin.
    From,
    /// Beside the link, near its target.
    To,
}

/// Where a label item is displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacement {
    item: ItemId,
    kind: LabelKind,
    position: Point,
    arrow: TextArrow,
}

impl LabelPlacement {
    pub fn item(&self) -> ItemId {
        self.item
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    /// Absolute top-left corner of the label.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Direction of the path where the label sits, for directed text labels.
    pub fn arrow(&self) -> TextArrow {
        self.arrow
    }
}

/// Computes the placement of one label of size `size` along `track`.
pub(super) fn place(
    item: ItemId,
    kind: LabelKind,
    size: Size,
    track: &Track,
    gap: f32,
) -> LabelPlacement {
    let length = track.length();
    let (center, tangent) = match kind {
        LabelKind::Middle => track.midpoint(),
        LabelKind::From | LabelKind::To => {
            let leaving = match kind {
                LabelKind::From => track.start_tangent(),
                _ => track.end_tangent(),
            };
            let distance = (gap + half_extent(size, leaving)).min(length / 2.0);
            let distance = match kind {
                LabelKind::From => distance,
                _ => length - distance,
            };
            let (point, tangent) = track.point_at_length(distance);
            let normal = tangent.perpendicular();
            let offset = normal.scale(gap + half_extent(size, normal));
            (point.add_point(offset), tangent)
        }
    };

    LabelPlacement {
        item,
        kind,
        position: center.sub_point(Point::new(size.width() / 2.0, size.height() / 2.0)),
        arrow: arrow_for(tangent),
    }
}

/// Places every label of the link at `index` in `diagram`.
pub(super) fn place_all(
    diagram: &Diagram,
    index: usize,
    track: &Track,
    gap: f32,
) -> Vec<LabelPlacement> {
    let link = &diagram.links()[index];
    let labels = [
        (link.label(), LabelKind::Middle),
        (link.from().label(), LabelKind::From),
        (link.to().label(), LabelKind::To),
    ];
    labels
        .into_iter()
        .filter_map(|(item, kind)| item.map(|item| (item, kind)))
        .map(|(item, kind)| {
            let size = diagram.tree().geometry(item).size();
            place(item, kind, size, track, gap)
        })
        .collect()
}

/// Half of the extent of a box of `size` measured along `direction`.
fn half_extent(size: Size, direction: Point) -> f32 {
    (direction.x().abs() * size.width() + direction.y().abs() * size.height()) / 2.0
}

/// The arrow pointing the way a path travels.
fn arrow_for(tangent: Point) -> TextArrow {
    if tangent.is_zero() {
        TextArrow::None
    } else if tangent.x().abs() >= tangent.y().abs() {
        if tangent.x() >= 0.0 {
            TextArrow::Right
        } else {
            TextArrow::Left
        }
    } else if tangent.y() > 0.0 {
        TextArrow::Down
    } else {
        TextArrow::Up
    }
}
