//! Top-down placement of children inside their parent.

use trellis_core::{
    geometry::{Point, Size},
    item::Overflow,
    tree::{Child, ItemGeometry, ItemId},
};

use super::{Axis, Pass, keeps_cross_size};

impl Pass<'_> {
    /// Records the geometry of `id` and places its children inside it.
    pub(super) fn place(&mut self, id: ItemId, position: Point, size: Size, clip: Option<Size>) {
        self.geometry[id.index()] = ItemGeometry::new(position, size).with_clip(clip);

        let tree = self.tree;
        let children = tree.children(id);
        if children.is_empty() {
            return;
        }

        let item = &tree[id];
        let axis = Axis::of(item.layout());
        let padding = item.padding();
        let explicit = item.explicit_size();

        let in_flow = |child: &&Child| {
            !child.placement().is_floating() && tree[child.item()].position().is_none()
        };
        let content_along: f32 = children
            .iter()
            .filter(in_flow)
            .map(|child| {
                axis.along(self.natural_size(child.item()))
                    + axis.sum_along(child.placement().margin())
            })
            .sum();
        let margins_along: f32 = children
            .iter()
            .filter(in_flow)
            .map(|child| axis.sum_along(child.placement().margin()))
            .sum();

        let raw_along = axis.along(size) - axis.sum_along(padding);
        if axis.explicit_along(explicit).is_some() && raw_along - margins_along < 0.0 {
            self.report(id, axis, -(raw_along - margins_along));
        }
        let raw_across = axis.across(size) - axis.sum_across(padding);
        if axis.explicit_across(explicit).is_some() && raw_across < 0.0 {
            self.report(id, axis.cross(), -raw_across);
        }
        let inner_along = raw_along.max(0.0);
        let inner_across = raw_across.max(0.0);
        let start_along = axis.start(padding);
        let start_across = axis.cross_start(padding);

        let own_align = tree.placement(id).map(|p| p.align()).unwrap_or_default();
        let extra = (inner_along - content_along).max(0.0);
        let mut cursor = start_along + extra * own_align.factor();

        for child in children {
            let child_id = child.item();
            let child_item = &tree[child_id];
            let placement = child.placement();
            let margin = placement.margin();

            let available_raw = inner_across - axis.sum_across(margin);
            if axis.explicit_across(explicit).is_some() && available_raw < 0.0 {
                self.report(id, axis.cross(), -available_raw);
            }
            let available = available_raw.max(0.0);

            let mut child_size = self.natural_size(child_id);
            let stretches = axis.explicit_across(child_item.explicit_size()).is_none()
                && !keeps_cross_size(child_item.kind());
            if stretches {
                child_size = axis.size(
                    axis.along(child_size),
                    axis.across(child_size).max(available),
                );
            }

            let free = (available - axis.across(child_size)).max(0.0);
            let across = start_across + axis.cross_start(margin) + free * placement.align().factor();
            let along = cursor + axis.start(margin);
            let position = child_item
                .position()
                .unwrap_or_else(|| axis.point(along, across));

            let clip = match placement.overflow() {
                Overflow::Prevent => None,
                Overflow::Hide => {
                    let room = axis.size(
                        (start_along + inner_along - axis.point_along(position)).max(0.0),
                        (start_across + inner_across - axis.point_across(position)).max(0.0),
                    );
                    let visible = child_size.min(room);
                    (visible != child_size).then_some(visible)
                }
            };

            if !placement.is_floating() && child_item.position().is_none() {
                cursor = along + axis.along(child_size) + axis.end(margin);
            }

            self.place(child_id, position, child_size, clip);
        }
    }
}
