//! Bottom-up computation of natural sizes.

use log::trace;

use trellis_core::{
    geometry::Size,
    item::{Item, ItemKind, Overflow, TextArrow},
    tree::ItemId,
};

use super::{Axis, HR_STUB, Pass, TEXT_ARROW_GAP, text_arrow_size};

impl Pass<'_> {
    /// Computes and records the size of `id` and of all its descendants.
    pub(super) fn measure(&mut self, id: ItemId) -> Size {
        let tree = self.tree;
        let item = &tree[id];
        let axis = Axis::of(item.layout());

        let mut along = 0.0_f32;
        let mut across = 0.0_f32;
        for child in tree.children(id) {
            let child_size = self.measure(child.item());
            let placement = child.placement();
            if placement.is_floating() || tree[child.item()].position().is_some() {
                continue;
            }
            let margin = placement.margin();
            along += axis.along(child_size) + axis.sum_along(margin);
            if placement.overflow() == Overflow::Prevent {
                across = across.max(axis.across(child_size) + axis.sum_across(margin));
            }
        }

        let stack = if tree.children(id).is_empty() {
            Size::default()
        } else {
            axis.size(along, across).add_padding(item.padding())
        };
        let natural = self.intrinsic_size(item).max(stack);

        let explicit = item.explicit_size();
        let size = Size::new(
            explicit.width().unwrap_or(natural.width()),
            explicit.height().unwrap_or(natural.height()),
        )
        .max(item.min_size());

        trace!(item = id.index(), kind = item.kind().type_name(), size:? = size; "Measured item");
        self.natural[id.index()] = size;
        size
    }

    /// Size required by the item's own content, ignoring children.
    fn intrinsic_size(&self, item: &Item) -> Size {
        let style = item.style();
        match item.kind() {
            ItemKind::Rect { .. } | ItemKind::Ellipse => Size::default(),
            ItemKind::Polyline { .. } => {
                let points = item.kind().resolved_points();
                let max_x = points.iter().map(|p| p.x()).fold(0.0_f32, f32::max);
                let max_y = points.iter().map(|p| p.y()).fold(0.0_f32, f32::max);
                Size::new(max_x, max_y)
            }
            ItemKind::Text { text, directed } => {
                let measured =
                    self.metrics
                        .measure(text, style.font(), style.font_line_spacing());
                if *directed == TextArrow::None {
                    measured
                } else {
                    let arrow = text_arrow_size(style);
                    Size::new(
                        measured.width() + arrow + TEXT_ARROW_GAP,
                        measured.height().max(arrow),
                    )
                }
            }
            ItemKind::Hr { text } => {
                let measured =
                    self.metrics
                        .measure(text, style.font(), style.font_line_spacing());
                Size::new(
                    measured.width() + 2.0 * HR_STUB,
                    measured.height().max(style.line_width()),
                )
            }
        }
    }
}
