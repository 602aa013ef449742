//! Items: the nodes of the scene graph.
//!
//! An [`Item`] is a closed set of shapes ([`ItemKind`]) sharing the layout
//! attributes every node has: an optional position in its parent, an
//! optional explicit size, a minimum size, padding and the direction in
//! which children are stacked. How an item sits inside its parent
//! (alignment, margins, floating, overflow) is a property of the parent/child
//! relationship and lives in [`Placement`].

use std::sync::Arc;

use crate::{
    geometry::{Insets, Point, Size},
    identifier::Id,
    style::Style,
};

ordinal_enum! {
    /// Direction in which an item stacks its children.
    pub enum LayoutDirection {
        Horizontal = 0,
        #[default]
        Vertical = 1,
    }
}

ordinal_enum! {
    /// Perpendicular alignment of a child within its parent.
    pub enum Align {
        #[default]
        Start = 0,
        Middle = 1,
        End = 2,
    }
}

impl Align {
    /// Fraction of the free space placed before the child.
    pub fn factor(self) -> f32 {
        match self {
            Self::Start => 0.0,
            Self::Middle => 0.5,
            Self::End => 1.0,
        }
    }
}

ordinal_enum! {
    /// What happens when a child needs more room than its parent offers.
    pub enum Overflow {
        /// The parent grows to make room for the child.
        #[default]
        Prevent = 0,
        /// The child is clipped to the room left in the parent.
        Hide = 1,
    }
}

ordinal_enum! {
    /// Direction arrow displayed next to a text item.
    pub enum TextArrow {
        #[default]
        None = 0,
        Up = 1,
        Down = 2,
        Left = 3,
        Right = 4,
    }
}

/// Shape-specific data of an item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// A rectangle, with optionally rounded corners.
    Rect { radius: f32 },
    /// An ellipse inscribed in the item's box.
    Ellipse,
    /// A sequence of points. When `relative` is set, each point is an offset
    /// from the previous one; otherwise points are relative to the item's
    /// top-left corner.
    Polyline {
        points: Vec<Point>,
        close: bool,
        relative: bool,
    },
    /// A text run, optionally followed by a direction arrow.
    Text { text: String, directed: TextArrow },
    /// A horizontal rule, with optional text in the middle.
    Hr { text: String },
}

impl ItemKind {
    /// Name used for this kind in documents and default-style ids.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rect { .. } => "rect",
            Self::Ellipse => "ellipse",
            Self::Polyline { .. } => "polyline",
            Self::Text { .. } => "text",
            Self::Hr { .. } => "hr",
        }
    }

    /// Points of a polyline resolved relative to the item's top-left corner.
    /// Empty for other kinds.
    pub fn resolved_points(&self) -> Vec<Point> {
        match self {
            Self::Polyline {
                points, relative, ..
            } => {
                if *relative {
                    let mut current = Point::default();
                    points
                        .iter()
                        .map(|offset| {
                            current = current.add_point(*offset);
                            current
                        })
                        .collect()
                } else {
                    points.clone()
                }
            }
            _ => Vec::new(),
        }
    }
}

/// Explicit size of an item. Each axis is optional; absent means the size
/// on that axis is computed from the content.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExplicitSize {
    width: Option<f32>,
    height: Option<f32>,
}

impl ExplicitSize {
    /// Creates an explicit size. Negative values mean "unset".
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: (width >= 0.0).then_some(width),
            height: (height >= 0.0).then_some(height),
        }
    }

    pub fn width(self) -> Option<f32> {
        self.width
    }

    pub fn height(self) -> Option<f32> {
        self.height
    }
}

/// A node of the scene graph.
#[derive(Debug, Clone)]
pub struct Item {
    kind: ItemKind,
    style: Arc<Style>,
    id: Option<Id>,
    data: Option<serde_json::Value>,
    position: Option<Point>,
    explicit_size: ExplicitSize,
    min_size: Size,
    padding: Insets,
    layout: LayoutDirection,
}

impl Item {
    pub fn new(kind: ItemKind, style: Arc<Style>) -> Self {
        Self {
            kind,
            style,
            id: None,
            data: None,
            position: None,
            explicit_size: ExplicitSize::default(),
            min_size: Size::default(),
            padding: Insets::default(),
            layout: LayoutDirection::default(),
        }
    }

    /// Creates a rectangle item.
    pub fn rect(style: Arc<Style>) -> Self {
        Self::new(ItemKind::Rect { radius: 0.0 }, style)
    }

    /// Creates a text item.
    pub fn text(style: Arc<Style>, text: impl Into<String>) -> Self {
        Self::new(
            ItemKind::Text {
                text: text.into(),
                directed: TextArrow::None,
            },
            style,
        )
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_explicit_size(mut self, size: ExplicitSize) -> Self {
        self.explicit_size = size;
        self
    }

    /// Sets the minimum size. Negative dimensions are treated as zero.
    pub fn with_min_size(mut self, min_size: Size) -> Self {
        self.min_size = min_size.max(Size::default());
        self
    }

    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_layout(mut self, layout: LayoutDirection) -> Self {
        self.layout = layout;
        self
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ItemKind {
        &mut self.kind
    }

    pub fn style(&self) -> &Arc<Style> {
        &self.style
    }

    pub fn set_style(&mut self, style: Arc<Style>) {
        self.style = style;
    }

    pub fn id(&self) -> Option<Id> {
        self.id
    }

    /// Application payload attached to the item.
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Explicit position in the parent's coordinate space.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn explicit_size(&self) -> ExplicitSize {
        self.explicit_size
    }

    pub fn min_size(&self) -> Size {
        self.min_size
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn layout(&self) -> LayoutDirection {
        self.layout
    }

    pub(crate) fn set_position(&mut self, position: Option<Point>) {
        self.position = position;
    }

    pub(crate) fn set_explicit_size(&mut self, size: ExplicitSize) {
        self.explicit_size = size;
    }

    pub(crate) fn set_min_size(&mut self, min_size: Size) {
        self.min_size = min_size.max(Size::default());
    }

    pub(crate) fn set_layout(&mut self, layout: LayoutDirection) {
        self.layout = layout;
    }
}

/// How a child is placed inside its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    align: Align,
    margin: Insets,
    floating: bool,
    overflow: Overflow,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_margin(mut self, margin: Insets) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_floating(mut self, floating: bool) -> Self {
        self.floating = floating;
        self
    }

    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn margin(&self) -> Insets {
        self.margin
    }

    /// A floating child does not advance the stacking cursor and does not
    /// contribute to its parent's size.
    pub fn is_floating(&self) -> bool {
        self.floating
    }

    pub fn overflow(&self) -> Overflow {
        self.overflow
    }
}
