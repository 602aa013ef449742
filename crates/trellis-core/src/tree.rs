//! The item tree.
//!
//! [`ItemTree`] is an arena owning every [`Item`] of a diagram. Items refer
//! to each other through [`ItemId`] handles: a parent owns the ordered list
//! of its children, and each child keeps a back-reference to its parent that
//! is set exactly once.
//!
//! The tree also stores the geometry computed by layout. Geometry is only
//! written as a whole through [`ItemTree::commit_geometry`], so callers never
//! observe a partially laid out tree.

use std::ops::{Index, IndexMut};

use log::trace;
use thiserror::Error;

use crate::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
    item::{ExplicitSize, Item, LayoutDirection, Placement},
};

/// Handle to an item stored in an [`ItemTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(usize);

impl ItemId {
    /// Position of the item in the arena. Items are numbered in insertion
    /// order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors raised by structural changes to the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("item #{0} already has a parent")]
    ItemAlreadyParented(usize),

    #[error("adding item #{child} under item #{parent} would create a cycle")]
    CycleDetected { parent: usize, child: usize },

    #[error("item #{0} is not part of this tree")]
    UnknownItem(usize),
}

/// A child entry: which item, and how it is placed in its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Child {
    item: ItemId,
    placement: Placement,
}

impl Child {
    pub fn item(&self) -> ItemId {
        self.item
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }
}

/// Geometry assigned to an item by layout.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemGeometry {
    position: Point,
    size: Size,
    clip: Option<Size>,
}

impl ItemGeometry {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            position,
            size,
            clip: None,
        }
    }

    pub fn with_clip(mut self, clip: Option<Size>) -> Self {
        self.clip = clip;
        self
    }

    /// Top-left corner, relative to the parent's top-left corner (or to the
    /// diagram origin for top-level items).
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Visible size when the item is clipped by its parent.
    pub fn clip(&self) -> Option<Size> {
        self.clip
    }

    /// Size actually drawn on screen.
    pub fn visible_size(&self) -> Size {
        self.clip.map_or(self.size, |clip| clip.min(self.size))
    }
}

#[derive(Debug, Clone)]
struct Node {
    item: Item,
    parent: Option<ItemId>,
    children: Vec<Child>,
    geometry: ItemGeometry,
}

/// Arena of items with parent/child relationships.
#[derive(Debug, Clone, Default)]
pub struct ItemTree {
    nodes: Vec<Node>,
}

impl ItemTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached item to the tree and returns its handle.
    pub fn insert(&mut self, item: Item) -> ItemId {
        let id = ItemId(self.nodes.len());
        self.nodes.push(Node {
            item,
            parent: None,
            children: Vec::new(),
            geometry: ItemGeometry::default(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.nodes.get(id.0).map(|node| &node.item)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.nodes.get_mut(id.0).map(|node| &mut node.item)
    }

    /// Iterates over all item handles in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.nodes.len()).map(ItemId)
    }

    /// Finds the first item carrying the given document id.
    pub fn find(&self, id: Id) -> Option<ItemId> {
        self.nodes
            .iter()
            .position(|node| node.item.id() == Some(id))
            .map(ItemId)
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: ItemId) -> &[Child] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Placement of `id` within its parent, if it has one.
    pub fn placement(&self, id: ItemId) -> Option<&Placement> {
        let parent = self.parent(id)?;
        self.children(parent)
            .iter()
            .find(|child| child.item == id)
            .map(Child::placement)
    }

    /// Returns true if `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Returns the outermost ancestor of `id` (the item itself when it has
    /// no parent).
    pub fn top_ancestor(&self, id: ItemId) -> ItemId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// # Errors
    ///
    /// - [`TreeError::UnknownItem`] if either handle is not part of the tree.
    /// - [`TreeError::ItemAlreadyParented`] if `child` already has a parent.
    /// - [`TreeError::CycleDetected`] if `child` is `parent` or one of its
    ///   ancestors.
    pub fn add_child(
        &mut self,
        parent: ItemId,
        child: ItemId,
        placement: Placement,
    ) -> Result<(), TreeError> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::CycleDetected {
                parent: parent.0,
                child: child.0,
            });
        }
        if self.nodes[child.0].parent.is_some() {
            return Err(TreeError::ItemAlreadyParented(child.0));
        }

        trace!(parent = parent.0, child = child.0; "Adding child");
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(Child {
            item: child,
            placement,
        });
        Ok(())
    }

    /// Sets the minimum size of an item.
    pub fn set_min_size(&mut self, id: ItemId, width: f32, height: f32) -> Result<(), TreeError> {
        self.check(id)?;
        self.nodes[id.0]
            .item
            .set_min_size(Size::new(width, height));
        Ok(())
    }

    /// Sets the explicit size of an item. Negative values reset that axis to
    /// automatic sizing.
    pub fn set_explicit_size(
        &mut self,
        id: ItemId,
        width: f32,
        height: f32,
    ) -> Result<(), TreeError> {
        self.check(id)?;
        self.nodes[id.0]
            .item
            .set_explicit_size(ExplicitSize::new(width, height));
        Ok(())
    }

    pub fn set_layout_direction(
        &mut self,
        id: ItemId,
        direction: LayoutDirection,
    ) -> Result<(), TreeError> {
        self.check(id)?;
        self.nodes[id.0].item.set_layout(direction);
        Ok(())
    }

    /// Sets the explicit position of an item in its parent's coordinates.
    pub fn set_position(&mut self, id: ItemId, position: Point) -> Result<(), TreeError> {
        self.check(id)?;
        self.nodes[id.0].item.set_position(Some(position));
        Ok(())
    }

    pub fn geometry(&self, id: ItemId) -> ItemGeometry {
        self.nodes
            .get(id.0)
            .map(|node| node.geometry)
            .unwrap_or_default()
    }

    /// Replaces the geometry of every item at once. `geometry` is indexed by
    /// [`ItemId::index`]; items beyond its length keep their geometry.
    pub fn commit_geometry(&mut self, geometry: Vec<ItemGeometry>) {
        for (node, geometry) in self.nodes.iter_mut().zip(geometry) {
            node.geometry = geometry;
        }
    }

    /// Absolute position of an item's top-left corner.
    pub fn absolute_position(&self, id: ItemId) -> Point {
        let mut position = Point::default();
        let mut current = Some(id);
        while let Some(node) = current {
            position = position.add_point(self.geometry(node).position());
            current = self.parent(node);
        }
        position
    }

    /// Absolute bounds of an item's full (unclipped) box.
    pub fn absolute_bounds(&self, id: ItemId) -> Bounds {
        Bounds::new_from_top_left(self.absolute_position(id), self.geometry(id).size())
    }

    /// Absolute bounds of the visible part of an item.
    pub fn visible_bounds(&self, id: ItemId) -> Bounds {
        Bounds::new_from_top_left(
            self.absolute_position(id),
            self.geometry(id).visible_size(),
        )
    }

    fn check(&self, id: ItemId) -> Result<(), TreeError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(TreeError::UnknownItem(id.0))
        }
    }
}

impl Index<ItemId> for ItemTree {
    type Output = Item;

    fn index(&self, id: ItemId) -> &Self::Output {
        &self.nodes[id.0].item
    }
}

impl IndexMut<ItemId> for ItemTree {
    fn index_mut(&mut self, id: ItemId) -> &mut Self::Output {
        &mut self.nodes[id.0].item
    }
}
