//! Diagrams: top-level items plus the links between them.

use crate::{
    geometry::{Bounds, Point},
    item::Item,
    link::{Link, LinkId},
    tree::{ItemId, ItemTree},
};

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    top: ItemId,
    item: ItemId,
    local: Point,
}

impl Hit {
    /// The top-level item containing the point.
    pub fn top(&self) -> ItemId {
        self.top
    }

    /// The innermost item containing the point.
    pub fn item(&self) -> ItemId {
        self.item
    }

    /// The point in the coordinates of [`Hit::item`].
    pub fn local(&self) -> Point {
        self.local
    }
}

/// A set of top-level items and links, owning every item through its tree.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    tree: ItemTree,
    roots: Vec<ItemId>,
    links: Vec<Link>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ItemTree {
        &mut self.tree
    }

    /// Adds a top-level item. Unless it has an explicit position it is
    /// placed at the origin.
    pub fn add_root(&mut self, item: Item) -> ItemId {
        let id = self.tree.insert(item);
        self.roots.push(id);
        id
    }

    /// Adds an item that is not yet part of the diagram's top-level list,
    /// typically a future child or a link label.
    pub fn add_detached(&mut self, item: Item) -> ItemId {
        self.tree.insert(item)
    }

    /// Adds a link. Endpoints are checked when links are routed.
    pub fn add_link(&mut self, link: Link) -> LinkId {
        self.links.push(link);
        LinkId::new(self.links.len() - 1)
    }

    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    /// Label items of all links, in link order.
    pub fn label_items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.links.iter().flat_map(Link::labels)
    }

    /// Finds the innermost item containing `point`.
    ///
    /// Link labels are drawn above items and are tested first; then roots
    /// are tested from the last drawn to the first. Within a root the
    /// deepest visible child containing the point wins.
    pub fn item_at(&self, point: Point) -> Option<Hit> {
        let labels: Vec<ItemId> = self.label_items().collect();
        labels
            .iter()
            .rev()
            .chain(self.roots.iter().rev())
            .find_map(|&top| self.hit_in(top, point))
    }

    /// Bounds of all visible top-level items and labels, or `None` for an
    /// empty diagram.
    pub fn bounds(&self) -> Option<Bounds> {
        self.roots
            .iter()
            .copied()
            .chain(self.label_items())
            .map(|id| self.tree.visible_bounds(id))
            .reduce(|acc, bounds| acc.merge(&bounds))
    }

    fn hit_in(&self, top: ItemId, point: Point) -> Option<Hit> {
        if !self.tree.visible_bounds(top).contains(point) {
            return None;
        }

        let mut item = top;
        'descend: loop {
            for child in self.tree.children(item).iter().rev() {
                let bounds = self.tree.visible_bounds(child.item());
                if bounds.contains(point) {
                    item = child.item();
                    continue 'descend;
                }
            }
            break;
        }

        Some(Hit {
            top,
            item,
            local: point.sub_point(self.tree.absolute_position(item)),
        })
    }
}
