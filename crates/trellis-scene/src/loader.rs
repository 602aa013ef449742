//! Builds diagrams from a parsed document.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use serde::Deserialize;
use serde_json::{Map, Value};

use trellis_core::{
    diagram::Diagram,
    geometry::{Insets, Point, Size},
    identifier::Id,
    item::{Align, ExplicitSize, Item, ItemKind, LayoutDirection, Overflow, Placement, TextArrow},
    link::{EndpointRef, Link, LinkEnd, Routing, Side, Waypoints},
    tree::ItemId,
};

use crate::{
    document::{MarginSpec, Object, WaypointsSpec, key_path, pair_points},
    error::{ErrorCode, LoadError, Result},
    styles::{StyleRef, StyleSpec, StyleTable},
};

/// Item types accepted in the `type` field.
const ITEM_TYPES: &[&str] = &["rect", "ellipse", "polyline", "text", "hr"];

/// Item attributes never inherited from `__default_props_<type>`.
const NON_INHERITED: &[&str] = &["style", "vbox", "hbox"];

/// Ids already used anywhere in the document.
#[derive(Debug, Default)]
pub(crate) struct DocumentIds {
    seen: HashSet<String>,
}

impl DocumentIds {
    fn claim(&mut self, id: &str, path: &str) -> Result<()> {
        if self.seen.insert(id.to_string()) {
            Ok(())
        } else {
            Err(LoadError::schema(
                ErrorCode::E104,
                key_path(path, "id"),
                format!("id `{id}` is used more than once"),
            ))
        }
    }
}

/// Loads the items and links of one diagram.
pub(crate) struct DiagramLoader<'a> {
    styles: &'a StyleTable,
    document_ids: &'a mut DocumentIds,
    diagram: Diagram,
    endpoints: HashMap<String, EndpointRef>,
}

impl<'a> DiagramLoader<'a> {
    pub(crate) fn new(styles: &'a StyleTable, document_ids: &'a mut DocumentIds) -> Self {
        Self {
            styles,
            document_ids,
            diagram: Diagram::new(),
            endpoints: HashMap::new(),
        }
    }

    /// Loads a `{items, links}` object.
    pub(crate) fn load(mut self, value: &Value, path: &str) -> Result<Diagram> {
        let object = Object::new(value, path)?;

        for (item_path, item) in object.array("items")? {
            self.load_item(item, &item_path, true)?;
        }
        // Links may refer to items anywhere in the diagram, but only to links
        // defined before them.
        for (link_path, link) in object.array("links")? {
            self.load_link(link, &link_path)?;
        }

        debug!(
            path,
            items = self.diagram.tree().len(),
            links = self.diagram.links().len();
            "Diagram loaded"
        );
        Ok(self.diagram)
    }

    /// Loads an item and its children. Returns the item and its placement
    /// attributes, which only matter when the item is a child.
    fn load_item(
        &mut self,
        value: &Value,
        path: &str,
        root: bool,
    ) -> Result<(ItemId, Placement)> {
        let own = Object::new(value, path)?;
        let kind_name = item_type(&own)?;

        let merged = self.with_defaults(own, &kind_name);
        let object = match &merged {
            Some(merged) => Object::new(merged, path)?,
            None => own,
        };

        let kind = item_kind(&object, &kind_name)?;
        let style_ref = style_ref(&object)?;
        let style = self
            .styles
            .resolve(Some(&kind_name), style_ref.borrowed())
            .map_err(|err| err.at(&key_path(path, "style")))?;

        let mut item = Item::new(kind, style);

        let doc_id: Option<String> = object.get("id")?;
        if let Some(doc_id) = &doc_id {
            self.document_ids.claim(doc_id, path)?;
            item = item.with_id(Id::new(doc_id));
        }
        if let Some(data) = object.raw("data") {
            item = item.with_data(data.clone());
        }
        let x: Option<f32> = object.get("x")?;
        let y: Option<f32> = object.get("y")?;
        if x.is_some() || y.is_some() {
            item = item.with_position(Point::new(x.unwrap_or(0.0), y.unwrap_or(0.0)));
        }
        let width: Option<f32> = object.get("width")?;
        let height: Option<f32> = object.get("height")?;
        item = item.with_explicit_size(ExplicitSize::new(
            width.unwrap_or(-1.0),
            height.unwrap_or(-1.0),
        ));
        let min_width: Option<f32> = object.get("minWidth")?;
        let min_height: Option<f32> = object.get("minHeight")?;
        item = item.with_min_size(Size::new(
            min_width.unwrap_or(0.0),
            min_height.unwrap_or(0.0),
        ));

        let (direction, children_key) = if object.contains("vbox") {
            (LayoutDirection::Vertical, Some("vbox"))
        } else if object.contains("hbox") {
            (LayoutDirection::Horizontal, Some("hbox"))
        } else {
            (LayoutDirection::default(), None)
        };
        item = item.with_layout(direction);

        let placement = placement(&object)?;
        let id = if root {
            self.diagram.add_root(item)
        } else {
            self.diagram.add_detached(item)
        };
        trace!(path, kind = kind_name.as_str(), root; "Item loaded");

        if let Some(key) = children_key {
            for (child_path, child) in object.array(key)? {
                let (child_id, child_placement) = self.load_item(child, &child_path, false)?;
                self.diagram
                    .tree_mut()
                    .add_child(id, child_id, child_placement)
                    .map_err(|err| {
                        LoadError::schema(ErrorCode::E103, child_path, err.to_string())
                    })?;
            }
        }

        if let Some(doc_id) = doc_id {
            self.endpoints.insert(doc_id, EndpointRef::Item(id));
        }
        Ok((id, placement))
    }

    /// Merges `__default_props_<type>` under the item's own fields.
    fn with_defaults(&self, own: Object<'_>, kind_name: &str) -> Option<Value> {
        let defaults = self.styles.item_defaults(kind_name)?;
        let mut merged: Map<String, Value> = defaults
            .iter()
            .filter(|(key, _)| !NON_INHERITED.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (key, value) in own.map() {
            merged.insert(key.clone(), value.clone());
        }
        Some(Value::Object(merged))
    }

    fn load_link(&mut self, value: &Value, path: &str) -> Result<()> {
        let object = Object::new(value, path)?;

        let doc_id: Option<String> = object.get("id")?;
        if let Some(doc_id) = &doc_id {
            self.document_ids.claim(doc_id, path)?;
        }

        let from = self.load_end(&object, "from")?;
        let to = self.load_end(&object, "to")?;

        let style_ref = style_ref(&object)?;
        let style = self
            .styles
            .resolve(None, style_ref.borrowed())
            .map_err(|err| err.at(&key_path(path, "style")))?;

        let mut link = Link::new(from, to, style)
            .with_routing(object.ordinal::<Routing>("route")?.unwrap_or_default());
        if let Some(doc_id) = &doc_id {
            link = link.with_id(Id::new(doc_id));
        }
        if let Some(label) = object.raw("label") {
            let (label, _) = self.load_item(label, &key_path(path, "label"), false)?;
            link = link.with_label(label);
        }
        if let Some(waypoints) = object.get::<WaypointsSpec>("waypoints")? {
            let waypoints_path = key_path(path, "waypoints");
            link = link.with_waypoints(match waypoints {
                WaypointsSpec::Flat(coords) => {
                    Waypoints::absolute(pair_points(&coords, &waypoints_path)?)
                }
                WaypointsSpec::Object { points, relative } => {
                    let points = pair_points(&points, &key_path(&waypoints_path, "points"))?;
                    if relative {
                        Waypoints::relative(points)
                    } else {
                        Waypoints::absolute(points)
                    }
                }
            });
        }

        let link_id = self.diagram.add_link(link);
        if let Some(doc_id) = doc_id {
            self.endpoints.insert(doc_id, EndpointRef::Link(link_id));
        }
        trace!(path, link = link_id.index(); "Link loaded");
        Ok(())
    }

    fn load_end(&mut self, link: &Object<'_>, key: &str) -> Result<LinkEnd> {
        let path = key_path(link.path(), key);
        let value = link.raw(key).ok_or_else(|| {
            LoadError::schema(
                ErrorCode::E102,
                path.as_str(),
                format!("missing required field `{key}`"),
            )
        })?;
        let object = Object::new(value, &path)?;

        let reference: String = object.require("ref")?;
        let target = *self.endpoints.get(&reference).ok_or_else(|| {
            LoadError::DanglingReference {
                id: reference.clone(),
                path: key_path(&path, "ref"),
            }
        })?;

        let anchor_x: Option<f32> = object.get("anchorx")?;
        let anchor_y: Option<f32> = object.get("anchory")?;
        let mut end = LinkEnd::new(target)
            .with_anchor(anchor_x.unwrap_or(0.5), anchor_y.unwrap_or(0.5))
            .with_side(object.ordinal::<Side>("side")?.unwrap_or_default());

        if let Some(label) = object.raw("label") {
            let (label, _) = self.load_item(label, &key_path(&path, "label"), false)?;
            end = end.with_label(label);
        }
        Ok(end)
    }
}

/// The item type: explicit, or guessed from the fields present.
fn item_type(object: &Object<'_>) -> Result<String> {
    match object.get::<String>("type")? {
        Some(kind) if ITEM_TYPES.contains(&kind.as_str()) => Ok(kind),
        Some(kind) => Err(LoadError::schema(
            ErrorCode::E103,
            key_path(object.path(), "type"),
            format!("unknown item type `{kind}`"),
        )),
        None if object.contains("text") => Ok("text".to_string()),
        None if object.contains("points") => Ok("polyline".to_string()),
        None => Ok("rect".to_string()),
    }
}

fn item_kind(object: &Object<'_>, kind_name: &str) -> Result<ItemKind> {
    Ok(match kind_name {
        "ellipse" => ItemKind::Ellipse,
        "polyline" => {
            let coords: Vec<f32> = object.get("points")?.unwrap_or_default();
            ItemKind::Polyline {
                points: pair_points(&coords, &key_path(object.path(), "points"))?,
                close: object.get("close")?.unwrap_or(false),
                relative: object.get("relative")?.unwrap_or(false),
            }
        }
        "text" => ItemKind::Text {
            text: object.get("text")?.unwrap_or_default(),
            directed: object.ordinal::<TextArrow>("directed")?.unwrap_or_default(),
        },
        "hr" => ItemKind::Hr {
            text: object.get("text")?.unwrap_or_default(),
        },
        _ => ItemKind::Rect {
            radius: object.get::<f32>("radius")?.unwrap_or(0.0).max(0.0),
        },
    })
}

/// Owned form of a style reference read from an object.
enum OwnedStyleRef {
    Default,
    Named(String),
    Inline(Box<StyleSpec>),
}

impl OwnedStyleRef {
    fn borrowed(&self) -> StyleRef<'_> {
        match self {
            Self::Default => StyleRef::Default,
            Self::Named(id) => StyleRef::Named(id),
            Self::Inline(spec) => StyleRef::Inline(spec),
        }
    }
}

fn style_ref(object: &Object<'_>) -> Result<OwnedStyleRef> {
    let path = key_path(object.path(), "style");
    match object.raw("style") {
        None => Ok(OwnedStyleRef::Default),
        Some(Value::String(id)) => Ok(OwnedStyleRef::Named(id.clone())),
        Some(value @ Value::Object(_)) => StyleSpec::deserialize(value)
            .map(|spec| OwnedStyleRef::Inline(Box::new(spec)))
            .map_err(|err| LoadError::schema(ErrorCode::E101, path, err.to_string())),
        Some(_) => Err(LoadError::schema(
            ErrorCode::E101,
            path,
            "expected a style id or a style object",
        )),
    }
}

fn placement(object: &Object<'_>) -> Result<Placement> {
    let margin: Insets = object
        .get::<MarginSpec>("margin")?
        .map(Insets::from)
        .unwrap_or_default();
    Ok(Placement::new()
        .with_margin(margin)
        .with_align(object.ordinal::<Align>("align")?.unwrap_or_default())
        .with_floating(object.get("float")?.unwrap_or(false))
        .with_overflow(object.ordinal::<Overflow>("overflow")?.unwrap_or_default()))
}
