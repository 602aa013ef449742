//! Style definitions and their resolution.
//!
//! Documents describe styles as partial objects ([`StyleSpec`]): every field
//! is optional and only overrides what it names. The [`StyleTable`] holds the
//! named specs of a document and turns a style reference into a complete
//! [`Style`] by layering specs over the built-in defaults, lowest first:
//!
//! 1. built-in defaults ([`Style::default`]),
//! 2. the style named by the `style` field of `__default_props_<type>`,
//! 3. `__default_style_<type>`,
//! 4. the named style referenced by the item or link,
//! 5. the inline style object, if any.
//!
//! An inline object may carry an `id`, in which case it extends that named
//! style. Resolved styles are cached, so every item referring to the same
//! named style shares one allocation.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use trellis_core::{
    color::Color,
    style::{ArrowKind, HAlign, Style, StyleBuilder, SymbolKind, Underline},
};

use crate::{
    document::{Object, key_path},
    error::{ErrorCode, LoadError, Result},
    values,
};

/// Prefix of the ids holding default item attributes for one item type.
pub const DEFAULT_PROPS_PREFIX: &str = "__default_props_";
/// Prefix of the ids holding the default style for one item type.
pub const DEFAULT_STYLE_PREFIX: &str = "__default_style_";

fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A partial style as written in a document.
///
/// For color fields, `null` (like an empty string) explicitly removes the
/// color, while an absent field leaves the underlying layer untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSpec {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub stroke: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub fill: Option<Option<String>>,
    pub line_width: Option<f32>,
    pub dashes: Option<Vec<f32>>,
    pub sloppy: Option<bool>,
    pub font_name: Option<String>,
    pub font_underline: Option<i64>,
    pub font_strike: Option<bool>,
    pub font_color: Option<String>,
    pub font_line_spacing: Option<f32>,
    pub font_halign: Option<i64>,
    pub font_valign: Option<f32>,
    pub arrow_from: Option<i64>,
    pub arrow_from_length: Option<f32>,
    pub arrow_from_angle: Option<f32>,
    #[serde(default, deserialize_with = "nullable")]
    pub arrow_from_stroke: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub arrow_from_fill: Option<Option<String>>,
    pub arrow_from_width: Option<f32>,
    pub arrow_to: Option<i64>,
    pub arrow_to_length: Option<f32>,
    pub arrow_to_angle: Option<f32>,
    #[serde(default, deserialize_with = "nullable")]
    pub arrow_to_stroke: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub arrow_to_fill: Option<Option<String>>,
    pub arrow_to_width: Option<f32>,
    pub symbol_from: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub symbol_from_stroke: Option<Option<String>>,
    pub symbol_from_dist: Option<f32>,
    pub symbol_from_width: Option<f32>,
    pub symbol_to: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub symbol_to_stroke: Option<Option<String>>,
    pub symbol_to_dist: Option<f32>,
    pub symbol_to_width: Option<f32>,
}

/// How an item or a link refers to its style.
#[derive(Debug, Clone, Copy, Default)]
pub enum StyleRef<'a> {
    /// No style given: defaults only.
    #[default]
    Default,
    /// A reference to a named style.
    Named(&'a str),
    /// An inline style object.
    Inline(&'a StyleSpec),
}

/// Why a style could not be resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleError {
    UnknownId(String),
    InvalidValue { field: &'static str, message: String },
}

impl StyleError {
    /// Converts to a load error located at `path`.
    pub(crate) fn at(self, path: &str) -> LoadError {
        match self {
            Self::UnknownId(id) => LoadError::UnknownStyleId {
                id,
                path: path.to_string(),
            },
            Self::InvalidValue { field, message } => {
                LoadError::schema(ErrorCode::E103, key_path(path, field), message)
            }
        }
    }
}

type Overlay = std::result::Result<StyleBuilder, StyleError>;

fn invalid(field: &'static str) -> impl FnOnce(String) -> StyleError {
    move |message| StyleError::InvalidValue { field, message }
}

fn ordinal<T: TryFrom<i64>>(
    field: &'static str,
    value: i64,
) -> std::result::Result<T, StyleError> {
    T::try_from(value).map_err(|_| StyleError::InvalidValue {
        field,
        message: format!("{value} is not a valid value for `{field}`"),
    })
}

fn optional_color(
    field: &'static str,
    value: &Option<String>,
) -> std::result::Result<Option<Color>, StyleError> {
    match value {
        None => Ok(None),
        Some(value) => values::parse_color(value).map_err(invalid(field)),
    }
}

impl StyleSpec {
    /// Applies the fields set in this spec on top of `builder`.
    pub fn overlay(&self, mut builder: StyleBuilder) -> Overlay {
        if let Some(stroke) = &self.stroke {
            let paint = match stroke {
                Some(value) => values::parse_paint(value).map_err(invalid("stroke"))?,
                None => None,
            };
            builder = builder.with_stroke(paint);
        }
        if let Some(fill) = &self.fill {
            let paint = match fill {
                Some(value) => values::parse_paint(value).map_err(invalid("fill"))?,
                None => None,
            };
            builder = builder.with_fill(paint);
        }
        if let Some(width) = self.line_width {
            builder = builder.with_line_width(width);
        }
        if let Some(dashes) = &self.dashes {
            if dashes.iter().any(|dash| *dash < 0.0) {
                return Err(StyleError::InvalidValue {
                    field: "dashes",
                    message: "dash lengths must not be negative".to_string(),
                });
            }
            builder = builder.with_dashes(dashes.clone());
        }
        if let Some(sloppy) = self.sloppy {
            builder = builder.with_sloppy(sloppy);
        }
        if let Some(font) = &self.font_name {
            builder = builder.with_font(values::parse_font(font).map_err(invalid("fontName"))?);
        }
        if let Some(underline) = self.font_underline {
            builder = builder.with_font_underline(ordinal::<Underline>("fontUnderline", underline)?);
        }
        if let Some(strike) = self.font_strike {
            builder = builder.with_font_strike(strike);
        }
        if let Some(value) = &self.font_color {
            let font_color = Color::new(value).map_err(invalid("fontColor"))?;
            builder = builder.with_font_color(font_color);
        }
        if let Some(spacing) = self.font_line_spacing {
            builder = builder.with_font_line_spacing(spacing);
        }
        if let Some(halign) = self.font_halign {
            builder = builder.with_font_halign(ordinal::<HAlign>("fontHalign", halign)?);
        }
        if let Some(valign) = self.font_valign {
            builder = builder.with_font_valign(valign);
        }

        builder = self.overlay_arrows(builder)?;
        self.overlay_symbols(builder)
    }

    fn overlay_arrows(&self, mut builder: StyleBuilder) -> Overlay {
        let from_kind = self
            .arrow_from
            .map(|kind| ordinal::<ArrowKind>("arrowFrom", kind))
            .transpose()?;
        let from_stroke = self
            .arrow_from_stroke
            .as_ref()
            .map(|value| optional_color("arrowFromStroke", value))
            .transpose()?;
        let from_fill = self
            .arrow_from_fill
            .as_ref()
            .map(|value| optional_color("arrowFromFill", value))
            .transpose()?;
        builder = builder.with_arrow_from(|mut arrow| {
            if let Some(kind) = from_kind {
                arrow = arrow.with_kind(kind);
            }
            if let Some(length) = self.arrow_from_length {
                arrow = arrow.with_length(length);
            }
            if let Some(angle) = self.arrow_from_angle {
                arrow = arrow.with_angle(angle);
            }
            if let Some(stroke) = from_stroke {
                arrow = arrow.with_stroke(stroke);
            }
            if let Some(fill) = from_fill {
                arrow = arrow.with_fill(fill);
            }
            if let Some(width) = self.arrow_from_width {
                arrow = arrow.with_width(width);
            }
            arrow
        });

        let to_kind = self
            .arrow_to
            .map(|kind| ordinal::<ArrowKind>("arrowTo", kind))
            .transpose()?;
        let to_stroke = self
            .arrow_to_stroke
            .as_ref()
            .map(|value| optional_color("arrowToStroke", value))
            .transpose()?;
        let to_fill = self
            .arrow_to_fill
            .as_ref()
            .map(|value| optional_color("arrowToFill", value))
            .transpose()?;
        Ok(builder.with_arrow_to(|mut arrow| {
            if let Some(kind) = to_kind {
                arrow = arrow.with_kind(kind);
            }
            if let Some(length) = self.arrow_to_length {
                arrow = arrow.with_length(length);
            }
            if let Some(angle) = self.arrow_to_angle {
                arrow = arrow.with_angle(angle);
            }
            if let Some(stroke) = to_stroke {
                arrow = arrow.with_stroke(stroke);
            }
            if let Some(fill) = to_fill {
                arrow = arrow.with_fill(fill);
            }
            if let Some(width) = self.arrow_to_width {
                arrow = arrow.with_width(width);
            }
            arrow
        }))
    }

    fn overlay_symbols(&self, builder: StyleBuilder) -> Overlay {
        let from_kind = self
            .symbol_from
            .map(|kind| ordinal::<SymbolKind>("symbolFrom", kind))
            .transpose()?;
        let from_stroke = self
            .symbol_from_stroke
            .as_ref()
            .map(|value| optional_color("symbolFromStroke", value))
            .transpose()?;
        let to_kind = self
            .symbol_to
            .map(|kind| ordinal::<SymbolKind>("symbolTo", kind))
            .transpose()?;
        let to_stroke = self
            .symbol_to_stroke
            .as_ref()
            .map(|value| optional_color("symbolToStroke", value))
            .transpose()?;

        Ok(builder
            .with_symbol_from(|mut symbol| {
                if let Some(kind) = from_kind {
                    symbol = symbol.with_kind(kind);
                }
                if let Some(stroke) = from_stroke {
                    symbol = symbol.with_stroke(stroke);
                }
                if let Some(dist) = self.symbol_from_dist {
                    symbol = symbol.with_dist(dist);
                }
                if let Some(width) = self.symbol_from_width {
                    symbol = symbol.with_width(width);
                }
                symbol
            })
            .with_symbol_to(|mut symbol| {
                if let Some(kind) = to_kind {
                    symbol = symbol.with_kind(kind);
                }
                if let Some(stroke) = to_stroke {
                    symbol = symbol.with_stroke(stroke);
                }
                if let Some(dist) = self.symbol_to_dist {
                    symbol = symbol.with_dist(dist);
                }
                if let Some(width) = self.symbol_to_width {
                    symbol = symbol.with_width(width);
                }
                symbol
            }))
    }
}

/// Resolved styles are cached per item kind and reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Default(Option<String>),
    Named(Option<String>, String),
}

/// Named styles and per-type defaults of a document.
#[derive(Debug, Default)]
pub struct StyleTable {
    styles: IndexMap<String, StyleSpec>,
    item_defaults: IndexMap<String, Map<String, Value>>,
    cache: Mutex<HashMap<CacheKey, Arc<Style>>>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from the `styles` array of a document. Each entry is
    /// given with its JSON path.
    pub fn from_document(entries: &[(String, &Value)]) -> Result<Self> {
        let mut table = Self::new();
        for (path, value) in entries {
            let object = Object::new(value, path)?;
            let id: String = object.require("id")?;

            if let Some(kind) = id.strip_prefix(DEFAULT_PROPS_PREFIX) {
                if table.item_defaults.contains_key(kind) {
                    return Err(duplicate(&id, path));
                }
                let mut props = object.map().clone();
                props.remove("id");
                table.item_defaults.insert(kind.to_string(), props);
                continue;
            }

            let spec = StyleSpec::deserialize(*value).map_err(|err| {
                LoadError::schema(ErrorCode::E101, path.as_str(), err.to_string())
            })?;
            // Reject invalid values even for styles nobody uses.
            spec.overlay(Style::builder()).map_err(|err| err.at(path))?;
            if table.styles.contains_key(&id) {
                return Err(duplicate(&id, path));
            }
            table.styles.insert(id, spec);
        }

        debug!(
            styles = table.styles.len(),
            item_defaults = table.item_defaults.len();
            "Style table built"
        );
        Ok(table)
    }

    /// Adds or replaces a named style.
    pub fn insert(&mut self, id: impl Into<String>, spec: StyleSpec) {
        self.styles.insert(id.into(), spec);
        self.clear_cache();
    }

    /// Returns a named style spec.
    pub fn get(&self, id: &str) -> Option<&StyleSpec> {
        self.styles.get(id)
    }

    /// Ids of the named styles, in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    /// Default item attributes declared with `__default_props_<kind>`.
    pub fn item_defaults(&self, kind: &str) -> Option<&Map<String, Value>> {
        self.item_defaults.get(kind)
    }

    /// Resolves a style for an item of type `kind` (or for a link when
    /// `kind` is `None`).
    pub fn resolve(
        &self,
        kind: Option<&str>,
        style: StyleRef<'_>,
    ) -> std::result::Result<Arc<Style>, StyleError> {
        let named = match style {
            StyleRef::Default => None,
            StyleRef::Named(id) => Some(id),
            StyleRef::Inline(spec) => spec.id.as_deref(),
        };

        let kind_key = kind.map(str::to_string);
        let cache_key = match style {
            StyleRef::Default => Some(CacheKey::Default(kind_key)),
            StyleRef::Named(id) => Some(CacheKey::Named(kind_key, id.to_string())),
            StyleRef::Inline(_) => None,
        };
        if let Some(style) = cache_key.as_ref().and_then(|key| self.cached(key)) {
            return Ok(style);
        }

        let mut builder = Style::builder();
        for layer in self.default_layers(kind)? {
            builder = layer.overlay(builder)?;
        }
        if let Some(id) = named {
            let spec = self
                .styles
                .get(id)
                .ok_or_else(|| StyleError::UnknownId(id.to_string()))?;
            builder = spec.overlay(builder)?;
        }
        if let StyleRef::Inline(spec) = style {
            builder = spec.overlay(builder)?;
        }

        let resolved = Arc::new(builder.build());
        if let (Some(key), Ok(mut cache)) = (cache_key, self.cache.lock()) {
            cache.insert(key, Arc::clone(&resolved));
        }
        Ok(resolved)
    }

    /// The default layers applying to `kind`, lowest first.
    fn default_layers(
        &self,
        kind: Option<&str>,
    ) -> std::result::Result<Vec<StyleSpec>, StyleError> {
        let Some(kind) = kind else {
            return Ok(Vec::new());
        };

        let mut layers = Vec::new();
        if let Some(style) = self
            .item_defaults
            .get(kind)
            .and_then(|props| props.get("style"))
        {
            match style {
                Value::String(id) => layers.push(
                    self.styles
                        .get(id)
                        .cloned()
                        .ok_or_else(|| StyleError::UnknownId(id.clone()))?,
                ),
                other => {
                    let spec =
                        StyleSpec::deserialize(other).map_err(|err| StyleError::InvalidValue {
                            field: "style",
                            message: err.to_string(),
                        })?;
                    if let Some(base) = spec.id.as_deref() {
                        layers.push(
                            self.styles
                                .get(base)
                                .cloned()
                                .ok_or_else(|| StyleError::UnknownId(base.to_string()))?,
                        );
                    }
                    layers.push(spec);
                }
            }
        }
        if let Some(spec) = self.styles.get(&format!("{DEFAULT_STYLE_PREFIX}{kind}")) {
            layers.push(spec.clone());
        }
        Ok(layers)
    }

    fn cached(&self, key: &CacheKey) -> Option<Arc<Style>> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(key).cloned())
    }

    fn clear_cache(&mut self) {
        if let Ok(cache) = self.cache.get_mut() {
            cache.clear();
        }
    }
}

fn duplicate(id: &str, path: &str) -> LoadError {
    LoadError::schema(
        ErrorCode::E104,
        key_path(path, "id"),
        format!("style `{id}` is defined more than once"),
    )
}
