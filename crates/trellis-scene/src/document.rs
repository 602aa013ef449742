//! Typed access to the raw JSON document.
//!
//! The document is first parsed into a [`serde_json::Value`] so syntax
//! errors keep their line and column. Objects are then read field by field
//! through [`Object`], which deserializes each field with serde and reports
//! type mismatches with the exact JSON path of the field.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use trellis_core::geometry::{Insets, Point};

use crate::error::{ErrorCode, LoadError, Result};

/// Appends an object key to a JSON path.
pub(crate) fn key_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{base}.{key}")
    }
}

/// Appends an array index to a JSON path.
pub(crate) fn index_path(base: &str, index: usize) -> String {
    format!("{base}[{index}]")
}

/// A JSON object together with its path in the document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Object<'a> {
    map: &'a Map<String, Value>,
    path: &'a str,
}

impl<'a> Object<'a> {
    /// Views `value` as an object, failing with a type mismatch otherwise.
    pub(crate) fn new(value: &'a Value, path: &'a str) -> Result<Self> {
        value
            .as_object()
            .map(|map| Self { map, path })
            .ok_or_else(|| {
                LoadError::schema(
                    ErrorCode::E101,
                    path,
                    format!("expected an object, found {}", kind_of(value)),
                )
            })
    }

    pub(crate) fn path(&self) -> &'a str {
        self.path
    }

    pub(crate) fn map(&self) -> &'a Map<String, Value> {
        self.map
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Returns the raw value of a field; `null` counts as absent.
    pub(crate) fn raw(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|value| !value.is_null())
    }

    /// Deserializes an optional field.
    pub(crate) fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.raw(key) {
            None => Ok(None),
            Some(value) => T::deserialize(value).map(Some).map_err(|err| {
                LoadError::schema(ErrorCode::E101, key_path(self.path, key), err.to_string())
            }),
        }
    }

    /// Deserializes a mandatory field.
    pub(crate) fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.get(key)?.ok_or_else(|| {
            LoadError::schema(
                ErrorCode::E102,
                key_path(self.path, key),
                format!("missing required field `{key}`"),
            )
        })
    }

    /// Reads an integer enumeration field.
    pub(crate) fn ordinal<T: TryFrom<i64>>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get::<i64>(key)? else {
            return Ok(None);
        };
        T::try_from(raw).map(Some).map_err(|_| {
            LoadError::schema(
                ErrorCode::E103,
                key_path(self.path, key),
                format!("{raw} is not a valid value for `{key}`"),
            )
        })
    }

    /// Reads an array field, returning each element with its path.
    pub(crate) fn array(&self, key: &str) -> Result<Vec<(String, &'a Value)>> {
        match self.raw(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(values)) => {
                let base = key_path(self.path, key);
                Ok(values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| (index_path(&base, index), value))
                    .collect())
            }
            Some(other) => Err(LoadError::schema(
                ErrorCode::E101,
                key_path(self.path, key),
                format!("expected an array, found {}", kind_of(other)),
            )),
        }
    }

    /// Like [`Object::array`], but an empty object also reads as an empty
    /// array.
    pub(crate) fn array_or_empty(&self, key: &str) -> Result<Vec<(String, &'a Value)>> {
        match self.raw(key) {
            Some(Value::Object(map)) if map.is_empty() => Ok(Vec::new()),
            _ => self.array(key),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Margins around a child: one value for all sides, or top, right, bottom
/// and left.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum MarginSpec {
    Uniform(f32),
    Sides([f32; 4]),
}

impl From<MarginSpec> for Insets {
    fn from(margin: MarginSpec) -> Self {
        match margin {
            MarginSpec::Uniform(value) => Insets::uniform(value),
            MarginSpec::Sides([top, right, bottom, left]) => Insets::new(top, right, bottom, left),
        }
    }
}

/// Link waypoints: a flat coordinate list, or an object with a `relative`
/// flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum WaypointsSpec {
    Flat(Vec<f32>),
    Object {
        points: Vec<f32>,
        #[serde(default)]
        relative: bool,
    },
}

/// Groups a flat coordinate list into points.
pub(crate) fn pair_points(coords: &[f32], path: &str) -> Result<Vec<Point>> {
    if coords.len() % 2 != 0 {
        return Err(LoadError::schema(
            ErrorCode::E103,
            path,
            format!("expected pairs of coordinates, found {} values", coords.len()),
        ));
    }
    Ok(coords
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(key_path("", "styles"), "styles");
        assert_eq!(index_path("diagrams", 2), "diagrams[2]");
        assert_eq!(key_path("diagrams[2]", "items"), "diagrams[2].items");
    }

    #[test]
    fn test_object_get_type_mismatch() {
        let value = json!({"minWidth": "wide"});
        let object = Object::new(&value, "items[0]").unwrap();
        let err = object.get::<f32>("minWidth").unwrap_err();
        assert_eq!(err.code(), ErrorCode::E101);
        assert_eq!(err.path(), "items[0].minWidth");
    }

    #[test]
    fn test_object_null_is_absent() {
        let value = json!({"x": null});
        let object = Object::new(&value, "").unwrap();
        assert_eq!(object.get::<f32>("x").unwrap(), None);
        assert!(!object.contains("x"));
    }

    #[test]
    fn test_object_require() {
        let value = json!({});
        let object = Object::new(&value, "from").unwrap();
        let err = object.require::<String>("ref").unwrap_err();
        assert_eq!(err.code(), ErrorCode::E102);
        assert_eq!(err.path(), "from.ref");
    }

    #[test]
    fn test_array_or_empty_accepts_empty_object() {
        let value = json!({"styles": {}, "other": {"a": 1}});
        let object = Object::new(&value, "").unwrap();
        assert!(object.array_or_empty("styles").unwrap().is_empty());
        assert!(object.array("styles").is_err());
        assert_eq!(object.array_or_empty("other").unwrap_err().code(), ErrorCode::E101);
    }

    #[test]
    fn test_not_an_object() {
        let value = json!([1, 2]);
        assert!(Object::new(&value, "styles[0]").is_err());
    }

    #[test]
    fn test_margin_forms() {
        let uniform: MarginSpec = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(Insets::from(uniform), Insets::uniform(4.0));

        let sides: MarginSpec = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
        assert_eq!(Insets::from(sides), Insets::new(1.0, 2.0, 3.0, 4.0));

        assert!(serde_json::from_value::<MarginSpec>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_waypoint_forms() {
        let flat: WaypointsSpec = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
        assert_eq!(flat, WaypointsSpec::Flat(vec![1.0, 2.0, 3.0, 4.0]));

        let object: WaypointsSpec =
            serde_json::from_value(json!({"points": [1, 2], "relative": true})).unwrap();
        assert_eq!(
            object,
            WaypointsSpec::Object {
                points: vec![1.0, 2.0],
                relative: true
            }
        );
    }

    #[test]
    fn test_pair_points() {
        let points = pair_points(&[0.0, 1.0, 2.0, 3.0], "points").unwrap();
        assert_eq!(points, vec![Point::new(0.0, 1.0), Point::new(2.0, 3.0)]);
        assert_eq!(
            pair_points(&[0.0], "points").unwrap_err().code(),
            ErrorCode::E103
        );
    }
}
