//! Trellis scene loader.
//!
//! Loads the declarative JSON scene format into a [`StyleTable`] and a list
//! of [`Diagram`]s ready for layout.
//!
//! # Document format
//!
//! ```json
//! {
//!   "styles": [
//!     {"id": "__default_props_text", "margin": [0, 5, 0, 5]},
//!     {"id": "title", "fontName": "sans bold 10", "fill": "#eef"}
//!   ],
//!   "diagrams": [{
//!     "items": [
//!       {"id": "A", "x": 10, "y": 10, "vbox": [{"text": "Name", "style": "title"}]},
//!       {"id": "B", "x": 200, "y": 10, "text": "Other"}
//!     ],
//!     "links": [{"from": {"ref": "A"}, "to": {"ref": "B"}, "route": 1}]
//!   }]
//! }
//! ```
//!
//! Loading is all-or-nothing: any error aborts the load.
//!
//! # Example
//!
//! ```
//! let scene = trellis_scene::load(r#"{"diagrams": [{"items": [{"text": "hi"}]}]}"#).unwrap();
//! assert_eq!(scene.diagrams().len(), 1);
//! ```

mod document;
pub mod error;
mod loader;
pub mod styles;
mod values;

use log::info;
use serde_json::Value;

use trellis_core::diagram::Diagram;

pub use error::{ErrorCode, LoadError, Location};
pub use styles::{StyleRef, StyleSpec, StyleTable};
pub use values::{parse_font, parse_paint};

use document::Object;
use loader::{DiagramLoader, DocumentIds};

/// A loaded document: its styles and its diagrams.
#[derive(Debug)]
pub struct Scene {
    styles: StyleTable,
    diagrams: Vec<Diagram>,
}

impl Scene {
    pub fn styles(&self) -> &StyleTable {
        &self.styles
    }

    pub fn diagrams(&self) -> &[Diagram] {
        &self.diagrams
    }

    /// Splits the scene into its style table and diagrams.
    pub fn into_parts(self) -> (StyleTable, Vec<Diagram>) {
        (self.styles, self.diagrams)
    }
}

/// Loads a scene from JSON source text.
///
/// # Errors
///
/// Returns a [`LoadError`] when the text is not valid JSON, when it does not
/// follow the document schema, or when a style or link reference cannot be
/// resolved.
pub fn load(source: &str) -> Result<Scene, LoadError> {
    let value: Value = serde_json::from_str(source).map_err(|err| LoadError::syntax(&err))?;
    load_value(&value)
}

/// Loads a scene from an already parsed JSON value.
pub fn load_value(value: &Value) -> Result<Scene, LoadError> {
    let root = Object::new(value, "")?;

    let style_entries = root.array_or_empty("styles")?;
    let styles = StyleTable::from_document(&style_entries)?;

    let mut ids = DocumentIds::default();
    let diagrams = root
        .array("diagrams")?
        .into_iter()
        .map(|(path, diagram)| DiagramLoader::new(&styles, &mut ids).load(diagram, &path))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        styles = style_entries.len(),
        diagrams = diagrams.len();
        "Scene loaded"
    );
    Ok(Scene { styles, diagrams })
}
