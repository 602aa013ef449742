//! Errors reported while loading a scene document.
//!
//! Loading is all-or-nothing: the first error aborts the load and no
//! diagram is returned. Every error carries the JSON path of the offending
//! value (for instance `diagrams[0].items[2].vbox[1].margin`) and a stable
//! [`ErrorCode`].

mod error_code;

use thiserror::Error;

pub use error_code::ErrorCode;

/// Line and column (both 1-based) of an error in the document source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Error type for scene loading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The document is malformed or does not follow the schema.
    #[error("{message}")]
    SchemaViolation {
        code: ErrorCode,
        path: String,
        message: String,
        location: Option<Location>,
    },

    /// A style reference cannot be resolved.
    #[error("unknown style `{id}`")]
    UnknownStyleId { id: String, path: String },

    /// A link endpoint refers to something that does not exist.
    #[error("`{id}` does not name an item or a previously defined link")]
    DanglingReference { id: String, path: String },
}

impl LoadError {
    pub(crate) fn schema(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            code,
            path: path.into(),
            message: message.into(),
            location: None,
        }
    }

    pub(crate) fn syntax(err: &serde_json::Error) -> Self {
        Self::SchemaViolation {
            code: ErrorCode::E100,
            path: String::new(),
            message: err.to_string(),
            location: Some(Location {
                line: err.line(),
                column: err.column(),
            }),
        }
    }

    /// The error code of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SchemaViolation { code, .. } => *code,
            Self::UnknownStyleId { .. } => ErrorCode::E200,
            Self::DanglingReference { .. } => ErrorCode::E201,
        }
    }

    /// JSON path of the offending value. Empty for syntax errors.
    pub fn path(&self) -> &str {
        match self {
            Self::SchemaViolation { path, .. }
            | Self::UnknownStyleId { path, .. }
            | Self::DanglingReference { path, .. } => path,
        }
    }

    /// Source location, known for syntax errors only.
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::SchemaViolation { location, .. } => *location,
            _ => None,
        }
    }

    /// Suggestion for fixing the error.
    pub fn help(&self) -> Option<&'static str> {
        match self.code() {
            ErrorCode::E100 => Some("check for missing commas, quotes or brackets"),
            ErrorCode::E102 => Some("link endpoints need a `ref` naming an item or link id"),
            ErrorCode::E104 => Some("ids must be unique within a document"),
            ErrorCode::E200 => Some("define the style in the top-level `styles` list"),
            ErrorCode::E201 => Some("links may only refer to items, or to links defined before them"),
            ErrorCode::E101 | ErrorCode::E103 => None,
        }
    }
}

/// A type alias for `Result<T, LoadError>`.
pub type Result<T> = std::result::Result<T, LoadError>;
