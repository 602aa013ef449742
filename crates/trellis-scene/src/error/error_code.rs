//! Error codes for scene loading.
//!
//! Error codes are organized by category:
//! - `E1xx` - Document and schema errors
//! - `E2xx` - Reference errors

use std::fmt;

/// Error codes for categorizing load errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Document Errors (E1xx)
    // =========================================================================
    /// Invalid JSON.
    ///
    /// The document is not well-formed JSON.
    E100,

    /// Type mismatch.
    ///
    /// A field holds a JSON value of the wrong type (for instance a string
    /// where a number is expected).
    E101,

    /// Missing required field.
    ///
    /// A mandatory field, such as the `ref` of a link endpoint, is absent.
    E102,

    /// Invalid value.
    ///
    /// A field has the right JSON type but its value is not accepted: an
    /// unknown enumeration value, a malformed color or font, an odd number of
    /// coordinates.
    E103,

    /// Duplicate id.
    ///
    /// Two styles, or two items or links, share the same id.
    E104,

    // =========================================================================
    // Reference Errors (E2xx)
    // =========================================================================
    /// Unknown style.
    ///
    /// A style id was referenced that is not defined in `styles`.
    E200,

    /// Dangling reference.
    ///
    /// A link endpoint refers to an id that is not an item or a previously
    /// defined link of the same diagram.
    E201,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E100").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "invalid JSON",
            ErrorCode::E101 => "type mismatch",
            ErrorCode::E102 => "missing required field",
            ErrorCode::E103 => "invalid value",
            ErrorCode::E104 => "duplicate id",
            ErrorCode::E200 => "unknown style",
            ErrorCode::E201 => "dangling reference",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
