//! Error types for Trellis operations.
//!
//! This module provides the main error type [`TrellisError`] which wraps
//! the errors of every stage of diagram processing.

use std::io;

use thiserror::Error;

use trellis_core::tree::TreeError;
use trellis_scene::LoadError;

use crate::routing::RouteError;

/// The main error type for Trellis operations.
///
/// # Diagnostic Variants
///
/// The `Load` variant keeps the document source next to the structured
/// [`LoadError`], so that front ends can point at the offending line.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Load { err: LoadError, src: String },

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Routing error: {0}")]
    Route(#[from] RouteError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),

    #[error("Diagram {index} not found, the document has {count} diagram(s)")]
    NoSuchDiagram { index: usize, count: usize },
}

impl From<crate::export::Error> for TrellisError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl TrellisError {
    /// Create a new `Load` error with the associated document source.
    pub fn new_load_error(err: LoadError, src: impl Into<String>) -> Self {
        Self::Load {
            err,
            src: src.into(),
        }
    }
}
