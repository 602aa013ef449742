//! Trellis CLI library
//!
//! This module contains the core CLI logic for the Trellis diagram tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use error_adapter::to_reportable;

use std::fs;

use log::info;

use trellis::{DiagramBuilder, TrellisError};

/// Run the Trellis CLI application
///
/// This function loads the input document, renders the selected diagram
/// and writes the resulting SVG to the output file.
///
/// # Errors
///
/// Returns `TrellisError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Document loading errors
/// - Routing errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), TrellisError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        diagram = args.diagram;
        "Processing document"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let (_, mut diagrams) = builder.load(&source)?.into_parts();
    let count = diagrams.len();
    let diagram = diagrams
        .get_mut(args.diagram)
        .ok_or(TrellisError::NoSuchDiagram {
            index: args.diagram,
            count,
        })?;

    let svg = builder.render_svg(diagram)?;

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
