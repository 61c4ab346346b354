//! CLI logic for the Drafter sketch tool.
//!
//! This module loads a draft from disk, evaluates one of its sources and
//! writes the rendered output.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::Path};

use log::{debug, info};

use drafter::{Draft, DraftError, export::Format};

/// Run the Drafter CLI application
///
/// This function loads the input draft, renders the selected source in the
/// requested format and writes the result to the output file or stdout.
///
/// # Errors
///
/// Returns `DraftError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed documents
/// - Evaluation errors
/// - Export errors, including an unknown format or render option
pub fn run(args: &Args) -> Result<(), DraftError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing draft"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let format: Format = args.format.parse()?;

    let draft = Draft::load(&args.input, app_config)?;
    let source = select_source(&draft, &args.input, args.source.as_deref())?;
    debug!(source, format:%; "Source selected");

    let output = draft.render(source, &args.values(), format, &args.render_options())?;

    match &args.output {
        Some(path) => {
            fs::write(path, output)?;
            info!(output_file = path, format:%; "Sketch exported successfully");
        }
        None => println!("{output}"),
    }

    Ok(())
}

/// Pick the source to render: the explicit one, the only source of the
/// draft, or the source named after the input path.
fn select_source<'a>(
    draft: &'a Draft,
    input: &'a str,
    explicit: Option<&'a str>,
) -> Result<&'a str, DraftError> {
    if let Some(name) = explicit {
        return Ok(name);
    }

    let mut sources = draft.sources();
    if let (Some(only), None) = (sources.next(), sources.next()) {
        return Ok(only);
    }

    let name = input_name(Path::new(input))
        .ok_or_else(|| DraftError::UnknownSource(input.to_string()))?;
    draft
        .sources()
        .find(|source| *source == name)
        .ok_or_else(|| DraftError::UnknownSource(name.to_string()))
}

/// Name of the draft at `path` up to the first dot. An `index.json` path
/// names its directory.
fn input_name(path: &Path) -> Option<&str> {
    let path = if path.file_name().is_some_and(|name| name == "index.json") {
        path.parent()?
    } else {
        path
    };
    let file_name = path.file_name()?.to_str()?;
    file_name.split('.').next().filter(|name| !name.is_empty())
}
