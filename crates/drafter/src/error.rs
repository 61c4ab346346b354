//! Error types for Drafter operations.
//!
//! This module provides the main error type [`DraftError`] which wraps
//! every failure that can occur while loading, evaluating and rendering
//! sketches.

use std::{io, path::PathBuf};

use thiserror::Error;

use drafter_parser::ParseError;

/// The main error type for Drafter operations.
///
/// # Diagnostic Variants
///
/// The `MalformedDocument` variant carries the parser's diagnostics together
/// with the document text, so callers can render source snippets.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no source named `{0}`")]
    UnknownSource(String),

    /// A file given to the loader is not a sketch document.
    #[error("unsupported source file `{}`, expected a .yaml or .yml document", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("malformed document `{name}`: {err}")]
    MalformedDocument {
        name: String,
        err: ParseError,
        src: String,
    },

    #[error("failed to evaluate `{name}`: {source}")]
    Evaluate {
        name: String,
        source: drafter_core::Error,
    },

    #[error("Export error: {0}")]
    Export(#[from] crate::export::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DraftError {
    /// Create a new `MalformedDocument` error with the associated source text.
    pub fn malformed_document(
        name: impl Into<String>,
        err: ParseError,
        src: impl Into<String>,
    ) -> Self {
        Self::MalformedDocument {
            name: name.into(),
            err,
            src: src.into(),
        }
    }
}
