//! Renderers that turn a scene graph into text.
//!
//! This is the final stage of the pipeline:
//!
//! ```text
//! Source (document or function)
//!     ↓ evaluate
//! Scene graph (Node)
//!     ↓ render (this module)
//! Output text
//! ```
//!
//! # Available Formats
//!
//! - [`Format::Svg`] - vector markup, hidden nodes skipped, styles resolved
//! - [`Format::Json`] - the visible scene graph as structured data
//! - [`Format::Debug`] - an indented dump of every node, hidden ones included
//!
//! # Options
//!
//! [`Options`] is a flat string map that overrides the configuration for a
//! single call. Recognized keys are `padding`, `background`, `precision`
//! and `pretty`.

mod debug;
mod json;
mod svg;

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use log::{debug, info};
use thiserror::Error;

use drafter_core::{Node, color::Color};

use crate::config::AppConfig;

/// Per-call render options, keyed by option name.
pub type Options = IndexMap<String, String>;

/// Output format of [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Svg,
    Json,
    Debug,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svg" => Ok(Self::Svg),
            "json" => Ok(Self::Json),
            "debug" => Ok(Self::Debug),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Svg => "svg",
            Self::Json => "json",
            Self::Debug => "debug",
        })
    }
}

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown format `{0}`, expected svg, json or debug")]
    UnknownFormat(String),

    #[error("invalid value `{value}` for option `{name}`: {reason}")]
    InvalidOption {
        name: String,
        value: String,
        reason: String,
    },

    /// A rendering failure described by a message.
    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    fn invalid_option(name: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Render `root` in `format`.
///
/// # Errors
///
/// Returns [`Error::InvalidOption`] for an unknown option or a value that
/// does not parse, and [`Error::Render`] if the configuration holds an
/// invalid color. Nothing is returned on failure, not even partial output.
pub fn render(
    root: &Node,
    format: Format,
    options: &Options,
    config: &AppConfig,
) -> Result<String, Error> {
    let settings = Settings::resolve(options, config)?;
    info!(format:% = format, nodes = root.node_count(); "Rendering sketch");

    let output = match format {
        Format::Svg => svg::render(root, &settings),
        Format::Json => json::render(root, settings.pretty)?,
        Format::Debug => debug::render(root),
    };

    debug!(bytes = output.len(); "Rendered");
    Ok(output)
}

/// Configuration merged with the per-call options.
#[derive(Debug, Clone)]
struct Settings {
    padding: f64,
    background: Option<Color>,
    precision: usize,
    stroke: Color,
    stroke_width: f64,
    fill: Color,
    pretty: bool,
}

impl Settings {
    fn resolve(options: &Options, config: &AppConfig) -> Result<Self, Error> {
        let svg = config.svg();
        let mut settings = Self {
            padding: svg.padding(),
            background: svg.background().map_err(Error::Render)?,
            precision: svg.precision(),
            stroke: svg.stroke().map_err(Error::Render)?,
            stroke_width: svg.stroke_width(),
            fill: svg.fill().map_err(Error::Render)?,
            pretty: config.json().pretty(),
        };

        for (name, value) in options {
            let invalid = |reason: String| Error::invalid_option(name, value, reason);
            match name.as_str() {
                "padding" => {
                    settings.padding = value
                        .parse::<f64>()
                        .ok()
                        .filter(|p| p.is_finite() && *p >= 0.0)
                        .ok_or_else(|| invalid("expected a non-negative number".to_string()))?;
                }
                "background" => settings.background = Some(Color::new(value).map_err(invalid)?),
                "precision" => {
                    settings.precision = value
                        .parse()
                        .map_err(|err: std::num::ParseIntError| invalid(err.to_string()))?;
                }
                "pretty" => {
                    settings.pretty = value
                        .parse()
                        .map_err(|err: std::str::ParseBoolError| invalid(err.to_string()))?;
                }
                _ => return Err(invalid("unknown option".to_string())),
            }
        }
        Ok(settings)
    }
}
