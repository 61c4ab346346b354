//! Configuration types for rendering sketches.
//!
//! This module provides configuration structures that control how rendered
//! output looks. All types implement [`serde::Deserialize`] so they can be
//! loaded from a TOML file.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the renderer sections.
//! - [`SvgConfig`] - Padding, background and default stroke/fill for SVG output.
//! - [`JsonConfig`] - Formatting of structured output.
//!
//! Per-call render options (see [`crate::export::Options`]) take precedence
//! over these values.
//!
//! # Example
//!
//! ```
//! # use drafter::config::AppConfig;
//! let config = AppConfig::from_toml(
//!     r#"
//!     [svg]
//!     padding = 20.0
//!     background = "ivory"
//!
//!     [json]
//!     pretty = false
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.svg().padding(), 20.0);
//! assert!(config.svg().background().unwrap().is_some());
//! assert!(!config.json().pretty());
//! ```

use serde::Deserialize;

use drafter_core::color::Color;

use crate::error::DraftError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// SVG renderer section.
    #[serde(default)]
    svg: SvgConfig,

    /// JSON renderer section.
    #[serde(default)]
    json: JsonConfig,
}

impl AppConfig {
    pub fn new(svg: SvgConfig, json: JsonConfig) -> Self {
        Self { svg, json }
    }

    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Config`] if the text is not valid TOML or has
    /// unknown or mistyped fields.
    pub fn from_toml(text: &str) -> Result<Self, DraftError> {
        toml::from_str(text).map_err(|err| DraftError::Config(err.to_string()))
    }

    pub fn svg(&self) -> &SvgConfig {
        &self.svg
    }

    pub fn json(&self) -> &JsonConfig {
        &self.json
    }
}

fn default_padding() -> f64 {
    10.0
}

fn default_precision() -> usize {
    3
}

fn default_stroke() -> String {
    "black".to_string()
}

fn default_stroke_width() -> f64 {
    1.5
}

fn default_fill() -> String {
    "white".to_string()
}

fn default_pretty() -> bool {
    true
}

/// SVG output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SvgConfig {
    /// Space around the drawing, in drawing units.
    #[serde(default = "default_padding")]
    padding: f64,

    /// Background color as a CSS color string. Transparent when unset.
    #[serde(default)]
    background: Option<String>,

    /// Decimal places written for coordinates.
    #[serde(default = "default_precision")]
    precision: usize,

    /// Stroke color of nodes that do not set one.
    #[serde(default = "default_stroke")]
    stroke: String,

    #[serde(default = "default_stroke_width")]
    stroke_width: f64,

    /// Fill color of closed shapes that do not set one.
    #[serde(default = "default_fill")]
    fill: String,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            background: None,
            precision: default_precision(),
            stroke: default_stroke(),
            stroke_width: default_stroke_width(),
            fill: default_fill(),
        }
    }
}

impl SvgConfig {
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background(&self) -> Result<Option<Color>, String> {
        self.background
            .as_deref()
            .map(Color::new)
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Returns the default stroke [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color is not a valid CSS color.
    pub fn stroke(&self) -> Result<Color, String> {
        Color::new(&self.stroke).map_err(|err| format!("Invalid stroke color in config: {err}"))
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Returns the default fill [`Color`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color is not a valid CSS color.
    pub fn fill(&self) -> Result<Color, String> {
        Color::new(&self.fill).map_err(|err| format!("Invalid fill color in config: {err}"))
    }
}

/// Structured output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonConfig {
    /// Indent the output.
    #[serde(default = "default_pretty")]
    pretty: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

impl JsonConfig {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.svg().padding(), 10.0);
        assert_eq!(config.svg().precision(), 3);
        assert_eq!(config.svg().stroke_width(), 1.5);
        assert_eq!(config.svg().background().unwrap(), None);
        assert!(config.svg().stroke().is_ok());
        assert!(config.svg().fill().is_ok());
        assert!(config.json().pretty());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.svg().padding(), AppConfig::default().svg().padding());
    }

    #[test]
    fn test_partial_section() {
        let config = AppConfig::from_toml("[svg]\nstroke = \"navy\"\n").unwrap();
        assert_eq!(config.svg().padding(), 10.0);
        assert_eq!(config.svg().stroke().unwrap(), Color::new("navy").unwrap());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = AppConfig::from_toml("[svg]\nmargin = 3\n").unwrap_err();
        assert!(matches!(err, DraftError::Config(_)));
    }

    #[test]
    fn test_invalid_background() {
        let config = AppConfig::from_toml("[svg]\nbackground = \"plaid\"\n").unwrap();
        assert!(config.svg().background().is_err());
    }
}
