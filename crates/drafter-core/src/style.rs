//! Style records attached to scene nodes.
//!
//! # Overview
//!
//! - [`Style`]: the style of one node, grouping [`Stroke`], [`Fill`] and an
//!   overall opacity
//! - [`StrokePattern`]: line patterns (solid, dashed, dotted, ...)
//!
//! Every property is optional. A node only records what was set on it; the
//! effective style of a node is obtained by [`Style::inherit`]-ing from the
//! root down, so unset properties fall through to the nearest ancestor that
//! sets them.
//!
//! # SVG Attribute Mapping
//!
//! | Property | SVG Attribute |
//! |----------|---------------|
//! | `stroke.color` | `stroke` |
//! | `stroke.width` | `stroke-width` |
//! | `stroke.pattern` | `stroke-dasharray` |
//! | `stroke.opacity` | `stroke-opacity` |
//! | `stroke.scaled` | `vector-effect` |
//! | `fill.color` | `fill` |
//! | `fill.opacity` | `fill-opacity` |
//! | `opacity` | `opacity` |

use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::color::Color;

/// Defines the visual pattern of a stroke.
///
/// # SVG Mapping
///
/// Each variant maps to specific SVG `stroke-dasharray` values:
/// - `Solid`: No dasharray attribute
/// - `Dashed`: "5,5"
/// - `Dotted`: "2,3"
/// - `DashDot`: "10,5,2,5"
/// - `DashDotDot`: "10,5,2,5,2,5"
/// - `Custom(pattern)`: Uses the provided pattern string
#[derive(Debug, Default, Clone, PartialEq)]
pub enum StrokePattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
    DashDotDot,
    /// Custom SVG dasharray pattern, e.g. "10,5,2,3"
    Custom(String),
}

impl FromStr for StrokePattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "dash-dot" | "dashdot" => Ok(Self::DashDot),
            "dash-dot-dot" | "dashdotdot" => Ok(Self::DashDotDot),
            _ if is_dasharray(s) => Ok(Self::Custom(s.to_string())),
            _ => Err(format!(
                "invalid line pattern `{s}`, expected solid, dashed, dotted, dash-dot, \
                 dash-dot-dot or a list of dash lengths"
            )),
        }
    }
}

fn is_dasharray(s: &str) -> bool {
    let mut lengths = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .peekable();
    lengths.peek().is_some() && lengths.all(|part| part.parse::<f64>().is_ok_and(|n| n >= 0.0))
}

impl StrokePattern {
    /// Returns the SVG dasharray value for this pattern, or None for solid lines
    pub fn to_svg_value(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5".to_string()),
            Self::Dotted => Some("2,3".to_string()),
            Self::DashDot => Some("10,5,2,5".to_string()),
            Self::DashDotDot => Some("10,5,2,5,2,5".to_string()),
            Self::Custom(pattern) => Some(pattern.clone()),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::DashDot => "dash-dot",
            Self::DashDotDot => "dash-dot-dot",
            Self::Custom(pattern) => pattern,
        }
    }
}

impl Serialize for StrokePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Stroke properties of a node.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Stroke {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<StrokePattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Whether the stroke width scales with the drawing. Strokes keep a
    /// constant width by default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled: Option<bool>,
}

impl Stroke {
    fn inherit(&self, parent: &Stroke) -> Stroke {
        Stroke {
            color: self.color.or(parent.color),
            width: self.width.or(parent.width),
            pattern: self.pattern.clone().or_else(|| parent.pattern.clone()),
            opacity: self.opacity.or(parent.opacity),
            scaled: self.scaled.or(parent.scaled),
        }
    }

    fn is_empty(&self) -> bool {
        *self == Stroke::default()
    }
}

/// Fill properties of a node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Fill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Fill {
    fn inherit(&self, parent: &Fill) -> Fill {
        Fill {
            color: self.color.or(parent.color),
            opacity: self.opacity.or(parent.opacity),
        }
    }

    fn is_empty(&self) -> bool {
        *self == Fill::default()
    }
}

/// The style recorded on a single node.
///
/// # Examples
///
/// ```
/// use drafter_core::{color::Color, style::Style};
///
/// let mut parent = Style::default();
/// parent.stroke.color = Some(Color::new("red").unwrap());
/// parent.stroke.width = Some(2.0);
///
/// let mut child = Style::default();
/// child.stroke.width = Some(0.5);
///
/// let effective = child.inherit(&parent);
/// assert_eq!(effective.stroke.color, parent.stroke.color);
/// assert_eq!(effective.stroke.width, Some(0.5));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Style {
    #[serde(skip_serializing_if = "Stroke::is_empty")]
    pub stroke: Stroke,
    #[serde(skip_serializing_if = "Fill::is_empty")]
    pub fill: Fill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Style {
    /// Resolve this style against the effective style of its parent.
    pub fn inherit(&self, parent: &Style) -> Style {
        Style {
            stroke: self.stroke.inherit(&parent.stroke),
            fill: self.fill.inherit(&parent.fill),
            opacity: self.opacity.or(parent.opacity),
        }
    }

    /// Returns `true` if no property is set.
    pub fn is_empty(&self) -> bool {
        self.stroke.is_empty() && self.fill.is_empty() && self.opacity.is_none()
    }
}
