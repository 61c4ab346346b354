//! Style features. Each writes the receiver's own style record; descendants
//! inherit whatever they do not override.

use crate::{
    color::Color,
    error::{Error, Result},
    features::args::Args,
    sketch::Sketch,
    style::{Fill, Stroke, StrokePattern, Style},
    value::Value,
};

fn color(args: &Args<'_>, index: usize) -> Result<Color> {
    let raw = args.string(index)?;
    Color::new(raw).map_err(|reason| args.error(index, reason))
}

fn pattern(args: &Args<'_>, index: usize) -> Result<StrokePattern> {
    let raw = args.string(index)?;
    raw.parse().map_err(|reason: String| args.error(index, reason))
}

/// `stroke(color, width?)`
pub(crate) fn stroke(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("stroke", values);
    let stroke_color = color(&args, 0)?;
    let width = match args.get(1) {
        Some(_) => Some(non_negative(&args, 1)?),
        None => None,
    };

    let style = sketch.node_mut().style_mut();
    style.stroke.color = Some(stroke_color);
    if width.is_some() {
        style.stroke.width = width;
    }
    Ok(sketch)
}

/// `fill(color, opacity?)`
pub(crate) fn fill(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("fill", values);
    let fill_color = color(&args, 0)?;
    let opacity = match args.get(1) {
        Some(_) => Some(args.unit_interval(1)?),
        None => None,
    };

    let style = sketch.node_mut().style_mut();
    style.fill.color = Some(fill_color);
    if opacity.is_some() {
        style.fill.opacity = opacity;
    }
    Ok(sketch)
}

/// `linestyle(pattern)`
pub(crate) fn linestyle(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("linestyle", values);
    let pattern = pattern(&args, 0)?;
    sketch.node_mut().style_mut().stroke.pattern = Some(pattern);
    Ok(sketch)
}

/// `opacity(value)`
pub(crate) fn opacity(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("opacity", values);
    let value = args.unit_interval(0)?;
    sketch.node_mut().style_mut().opacity = Some(value);
    Ok(sketch)
}

/// `style({stroke: ..., fill: ..., opacity: ...})`
///
/// `stroke` and `fill` accept either a color string or a map with the
/// properties of [`Stroke`] / [`Fill`]. Properties present in the map
/// replace those already set on the node.
pub(crate) fn style(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("style", values);
    let Some(Value::Map(map)) = args.get(0) else {
        return Err(args.error(0, "expected a map of style properties"));
    };

    let mut update = Style::default();
    for (key, value) in map {
        match key.as_str() {
            "stroke" => update.stroke = parse_stroke(value)?,
            "fill" => update.fill = parse_fill(value)?,
            "opacity" => {
                let values = std::slice::from_ref(value);
                update.opacity = Some(Args::new("style", values).unit_interval(0)?);
            }
            other => {
                return Err(args.error(0, format!("unknown style property `{other}`")));
            }
        }
    }

    let current = sketch.node().style().clone();
    *sketch.node_mut().style_mut() = update.inherit(&current);
    Ok(sketch)
}

fn non_negative(args: &Args<'_>, index: usize) -> Result<f64> {
    let n = args.number(index)?;
    if n >= 0.0 {
        Ok(n)
    } else {
        Err(args.error(index, format!("expected a non-negative number, got {n}")))
    }
}

/// Decode one property of a nested style map.
fn property<'a>(property: &'static str, value: &'a Value) -> Args<'a> {
    Args::new(property, std::slice::from_ref(value))
}

fn parse_stroke(value: &Value) -> Result<Stroke> {
    let mut stroke = Stroke::default();
    match value {
        Value::Str(_) => stroke.color = Some(color(&property("stroke", value), 0)?),
        Value::Map(map) => {
            for (key, item) in map {
                let args = property("stroke", item);
                match key.as_str() {
                    "color" => stroke.color = Some(color(&args, 0)?),
                    "width" => stroke.width = Some(non_negative(&args, 0)?),
                    "pattern" => stroke.pattern = Some(pattern(&args, 0)?),
                    "opacity" => stroke.opacity = Some(args.unit_interval(0)?),
                    "scaled" => stroke.scaled = Some(args.boolean_or(0, false)?),
                    other => {
                        return Err(Error::invalid_argument(
                            "style",
                            0,
                            format!("unknown stroke property `{other}`"),
                        ));
                    }
                }
            }
        }
        other => {
            return Err(Error::invalid_argument(
                "style",
                0,
                format!("stroke must be a color or a map, got {}", other.type_name()),
            ));
        }
    }
    Ok(stroke)
}

fn parse_fill(value: &Value) -> Result<Fill> {
    let mut fill = Fill::default();
    match value {
        Value::Str(_) => fill.color = Some(color(&property("fill", value), 0)?),
        Value::Map(map) => {
            for (key, item) in map {
                let args = property("fill", item);
                match key.as_str() {
                    "color" => fill.color = Some(color(&args, 0)?),
                    "opacity" => fill.opacity = Some(args.unit_interval(0)?),
                    other => {
                        return Err(Error::invalid_argument(
                            "style",
                            0,
                            format!("unknown fill property `{other}`"),
                        ));
                    }
                }
            }
        }
        other => {
            return Err(Error::invalid_argument(
                "style",
                0,
                format!("fill must be a color or a map, got {}", other.type_name()),
            ));
        }
    }
    Ok(fill)
}
