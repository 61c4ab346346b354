//! Meta features: labels, visibility, draw order and free-form attributes.

use crate::{error::Result, features::args::Args, sketch::Sketch, value::Value};

/// `name(label)`
pub(crate) fn name(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("name", values);
    let label = args.string(0)?;
    sketch.node_mut().set_name(label);
    Ok(sketch)
}

/// `hide()`: renderers skip this subtree.
pub(crate) fn hide(mut sketch: Sketch, _values: &[Value]) -> Result<Sketch> {
    sketch.node_mut().set_hidden(true);
    Ok(sketch)
}

pub(crate) fn show(mut sketch: Sketch, _values: &[Value]) -> Result<Sketch> {
    sketch.node_mut().set_hidden(false);
    Ok(sketch)
}

/// `z(order)`: draw order among siblings. Higher draws on top; ties keep
/// the order the children were added in.
pub(crate) fn z(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("z", values);
    let order = args.number(0)?;
    sketch.node_mut().set_z(order);
    Ok(sketch)
}

/// `tag(key, value)` or `tag({key: value, ...})`
pub(crate) fn tag(mut sketch: Sketch, values: &[Value]) -> Result<Sketch> {
    let args = Args::new("tag", values);
    let to_json = |index: usize, value: &Value| {
        serde_json::to_value(value).map_err(|err| args.error(index, err.to_string()))
    };

    if let Some(Value::Map(map)) = args.get(0) {
        for (key, value) in map {
            let json = to_json(0, value)?;
            sketch.node_mut().set_attribute(key.clone(), json);
        }
        return Ok(sketch);
    }

    let key = args.string(0)?;
    let json = match args.get(1) {
        Some(value) => to_json(1, value)?,
        None => serde_json::Value::Bool(true),
    };
    sketch.node_mut().set_attribute(key, json);
    Ok(sketch)
}
