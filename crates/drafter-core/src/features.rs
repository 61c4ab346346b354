//! Built-in features.
//!
//! Every built-in is a plain function with the [`FeatureFn`](crate::FeatureFn)
//! signature, registered by [`register_builtins`] from the static table
//! below. Arguments are positional [`Value`](crate::Value)s; a value of the
//! wrong shape fails with [`Error::InvalidArgument`](crate::Error::InvalidArgument).
//!
//! | group | features |
//! |-------|----------|
//! | geometric | `point`, `segment`, `circle`, `arc`, `polycurve`, `rectangle`, `polyface`, `text`, `bbox` |
//! | meta | `name`, `hide`, `show`, `z`, `tag` |
//! | style | `stroke`, `fill`, `linestyle`, `opacity`, `style` |
//! | composition | `add`, `new` |
//! | operations | `fillet`, `close`, `explode`, `join` |
//! | transformations | `translate`, `rotate`, `scale`, `transform`, `orient`, `snap` |
//!
//! Boolean and offset operations are not built in; register them like any
//! other feature.

mod args;
mod geometric;
mod meta;
mod operations;
mod style;
mod transform;

use log::debug;

use crate::{error::Result, registry::Registry, sketch::Sketch, value::Value};

type Builtin = fn(Sketch, &[Value]) -> Result<Sketch>;

const BUILTINS: &[(&str, Builtin)] = &[
    ("point", geometric::point),
    ("segment", geometric::segment),
    ("circle", geometric::circle),
    ("arc", geometric::arc),
    ("polycurve", geometric::polycurve),
    ("rectangle", geometric::rectangle),
    ("polyface", geometric::polyface),
    ("text", geometric::text),
    ("bbox", geometric::bbox),
    ("name", meta::name),
    ("hide", meta::hide),
    ("show", meta::show),
    ("z", meta::z),
    ("tag", meta::tag),
    ("stroke", style::stroke),
    ("fill", style::fill),
    ("linestyle", style::linestyle),
    ("opacity", style::opacity),
    ("style", style::style),
    ("add", operations::add),
    ("new", operations::new),
    ("fillet", operations::fillet),
    ("close", operations::close),
    ("explode", operations::explode),
    ("join", operations::join),
    ("translate", transform::translate),
    ("rotate", transform::rotate),
    ("scale", transform::scale),
    ("transform", transform::transform),
    ("orient", transform::orient),
    ("snap", transform::snap),
];

/// Register every built-in feature into `registry`.
pub fn register_builtins(registry: &mut Registry) {
    for (name, feature) in BUILTINS {
        registry.register(*name, *feature);
    }
    debug!(count = BUILTINS.len(); "Registered built-in features");
}
