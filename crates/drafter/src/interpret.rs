//! Document interpreter.
//!
//! Turns a parsed [`Document`] into a scene graph by running its call chain
//! against the feature registry of the input handle. Evaluation proceeds in
//! three passes:
//!
//! 1. **Parameters** - each parameter is bound to its positional argument, or
//!    to its default when the argument is missing or null
//! 2. **References** - bindings are resolved in declaration order, so a
//!    reference may use any name declared above it
//! 3. **Chain** - the `sketch` steps run from an empty sketch and the result
//!    is appended to the input as a child

mod expr;
mod functions;

pub(crate) use expr::literal_value;

use indexmap::IndexMap;
use log::{debug, trace};

use drafter_core::{Error, Result, Sketch, Value};
use drafter_parser::{Chain, Document, ReferenceKind, Step};

/// Names visible to expressions during one evaluation.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    bindings: IndexMap<String, Value>,
}

impl Scope {
    /// Bind `name`, replacing any earlier binding.
    pub(crate) fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up `name` (without its `$` sigil). Math constants are visible
    /// unless shadowed.
    pub(crate) fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        functions::constant(name)
            .map(Value::Number)
            .ok_or_else(|| Error::UnboundReference(name.to_string()))
    }

    pub(crate) fn len(&self) -> usize {
        self.bindings.len()
    }
}

/// Evaluate `document` as a feature applied to `input` with `args`.
///
/// # Errors
///
/// Any error raised by an expression or a feature call, unchanged.
pub fn evaluate(document: &Document, input: Sketch, args: &[Value]) -> Result<Sketch> {
    let mut scope = Scope::default();

    for (index, parameter) in document.parameters().iter().enumerate() {
        let value = match args.get(index) {
            Some(value) if !value.is_null() => value.clone(),
            _ => expr::literal_value(parameter.default()),
        };
        scope.bind(parameter.name().as_str(), value);
    }
    trace!(parameters = scope.len(), args = args.len(); "Parameters bound");

    for reference in document.references() {
        let value = match reference.kind() {
            ReferenceKind::Plain(arg) => expr::eval_arg(arg, &scope)?,
            ReferenceKind::Sketch(chain) => Value::Sketch(run_chain(input.blank(), chain, &scope)?),
        };
        scope.bind(reference.name().as_str(), value);
    }
    debug!(bindings = scope.len(); "References resolved");

    run_chain(input, document.sketch(), &scope)
}

/// Run `chain` from an empty sketch and append the result to `target`.
fn run_chain(target: Sketch, chain: &Chain, scope: &Scope) -> Result<Sketch> {
    let mut acc = target.blank();
    for step in chain.steps() {
        acc = match step {
            Step::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| expr::eval_arg(arg, scope))
                    .collect::<Result<Vec<_>>>()?;
                acc.call(name, &args)?
            }
            Step::Nested(inner) => run_chain(acc, inner, scope)?,
        };
    }
    Ok(target.add([acc]))
}
