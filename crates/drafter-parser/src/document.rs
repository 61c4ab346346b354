//! Typed document model and the builder that derives it from an item tree.
//!
//! A document has three sections, all optional except `sketch`:
//!
//! ```yaml
//! parameters:
//!   - $width: 10          # name with a default
//!   - $height             # default null
//!   - $depth: {default: 2}
//! reference:
//!   - $half: '$width / 2' # strings are expressions
//!   - $corner:sketch:     # a sketch built from its own chain
//!       - point: [0, 0]
//! sketch:
//!   - rectangle: [0, 0, $width, $height]
//!   - sketch:             # a nested chain, added as a child
//!       - circle: [$corner.shape, $half]
//! ```
//!
//! Parameter defaults are taken literally. In references and step
//! arguments every string scalar is an expression, so a string value must
//! be quoted twice: `'"red"'`.

use indexmap::IndexMap;

use crate::{
    ast::Expr,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    outline::{Entry, Item, ItemKind},
    parser,
    span::{Span, Spanned},
};

/// Name suffix marking a reference as sketch-typed.
const SKETCH_SUFFIX: &str = ":sketch";

/// Step name that opens a nested chain.
const NESTED_STEP: &str = "sketch";

/// A value taken from the document as written.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Literal>),
    Map(IndexMap<String, Literal>),
}

/// An argument tree whose string leaves are expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Literal(Literal),
    Expr(Expr),
    List(Vec<Arg>),
    Map(IndexMap<String, Arg>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: Spanned<String>,
    default: Literal,
}

impl Parameter {
    /// Name without its `$` sigil.
    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    pub fn default(&self) -> &Literal {
        &self.default
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceKind {
    /// Bound to an evaluated argument tree.
    Plain(Arg),
    /// Bound to the sketch a chain produces.
    Sketch(Chain),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    name: Spanned<String>,
    kind: ReferenceKind,
}

impl Reference {
    /// Name without its `$` sigil or `:sketch` suffix.
    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    pub fn kind(&self) -> &ReferenceKind {
        &self.kind
    }
}

/// One step of a call chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Call the feature `name` on the accumulated sketch.
    Call {
        name: Spanned<String>,
        args: Vec<Arg>,
    },
    /// Evaluate an inner chain and add its result to the accumulated sketch.
    Nested(Chain),
}

/// An ordered sequence of steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    steps: Vec<Step>,
    span: Span,
}

impl Chain {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// A parsed sketch document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    parameters: Vec<Parameter>,
    references: Vec<Reference>,
    sketch: Chain,
}

impl Document {
    /// Parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// References in declaration order.
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn sketch(&self) -> &Chain {
        &self.sketch
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn strip_sigil(name: &Spanned<String>) -> Spanned<String> {
    match name.strip_prefix('$') {
        Some(bare) => Spanned::new(
            bare.to_string(),
            Span::new(name.span().start() + 1..name.span().end()),
        ),
        None => name.clone(),
    }
}

/// Interpret a mapping with a single entry, as used for list items.
fn single_entry(item: &Item) -> Option<&Entry> {
    match &item.kind {
        ItemKind::Map(entries) if entries.len() == 1 => entries.first(),
        _ => None,
    }
}

fn literal(item: &Item) -> Literal {
    match &item.kind {
        ItemKind::Null => Literal::Null,
        ItemKind::Bool(b) => Literal::Bool(*b),
        ItemKind::Number(n) => Literal::Number(*n),
        ItemKind::Str { value, .. } => Literal::Str(value.clone()),
        ItemKind::Seq(items) => Literal::List(items.iter().map(literal).collect()),
        ItemKind::Map(entries) => Literal::Map(
            entries
                .iter()
                .map(|e| (e.key.inner().clone(), literal(&e.value)))
                .collect(),
        ),
    }
}

/// Builds a [`Document`] while collecting diagnostics.
struct Builder {
    diagnostics: DiagnosticCollector,
}

impl Builder {
    fn new() -> Self {
        Self {
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span, help: &str) {
        self.diagnostics.emit(
            Diagnostic::error(message)
                .with_code(code)
                .with_label(span, code.description())
                .with_help(help),
        );
    }

    fn build(mut self, root: &Item) -> Result<Document, ParseError> {
        let ItemKind::Map(sections) = &root.kind else {
            return Err(Diagnostic::error("document must be a mapping of sections")
                .with_code(ErrorCode::E205)
                .with_label(root.span, ErrorCode::E205.description())
                .with_help("start the document with `sketch:`")
                .into());
        };

        let mut parameters = Vec::new();
        let mut references = Vec::new();
        let mut sketch = None;

        for section in sections {
            match section.key.as_str() {
                "parameters" => parameters = self.parameters(&section.value),
                "reference" => references = self.references(&section.value),
                "sketch" => sketch = Some(self.chain(&section.value)),
                other => self.error(
                    ErrorCode::E201,
                    format!("unknown section `{other}`"),
                    section.key.span(),
                    "sections are `parameters`, `reference` and `sketch`",
                ),
            }
        }

        let sketch = sketch.unwrap_or_else(|| {
            self.error(
                ErrorCode::E200,
                "document has no `sketch` section",
                Span::new(root.span.start()..root.span.start()),
                "add a `sketch:` section listing the steps to run",
            );
            Chain::default()
        });

        self.check_shadowing(&parameters, &references);
        self.diagnostics.finish()?;

        Ok(Document {
            parameters,
            references,
            sketch,
        })
    }

    /// Validate and normalize a declared name.
    fn name(&mut self, raw: &Spanned<String>, code: ErrorCode) -> Option<Spanned<String>> {
        let name = strip_sigil(raw);
        if is_identifier(&name) {
            return Some(name);
        }
        self.error(
            code,
            format!("invalid name `{}`", raw.inner()),
            raw.span(),
            "names start with a letter or `_` and may carry a leading `$`",
        );
        None
    }

    fn parameters(&mut self, item: &Item) -> Vec<Parameter> {
        let mut parameters = Vec::new();
        match &item.kind {
            ItemKind::Null => {}
            ItemKind::Seq(items) => {
                for item in items {
                    if let Some(parameter) = self.parameter(item) {
                        parameters.push(parameter);
                    }
                }
            }
            ItemKind::Map(entries) => {
                for entry in entries {
                    if let Some(parameter) = self.parameter_entry(entry) {
                        parameters.push(parameter);
                    }
                }
            }
            _ => self.error(
                ErrorCode::E202,
                "`parameters` must be a list",
                item.span,
                "list parameters as `- $name` or `- $name: default`",
            ),
        }
        parameters
    }

    fn parameter(&mut self, item: &Item) -> Option<Parameter> {
        if let ItemKind::Str { value, .. } = &item.kind {
            let raw = Spanned::new(value.clone(), item.span);
            let name = self.name(&raw, ErrorCode::E202)?;
            return Some(Parameter {
                name,
                default: Literal::Null,
            });
        }
        match single_entry(item) {
            Some(entry) => self.parameter_entry(entry),
            None => {
                self.error(
                    ErrorCode::E202,
                    "invalid parameter declaration",
                    item.span,
                    "declare a parameter as `- $name` or `- $name: default`",
                );
                None
            }
        }
    }

    fn parameter_entry(&mut self, entry: &Entry) -> Option<Parameter> {
        let name = self.name(&entry.key, ErrorCode::E202)?;
        // A mapping is a definition object; only its `default` is used.
        let default = match &entry.value.kind {
            ItemKind::Map(fields) => fields
                .iter()
                .find(|f| f.key.as_str() == "default")
                .map_or(Literal::Null, |f| literal(&f.value)),
            _ => literal(&entry.value),
        };
        Some(Parameter { name, default })
    }

    fn references(&mut self, item: &Item) -> Vec<Reference> {
        let mut references = Vec::new();
        match &item.kind {
            ItemKind::Null => {}
            ItemKind::Seq(items) => {
                for item in items {
                    match single_entry(item) {
                        Some(entry) => references.extend(self.reference(entry)),
                        None => self.error(
                            ErrorCode::E203,
                            "invalid reference declaration",
                            item.span,
                            "declare a reference as `- $name: value`",
                        ),
                    }
                }
            }
            ItemKind::Map(entries) => {
                for entry in entries {
                    references.extend(self.reference(entry));
                }
            }
            _ => self.error(
                ErrorCode::E203,
                "`reference` must be a list",
                item.span,
                "list references as `- $name: value`",
            ),
        }
        references
    }

    fn reference(&mut self, entry: &Entry) -> Option<Reference> {
        if let Some(bare) = entry.key.strip_suffix(SKETCH_SUFFIX) {
            let span = entry.key.span();
            let raw = Spanned::new(
                bare.to_string(),
                Span::new(span.start()..span.end() - SKETCH_SUFFIX.len()),
            );
            let name = self.name(&raw, ErrorCode::E203)?;
            let chain = self.chain(&entry.value);
            return Some(Reference {
                name,
                kind: ReferenceKind::Sketch(chain),
            });
        }

        let name = self.name(&entry.key, ErrorCode::E203)?;
        let arg = self.arg(&entry.value);
        Some(Reference {
            name,
            kind: ReferenceKind::Plain(arg),
        })
    }

    fn check_shadowing(&mut self, parameters: &[Parameter], references: &[Reference]) {
        for (i, reference) in references.iter().enumerate() {
            let earlier = parameters
                .iter()
                .map(Parameter::name)
                .chain(references[..i].iter().map(Reference::name))
                .find(|name| name.inner() == reference.name.inner());
            if let Some(earlier) = earlier {
                self.diagnostics.emit(
                    Diagnostic::warning(format!("`{}` shadows an earlier name", reference.name.inner()))
                        .with_code(ErrorCode::E206)
                        .with_label(reference.name.span(), "declared again here")
                        .with_secondary_label(earlier.span(), "first declared here"),
                );
            }
        }
    }

    fn chain(&mut self, item: &Item) -> Chain {
        let steps = match &item.kind {
            ItemKind::Null => Vec::new(),
            ItemKind::Seq(items) => items.iter().filter_map(|i| self.step(i)).collect(),
            _ => {
                self.error(
                    ErrorCode::E204,
                    "a chain must be a list of steps",
                    item.span,
                    "write each step as `- feature: [args]`",
                );
                Vec::new()
            }
        };
        Chain {
            steps,
            span: item.span,
        }
    }

    fn step(&mut self, item: &Item) -> Option<Step> {
        let Some(entry) = single_entry(item) else {
            self.error(
                ErrorCode::E204,
                "invalid step",
                item.span,
                "write each step as `- feature: [args]`",
            );
            return None;
        };

        if entry.key.as_str() == NESTED_STEP {
            return Some(Step::Nested(self.chain(&entry.value)));
        }

        let args = match &entry.value.kind {
            ItemKind::Null => Vec::new(),
            ItemKind::Seq(items) => items.iter().map(|i| self.arg(i)).collect(),
            _ => vec![self.arg(&entry.value)],
        };
        Some(Step::Call {
            name: entry.key.clone(),
            args,
        })
    }

    fn arg(&mut self, item: &Item) -> Arg {
        match &item.kind {
            ItemKind::Str { value, .. } if !value.trim().is_empty() => {
                match parser::parse_expression(value, item.content_start()) {
                    Ok(expr) => Arg::Expr(expr),
                    Err(err) => {
                        self.diagnostics.extend(err);
                        Arg::Literal(Literal::Null)
                    }
                }
            }
            ItemKind::Seq(items) => Arg::List(items.iter().map(|i| self.arg(i)).collect()),
            ItemKind::Map(entries) => Arg::Map(
                entries
                    .iter()
                    .map(|e| (e.key.inner().clone(), self.arg(&e.value)))
                    .collect(),
            ),
            _ => Arg::Literal(literal(item)),
        }
    }
}

/// Derive a [`Document`] from the item tree of a whole source file.
pub(crate) fn build(root: &Item) -> Result<Document, ParseError> {
    Builder::new().build(root)
}
