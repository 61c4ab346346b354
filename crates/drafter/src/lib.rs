//! Drafter - parametric 2-D sketches from composable features.
//!
//! A sketch is defined either as a native function or as a declarative
//! document. A [`Draft`] holds a set of named definitions ("sources"),
//! evaluates one of them into a scene graph and renders the result as SVG,
//! JSON or a debug dump.
//!
//! Every source of a draft can call every other source through the `user.`
//! namespace, so documents compose:
//!
//! ```
//! use drafter::{Draft, export::{Format, Options}};
//!
//! let mut draft = Draft::default();
//! draft
//!     .add_document("washer", "parameters:\n  - $r: 5\nsketch:\n  - circle: [0, 0, $r]\n  - circle: [0, 0, '$r / 2']\n")
//!     .unwrap();
//! draft
//!     .add_document("pair", "sketch:\n  - user.washer: 10\n  - user.washer: [4]\n  - translate: [30, 0]\n")
//!     .unwrap();
//!
//! let svg = draft.render("pair", &[], Format::Svg, &Options::new()).unwrap();
//! assert!(svg.contains("<circle"));
//! ```

pub mod config;
pub mod export;

mod error;
mod interpret;
mod load;

pub use drafter_core::{
    Entity, FeatureFn, Node, Order, Registry, Sketch, Value, color, geometry, style,
};
pub use drafter_parser::{Document, ParseError};

pub use error::DraftError;
pub use interpret::evaluate;

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, info, trace};

use config::AppConfig;
use export::{Format, Options};

/// Namespace under which the sources of a draft are visible to each other.
pub const USER_NAMESPACE: &str = "user";

/// A declared parameter of a source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    name: String,
    default: Value,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> &Value {
        &self.default
    }
}

/// The definition of a sketch, before it is added to a [`Draft`].
#[derive(Clone)]
pub enum Source {
    /// Document text.
    Document(String),
    /// A native feature function and the parameters it declares.
    Function {
        feature: Arc<FeatureFn>,
        parameters: Vec<ParameterSpec>,
    },
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Document(text) => f.debug_tuple("Document").field(text).finish(),
            Self::Function { parameters, .. } => f
                .debug_struct("Function")
                .field("parameters", parameters)
                .finish_non_exhaustive(),
        }
    }
}

/// A source that passed parsing.
#[derive(Clone)]
enum Loaded {
    Document {
        document: Arc<Document>,
        text: String,
    },
    Function {
        feature: Arc<FeatureFn>,
        parameters: Vec<ParameterSpec>,
    },
}

impl Loaded {
    fn feature(&self) -> Arc<FeatureFn> {
        match self {
            Self::Document { document, .. } => {
                let document = Arc::clone(document);
                let feature: Arc<FeatureFn> =
                    Arc::new(move |sketch: Sketch, args: &[Value]| {
                        interpret::evaluate(&document, sketch, args)
                    });
                feature
            }
            Self::Function { feature, .. } => Arc::clone(feature),
        }
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        match self {
            Self::Document { document, .. } => document
                .parameters()
                .iter()
                .map(|p| {
                    ParameterSpec::new(p.name().as_str(), interpret::literal_value(p.default()))
                })
                .collect(),
            Self::Function { parameters, .. } => parameters.clone(),
        }
    }
}

/// A named collection of sketch sources.
///
/// Sources are parsed when they are added, so a malformed document is
/// reported before anything is evaluated.
#[derive(Default, Clone)]
pub struct Draft {
    config: AppConfig,
    sources: IndexMap<String, Loaded>,
}

impl std::fmt::Debug for Draft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Draft")
            .field("config", &self.config)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Draft {
    /// Create an empty draft rendering with `config`.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            sources: IndexMap::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Add `source` under `name`, replacing any source of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MalformedDocument`] if a document does not parse.
    pub fn add_source(&mut self, name: impl Into<String>, source: Source) -> Result<(), DraftError> {
        let name = name.into();
        let loaded = match source {
            Source::Document(text) => {
                let document = drafter_parser::parse_document(&text)
                    .map_err(|err| DraftError::malformed_document(&name, err, text.as_str()))?;
                Loaded::Document {
                    document: Arc::new(document),
                    text,
                }
            }
            Source::Function {
                feature,
                parameters,
            } => Loaded::Function {
                feature,
                parameters,
            },
        };
        debug!(source = name.as_str(); "Source added");
        self.sources.insert(name, loaded);
        Ok(())
    }

    /// Add document text under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MalformedDocument`] if the document does not parse.
    pub fn add_document(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), DraftError> {
        self.add_source(name, Source::Document(text.into()))
    }

    /// Add a native feature function under `name`.
    pub fn add_function<F>(&mut self, name: impl Into<String>, parameters: Vec<ParameterSpec>, feature: F)
    where
        F: Fn(Sketch, &[Value]) -> drafter_core::Result<Sketch> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(source = name.as_str(); "Function added");
        self.sources.insert(
            name,
            Loaded::Function {
                feature: Arc::new(feature),
                parameters,
            },
        );
    }

    /// Move the source `from` to the name `to`, replacing any source there.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSource`] if there is no source `from`.
    pub fn rename_source(&mut self, from: &str, to: impl Into<String>) -> Result<(), DraftError> {
        let loaded = self
            .sources
            .shift_remove(from)
            .ok_or_else(|| DraftError::UnknownSource(from.to_string()))?;
        self.sources.insert(to.into(), loaded);
        Ok(())
    }

    /// Remove the source `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSource`] if there is no such source.
    pub fn remove_source(&mut self, name: &str) -> Result<(), DraftError> {
        self.sources
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| DraftError::UnknownSource(name.to_string()))
    }

    /// Names of all sources, in insertion order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Text of the document source `name`, or `None` for functions and
    /// unknown names.
    pub fn document_text(&self, name: &str) -> Option<&str> {
        match self.sources.get(name)? {
            Loaded::Document { text, .. } => Some(text),
            Loaded::Function { .. } => None,
        }
    }

    /// Parameters declared by the source `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSource`] if there is no such source.
    pub fn parameters(&self, name: &str) -> Result<Vec<ParameterSpec>, DraftError> {
        self.sources
            .get(name)
            .map(Loaded::parameters)
            .ok_or_else(|| DraftError::UnknownSource(name.to_string()))
    }

    /// The built-in features plus every source under `user.<name>`.
    fn registry(&self) -> Registry {
        let mut registry = Registry::with_builtins();
        for (name, loaded) in &self.sources {
            registry.register_shared(format!("{USER_NAMESPACE}.{name}"), loaded.feature());
        }
        trace!(features = registry.len(); "Registry built");
        registry
    }

    /// Evaluate the source `name` on an empty sketch.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownSource`] if there is no such source and
    /// [`DraftError::Evaluate`] for any failure during evaluation.
    pub fn evaluate(&self, name: &str, args: &[Value]) -> Result<Sketch, DraftError> {
        if !self.contains(name) {
            return Err(DraftError::UnknownSource(name.to_string()));
        }
        info!(source = name, args = args.len(); "Evaluating sketch");

        let root = Sketch::new(Arc::new(self.registry()));
        let sketch = root
            .call(&format!("{USER_NAMESPACE}.{name}"), args)
            .map_err(|source| DraftError::Evaluate {
                name: name.to_string(),
                source,
            })?;

        debug!(source = name, nodes = sketch.node().node_count(); "Sketch evaluated");
        Ok(sketch)
    }

    /// Evaluate the source `name` and render the result.
    ///
    /// # Errors
    ///
    /// Any error of [`Draft::evaluate`], or [`DraftError::Export`] if
    /// rendering fails.
    pub fn render(
        &self,
        name: &str,
        args: &[Value],
        format: Format,
        options: &Options,
    ) -> Result<String, DraftError> {
        let sketch = self.evaluate(name, args)?;
        let output = export::render(sketch.node(), format, options, &self.config)?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_of_documents_and_functions() {
        let mut draft = Draft::default();
        draft
            .add_document("doc", "parameters:\n  - $w: 3\n  - $label\nsketch:\n")
            .unwrap();
        draft.add_function(
            "native",
            vec![ParameterSpec::new("size", 2.0)],
            |sketch, _| Ok(sketch),
        );

        assert_eq!(
            draft.parameters("doc").unwrap(),
            vec![
                ParameterSpec::new("w", 3.0),
                ParameterSpec::new("label", Value::Null)
            ]
        );
        assert_eq!(draft.parameters("native").unwrap()[0].name(), "size");
        assert!(matches!(
            draft.parameters("missing"),
            Err(DraftError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_rename_and_remove() {
        let mut draft = Draft::default();
        draft.add_document("a", "sketch:\n").unwrap();
        draft.add_document("b", "sketch:\n").unwrap();

        draft.rename_source("a", "c").unwrap();
        assert_eq!(draft.sources().collect::<Vec<_>>(), ["b", "c"]);
        assert!(draft.document_text("c").is_some());

        draft.remove_source("b").unwrap();
        assert_eq!(draft.sources().collect::<Vec<_>>(), ["c"]);
        assert!(matches!(
            draft.remove_source("b"),
            Err(DraftError::UnknownSource(name)) if name == "b"
        ));
        assert!(matches!(
            draft.rename_source("a", "d"),
            Err(DraftError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_malformed_document_is_rejected_on_add() {
        let mut draft = Draft::default();
        let err = draft.add_document("bad", "parameters:\n").unwrap_err();
        match err {
            DraftError::MalformedDocument { name, src, .. } => {
                assert_eq!(name, "bad");
                assert_eq!(src, "parameters:\n");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!draft.contains("bad"));
    }

    #[test]
    fn test_unknown_source() {
        let draft = Draft::default();
        assert!(matches!(
            draft.evaluate("nothing", &[]),
            Err(DraftError::UnknownSource(_))
        ));
    }
}
