//! Error type for sketch evaluation.
//!
//! Every operation returns its failure to the immediate caller; nothing is
//! retried or swallowed, so an error raised deep inside a nested feature
//! call reaches the outermost caller unchanged.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or evaluating sketches.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No feature with this name is registered.
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),

    /// Geometry was required but the sketch holds no entity.
    #[error("sketch does not contain any shape")]
    EmptyShape,

    /// A correspondence segment has zero length.
    #[error("degenerate alignment: {0}")]
    DegenerateAlignment(&'static str),

    #[error("invalid fillet: {0}")]
    InvalidFillet(String),

    /// A document referenced a name that is not in scope (yet).
    #[error("unbound reference `{0}`")]
    UnboundReference(String),

    /// A document could not be turned into a feature.
    #[error("malformed document `{name}`: {reason}")]
    MalformedDocument { name: String, reason: String },

    #[error("invalid argument {index} for `{feature}`: {reason}")]
    InvalidArgument {
        feature: String,
        index: usize,
        reason: String,
    },

    /// An expression evaluated to a value of the wrong kind.
    #[error("expression error: {0}")]
    Expression(String),

    /// Feature composition nested deeper than the dispatch allows.
    #[error("feature `{feature}` exceeded the maximum call depth of {limit}")]
    RecursionLimit { feature: String, limit: usize },
}

impl Error {
    /// Create an [`Error::InvalidArgument`].
    pub fn invalid_argument(
        feature: impl Into<String>,
        index: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            feature: feature.into(),
            index,
            reason: reason.into(),
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownFeature(_) => "unknown_feature",
            Self::EmptyShape => "empty_shape",
            Self::DegenerateAlignment(_) => "degenerate_alignment",
            Self::InvalidFillet(_) => "invalid_fillet",
            Self::UnboundReference(_) => "unbound_reference",
            Self::MalformedDocument { .. } => "malformed_document",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Expression(_) => "expression",
            Self::RecursionLimit { .. } => "recursion_limit",
        }
    }
}
