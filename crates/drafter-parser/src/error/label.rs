//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the document.
///
/// A diagnostic usually has one **primary** label marking where the problem
/// is, and may add **secondary** labels for context such as "first declared
/// here".
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub(crate) fn offset(self, offset: usize) -> Self {
        Self {
            span: self.span.offset(offset),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_and_secondary_labels() {
        let primary = Label::primary(Span::new(10..20), "redeclared here");
        let secondary = Label::secondary(Span::new(5..15), "first declared here");

        assert_eq!(primary.span().start(), 10);
        assert_eq!(primary.message(), "redeclared here");
        assert!(primary.is_primary());
        assert!(!secondary.is_primary());
        assert_eq!(secondary.span().end(), 15);
    }
}
