//! # Drafter Parser
//!
//! Parser for Drafter sketch documents. This crate turns the text of a
//! document into a typed [`Document`]: its parameters, its references and
//! the call chain that builds the sketch. Argument strings are parsed into
//! [`Expr`] trees here; evaluating them is up to the interpreter.
//!
//! ## Usage
//!
//! ```
//! # use drafter_parser::{parse_document, ParseError, Step};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//! parameters:
//!   - $size: 10
//! sketch:
//!   - rectangle: [0, 0, $size, '$size / 2']
//!   - stroke: '"red"'
//! "#;
//!
//!     let document = parse_document(source)?;
//!     assert_eq!(document.parameters().len(), 1);
//!     assert!(matches!(document.sketch().steps()[0], Step::Call { .. }));
//!     Ok(())
//! }
//! ```

mod ast;
mod document;
pub mod error;
mod lexer;
mod outline;
mod parser;
mod span;
mod tokens;

pub use ast::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use document::{Arg, Chain, Document, Literal, Parameter, Reference, ReferenceKind, Step};
pub use error::ParseError;
pub use span::{Span, Spanned};

use log::debug;

/// Parse the text of a sketch document.
///
/// The pipeline runs in two phases:
///
/// 1. **Outline** - Read the indentation structure into an untyped tree
/// 2. **Build** - Derive sections, name bindings and steps, parsing every
///    argument expression on the way
///
/// # Errors
///
/// Returns a [`ParseError`] holding every diagnostic found. Spans in the
/// diagnostics are byte offsets into `source`.
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    let outline = outline::read(source)?;
    let document = document::build(&outline)?;
    debug!(
        parameters = document.parameters().len(),
        references = document.references().len(),
        steps = document.sketch().steps().len();
        "Parsed document"
    );
    Ok(document)
}

/// Parse a standalone argument expression such as `$width / 2 + 1`.
///
/// # Errors
///
/// Returns a [`ParseError`] if the expression is malformed.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    parser::parse_expression(source, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    /// The document used across the loader tests of the interpreter.
    const SAMPLE: &str = r#"
parameters:
  - $a: 1
  - $b: "str"
reference:
  - $num: 1
  - $str: '$a + 3'
  - $bool: true
  - $arr: [2, false, "3 + 5"]
  - $obj:
      foo: 6
      bar: 10
      baz: '"red"'
  - $my_point:sketch:
      - point: [2, 4]
sketch:
  - point: [$num, $str]
  - point: ["$arr[0]", "$arr[2]"]
  - segment: [$my_point.shape, [$obj.foo, $obj.bar]]
"#;

    #[test]
    fn test_parse_sample_document() {
        let document = parse_document(SAMPLE).unwrap();
        assert_eq!(document.parameters().len(), 2);
        assert_eq!(document.references().len(), 6);
        assert_eq!(document.sketch().steps().len(), 3);

        let Step::Call { name, args } = &document.sketch().steps()[2] else {
            panic!("expected a call");
        };
        assert_eq!(name.as_str(), "segment");
        let Arg::Expr(shape) = &args[0] else {
            panic!("expected an expression");
        };
        assert!(matches!(shape.kind(), ExprKind::Member { .. }));
        assert!(matches!(&args[1], Arg::List(items) if items.len() == 2));
    }

    #[test]
    fn test_parse_document_reports_every_problem() {
        let err = parse_document("reference:\n  - $x: '1 +'\nstyle: 3\n").unwrap_err();
        let codes: Vec<_> = err.diagnostics().iter().filter_map(|d| d.code()).collect();
        assert_eq!(codes, [ErrorCode::E303, ErrorCode::E201, ErrorCode::E200]);
    }

    #[test]
    fn test_parse_expression() {
        let expr = parse_expression("max($a, 2) ^ 2").unwrap();
        assert!(matches!(
            expr.kind(),
            ExprKind::Binary {
                op: BinaryOp::Power,
                ..
            }
        ));
        assert_eq!(expr.span(), Span::new(0..14));
    }
}
