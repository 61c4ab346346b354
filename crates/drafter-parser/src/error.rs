//! Diagnostics for the Drafter document parser.
//!
//! Every phase (outline reading, expression lexing and parsing, document
//! building) reports problems as [`Diagnostic`]s carrying an [`ErrorCode`],
//! labelled source spans and optional help text. Phases keep going after an
//! error where they can, so a single [`ParseError`] usually lists every
//! problem in the document.
//!
//! # Example
//!
//! ```
//! # use drafter_parser::error::{Diagnostic, ErrorCode};
//! # use drafter_parser::Span;
//!
//! let diag = Diagnostic::error("document has no `sketch` section")
//!     .with_code(ErrorCode::E200)
//!     .with_label(Span::new(0..10), "sections start here")
//!     .with_help("add a `sketch:` section listing the steps to run");
//!
//! assert_eq!(diag.to_string(), "error[E200]: document has no `sketch` section");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
