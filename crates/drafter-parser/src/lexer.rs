//! Lexical analyzer for argument expressions.
//!
//! Expressions appear inside document scalars (`"$width / 2"`), so every
//! span produced here is shifted by the scalar's offset in the document.
//! The entry point is [`tokenize`], which recovers after a bad character and
//! reports all lexical errors in one pass.

use winnow::{
    Parser as _,
    ascii::{digit0, digit1, multispace0},
    combinator::{alt, cut_err, not, opt, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic details attached to winnow errors through `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse an escape sequence after the backslash has been seen.
fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    let start = input.current_token_start();
    preceded(
        '\\',
        cut_err(one_of(['n', 'r', 't', '\\', '"', '\'', '0'])).context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "invalid escape sequence",
            help: Some("valid escapes: `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`, `\\'`, `\\0`"),
            start,
        }),
    )
    .map(|c| match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        other => other,
    })
    .parse_next(input)
}

/// Parse a string delimited by `quote`, either `"` or `'`.
fn string_literal<'a>(input: &mut Input<'a>, quote: char) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    let content = repeat(0.., alt((string_escape, none_of([quote, '\\'])))).fold(
        String::new,
        |mut acc, c| {
            acc.push(c);
            acc
        },
    );

    preceded(
        quote,
        cut_err(terminated(content, quote)).context(LexerDiagnostic {
            code: ErrorCode::E301,
            message: "unterminated string",
            help: Some("close the string with the quote it was opened with"),
            start,
        }),
    )
    .map(Token::Str)
    .parse_next(input)
}

fn string<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        |i: &mut Input<'a>| string_literal(i, '"'),
        |i: &mut Input<'a>| string_literal(i, '\''),
    ))
    .parse_next(input)
}

/// Parse an unsigned number: `12`, `1.5`, `.5`, `2e-3`.
///
/// A sign is always a separate operator token so `a-1` lexes as a
/// subtraction.
fn number<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let start = input.current_token_start();
    terminated(
        (
            alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())),
            opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
        )
            .take()
            .try_map(str::parse::<f64>),
        // `3px` is not a number followed by a name
        cut_err(peek(not(one_of(|c: char| {
            c.is_alphanumeric() || c == '_' || c == '$'
        }))))
        .context(LexerDiagnostic {
            code: ErrorCode::E304,
            message: "invalid number",
            help: Some("separate the number from the name after it"),
            start,
        }),
    )
    .map(Token::Number)
    .parse_next(input)
}

/// Parse a name or keyword. Names may carry a leading `$`.
fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    (
        opt('$'),
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .map(|name: &str| match name {
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Identifier(name),
        })
        .parse_next(input)
}

/// Parse multi-character operators (longest first)
fn multi_char_operator<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        literal("==").value(Token::EqualEqual),
        literal("!=").value(Token::BangEqual),
        literal("<=").value(Token::LessEqual),
        literal(">=").value(Token::GreaterEqual),
        literal("&&").value(Token::AmpAmp),
        literal("||").value(Token::PipePipe),
    ))
    .parse_next(input)
}

fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        alt((
            '+'.value(Token::Plus),
            '-'.value(Token::Minus),
            '*'.value(Token::Star),
            '/'.value(Token::Slash),
            '%'.value(Token::Percent),
            '^'.value(Token::Caret),
        )),
        alt((
            '<'.value(Token::Less),
            '>'.value(Token::Greater),
            '!'.value(Token::Bang),
            '?'.value(Token::Question),
            ':'.value(Token::Colon),
        )),
        alt((
            ','.value(Token::Comma),
            '.'.value(Token::Dot),
            '('.value(Token::LeftParen),
            ')'.value(Token::RightParen),
            '['.value(Token::LeftBracket),
            ']'.value(Token::RightBracket),
        )),
    ))
    .parse_next(input)
}

fn token<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        string,              // Must come before any single char
        number,              // Must come before `.`
        identifier,          // Includes keywords
        multi_char_operator, // Must come before single char operators
        single_char_token,
    ))
    .parse_next(input)
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
    offset: usize,
}

impl<'a> Lexer<'a> {
    fn new(offset: usize) -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            offset,
        }
    }

    fn tokenize(&mut self, mut input: Input<'a>) {
        loop {
            // Whitespace separates tokens and is never significant.
            let _: IResult<&str> = multispace0.parse_next(&mut input);
            if input.is_empty() {
                break;
            }

            let start = input.current_token_start();
            match token(&mut input) {
                Ok(token) => {
                    let end = input.current_token_start();
                    let span = Span::new(start..end).offset(self.offset);
                    self.tokens.push(PositionedToken::new(token, span));
                }
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let diagnostic = self.convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    // Skip one character and resume.
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E300 (unexpected character) if no diagnostic context
    /// is found.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1)).offset(self.offset);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos + 1).offset(self.offset);
        Diagnostic::error("unexpected character in expression")
            .with_code(ErrorCode::E300)
            .with_label(span, ErrorCode::E300.description())
    }
}

/// Tokenize an expression whose first byte sits at `offset` in the document.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens, whitespace dropped
/// - `Err(ParseError)` - One or more lexical errors
pub(crate) fn tokenize(input: &str, offset: usize) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new(offset);
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    /// Names with an optional sigil, keywords excluded.
    fn name_strategy() -> impl Strategy<Value = String> {
        "\\$?[a-z_][a-z0-9_]{0,16}".prop_filter("avoid keywords", |s| {
            !matches!(s.as_str(), "true" | "false" | "null" | "and" | "or" | "not")
        })
    }

    fn decimal_strategy() -> impl Strategy<Value = String> {
        (0u32..100_000, 0u32..1000).prop_map(|(integer, fraction)| format!("{integer}.{fraction}"))
    }

    // ===================
    // Property Test Functions
    // ===================

    fn check_name_is_one_token(name: &str) -> Result<(), TestCaseError> {
        let tokens = tokenize(name, 0).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(&tokens[0].token, &Token::Identifier(name));
        Ok(())
    }

    fn check_decimal_value(literal: &str) -> Result<(), TestCaseError> {
        let source = format!("{literal} * 2");
        let tokens = tokenize(&source, 0).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let expected: f64 = literal.parse().map_err(|_| TestCaseError::reject("not a float"))?;
        prop_assert_eq!(&tokens[0].token, &Token::Number(expected));
        prop_assert_eq!(tokens[0].span, Span::new(0..literal.len()));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn names_are_one_token(name in name_strategy()) {
            check_name_is_one_token(&name)?;
        }

        #[test]
        fn decimals_keep_their_value(literal in decimal_strategy()) {
            check_decimal_value(&literal)?;
        }
    }
}
