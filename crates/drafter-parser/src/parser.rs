//! Parser for argument expressions.
//!
//! Transforms the token stream from the [`lexer`](super::lexer) into an
//! [`Expr`]. Precedence, loosest first:
//!
//! | level | operators | associativity |
//! |-------|-----------|---------------|
//! | conditional | `c ? a : b` | right |
//! | or | `\|\|`, `or` | left |
//! | and | `&&`, `and` | left |
//! | equality | `==`, `!=` | left |
//! | comparison | `<`, `<=`, `>`, `>=` | left |
//! | additive | `+`, `-` | left |
//! | multiplicative | `*`, `/`, `%` | left |
//! | unary | `-`, `!`, `not` | prefix |
//! | power | `^` | right |
//! | postfix | `f(..)`, `a[i]`, `a.b` | left |

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, separated},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    ast::{BinaryOp, Expr, ExprKind, UnaryOp},
    error::{Diagnostic, ErrorCode, ParseError},
    lexer,
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what was expected
    Label(&'static str),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Parse one token that `map` accepts.
fn token_map<'src, O>(
    map: impl Fn(&PositionedToken<'src>) -> Option<O>,
) -> impl winnow::Parser<Input<'src>, O, ErrMode<ContextError<Context>>> {
    any.verify_map(move |token: &'src PositionedToken<'src>| map(token))
}

/// Parse exactly the token `expected`, returning its span.
fn punct<'src>(
    expected: Token<'src>,
) -> impl winnow::Parser<Input<'src>, Span, ErrMode<ContextError<Context>>> {
    token_map(move |token| (token.token == expected).then_some(token.span))
}

/// Parse a raw identifier, `$` sigil included.
fn identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    any.verify_map(|token: &PositionedToken<'src>| match token.token {
        Token::Identifier(name) => Some(Spanned::new(name, token.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

fn literal<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    any.verify_map(|token: &PositionedToken<'src>| {
        let kind = match &token.token {
            Token::Number(n) => ExprKind::Number(*n),
            Token::Str(s) => ExprKind::Str(s.clone()),
            Token::True => ExprKind::Bool(true),
            Token::False => ExprKind::Bool(false),
            Token::Null => ExprKind::Null,
            _ => return None,
        };
        Some(Expr::new(kind, token.span))
    })
    .parse_next(input)
}

/// Comma separated expressions up to (and including) `close`.
fn arguments<'src>(input: &mut Input<'src>, close: Token<'static>) -> IResult<(Vec<Expr>, Span)> {
    let args: Vec<Expr> = separated(0.., expression, punct(Token::Comma)).parse_next(input)?;
    let end = cut_err(punct(close))
        .context(Context::Label("closing delimiter"))
        .parse_next(input)?;
    Ok((args, end))
}

/// A variable (`$width`, `width`) or a function call (`max(a, b)`).
fn variable_or_call<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    let name = identifier.parse_next(input)?;

    if !name.starts_with('$') && opt(punct(Token::LeftParen)).parse_next(input)?.is_some() {
        let (args, end) = arguments(input, Token::RightParen)?;
        let span = name.span().union(end);
        let function = name.map(str::to_string);
        return Ok(Expr::new(ExprKind::Call { function, args }, span));
    }

    let variable = name.trim_start_matches('$').to_string();
    Ok(Expr::new(ExprKind::Variable(variable), name.span()))
}

fn parenthesized<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    let open = punct(Token::LeftParen).parse_next(input)?;
    let inner = cut_err(expression).parse_next(input)?;
    let close = cut_err(punct(Token::RightParen))
        .context(Context::Label("`)`"))
        .parse_next(input)?;
    Ok(inner.with_span(open.union(close)))
}

fn list<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    let open = punct(Token::LeftBracket).parse_next(input)?;
    let (items, close) = arguments(input, Token::RightBracket)?;
    Ok(Expr::new(ExprKind::List(items), open.union(close)))
}

fn primary<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    alt((literal, variable_or_call, parenthesized, list))
        .context(Context::Label("expression"))
        .parse_next(input)
}

/// Indexing and member access chained onto a primary expression.
fn postfix<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    let mut expr = primary(input)?;
    loop {
        if opt(punct(Token::LeftBracket)).parse_next(input)?.is_some() {
            let index = cut_err(expression).parse_next(input)?;
            let close = cut_err(punct(Token::RightBracket))
                .context(Context::Label("`]`"))
                .parse_next(input)?;
            let span = expr.span().union(close);
            expr = Expr::new(
                ExprKind::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                },
                span,
            );
        } else if opt(punct(Token::Dot)).parse_next(input)?.is_some() {
            let name = cut_err(identifier)
                .context(Context::Label("member name"))
                .parse_next(input)?;
            let span = expr.span().union(name.span());
            expr = Expr::new(
                ExprKind::Member {
                    target: Box::new(expr),
                    name: name.map(str::to_string),
                },
                span,
            );
        } else {
            return Ok(expr);
        }
    }
}

/// `base ^ exponent`; the exponent may itself be signed (`2 ^ -1`).
fn power<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    let base = postfix(input)?;
    if opt(punct(Token::Caret)).parse_next(input)?.is_some() {
        let exponent = cut_err(unary).parse_next(input)?;
        return Ok(Expr::binary(BinaryOp::Power, base, exponent));
    }
    Ok(base)
}

fn unary<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    let op = opt(token_map(|token: &PositionedToken<'src>| match token.token {
        Token::Minus => Some((UnaryOp::Negate, token.span)),
        Token::Bang | Token::Not => Some((UnaryOp::Not, token.span)),
        _ => None,
    }))
    .parse_next(input)?;

    match op {
        Some((op, span)) => {
            let operand = cut_err(unary).parse_next(input)?;
            Ok(Expr::unary(op, span, operand))
        }
        None => power(input),
    }
}

/// One left-associative binary precedence level.
fn binary_level<'src>(
    input: &mut Input<'src>,
    operand: fn(&mut Input<'src>) -> IResult<Expr>,
    operator: fn(&Token<'_>) -> Option<BinaryOp>,
) -> IResult<Expr> {
    let mut lhs = operand(input)?;
    while let Some(op) = opt(token_map(|token| operator(&token.token))).parse_next(input)? {
        let rhs = cut_err(operand)
            .context(Context::Label("operand"))
            .parse_next(input)?;
        lhs = Expr::binary(op, lhs, rhs);
    }
    Ok(lhs)
}

fn multiplicative<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    binary_level(input, unary, |token| match token {
        Token::Star => Some(BinaryOp::Multiply),
        Token::Slash => Some(BinaryOp::Divide),
        Token::Percent => Some(BinaryOp::Remainder),
        _ => None,
    })
}

fn additive<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    binary_level(input, multiplicative, |token| match token {
        Token::Plus => Some(BinaryOp::Add),
        Token::Minus => Some(BinaryOp::Subtract),
        _ => None,
    })
}

fn comparison<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    binary_level(input, additive, |token| match token {
        Token::Less => Some(BinaryOp::Less),
        Token::LessEqual => Some(BinaryOp::LessEqual),
        Token::Greater => Some(BinaryOp::Greater),
        Token::GreaterEqual => Some(BinaryOp::GreaterEqual),
        _ => None,
    })
}

fn equality<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    binary_level(input, comparison, |token| match token {
        Token::EqualEqual => Some(BinaryOp::Equal),
        Token::BangEqual => Some(BinaryOp::NotEqual),
        _ => None,
    })
}

fn and<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    binary_level(input, equality, |token| {
        matches!(token, Token::AmpAmp | Token::And).then_some(BinaryOp::And)
    })
}

fn or<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    binary_level(input, and, |token| {
        matches!(token, Token::PipePipe | Token::Or).then_some(BinaryOp::Or)
    })
}

/// `condition ? then : otherwise`
fn expression<'src>(input: &mut Input<'src>) -> IResult<Expr> {
    let condition = or(input)?;
    if opt(punct(Token::Question)).parse_next(input)?.is_none() {
        return Ok(condition);
    }

    let then = cut_err(expression).parse_next(input)?;
    cut_err(punct(Token::Colon))
        .context(Context::Label("`:`"))
        .parse_next(input)?;
    let otherwise = cut_err(expression).parse_next(input)?;

    let span = condition.span().union(otherwise.span());
    Ok(Expr::new(
        ExprKind::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        },
        span,
    ))
}

/// Convert a winnow error at token index `position` to a Diagnostic.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    position: usize,
    whole: Span,
) -> Diagnostic {
    let expected = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().next().map(|ctx| match ctx {
            Context::Label(label) => *label,
        }),
        ErrMode::Incomplete(_) => None,
    };

    match tokens.get(position) {
        Some(token) => {
            let message = match expected {
                Some(label) => format!("unexpected `{}`, expected {label}", token.token),
                None => format!("unexpected `{}`", token.token),
            };
            Diagnostic::error(message)
                .with_code(ErrorCode::E302)
                .with_label(token.span, ErrorCode::E302.description())
        }
        None => {
            let end = Span::new(whole.end().saturating_sub(1)..whole.end());
            let message = match expected {
                Some(label) => format!("expression ended early, expected {label}"),
                None => "expression ended early".to_string(),
            };
            Diagnostic::error(message)
                .with_code(ErrorCode::E303)
                .with_label(end, ErrorCode::E303.description())
                .with_help("complete the expression or quote it as a string")
        }
    }
}

/// Build an expression from tokens spanning `whole`.
fn build_expression(tokens: &[PositionedToken<'_>], whole: Span) -> Result<Expr, Diagnostic> {
    let mut input = TokenSlice::new(tokens);

    let result = expression.parse_next(&mut input);
    let position = tokens.len() - input.eof_offset();
    match result {
        Ok(expr) if input.eof_offset() == 0 => Ok(expr),
        Ok(_) => {
            let token = &tokens[position];
            Err(Diagnostic::error(format!("unexpected `{}` after expression", token.token))
                .with_code(ErrorCode::E302)
                .with_label(token.span, ErrorCode::E302.description())
                .with_help("operators are needed between operands"))
        }
        Err(e) => Err(convert_error(e, tokens, position, whole)),
    }
}

/// Parse `source`, which starts at byte `offset` of the document.
pub(crate) fn parse_expression(source: &str, offset: usize) -> Result<Expr, ParseError> {
    let tokens = lexer::tokenize(source, offset)?;
    let whole = Span::new(offset..offset + source.len());
    build_expression(&tokens, whole).map_err(ParseError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Expr {
        parse_expression(source, 0).expect("parse")
    }

    fn parse_err(source: &str) -> Diagnostic {
        parse_expression(source, 0).unwrap_err().diagnostics()[0].clone()
    }

    /// Render as fully parenthesized text to check grouping.
    fn sexpr(expr: &Expr) -> String {
        match expr.kind() {
            ExprKind::Null => "null".to_string(),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Number(n) => n.to_string(),
            ExprKind::Str(s) => format!("{s:?}"),
            ExprKind::Variable(name) => name.clone(),
            ExprKind::List(items) => {
                let items: Vec<_> = items.iter().map(sexpr).collect();
                format!("[{}]", items.join(" "))
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Negate => format!("(- {})", sexpr(operand)),
                UnaryOp::Not => format!("(! {})", sexpr(operand)),
            },
            ExprKind::Binary { op, lhs, rhs } => {
                format!("({op} {} {})", sexpr(lhs), sexpr(rhs))
            }
            ExprKind::Conditional {
                condition,
                then,
                otherwise,
            } => format!("(? {} {} {})", sexpr(condition), sexpr(then), sexpr(otherwise)),
            ExprKind::Call { function, args } => {
                let args: Vec<_> = args.iter().map(sexpr).collect();
                format!("({} {})", function.inner(), args.join(" "))
            }
            ExprKind::Index { target, index } => format!("([] {} {})", sexpr(target), sexpr(index)),
            ExprKind::Member { target, name } => format!("(. {} {})", sexpr(target), name.inner()),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(sexpr(&parse("1 + 2 * 3")), "(+ 1 (* 2 3))");
        assert_eq!(sexpr(&parse("(1 + 2) * 3")), "(* (+ 1 2) 3)");
        assert_eq!(sexpr(&parse("8 - 3 - 2")), "(- (- 8 3) 2)");
        assert_eq!(sexpr(&parse("2 ^ 3 ^ 2")), "(^ 2 (^ 3 2))");
        assert_eq!(sexpr(&parse("-2 ^ 2")), "(- (^ 2 2))");
    }

    #[test]
    fn test_logic_and_conditional() {
        assert_eq!(
            sexpr(&parse("$a > 1 && not $b or c")),
            "(|| (&& (> a 1) (! b)) c)"
        );
        assert_eq!(sexpr(&parse("a ? 1 : b ? 2 : 3")), "(? a 1 (? b 2 3))");
    }

    #[test]
    fn test_postfix() {
        assert_eq!(
            sexpr(&parse("$my_point.shape.x")),
            "(. (. my_point shape) x)"
        );
        assert_eq!(sexpr(&parse("$arr[0]")), "([] arr 0)");
        assert_eq!(sexpr(&parse("max($a, 2)[1]")), "([] (max a 2) 1)");
        assert_eq!(sexpr(&parse("[1, $b]")), "[1 b]");
    }

    #[test]
    fn test_sigil_is_optional() {
        assert_eq!(parse("$width"), parse("width").with_span(Span::new(0..6)));
    }

    #[test]
    fn test_spans() {
        let expr = parse_expression("$a + 10", 20).unwrap();
        assert_eq!(expr.span(), Span::new(20..27));
    }

    #[test]
    fn test_trailing_token() {
        let diag = parse_err("1 2");
        assert_eq!(diag.code(), Some(ErrorCode::E302));
        assert_eq!(diag.labels()[0].span(), Span::new(2..3));
    }

    #[test]
    fn test_incomplete() {
        let diag = parse_err("1 +");
        assert_eq!(diag.code(), Some(ErrorCode::E303));

        let diag = parse_err("max(1, 2");
        assert_eq!(diag.code(), Some(ErrorCode::E303));
    }

    #[test]
    fn test_unexpected_operator() {
        let diag = parse_err("1 + * 2");
        assert_eq!(diag.code(), Some(ErrorCode::E302));
        assert_eq!(diag.labels()[0].span(), Span::new(4..5));
    }
}
