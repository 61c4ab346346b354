//! Reader for the indentation-structured document format.
//!
//! Documents use a small YAML subset: block mappings (`key: value`), block
//! sequences (`- item`, including the compact `- key: value` form), flow
//! sequences `[a, b]`, flow mappings `{a: 1}`, double and single quoted
//! scalars, plain scalars and `#` comments. A flow collection left open at
//! the end of its line continues on the following lines, which must be
//! indented deeper than the line that opened it (a closing bracket may sit
//! at that line's indentation). Quoted scalars must close on the line they
//! open. Plain scalars inside flow collections may contain
//! balanced brackets and parentheses, so `[$arr[0], max($a, 2)]` reads as two
//! items.
//!
//! The reader produces an untyped [`Item`] tree; the
//! [`document`](super::document) module gives it meaning.

use std::borrow::Cow;

use winnow::{
    Parser as _,
    ascii::space0,
    combinator::{alt, cut_err, opt, preceded, repeat, separated, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{none_of, one_of},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::{Span, Spanned},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ItemKind {
    Null,
    Bool(bool),
    Number(f64),
    Str { value: String, quoted: bool },
    Seq(Vec<Item>),
    Map(Vec<Entry>),
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entry {
    pub key: Spanned<String>,
    pub value: Item,
}

impl Item {
    fn new(kind: ItemKind, span: Span) -> Self {
        Self { kind, span }
    }

    fn null(at: usize) -> Self {
        Self::new(ItemKind::Null, Span::new(at..at))
    }

    /// Byte offset of the first character of a scalar's content.
    pub(crate) fn content_start(&self) -> usize {
        match self.kind {
            ItemKind::Str { quoted: true, .. } => self.span.start() + 1,
            _ => self.span.start(),
        }
    }

    fn offset(self, offset: usize) -> Self {
        let kind = match self.kind {
            ItemKind::Seq(items) => {
                ItemKind::Seq(items.into_iter().map(|i| i.offset(offset)).collect())
            }
            ItemKind::Map(entries) => ItemKind::Map(
                entries
                    .into_iter()
                    .map(|e| Entry {
                        key: Spanned::new(e.key.inner().clone(), e.key.span().offset(offset)),
                        value: e.value.offset(offset),
                    })
                    .collect(),
            ),
            other => other,
        };
        Self::new(kind, self.span.offset(offset))
    }
}

// ============================================================================
// Flow values
// ============================================================================

/// Diagnostic details attached to winnow errors through `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FlowDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<FlowDiagnostic>>;

fn skip_space(input: &mut Input<'_>) {
    let _: IResult<&str> = space0.parse_next(input);
}

fn fail<O>(
    input: &Input<'_>,
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    start: usize,
) -> IResult<O> {
    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        FlowDiagnostic {
            code,
            message,
            help,
            start,
        },
    )))
}

fn double_quoted_escape(input: &mut Input<'_>) -> IResult<char> {
    let start = input.current_token_start();
    preceded(
        '\\',
        cut_err(one_of(['n', 'r', 't', '\\', '"', '\'', '/', '0'])).context(FlowDiagnostic {
            code: ErrorCode::E003,
            message: "invalid escape sequence",
            help: Some("valid escapes: `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`, `\\'`, `\\/`, `\\0`"),
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

fn double_quoted(input: &mut Input<'_>) -> IResult<Item> {
    let start = input.current_token_start();
    let content = repeat(0.., alt((double_quoted_escape, none_of(['"', '\\'])))).fold(
        String::new,
        |mut acc, c| {
            acc.push(c);
            acc
        },
    );
    let value = preceded(
        '"',
        cut_err(terminated(content, '"')).context(FlowDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated quoted scalar",
            help: Some("add the closing `\"` on the same line"),
            start,
        }),
    )
    .parse_next(input)?;
    let end = input.current_token_start();
    Ok(Item::new(
        ItemKind::Str {
            value,
            quoted: true,
        },
        Span::new(start..end),
    ))
}

/// `'it''s'`: a doubled quote is the only escape.
fn single_quoted_char(input: &mut Input<'_>) -> IResult<char> {
    alt(("''".value('\''), none_of(['\'']))).parse_next(input)
}

fn single_quoted(input: &mut Input<'_>) -> IResult<Item> {
    let start = input.current_token_start();
    let content = repeat(0.., single_quoted_char).fold(
        String::new,
        |mut acc, c| {
            acc.push(c);
            acc
        },
    );
    let value = preceded(
        '\'',
        cut_err(terminated(content, '\'')).context(FlowDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated quoted scalar",
            help: Some("add the closing `'` on the same line"),
            start,
        }),
    )
    .parse_next(input)?;
    let end = input.current_token_start();
    Ok(Item::new(
        ItemKind::Str {
            value,
            quoted: true,
        },
        Span::new(start..end),
    ))
}

fn quoted(input: &mut Input<'_>) -> IResult<Item> {
    alt((double_quoted, single_quoted)).parse_next(input)
}

/// Where a plain scalar stops.
#[derive(Clone, Copy, PartialEq, Eq)]
enum PlainContext {
    /// The rest of the line.
    Block,
    /// An item of a flow collection.
    Flow,
    /// A key of a flow mapping.
    Key,
}

/// Length of the plain scalar at the start of `text`.
fn plain_len(text: &str, context: PlainContext) -> usize {
    if context == PlainContext::Block {
        return text.len();
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut previous = ' ';
    for (i, c) in text.char_indices() {
        let word = previous.is_alphanumeric();
        previous = c;
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            // An apostrophe inside a word does not open a string.
            (None, '"' | '\'') if !word => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') if depth > 0 => depth -= 1,
            (None, ',' | ']' | '}') if depth == 0 => return i,
            (None, ':') if depth == 0 && context == PlainContext::Key => return i,
            _ => {}
        }
    }
    text.len()
}

/// Bracket nesting after `text`, starting from `depth`. Brackets inside
/// quotes do not count.
fn flow_depth(text: &str, mut depth: usize) -> usize {
    let mut quote: Option<char> = None;
    let mut previous = ' ';
    for c in text.chars() {
        let word = previous.is_alphanumeric();
        previous = c;
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if !word => quote = Some(c),
            (None, '[' | '{') => depth += 1,
            (None, ']' | '}') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    depth
}

/// Parse a plain scalar, trailing whitespace excluded.
fn plain<'a>(input: &mut Input<'a>, context: PlainContext) -> IResult<(&'a str, Span)> {
    let start = input.current_token_start();
    let rest = input.peek_slice(input.eof_offset());
    if rest.starts_with(['[', ']', '{', '}', ',', '"', '\'', ':']) {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }

    let len = plain_len(rest, context);
    let text = rest[..len].trim_end();
    if text.is_empty() {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    input.next_slice(text.len());
    Ok((text, Span::new(start..start + text.len())))
}

/// Resolve a plain scalar to null, a boolean, a number or a string.
fn resolve_plain(text: &str, span: Span) -> Item {
    let kind = match text {
        "~" | "null" | "Null" | "NULL" => ItemKind::Null,
        "true" | "True" | "TRUE" => ItemKind::Bool(true),
        "false" | "False" | "FALSE" => ItemKind::Bool(false),
        _ => match parse_number(text) {
            Some(n) => ItemKind::Number(n),
            None => ItemKind::Str {
                value: text.to_string(),
                quoted: false,
            },
        },
    };
    Item::new(kind, span)
}

/// Decimal numbers only, so names such as `inf` stay strings.
fn parse_number(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let mut chars = unsigned.chars();
    let starts_numeric = match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    };
    if !starts_numeric {
        return None;
    }
    text.parse().ok()
}

fn plain_item(input: &mut Input<'_>, context: PlainContext) -> IResult<Item> {
    let (text, span) = plain(input, context)?;
    Ok(resolve_plain(text, span))
}

fn flow_node(input: &mut Input<'_>) -> IResult<Item> {
    alt((flow_sequence, flow_mapping, quoted, |i: &mut Input<'_>| {
        plain_item(i, PlainContext::Flow)
    }))
    .parse_next(input)
}

/// Close a flow collection with `close`, or explain why it cannot be closed.
fn close_flow(input: &mut Input<'_>, mut close: char, start: usize) -> IResult<usize> {
    if input.is_empty() {
        return fail(
            input,
            ErrorCode::E101,
            "unclosed flow collection",
            Some("close the collection with its matching bracket"),
            start,
        );
    }
    let position = input.current_token_start();
    let closed: IResult<char> = close.parse_next(input);
    match closed {
        Ok(_) => Ok(input.current_token_start()),
        Err(_) => fail(
            input,
            ErrorCode::E100,
            "unexpected character in flow collection",
            Some("separate items with `,`"),
            position,
        ),
    }
}

fn flow_sequence(input: &mut Input<'_>) -> IResult<Item> {
    let start = input.current_token_start();
    let items: Vec<Item> = preceded(
        ('[', space0),
        terminated(
            separated(0.., terminated(flow_node, space0), (',', space0)),
            opt((',', space0)),
        ),
    )
    .parse_next(input)?;
    let end = close_flow(input, ']', start)?;
    Ok(Item::new(ItemKind::Seq(items), Span::new(start..end)))
}

fn flow_key(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    if let Some(Item {
        kind: ItemKind::Str { value, .. },
        span,
    }) = opt(quoted).parse_next(input)?
    {
        return Ok(Spanned::new(value, span));
    }
    let (text, span) = plain(input, PlainContext::Key)?;
    Ok(Spanned::new(text.to_string(), span))
}

fn flow_entry(input: &mut Input<'_>) -> IResult<Entry> {
    let key = flow_key(input)?;
    skip_space(input);
    let colon = input.current_token_start();
    let separator: IResult<char> = ':'.parse_next(input);
    if separator.is_err() {
        return fail(
            input,
            ErrorCode::E100,
            "expected `:` after flow mapping key",
            Some("write entries as `{key: value}`"),
            colon,
        );
    }
    skip_space(input);
    let value = match opt(flow_node).parse_next(input)? {
        Some(value) => value,
        None => Item::null(input.current_token_start()),
    };
    skip_space(input);
    Ok(Entry { key, value })
}

fn flow_mapping(input: &mut Input<'_>) -> IResult<Item> {
    let start = input.current_token_start();
    let entries: Vec<Entry> = preceded(
        ('{', space0),
        terminated(separated(0.., flow_entry, (',', space0)), opt((',', space0))),
    )
    .parse_next(input)?;
    let end = close_flow(input, '}', start)?;
    Ok(Item::new(ItemKind::Map(entries), Span::new(start..end)))
}

/// A complete value occupying the rest of a line.
fn flow_line(input: &mut Input<'_>) -> IResult<Item> {
    let item = alt((flow_sequence, flow_mapping, quoted, |i: &mut Input<'_>| {
        plain_item(i, PlainContext::Block)
    }))
    .parse_next(input)?;
    skip_space(input);
    if !input.is_empty() {
        let position = input.current_token_start();
        // Consume the remainder so the label spans it.
        let _ = input.finish();
        return fail(
            input,
            ErrorCode::E100,
            "unexpected content after value",
            Some("quote the whole value if it is meant as one string"),
            position,
        );
    }
    Ok(item)
}

fn convert_flow_error(err: ErrMode<ContextError<FlowDiagnostic>>, error_pos: usize) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(FlowDiagnostic {
        code,
        message,
        help,
        start,
    }) = context_error.context().next()
    {
        let span = Span::new(*start..error_pos.max(*start + 1));
        let mut diag = Diagnostic::error(*message)
            .with_code(*code)
            .with_label(span, code.description());
        if let Some(h) = help {
            diag = diag.with_help(*h);
        }
        return diag;
    }

    let span = Span::new(error_pos..error_pos + 1);
    Diagnostic::error("unexpected character")
        .with_code(ErrorCode::E002)
        .with_label(span, ErrorCode::E002.description())
}

// ============================================================================
// Block structure
// ============================================================================

/// A non-blank line with its comment removed.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    indent: usize,
    text: &'a str,
    /// Byte offset of `text` in the source.
    start: usize,
}

impl Line<'_> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }

    fn is_sequence_entry(&self) -> bool {
        self.text == "-" || self.text.starts_with("- ")
    }

    /// Split `key: value` or `key:`, returning the key and the value with
    /// their offsets.
    fn split_key(&self) -> Option<(Spanned<String>, &str, usize)> {
        if self.text.starts_with(['"', '\'', '[', '{', '-']) {
            return None;
        }
        let (key, value_at) = match self.text.find(": ") {
            Some(i) => (&self.text[..i], i + 2),
            None => (self.text.strip_suffix(':')?, self.text.len()),
        };
        let key = key.trim_end();
        if key.is_empty() {
            return None;
        }
        let value = self.text[value_at..].trim_start();
        let value_start = self.end() - value.len();
        let key_span = Span::new(self.start..self.start + key.len());
        Some((Spanned::new(key.to_string(), key_span), value, value_start))
    }
}

/// Byte index where a `#` comment starts, if any.
fn comment_start(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut previous = ' ';
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some('"'), '\\') if previous != '\\' => {}
            (Some(q), c) if c == q && !(q == '"' && previous == '\\') => quote = None,
            (None, '"' | '\'') if previous.is_whitespace() || "[{,:".contains(previous) => {
                quote = Some(c)
            }
            (None, '#') if previous.is_whitespace() => return Some(i),
            _ => {}
        }
        previous = if previous == '\\' && c == '\\' { ' ' } else { c };
    }
    None
}

struct Reader<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    diagnostics: DiagnosticCollector,
}

impl<'a> Reader<'a> {
    fn new(source: &'a str) -> Self {
        let mut diagnostics = DiagnosticCollector::new();
        let mut lines = Vec::new();
        let mut offset = 0;

        for raw in source.split_inclusive('\n') {
            let line_start = offset;
            offset += raw.len();
            let raw = raw.trim_end_matches(['\n', '\r']);

            let leading = raw.len() - raw.trim_start_matches([' ', '\t']).len();
            if let Some(tab) = raw[..leading].find('\t') {
                diagnostics.emit(
                    Diagnostic::error("tab character in indentation")
                        .with_code(ErrorCode::E004)
                        .with_label(
                            Span::new(line_start + tab..line_start + tab + 1),
                            ErrorCode::E004.description(),
                        )
                        .with_help("indent with spaces"),
                );
            }

            let content = &raw[leading..];
            let content = match comment_start(content) {
                Some(i) => &content[..i],
                None => content,
            };
            let content = content.trim_end();
            if content.is_empty() || content == "---" || content == "..." {
                continue;
            }
            lines.push(Line {
                indent: leading,
                text: content,
                start: line_start + leading,
            });
        }

        Self {
            lines,
            pos: 0,
            diagnostics,
        }
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn read(mut self) -> Result<Item, ParseError> {
        let root = match self.peek() {
            Some(_) => self.block(),
            None => Item::null(0),
        };
        if let Some(line) = self.peek() {
            self.unexpected_indentation(line);
        }
        self.diagnostics.finish()?;
        Ok(root)
    }

    /// Read the node starting at the current line.
    fn block(&mut self) -> Item {
        let Some(line) = self.peek() else {
            return Item::null(self.lines.last().map_or(0, Line::end));
        };
        if line.is_sequence_entry() {
            self.sequence(line.indent)
        } else if line.split_key().is_some() {
            self.mapping(line.indent)
        } else {
            self.pos += 1;
            let item = self.line_value(line.text, line.start, line.indent);
            self.skip_deeper(line.indent);
            item
        }
    }

    /// The value of an entry whose own line is empty: a deeper block, or
    /// null.
    fn nested(&mut self, indent: usize, at: usize) -> Item {
        match self.peek() {
            Some(next) if next.indent > indent => self.block(),
            _ => Item::null(at),
        }
    }

    fn sequence(&mut self, indent: usize) -> Item {
        let mut items = Vec::new();
        let start = self.lines[self.pos].start;

        while let Some(line) = self.peek() {
            if line.indent != indent || !line.is_sequence_entry() {
                break;
            }
            let rest = line.text[1..].trim_start();
            if rest.is_empty() {
                self.pos += 1;
                items.push(self.nested(indent, line.end()));
            } else {
                // `- key: value` opens a block at the column of `key`.
                let column = line.text.len() - rest.len();
                let inner = Line {
                    indent: indent + column,
                    text: rest,
                    start: line.start + column,
                };
                if inner.is_sequence_entry() || inner.split_key().is_some() {
                    self.lines[self.pos] = inner;
                    items.push(self.block());
                } else {
                    self.pos += 1;
                    items.push(self.line_value(inner.text, inner.start, indent));
                }
            }
            self.skip_deeper(indent);
        }

        let end = items.last().map_or(start + 1, |item| item.span.end().max(start + 1));
        Item::new(ItemKind::Seq(items), Span::new(start..end))
    }

    fn mapping(&mut self, indent: usize) -> Item {
        let mut entries: Vec<Entry> = Vec::new();
        let start = self.lines[self.pos].start;

        while let Some(line) = self.peek() {
            if line.indent != indent {
                break;
            }
            let Some((key, value, value_start)) = line.split_key() else {
                self.diagnostics.emit(
                    Diagnostic::error("expected a `key: value` entry")
                        .with_code(ErrorCode::E103)
                        .with_label(Span::new(line.start..line.end()), "not a mapping entry")
                        .with_help("a sequence item cannot follow mapping entries at the same indentation"),
                );
                self.pos += 1;
                self.skip_deeper(indent);
                continue;
            };
            self.pos += 1;

            let value = if !value.is_empty() {
                self.line_value(value, value_start, indent)
            } else {
                match self.peek() {
                    // `key:` followed by `- item` at the same column
                    Some(next) if next.indent == indent && next.is_sequence_entry() => {
                        self.sequence(indent)
                    }
                    _ => self.nested(indent, key.span().end() + 1),
                }
            };

            if let Some(first) = entries.iter().find(|e| e.key.inner() == key.inner()) {
                self.diagnostics.emit(
                    Diagnostic::error(format!("duplicate key `{}`", key.inner()))
                        .with_code(ErrorCode::E102)
                        .with_label(key.span(), "duplicate key")
                        .with_secondary_label(first.key.span(), "first used here"),
                );
            }
            entries.push(Entry { key, value });
            self.skip_deeper(indent);
        }

        let end = entries.last().map_or(start, |e| e.value.span.end().max(e.key.span().end()));
        Item::new(ItemKind::Map(entries), Span::new(start..end))
    }

    /// Report and skip lines indented deeper than `indent`.
    fn skip_deeper(&mut self, indent: usize) {
        let Some(line) = self.peek().filter(|l| l.indent > indent) else {
            return;
        };
        self.unexpected_indentation(line);
        while self.peek().is_some_and(|l| l.indent > indent) {
            self.pos += 1;
        }
    }

    fn unexpected_indentation(&mut self, line: Line<'a>) {
        self.diagnostics.emit(
            Diagnostic::error("unexpected indentation")
                .with_code(ErrorCode::E005)
                .with_label(Span::new(line.start..line.end()), "does not belong to any block")
                .with_help("align the line with its siblings"),
        );
        self.pos = self.lines.len().min(self.pos + 1);
    }

    /// Extend a flow collection left open at the end of `text` with the
    /// continuation lines that follow. Gaps between lines become spaces so
    /// offsets into the result still map onto the source.
    fn continue_flow<'t>(&mut self, text: &'t str, offset: usize, indent: usize) -> Cow<'t, str> {
        let mut depth = flow_depth(text, 0);
        if depth == 0 || !text.starts_with(['[', '{']) {
            return Cow::Borrowed(text);
        }

        let mut joined = text.to_string();
        while depth > 0 {
            let Some(line) = self
                .peek()
                .filter(|l| l.indent > indent || l.text.starts_with([']', '}']))
            else {
                break;
            };
            let gap = line.start - offset - joined.len();
            joined.push_str(&" ".repeat(gap));
            joined.push_str(line.text);
            depth = flow_depth(line.text, depth);
            self.pos += 1;
        }
        Cow::Owned(joined)
    }

    /// Parse the value starting at `offset` on a line indented by `indent`.
    fn line_value(&mut self, text: &str, offset: usize, indent: usize) -> Item {
        let text = self.continue_flow(text, offset, indent);
        let mut input = LocatingSlice::new(text.as_ref());
        match flow_line(&mut input) {
            Ok(item) => {
                let item = item.offset(offset);
                self.check_flow_keys(&item);
                item
            }
            Err(e) => {
                let error_pos = input.current_token_start();
                let diagnostic = convert_flow_error(e, error_pos);
                self.diagnostics.extend(ParseError::from(diagnostic).offset(offset));
                Item::null(offset)
            }
        }
    }

    fn check_flow_keys(&mut self, item: &Item) {
        match &item.kind {
            ItemKind::Seq(items) => items.iter().for_each(|i| self.check_flow_keys(i)),
            ItemKind::Map(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    if let Some(first) = entries[..i].iter().find(|e| e.key.inner() == entry.key.inner()) {
                        self.diagnostics.emit(
                            Diagnostic::error(format!("duplicate key `{}`", entry.key.inner()))
                                .with_code(ErrorCode::E102)
                                .with_label(entry.key.span(), "duplicate key")
                                .with_secondary_label(first.key.span(), "first used here"),
                        );
                    }
                    self.check_flow_keys(&entry.value);
                }
            }
            _ => {}
        }
    }
}

/// Read `source` into an item tree.
pub(crate) fn read(source: &str) -> Result<Item, ParseError> {
    Reader::new(source).read()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(n: f64) -> ItemKind {
        ItemKind::Number(n)
    }

    fn string(item: &Item) -> &str {
        match &item.kind {
            ItemKind::Str { value, .. } => value,
            other => panic!("expected string, got {other:?}"),
        }
    }

    fn seq(item: &Item) -> &[Item] {
        match &item.kind {
            ItemKind::Seq(items) => items,
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    fn map(item: &Item) -> &[Entry] {
        match &item.kind {
            ItemKind::Map(entries) => entries,
            other => panic!("expected mapping, got {other:?}"),
        }
    }

    fn codes(source: &str) -> Vec<ErrorCode> {
        read(source)
            .unwrap_err()
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_block_mapping_and_sequences() {
        let source = "\
parameters:
  - $a: 1
  - $b
sketch:
- point: [$a, 2]
";
        let root = read(source).unwrap();
        let sections = map(&root);
        assert_eq!(sections[0].key.inner(), "parameters");
        let params = seq(&sections[0].value);
        assert_eq!(map(&params[0])[0].key.inner(), "$a");
        assert_eq!(map(&params[0])[0].value.kind, number(1.0));
        assert_eq!(string(&params[1]), "$b");

        // Compact sequence under `sketch:` at the same column.
        let steps = seq(&sections[1].value);
        let args = seq(&map(&steps[0])[0].value);
        assert_eq!(string(&args[0]), "$a");
        assert_eq!(args[1].kind, number(2.0));
    }

    #[test]
    fn test_nested_blocks_and_suffixed_keys() {
        let source = "
reference:
  - $obj:
      foo: 6
      baz: '\"red\"'
  - $p:sketch:
      - point: [2, 4]
";
        let root = read(source).unwrap();
        let refs = seq(&map(&root)[0].value);
        let obj = map(&map(&refs[0])[0].value);
        assert_eq!(obj[0].value.kind, number(6.0));
        assert_eq!(string(&obj[1].value), "\"red\"");

        let sketch_ref = &map(&refs[1])[0];
        assert_eq!(sketch_ref.key.inner(), "$p:sketch");
        assert_eq!(seq(&sketch_ref.value).len(), 1);
    }

    #[test]
    fn test_flow_collections() {
        let root = read("v: [2, false, \"3 + 5\", {x: 1, y: ~}, $arr[0], max($a, 2)]").unwrap();
        let items = seq(&map(&root)[0].value);
        assert_eq!(items.len(), 6);
        assert_eq!(items[1].kind, ItemKind::Bool(false));
        assert_eq!(string(&items[2]), "3 + 5");
        let point = map(&items[3]);
        assert_eq!(point[1].value.kind, ItemKind::Null);
        assert_eq!(string(&items[4]), "$arr[0]");
        assert_eq!(string(&items[5]), "max($a, 2)");
    }

    #[test]
    fn test_scalar_spans() {
        let source = "a: '$x + 1'";
        let root = read(source).unwrap();
        let value = &map(&root)[0].value;
        assert_eq!(value.span, Span::new(3..11));
        assert_eq!(value.content_start(), 4);
        assert_eq!(&source[value.content_start()..value.content_start() + 6], "$x + 1");
    }

    #[test]
    fn test_comments_and_plain_resolution() {
        let root = read("# header\na: -1.5e1 # trailing\nb: 'x # y'\nc: inf\n").unwrap();
        let entries = map(&root);
        assert_eq!(entries[0].value.kind, number(-15.0));
        assert_eq!(string(&entries[1].value), "x # y");
        assert_eq!(string(&entries[2].value), "inf");
    }

    #[test]
    fn test_indented_document() {
        let root = read("\n      sketch:\n        - point: [0, 0]\n").unwrap();
        assert_eq!(map(&root)[0].key.inner(), "sketch");
    }

    #[test]
    fn test_layout_errors() {
        assert_eq!(codes("a:\n\t- 1\n"), vec![ErrorCode::E004]);
        assert_eq!(codes("a: 1\n    b: 2\n"), vec![ErrorCode::E005]);
        assert_eq!(codes("a: 1\n- b\n"), vec![ErrorCode::E103]);
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(codes("a: [1, 2"), vec![ErrorCode::E101]);
        assert_eq!(codes("a: \"open"), vec![ErrorCode::E001]);
        assert_eq!(codes("a: [1, 2] 3"), vec![ErrorCode::E100]);
        assert_eq!(codes("a: {x 1}"), vec![ErrorCode::E100]);
        assert_eq!(codes("a: 1\na: 2"), vec![ErrorCode::E102]);
        assert_eq!(codes("a: {x: 1, x: 2}"), vec![ErrorCode::E102]);
    }

    #[test]
    fn test_multi_line_flow_collections() {
        let root = read("sketch:\n  - point: [\n      1,\n      2\n    ]\n").unwrap();
        let step = map(&seq(&map(&root)[0].value)[0]);
        assert_eq!(step[0].key.inner(), "point");
        let items = seq(&step[0].value);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].kind, number(1.0));
        assert_eq!(items[1].kind, number(2.0));

        let root = read("p: {\n  x: 1, # first\n  y: [2,\n    3],\n}\nq: 4\n").unwrap();
        let entries = map(&root);
        let p = map(&entries[0].value);
        assert_eq!(p.len(), 2);
        assert_eq!(p[0].value.kind, number(1.0));
        assert_eq!(seq(&p[1].value).len(), 2);
        assert_eq!(entries[1].key.inner(), "q");
        assert_eq!(entries[1].value.kind, number(4.0));
    }

    #[test]
    fn test_multi_line_flow_spans_and_errors() {
        let source = "a: [\n  1,\n  \"$b\"\n]\n";
        let root = read(source).unwrap();
        let value = &map(&root)[0].value;
        assert_eq!(value.span, Span::new(3..source.len() - 1));
        let second = &seq(value)[1];
        assert_eq!(second.content_start(), source.find("$b").unwrap());

        // A sibling key at the opening indentation ends the collection.
        assert_eq!(codes("a: [1,\n  2\nb: 3\n"), vec![ErrorCode::E101]);
        assert_eq!(codes("- [1,\n  {x 1}]\n"), vec![ErrorCode::E100]);

        let root = read("- [1,\n  2]\n- 3\n").unwrap();
        let items = seq(&root);
        assert_eq!(seq(&items[0]).len(), 2);
        assert_eq!(items[1].kind, number(3.0));
    }

    #[test]
    fn test_error_spans_are_absolute() {
        let err = read("key: [1, 2").unwrap_err();
        let label = &err.diagnostics()[0].labels()[0];
        assert_eq!(label.span().start(), 5);
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(read("# nothing\n").unwrap().kind, ItemKind::Null);
    }
}
