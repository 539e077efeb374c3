// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical scanner for L++ source code.
//!
//! The scanner walks the source with an explicit `(position, line,
//! column)` cursor, producing a [`TokenStream`] bounded by `Start` and
//! `End` sentinels. Words are classified through the fixed priority
//! ladder in [`classify_word`]; the `import` keyword arms a one-shot
//! flag so the following word lexes as an import name.
//!
//! Lexical errors are recoverable: they are recorded in the
//! [`Diagnostics`] collector and scanning continues past the offending
//! span where feasible.

use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{Diagnostics, LexErrorKind};
use super::token::{classify_word, Keyword, Symbol, Token, TokenKind, TokenStream};
use super::{Position, Span};

/// The lexical scanner.
///
/// # Examples
///
/// ```
/// use lpp_core::source_analysis::{scan, TokenKind};
///
/// let (stream, diagnostics) = scan("water = 5;");
/// assert!(!diagnostics.has_errors());
/// assert_eq!(stream.len(), 6); // Start, water, =, 5, ;, End
/// ```
pub struct Scanner<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    position: usize,
    line: u32,
    column: u32,
    last_char: Option<char>,
    report_whitespace: bool,
    report_newlines: bool,
    multiline_strings: bool,
    import_armed: bool,
    diagnostics: Diagnostics,
}

/// Escape characters permitted inside string literals.
const STRING_ESCAPES: &[char] = &['a', 'b', 'f', 'n', 'r', 't', 'v', '\\', '?', '\'', '"'];

impl<'src> Scanner<'src> {
    /// Creates a scanner over `source` with all options at defaults
    /// (no whitespace/newline tokens, no multiline strings).
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            line: 0,
            column: 0,
            last_char: None,
            report_whitespace: false,
            report_newlines: false,
            multiline_strings: false,
            import_armed: false,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Enables or disables whitespace tokens. Disabling whitespace also
    /// disables newline reporting.
    pub fn set_report_whitespace(&mut self, enabled: bool) {
        self.report_whitespace = enabled;
        if !enabled {
            self.report_newlines = false;
        }
    }

    /// Enables or disables newline tokens. Enabling newlines also
    /// enables whitespace reporting.
    pub fn set_report_newlines(&mut self, enabled: bool) {
        self.report_newlines = enabled;
        if enabled {
            self.report_whitespace = true;
        }
    }

    /// Allows literal newlines inside string literals.
    pub fn set_multiline_strings(&mut self, enabled: bool) {
        self.multiline_strings = enabled;
    }

    /// Returns `true` while the one-shot import flag is armed.
    #[must_use]
    pub fn import_armed(&self) -> bool {
        self.import_armed
    }

    /// Scans the whole source, returning the sentinel-bounded stream and
    /// the collected diagnostics.
    #[must_use]
    pub fn scan(mut self) -> (TokenStream, Diagnostics) {
        let mut stream = TokenStream::new();
        stream.push(Token::sentinel(TokenKind::Start, 0, 0, 0));
        while let Some(token) = self.next_token() {
            stream.push(token);
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "source files over 4GB are not supported"
        )]
        let end = self.source.len() as u32;
        stream.push(Token::sentinel(TokenKind::End, end, self.line, self.column));
        tracing::debug!(tokens = stream.len(), "scan complete");
        (stream, self.diagnostics)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_char_second(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        let (index, c) = self.chars.next()?;
        self.position = index + c.len_utf8();
        match c {
            '\n' => {
                self.line += 1;
                self.column = 0;
            }
            '\t' => self.column = Position::after_tab(self.column),
            _ => self.column += 1,
        }
        self.last_char = Some(c);
        Some(c)
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if predicate(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Byte offset / line / column of the next unconsumed character.
    fn mark(&mut self) -> (usize, u32, u32) {
        let offset = self
            .chars
            .peek()
            .map_or(self.source.len(), |(index, _)| *index);
        (offset, self.line, self.column)
    }

    fn span_from(&self, start: usize) -> Span {
        (start..self.position).into()
    }

    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    fn token_since(&self, kind: TokenKind, start: (usize, u32, u32)) -> Token {
        let span = self.span_from(start.0);
        Token::new(
            kind,
            self.text_for(span),
            span,
            Position::new(start.1, start.2, self.column),
        )
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let start = self.mark();
            let c = self.peek_char()?;
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance_while(|c| c == ' ' || c == '\t' || c == '\r');
                    if self.report_whitespace {
                        return Some(self.token_since(TokenKind::Whitespace, start));
                    }
                }
                '\n' => {
                    self.advance();
                    if self.report_newlines {
                        return Some(self.token_since(TokenKind::Newline, start));
                    }
                }
                '/' => match self.peek_char_second() {
                    Some('/') => self.skip_line_comment(),
                    Some('*') => self.skip_block_comment(start),
                    _ => {
                        self.advance();
                        return Some(
                            self.token_since(TokenKind::Symbol(Symbol::Slash), start),
                        );
                    }
                },
                '"' | '\'' => return Some(self.scan_string(c, start)),
                '.' if self.peek_char_second().is_some_and(|c| c.is_ascii_digit()) => {
                    return Some(self.scan_number(start));
                }
                c if c.is_ascii_digit() => return Some(self.scan_number(start)),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    // A lone underscore is a symbol, not a word.
                    if c == '_' && !self.peek_char_second().is_some_and(is_word_char) {
                        self.advance();
                        return Some(
                            self.token_since(TokenKind::Symbol(Symbol::Underscore), start),
                        );
                    }
                    return Some(self.scan_word(start));
                }
                c if c.is_control() => {
                    self.advance();
                    self.report(LexErrorKind::InvalidControlCharacter, start);
                }
                _ => return Some(self.scan_symbol(start)),
            }
        }
    }

    fn report(&mut self, kind: LexErrorKind, start: (usize, u32, u32)) {
        let span = self.span_from(start.0);
        self.diagnostics.add_error(
            kind.to_string(),
            span,
            Position::new(start.1, start.2, self.column),
        );
    }

    fn skip_line_comment(&mut self) {
        self.advance_while(|c| c != '\n');
    }

    fn skip_block_comment(&mut self, start: (usize, u32, u32)) {
        self.advance(); // '/'
        self.advance(); // '*'
        loop {
            match self.peek_char() {
                None => {
                    self.report(LexErrorKind::UnterminatedBlockComment, start);
                    let span = self.span_from(start.0);
                    self.diagnostics.add_error(
                        "  Comment started here.",
                        span,
                        Position::new(start.1, start.2, start.2 + 2),
                    );
                    return;
                }
                Some('*') if self.peek_char_second() == Some('/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                Some('/') if self.peek_char_second() == Some('*') => {
                    let inner = self.mark();
                    self.advance();
                    self.advance();
                    self.report(LexErrorKind::NestedBlockComment, inner);
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_word(&mut self, start: (usize, u32, u32)) -> Token {
        self.advance_while(is_word_char);
        let span = self.span_from(start.0);
        let word = self.text_for(span);
        let kind = classify_word(word, self.import_armed);
        match kind {
            TokenKind::Keyword(Keyword::Import) => self.import_armed = true,
            TokenKind::ImportName => self.import_armed = false,
            _ => {}
        }
        Token::new(kind, word, span, Position::new(start.1, start.2, self.column))
    }

    fn scan_number(&mut self, start: (usize, u32, u32)) -> Token {
        let mut is_float = false;
        if self.peek_char() == Some('.') {
            // ".5"-style float; flag a missing space after an identifier.
            if self.last_char.is_some_and(is_word_char) {
                self.report(LexErrorKind::MissingSpaceBeforeDecimal, start);
            }
            is_float = true;
            self.advance();
        }
        self.advance_while(|c| c.is_ascii_digit());
        if !is_float && self.peek_char() == Some('.') {
            if self.peek_char_second().is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                self.advance();
                self.advance_while(|c| c.is_ascii_digit());
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let next = self.peek_char_second();
            let exponent_start = self.mark();
            // An exponent marker not followed by a word ("2each") leaves
            // the letter to the word scanner.
            if !next.is_some_and(|c| is_word_char(c) && !c.is_ascii_digit()) {
                is_float = true;
                self.advance(); // e
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.advance();
                }
                if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance_while(|c| c.is_ascii_digit());
                } else {
                    self.report(LexErrorKind::MissingExponent, exponent_start);
                }
            }
        }
        let kind = if is_float {
            TokenKind::Float
        } else {
            TokenKind::Integer
        };
        self.token_since(kind, start)
    }

    fn scan_string(&mut self, delimiter: char, start: (usize, u32, u32)) -> Token {
        self.advance(); // opening delimiter
        let content_start = self.mark();
        let mut content_end = content_start.0;
        loop {
            let escape_start = self.mark();
            match self.peek_char() {
                None => {
                    self.report(LexErrorKind::UnterminatedString, start);
                    break;
                }
                Some('\n') if !self.multiline_strings => {
                    self.report(LexErrorKind::NewlineInString, start);
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some(c) if STRING_ESCAPES.contains(&c) => {}
                        Some(c) => self.report(LexErrorKind::InvalidEscape(c), escape_start),
                        None => {
                            self.report(LexErrorKind::UnterminatedString, start);
                            break;
                        }
                    }
                    content_end = self.position;
                }
                Some(c) if c == delimiter => {
                    content_end = self.mark().0;
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                    content_end = self.position;
                }
            }
        }
        let span = self.span_from(start.0);
        let text = &self.source[content_start.0..content_end];
        Token::new(
            TokenKind::Str,
            text,
            span,
            Position::new(start.1, start.2, self.column),
        )
    }

    fn scan_symbol(&mut self, start: (usize, u32, u32)) -> Token {
        let c = self.advance().unwrap_or('\0');
        let symbol = match (c, self.peek_char()) {
            ('>', Some('=')) => {
                self.advance();
                Symbol::GreaterEqual
            }
            ('<', Some('=')) => {
                self.advance();
                Symbol::LessEqual
            }
            _ => Symbol::from_char(c),
        };
        self.token_since(TokenKind::Symbol(symbol), start)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Scans `source` with default options.
#[must_use]
pub fn scan(source: &str) -> (TokenStream, Diagnostics) {
    Scanner::new(source).scan()
}
