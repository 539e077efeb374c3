// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for L++ lexical analysis.
//!
//! Words are classified into keyword / unit / parameter / function /
//! primitive / looping / import / identifier subtypes at scan time, in
//! that priority order. Each token records its text, a byte [`Span`],
//! and a zero-based line/column [`Position`].
//!
//! Tokens live in a [`TokenStream`] arena addressed by index. Every
//! stream is bounded by `Start` and `End` sentinel tokens. Import
//! splicing concatenates index ranges of arenas; the chemical resolution
//! pass overwrites arena slots in place.

use ecow::EcoString;

use super::{Position, Span};
use crate::units::is_unit_word;

/// Reserved declaration keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Import,
    Container,
    Protocol,
    Reagent,
    Protein,
    Reaction,
    Pathway,
    Membrane,
    Domain,
    Plasm,
}

impl Keyword {
    const TABLE: &'static [(&'static str, Keyword)] = &[
        ("import", Self::Import),
        ("container", Self::Container),
        ("protocol", Self::Protocol),
        ("reagent", Self::Reagent),
        ("protein", Self::Protein),
        ("reaction", Self::Reaction),
        ("pathway", Self::Pathway),
        ("membrane", Self::Membrane),
        ("domain", Self::Domain),
        ("plasm", Self::Plasm),
    ];

    /// Looks up a keyword by its reserved word.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(text, _)| *text == word)
            .map(|(_, keyword)| *keyword)
    }

    /// Returns the reserved word for this keyword.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, keyword)| *keyword == self)
            .map_or("", |(text, _)| text)
    }
}

/// Built-in protocol functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    GetReagent,
    Mix,
    Add,
    Clear,
    Close,
    Pellet,
    Supernatant,
    Remove,
}

impl Function {
    const TABLE: &'static [(&'static str, Function)] = &[
        ("getReagent", Self::GetReagent),
        ("mix", Self::Mix),
        ("add", Self::Add),
        ("clear", Self::Clear),
        ("close", Self::Close),
        ("pellet", Self::Pellet),
        ("supernatant", Self::Supernatant),
        ("remove", Self::Remove),
    ];

    /// Looks up a function by its reserved word.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(text, _)| *text == word)
            .map(|(_, function)| *function)
    }
}

/// Reserved parameter names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    Ctr,
    Time,
    Spd,
    Vol,
    Temp,
    Form,
    Voltage,
    Config,
    Eq,
    Krev,
    Kcat,
    Km,
    K,
    Ki,
    N,
    Ka,
}

impl Param {
    const TABLE: &'static [(&'static str, Param)] = &[
        ("ctr", Self::Ctr),
        ("time", Self::Time),
        ("spd", Self::Spd),
        ("vol", Self::Vol),
        ("temp", Self::Temp),
        ("form", Self::Form),
        ("voltage", Self::Voltage),
        ("config", Self::Config),
        ("eq", Self::Eq),
        ("krev", Self::Krev),
        ("kcat", Self::Kcat),
        ("KM", Self::Km),
        ("k", Self::K),
        ("Ki", Self::Ki),
        ("n", Self::N),
        ("Ka", Self::Ka),
    ];

    /// Looks up a parameter by its reserved word.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(text, _)| *text == word)
            .map(|(_, param)| *param)
    }

    /// Returns the reserved word for this parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, param)| *param == self)
            .map_or("", |(text, _)| text)
    }
}

/// Primitive value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Int,
    Double,
    Float,
    Bool,
    String,
}

impl Primitive {
    const TABLE: &'static [(&'static str, Primitive)] = &[
        ("int", Self::Int),
        ("double", Self::Double),
        ("float", Self::Float),
        ("bool", Self::Bool),
        ("string", Self::String),
    ];

    /// Looks up a primitive by its reserved word.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(text, _)| *text == word)
            .map(|(_, primitive)| *primitive)
    }
}

/// Loop-introducing keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    For,
    While,
    Do,
}

impl LoopKind {
    /// Looks up a loop keyword by its reserved word.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "for" => Some(Self::For),
            "while" => Some(Self::While),
            "do" => Some(Self::Do),
            _ => None,
        }
    }
}

/// Single- and multi-character symbol tokens.
///
/// The scanner emits one token per symbol character except for `>=` and
/// `<=`. Multi-symbol operators (`&&`, `||`, the reaction arrows) are
/// recognised by the parser via exact lookahead over adjacent symbol
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Plus,
    Minus,
    Star,
    Slash,
    Equals,
    Bang,
    Comma,
    Dot,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
    Question,
    Percent,
    Caret,
    Pipe,
    Ampersand,
    Underscore,
    Colon,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    /// Not in the symbol table; rejection is deferred to the parser.
    Unknown,
}

impl Symbol {
    /// Classifies a single symbol character.
    #[must_use]
    pub fn from_char(c: char) -> Self {
        match c {
            '+' => Self::Plus,
            '-' => Self::Minus,
            '*' => Self::Star,
            '/' => Self::Slash,
            '=' => Self::Equals,
            '!' => Self::Bang,
            ',' => Self::Comma,
            '.' => Self::Dot,
            '>' => Self::Greater,
            '<' => Self::Less,
            '?' => Self::Question,
            '%' => Self::Percent,
            '^' => Self::Caret,
            '|' => Self::Pipe,
            '&' => Self::Ampersand,
            '_' => Self::Underscore,
            ':' => Self::Colon,
            ';' => Self::Semicolon,
            '(' => Self::LeftParen,
            ')' => Self::RightParen,
            '{' => Self::LeftBrace,
            '}' => Self::RightBrace,
            '[' => Self::LeftBracket,
            ']' => Self::RightBracket,
            _ => Self::Unknown,
        }
    }
}

/// The kind of token; the text itself lives on [`Token`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Stream-opening sentinel.
    Start,
    /// Stream-closing sentinel.
    End,
    /// A declared name: `water`, `r1`, `broth`.
    Identifier,
    /// A chemical reference; the token text holds the formula. The
    /// registry id is filled in by the resolver pass.
    Chemical { registry: Option<EcoString> },
    Keyword(Keyword),
    Function(Function),
    Param(Param),
    /// The word following an `import` keyword.
    ImportName,
    /// A unit word such as `mL` or `rpm`.
    Unit,
    Integer,
    Float,
    Str,
    Primitive(Primitive),
    Looping(LoopKind),
    Return,
    If,
    Else,
    Symbol(Symbol),
    /// Emitted only when whitespace reporting is enabled.
    Whitespace,
    /// Emitted only when newline reporting is enabled.
    Newline,
}

impl TokenKind {
    /// Returns `true` for the whitespace/newline trivia kinds.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Whitespace | Self::Newline)
    }

    /// Returns `true` for a specific symbol.
    #[must_use]
    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        matches!(self, Self::Symbol(s) if *s == symbol)
    }
}

/// A token with its text, byte span, and line/column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: EcoString,
    pub span: Span,
    pub pos: Position,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<EcoString>, span: Span, pos: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            pos,
        }
    }

    /// Creates a sentinel token at the given offset.
    #[must_use]
    pub fn sentinel(kind: TokenKind, offset: u32, line: u32, column: u32) -> Self {
        Self::new(
            kind,
            "",
            Span::new(offset, offset),
            Position::new(line, column, column),
        )
    }

    /// Static identifier-grammar predicate: first character is a letter
    /// or underscore, the remainder alphanumeric or underscore.
    #[must_use]
    pub fn is_identifier_text(text: &str) -> bool {
        let mut chars = text.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Checked integer parsing: `None` if the text is not a decimal
    /// integer or exceeds `max`.
    #[must_use]
    pub fn parse_integer(text: &str, max: u64) -> Option<u64> {
        let value: u64 = text.parse().ok()?;
        (value <= max).then_some(value)
    }
}

/// Classifies an alphanumeric word, in the fixed priority order.
///
/// `import_armed` is the one-shot import flag: it is set by the caller
/// after producing the literal keyword `import`, and a word that falls
/// through the reserved sets while it is armed becomes an [`TokenKind::ImportName`].
#[must_use]
pub fn classify_word(word: &str, import_armed: bool) -> TokenKind {
    if let Some(keyword) = Keyword::from_word(word) {
        TokenKind::Keyword(keyword)
    } else if is_unit_word(word) {
        TokenKind::Unit
    } else if let Some(param) = Param::from_word(word) {
        TokenKind::Param(param)
    } else if let Some(function) = Function::from_word(word) {
        TokenKind::Function(function)
    } else if let Some(primitive) = Primitive::from_word(word) {
        TokenKind::Primitive(primitive)
    } else if let Some(looping) = LoopKind::from_word(word) {
        TokenKind::Looping(looping)
    } else if word == "return" {
        TokenKind::Return
    } else if import_armed {
        TokenKind::ImportName
    } else if word == "if" {
        TokenKind::If
    } else if word == "else" {
        TokenKind::Else
    } else {
        TokenKind::Identifier
    }
}

/// An arena of tokens addressed by index.
///
/// Replacing a token (the chemical resolution pass) overwrites the slot
/// payload, keeping identity and position stable. Import splicing builds
/// a new stream by concatenating index ranges of source streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream from a token vector.
    #[must_use]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Appends a token, returning its index.
    pub fn push(&mut self, token: Token) -> usize {
        self.tokens.push(token);
        self.tokens.len() - 1
    }

    /// Overwrites the slot at `index`.
    pub fn replace(&mut self, index: usize, token: Token) {
        self.tokens[index] = token;
    }

    /// Returns the token at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Returns a mutable reference to the token at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Token> {
        self.tokens.get_mut(index)
    }

    /// Number of tokens, sentinels included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the stream holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The tokens as a slice.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Consumes the stream, returning its token vector.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Returns `true` if the token at `index` begins a chemical term:
    /// either a chemical token, or an integer coefficient immediately
    /// followed by one.
    #[must_use]
    pub fn is_chemical_term(&self, index: usize) -> bool {
        match self.tokens.get(index).map(|t| &t.kind) {
            Some(TokenKind::Chemical { .. }) => true,
            Some(TokenKind::Integer) => matches!(
                self.tokens.get(index + 1).map(|t| &t.kind),
                Some(TokenKind::Chemical { .. })
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_priority_order() {
        assert_eq!(
            classify_word("reaction", false),
            TokenKind::Keyword(Keyword::Reaction)
        );
        // Unit wins over identifier; reserved words win over units.
        assert_eq!(classify_word("mL", false), TokenKind::Unit);
        assert_eq!(classify_word("k", false), TokenKind::Param(Param::K));
        assert_eq!(classify_word("KM", false), TokenKind::Param(Param::Km));
        assert_eq!(
            classify_word("mix", false),
            TokenKind::Function(Function::Mix)
        );
        assert_eq!(
            classify_word("int", false),
            TokenKind::Primitive(Primitive::Int)
        );
        assert_eq!(
            classify_word("while", false),
            TokenKind::Looping(LoopKind::While)
        );
        assert_eq!(classify_word("return", false), TokenKind::Return);
        assert_eq!(classify_word("if", false), TokenKind::If);
        assert_eq!(classify_word("else", false), TokenKind::Else);
        assert_eq!(classify_word("water", false), TokenKind::Identifier);
    }

    #[test]
    fn import_flag_gates_import_names() {
        assert_eq!(classify_word("utils", true), TokenKind::ImportName);
        assert_eq!(classify_word("utils", false), TokenKind::Identifier);
        // Reserved words still win while the flag is armed.
        assert_eq!(
            classify_word("container", true),
            TokenKind::Keyword(Keyword::Container)
        );
    }

    #[test]
    fn identifier_text_predicate() {
        assert!(Token::is_identifier_text("water"));
        assert!(Token::is_identifier_text("_x1"));
        assert!(!Token::is_identifier_text("1x"));
        assert!(!Token::is_identifier_text(""));
        assert!(!Token::is_identifier_text("a-b"));
    }

    #[test]
    fn checked_integer_parse() {
        assert_eq!(Token::parse_integer("42", 100), Some(42));
        assert_eq!(Token::parse_integer("101", 100), None);
        assert_eq!(Token::parse_integer("4.2", 100), None);
        assert_eq!(Token::parse_integer("abc", 100), None);
    }

    #[test]
    fn chemical_term_detection() {
        let pos = Position::default();
        let stream = TokenStream::from_tokens(vec![
            Token::new(TokenKind::Integer, "2", Span::new(0, 1), pos),
            Token::new(
                TokenKind::Chemical { registry: None },
                "H2O",
                Span::new(2, 5),
                pos,
            ),
            Token::new(TokenKind::Integer, "3", Span::new(6, 7), pos),
        ]);
        assert!(stream.is_chemical_term(0));
        assert!(stream.is_chemical_term(1));
        assert!(!stream.is_chemical_term(2));
    }

    #[test]
    fn slot_replacement_keeps_neighbours() {
        let pos = Position::default();
        let mut stream = TokenStream::from_tokens(vec![
            Token::new(TokenKind::Identifier, "a", Span::new(0, 1), pos),
            Token::new(TokenKind::Identifier, "b", Span::new(2, 3), pos),
        ]);
        stream.replace(
            0,
            Token::new(
                TokenKind::Chemical { registry: None },
                "H2O",
                Span::new(0, 1),
                pos,
            ),
        );
        assert!(matches!(stream.get(0).unwrap().kind, TokenKind::Chemical { .. }));
        assert_eq!(stream.get(1).unwrap().text, "b");
    }
}
