// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive-descent parser for L++ token streams.
//!
//! Statements are dispatched on the current token kind; expressions use
//! precedence climbing, lowest binding first: ternary/logical-or,
//! logical-and, bitwise-or, bitwise-and, equality, relational, slice,
//! reaction arrow, additive, multiplicative, primary. Multi-character
//! operators (`&&`, `==`, the arrows) are recognised by exact lookahead
//! over adjacent symbol tokens, since the scanner emits one token per
//! symbol character.
//!
//! Arithmetic is folded inline: every assignment right-hand side that is
//! not a reaction equation is reduced to a single number against the
//! current scope while the tree is being built. The first structural
//! error aborts the parse; only warnings accumulate.

use crate::ast::{BinaryOp, Node, NumberValue, ParamKind, Program};
use crate::source_analysis::{
    Diagnostics, Keyword, Primitive, Span, Symbol, Token, TokenKind, TokenStream,
};
use crate::units::{split_unit, Prefix, Unit};

use super::error::{ParseError, ParseErrorKind};
use super::eval::evaluate;
use super::scope::{ScopeId, ScopeRegistry, SymbolValue};

/// Which declaration block the parser is currently inside. Bare
/// numeric/chemical statements are only legal in `container` and
/// `reagent` blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Global,
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

impl From<Keyword> for BlockType {
    fn from(keyword: Keyword) -> Self {
        match keyword {
            Keyword::Container => Self::Container,
            Keyword::Protocol => Self::Protocol,
            Keyword::Reagent => Self::Reagent,
            Keyword::Protein => Self::Protein,
            Keyword::Reaction => Self::Reaction,
            Keyword::Pathway => Self::Pathway,
            Keyword::Membrane => Self::Membrane,
            Keyword::Domain => Self::Domain,
            Keyword::Plasm => Self::Plasm,
            Keyword::Import => Self::Global,
        }
    }
}

/// The result of a successful parse: the statement chain, the scope
/// registry built alongside it, and any non-fatal warnings.
#[derive(Debug)]
pub struct Parsed {
    pub program: Program,
    pub scopes: ScopeRegistry,
    pub diagnostics: Diagnostics,
}

/// Parses a scanned, linked, chemical-resolved token stream.
///
/// # Errors
///
/// Returns the first structural error; there is no resynchronisation.
pub fn parse(stream: &TokenStream) -> Result<Parsed, ParseError> {
    Parser::new(stream).run()
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    scopes: ScopeRegistry,
    block_type: BlockType,
    last_unit: Unit,
    diagnostics: Diagnostics,
}

impl Parser {
    fn new(stream: &TokenStream) -> Self {
        // Trivia and the opening sentinel never reach the grammar.
        let mut tokens: Vec<Token> = stream
            .tokens()
            .iter()
            .filter(|t| !t.kind.is_trivia() && t.kind != TokenKind::Start)
            .cloned()
            .collect();
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::End) {
            tokens.push(Token::sentinel(TokenKind::End, 0, 0, 0));
        }
        Self {
            tokens,
            cursor: 0,
            scopes: ScopeRegistry::new(),
            block_type: BlockType::Global,
            last_unit: Unit::None,
            diagnostics: Diagnostics::new(),
        }
    }

    fn run(mut self) -> Result<Parsed, ParseError> {
        if self.peek().kind == TokenKind::End {
            return Err(self.error_here(ParseErrorKind::UnexpectedEnd));
        }

        self.scopes.open("global");
        let mut statements = Vec::new();
        while self.peek().kind != TokenKind::End {
            self.parse_statement(&mut statements)?;
        }
        self.scopes.close();

        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => first.span().merge(last.span()),
            _ => Span::new(0, 0),
        };
        Ok(Parsed {
            program: Program { statements, span },
            scopes: self.scopes,
            diagnostics: self.diagnostics,
        })
    }

    // ------------------------------------------------------------------
    // cursor helpers

    fn peek(&self) -> &Token {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, n: usize) -> &Token {
        &self.tokens[(self.cursor + n).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::End {
            self.cursor += 1;
        }
        token
    }

    fn at_symbol(&self, symbol: Symbol) -> bool {
        self.peek().kind.is_symbol(symbol)
    }

    fn symbol_at(&self, n: usize, symbol: Symbol) -> bool {
        self.peek_at(n).kind.is_symbol(symbol)
    }

    fn error_here(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.peek().span)
    }

    fn unexpected_here(&self) -> ParseError {
        let token = self.peek();
        ParseError::unexpected(token.text.clone(), token.span)
    }

    fn expect_symbol(&mut self, symbol: Symbol, what: &str) -> Result<Token, ParseError> {
        if self.at_symbol(symbol) {
            Ok(self.advance())
        } else {
            Err(self.error_here(ParseErrorKind::ExpectedToken(what.into())))
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), ParseError> {
        self.expect_symbol(Symbol::Semicolon, "';'")?;
        Ok(())
    }

    /// Consumes the terminator closing an assignment: `;`, `,`, or `)`.
    fn finish_assignment(&mut self) -> Result<(), ParseError> {
        if self.at_symbol(Symbol::Semicolon)
            || self.at_symbol(Symbol::Comma)
            || self.at_symbol(Symbol::RightParen)
        {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(ParseErrorKind::ExpectedToken(
                "';', ',' or ')' after assignment".into(),
            )))
        }
    }

    fn current_scope(&self) -> ScopeId {
        self.scopes.current().unwrap_or(0)
    }

    fn fold(&self, node: &Node) -> Result<NumberValue, ParseError> {
        evaluate(node, &self.scopes, self.current_scope()).map_err(Into::into)
    }

    fn fold_to_node(&self, node: Node) -> Result<Node, ParseError> {
        let span = node.span();
        let value = self.fold(&node)?;
        Ok(Node::Number { value, span })
    }

    // ------------------------------------------------------------------
    // statements

    fn parse_statement(&mut self, out: &mut Vec<Node>) -> Result<(), ParseError> {
        match self.peek().kind.clone() {
            TokenKind::If => {
                let statement = self.parse_if()?;
                out.push(statement);
            }
            TokenKind::Looping(kind) => {
                let statement = self.parse_loop(kind)?;
                out.push(statement);
            }
            TokenKind::Return => {
                let start = self.advance().span;
                let value = self.parse_expression()?;
                self.expect_semicolon()?;
                let span = start.merge(value.span());
                out.push(Node::Return {
                    value: Box::new(value),
                    span,
                });
            }
            TokenKind::Keyword(Keyword::Import) => {
                let start = self.advance().span;
                let token = self.peek().clone();
                if token.kind != TokenKind::ImportName {
                    return Err(self.error_here(ParseErrorKind::ExpectedToken(
                        "a module name after 'import'".into(),
                    )));
                }
                self.advance();
                self.expect_semicolon()?;
                out.push(Node::Import {
                    name: token.text,
                    span: start.merge(token.span),
                });
            }
            TokenKind::Keyword(keyword) => {
                let flat = matches!(
                    keyword,
                    Keyword::Reaction | Keyword::Protein | Keyword::Reagent | Keyword::Container
                ) && self.peek_at(2).kind.is_symbol(Symbol::LeftParen);
                let statement = if flat {
                    self.parse_flat_declaration(keyword)?
                } else {
                    self.parse_declaration(keyword)?
                };
                out.push(statement);
            }
            TokenKind::Param(_) => {
                self.parse_param_items(out)?;
            }
            TokenKind::Identifier => {
                let statement = self.parse_identifier_statement()?;
                out.push(statement);
            }
            TokenKind::Primitive(primitive) => {
                let statement = self.parse_primitive_declaration(primitive)?;
                out.push(statement);
            }
            TokenKind::Integer | TokenKind::Float | TokenKind::Chemical { .. } => {
                if matches!(self.block_type, BlockType::Container | BlockType::Reagent) {
                    self.parse_param_items(out)?;
                } else {
                    return Err(self.error_here(ParseErrorKind::ExpectedToken(
                        "a parameter name; bare values are only inferred inside \
                         'container' and 'reagent' blocks"
                            .into(),
                    )));
                }
            }
            _ => return Err(self.unexpected_here()),
        }
        Ok(())
    }

    fn parse_if(&mut self) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let condition = self.parse_expression()?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.peek().kind == TokenKind::Else {
            self.advance();
            self.parse_block()?
        } else {
            Vec::new()
        };
        let end = self.peek_at(0).span;
        Ok(Node::If {
            condition: Box::new(condition),
            then_branch,
            else_branch,
            span: start.merge(end),
        })
    }

    fn parse_loop(&mut self, kind: crate::source_analysis::LoopKind) -> Result<Node, ParseError> {
        use crate::source_analysis::LoopKind;
        let start = self.advance().span;
        match kind {
            LoopKind::For => {
                self.expect_symbol(Symbol::LeftParen, "'(' after 'for'")?;
                let TokenKind::Primitive(primitive) = self.peek().kind else {
                    return Err(self.error_here(ParseErrorKind::ExpectedToken(
                        "a primitive loop-variable declaration".into(),
                    )));
                };
                let init = self.parse_primitive_declaration(primitive)?;
                let condition = self.parse_expression()?;
                self.expect_semicolon()?;
                let name = self.peek().clone();
                if name.kind != TokenKind::Identifier {
                    return Err(self.error_here(ParseErrorKind::ExpectedToken(
                        "the loop variable in the increment clause".into(),
                    )));
                }
                self.advance();
                let target = Node::Identifier {
                    name: name.text,
                    primitive: None,
                    span: name.span,
                };
                // The increment stays a tree; it re-runs per iteration.
                let increment = self.parse_assignment(target, false, None)?;
                let body = self.parse_block()?;
                let span = start.merge(self.peek_at(0).span);
                Ok(Node::Looping {
                    kind,
                    init: Some(Box::new(init)),
                    condition: Box::new(condition),
                    increment: Some(Box::new(increment)),
                    body,
                    span,
                })
            }
            LoopKind::While => {
                let condition = self.parse_expression()?;
                let body = self.parse_block()?;
                let span = start.merge(self.peek_at(0).span);
                Ok(Node::Looping {
                    kind,
                    init: None,
                    condition: Box::new(condition),
                    increment: None,
                    body,
                    span,
                })
            }
            LoopKind::Do => Err(ParseError::unexpected("do", start)),
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Node>, ParseError> {
        self.expect_symbol(Symbol::LeftBrace, "'{'")?;
        let mut statements = Vec::new();
        loop {
            if self.at_symbol(Symbol::RightBrace) {
                self.advance();
                return Ok(statements);
            }
            if self.peek().kind == TokenKind::End {
                return Err(self.error_here(ParseErrorKind::ExpectedToken(
                    "'}' to close the block".into(),
                )));
            }
            self.parse_statement(&mut statements)?;
        }
    }

    /// `keyword name { ... }` or the function form `keyword name() { ... }`.
    fn parse_declaration(&mut self, keyword: Keyword) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let name = self.peek().clone();
        if name.kind != TokenKind::Identifier {
            return Err(self.error_here(ParseErrorKind::ExpectedToken(
                "a name after the declaration keyword".into(),
            )));
        }
        self.advance();

        let outer_block = self.block_type;
        self.block_type = BlockType::from(keyword);
        self.scopes.open(name.text.clone());

        if self.at_symbol(Symbol::LeftParen) {
            self.advance();
            self.expect_symbol(Symbol::RightParen, "')'")?;
            self.scopes
                .define(name.text.clone(), keyword.as_str(), SymbolValue::Text("function".into()));
        } else if self.at_symbol(Symbol::LeftBrace) {
            self.scopes
                .define(name.text.clone(), keyword.as_str(), SymbolValue::Text("block".into()));
        } else {
            return Err(self.error_here(ParseErrorKind::ExpectedToken(
                "'()' for a function declaration or '{' for a block".into(),
            )));
        }

        let body = self.parse_block()?;
        self.scopes.close();
        self.block_type = outer_block;

        let span = start.merge(self.peek_at(0).span);
        Ok(Node::Declaration {
            keyword,
            name: name.text,
            body,
            flat: false,
            span,
        })
    }

    /// The flat form `reaction r1(eq = ..., k = ..., krev = ...);`.
    fn parse_flat_declaration(&mut self, keyword: Keyword) -> Result<Node, ParseError> {
        let start = self.advance().span;
        let name = self.peek().clone();
        if name.kind != TokenKind::Identifier {
            return Err(self.error_here(ParseErrorKind::ExpectedToken(
                "a name after the declaration keyword".into(),
            )));
        }
        self.advance();
        self.scopes.define(
            name.text.clone(),
            keyword.as_str(),
            SymbolValue::Text(keyword.as_str().into()),
        );
        self.scopes.open(name.text.clone());

        self.expect_symbol(Symbol::LeftParen, "'('")?;
        let mut body = Vec::new();
        if self.at_symbol(Symbol::RightParen) {
            self.advance();
        } else {
            self.parse_param_items(&mut body)?;
        }
        if self.at_symbol(Symbol::Semicolon) {
            self.advance();
        }
        self.scopes.close();

        let span = start.merge(self.peek_at(0).span);
        Ok(Node::Declaration {
            keyword,
            name: name.text,
            body,
            flat: true,
            span,
        })
    }

    /// A comma-separated chain of parameter assignments, ended by `;` or
    /// `)`. Items are either named (`k = 3`), a bare reaction equation,
    /// or a bare value whose parameter is inferred from its unit.
    fn parse_param_items(&mut self, out: &mut Vec<Node>) -> Result<(), ParseError> {
        loop {
            let item = self.parse_param_item()?;
            out.push(item);

            if self.at_symbol(Symbol::Comma) {
                self.advance();
                continue;
            }
            if self.at_symbol(Symbol::Semicolon) || self.at_symbol(Symbol::RightParen) {
                self.advance();
                return Ok(());
            }
            return Err(self.error_here(ParseErrorKind::ExpectedToken(
                "',' between parameters, or ';' or ')' to end them".into(),
            )));
        }
    }

    fn parse_param_item(&mut self) -> Result<Node, ParseError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Param(param) => {
                let param = *param;
                if self.symbol_at(1, Symbol::Equals) {
                    self.advance();
                    self.advance();
                    self.parse_param_value(ParamKind::from(param), param.as_str(), token.span)
                } else if self.equation_follows(1) {
                    // `eq` directly followed by its equation.
                    self.advance();
                    self.parse_param_value(ParamKind::Equation, "eq", token.span)
                } else {
                    Err(self.error_here(ParseErrorKind::ExpectedToken(
                        "'=' after the parameter name".into(),
                    )))
                }
            }
            TokenKind::Chemical { .. } | TokenKind::Identifier => {
                self.parse_param_value(ParamKind::Equation, "eq", token.span)
            }
            TokenKind::Integer if self.equation_follows(0) => {
                self.parse_param_value(ParamKind::Equation, "eq", token.span)
            }
            TokenKind::Integer | TokenKind::Float => self.parse_inferred_param(),
            _ => Err(self.unexpected_here()),
        }
    }

    fn equation_follows(&self, n: usize) -> bool {
        match &self.peek_at(n).kind {
            TokenKind::Chemical { .. } => true,
            TokenKind::Integer => matches!(
                self.peek_at(n + 1).kind,
                TokenKind::Chemical { .. } | TokenKind::Identifier
            ),
            _ => false,
        }
    }

    fn parse_param_value(
        &mut self,
        kind: ParamKind,
        name: &str,
        start: Span,
    ) -> Result<Node, ParseError> {
        let value = self.parse_expression()?;
        let span = start.merge(value.span());
        let right = if kind == ParamKind::Equation || value.is_equation_shaped() {
            self.scopes
                .define(name, "eq", SymbolValue::Text("eq".into()));
            value
        } else {
            let folded = self.fold(&value)?;
            self.scopes
                .define(name, name, SymbolValue::Number(folded.value));
            Node::Number {
                value: folded,
                span: value.span(),
            }
        };
        Ok(Node::Binary {
            op: BinaryOp::Assign,
            left: Box::new(Node::Param { param: kind, span: start }),
            right: Box::new(right),
            span,
        })
    }

    /// A nameless value such as `500 mL;` inside a `reagent` block; its
    /// parameter is inferred from the unit it carries.
    fn parse_inferred_param(&mut self) -> Result<Node, ParseError> {
        let start = self.peek().span;
        let value = self.parse_expression()?;
        let span = start.merge(value.span());

        if value.is_equation_shaped() {
            self.scopes
                .define("eq", "eq", SymbolValue::Text("eq".into()));
            self.last_unit = Unit::None;
            return Ok(Node::Binary {
                op: BinaryOp::Assign,
                left: Box::new(Node::Param {
                    param: ParamKind::Equation,
                    span: start,
                }),
                right: Box::new(value),
                span,
            });
        }

        let Some(kind) = ParamKind::from_unit(self.last_unit) else {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedToken(
                    "a unit this value's parameter can be inferred from".into(),
                ),
                span,
            ));
        };
        let folded = self.fold(&value)?;
        self.scopes.define(
            kind.as_str(),
            kind.as_str(),
            SymbolValue::Number(folded.value),
        );
        self.last_unit = Unit::None;
        Ok(Node::Binary {
            op: BinaryOp::Assign,
            left: Box::new(Node::Param { param: kind, span: start }),
            right: Box::new(Node::Number {
                value: folded,
                span: value.span(),
            }),
            span,
        })
    }

    fn parse_identifier_statement(&mut self) -> Result<Node, ParseError> {
        let token = self.peek().clone();
        if self.symbol_at(1, Symbol::Equals) {
            self.advance();
            let target = Node::Identifier {
                name: token.text,
                primitive: None,
                span: token.span,
            };
            self.parse_assignment(target, true, None)
        } else if self.symbol_at(1, Symbol::Dot) {
            self.parse_call()
        } else if self.symbol_at(1, Symbol::LeftBracket) {
            let target = self.parse_index()?;
            // Change-point values stay trees for the context builder.
            self.parse_assignment(target, false, None)
        } else {
            Err(self.unexpected_here())
        }
    }

    /// `left = <expr>` with the terminator consumed. When `fold` is set
    /// the right-hand side is reduced to a number in the tree; the scope
    /// binding is updated either way.
    fn parse_assignment(
        &mut self,
        left: Node,
        fold: bool,
        primitive: Option<Primitive>,
    ) -> Result<Node, ParseError> {
        self.expect_symbol(Symbol::Equals, "'='")?;
        let value = self.parse_expression()?;
        let span = left.span().merge(value.span());

        let bound_name = match &left {
            Node::Identifier { name, .. } => Some(name.clone()),
            Node::Index { target, .. } => match target.as_ref() {
                Node::Identifier { name, .. } => Some(name.clone()),
                _ => None,
            },
            _ => None,
        };
        let declared_as = primitive.map_or("identifier", primitive_word);

        let right = if value.is_equation_shaped() {
            value
        } else if let Node::Text { value: text, .. } = &value {
            if let Some(name) = bound_name {
                self.scopes
                    .define(name, declared_as, SymbolValue::Text(text.clone()));
            }
            value
        } else {
            let folded = self.fold(&value)?;
            if let Some(name) = bound_name {
                self.scopes
                    .define(name, declared_as, SymbolValue::Number(folded.value));
            }
            if fold {
                Node::Number {
                    value: folded,
                    span: value.span(),
                }
            } else {
                value
            }
        };

        let left = if let (Node::Identifier { name, span, .. }, Some(p)) = (&left, primitive) {
            Node::Identifier {
                name: name.clone(),
                primitive: Some(p),
                span: *span,
            }
        } else {
            left
        };

        self.finish_assignment()?;
        Ok(Node::Binary {
            op: BinaryOp::Assign,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    /// `int x = 5;`
    fn parse_primitive_declaration(&mut self, primitive: Primitive) -> Result<Node, ParseError> {
        self.advance();
        let name = self.peek().clone();
        if name.kind != TokenKind::Identifier {
            return Err(self.error_here(ParseErrorKind::ExpectedToken(
                "a name after the primitive type".into(),
            )));
        }
        self.advance();
        let target = Node::Identifier {
            name: name.text,
            primitive: Some(primitive),
            span: name.span,
        };
        self.parse_assignment(target, true, Some(primitive))
    }

    /// `receiver.function(args);`
    fn parse_call(&mut self) -> Result<Node, ParseError> {
        let receiver = self.advance();
        self.expect_symbol(Symbol::Dot, "'.'")?;
        let token = self.peek().clone();
        let TokenKind::Function(function) = token.kind else {
            return Err(self.error_here(ParseErrorKind::ExpectedToken(
                "a built-in function after '.'".into(),
            )));
        };
        self.advance();

        self.expect_symbol(Symbol::LeftParen, "'(' after the function name")?;
        let mut arguments = Vec::new();
        if self.at_symbol(Symbol::RightParen) {
            self.advance();
        } else {
            self.parse_param_items(&mut arguments)?;
        }
        self.expect_semicolon()?;

        let span = receiver.span.merge(self.peek_at(0).span);
        Ok(Node::Call {
            receiver: Some(receiver.text),
            function,
            arguments,
            span,
        })
    }

    /// `name[<expr>]`, where the inner expression may be a slice.
    fn parse_index(&mut self) -> Result<Node, ParseError> {
        let name = self.advance();
        let target = Node::Identifier {
            name: name.text,
            primitive: None,
            span: name.span,
        };
        self.expect_symbol(Symbol::LeftBracket, "'['")?;
        let index = self.parse_expression()?;
        let close = self.expect_symbol(Symbol::RightBracket, "']'")?;
        Ok(Node::Index {
            target: Box::new(target),
            index: Box::new(index),
            span: name.span.merge(close.span),
        })
    }

    // ------------------------------------------------------------------
    // expressions

    fn parse_expression(&mut self) -> Result<Node, ParseError> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_logical_and()?;
        if self.at_symbol(Symbol::Pipe) && self.symbol_at(1, Symbol::Pipe) {
            self.advance();
            self.advance();
            let right = self.parse_logical_and()?;
            return Ok(binary(BinaryOp::LogicalOr, left, right));
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_bit_or()?;
        if self.at_symbol(Symbol::Ampersand) && self.symbol_at(1, Symbol::Ampersand) {
            self.advance();
            self.advance();
            let right = self.parse_bit_or()?;
            return Ok(binary(BinaryOp::LogicalAnd, left, right));
        }
        Ok(left)
    }

    fn parse_bit_or(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_bit_and()?;
        // `|` but not `||` (and not the tail of `--|`, which the arrow
        // level consumed already).
        if self.at_symbol(Symbol::Pipe) && !self.symbol_at(1, Symbol::Pipe) {
            self.advance();
            let right = self.parse_bit_and()?;
            return Ok(binary(BinaryOp::BitOr, left, right));
        }
        Ok(left)
    }

    fn parse_bit_and(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_equality()?;
        if self.at_symbol(Symbol::Ampersand) && !self.symbol_at(1, Symbol::Ampersand) {
            self.advance();
            let right = self.parse_equality()?;
            return Ok(binary(BinaryOp::BitAnd, left, right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_relational()?;
        let equal = self.at_symbol(Symbol::Equals) && self.symbol_at(1, Symbol::Equals);
        let not_equal = self.at_symbol(Symbol::Bang) && self.symbol_at(1, Symbol::Equals);
        if equal || not_equal {
            self.advance();
            self.advance();
            let right = self.parse_relational()?;
            let op = if equal {
                BinaryOp::Equal
            } else {
                BinaryOp::NotEqual
            };
            return Ok(binary(op, left, right));
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_slice()?;
        let op = if self.at_symbol(Symbol::GreaterEqual) {
            Some(BinaryOp::GreaterEqual)
        } else if self.at_symbol(Symbol::LessEqual) {
            Some(BinaryOp::LessEqual)
        } else if self.at_symbol(Symbol::Greater) {
            Some(BinaryOp::Greater)
        } else if self.at_symbol(Symbol::Less) && !self.symbol_at(1, Symbol::Minus) {
            Some(BinaryOp::Less)
        } else {
            None
        };
        if let Some(op) = op {
            self.advance();
            let right = self.parse_additive()?;
            return Ok(binary(op, left, right));
        }
        Ok(left)
    }

    /// `[a:b]` slice bounds; either side may be omitted. Bounds are
    /// always folded to numbers.
    fn parse_slice(&mut self) -> Result<Node, ParseError> {
        if self.at_symbol(Symbol::Colon) {
            let colon = self.advance();
            if self.at_symbol(Symbol::RightBracket) {
                return Ok(Node::Range {
                    start: None,
                    end: None,
                    span: colon.span,
                });
            }
            let bound = self.parse_arrow()?;
            let end = self.fold_to_node(bound)?;
            let span = colon.span.merge(end.span());
            return Ok(Node::Range {
                start: None,
                end: Some(Box::new(end)),
                span,
            });
        }

        let left = self.parse_arrow()?;
        if !self.at_symbol(Symbol::Colon) {
            return Ok(left);
        }
        self.advance();
        let start = self.fold_to_node(left)?;
        if self.at_symbol(Symbol::RightBracket) {
            let span = start.span();
            return Ok(Node::Range {
                start: Some(Box::new(start)),
                end: None,
                span,
            });
        }
        let bound = self.parse_arrow()?;
        let end = self.fold_to_node(bound)?;
        let span = start.span().merge(end.span());
        Ok(Node::Range {
            start: Some(Box::new(start)),
            end: Some(Box::new(end)),
            span,
        })
    }

    fn parse_arrow(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_additive()?;

        let forward = self.at_symbol(Symbol::Minus)
            && self.symbol_at(1, Symbol::Minus)
            && self.symbol_at(2, Symbol::Greater);
        let backward = self.at_symbol(Symbol::Less)
            && self.symbol_at(1, Symbol::Minus)
            && self.symbol_at(2, Symbol::Minus);
        let reversible = self.at_symbol(Symbol::Less)
            && self.symbol_at(1, Symbol::Minus)
            && self.symbol_at(2, Symbol::Greater);
        let inhibition = self.at_symbol(Symbol::Minus)
            && self.symbol_at(1, Symbol::Minus)
            && self.symbol_at(2, Symbol::Pipe);

        let op = if forward {
            BinaryOp::Forward
        } else if backward {
            BinaryOp::Backward
        } else if reversible {
            BinaryOp::Reversible
        } else if inhibition {
            BinaryOp::Inhibition
        } else {
            return Ok(left);
        };
        self.advance();
        self.advance();
        self.advance();
        let right = self.parse_additive()?;
        Ok(binary(op, left, right))
    }

    fn parse_additive(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_multiplicative()?;
        // A lone `-`; two in a row belong to an arrow.
        let subtract = self.at_symbol(Symbol::Minus) && !self.symbol_at(1, Symbol::Minus);
        if self.at_symbol(Symbol::Plus) || subtract {
            let op = if subtract {
                BinaryOp::Subtract
            } else {
                BinaryOp::Add
            };
            self.advance();
            let right = self.parse_additive()?;
            return Ok(binary(op, left, right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Node, ParseError> {
        let left = self.parse_primary()?;
        let op = if self.at_symbol(Symbol::Star) {
            Some(BinaryOp::Multiply)
        } else if self.at_symbol(Symbol::Slash) {
            Some(BinaryOp::Divide)
        } else if self.at_symbol(Symbol::Percent) {
            Some(BinaryOp::Modulo)
        } else {
            None
        };
        if let Some(op) = op {
            self.advance();
            let right = self.parse_multiplicative()?;
            return Ok(binary(op, left, right));
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::Symbol(Symbol::LeftParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_symbol(Symbol::RightParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Node::Identifier {
                    name: token.text,
                    primitive: None,
                    span: token.span,
                })
            }
            TokenKind::Chemical { .. } => {
                self.advance();
                Ok(Node::Chemical {
                    formula: token.text,
                    span: token.span,
                })
            }
            TokenKind::Str => {
                self.advance();
                Ok(Node::Text {
                    value: token.text,
                    span: token.span,
                })
            }
            TokenKind::Integer | TokenKind::Float => self.parse_number(),
            _ => Err(self.unexpected_here()),
        }
    }

    fn parse_number(&mut self) -> Result<Node, ParseError> {
        let token = self.advance();
        let Ok(parsed) = token.text.parse::<f64>() else {
            return Err(ParseError::unexpected(token.text, token.span));
        };
        let mut value = if token.kind == TokenKind::Integer {
            NumberValue::integer(parsed)
        } else {
            NumberValue::float(parsed)
        };

        if self.peek().kind == TokenKind::Unit {
            let unit_token = self.advance();
            let Some((prefix, unit)) = split_unit(&unit_token.text) else {
                return Err(ParseError::unexpected(unit_token.text, unit_token.span));
            };
            self.last_unit = unit;
            value = value.with_unit(prefix, unit);
            return Ok(Node::Number {
                value,
                span: token.span.merge(unit_token.span),
            });
        }

        if matches!(self.peek().kind, TokenKind::Chemical { .. }) {
            // `2 H2O`: a coefficient written next to its species.
            let left = Node::Number {
                value: value.with_unit(Prefix::None, Unit::None),
                span: token.span,
            };
            let chemical = self.advance();
            let right = Node::Chemical {
                formula: chemical.text,
                span: chemical.span,
            };
            return Ok(binary(BinaryOp::Multiply, left, right));
        }

        Ok(Node::Number {
            value,
            span: token.span,
        })
    }
}

fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
    let span = left.span().merge(right.span());
    Node::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

fn primitive_word(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Int => "int",
        Primitive::Double => "double",
        Primitive::Float => "float",
        Primitive::Bool => "bool",
        Primitive::String => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{find_chemicals, find_identifiers, scan};

    fn front(source: &str) -> TokenStream {
        let (mut stream, diagnostics) = scan(source);
        assert!(!diagnostics.has_errors(), "{diagnostics:?}");
        let identifiers = find_identifiers(&stream);
        find_chemicals(&mut stream, &identifiers);
        stream
    }

    fn parse_source(source: &str) -> Parsed {
        parse(&front(source)).unwrap()
    }

    fn single(source: &str) -> Node {
        let parsed = parse_source(source);
        assert_eq!(parsed.program.statements.len(), 1, "{parsed:?}");
        parsed.program.statements.into_iter().next().unwrap()
    }

    #[test]
    fn empty_input_is_fatal() {
        let err = parse(&front("// nothing here\n")).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEnd);
    }

    #[test]
    fn reagent_block_with_named_params() {
        let node = single("reagent broth { vol = 500 mL; temp = 37 C; }");
        let Node::Declaration {
            keyword,
            name,
            body,
            flat,
            ..
        } = node
        else {
            panic!("expected declaration");
        };
        assert_eq!(keyword, Keyword::Reagent);
        assert_eq!(name, "broth");
        assert!(!flat);
        assert_eq!(body.len(), 2);

        let Node::Binary { op, left, right, .. } = &body[0] else {
            panic!("expected assignment");
        };
        assert_eq!(*op, BinaryOp::Assign);
        assert_eq!(
            **left,
            Node::Param {
                param: ParamKind::Volume,
                span: left.span()
            }
        );
        let Node::Number { value, .. } = right.as_ref() else {
            panic!("expected folded number");
        };
        assert_eq!(value.value, 500.0);
        assert_eq!(value.prefix, Prefix::Milli);
        assert_eq!(value.unit, Unit::Liter);
    }

    #[test]
    fn inferred_param_from_unit() {
        let node = single("reagent broth { 500 mL; }");
        let Node::Declaration { body, .. } = node else {
            panic!("expected declaration");
        };
        let Node::Binary { left, .. } = &body[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            left.as_ref(),
            Node::Param {
                param: ParamKind::Volume,
                ..
            }
        ));
    }

    #[test]
    fn bare_value_outside_container_or_reagent_is_fatal() {
        let err = parse(&front("protocol main() { 500 mL; }")).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::ExpectedToken(_)));
    }

    #[test]
    fn flat_reaction_keeps_equation_and_folds_rates() {
        let node = single("reaction r1(2 H2O --> O2, k = 3, krev = 1 + 1);");
        let Node::Declaration {
            keyword,
            name,
            body,
            flat,
            ..
        } = node
        else {
            panic!("expected declaration");
        };
        assert_eq!(keyword, Keyword::Reaction);
        assert_eq!(name, "r1");
        assert!(flat);
        assert_eq!(body.len(), 3);

        // First item: the equation, preserved as a tree.
        let Node::Binary { left, right, .. } = &body[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            left.as_ref(),
            Node::Param {
                param: ParamKind::Equation,
                ..
            }
        ));
        let Node::Binary { op, left, right: products, .. } = right.as_ref() else {
            panic!("expected arrow");
        };
        assert_eq!(*op, BinaryOp::Forward);
        let Node::Binary { op, left: coeff, right: species, .. } = left.as_ref() else {
            panic!("expected coefficient term");
        };
        assert_eq!(*op, BinaryOp::Multiply);
        assert!(matches!(coeff.as_ref(), Node::Number { .. }));
        assert!(
            matches!(species.as_ref(), Node::Chemical { formula, .. } if formula == "H2O")
        );
        assert!(
            matches!(products.as_ref(), Node::Chemical { formula, .. } if formula == "O2")
        );

        // Third item: folded arithmetic.
        let Node::Binary { right, .. } = &body[2] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            right.as_ref(),
            Node::Number { value, .. } if value.value == 2.0
        ));
    }

    #[test]
    fn primitive_declaration_folds_and_defines() {
        let parsed = parse_source("int x = 2 + 3; int y = x * 2;");
        assert_eq!(parsed.program.statements.len(), 2);
        let Node::Binary { left, right, .. } = &parsed.program.statements[1] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            left.as_ref(),
            Node::Identifier {
                primitive: Some(Primitive::Int),
                ..
            }
        ));
        assert!(matches!(
            right.as_ref(),
            Node::Number { value, .. } if value.value == 10.0
        ));
        let global = parsed.scopes.by_name("global").unwrap();
        assert_eq!(global.get("x").unwrap().value, SymbolValue::Number(5.0));
        assert_eq!(global.get("y").unwrap().value, SymbolValue::Number(10.0));
    }

    #[test]
    fn undeclared_identifier_in_arithmetic_is_fatal() {
        let err = parse(&front("int y = ghost * 2;")).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Eval(_)));
    }

    #[test]
    fn change_point_assignment() {
        let node = single("water[0] = 5;");
        let Node::Binary { op, left, right, .. } = node else {
            panic!("expected assignment");
        };
        assert_eq!(op, BinaryOp::Assign);
        let Node::Index { target, index, .. } = left.as_ref() else {
            panic!("expected index");
        };
        assert!(matches!(target.as_ref(), Node::Identifier { name, .. } if name == "water"));
        assert!(matches!(
            index.as_ref(),
            Node::Number { value, .. } if value.value == 0.0
        ));
        assert!(matches!(
            right.as_ref(),
            Node::Number { value, .. } if value.value == 5.0
        ));
    }

    #[test]
    fn interval_assignment_folds_bounds() {
        let node = single("water[10:20] = 3;");
        let Node::Binary { left, .. } = node else {
            panic!("expected assignment");
        };
        let Node::Index { index, .. } = left.as_ref() else {
            panic!("expected index");
        };
        let Node::Range { start, end, .. } = index.as_ref() else {
            panic!("expected range");
        };
        assert!(matches!(
            start.as_deref(),
            Some(Node::Number { value, .. }) if value.value == 10.0
        ));
        assert!(matches!(
            end.as_deref(),
            Some(Node::Number { value, .. }) if value.value == 20.0
        ));
    }

    #[test]
    fn open_ended_slices() {
        let node = single("water[:] = 2;");
        let Node::Binary { left, .. } = node else {
            panic!("expected assignment");
        };
        let Node::Index { index, .. } = left.as_ref() else {
            panic!("expected index");
        };
        assert!(matches!(
            index.as_ref(),
            Node::Range {
                start: None,
                end: None,
                ..
            }
        ));

        let node = single("water[5:] = 2;");
        let Node::Binary { left, .. } = node else {
            panic!("expected assignment");
        };
        let Node::Index { index, .. } = left.as_ref() else {
            panic!("expected index");
        };
        assert!(matches!(
            index.as_ref(),
            Node::Range {
                start: Some(_),
                end: None,
                ..
            }
        ));
    }

    #[test]
    fn dotted_function_call_with_named_param() {
        let node = single("broth.mix(time = 30 s);");
        let Node::Call {
            receiver,
            function,
            arguments,
            ..
        } = node
        else {
            panic!("expected call");
        };
        assert_eq!(receiver.as_deref(), Some("broth"));
        assert_eq!(function, crate::source_analysis::Function::Mix);
        assert_eq!(arguments.len(), 1);
    }

    #[test]
    fn empty_argument_list() {
        let node = single("broth.clear();");
        let Node::Call { arguments, .. } = node else {
            panic!("expected call");
        };
        assert!(arguments.is_empty());
    }

    #[test]
    fn if_else_statement() {
        let node = single("if (1 < 2) { int x = 1; } else { int x = 2; }");
        let Node::If {
            condition,
            then_branch,
            else_branch,
            ..
        } = node
        else {
            panic!("expected if");
        };
        assert!(matches!(
            condition.as_ref(),
            Node::Binary {
                op: BinaryOp::Less,
                ..
            }
        ));
        assert_eq!(then_branch.len(), 1);
        assert_eq!(else_branch.len(), 1);
    }

    #[test]
    fn for_loop_shape() {
        let node = single("for (int i = 0; i < 3; i = i + 1) { int x = 1; }");
        let Node::Looping {
            kind,
            init,
            condition,
            increment,
            body,
            ..
        } = node
        else {
            panic!("expected loop");
        };
        assert_eq!(kind, crate::source_analysis::LoopKind::For);
        assert!(init.is_some());
        assert!(matches!(
            condition.as_ref(),
            Node::Binary {
                op: BinaryOp::Less,
                ..
            }
        ));
        // The increment is kept as a tree, not folded.
        let Some(increment) = increment else {
            panic!("expected increment");
        };
        let Node::Binary { right, .. } = increment.as_ref() else {
            panic!("expected assignment");
        };
        assert!(matches!(
            right.as_ref(),
            Node::Binary {
                op: BinaryOp::Add,
                ..
            }
        ));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn while_loop_shape() {
        let node = single("while (1 < 2) { int x = 1; }");
        assert!(matches!(
            node,
            Node::Looping {
                kind: crate::source_analysis::LoopKind::While,
                init: None,
                increment: None,
                ..
            }
        ));
    }

    #[test]
    fn block_declaration_registers_scope() {
        let parsed = parse_source("protocol main() { int x = 5; }");
        let scope = parsed.scopes.by_name("main").unwrap();
        assert_eq!(scope.get("x").unwrap().value, SymbolValue::Number(5.0));
    }

    #[test]
    fn missing_semicolon_is_fatal() {
        let err = parse(&front("int x = 5")).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::ExpectedToken(_)));
    }

    #[test]
    fn missing_block_after_declaration_name_is_fatal() {
        let err = parse(&front("reagent broth int x = 5;")).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::ExpectedToken(_)));
    }

    #[test]
    fn reversible_and_inhibition_arrows() {
        let node = single("reaction r1(X <-> B, k = 1, krev = 1);");
        let Node::Declaration { body, .. } = node else {
            panic!("expected declaration");
        };
        let Node::Binary { right, .. } = &body[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            right.as_ref(),
            Node::Binary {
                op: BinaryOp::Reversible,
                ..
            }
        ));

        let node = single("reaction r2(X --| B, Ki = 1, n = 2);");
        let Node::Declaration { body, .. } = node else {
            panic!("expected declaration");
        };
        let Node::Binary { right, .. } = &body[0] else {
            panic!("expected assignment");
        };
        assert!(matches!(
            right.as_ref(),
            Node::Binary {
                op: BinaryOp::Inhibition,
                ..
            }
        ));
    }

    #[test]
    fn string_assignment_binds_text() {
        let parsed = parse_source(r#"string label = "broth";"#);
        let global = parsed.scopes.by_name("global").unwrap();
        assert_eq!(
            global.get("label").unwrap().value,
            SymbolValue::Text("broth".into())
        );
    }

    #[test]
    fn modulo_and_division_fold() {
        let parsed = parse_source("int x = 7 % 3; int y = 8 / 2;");
        let global = parsed.scopes.by_name("global").unwrap();
        assert_eq!(global.get("x").unwrap().value, SymbolValue::Number(1.0));
        assert_eq!(global.get("y").unwrap().value, SymbolValue::Number(4.0));
    }
}
