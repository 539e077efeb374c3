// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parse-stage error types.
//!
//! Fatal parse errors carry a [`Span`] and integrate with [`miette`]
//! for rendered diagnostics. Recoverable problems go through
//! [`Diagnostics`](crate::source_analysis::Diagnostics) instead and do
//! not stop the parse.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::source_analysis::Span;

/// A fatal error encountered while parsing a token stream.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct ParseError {
    /// The kind of parse error.
    #[source]
    pub kind: ParseErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(found: impl Into<EcoString>, span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedToken(found.into()), span)
    }

    /// Creates an "expected token" error.
    #[must_use]
    pub fn expected(what: impl Into<EcoString>, span: Span) -> Self {
        Self::new(ParseErrorKind::ExpectedToken(what.into()), span)
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// A token that no statement or expression form accepts.
    #[error("unexpected token '{0}'")]
    UnexpectedToken(EcoString),

    /// A specific token was required but something else appeared.
    #[error("expected {0}")]
    ExpectedToken(EcoString),

    /// The token stream ended inside an unfinished construct.
    #[error("unexpected end of input")]
    UnexpectedEnd,

    /// An identifier was used before any declaration bound it.
    #[error("'{0}' has not been declared")]
    UndefinedIdentifier(EcoString),

    /// A constant expression could not be evaluated.
    #[error(transparent)]
    Eval(EvalError),
}

/// A fatal error from constant evaluation.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic()]
pub struct EvalError {
    /// The kind of evaluation error.
    #[source]
    pub kind: EvalErrorKind,
    /// The source location of the error.
    #[label("here")]
    pub span: Span,
}

impl EvalError {
    /// Creates a new evaluation error.
    #[must_use]
    pub fn new(kind: EvalErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl From<EvalError> for ParseError {
    fn from(err: EvalError) -> Self {
        let span = err.span;
        ParseError::new(ParseErrorKind::Eval(err), span)
    }
}

/// The kind of evaluation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErrorKind {
    /// An expression node that constant evaluation cannot reduce.
    #[error("expression cannot be evaluated to a number")]
    NotConstant,

    /// An identifier in an arithmetic expression has no numeric value.
    #[error("'{0}' does not hold a numeric value")]
    NonNumericSymbol(EcoString),

    /// An identifier in an arithmetic expression is not in scope.
    #[error("'{0}' has not been declared")]
    UndefinedSymbol(EcoString),

    /// An operator with no arithmetic meaning reached the evaluator.
    #[error("operator '{0}' cannot be used in an arithmetic expression")]
    UnsupportedOperator(EcoString),

    /// The right operand of `%` truncates to zero.
    #[error("modulo by zero")]
    ModuloByZero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let err = ParseError::unexpected("}", Span::new(3, 4));
        assert_eq!(err.to_string(), "unexpected token '}'");

        let err = ParseError::expected("';' after statement", Span::new(0, 1));
        assert_eq!(err.to_string(), "expected ';' after statement");
    }

    #[test]
    fn eval_error_converts_to_parse_error() {
        let err = EvalError::new(
            EvalErrorKind::UndefinedSymbol("rate".into()),
            Span::new(10, 14),
        );
        let parse: ParseError = err.into();
        assert_eq!(parse.span, Span::new(10, 14));
        assert_eq!(parse.to_string(), "'rate' has not been declared");
    }
}
